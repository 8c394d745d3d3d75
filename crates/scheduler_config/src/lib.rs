// --- File: crates/scheduler_config/src/lib.rs ---
use config::{Config, ConfigBuilder, ConfigError, Environment, File, Map};
use config::builder::DefaultState;
use once_cell::sync::OnceCell;
use std::env;
use std::path::Path;
use tracing::debug;
pub mod models;
pub use models::*;

/// Prefix for structured overrides, e.g. `SCHEDULER__BOOKING__TIME_ZONE`.
pub const DEFAULT_PREFIX: &str = "SCHEDULER";

/// Plain environment variables and the config keys they populate.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("ALLOWED_ORIGINS", "cors.allowed_origins"),
    ("GOOGLE_CLIENT_ID", "google.client_id"),
    ("GOOGLE_CLIENT_SECRET", "google.client_secret"),
    ("GOOGLE_REDIRECT_URI", "google.redirect_uri"),
];

/// Loads the configuration from `config/default`, `config/{RUN_ENV}`, the
/// `SCHEDULER__*` variables and finally the plain variables in [`ENV_OVERRIDES`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let vars: Map<String, String> = env::vars().collect();

    load_config_from(Path::new(&config_dir), &vars)
}

/// Same as [`load_config`] but reads from an explicit directory and variable set.
pub fn load_config_from(
    config_dir: &Path,
    vars: &Map<String, String>,
) -> Result<AppConfig, ConfigError> {
    let run_env = vars
        .get("RUN_ENV")
        .cloned()
        .unwrap_or_else(|| "debug".to_string());
    let prefix = vars
        .get("PREFIX")
        .cloned()
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    debug!("config: default_path: {}", default_path.display());
    debug!("config: env_path: {}", env_path.display());

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator("__")
                .source(Some(vars.clone())),
        );

    let raw_config: AppConfig = apply_env_overrides(builder, vars)?
        .build()?
        .try_deserialize()?;
    Ok(raw_config)
}

/// Applies the plain environment variables on top of every other source.
fn apply_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    vars: &Map<String, String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in ENV_OVERRIDES {
        builder = builder.set_override_option(*key, vars.get(*var).cloned())?;
    }
    Ok(builder)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file is taken from `DOTENV_OVERRIDE`, else from the first command line
/// argument when it starts with `.env`, else `.env`. Loading happens once per
/// process; a missing file is not an error.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = std::env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn missing_dir() -> PathBuf {
        PathBuf::from("/nonexistent/scheduler-config-test")
    }

    fn google_vars() -> Map<String, String> {
        let mut vars = Map::new();
        vars.insert("GOOGLE_CLIENT_ID".to_string(), "client-id".to_string());
        vars.insert("GOOGLE_CLIENT_SECRET".to_string(), "client-secret".to_string());
        vars.insert(
            "GOOGLE_REDIRECT_URI".to_string(),
            "http://localhost:3001/oauth/callback".to_string(),
        );
        vars
    }

    #[test]
    fn test_plain_env_vars_populate_config() {
        let mut vars = google_vars();
        vars.insert("PORT".to_string(), "5000".to_string());
        vars.insert(
            "ALLOWED_ORIGINS".to_string(),
            "http://localhost:3000, https://example.com".to_string(),
        );

        let config = load_config_from(&missing_dir(), &vars).expect("config should load");

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.google.client_id, "client-id");
        assert_eq!(config.google.client_secret, "client-secret");
        assert_eq!(config.google.calendar_id, "primary");
        assert_eq!(config.google.token_url, GOOGLE_TOKEN_URL);
        assert_eq!(
            config.cors.origins(),
            vec!["http://localhost:3000", "https://example.com"]
        );
        assert_eq!(
            config.cors.redirect_target().as_deref(),
            Some("http://localhost:3000")
        );
    }

    #[test]
    fn test_booking_defaults() {
        let config = load_config_from(&missing_dir(), &google_vars()).unwrap();

        assert_eq!(config.server.port, 3001);
        assert_eq!(config.booking.workday_start, 9);
        assert_eq!(config.booking.workday_end, 17);
        assert_eq!(config.booking.slot_minutes, 30);
        assert_eq!(config.booking.lunch_start, 12);
        assert_eq!(config.booking.lunch_end, 13);
        assert_eq!(config.booking.time_zone, "UTC");
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_prefixed_vars_override_nested_keys() {
        let mut vars = google_vars();
        vars.insert(
            "SCHEDULER__BOOKING__TIME_ZONE".to_string(),
            "Europe/Zurich".to_string(),
        );

        let config = load_config_from(&missing_dir(), &vars).unwrap();
        assert_eq!(config.booking.time_zone, "Europe/Zurich");
    }

    #[test]
    fn test_missing_google_credentials_is_an_error() {
        let result = load_config_from(&missing_dir(), &Map::new());
        assert!(result.is_err(), "google section is mandatory");
    }

    #[test]
    fn test_empty_origins() {
        let cors = CorsConfig::default();
        assert!(cors.origins().is_empty());
        assert!(cors.redirect_target().is_none());
    }
}
