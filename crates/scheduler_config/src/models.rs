// --- File: crates/scheduler_config/src/models.rs ---

use serde::{Deserialize, Serialize};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

// --- Google OAuth2 / Calendar Config ---
// client_id, client_secret and redirect_uri usually come from
// GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoogleConfig {
    pub client_id: String,     // Mandatory
    pub client_secret: String, // Mandatory
    pub redirect_uri: String,  // Mandatory
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_auth_url() -> String {
    GOOGLE_AUTH_URL.to_string()
}

fn default_token_url() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

fn default_scope() -> String {
    GOOGLE_CALENDAR_SCOPE.to_string()
}

// --- CORS Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CorsConfig {
    /// Comma-separated list of origins, loaded from ALLOWED_ORIGINS.
    #[serde(default)]
    pub allowed_origins: String,
}

impl CorsConfig {
    /// The individual origins, trimmed, empty entries dropped.
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Where the browser is sent after the OAuth callback.
    ///
    /// The first configured origin doubles as the front end's address.
    pub fn redirect_target(&self) -> Option<String> {
        self.origins().into_iter().next()
    }
}

// --- Booking Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    #[serde(default = "default_workday_start")]
    pub workday_start: u32,
    #[serde(default = "default_workday_end")]
    pub workday_end: u32,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
    #[serde(default = "default_lunch_start")]
    pub lunch_start: u32,
    #[serde(default = "default_lunch_end")]
    pub lunch_end: u32,
    /// IANA zone used for "local" wall-clock time, e.g. "Europe/Zurich".
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            workday_start: default_workday_start(),
            workday_end: default_workday_end(),
            slot_minutes: default_slot_minutes(),
            lunch_start: default_lunch_start(),
            lunch_end: default_lunch_end(),
            time_zone: default_time_zone(),
        }
    }
}

fn default_workday_start() -> u32 {
    9
}

fn default_workday_end() -> u32 {
    17
}

fn default_slot_minutes() -> u32 {
    30
}

fn default_lunch_start() -> u32 {
    12
}

fn default_lunch_end() -> u32 {
    13
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // Google credentials are mandatory, there is nothing to relay without them
    pub google: GoogleConfig,

    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub booking: BookingConfig,

    /// Directory served under /static (embed loader, bundles).
    #[serde(default)]
    pub static_dir: Option<String>,
}
