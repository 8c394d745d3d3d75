// --- File: crates/scheduler_widget/src/notice.rs ---

/// Outcome of the OAuth round trip, read from the `?status=` the proxy appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionNotice {
    Connected,
    Failed,
}

impl ConnectionNotice {
    /// Reads `status` from a query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
        pairs
            .into_iter()
            .find(|(key, _)| key == "status")
            .and_then(|(_, value)| match value.as_str() {
                "success" => Some(ConnectionNotice::Connected),
                "error" => Some(ConnectionNotice::Failed),
                _ => None,
            })
    }

    pub fn message(&self) -> &'static str {
        match self {
            ConnectionNotice::Connected => "Google Calendar connected successfully!",
            ConnectionNotice::Failed => "Failed to connect Google Calendar.",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionNotice::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_status() {
        assert_eq!(
            ConnectionNotice::from_query("?status=success"),
            Some(ConnectionNotice::Connected)
        );
        assert_eq!(
            ConnectionNotice::from_query("utm_source=mail&status=error"),
            Some(ConnectionNotice::Failed)
        );
        assert!(ConnectionNotice::from_query("?status=success")
            .unwrap()
            .is_connected());
    }

    #[test]
    fn test_ignores_missing_or_unknown_status() {
        assert_eq!(ConnectionNotice::from_query(""), None);
        assert_eq!(ConnectionNotice::from_query("?page=2"), None);
        assert_eq!(ConnectionNotice::from_query("?status=pending"), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ConnectionNotice::Failed.message(),
            "Failed to connect Google Calendar."
        );
    }
}
