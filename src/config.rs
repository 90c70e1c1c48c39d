/// Engine configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Position a new game starts from.
    pub start_fen: String,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        EngineConfig {
            start_fen: std::env::var("MORPHY_START_FEN")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.start_fen),
            log_filter: std::env::var("MORPHY_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            start_fen: crate::engine::START_FEN.to_string(),
            log_filter: "morphy=info".to_string(),
        }
    }
}
