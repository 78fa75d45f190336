use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading a [`ViewConfig`](crate::ViewConfig).
pub enum ConfigError {
    #[error("config parse error: {0}")]
    /// The TOML text could not be deserialized.
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{field}': {reason}")]
    /// A value parsed but is outside its allowed range.
    Invalid {
        /// Dotted path of the offending key.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

#[derive(Debug, Error)]
/// Errors produced by [`find_all`](crate::find_all).
pub enum SearchError {
    #[error("invalid regex: {0}")]
    /// The query did not compile as a regex.
    InvalidRegex(#[from] regex::Error),
}
