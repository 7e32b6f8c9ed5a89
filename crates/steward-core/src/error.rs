use std::path::PathBuf;

/// Errors that can occur while reviewing a pull request.
///
/// Library crates use this type directly; the binary converts to a
/// [`miette::Report`] at the boundary.
///
/// # Examples
///
/// ```
/// use steward_core::StewardError;
///
/// let err = StewardError::Config("missing repository".into());
/// assert!(err.to_string().contains("missing repository"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum StewardError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(steward::config))]
    Config(String),

    /// A credential or reviewer login was not provided.
    #[error("{what} is not configured")]
    #[diagnostic(
        code(steward::config::missing),
        help("set {env_var} or add `{key}` under [{section}] in .steward.toml")
    )]
    MissingSetting {
        /// Human-readable name of the setting.
        what: &'static str,
        /// Environment variable that provides it.
        env_var: &'static str,
        /// Config file section holding it.
        section: &'static str,
        /// Key inside that section.
        key: &'static str,
    },

    /// GitHub API or transport failure.
    #[error("GitHub error: {0}")]
    #[diagnostic(code(steward::github))]
    GitHub(String),

    /// Language model API or response error.
    #[error("LLM error: {0}")]
    #[diagnostic(code(steward::llm))]
    Llm(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(steward::file_not_found))]
    FileNotFound(PathBuf),
}
