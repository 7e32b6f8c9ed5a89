use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StewardError;
use crate::types::RepoId;

/// Top-level configuration loaded from `.steward.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
/// Credentials normally come from the environment; see [`StewardConfig::apply_env`].
///
/// # Examples
///
/// ```
/// use steward_core::StewardConfig;
///
/// let config = StewardConfig::default();
/// assert_eq!(config.github.repository.to_string(), "flutter/flutter-intellij");
/// assert_eq!(config.llm.model, "gemini-1.5-pro");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StewardConfig {
    /// Code-hosting settings.
    #[serde(default)]
    pub github: GitHubConfig,
    /// Language model settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Review behavior settings.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl StewardConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::FileNotFound`] if the file does not exist,
    /// [`StewardError::Io`] if it cannot be read, or [`StewardError::Toml`]
    /// if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, StewardError> {
        if !path.exists() {
            return Err(StewardError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use steward_core::StewardConfig;
    ///
    /// let toml = r#"
    /// [github]
    /// repository = "octocat/hello-world"
    /// "#;
    /// let config = StewardConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.github.repository.owner, "octocat");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, StewardError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay values from environment variables onto this configuration.
    ///
    /// `lookup` is normally `|k| std::env::var(k).ok()`; tests pass a fixture.
    /// Empty values are ignored. Reads `GITHUB_TOKEN` (falling back to
    /// `GH_TOKEN`), `GEMINI_API_KEY` and `HUMAN_REVIEWER`.
    ///
    /// # Examples
    ///
    /// ```
    /// use steward_core::StewardConfig;
    ///
    /// let config = StewardConfig::default().apply_env(|key| match key {
    ///     "HUMAN_REVIEWER" => Some("octocat".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.github.reviewer.as_deref(), Some("octocat"));
    /// ```
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(GITHUB_TOKEN_VAR).or_else(|| get("GH_TOKEN")) {
            self.github.token = Some(token);
        }
        if let Some(key) = get(LLM_API_KEY_VAR) {
            self.llm.api_key = Some(key);
        }
        if let Some(reviewer) = get(REVIEWER_VAR) {
            self.github.reviewer = Some(reviewer);
        }
        self
    }

    /// The GitHub token.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::MissingSetting`] if no token is configured.
    pub fn github_token(&self) -> Result<&str, StewardError> {
        self.github
            .token
            .as_deref()
            .ok_or(StewardError::MissingSetting {
                what: "GitHub token",
                env_var: GITHUB_TOKEN_VAR,
                section: "github",
                key: "token",
            })
    }

    /// The language model API key.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::MissingSetting`] if no key is configured.
    pub fn llm_api_key(&self) -> Result<&str, StewardError> {
        self.llm
            .api_key
            .as_deref()
            .ok_or(StewardError::MissingSetting {
                what: "Gemini API key",
                env_var: LLM_API_KEY_VAR,
                section: "llm",
                key: "api_key",
            })
    }

    /// Login of the human reviewer to hand off to.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::MissingSetting`] if no reviewer is configured.
    pub fn reviewer(&self) -> Result<&str, StewardError> {
        self.github
            .reviewer
            .as_deref()
            .ok_or(StewardError::MissingSetting {
                what: "human reviewer",
                env_var: REVIEWER_VAR,
                section: "github",
                key: "reviewer",
            })
    }
}

const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
const LLM_API_KEY_VAR: &str = "GEMINI_API_KEY";
const REVIEWER_VAR: &str = "HUMAN_REVIEWER";

/// GitHub repository and credentials.
///
/// # Examples
///
/// ```
/// use steward_core::GitHubConfig;
///
/// let config = GitHubConfig::default();
/// assert!(config.token.is_none());
/// assert!(config.api_base.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Repository whose pull requests are reviewed.
    #[serde(default = "default_repository")]
    pub repository: RepoId,
    /// Personal access or Actions token.
    pub token: Option<String>,
    /// Login assigned when the model signals the change is ready.
    pub reviewer: Option<String>,
    /// Custom API base URL (GitHub Enterprise).
    pub api_base: Option<String>,
}

fn default_repository() -> RepoId {
    RepoId::new("flutter", "flutter-intellij")
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            token: None,
            reviewer: None,
            api_base: None,
        }
    }
}

/// Language model configuration.
///
/// # Examples
///
/// ```
/// use steward_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gemini-1.5-pro");
/// assert!(config.temperature.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
    /// Sampling temperature; the provider default applies when unset.
    pub temperature: Option<f32>,
}

fn default_model() -> String {
    "gemini-1.5-pro".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            temperature: None,
        }
    }
}

/// Review behavior configuration.
///
/// # Examples
///
/// ```
/// use steward_core::ReviewConfig;
/// use std::path::Path;
///
/// let config = ReviewConfig::default();
/// assert_eq!(config.standards_path, Path::new("docs/ai-standards.md"));
/// assert_eq!(config.project, "the Flutter IntelliJ plugin");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Standards document the model reviews against.
    #[serde(default = "default_standards_path")]
    pub standards_path: PathBuf,
    /// Project name used in the prompt.
    #[serde(default = "default_project")]
    pub project: String,
}

fn default_standards_path() -> PathBuf {
    PathBuf::from("docs/ai-standards.md")
}

fn default_project() -> String {
    "the Flutter IntelliJ plugin".into()
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            standards_path: default_standards_path(),
            project: default_project(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = StewardConfig::default();
        assert_eq!(config.github.repository, RepoId::new("flutter", "flutter-intellij"));
        assert!(config.github.token.is_none());
        assert!(config.github.reviewer.is_none());
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.review.standards_path, PathBuf::from("docs/ai-standards.md"));
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = StewardConfig::from_toml("").unwrap();
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.github.repository.name, "flutter-intellij");
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[github]
repository = "octocat/hello-world"
reviewer = "monalisa"
api_base = "https://github.example.com/api/v3"

[llm]
model = "gemini-1.5-flash"
base_url = "http://localhost:8080"
temperature = 0.2

[review]
standards_path = "STANDARDS.md"
project = "Hello World"
"#;
        let config = StewardConfig::from_toml(toml).unwrap();
        assert_eq!(config.github.repository.to_string(), "octocat/hello-world");
        assert_eq!(config.github.reviewer.as_deref(), Some("monalisa"));
        assert_eq!(
            config.github.api_base.as_deref(),
            Some("https://github.example.com/api/v3")
        );
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.llm.temperature, Some(0.2));
        assert_eq!(config.review.standards_path, PathBuf::from("STANDARDS.md"));
        assert_eq!(config.review.project, "Hello World");
    }

    #[test]
    fn invalid_repository_is_rejected() {
        let result = StewardConfig::from_toml("[github]\nrepository = \"no-slash\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(StewardConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = StewardConfig::from_file(Path::new("/nonexistent/.steward.toml")).unwrap_err();
        assert!(matches!(err, StewardError::FileNotFound(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let config = StewardConfig::from_toml("[github]\ntoken = \"from-file\"\n")
            .unwrap()
            .apply_env(env_from(&[
                ("GITHUB_TOKEN", "from-env"),
                ("GEMINI_API_KEY", "key"),
                ("HUMAN_REVIEWER", "monalisa"),
            ]));
        assert_eq!(config.github_token().unwrap(), "from-env");
        assert_eq!(config.llm_api_key().unwrap(), "key");
        assert_eq!(config.reviewer().unwrap(), "monalisa");
    }

    #[test]
    fn gh_token_is_a_fallback() {
        let config = StewardConfig::default().apply_env(env_from(&[("GH_TOKEN", "gh")]));
        assert_eq!(config.github_token().unwrap(), "gh");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = StewardConfig::from_toml("[github]\nreviewer = \"monalisa\"\n")
            .unwrap()
            .apply_env(env_from(&[("HUMAN_REVIEWER", "  ")]));
        assert_eq!(config.reviewer().unwrap(), "monalisa");
    }

    #[test]
    fn missing_credentials_name_their_env_var() {
        let config = StewardConfig::default().apply_env(|_| None);
        match config.llm_api_key().unwrap_err() {
            StewardError::MissingSetting { env_var, .. } => assert_eq!(env_var, "GEMINI_API_KEY"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(config.github_token().is_err());
        assert!(config.reviewer().is_err());
    }
}
