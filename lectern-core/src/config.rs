use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parsing(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parsing(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::Invalid(reason) => write!(f, "Invalid configuration: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parsing(value)
    }
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub sidebar: Vec<SidebarSection>,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(data)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.site.validate()?;

        for section in &self.sidebar {
            section.validate()?;
        }

        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    /// Full URL the site is published under.
    pub url: String,
    /// Deployment subdirectory, prefixed onto every canonical local link.
    /// Leading slash, no trailing slash.
    pub base_path: String,
    /// Browsing URL of the source repository the content links against.
    pub repository: String,
    pub branch: String,
    pub favicon: String,
    pub logo: String,
    pub social: Vec<SocialLink>,
    pub toc: TocConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            base_path: String::new(),
            repository: String::new(),
            branch: "main".to_string(),
            favicon: "/favicon.svg".to_string(),
            logo: "/favicon.svg".to_string(),
            social: Vec::new(),
            toc: TocConfig::default(),
        }
    }
}

impl SiteConfig {
    /// The case-preserved project identifier: the base path minus its
    /// leading slash. Canonical links are lowercased everywhere except
    /// this one token.
    pub fn project_slug(&self) -> &str {
        self.base_path.trim_start_matches('/')
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.is_empty() {
            return Err(ConfigError::Invalid("site.title must not be empty".into()));
        }
        if !is_http_url(&self.url) {
            return Err(ConfigError::Invalid(
                "site.url must be an absolute http(s) URL".into(),
            ));
        }
        if !self.base_path.is_empty() {
            if !self.base_path.starts_with('/') {
                return Err(ConfigError::Invalid(
                    "site.base_path must start with a slash".into(),
                ));
            }
            if self.base_path.ends_with('/') {
                return Err(ConfigError::Invalid(
                    "site.base_path must not end with a slash".into(),
                ));
            }
        }
        if !is_http_url(&self.repository) {
            return Err(ConfigError::Invalid(
                "site.repository must be an absolute http(s) URL".into(),
            ));
        }
        if self.branch.is_empty() {
            return Err(ConfigError::Invalid("site.branch must not be empty".into()));
        }
        for link in &self.social {
            link.validate()?;
        }
        self.toc.validate()?;

        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SocialLink {
    pub platform: String,
    pub label: String,
    pub href: String,
}

impl SocialLink {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.platform.is_empty() || self.label.is_empty() {
            return Err(ConfigError::Invalid(
                "social links need a platform and a label".into(),
            ));
        }
        if !is_http_url(&self.href) {
            return Err(ConfigError::Invalid(format!(
                "social link '{}' must point at an absolute http(s) URL",
                self.label
            )));
        }

        Ok(())
    }
}

/// One auto-populated navigation section: a label and the content
/// directory whose pages fill it.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SidebarSection {
    pub label: String,
    pub directory: String,
}

impl SidebarSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.label.is_empty() {
            return Err(ConfigError::Invalid(
                "sidebar sections need a label".into(),
            ));
        }
        if self.directory.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "sidebar section '{}' needs a source directory",
                self.label
            )));
        }
        if self.directory.starts_with('/') || self.directory.split('/').any(|c| c == "..") {
            return Err(ConfigError::Invalid(format!(
                "sidebar section '{}' must use a relative directory",
                self.label
            )));
        }

        Ok(())
    }
}

/// Heading levels included in the per-page outline.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TocConfig {
    pub min_level: u32,
    pub max_level: u32,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            min_level: 2,
            max_level: 4,
        }
    }
}

impl TocConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_level < 1 || self.max_level > 6 || self.min_level > self.max_level {
            return Err(ConfigError::Invalid(
                "toc levels must satisfy 1 <= min_level <= max_level <= 6".into(),
            ));
        }

        Ok(())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
