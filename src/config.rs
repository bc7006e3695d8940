use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{AppletId, ApplicationId, Language};
use crate::error::LangCacheError;
use crate::writer::WriteMode;

pub const DEFAULT_CONFIG_FILE: &str = "lang-cache.json";
pub const DEFAULT_BASE_URL: &str = "http://localhost";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub atomic_rename: bool,
    #[serde(default)]
    pub translated_applications: BTreeMap<String, Vec<String>>,
    /// Applet directory name to applet identifier; the built-in table when absent.
    #[serde(default)]
    pub applets: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationLanguages {
    pub id: ApplicationId,
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppletEntry {
    pub directory: String,
    pub id: AppletId,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub root: Utf8PathBuf,
    pub api: ApiSettings,
    pub jobs: usize,
    pub write_mode: WriteMode,
    pub applications: Vec<ApplicationLanguages>,
    pub applets: Vec<AppletEntry>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, LangCacheError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.as_std_path().exists() {
            return Err(LangCacheError::MissingConfig);
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| LangCacheError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| LangCacheError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, LangCacheError> {
        let applications = config
            .translated_applications
            .into_iter()
            .map(|(id, languages)| {
                Ok(ApplicationLanguages {
                    id: id.parse()?,
                    languages: languages
                        .iter()
                        .map(|language| language.parse())
                        .collect::<Result<Vec<Language>, _>>()?,
                })
            })
            .collect::<Result<Vec<_>, LangCacheError>>()?;

        let applets = match config.applets {
            Some(table) => table
                .into_iter()
                .map(|(directory, id)| {
                    Ok(AppletEntry {
                        directory,
                        id: id.parse()?,
                    })
                })
                .collect::<Result<Vec<_>, LangCacheError>>()?,
            None => default_applets(),
        };

        Ok(ResolvedConfig {
            root: Utf8PathBuf::from(config.root.unwrap_or_else(|| ".".to_string())),
            api: ApiSettings {
                base_url: config
                    .api
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout: Duration::from_secs(
                    config.api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
                ),
            },
            jobs: config.jobs.unwrap_or(1).max(1),
            write_mode: if config.atomic_rename {
                WriteMode::AtomicRename
            } else {
                WriteMode::InPlace
            },
            applications,
            applets,
        })
    }
}

/// The applets whose language XMLs are cached, `[directory => applet id]`.
pub fn default_applets() -> Vec<AppletEntry> {
    vec![AppletEntry {
        directory: "memberapplet".to_string(),
        id: "JSM2_MemberApplet"
            .parse::<AppletId>()
            .expect("built-in applet id is valid"),
    }]
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_config_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"translated_applications": {"portal": ["en", "hu"]}}"#,
        )
        .unwrap();

        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.root, Utf8PathBuf::from("."));
        assert_eq!(resolved.jobs, 1);
        assert_eq!(resolved.write_mode, WriteMode::InPlace);
        assert_eq!(resolved.api.timeout, Duration::from_secs(30));
        assert_eq!(resolved.applications.len(), 1);
        assert_eq!(resolved.applications[0].languages.len(), 2);
        assert_eq!(resolved.applets, default_applets());
    }

    #[test]
    fn rejects_language_escaping_cache_root() {
        let config: Config = serde_json::from_str(
            r#"{"translated_applications": {"portal": ["../../etc/passwd"]}}"#,
        )
        .unwrap();
        assert_matches!(
            ConfigLoader::resolve_config(config),
            Err(LangCacheError::InvalidLanguage(_))
        );
    }
}
