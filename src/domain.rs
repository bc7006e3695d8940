use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::LangCacheError;

// Identifiers end up as path components under the cache root, so they may
// not contain separators or start with a dot.
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").expect("identifier regex"));

static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*$").expect("language regex"));

/// Which remote action and cache layout a work item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Application,
    Applet,
}

impl Domain {
    /// Remote action returning one language file of this domain.
    pub fn file_action(&self) -> &'static str {
        match self {
            Domain::Application => "getLanguageFile",
            Domain::Applet => "getAppletLanguageFile",
        }
    }

    /// Name of the post parameter carrying the subject identifier.
    pub fn subject_param(&self) -> &'static str {
        match self {
            Domain::Application => "application",
            Domain::Applet => "applet",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Application => write!(f, "application"),
            Domain::Applet => write!(f, "applet"),
        }
    }
}

/// Generator selection exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GenerateTarget {
    Applications,
    Applets,
    All,
}

macro_rules! identifier {
    ($name:ident, $re:ident, $err:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = LangCacheError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let trimmed = value.trim();
                if !$re.is_match(trimmed) {
                    return Err(LangCacheError::$err(value.to_string()));
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = LangCacheError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

identifier!(ApplicationId, IDENTIFIER_RE, InvalidApplicationId);
identifier!(AppletId, IDENTIFIER_RE, InvalidAppletId);
identifier!(Language, LANGUAGE_RE, InvalidLanguage);

/// One (subject, language) unit of fetch-then-cache work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub domain: Domain,
    pub subject_id: String,
    pub language: Language,
}

impl WorkItem {
    pub fn application(application: &ApplicationId, language: Language) -> Self {
        Self {
            domain: Domain::Application,
            subject_id: application.as_str().to_string(),
            language,
        }
    }

    pub fn applet(applet: &AppletId, language: Language) -> Self {
        Self {
            domain: Domain::Applet,
            subject_id: applet.as_str().to_string(),
            language,
        }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject_id, self.language)
    }
}
