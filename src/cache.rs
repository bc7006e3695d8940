use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::{ApplicationId, Domain, Language, WorkItem};

/// Resolves where cached language files live under a root directory.
///
/// Every method is a pure path computation; nothing touches the filesystem.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: Utf8PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn cache_dir(&self) -> Utf8PathBuf {
        self.root.join("cache")
    }

    pub fn application_dir(&self, application: &ApplicationId) -> Utf8PathBuf {
        self.cache_dir().join(application.as_str())
    }

    pub fn application_path(&self, application: &ApplicationId, language: &Language) -> Utf8PathBuf {
        self.application_dir(application)
            .join(format!("{}.php", language.as_str()))
    }

    pub fn applet_dir(&self) -> Utf8PathBuf {
        self.cache_dir().join("flash")
    }

    pub fn applet_path(&self, language: &Language) -> Utf8PathBuf {
        self.applet_dir()
            .join(format!("lang_{}.xml", language.as_str()))
    }

    pub fn path_for(&self, item: &WorkItem) -> Utf8PathBuf {
        match item.domain {
            Domain::Application => self
                .cache_dir()
                .join(&item.subject_id)
                .join(format!("{}.php", item.language.as_str())),
            Domain::Applet => self.applet_path(&item.language),
        }
    }
}
