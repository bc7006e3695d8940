use tracing::{error, info, warn};

use super::Pipeline;
use crate::client::ResourceClient;
use crate::config::AppletEntry;
use crate::domain::{Domain, Language, WorkItem};
use crate::error::ConfigurationError;
use crate::report::{FailureKind, GenerationReport, ItemFailure};
use crate::writer::Writer;

/// Caches `{root}/cache/flash/lang_{language}.xml` for every language the
/// remote side lists for each configured applet.
#[derive(Debug, Clone)]
pub struct AppletGenerator {
    applets: Vec<AppletEntry>,
}

impl AppletGenerator {
    pub fn new(applets: Vec<AppletEntry>) -> Self {
        Self { applets }
    }

    pub fn generate<C: ResourceClient, W: Writer>(
        &self,
        pipeline: &Pipeline<C, W>,
    ) -> GenerationReport {
        let mut report = GenerationReport::start();
        info!("Getting applet language XMLs..");

        for applet in &self.applets {
            info!(
                applet = %applet.id,
                directory = %applet.directory,
                "Getting > {} ({}) language xmls..",
                applet.id,
                applet.directory
            );

            let languages = match pipeline.client().applet_languages(applet.id.as_str()) {
                Ok(languages) => languages,
                Err(err) => {
                    error!(applet = %applet.id, "{err}");
                    report.failed.push(subject_failure(
                        applet,
                        FailureKind::Remote,
                        err.to_string(),
                    ));
                    continue;
                }
            };

            if languages.is_empty() {
                let err = ConfigurationError::NoAppletLanguages(applet.id.to_string());
                error!(applet = %applet.id, "{err}");
                report.failed.push(subject_failure(
                    applet,
                    FailureKind::Configuration,
                    err.to_string(),
                ));
                continue;
            }
            info!(applet = %applet.id, "Available languages: {}", languages.join(", "));

            let mut items = Vec::with_capacity(languages.len());
            for code in &languages {
                match code.parse::<Language>() {
                    Ok(language) => items.push(WorkItem::applet(&applet.id, language)),
                    Err(err) => {
                        warn!(applet = %applet.id, language = %code, "skipping language: {err}");
                        report.failed.push(ItemFailure {
                            domain: Domain::Applet,
                            subject: applet.id.to_string(),
                            language: Some(code.clone()),
                            kind: FailureKind::Remote,
                            reason: err.to_string(),
                        });
                    }
                }
            }

            pipeline.run_items(&items, &mut report);
            info!(
                applet = %applet.id,
                "< {} ({}) language xml cached.",
                applet.id,
                applet.directory
            );
        }

        let report = report.finish();
        info!(
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            "Applet language XMLs generated."
        );
        report
    }
}

fn subject_failure(applet: &AppletEntry, kind: FailureKind, reason: String) -> ItemFailure {
    ItemFailure {
        domain: Domain::Applet,
        subject: applet.id.to_string(),
        language: None,
        kind,
        reason,
    }
}
