use tracing::{error, info};

use super::Pipeline;
use crate::client::ResourceClient;
use crate::config::ApplicationLanguages;
use crate::domain::{Domain, WorkItem};
use crate::error::ConfigurationError;
use crate::report::{FailureKind, GenerationReport, ItemFailure};
use crate::writer::Writer;

/// Caches `{root}/cache/{application}/{language}.php` for every configured
/// application and language.
#[derive(Debug, Clone)]
pub struct ApplicationGenerator {
    applications: Vec<ApplicationLanguages>,
}

impl ApplicationGenerator {
    pub fn new(applications: Vec<ApplicationLanguages>) -> Self {
        Self { applications }
    }

    pub fn generate<C: ResourceClient, W: Writer>(
        &self,
        pipeline: &Pipeline<C, W>,
    ) -> GenerationReport {
        let mut report = GenerationReport::start();
        info!("Generating language files");

        for application in &self.applications {
            info!(application = %application.id, "[APPLICATION: {}]", application.id);
            if application.languages.is_empty() {
                let err = ConfigurationError::NoApplicationLanguages(application.id.to_string());
                error!(application = %application.id, "{err}");
                report.failed.push(ItemFailure {
                    domain: Domain::Application,
                    subject: application.id.to_string(),
                    language: None,
                    kind: FailureKind::Configuration,
                    reason: err.to_string(),
                });
                continue;
            }

            let items = application
                .languages
                .iter()
                .map(|language| WorkItem::application(&application.id, language.clone()))
                .collect::<Vec<_>>();
            pipeline.run_items(&items, &mut report);
        }

        let report = report.finish();
        info!(
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            "Application language files generated"
        );
        report
    }
}
