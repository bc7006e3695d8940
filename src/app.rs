use tracing::info;

use crate::cache::CacheLayout;
use crate::client::ResourceClient;
use crate::config::{AppletEntry, ApplicationLanguages, ResolvedConfig};
use crate::domain::GenerateTarget;
use crate::generator::{AppletGenerator, ApplicationGenerator, Generator, Pipeline};
use crate::report::GenerationReport;
use crate::writer::Writer;

/// Batch entry point: picks the generator for a target and runs it.
pub struct App<C: ResourceClient, W: Writer> {
    pipeline: Pipeline<C, W>,
    applications: Vec<ApplicationLanguages>,
    applets: Vec<AppletEntry>,
}

impl<C: ResourceClient, W: Writer> App<C, W> {
    pub fn new(
        pipeline: Pipeline<C, W>,
        applications: Vec<ApplicationLanguages>,
        applets: Vec<AppletEntry>,
    ) -> Self {
        Self {
            pipeline,
            applications,
            applets,
        }
    }

    pub fn from_config(config: &ResolvedConfig, client: C, writer: W) -> Self {
        let pipeline = Pipeline::new(client, writer, CacheLayout::new(config.root.clone()))
            .with_jobs(config.jobs);
        Self::new(pipeline, config.applications.clone(), config.applets.clone())
    }

    pub fn pipeline(&self) -> &Pipeline<C, W> {
        &self.pipeline
    }

    pub fn generator(&self, target: GenerateTarget) -> Generator {
        let applications = || ApplicationGenerator::new(self.applications.clone());
        let applets = || AppletGenerator::new(self.applets.clone());
        match target {
            GenerateTarget::Applications => Generator::Applications(applications()),
            GenerateTarget::Applets => Generator::Applets(applets()),
            GenerateTarget::All => Generator::All(applications(), applets()),
        }
    }

    pub fn generate(&self, target: GenerateTarget) -> GenerationReport {
        let generator = self.generator(target);
        info!(
            generator = generator.name(),
            root = %self.pipeline.layout().root(),
            jobs = self.pipeline.jobs(),
            "starting language file generation"
        );
        generator.generate(&self.pipeline)
    }
}
