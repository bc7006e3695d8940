//! Language file generators.
//!
//! A generator enumerates work items for its domain and pushes each one
//! through fetch and write. Item failures are logged and recorded in the
//! report; they never stop the remaining items.

mod applets;
mod applications;

use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tracing::{debug, error, info};

pub use applets::AppletGenerator;
pub use applications::ApplicationGenerator;

use crate::cache::CacheLayout;
use crate::client::ResourceClient;
use crate::domain::WorkItem;
use crate::error::{RemoteError, WriteError};
use crate::report::{FailureKind, GenerationReport, ItemFailure, ItemSuccess};
use crate::writer::Writer;

/// Everything a generator needs to turn a work item into a cached file.
pub struct Pipeline<C: ResourceClient, W: Writer> {
    client: C,
    writer: W,
    layout: CacheLayout,
    jobs: usize,
}

impl<C: ResourceClient, W: Writer> Pipeline<C, W> {
    pub fn new(client: C, writer: W, layout: CacheLayout) -> Self {
        Self {
            client,
            writer,
            layout,
            jobs: 1,
        }
    }

    /// Number of work items processed at the same time; 1 keeps the run sequential.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Fetches and stores one item.
    pub fn process(&self, item: &WorkItem) -> Result<ItemSuccess, ItemError> {
        let destination = self.layout.path_for(item);
        debug!(item = %item, destination = %destination, "fetching language file");
        let content = self
            .client
            .fetch_content(item.domain, &item.subject_id, &item.language)?;
        self.writer.write(&content, &destination)?;
        Ok(ItemSuccess {
            domain: item.domain,
            subject: item.subject_id.clone(),
            language: item.language.to_string(),
            path: destination.to_string(),
            bytes: content.len(),
        })
    }

    /// Processes `items`, logging and recording every outcome in `report`.
    /// Outcomes are recorded in item order regardless of `jobs`.
    pub fn run_items(&self, items: &[WorkItem], report: &mut GenerationReport) {
        for (item, outcome) in items.iter().zip(self.process_all(items)) {
            match outcome {
                Ok(success) => {
                    info!(
                        domain = %item.domain,
                        subject = %item.subject_id,
                        language = %item.language,
                        path = %success.path,
                        "OK saving language file was successful"
                    );
                    report.succeeded.push(success);
                }
                Err(err) => {
                    error!(
                        domain = %item.domain,
                        subject = %item.subject_id,
                        language = %item.language,
                        "unable to generate language file: {err}"
                    );
                    report.failed.push(ItemFailure {
                        domain: item.domain,
                        subject: item.subject_id.clone(),
                        language: Some(item.language.to_string()),
                        kind: err.kind(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    fn process_all(&self, items: &[WorkItem]) -> Vec<Result<ItemSuccess, ItemError>> {
        if self.jobs <= 1 || items.len() <= 1 {
            return items
                .iter()
                .map(|item| {
                    info!(item = %item, "generating language file");
                    self.process(item)
                })
                .collect();
        }

        let next = AtomicUsize::new(0);
        let next = &next;
        let mut outcomes: Vec<(usize, Result<ItemSuccess, ItemError>)> = thread::scope(|scope| {
            let workers: Vec<_> = (0..self.jobs.min(items.len()))
                .map(|_| {
                    scope.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            let Some(item) = items.get(index) else {
                                break;
                            };
                            info!(item = %item, "generating language file");
                            done.push((index, self.process(item)));
                        }
                        done
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|worker| {
                    worker
                        .join()
                        .unwrap_or_else(|payload| panic::resume_unwind(payload))
                })
                .collect()
        });

        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl ItemError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ItemError::Remote(_) => FailureKind::Remote,
            ItemError::Write(_) => FailureKind::Write,
        }
    }
}

/// The closed set of generators a batch run can dispatch to.
#[derive(Debug, Clone)]
pub enum Generator {
    Applications(ApplicationGenerator),
    Applets(AppletGenerator),
    /// Applications first, then applets, with one merged report.
    All(ApplicationGenerator, AppletGenerator),
}

impl Generator {
    pub fn name(&self) -> &'static str {
        match self {
            Generator::Applications(_) => "applications",
            Generator::Applets(_) => "applets",
            Generator::All(..) => "all",
        }
    }

    pub fn generate<C: ResourceClient, W: Writer>(
        &self,
        pipeline: &Pipeline<C, W>,
    ) -> GenerationReport {
        match self {
            Generator::Applications(generator) => generator.generate(pipeline),
            Generator::Applets(generator) => generator.generate(pipeline),
            Generator::All(applications, applets) => applications
                .generate(pipeline)
                .merge(applets.generate(pipeline)),
        }
    }
}
