use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver};
use log::{error, info};

use crate::config::AppConfig;
use crate::document::DocumentResult;
use crate::error::{panic_message, WorkerError};
use crate::pipeline::{LogLevel, Phase, Pipeline, PipelineConfig};
use crate::report;

use super::cleanup::clear_review_files;
use super::control::BatchControl;
use super::events::{BatchEvent, EventSink, SinkProgress};
use super::job::{stem_of, DocumentJob};
use super::scanner::InputSpec;
use super::state::BatchRunState;

/// One batch invocation.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub template: PathBuf,
    pub inputs: InputSpec,
    /// Re-runs keep existing review files and bypass the cache.
    pub is_rerun: bool,
}

/// Final outcome returned by [`BatchRunner::process_job`].
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// `Complete`, `Cancelled` or `Error: <message>`.
    pub status: String,
    pub results: Vec<DocumentResult>,
    pub output_path: Option<PathBuf>,
}

/// A batch running on its own thread.
pub struct BatchHandle {
    pub events: Receiver<BatchEvent>,
    pub control: Arc<BatchControl>,
    thread: JoinHandle<()>,
}

impl BatchHandle {
    pub fn join(self) -> Result<(), WorkerError> {
        self.thread
            .join()
            .map_err(|payload| WorkerError::Panicked(panic_message(payload.as_ref())))
    }
}

pub struct BatchRunner {
    config: AppConfig,
    pipeline: Pipeline,
}

impl BatchRunner {
    pub fn from_config(config: AppConfig) -> Self {
        let pipeline = Pipeline::from_config(Arc::new(PipelineConfig::from_config(&config)));
        Self { config, pipeline }
    }

    pub fn new(config: AppConfig, pipeline: Pipeline) -> Self {
        Self { config, pipeline }
    }

    /// Starts the batch on a background thread. Events arrive on the
    /// returned channel in production order, ending with exactly one
    /// terminal event.
    pub fn spawn(self, request: BatchRequest) -> Result<BatchHandle, WorkerError> {
        let (sender, events) = unbounded();
        let control = Arc::new(BatchControl::new());
        let worker_control = Arc::clone(&control);

        let thread = thread::Builder::new()
            .name("kyoqa-batch".to_string())
            .spawn(move || {
                self.run(&request, &worker_control, &sender);
            })
            .map_err(|e| WorkerError::SpawnFailed(e.to_string()))?;

        Ok(BatchHandle {
            events,
            control,
            thread,
        })
    }

    /// Runs the batch on the calling thread and collects its outcome.
    pub fn process_job(&self, template: &Path, inputs: InputSpec, is_rerun: bool) -> JobOutcome {
        let request = BatchRequest {
            template: template.to_path_buf(),
            inputs,
            is_rerun,
        };
        let (sender, events) = unbounded();
        self.run(&request, &BatchControl::new(), &sender);
        drop(sender);

        let terminal = events.iter().find(BatchEvent::is_terminal);
        match terminal {
            Some(BatchEvent::Complete {
                output_path,
                results,
                ..
            }) => JobOutcome {
                status: "Complete".to_string(),
                results,
                output_path: Some(output_path),
            },
            Some(BatchEvent::Cancelled { results, .. }) => JobOutcome {
                status: "Cancelled".to_string(),
                results,
                output_path: None,
            },
            Some(BatchEvent::Error { message }) => JobOutcome {
                status: format!("Error: {}", message),
                results: Vec::new(),
                output_path: None,
            },
            _ => JobOutcome {
                status: "Error: batch ended without a result".to_string(),
                results: Vec::new(),
                output_path: None,
            },
        }
    }

    /// Runs one batch to completion, emitting exactly one terminal event.
    pub fn run(&self, request: &BatchRequest, control: &BatchControl, sink: &dyn EventSink) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_batch(request, control, sink)
        }));

        let terminal = match outcome {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                error!("Batch failed: {}", e);
                sink.emit(BatchEvent::Log {
                    level: LogLevel::Error,
                    message: e.to_string(),
                });
                BatchEvent::Error {
                    message: e.to_string(),
                }
            }
            Err(payload) => {
                let e = WorkerError::Panicked(panic_message(payload.as_ref()));
                error!("{}", e);
                BatchEvent::Error {
                    message: format!("Critical job error: {}", e),
                }
            }
        };
        sink.emit(terminal);
    }

    fn run_batch(
        &self,
        request: &BatchRequest,
        control: &BatchControl,
        sink: &dyn EventSink,
    ) -> Result<BatchEvent, WorkerError> {
        if !request.is_rerun {
            clear_review_files(&self.config.directories.review);
        }

        let files = request.inputs.resolve()?;
        let total = files.len();
        info!("Starting batch of {} files", total);
        sink.emit(BatchEvent::Log {
            level: LogLevel::Info,
            message: format!("Found {} files.", total),
        });

        let progress = SinkProgress::new(sink);
        let mut state = BatchRunState::new(total);

        for (index, path) in files.into_iter().enumerate() {
            if control.is_cancelled() || !control.wait_while_paused() {
                return Ok(cancelled(state, sink));
            }

            sink.emit(BatchEvent::Progress {
                current: index + 1,
                total,
            });
            let job = DocumentJob::new(path).for_rerun(request.is_rerun);
            let result = self.pipeline.process(&job, &progress);
            state.record(result);
        }

        if control.is_cancelled() {
            return Ok(cancelled(state, sink));
        }

        sink.emit(BatchEvent::Status {
            phase: Phase::Saving,
            message: "Generating Excel report...".to_string(),
        });

        let output_dir = &self.config.directories.output;
        std::fs::create_dir_all(output_dir).map_err(|source| WorkerError::OutputDirectory {
            path: output_dir.clone(),
            source,
        })?;
        let output = output_dir.join(output_file_name(&request.template, chrono::Local::now()));

        let (results, summary) = state.into_results();
        let output_path = report::generate(
            &results,
            &output,
            &request.template,
            &self.config.spreadsheet,
        )?;

        info!("Batch complete: {}", summary.message().replace('\n', ", "));
        sink.emit(BatchEvent::Log {
            level: LogLevel::Success,
            message: format!(
                "Job complete. Report saved to: {}",
                output_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            ),
        });

        Ok(BatchEvent::Complete {
            output_path,
            results,
            summary,
        })
    }
}

fn cancelled(state: BatchRunState, sink: &dyn EventSink) -> BatchEvent {
    info!(
        "Batch cancelled after {} of {} files",
        state.processed_count(),
        state.total_files
    );
    sink.emit(BatchEvent::Log {
        level: LogLevel::Warning,
        message: "Job cancelled.".to_string(),
    });
    let (results, summary) = state.into_results();
    BatchEvent::Cancelled { results, summary }
}

/// `Processed_<template stem>_<YYYYmmdd-HHMMSS>.xlsx`
pub fn output_file_name<Tz: chrono::TimeZone>(template: &Path, now: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Processed_{}_{}.xlsx",
        stem_of(template),
        now.format("%Y%m%d-%H%M%S")
    )
}
