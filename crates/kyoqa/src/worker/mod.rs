pub mod cleanup;
pub mod control;
pub mod events;
pub mod job;
pub mod runner;
pub mod scanner;
pub mod state;

pub use cleanup::{cleanup_temp_files, clear_review_files};
pub use control::BatchControl;
pub use events::{BatchEvent, EventSink};
pub use job::DocumentJob;
pub use runner::{output_file_name, BatchHandle, BatchRequest, BatchRunner, JobOutcome};
pub use scanner::InputSpec;
pub use state::{BatchRunState, RunSummary};

// Re-export crossbeam_channel for consumers of the event channel
pub use crossbeam_channel;
