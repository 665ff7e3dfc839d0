mod deadline;
mod engine;
mod error;
mod execute;
mod plan;
mod writer;

pub use deadline::Deadline;
pub use engine::{reconcile, ReconcileOptions, ReconciliationResult};
pub use error::{Phase, SyncError, SyncFailure};
pub use execute::{execute_sync, run_import};
pub use plan::{files_to_import, partition_survivors, SurvivorPartition};
pub use writer::{normalize_widths, write_rows, WriteError, WriteOutcome};
