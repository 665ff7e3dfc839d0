pub mod config;
pub mod folder;
pub mod locale;
pub mod parser;
pub mod reconciliation;
pub mod sheet;
pub mod status;
pub mod utils;

// Re-export commonly used types
pub use config::{read_config, ColumnSelection, ConfigError, DecimalSeparators, Delimiter, SyncConfig};
pub use folder::{
    enumerate_files, FileMap, FileTypeFilter, FolderError, FolderStore, LocalFolderStore,
    SourceFile,
};
pub use locale::LocaleNormalizer;
pub use parser::{parse_records, ParseError, ParseOptions};
pub use reconciliation::{
    execute_sync, reconcile, run_import, Deadline, Phase, ReconcileOptions, ReconciliationResult,
    SyncError, SyncFailure, WriteError,
};
pub use sheet::{CsvSheetStore, MemorySheetStore, Row, SheetError, SheetStore};
pub use status::{
    FileStatusStore, ImportStatus, MemoryStatusStore, StatusError, StatusReporter, StatusSink,
    StatusStore,
};
