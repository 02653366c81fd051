//! Classification and placement engine for ShapeSort.
//!
//! Images are classified by orientation and nearest standard aspect ratio,
//! then moved to `<destination>/<Orientation>/<AspectCategory>/<n>.<ext>`
//! with a per-folder sequence number. Every move is appended to a plain-text
//! log owned by a [`Ledger`], which also tracks the run summary.

pub mod aspect_ratio;
pub mod config;
pub mod inspector;
pub mod ledger;
pub mod placement;
pub mod progress;
pub mod reporting;
pub mod sequence;
pub mod sorter;

pub use aspect_ratio::{classify, AspectCategory, ClassifyError, Orientation};
pub use config::{
    default_log_path, validate_directory, ConfigError, FailurePolicy, SortConfig,
    SUPPORTED_EXTENSIONS,
};
pub use inspector::{FileInspector, ImageDescriptor, ImageInspector, InspectError};
pub use ledger::{FailedFile, Ledger, LedgerError, MemoryLedger, MoveLedger, MoveRecord, RunSummary};
pub use placement::{move_file, PlacementEngine, PlacementError};
pub use reporting::{format_summary, print_summary, write_json, ReportingError};
pub use sequence::{AllocationError, CountingAllocator, NameAllocator, ScanningAllocator};
pub use sorter::{list_entries, sort_images, SortError};
