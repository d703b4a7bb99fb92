pub mod config;
pub mod enumerate;
pub mod error;
pub mod fetch;
pub mod inspect;
pub mod lookup;
pub mod models;
pub mod segment;
pub mod snapshot;
pub mod telemetry;

pub use config::{InspectConfig, InspectMode, OutputFormat};
pub use enumerate::{enumerate, OrdinalRange, RangeWindow};
pub use error::{FetchFailure, LookupError, Result, SegscopeError};
pub use fetch::{fetch, fetch_many, FetchedDocument};
pub use inspect::{run_inspection, BatchPhase, BatchSummary, Inspector, Renderer};
pub use lookup::{lookup, lookup_key, LookupKey, LookupOutcome};
pub use models::*;
pub use segment::{IndexWriter, Ordinal};
pub use snapshot::{IndexSnapshot, SnapshotStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
