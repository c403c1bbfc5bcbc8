//! Format adapters.
//!
//! Most callers should use [`read_from_path`] (from [`unified`]) which:
//!
//! - auto-detects the format by file extension (or you can override via [`ReadOptions`])
//! - dispatches to the adapter and returns its output as a [`ReadOutput`]
//! - optionally reports success/failure/alerts to a [`ReadObserver`]
//!
//! Format-specific functions are also available under:
//! - [`delimited`] (CSV, TSV)
//! - [`paginated`] (PDF text layer)
//! - [`docx`]
//! - [`xml`]
//! - [`json`]
//! - [`rdf`]
//! - [`parquet`]
//! - `excel` (feature `excel`)

pub mod delimited;
pub mod docx;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod observability;
pub mod paginated;
pub mod parquet;
pub mod rdf;
pub mod unified;
pub mod xml;

pub use delimited::DelimitedOptions;
pub use json::{JsonOptions, JsonOrient};
pub use observability::{
    CompositeObserver, JsonLinesObserver, ReadContext, ReadFinding, ReadObserver, ReadSeverity, ReadStats,
    TracingObserver,
};
pub use paginated::{PageScope, PaginatedOptions};
pub use unified::{read_from_path, ExcelSheetSelection, ReadFormat, ReadOptions, ReadOutput, ReadRequest};
pub use xml::{XmlOptions, XmlTable};
