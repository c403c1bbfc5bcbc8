//! `machine-readable-data` shows, through runnable adapters, what separates machine-readable
//! tabular formats from formats that only look tabular.
//!
//! Data flows through one linear pipeline:
//!
//! 1. **Read** ([`ingestion`]): a format adapter turns a file into a [`types::RecordSet`] (or
//!    per-page record sets, a DOCX content bundle, a raw JSON tree, an RDF graph).
//! 2. **Normalize** ([`normalize`]): repair header/data misclassification, multi-line headers,
//!    stray control characters and line terminators; enforce a uniform key set; optionally type
//!    the columns.
//! 3. **Export** ([`export`]): write CSV, TSV, JSON, fixed-width text or XML.
//!
//! XML documents can additionally be checked against an XSD or DTD by [`validation`], which
//! delegates to libxml2.
//!
//! ## Formats (auto-detected by extension)
//!
//! - **Delimited text**: `.csv`, `.tsv` / `.tab`
//! - **Paginated text** (the text layer of a PDF, pages separated by form feeds): `.txt`
//! - **Word documents**: `.docx`
//! - **XML**: `.xml`
//! - **JSON**: `.json`, `.ndjson`
//! - **RDF**: `.ttl`, `.nt`, `.nq`, `.trig`, `.n3`, `.rdf`
//! - **Parquet**: `.parquet`, `.pq`
//! - **Excel/workbooks** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//!
//! Misconfigured reads do not fail. A semicolon file read with `,` returns one column per line;
//! a multi-page table read per page loses a data row to every continuation page's "header".
//! These silent misparses are part of what the crate demonstrates.
//!
//! ## Quick example: CSV to JSON
//!
//! ```no_run
//! use machine_readable_data::export::{write_to_path, ExportOptions};
//! use machine_readable_data::ingestion::{read_from_path, ReadOptions};
//! use machine_readable_data::normalize::{normalize, NormalizeOptions};
//!
//! # fn main() -> Result<(), machine_readable_data::FormatError> {
//! let table = read_from_path("occurrences.csv", &ReadOptions::default())?
//!     .into_records()
//!     .expect("csv reads into one table");
//! let table = normalize(table, &NormalizeOptions::default())?;
//! write_to_path(&table, "occurrences.json", &ExportOptions::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Validation
//!
//! ```no_run
//! use machine_readable_data::validation::{validate_path, Verdict};
//!
//! # fn main() -> Result<(), machine_readable_data::FormatError> {
//! let verdict = validate_path("occurrences.xml", "occurrences.xsd")?;
//! println!("{verdict}");
//! assert_eq!(verdict, Verdict::Valid);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified read entrypoint, format adapters, observers
//! - [`normalize`]: record set repair
//! - [`export`]: writers
//! - [`validation`]: XSD / DTD validation
//! - [`pipeline`]: read → normalize → export as one request
//! - [`types`]: record set and value types
//! - [`markup`]: element tree shared by the XML-based adapters
//! - [`error`]: error types
//!
//! The library emits `tracing` events and never installs a subscriber.

pub mod error;
pub mod export;
pub mod ingestion;
pub mod markup;
pub mod normalize;
pub mod pipeline;
pub mod types;
pub mod validation;

pub use error::{FormatError, FormatResult};
