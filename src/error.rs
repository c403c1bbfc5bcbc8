use thiserror::Error;

/// Convenience result type for reading, normalizing, exporting and validating.
pub type FormatResult<T> = Result<T, FormatError>;

/// Error type returned across the crate.
///
/// Library errors are wrapped unchanged; misconfigured reads (wrong delimiter, wrong scope) are
/// not errors and return a degraded result instead.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV/TSV read or write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parse or write error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML tokenizer error (not well formed, bad escape, mismatched end tag).
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP container error (DOCX).
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Parquet read error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// RDF syntax error.
    #[error("rdf error: {0}")]
    Rdf(#[from] oxrdfio::RdfParseError),

    /// Invalid base IRI supplied to an RDF parser.
    #[error("iri error: {0}")]
    Iri(#[from] oxrdf::IriParseError),

    #[cfg(feature = "remote")]
    /// HTTP fetch error (feature-gated behind `remote`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The input does not have the shape the operation needs (missing columns, wrong kind of
    /// output, unknown extension, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A schema descriptor (XSD or DTD) could not be understood.
    #[error("invalid schema descriptor: {message}")]
    InvalidSchema { message: String },

    /// The input parsed but is structurally unusable (e.g. a DOCX without a body).
    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    /// A column name is not a valid XML element name and the policy rejects it.
    #[error("'{name}' is not a valid xml element name")]
    InvalidName { name: String },
}

impl FormatError {
    pub(crate) fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }
}
