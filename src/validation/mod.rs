//! XML validation against an XSD or DTD schema descriptor.
//!
//! Validation answers one question, does the document conform, as a [`Verdict`]. The checking
//! itself is done by libxml2 through the `libxml` crate; this module only chooses the validator
//! and maps its outcome. A document that is not well formed does not conform. Only a schema
//! descriptor that libxml2 cannot compile is an error.

use std::fmt;
use std::fs;
use std::os::raw::c_int;
use std::path::Path;
use std::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use libxml::bindings;
use libxml::error::StructuredError;
use libxml::parser::{Parser, ParserOptions, XmlParseError};
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use libxml::tree::Document;
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, FormatResult};

/// `XML_CHAR_ENCODING_NONE`: let libxml2 detect the encoding.
const DETECT_ENCODING: bindings::xmlCharEncoding = 0;

// libxml2 keeps process-wide parser state, so calls into it are serialized.
static LIBXML: Mutex<()> = Mutex::new(());

/// The schema a document is checked against.
///
/// The descriptor text is handed to libxml2 untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaDescriptor {
    /// XSD document text.
    Xsd(String),
    /// DTD text (external subset syntax).
    Dtd(String),
}

impl SchemaDescriptor {
    /// Load a descriptor from a `.xsd` or `.dtd` file.
    pub fn from_path(path: impl AsRef<Path>) -> FormatResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        let text = fs::read_to_string(path)?;
        match ext.as_deref() {
            Some("xsd") => Ok(Self::Xsd(text)),
            Some("dtd") => Ok(Self::Dtd(text)),
            _ => Err(FormatError::invalid_schema(format!(
                "cannot infer schema language from path ({})",
                path.display()
            ))),
        }
    }
}

/// Outcome of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The document is well formed and conforms to the schema.
    Valid,
    /// The document is malformed or breaks at least one schema constraint.
    NotValid,
}

impl Verdict {
    /// Returns `true` for [`Verdict::Valid`].
    pub fn is_valid(self) -> bool {
        self == Verdict::Valid
    }

    fn from_violations(violations: &[String]) -> Self {
        if violations.is_empty() {
            tracing::debug!("document is valid");
            Verdict::Valid
        } else {
            for v in violations {
                tracing::debug!(violation = %v, "document is not valid");
            }
            Verdict::NotValid
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid => f.write_str("Valid!"),
            Verdict::NotValid => f.write_str("Not valid!"),
        }
    }
}

/// Validate `document` against `schema`.
pub fn validate(document: &str, schema: &SchemaDescriptor) -> FormatResult<Verdict> {
    let _guard = lock_libxml();
    // The schema is compiled first so a broken schema is reported even for a broken document.
    match schema {
        SchemaDescriptor::Xsd(text) => {
            let mut xsd = compile_xsd(text)?;
            let Some(doc) = parse_or_reject(Parser::default().parse_string_with_options(document, parser_options()))
            else {
                return Ok(Verdict::NotValid);
            };
            let violations = match xsd.validate_document(&doc) {
                Ok(()) => Vec::new(),
                Err(errors) => messages(&errors),
            };
            Ok(Verdict::from_violations(&violations))
        }
        SchemaDescriptor::Dtd(text) => {
            let dtd = ExternalDtd::parse(text)?;
            let Some(doc) = parse_or_reject(Parser::default().parse_string_with_options(document, parser_options()))
            else {
                return Ok(Verdict::NotValid);
            };
            // SAFETY: both pointers are owned by live values for the duration of the call.
            let valid = run_validity_check(|ctxt| unsafe { bindings::xmlValidateDtd(ctxt, doc.doc_ptr(), dtd.0) })?;
            Ok(dtd_verdict(valid))
        }
    }
}

/// Validate `document` against the DTD named by its own DOCTYPE.
///
/// The internal subset is used as is; a `SYSTEM` identifier is resolved relative to the working
/// directory. A document without a DOCTYPE has nothing to validate against, which is an error.
pub fn validate_embedded(document: &str) -> FormatResult<Verdict> {
    let _guard = lock_libxml();
    let Some(doc) = parse_or_reject(Parser::default().parse_string_with_options(document, parser_options())) else {
        return Ok(Verdict::NotValid);
    };
    check_against_doctype(&doc, "document")
}

/// Validate an XML file against its DOCTYPE: the external `SYSTEM` DTD (resolved relative to the
/// file) together with the internal subset, either of which may be absent.
pub fn validate_embedded_from_path(path: impl AsRef<Path>) -> FormatResult<Verdict> {
    let path = path.as_ref();
    // Surface a missing file as an I/O error rather than a malformed document.
    fs::metadata(path)?;
    let name = path
        .to_str()
        .ok_or_else(|| FormatError::invalid_document(format!("path is not UTF-8 ({})", path.display())))?;

    let _guard = lock_libxml();
    let Some(doc) = parse_or_reject(Parser::default().parse_file_with_options(name, parser_options())) else {
        return Ok(Verdict::NotValid);
    };
    check_against_doctype(&doc, name)
}

/// Validate an XML file against a schema file (`.xsd` or `.dtd`).
pub fn validate_path(document: impl AsRef<Path>, schema: impl AsRef<Path>) -> FormatResult<Verdict> {
    let schema = SchemaDescriptor::from_path(schema)?;
    let text = fs::read_to_string(document)?;
    validate(&text, &schema)
}

fn lock_libxml() -> MutexGuard<'static, ()> {
    LIBXML.lock().unwrap_or_else(PoisonError::into_inner)
}

fn parser_options() -> ParserOptions<'static> {
    ParserOptions {
        recover: false,
        no_net: true,
        ..ParserOptions::default()
    }
}

fn parse_or_reject(parsed: Result<Document, XmlParseError>) -> Option<Document> {
    match parsed {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::debug!(error = ?e, "document is not well formed");
            None
        }
    }
}

fn compile_xsd(text: &str) -> FormatResult<SchemaValidationContext> {
    let mut parser = SchemaParserContext::from_buffer(text);
    SchemaValidationContext::from_parser(&mut parser).map_err(|errors| {
        let detail = messages(&errors).into_iter().next().unwrap_or_default();
        FormatError::invalid_schema(format!("xsd could not be compiled: {detail}"))
    })
}

fn messages(errors: &[StructuredError]) -> Vec<String> {
    errors
        .iter()
        .map(|e| e.message.as_deref().unwrap_or("unspecified error").trim().to_string())
        .collect()
}

fn check_against_doctype(doc: &Document, origin: &str) -> FormatResult<Verdict> {
    // SAFETY: the document pointer stays valid while `doc` is borrowed.
    let subset = unsafe { bindings::xmlGetIntSubset(doc.doc_ptr()) };
    if subset.is_null() {
        return Err(FormatError::invalid_schema(format!("{origin} has no DOCTYPE")));
    }
    // xmlValidateDocument loads a SYSTEM subset itself, relative to the document URL.
    // SAFETY: as above.
    let valid = run_validity_check(|ctxt| unsafe { bindings::xmlValidateDocument(ctxt, doc.doc_ptr()) })?;
    Ok(dtd_verdict(valid))
}

fn dtd_verdict(valid: bool) -> Verdict {
    if valid {
        Verdict::from_violations(&[])
    } else {
        Verdict::from_violations(&["document does not conform to its dtd".to_string()])
    }
}

fn run_validity_check(check: impl FnOnce(bindings::xmlValidCtxtPtr) -> c_int) -> FormatResult<bool> {
    // SAFETY: a fresh context is freed below and never escapes this function.
    let ctxt = unsafe { bindings::xmlNewValidCtxt() };
    if ctxt.is_null() {
        return Err(FormatError::invalid_schema("libxml2 could not allocate a validation context"));
    }
    let outcome = check(ctxt);
    // SAFETY: `ctxt` came from xmlNewValidCtxt and is freed exactly once.
    unsafe { bindings::xmlFreeValidCtxt(ctxt) };
    Ok(outcome == 1)
}

/// A DTD compiled by libxml2 from descriptor text.
struct ExternalDtd(bindings::xmlDtdPtr);

impl ExternalDtd {
    fn parse(text: &str) -> FormatResult<Self> {
        let len = c_int::try_from(text.len()).map_err(|_| FormatError::invalid_schema("dtd is too large"))?;
        // SAFETY: libxml2 copies `text` into the input buffer, and xmlIOParseDTD takes ownership of
        // that buffer whether or not parsing succeeds.
        let dtd = unsafe {
            let input = bindings::xmlParserInputBufferCreateMem(text.as_ptr().cast(), len, DETECT_ENCODING);
            if input.is_null() {
                return Err(FormatError::invalid_schema("libxml2 could not buffer the dtd"));
            }
            bindings::xmlIOParseDTD(ptr::null_mut(), input, DETECT_ENCODING)
        };
        if dtd.is_null() {
            return Err(FormatError::invalid_schema("dtd could not be parsed"));
        }
        Ok(Self(dtd))
    }
}

impl Drop for ExternalDtd {
    fn drop(&mut self) {
        // SAFETY: the pointer came from xmlIOParseDTD and is not attached to any document.
        unsafe { bindings::xmlFreeDtd(self.0) };
    }
}
