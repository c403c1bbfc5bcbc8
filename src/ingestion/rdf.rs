//! RDF adapter: parse a serialization into a [`Graph`] and match triple patterns against it.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use oxrdf::vocab::xsd;
use oxrdf::{NamedNode, Term, Triple, TripleRef};
use oxrdfio::{RdfFormat, RdfParser};

use crate::error::{FormatError, FormatResult};
use crate::types::{Record, RecordSet, Value};

/// A set of triples; duplicates in the source collapse.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: oxrdf::Graph,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: &Triple) -> bool {
        self.inner.insert(triple)
    }

    /// Number of distinct triples.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the graph has no triples.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate the triples.
    pub fn iter(&self) -> impl Iterator<Item = TripleRef<'_>> {
        self.inner.iter()
    }

    /// Match a triple pattern, returning one solution per matching triple.
    ///
    /// A variable repeated in the pattern only matches triples where both positions hold the
    /// same term.
    pub fn query(&self, pattern: &TriplePattern) -> Solutions {
        let variables = pattern.variables();
        let mut rows = Vec::new();
        for t in self.inner.iter() {
            let terms = [
                Term::from(t.subject.into_owned()),
                Term::from(t.predicate.into_owned()),
                t.object.into_owned(),
            ];
            let mut binding: IndexMap<&str, Term> = IndexMap::new();
            let matched = pattern
                .positions()
                .iter()
                .zip(terms)
                .all(|(p, term)| match p {
                    PatternTerm::Bound(expected) => *expected == term,
                    PatternTerm::Variable(name) => match binding.get(name.as_str()) {
                        Some(prev) => *prev == term,
                        None => {
                            binding.insert(name.as_str(), term);
                            true
                        }
                    },
                });
            if matched {
                rows.push(variables.iter().map(|v| binding[v.as_str()].clone()).collect());
            }
        }
        Solutions { variables, rows }
    }
}

/// One position of a [`TriplePattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternTerm {
    /// Unbound; the name without a leading `?`.
    Variable(String),
    /// Fixed term.
    Bound(Term),
}

impl PatternTerm {
    /// A variable.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into().trim_start_matches('?').to_string())
    }

    /// A fixed IRI.
    pub fn iri(iri: &str) -> FormatResult<Self> {
        Ok(Self::Bound(NamedNode::new(iri)?.into()))
    }
}

impl From<Term> for PatternTerm {
    fn from(t: Term) -> Self {
        Self::Bound(t)
    }
}

impl From<NamedNode> for PatternTerm {
    fn from(n: NamedNode) -> Self {
        Self::Bound(n.into())
    }
}

/// A subject/predicate/object pattern with any subset of positions fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
    /// Subject position.
    pub subject: PatternTerm,
    /// Predicate position.
    pub predicate: PatternTerm,
    /// Object position.
    pub object: PatternTerm,
}

impl TriplePattern {
    /// Create a pattern.
    pub fn new(
        subject: impl Into<PatternTerm>,
        predicate: impl Into<PatternTerm>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    fn positions(&self) -> [&PatternTerm; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    /// Distinct variable names in subject, predicate, object order.
    pub fn variables(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for p in self.positions() {
            if let PatternTerm::Variable(name) = p {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
        }
        out
    }
}

/// Bindings produced by [`Graph::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solutions {
    /// Variable names, one per column.
    pub variables: Vec<String>,
    /// One row of terms per solution, aligned with `variables`.
    pub rows: Vec<Vec<Term>>,
}

impl Solutions {
    /// Number of solutions.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tabulate the bindings: one column per variable.
    ///
    /// IRIs become their string form, typed literals become typed values.
    pub fn to_record_set(&self) -> RecordSet {
        let mut out = RecordSet::with_columns(self.variables.clone());
        for row in &self.rows {
            let record: Record = self
                .variables
                .iter()
                .zip(row)
                .map(|(v, term)| (v.clone(), value_from_term(term)))
                .collect();
            out.push(record);
        }
        out
    }
}

impl fmt::Display for Solutions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let cells: Vec<String> = self
                .variables
                .iter()
                .zip(row)
                .map(|(v, t)| format!("?{v}={t}"))
                .collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// Convert an RDF term into a cell.
pub fn value_from_term(term: &Term) -> Value {
    match term {
        Term::NamedNode(n) => Value::Utf8(n.as_str().to_string()),
        Term::Literal(l) => {
            let dt = l.datatype();
            let lexical = l.value();
            if dt == xsd::INTEGER || dt == xsd::INT || dt == xsd::LONG {
                lexical.parse().map(Value::Int64).unwrap_or_else(|_| Value::from(lexical))
            } else if dt == xsd::DECIMAL || dt == xsd::DOUBLE || dt == xsd::FLOAT {
                lexical.parse().map(Value::Float64).unwrap_or_else(|_| Value::from(lexical))
            } else if dt == xsd::BOOLEAN {
                match lexical {
                    "true" | "1" => Value::Bool(true),
                    "false" | "0" => Value::Bool(false),
                    _ => Value::from(lexical),
                }
            } else {
                Value::from(lexical)
            }
        }
        other => Value::Utf8(other.to_string()),
    }
}

/// Guess the serialization from a file extension (`ttl`, `nt`, `nq`, `trig`, `n3`, `rdf`, ...).
pub fn rdf_format_from_extension(ext: &str) -> Option<RdfFormat> {
    match ext.to_ascii_lowercase().as_str() {
        "xml" | "owl" => Some(RdfFormat::RdfXml),
        other => RdfFormat::from_extension(other),
    }
}

/// Parse a serialization from a reader.
pub fn parse_graph<R: Read>(reader: R, format: RdfFormat, base_iri: Option<&str>) -> FormatResult<Graph> {
    let mut parser = RdfParser::from_format(format);
    if let Some(base) = base_iri {
        parser = parser.with_base_iri(base)?;
    }
    let mut graph = Graph::new();
    for quad in parser.for_reader(reader) {
        let quad = quad?;
        // Named graphs collapse into one triple set.
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    tracing::debug!(triples = graph.len(), ?format, "parsed rdf graph");
    Ok(graph)
}

/// Parse an RDF file, guessing the format from its extension.
pub fn read_graph_from_path(path: impl AsRef<Path>) -> FormatResult<Graph> {
    let path = path.as_ref();
    let format = path
        .extension()
        .and_then(|s| s.to_str())
        .and_then(rdf_format_from_extension)
        .ok_or_else(|| {
            FormatError::schema_mismatch(format!(
                "cannot infer rdf serialization from path ({})",
                path.display()
            ))
        })?;
    read_graph_from_path_as(path, format)
}

/// Parse an RDF file with an explicit serialization.
pub fn read_graph_from_path_as(path: impl AsRef<Path>, format: RdfFormat) -> FormatResult<Graph> {
    let file = File::open(path)?;
    parse_graph(BufReader::new(file), format, None)
}

/// Fetch and parse an RDF document over HTTP(S).
///
/// The serialization comes from the response `Content-Type`, falling back to the URL extension.
/// The URL is used as base IRI.
#[cfg(feature = "remote")]
pub fn fetch_graph(url: &str) -> FormatResult<Graph> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let from_media_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(RdfFormat::from_media_type);
    let format = from_media_type
        .or_else(|| {
            url.rsplit('/')
                .next()
                .and_then(|last| last.rsplit_once('.'))
                .and_then(|(_, ext)| rdf_format_from_extension(ext))
        })
        .ok_or_else(|| FormatError::schema_mismatch(format!("cannot infer rdf serialization for {url}")))?;
    let body = response.bytes()?;
    parse_graph(body.as_ref(), format, Some(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: &str = r#"
@prefix ex: <http://example.org/> .
ex:o1 ex:name "Parus major" ; ex:count 4 .
ex:o2 ex:name "Sitta europaea" ; ex:count 2 .
ex:o1 ex:name "Parus major" .
ex:o3 ex:sameAs ex:o3 .
"#;

    fn graph() -> Graph {
        parse_graph(TTL.as_bytes(), RdfFormat::Turtle, None).unwrap()
    }

    #[test]
    fn duplicate_triples_collapse() {
        assert_eq!(graph().len(), 5);
    }

    #[test]
    fn repeated_variable_must_bind_same_term() {
        let g = graph();
        let pattern = TriplePattern::new(PatternTerm::var("x"), PatternTerm::var("p"), PatternTerm::var("x"));
        let solutions = g.query(&pattern);
        assert_eq!(solutions.variables, vec!["x", "p"]);
        assert_eq!(solutions.len(), 1);
    }

    #[test]
    fn typed_literals_become_typed_values() {
        let g = graph();
        let pattern = TriplePattern::new(
            PatternTerm::var("s"),
            PatternTerm::iri("http://example.org/count").unwrap(),
            PatternTerm::var("n"),
        );
        let rs = g.query(&pattern).to_record_set();
        let mut counts: Vec<Value> = rs.column_values("n").flatten().cloned().collect();
        counts.sort_by_key(|v| v.to_string());
        assert_eq!(counts, vec![Value::Int64(2), Value::Int64(4)]);
    }
}
