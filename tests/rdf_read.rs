use machine_readable_data::ingestion::rdf::{parse_graph, read_graph_from_path, PatternTerm, TriplePattern};
use machine_readable_data::ingestion::{read_from_path, ReadOptions, ReadOutput};
use machine_readable_data::pipeline::tabulate;
use machine_readable_data::types::Value;
use oxrdfio::RdfFormat;

const DWC: &str = "http://rs.tdwg.org/dwc/terms/";

fn dwc(term: &str) -> PatternTerm {
    PatternTerm::iri(&format!("{DWC}{term}")).unwrap()
}

#[test]
fn duplicate_triples_collapse() {
    let graph = read_graph_from_path("tests/fixtures/occurrences.ttl").unwrap();
    // 3 + 3 + 2 distinct statements; the repeated one is kept once.
    assert_eq!(graph.len(), 8);
}

#[test]
fn query_returns_one_binding_per_matching_triple() {
    let graph = read_graph_from_path("tests/fixtures/occurrences.ttl").unwrap();
    let pattern = TriplePattern::new(PatternTerm::var("?occurrence"), dwc("scientificName"), PatternTerm::var("name"));

    let solutions = graph.query(&pattern);
    assert_eq!(solutions.variables, vec!["occurrence".to_string(), "name".to_string()]);
    assert_eq!(solutions.len(), 3);

    let rs = solutions.to_record_set();
    let mut names: Vec<String> = rs
        .column_values("name")
        .map(|v| v.unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Erithacus rubecula", "Parus major", "Sitta europaea"]);
}

#[test]
fn bound_subject_and_typed_literals() {
    let graph = read_graph_from_path("tests/fixtures/occurrences.ttl").unwrap();
    let subject = PatternTerm::iri("http://example.org/occurrence/o2").unwrap();
    let solutions = graph.query(&TriplePattern::new(subject, dwc("individualCount"), PatternTerm::var("n")));

    assert_eq!(solutions.len(), 1);
    let rs = solutions.to_record_set();
    assert_eq!(rs.records()[0].get("n"), Some(&Value::Int64(12)));
}

#[test]
fn repeated_variable_requires_equal_terms() {
    let input = "<http://e/a> <http://e/p> <http://e/a> .\n<http://e/a> <http://e/p> <http://e/b> .\n";
    let graph = parse_graph(input.as_bytes(), RdfFormat::NTriples, None).unwrap();
    let pattern = TriplePattern::new(PatternTerm::var("x"), PatternTerm::var("p"), PatternTerm::var("x"));
    assert_eq!(graph.query(&pattern).len(), 1);
}

#[test]
fn syntax_error_is_reported() {
    let err = parse_graph("<http://e/a> <http://e/p> .".as_bytes(), RdfFormat::NTriples, None);
    assert!(err.is_err());
}

#[test]
fn graph_is_not_a_table() {
    let out = read_from_path("tests/fixtures/occurrences.ttl", &ReadOptions::default()).unwrap();
    assert!(matches!(out, ReadOutput::Graph(_)));
    assert_eq!(out.row_count(), 8);
    assert!(tabulate(out).is_err());
}
