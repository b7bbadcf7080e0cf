//! Conformance tests that run YAML fixtures against httptap
//!
//! Run with: cargo test -p httptap-test --test conformance

use httptap_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));

    let fixtures = Fixture::from_yaml_multi(&yaml)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
    assert!(!fixtures.is_empty(), "{} has no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_first_match() {
    run_fixture_file("01_first_match.yaml");
}

#[test]
fn test_empty_sets() {
    run_fixture_file("02_empty_sets.yaml");
}

#[test]
fn test_header_matchers() {
    run_fixture_file("03_header_matchers.yaml");
}

#[test]
fn failing_expectation_is_reported() {
    let fixture = Fixture::from_yaml(
        r#"
name: wrong expectation
config:
  match_configs:
    - match_id: m1
      http_match_config:
        request_match_config:
          headers:
            - name: foo
              exact_match: bar
  output_config:
    sinks:
      - streaming_admin: {}
exchanges:
  - name: tapped but expected untapped
    request_headers: [["foo", "bar"]]
    expect: {}
"#,
    )
    .unwrap();

    let results = fixture.run();
    assert_eq!(results.len(), 1);
    assert!(!results[0].passed);
    assert_eq!(results[0].actual.as_ref().unwrap().match_id, "m1");
}
