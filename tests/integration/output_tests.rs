use rowdupe::duplicates::{DuplicateFinder, ScanReport};
use rowdupe::error::StructuredError;
use rowdupe::output::json::write_failure;
use rowdupe::output::{CsvOutput, JsonOutput, TextOutput};
use serde_json::{json, Value};

const PEOPLE: &str = "Name,Email\nAlice,a@x.com\nBob,b@x.com\nAlice,a@x.com\n";

fn report(data: &str, columns: &str) -> ScanReport {
    DuplicateFinder::with_defaults()
        .find_duplicates_in_reader(data.as_bytes(), columns)
        .unwrap()
}

fn document(data: &str, columns: &str) -> Value {
    let json = JsonOutput::new(&report(data, columns)).to_json().unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_scenario_composite_key() {
    let doc = document(PEOPLE, "Name,Email");
    assert_eq!(
        doc,
        json!({
            "duplicates": [{
                "Name": "Alice",
                "Email": "a@x.com",
                "rows": [
                    {"Name": "Alice", "Email": "a@x.com"},
                    {"Name": "Alice", "Email": "a@x.com"}
                ]
            }]
        })
    );
}

#[test]
fn test_scenario_single_column_ignores_others() {
    let doc = document(PEOPLE, "Email");
    let groups = doc["duplicates"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["Email"], "a@x.com");
    assert!(groups[0].get("Name").is_none());
    assert_eq!(groups[0]["rows"].as_array().unwrap().len(), 2);
}

#[test]
fn test_scenario_partial_agreement() {
    let doc = document("A,B\n1,2\n1,3\n", "A");
    assert_eq!(
        doc["duplicates"][0]["rows"],
        json!([{"A": "1", "B": "2"}, {"A": "1", "B": "3"}])
    );
}

#[test]
fn test_scenario_no_groups() {
    for columns in ["A", "B", "A,B", ""] {
        assert_eq!(document("A,B\n1,2\n3,4\n", columns), json!({"duplicates": []}));
    }
}

#[test]
fn test_scenario_unknown_column_document() {
    let err = DuplicateFinder::with_defaults()
        .find_duplicates_in_reader(PEOPLE.as_bytes(), "Phone,Name,Fax")
        .unwrap_err();
    let mut buf = Vec::new();
    write_failure(&StructuredError::from_finder_error(&err), &mut buf, false).unwrap();

    let doc: Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(doc["error"], "Columns not found: 'Phone', 'Fax'");
    assert_eq!(doc["available_columns"], json!(["Name", "Email"]));
}

#[test]
fn test_scenario_short_row_skipped() {
    let doc = document("A,B\n1,2\n9\n1,2\n3,4\n", "");
    assert_eq!(doc["duplicates"].as_array().unwrap().len(), 1);
    assert_eq!(
        doc["diagnostics"],
        json!([{"record": 1, "line": 3, "reason": "expected 2 fields, found 1"}])
    );
}

#[test]
fn test_json_byte_identical_across_runs() {
    let data = "k,v\nb,1\na,2\nb,3\na,4\nc,5\n";
    let first = JsonOutput::new(&report(data, "k")).to_json_pretty().unwrap();
    for _ in 0..5 {
        assert_eq!(JsonOutput::new(&report(data, "k")).to_json_pretty().unwrap(), first);
    }
}

#[test]
fn test_csv_and_text_agree_on_groups() {
    yansi::disable();
    let r = report(PEOPLE, "Name");

    let csv = CsvOutput::new(&r).to_csv_string().unwrap();
    assert_eq!(csv.lines().count(), 3);

    let mut buf = Vec::new();
    TextOutput::new(&r).write_to(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("Group 1"));
    assert!(!text.contains("Group 2"));
}
