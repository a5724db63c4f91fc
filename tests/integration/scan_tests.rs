use rowdupe::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use std::fs;
use tempfile::tempdir;

const PEOPLE: &str = "Name,Email,City\n\
Alice,a@x.com,Paris\n\
Bob,b@x.com,Rome\n\
Alice,a@x.com,Oslo\n\
Carol,c@x.com,Rome\n\
Bob,b@x.com,Rome\n";

fn write_csv(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.csv");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn test_scan_key_columns() {
    let (_dir, path) = write_csv(PEOPLE);
    let finder = DuplicateFinder::with_defaults();

    let report = finder.find_duplicates(&path, "Name,Email").unwrap();

    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.groups[0].indices(), vec![0, 2]);
    assert_eq!(report.groups[1].indices(), vec![1, 4]);
    assert_eq!(report.summary.rows_scanned, 5);
    assert_eq!(report.summary.duplicate_groups, 2);
    assert_eq!(report.summary.redundant_rows, 2);
}

#[test]
fn test_scan_full_row() {
    let (_dir, path) = write_csv(PEOPLE);
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&path, "")
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].indices(), vec![1, 4]);
    assert!(report.selection.is_full_row());
}

#[test]
fn test_scan_no_duplicates() {
    let (_dir, path) = write_csv("A,B\n1,2\n3,4\n5,6\n");
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&path, "A")
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.unique_keys, 3);
}

#[test]
fn test_scan_header_only() {
    let (_dir, path) = write_csv("A,B\n");
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&path, "A")
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_records, 0);
}

#[test]
fn test_scan_empty_file() {
    let (_dir, path) = write_csv("");
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&path, "")
        .unwrap();

    assert!(report.groups.is_empty());
    assert!(report.header.is_empty());
}

#[test]
fn test_scan_empty_file_with_columns() {
    let (_dir, path) = write_csv("");
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&path, "Name,Email")
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(
        rowdupe::output::JsonOutput::new(&report).to_json().unwrap(),
        r#"{"duplicates":[]}"#
    );
}

#[test]
fn test_scan_header_only_still_validates() {
    let (_dir, path) = write_csv("A,B\n");
    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&path, "Email")
        .unwrap_err();
    assert!(matches!(err, FinderError::Schema(_)));
}

#[test]
fn test_scan_unknown_column_before_rows() {
    let (_dir, path) = write_csv(PEOPLE);
    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&path, "Name,Emial")
        .unwrap_err();

    match err {
        FinderError::Schema(e) => {
            assert_eq!(e.unknown, vec!["Emial".to_owned()]);
            assert_eq!(e.available, vec!["Name", "Email", "City"]);
            assert!(e.details().contains("did you mean 'Email'"));
        }
        other => panic!("Expected schema error, got {other:?}"),
    }
}

#[test]
fn test_scan_missing_file() {
    let dir = tempdir().unwrap();
    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&dir.path().join("absent.csv"), "")
        .unwrap_err();
    assert!(matches!(err, FinderError::Input(_)));
}

#[test]
fn test_scan_directory_is_rejected() {
    let dir = tempdir().unwrap();
    let err = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path(), "")
        .unwrap_err();
    assert!(matches!(err, FinderError::Input(_)));
}

#[test]
fn test_scan_semicolon_delimiter() {
    let (_dir, path) = write_csv("A;B\n1;x\n1;y\n");
    let finder = DuplicateFinder::new(FinderConfig::default().with_delimiter(b';'));

    let report = finder.find_duplicates(&path, "A").unwrap();
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].rows[1].values, vec!["1", "y"]);
}

#[test]
fn test_scan_skips_malformed_rows() {
    let (_dir, path) = write_csv("A,B\n1,2\n1\n1,2\n1,2,3\n");
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&path, "A")
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].indices(), vec![0, 1]);
    assert_eq!(report.diagnostics.len(), 2);
    assert_eq!(report.diagnostics[0].line, 3);
    assert_eq!(report.diagnostics[1].line, 5);
    assert_eq!(report.summary.total_records, 4);
    assert_eq!(report.summary.skipped_rows, 2);
}

#[test]
fn test_sharded_scan_matches_sequential() {
    let mut data = String::from("id,group\n");
    for i in 0..500 {
        data.push_str(&format!("{},{}\n", i, i % 37));
    }
    let (_dir, path) = write_csv(&data);

    let sequential = DuplicateFinder::with_defaults()
        .find_duplicates(&path, "group")
        .unwrap();
    let sharded = DuplicateFinder::new(FinderConfig::default().with_shards(8))
        .find_duplicates(&path, "group")
        .unwrap();

    let seq: Vec<Vec<usize>> = sequential.groups.iter().map(|g| g.indices()).collect();
    let par: Vec<Vec<usize>> = sharded.groups.iter().map(|g| g.indices()).collect();
    assert_eq!(seq, par);
    assert_eq!(seq.len(), 37);
    assert_eq!(sharded.summary.shards, 8);
}

#[test]
fn test_file_left_in_place() {
    let (_dir, path) = write_csv(PEOPLE);
    DuplicateFinder::with_defaults()
        .find_duplicates(&path, "Name")
        .unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), PEOPLE);
}
