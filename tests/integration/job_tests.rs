use rowdupe::job::{JobRequest, JobResponse, JobRunner};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_job_from_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.csv");
    fs::write(&path, "Name,Email\nAlice,a@x.com\nBob,b@x.com\nAlice,a@x.com\n").unwrap();

    let response = JobRunner::with_defaults().run(JobRequest::path(&path, "Email"));

    match response {
        JobResponse::Success {
            duplicates,
            diagnostics,
        } => {
            assert_eq!(duplicates.len(), 1);
            let group = &duplicates[0];
            assert_eq!(group["Email"], "a@x.com");
            assert_eq!(group["rows"].as_array().unwrap().len(), 2);
            assert!(diagnostics.is_empty());
        }
        JobResponse::Failure(f) => panic!("Unexpected failure: {} ({})", f.error, f.details),
    }
    // Caller-owned files are never removed
    assert!(path.exists());
}

#[test]
fn test_job_upload_reports_diagnostics() {
    let upload = b"A,B\n1,2\nbroken\n1,2\n".to_vec();
    let response = JobRunner::with_defaults().run(JobRequest::upload(upload, ""));

    match response {
        JobResponse::Success {
            duplicates,
            diagnostics,
        } => {
            assert_eq!(duplicates.len(), 1);
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].record, 1);
            assert_eq!(diagnostics[0].line, 3);
        }
        JobResponse::Failure(f) => panic!("Unexpected failure: {}", f.error),
    }
}

#[test]
fn test_job_unknown_column_failure_document() {
    let response = JobRunner::with_defaults()
        .run(JobRequest::upload(b"Name,Email\nA,a\n".to_vec(), "Emial"));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["error"], "Columns not found: 'Emial'");
    assert_eq!(json["available_columns"], serde_json::json!(["Name", "Email"]));
    assert!(json["details"]
        .as_str()
        .unwrap()
        .contains("did you mean 'Email' for 'Emial'?"));
    assert!(json.get("duplicates").is_none());
}

#[test]
fn test_job_success_serializes_without_empty_diagnostics() {
    let response = JobRunner::with_defaults().run(JobRequest::upload(b"A\n1\n2\n".to_vec(), "A"));
    assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"duplicates":[]}"#);
}

#[test]
fn test_job_empty_upload_with_columns() {
    let response = JobRunner::with_defaults().run(JobRequest::upload(Vec::new(), "Email"));
    assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"duplicates":[]}"#);
}
