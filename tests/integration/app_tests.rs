use clap::Parser;
use rowdupe::cli::Cli;
use rowdupe::error::ExitCode;
use rowdupe::run_with_output;
use serde_json::{json, Value};

const PEOPLE: &str = "Name,Email\nAlice,a@x.com\nBob,b@x.com\nAlice,a@x.com\n";

/// Run the app inside a jail so `ROWDUPE_*` variables set by other tests
/// cannot leak in. Returns the exit code (or error) and everything written.
fn run(files: &[(&str, &str)], args: &[&str]) -> (anyhow::Result<ExitCode>, String) {
    let mut result = None;
    figment::Jail::expect_with(|jail| {
        for (name, content) in files {
            jail.create_file(name, content)?;
        }
        let mut argv = vec!["rowdupe", "-q", "--no-color"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;

        let mut out = Vec::new();
        let code = run_with_output(cli, &mut out);
        result = Some((code, String::from_utf8_lossy(&out).into_owned()));
        Ok(())
    });
    result.expect("jail ran")
}

#[test]
fn test_check_json_success() {
    let (code, out) = run(&[("people.csv", PEOPLE)], &["check", "people.csv", "-c", "Email"]);

    assert_eq!(code.unwrap(), ExitCode::Success);
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["duplicates"][0]["Email"], "a@x.com");
    assert_eq!(doc["duplicates"][0]["rows"].as_array().unwrap().len(), 2);
}

#[test]
fn test_check_json_failure_written_to_output() {
    let (code, out) = run(&[("people.csv", PEOPLE)], &["check", "people.csv", "-c", "Phone"]);

    let err = code.unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["error"], "Columns not found: 'Phone'");
    assert_eq!(doc["available_columns"], json!(["Name", "Email"]));
}

#[test]
fn test_check_csv_failure_writes_nothing() {
    let (code, out) = run(&[], &["check", "absent.csv", "-o", "csv"]);
    assert!(code.is_err());
    assert!(out.is_empty());
}

#[test]
fn test_check_exit_codes() {
    let (code, _) = run(&[("u.csv", "A\n1\n2\n")], &["check", "u.csv"]);
    assert_eq!(code.unwrap(), ExitCode::NoDuplicates);

    let (code, out) = run(&[("p.csv", "A,B\n1,1\nx\n1,1\n")], &["check", "p.csv"]);
    assert_eq!(code.unwrap(), ExitCode::PartialSuccess);
    assert!(out.contains("\"diagnostics\""));
}

#[test]
fn test_check_text_output() {
    let (code, out) = run(
        &[("people.csv", PEOPLE)],
        &["check", "people.csv", "-c", "Name", "-o", "text"],
    );
    assert_eq!(code.unwrap(), ExitCode::Success);
    assert!(out.contains("Group 1 Name=\"Alice\" (2 rows)"));
}

#[test]
fn test_job_upload_from_cli() {
    let (code, out) = run(
        &[("people.csv", PEOPLE)],
        &["job", "people.csv", "-c", "Name,Email", "--upload"],
    );

    assert_eq!(code.unwrap(), ExitCode::Success);
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["duplicates"][0]["Name"], "Alice");
}

#[test]
fn test_job_failure_exit_code() {
    let (code, out) = run(&[("people.csv", PEOPLE)], &["job", "people.csv", "-c", "Emial"]);

    assert_eq!(code.unwrap(), ExitCode::GeneralError);
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["error"], "Columns not found: 'Emial'");
}

#[test]
fn test_job_no_duplicates_exit_code() {
    let (code, out) = run(&[("u.csv", "A\n1\n2\n")], &["job", "u.csv", "--upload"]);
    assert_eq!(code.unwrap(), ExitCode::NoDuplicates);
    assert_eq!(out.trim_end(), r#"{"duplicates":[]}"#);
}

#[test]
fn test_job_upload_missing_file() {
    let (code, out) = run(&[], &["job", "absent.csv", "--upload"]);
    assert!(code.is_err());
    assert!(out.is_empty());
}

#[test]
fn test_config_subcommand_prints_toml() {
    let (code, out) = run(&[], &["config"]);
    assert_eq!(code.unwrap(), ExitCode::Success);
    assert!(out.contains("job_timeout_secs = 60"));
    assert!(out.contains("delimiter = \",\""));
}

#[test]
fn test_config_file_applies_to_check() {
    let (code, out) = run(
        &[("rd.toml", "delimiter = \";\"\n"), ("semi.csv", "A;B\n1;2\n1;3\n")],
        &["--config", "rd.toml", "check", "semi.csv", "-c", "A"],
    );
    assert_eq!(code.unwrap(), ExitCode::Success);
    assert!(out.contains(r#""A":"1""#));
}
