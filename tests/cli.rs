use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

fn propbind() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_propbind"));
    cmd.args(["--env-prefix", "PROPBIND_CLI_TEST_NOTHING"])
        .env("RUST_LOG", "info");
    cmd
}

#[test]
fn test_prints_bound_brands() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "application.mapOfBrands.acme.name=Acme\n\
         application.listOfBrands[0].name=First"
    )
    .unwrap();

    let output = propbind().arg("--config").arg(file.path()).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("Map of brands"));
    assert!(stdout.contains("Key: acme, value: Brand(id=<unset>, name=Acme"));
    assert!(stdout.contains("List of brands"));
    assert!(stdout.contains("Brand: Brand(id=<unset>, name=First"));
}

#[test]
fn test_malformed_date_exits_non_zero() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "application.mapOfBrands.acme.dateCreated=not-a-date").unwrap();

    let output = propbind().arg("--config").arg(file.path()).output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("startup failed"));
}

#[test]
fn test_missing_required_file_exits_non_zero() {
    let output = propbind()
        .args(["--config", "/nonexistent/application.properties"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_optional_flag_tolerates_missing_file() {
    let output = propbind()
        .args(["--config", "/nonexistent/application.properties", "--optional"])
        .output()
        .unwrap();
    assert!(output.status.success());
}
