use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("leadpay"));
    cmd.env_remove("RUST_LOG")
        .arg("--seed")
        .arg("tests/fixtures/dataset.json")
        .arg("--db-path")
        .arg(dir.path().join("some_db"))
        .arg("run")
        .arg("1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"pay_period_id\":1"))
        .stderr(predicate::str::contains("Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("leadpay"));
    cmd.env_remove("RUST_LOG")
        .arg("--seed")
        .arg("tests/fixtures/dataset.json")
        .arg("--db-path")
        .arg(&db_path)
        .arg("run")
        .arg("1");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
