//! `billbook init` writes the config file without touching a database.

use std::process::Command;

fn billbook(config_home: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_billbook"));
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("BILLBOOK_DATABASE_URL")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn init_writes_config_and_refuses_to_overwrite() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("billbook").join("config.toml");

    let out = billbook(tmp.path())
        .args(["init", "--db-url", "postgresql://db.example:5432/bills"])
        .output()
        .unwrap();
    assert!(out.status.success(), "init failed: {out:?}");
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[database]"));
    assert!(contents.contains("postgresql://db.example:5432/bills"));

    let again = billbook(tmp.path())
        .args(["init", "--db-url", "postgresql://other/bills"])
        .output()
        .unwrap();
    assert!(!again.status.success());
    let stderr = String::from_utf8_lossy(&again.stderr);
    assert!(stderr.contains("already exists"), "unexpected stderr: {stderr}");

    let forced = billbook(tmp.path())
        .args(["init", "--db-url", "postgresql://other/bills", "--force"])
        .output()
        .unwrap();
    assert!(forced.status.success());
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("postgresql://other/bills"));
}

#[cfg(unix)]
#[test]
fn init_config_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::TempDir::new().unwrap();
    let out = billbook(tmp.path()).arg("init").output().unwrap();
    assert!(out.status.success());

    let meta = std::fs::metadata(tmp.path().join("billbook/config.toml")).unwrap();
    assert_eq!(meta.permissions().mode() & 0o777, 0o600);
}

#[test]
fn rejects_unknown_category() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = billbook(tmp.path())
        .args([
            "template", "add", "Rent", "--category", "castle", "--amount", "10", "--due-day", "5",
        ])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(2), "clap usage errors exit with 2");
}

#[test]
fn reset_without_confirmation_touches_nothing() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = billbook(tmp.path())
        .args(["reset", "--database-url", "postgresql://127.0.0.1:1/none"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--yes"), "unexpected stderr: {stderr}");
    assert!(!stderr.contains("connect"), "reset tried the database: {stderr}");
}
