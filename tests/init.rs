use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_git2effort"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "git2effort init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".git2effort.toml");
    assert!(config_path.exists(), ".git2effort.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[effort]"));
    assert!(content.contains("[history]"));

    // Every key is commented out, so parsing yields the defaults.
    let config: git2effort_core::Git2EffortConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.effort, git2effort_core::EffortConfig::default());
    assert!(config.history.branch.is_none());
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".git2effort.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_git2effort"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".git2effort.toml")).unwrap();
    assert_eq!(content, "# existing");
}
