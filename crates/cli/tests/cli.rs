use assert_cmd::Command;

fn longbox() -> Command {
    let mut cmd = Command::cargo_bin("longbox").unwrap();
    cmd.env("LONGBOX_CONFIG_DIR", "/nonexistent/longbox-config")
        .env_remove("LONGBOX_ENV")
        .env_remove("PORT")
        .env_remove("MONGO_URI");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = longbox().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("config"));
}

#[test]
fn config_prints_defaults_as_json() {
    let output = longbox().arg("config").output().unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["server"]["port"], 5001);
    assert_eq!(settings["database"]["collection"], "books");
    assert_eq!(settings["inventory"]["max_page_size"], 100);
}

#[test]
fn port_variable_overrides_configured_port() {
    let output = longbox().env("PORT", "6060").arg("config").output().unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["server"]["port"], 6060);
}

#[test]
fn unknown_subcommand_fails() {
    longbox().arg("reindex").assert().failure();
}
