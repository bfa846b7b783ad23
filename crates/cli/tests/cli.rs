use assert_cmd::Command;

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("agora")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["serve", "migrate", "promote"] {
        assert!(stdout.contains(sub), "missing subcommand {sub}");
    }
}

#[test]
fn promote_rejects_unknown_role() {
    Command::cargo_bin("agora")
        .unwrap()
        .args(["promote", "alice", "--role", "overlord"])
        .assert()
        .failure();
}
