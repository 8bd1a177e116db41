use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_options() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cheesebot"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--data"))
        .stdout(predicate::str::contains("--voice-channel"))
        .stdout(predicate::str::contains("--mute"));
}

#[test]
fn answers_console_commands_and_mentions() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cheesebot"));
    cmd.args(["--mute", "--data"])
        .arg(dir.path())
        .write_stdin(
            "🧀 phrase-add odan \"Say cheese\"\n\
             🧀 config-get phrase_set\n\
             hey @cheesebot\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Added the phrase to set `odan`."))
        .stdout(predicate::str::contains(
            "Effective value for config `phrase_set` at level 0: `odan`",
        ))
        .stdout(predicate::str::contains("Say cheese"));

    assert!(dir.path().join("storage.json").exists());
}

#[test]
fn voice_channel_override_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    Command::new(assert_cmd::cargo::cargo_bin!("cheesebot"))
        .args(["--mute", "--voice-channel", "Cellar", "--data"])
        .arg(dir.path())
        .write_stdin("🧀 config-get voice_channel\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("`Cellar`"));
}
