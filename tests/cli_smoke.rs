use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn yap_help_works() {
    Command::cargo_bin("yap")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("yet another planner"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["add", "list", "complete", "continue", "show", "edit"];

    for cmd in subcommands {
        Command::cargo_bin("yap")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn unknown_subcommand_is_rejected() {
    Command::cargo_bin("yap")
        .expect("binary")
        .arg("frobnicate")
        .assert()
        .failure()
        .code(2);
}
