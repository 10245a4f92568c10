use std::process::Command;

use pretty_assertions::assert_eq;

fn kestrel(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kestrel"));
    cmd.current_dir(dir);
    cmd
}

#[test]
fn edits_file_and_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("in.txt"), "hello world\r\nsecond\r\n").unwrap();
    let out = kestrel(dir.path())
        .args(["in.txt", "--keys", "dwjA!<Esc>", "--output", "out.txt"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
    assert_eq!(text, "world\nsecond!\n");
}

#[test]
fn prints_to_stdout_and_status_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let out = kestrel(dir.path())
        .args(["--keys", "iab<Esc>u."])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "ab");
    let out = kestrel(dir.path()).args(["--keys", "u"]).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&out.stdout), "");
    assert_eq!(String::from_utf8_lossy(&out.stderr).trim(), "Already at oldest change");
}

#[test]
fn key_script_file_and_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("keys.txt"), "A<CR>x<Esc>\n").unwrap();
    std::fs::write(dir.path().join("k.toml"), "[editor]\nautoindent = true\n").unwrap();
    std::fs::write(dir.path().join("src.txt"), "    body").unwrap();
    let out = kestrel(dir.path())
        .args(["src.txt", "--keys-file", "keys.txt", "--config", "k.toml"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "    body\n    x");
}

#[test]
fn bad_notation_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = kestrel(dir.path())
        .args(["--keys", "<Nope>"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid key notation"));
}
