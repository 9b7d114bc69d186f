use std::process::Command;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_rollsync").to_string()
}

#[test]
fn cli_signature_delta_patch_roundtrip() {
    let dir = tempdir().unwrap();
    let reference = dir.path().join("reference.bin");
    let source = dir.path().join("source.bin");
    let sig = dir.path().join("reference.sig");
    let delta = dir.path().join("source.delta");
    let output = dir.path().join("output.bin");

    std::fs::write(&reference, b"abcde12345abcde12345").unwrap();
    std::fs::write(&source, b"abcdeXXXXXabcde12345!").unwrap();

    let st = Command::new(bin())
        .args(["signature", "--block-size", "5"])
        .arg(&reference)
        .arg(&sig)
        .status()
        .unwrap();
    assert!(st.success());

    let st = Command::new(bin())
        .args(["delta", "--block-size", "5"])
        .arg(&sig)
        .arg(&source)
        .arg(&delta)
        .status()
        .unwrap();
    assert!(st.success());

    let st = Command::new(bin())
        .arg("patch")
        .arg(&reference)
        .arg(&delta)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(
        std::fs::read(&output).unwrap(),
        std::fs::read(&source).unwrap()
    );
}

#[test]
fn cli_refuses_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let sig = dir.path().join("in.sig");
    std::fs::write(&input, b"payload").unwrap();
    std::fs::write(&sig, b"already here").unwrap();

    let st = Command::new(bin())
        .arg("signature")
        .arg(&input)
        .arg(&sig)
        .status()
        .unwrap();
    assert!(!st.success());

    let st = Command::new(bin())
        .arg("--force")
        .arg("signature")
        .arg(&input)
        .arg(&sig)
        .status()
        .unwrap();
    assert!(st.success());
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
}

#[test]
fn cli_json_stats_on_stderr() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let sig = dir.path().join("in.sig");
    std::fs::write(&input, vec![9u8; 1024]).unwrap();

    let out = Command::new(bin())
        .arg("--json")
        .args(["signature", "--block-size", "256"])
        .arg(&input)
        .arg(&sig)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("\"block_count\":4"), "stderr: {stderr}");
}
