// Allow deprecated APIs (assert_cmd::cargo_bin is deprecated but still works)
#![allow(deprecated)]

use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use rstest::rstest;
use std::fs;
use std::path::Path;
use std::process::Command; // Run programs
use tempfile::tempdir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_bundle_inline_text() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "src/readme.txt", "hello\n");
    write(
        dir.path(),
        "src/main.js",
        "import readme from \"inline:readme.txt\";\nprint(readme);\n",
    );
    let output = dir.path().join("dist").join("main.js");

    let mut cmd = Command::cargo_bin("gjs-bundle")?;
    cmd.arg(dir.path().join("src/main.js"))
        .arg("-o")
        .arg(&output);
    cmd.assert().success();

    let code = fs::read_to_string(&output)?;
    assert!(code.contains(r#""hello\n""#), "{code}");
    Ok(())
}

#[test]
fn test_print_inputs() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "src/data.txt", "data");
    write(
        dir.path(),
        "src/main.js",
        "import data from \"inline:data.txt\";\nimport Gtk from \"gi://Gtk\";\nprint(data, Gtk);\n",
    );

    let expected = format!(
        "{}\n{}\n",
        dir.path().join("src/data.txt").display(),
        dir.path().join("src/main.js").display()
    );
    let mut cmd = Command::cargo_bin("gjs-bundle")?;
    cmd.arg(dir.path().join("src/main.js"))
        .arg("--outfile")
        .arg(dir.path().join("out.js"))
        .arg("--print-inputs");
    cmd.assert().success().stdout(predicate::eq(expected));
    Ok(())
}

#[rstest]
#[case("missing.blp")]
#[case("missing.scss")]
#[case("inline:missing.txt")]
#[case("./missing.js")]
fn test_missing_import_fails(#[case] import: &str) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(
        dir.path(),
        "src/main.js",
        &format!("import value from \"{import}\";\nprint(value);\n"),
    );
    let output = dir.path().join("out.js");

    let mut cmd = Command::cargo_bin("gjs-bundle")?;
    cmd.arg(dir.path().join("src/main.js"))
        .arg("-o")
        .arg(&output)
        // Point the compilers at something that cannot exist so the test does not
        // depend on what is installed
        .arg("--sass-bin")
        .arg(dir.path().join("no-sass"))
        .arg("--blueprint-compiler-bin")
        .arg(dir.path().join("no-blueprint-compiler"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing"));

    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_invalid_tsconfig_raw() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "src/main.js", "print(1);\n");
    let output = dir.path().join("out.js");

    let mut cmd = Command::cargo_bin("gjs-bundle")?;
    cmd.arg(dir.path().join("src/main.js"))
        .arg("-o")
        .arg(&output)
        .arg("--tsconfig-raw")
        .arg("{\"compilerOptions\": {\"jsx\": \"solid\"}}");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("solid"));

    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_missing_outfile_argument() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("gjs-bundle")?;
    cmd.arg("main.js");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--outfile"));
    Ok(())
}
