use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
  let dir = tempfile::tempdir().unwrap();
  for (relative, content) in files {
    let path = dir.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
  }
  dir
}

fn lambdapack(cwd: &Path, node_env: Option<&str>) -> Command {
  let mut cmd = Command::cargo_bin("lambdapack").unwrap();
  cmd.current_dir(cwd).env_remove("LAMBDAPACK_LOG");
  match node_env {
    Some(value) => cmd.env("NODE_ENV", value),
    None => cmd.env_remove("NODE_ENV"),
  };
  cmd
}

#[test]
fn successful_build_exits_with_zero() {
  let dir = project(&[(
    "src/handlers/ping.ts",
    "export const handler = async (event: unknown, context?: unknown) => ({ statusCode: 200 });\n",
  )]);

  lambdapack(dir.path(), None)
    .assert()
    .success()
    .stdout(predicate::str::contains("src/handlers/ping.ts"))
    .stdout(predicate::str::contains("Build complete!"));

  assert!(dir.path().join("dist/handlers/ping/index.js").exists());
  assert!(dir.path().join("dist/handlers/ping/index.js.map").exists());
}

#[test]
fn production_build_exits_with_zero_without_sourcemaps() {
  let dir = project(&[("src/handlers/ping.ts", "export const handler = async () => ({ statusCode: 200 });\n")]);

  lambdapack(dir.path(), Some("production")).assert().success();

  assert!(dir.path().join("dist/handlers/ping/index.js").exists());
  assert!(!dir.path().join("dist/handlers/ping/index.js.map").exists());
}

#[test]
fn no_entries_exits_with_one() {
  let dir = project(&[("src/jobs/nightly.ts", "export const run = () => 1;\n")]);

  lambdapack(dir.path(), None)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("NO_ENTRIES"))
    .stderr(predicate::str::contains("Build failed"));

  assert!(!dir.path().join("dist").exists());
}

#[test]
fn unresolved_import_exits_with_one_and_writes_nothing() {
  let dir = project(&[
    ("src/handlers/ping.ts", "export const handler = async () => ({ statusCode: 200 });\n"),
    ("src/handlers/users.ts", "import { getUser } from \"../services/missing\";\nexport const handler = getUser;\n"),
  ]);

  lambdapack(dir.path(), None)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("UNRESOLVED_IMPORT"))
    .stderr(predicate::str::contains("../services/missing"));

  assert!(!dir.path().join("dist").exists());
}
