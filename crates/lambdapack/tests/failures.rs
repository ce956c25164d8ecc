mod common;

use common::{Project, error_messages};
use lambdapack::{BuildMode, Bundler, BundlerOptions};

#[tokio::test]
async fn no_entries_fails_and_writes_nothing() {
  let project = Project::new(&[("src/services/user.ts", "export const user = 1;")]);

  let errors = project.write(BuildMode::Development).await.unwrap_err();
  let message = error_messages(&errors);
  assert!(message.contains("NO_ENTRIES"), "{message}");
  assert!(message.contains("src/handlers/*.ts"), "{message}");
  assert!(!project.exists("dist"));
}

#[test]
fn empty_input_is_rejected() {
  let errors = Bundler::new(BundlerOptions { input: Some(vec![]), ..BundlerOptions::default() })
    .err()
    .unwrap();
  assert!(error_messages(&errors).contains("NO_ENTRIES"));
}

#[tokio::test]
async fn syntax_error_fails_every_entry() {
  let project = Project::new(&[
    ("src/handlers/broken.ts", "export const handler = (;\n"),
    ("src/handlers/ping.ts", "export const handler = () => \"pong\";\n"),
  ]);

  let errors = project.write(BuildMode::Development).await.unwrap_err();
  let message = error_messages(&errors);
  assert!(message.contains("PARSE_ERROR"), "{message}");
  assert!(message.contains("src/handlers/broken.ts:1:"), "{message}");
  // No partial output, the healthy handler isn't written either.
  assert!(!project.exists("dist"));
}

#[tokio::test]
async fn unresolved_import_names_the_importer() {
  let project = Project::new(&[(
    "src/handlers/ping.ts",
    "import { missing } from \"./missing\";\nexport const handler = () => missing;\n",
  )]);

  let errors = project.write(BuildMode::Production).await.unwrap_err();
  let message = error_messages(&errors);
  assert!(message.contains("UNRESOLVED_IMPORT"), "{message}");
  assert!(message.contains("./missing"), "{message}");
  assert!(message.contains("src/handlers/ping.ts"), "{message}");
  assert!(!project.exists("dist"));
}

#[tokio::test]
async fn jsx_is_rejected() {
  let project = Project::new(&[
    ("src/handlers/page.ts", "import { view } from \"../views/page\";\nexport const handler = () => view;\n"),
    ("src/views/page.tsx", "export const view = <div />;\n"),
  ]);

  assert!(project.write(BuildMode::Development).await.is_err());
  assert!(!project.exists("dist"));
}
