mod common;

use common::Project;
use lambdapack::BuildMode;
use pretty_assertions::assert_eq;

const PING: &str = r#"
export const handler = async (event: { name?: string }): Promise<{ statusCode: number; body: string }> => {
  return { statusCode: 200, body: `pong ${event.name ?? "anonymous"}` };
};
"#;

const USERS: &str = r#"
import { getUser } from "../services/user";

export async function handler(event: { id: string }) {
  const user = await getUser(event.id);
  return { statusCode: 200, body: JSON.stringify(user) };
}
"#;

const USER_SERVICE: &str = r#"
export interface User {
  id: string;
  name: string;
}

export async function getUser(id: string): Promise<User> {
  return { id, name: "Ada" };
}

const PAGE_SIZE = 20;
export const MAX_RESULTS = PAGE_SIZE * 5;

export function deleteUser(id: string): void {
  console.log("deleting", id);
}
"#;

fn project() -> Project {
  Project::new(&[
    ("src/handlers/ping.ts", PING),
    ("src/handlers/users.ts", USERS),
    ("src/services/user.ts", USER_SERVICE),
    // Not an entry, declaration files and other directories are skipped.
    ("src/handlers/types.d.ts", "export type Event = { id: string };"),
    ("src/jobs/nightly.ts", "export const run = () => 1;"),
  ])
}

#[tokio::test]
async fn one_artifact_per_handler() {
  let project = project();
  let output = project.write(BuildMode::Development).await.unwrap();

  let chunks = output.chunks().map(|asset| asset.filename.as_str()).collect::<Vec<_>>();
  assert_eq!(chunks, vec!["handlers/ping/index.js", "handlers/users/index.js"]);
  assert!(project.exists("dist/handlers/ping/index.js"));
  assert!(project.exists("dist/handlers/users/index.js"));
  assert!(!project.exists("dist/handlers/types"));
  assert!(!project.exists("dist/jobs"));
}

#[tokio::test]
async fn handler_is_exported_through_module_exports() {
  let project = project();
  project.write(BuildMode::Development).await.unwrap();

  let code = project.read("dist/handlers/ping/index.js");
  assert!(code.starts_with("\"use strict\";"), "{code}");
  assert!(code.contains("module.exports = __toCommonJS("), "{code}");
  assert!(code.contains("handler: () => handler"), "{code}");
  assert!(code.contains("0 && (module.exports = {\n  handler\n});"), "{code}");
}

#[tokio::test]
async fn type_annotations_are_stripped() {
  let project = project();
  project.write(BuildMode::Development).await.unwrap();

  let code = project.read("dist/handlers/ping/index.js");
  assert!(!code.contains("Promise<"), "{code}");
  assert!(!code.contains("name?: string"), "{code}");
  assert!(code.contains("pong ${event.name ?? \"anonymous\"}"), "{code}");

  let users = project.read("dist/handlers/users/index.js");
  assert!(!users.contains("interface User"), "{users}");
}

#[tokio::test]
async fn unused_exports_are_tree_shaken() {
  let project = project();
  project.write(BuildMode::Development).await.unwrap();

  let users = project.read("dist/handlers/users/index.js");
  assert!(users.contains("async function getUser(id)"), "{users}");
  assert!(!users.contains("deleteUser"), "{users}");
  assert!(!users.contains("MAX_RESULTS"), "{users}");
  assert!(!users.contains("PAGE_SIZE"), "{users}");

  // Shared code only lands in the bundles that use it.
  let ping = project.read("dist/handlers/ping/index.js");
  assert!(!ping.contains("getUser"), "{ping}");
}
