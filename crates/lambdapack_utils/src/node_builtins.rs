/// Modules shipped with Node.js. They are always left as `require` calls.
const NODE_BUILTIN_MODULES: &[&str] = &[
  "assert",
  "assert/strict",
  "async_hooks",
  "buffer",
  "child_process",
  "cluster",
  "console",
  "constants",
  "crypto",
  "dgram",
  "diagnostics_channel",
  "dns",
  "dns/promises",
  "domain",
  "events",
  "fs",
  "fs/promises",
  "http",
  "http2",
  "https",
  "inspector",
  "module",
  "net",
  "os",
  "path",
  "path/posix",
  "path/win32",
  "perf_hooks",
  "process",
  "punycode",
  "querystring",
  "readline",
  "readline/promises",
  "repl",
  "stream",
  "stream/consumers",
  "stream/promises",
  "stream/web",
  "string_decoder",
  "sys",
  "timers",
  "timers/promises",
  "tls",
  "trace_events",
  "tty",
  "url",
  "util",
  "util/types",
  "v8",
  "vm",
  "wasi",
  "worker_threads",
  "zlib",
];

pub fn is_builtin_module(specifier: &str) -> bool {
  if let Some(stripped) = specifier.strip_prefix("node:") {
    // `node:test` and `node:sqlite` only exist with the prefix.
    return matches!(stripped, "test" | "sqlite" | "sea") || NODE_BUILTIN_MODULES.contains(&stripped);
  }
  NODE_BUILTIN_MODULES.contains(&specifier)
}

#[test]
fn test_is_builtin_module() {
  assert!(is_builtin_module("fs"));
  assert!(is_builtin_module("node:fs/promises"));
  assert!(is_builtin_module("node:test"));
  assert!(!is_builtin_module("test"));
  assert!(!is_builtin_module("fsevents"));
  assert!(!is_builtin_module("@aws-sdk/client-s3"));
}
