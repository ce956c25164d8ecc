pub mod base64;
pub mod ecmascript;
pub mod indexmap;
pub mod node_builtins;
pub mod path_ext;
pub mod rayon;
pub mod xxhash;

/// Concatenates string-like values into a `String`, allocating once.
#[macro_export]
macro_rules! concat_string {
  () => {
    String::new()
  };
  ($($part:expr),+ $(,)?) => {
    [$(::core::convert::AsRef::<str>::as_ref(&$part)),+].concat()
  };
}

#[test]
fn test_concat_string() {
  let owned = String::from("b");
  assert_eq!(concat_string!("a", owned, "c"), "abc");
  assert_eq!(concat_string!(), "");
}
