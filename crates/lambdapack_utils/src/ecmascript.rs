use std::borrow::Cow;

use oxc::syntax::identifier::{self, is_identifier_part, is_identifier_start};

use crate::concat_string;

pub fn is_validate_identifier_name(name: &str) -> bool {
  identifier::is_identifier_name(name)
}

/// Quotes `value` as a JavaScript string literal.
pub fn quote_string(value: &str) -> String {
  serde_json::Value::from(value).to_string()
}

pub fn property_access_str(obj: &str, prop: &str) -> String {
  if is_validate_identifier_name(prop) {
    concat_string!(obj, ".", prop)
  } else {
    concat_string!(obj, "[", quote_string(prop), "]")
  }
}

/// Renders `name` as an object literal key.
pub fn property_key_str(name: &str) -> Cow<str> {
  if is_validate_identifier_name(name) { Cow::Borrowed(name) } else { Cow::Owned(quote_string(name)) }
}

/// Turns an arbitrary string, usually a file name, into something usable as a binding name.
pub fn legitimize_identifier_name(name: &str) -> Cow<str> {
  let mut chars = name.char_indices();
  let first_invalid_char_index = match chars.next() {
    None => return Cow::Borrowed("_"),
    Some((idx, first_char)) if !is_identifier_start(first_char) => Some(idx),
    Some(_) => chars.find(|(_, char)| !is_identifier_part(*char)).map(|(idx, _)| idx),
  };

  let Some(first_invalid_char_index) = first_invalid_char_index else {
    return Cow::Borrowed(name);
  };

  let (valid_part, rest_part) = name.split_at(first_invalid_char_index);
  let mut legitimized = String::with_capacity(name.len() + 1);
  legitimized.push_str(valid_part);
  for (idx, char) in rest_part.chars().enumerate() {
    if is_identifier_part(char) {
      if idx == 0 && valid_part.is_empty() {
        // Digits may continue an identifier but never start one.
        legitimized.push('_');
      }
      legitimized.push(char);
    } else {
      legitimized.push('_');
    }
  }
  Cow::Owned(legitimized)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_is_validate_identifier_name() {
    assert!(is_validate_identifier_name("foo"));
    assert!(!is_validate_identifier_name("1aaaa"));
    assert!(!is_validate_identifier_name("😈"));
  }

  #[test]
  fn test_property_access_str() {
    assert_eq!(property_access_str("import_pkg", "default"), "import_pkg.default");
    assert_eq!(property_access_str("data", "foo-bar"), "data[\"foo-bar\"]");
  }

  #[test]
  fn test_legitimize_identifier_name() {
    assert_eq!(legitimize_identifier_name("user"), "user");
    assert_eq!(legitimize_identifier_name("pre-sign-up"), "pre_sign_up");
    assert_eq!(legitimize_identifier_name("@aws-sdk/client-s3"), "_aws_sdk_client_s3");
    assert_eq!(legitimize_identifier_name("3d"), "_3d");
    assert_eq!(legitimize_identifier_name(""), "_");
  }
}
