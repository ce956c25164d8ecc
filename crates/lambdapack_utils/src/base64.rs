use base64_simd::{STANDARD, URL_SAFE_NO_PAD};

pub fn to_url_safe_base64(input: impl AsRef<[u8]>) -> String {
  URL_SAFE_NO_PAD.encode_to_string(input)
}

pub fn to_standard_base64(input: impl AsRef<[u8]>) -> String {
  STANDARD.encode_to_string(input)
}

#[test]
fn test_base64() {
  assert_eq!(to_standard_base64("hello?>"), "aGVsbG8/Pg==");
  assert_eq!(to_url_safe_base64("hello?>"), "aGVsbG8_Pg");
}
