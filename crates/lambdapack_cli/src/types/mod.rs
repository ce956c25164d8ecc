pub mod output_format;
pub mod platform;
