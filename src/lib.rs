#![doc = include_str!("../README.md")]

pub mod convert;
pub mod gff2;
pub mod gff3;
pub mod hierarchy;
pub mod ids;
pub mod models;
pub mod tests;
pub mod utils;

pub use crate::convert::{convert_file, convert_lines, convert_reader, Conversion, ConvertOptions};
pub use crate::utils::errors::{ConvertError, Warning};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
