//! Read GFF2 files as emitted by the Gene Model Checker
//!
//! GFF2 has 9 tab-separated columns. The 9th column holds free-text attributes
//! in the form `key "value"; key2 "value2";` (or `key=value`). The hierarchy
//! of the features is only implied by the `gene_id` and `transcript_id` attributes.
//!
//! ```text
//! chr1  GMC  gene  100  500  .  +  .  gene_id "g1";
//! chr1  GMC  exon  100  200  .  +  .  gene_id "g1"; transcript_id "t1";
//! ```
//!
//! Any structural problem (missing columns, invalid coordinates) is a fatal
//! [`ConvertError`](`crate::utils::errors::ConvertError`); repeated attribute keys
//! are reported as [`Warning`](`crate::utils::errors::Warning`)s.

mod reader;

pub use crate::gff2::reader::{parse_line, parse_lines, ParsedLine, Reader, Records};
