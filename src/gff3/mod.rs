//! Write GFF3 files
//!
//! The output starts with the `##gff-version 3` header. Every feature is written
//! before its children, so every `Parent` attribute refers to an `ID` that was
//! already written. Annotation editors such as Apollo reject forward references.
//!
//! Column 9 is rebuilt from the assigned identifiers and the remaining legacy
//! attributes: `ID=exon1;Parent=mRNA1;gene_id=g1;transcript_id=t1`.
//! Reserved characters (`;`, `=`, `%`, `,`, `&`, tab, newline and other control
//! characters) are percent-encoded.

mod writer;

pub use crate::gff3::writer::{to_lines, Writer, WriterOptions, HEADER};
