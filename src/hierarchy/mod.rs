//! Reconstruct the gene → transcript → exon/CDS hierarchy from GFF2 records
//!
//! GFF2 has no explicit parent/child links. The [`HierarchyBuilder`] groups the
//! records by a [`GroupKey`] that a [`GroupingStrategy`] derives for every record:
//!
//! - [`AttributeGrouping`] uses the `gene_id` and `transcript_id` attributes
//! - [`AdjacencyGrouping`] wraps another strategy and groups records without keys
//!   with the previous record, if both overlap on the same sequence
//!
//! Children are attached to the transcript with the same key, or, if the file has
//! no such transcript, directly to the gene. Children without any parent are kept
//! as orphans: under a synthetic `mRNA` (or `gene`) if their key names one, or as
//! root features otherwise. Every orphan is reported as a
//! [`Warning::OrphanFeature`](`crate::utils::errors::Warning::OrphanFeature`).
//!
//! [`transcripts_only`] reduces the trees to transcripts with their `exon` and `CDS`
//! children, without gene records.
//!
//! ```text
//! input                         trees
//! gene  gene_id g1              gene
//! mRNA  g1 / t1                 └── mRNA
//! exon  g1 / t1                     ├── exon
//! CDS   g1 / t1                     └── CDS
//! exon  g7 / t7                 mRNA (synthetic)
//!                               └── exon
//! ```

mod builder;
mod filter;
mod grouping;

pub use crate::hierarchy::builder::{
    Hierarchy, HierarchyBuilder, SYNTHETIC_GENE, SYNTHETIC_TRANSCRIPT,
};
pub use crate::hierarchy::filter::{transcripts_only, TRANSCRIPT_CHILD_TYPES};
pub use crate::hierarchy::grouping::{
    AdjacencyGrouping, Anchor, AttributeGrouping, GroupKey, GroupingStrategy,
};
