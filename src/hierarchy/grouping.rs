use crate::models::{FeatureKind, FeatureRecord};
use crate::utils::overlaps;

/// The key that decides which records belong to the same gene or transcript
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Derived from the legacy `gene_id` and `transcript_id` attributes
    Explicit {
        gene: Option<String>,
        transcript: Option<String>,
    },
    /// A cluster of consecutive, overlapping records without explicit keys
    Positional(usize),
    /// A keyless transcript, and its overlapping keyless children, inside a
    /// gene that has a `gene_id`
    Nested { gene: String, cluster: usize },
}

/// What a parent feature is registered under and what a child looks for
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    Named(String),
    /// A transcript id within the gene it belongs to
    Scoped { gene: String, transcript: String },
    Cluster(usize),
}

impl GroupKey {
    pub fn explicit(gene: Option<&str>, transcript: Option<&str>) -> Self {
        GroupKey::Explicit {
            gene: gene.map(|s| s.to_string()),
            transcript: transcript.map(|s| s.to_string()),
        }
    }

    pub fn gene_anchor(&self) -> Option<Anchor> {
        match self {
            GroupKey::Explicit { gene, .. } => gene.clone().map(Anchor::Named),
            GroupKey::Positional(n) => Some(Anchor::Cluster(*n)),
            GroupKey::Nested { gene, .. } => Some(Anchor::Named(gene.clone())),
        }
    }

    /// Transcript ids are only unique within their gene, so a transcript
    /// anchor includes the gene id when there is one
    pub fn transcript_anchor(&self) -> Option<Anchor> {
        match self {
            GroupKey::Explicit {
                gene: Some(gene),
                transcript: Some(transcript),
            } => Some(Anchor::Scoped {
                gene: gene.clone(),
                transcript: transcript.clone(),
            }),
            GroupKey::Explicit { transcript, .. } => transcript.clone().map(Anchor::Named),
            GroupKey::Positional(n) => Some(Anchor::Cluster(*n)),
            GroupKey::Nested { cluster, .. } => Some(Anchor::Cluster(*cluster)),
        }
    }

    pub fn gene(&self) -> Option<&str> {
        match self {
            GroupKey::Explicit { gene, .. } => gene.as_deref(),
            GroupKey::Nested { gene, .. } => Some(gene),
            GroupKey::Positional(_) => None,
        }
    }

    pub fn transcript(&self) -> Option<&str> {
        match self {
            GroupKey::Explicit { transcript, .. } => transcript.as_deref(),
            GroupKey::Positional(_) | GroupKey::Nested { .. } => None,
        }
    }
}

/// Derives the [`GroupKey`] of a record
///
/// Strategies are called once per record, in input order, and may keep
/// state between calls (e.g. to look at the previous record). A new strategy
/// instance must be used for every file.
pub trait GroupingStrategy {
    fn group_key(&mut self, record: &FeatureRecord) -> Option<GroupKey>;
}

/// Groups records by their `gene_id` and `transcript_id` attributes
///
/// ```rust
/// use gff2gff3::hierarchy::{AttributeGrouping, GroupKey, GroupingStrategy};
/// use gff2gff3::models::FeatureRecord;
///
/// let mut exon = FeatureRecord::new("chr1", "GMC", "exon", 1, 10);
/// exon.attributes_mut().insert("gene_id", "g1");
///
/// let mut strategy = AttributeGrouping;
/// assert_eq!(strategy.group_key(&exon), Some(GroupKey::explicit(Some("g1"), None)));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AttributeGrouping;

impl GroupingStrategy for AttributeGrouping {
    fn group_key(&mut self, record: &FeatureRecord) -> Option<GroupKey> {
        match (record.gene_id(), record.transcript_id()) {
            (None, None) => None,
            (gene, transcript) => Some(GroupKey::explicit(gene, transcript)),
        }
    }
}

struct Span {
    seq_id: String,
    start: u64,
    end: u64,
    key: GroupKey,
}

/// Falls back to positional adjacency for records without a key
///
/// The wrapped strategy is asked first. A record that it cannot group inherits the
/// key of the previous record if both are on the same sequence and overlap.
/// Otherwise the record opens a new positional cluster.
///
/// A keyless transcript that overlaps a gene-only key opens a [`GroupKey::Nested`]
/// cluster, so that the keyless children following it attach to the transcript
/// rather than to the gene.
pub struct AdjacencyGrouping<S> {
    inner: S,
    last: Option<Span>,
    clusters: usize,
}

impl<S: GroupingStrategy> AdjacencyGrouping<S> {
    pub fn new(inner: S) -> Self {
        AdjacencyGrouping {
            inner,
            last: None,
            clusters: 0,
        }
    }
}

impl Default for AdjacencyGrouping<AttributeGrouping> {
    fn default() -> Self {
        Self::new(AttributeGrouping)
    }
}

impl<S: GroupingStrategy> GroupingStrategy for AdjacencyGrouping<S> {
    fn group_key(&mut self, record: &FeatureRecord) -> Option<GroupKey> {
        if let Some(key) = self.inner.group_key(record) {
            self.last = Some(Span {
                seq_id: record.seq_id().to_string(),
                start: record.start(),
                end: record.end(),
                key: key.clone(),
            });
            return Some(key);
        }

        if let Some(last) = self.last.as_mut() {
            if last.seq_id == record.seq_id()
                && overlaps((last.start, last.end), (record.start(), record.end()))
            {
                last.start = last.start.min(record.start());
                last.end = last.end.max(record.end());
                if record.kind() == FeatureKind::Transcript && last.key.transcript().is_none() {
                    if let Some(gene) = last.key.gene().map(str::to_string) {
                        last.key = GroupKey::Nested {
                            gene,
                            cluster: self.clusters,
                        };
                        self.clusters += 1;
                    }
                }
                return Some(last.key.clone());
            }
        }

        let key = GroupKey::Positional(self.clusters);
        self.clusters += 1;
        self.last = Some(Span {
            seq_id: record.seq_id().to_string(),
            start: record.start(),
            end: record.end(),
            key: key.clone(),
        });
        Some(key)
    }
}
