use std::collections::HashMap;

use log::{debug, warn};

use crate::hierarchy::grouping::{
    AdjacencyGrouping, Anchor, AttributeGrouping, GroupKey, GroupingStrategy,
};
use crate::models::{Attributes, FeatureKind, FeatureRecord, FeatureTree};
use crate::utils::errors::Warning;

/// Feature type of synthetic parents for orphaned transcript children
pub const SYNTHETIC_TRANSCRIPT: &str = "mRNA";
/// Feature type of synthetic parents for orphans that only have a `gene_id`
pub const SYNTHETIC_GENE: &str = "gene";

/// The feature trees of one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hierarchy {
    pub trees: Vec<FeatureTree>,
    pub warnings: Vec<Warning>,
}

// synthetic parents are never shared across sequences
type SyntheticKey = (&'static str, String, Anchor);

struct Node {
    children: Vec<usize>,
    parent: Option<usize>,
    // position in the output, index of the record or of the first child
    order: usize,
}

/// Assembles [`FeatureRecord`]s into [`FeatureTree`]s
///
/// The builder consumes itself, so that the state of the grouping strategy
/// never leaks from one file into the next.
///
/// # Examples
///
/// ```rust
/// use gff2gff3::gff2::parse_lines;
/// use gff2gff3::hierarchy::{AdjacencyGrouping, AttributeGrouping, HierarchyBuilder};
///
/// let parsed = parse_lines(vec![
///     "chr1\tGMC\tgene\t100\t500\t.\t+\t.\tgene_id \"g1\";",
///     "chr1\tGMC\tmRNA\t100\t500\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";",
///     "chr1\tGMC\texon\t100\t200\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";",
/// ]).unwrap();
///
/// let hierarchy = HierarchyBuilder::new(AdjacencyGrouping::new(AttributeGrouping)).build(parsed.records);
/// assert_eq!(hierarchy.trees.len(), 1);
/// assert_eq!(hierarchy.trees[0].children()[0].children()[0].record().feature_type(), "exon");
/// assert!(hierarchy.warnings.is_empty());
/// ```
pub struct HierarchyBuilder<S> {
    strategy: S,
}

impl Default for HierarchyBuilder<AdjacencyGrouping<AttributeGrouping>> {
    fn default() -> Self {
        Self::new(AdjacencyGrouping::default())
    }
}

impl<S: GroupingStrategy> HierarchyBuilder<S> {
    pub fn new(strategy: S) -> Self {
        HierarchyBuilder { strategy }
    }

    pub fn build(mut self, records: Vec<FeatureRecord>) -> Hierarchy {
        let keys: Vec<Option<GroupKey>> = records
            .iter()
            .map(|record| self.strategy.group_key(record))
            .collect();
        let kinds: Vec<FeatureKind> = records.iter().map(|record| record.kind()).collect();

        let (genes, transcripts) = register_parents(&records, &kinds, &keys);

        let mut records: Vec<Option<FeatureRecord>> = records.into_iter().map(Some).collect();
        let mut nodes: Vec<Node> = (0..records.len())
            .map(|idx| Node {
                children: vec![],
                parent: None,
                order: idx,
            })
            .collect();
        let mut synthetic: HashMap<SyntheticKey, usize> = HashMap::new();
        let mut warnings = vec![];

        for idx in 0..kinds.len() {
            let key = keys[idx].as_ref();
            let parent = match kinds[idx] {
                FeatureKind::Gene => None,
                FeatureKind::Transcript => key
                    .and_then(|k| k.gene_anchor())
                    .and_then(|anchor| genes.get(&anchor).copied()),
                FeatureKind::Child | FeatureKind::Other => {
                    let transcript = key
                        .and_then(|k| k.transcript_anchor())
                        .and_then(|anchor| transcripts.get(&anchor).copied());
                    match transcript {
                        Some(p) => Some(p),
                        None => {
                            let gene = key
                                .and_then(|k| k.gene_anchor())
                                .and_then(|anchor| genes.get(&anchor).copied());
                            if gene.is_some() && key.and_then(|k| k.transcript()).is_some() {
                                debug!(
                                    "No transcript for {} on line {:?}, linking to its gene",
                                    kinds_label(&records[idx]),
                                    records[idx].as_ref().and_then(|r| r.line())
                                );
                            }
                            gene
                        }
                    }
                }
            };

            let parent = match parent {
                Some(p) => Some(p),
                None if kinds[idx] == FeatureKind::Child => {
                    let promoted = promote_orphan(
                        idx,
                        key,
                        &mut records,
                        &mut nodes,
                        &mut synthetic,
                    );
                    if let Some(record) = records[idx].as_ref() {
                        let warning = Warning::OrphanFeature {
                            line: record.line(),
                            feature_type: record.feature_type().to_string(),
                            attributes: record.attributes().clone(),
                            promoted_to: promoted.and_then(|p| {
                                records[p].as_ref().map(|r| r.feature_type().to_string())
                            }),
                        };
                        warn!("{}", warning);
                        warnings.push(warning);
                    }
                    promoted
                }
                None => None,
            };

            if let Some(p) = parent {
                nodes[idx].parent = Some(p);
                nodes[p].children.push(idx);
            }
        }

        let mut roots: Vec<usize> = (0..nodes.len())
            .filter(|idx| nodes[*idx].parent.is_none())
            .collect();
        roots.sort_by_key(|idx| nodes[*idx].order);

        let trees = roots
            .into_iter()
            .filter_map(|idx| assemble(idx, &mut records, &nodes))
            .collect();

        Hierarchy { trees, warnings }
    }
}

/// Indexes genes and transcripts by their anchors
///
/// For identical anchors the first record in input order wins. A transcript
/// with a `gene_id` is also reachable by its bare transcript id, for children
/// that only carry a `transcript_id`.
fn register_parents(
    records: &[FeatureRecord],
    kinds: &[FeatureKind],
    keys: &[Option<GroupKey>],
) -> (HashMap<Anchor, usize>, HashMap<Anchor, usize>) {
    let mut genes: HashMap<Anchor, usize> = HashMap::new();
    let mut transcripts: HashMap<Anchor, usize> = HashMap::new();
    for (idx, key) in keys.iter().enumerate() {
        let Some(key) = key else { continue };
        let (anchor, index) = match kinds[idx] {
            FeatureKind::Gene => (key.gene_anchor(), &mut genes),
            FeatureKind::Transcript => (key.transcript_anchor(), &mut transcripts),
            _ => continue,
        };
        let Some(anchor) = anchor else { continue };
        match index.get(&anchor) {
            Some(first) => debug!(
                "{} on line {:?} duplicates the one on line {:?}, children go to the first one",
                records[idx].feature_type(),
                records[idx].line(),
                records[*first].line()
            ),
            None => {
                index.insert(anchor, idx);
            }
        }
    }
    for (idx, key) in keys.iter().enumerate() {
        if kinds[idx] != FeatureKind::Transcript {
            continue;
        }
        if let Some(transcript) = key.as_ref().and_then(|k| k.transcript()) {
            transcripts
                .entry(Anchor::Named(transcript.to_string()))
                .or_insert(idx);
        }
    }
    (genes, transcripts)
}

/// Places an orphaned child under a synthetic parent, if its key names one
///
/// Returns the index of the synthetic parent, or `None` if the orphan
/// becomes a root itself.
fn promote_orphan(
    idx: usize,
    key: Option<&GroupKey>,
    records: &mut Vec<Option<FeatureRecord>>,
    nodes: &mut Vec<Node>,
    synthetic: &mut HashMap<SyntheticKey, usize>,
) -> Option<usize> {
    let key = key?;
    let (feature_type, anchor) = match (key.transcript(), key.gene()) {
        (Some(_), _) => (SYNTHETIC_TRANSCRIPT, key.transcript_anchor()?),
        (None, Some(_)) => (SYNTHETIC_GENE, key.gene_anchor()?),
        (None, None) => return None,
    };

    let (seq_id, start, end) = records[idx]
        .as_ref()
        .map(|r| (r.seq_id().to_string(), r.start(), r.end()))?;
    let synthetic_key = (feature_type, seq_id, anchor);

    if let Some(&parent) = synthetic.get(&synthetic_key) {
        if let Some(parent_record) = records[parent].as_mut() {
            parent_record.expand(start, end);
        }
        return Some(parent);
    }

    let child = records[idx].as_ref()?;
    let mut parent_record =
        FeatureRecord::new(child.seq_id(), child.source(), feature_type, start, end);
    parent_record.set_strand(child.strand());
    let mut attributes = Attributes::new();
    if let Some(gene) = key.gene() {
        attributes.insert("gene_id", gene);
    }
    if let Some(transcript) = key.transcript() {
        attributes.insert("transcript_id", transcript);
    }
    parent_record.set_attributes(attributes);

    let parent = records.len();
    records.push(Some(parent_record));
    nodes.push(Node {
        children: vec![],
        parent: None,
        order: idx,
    });
    synthetic.insert(synthetic_key, parent);
    Some(parent)
}

fn kinds_label(record: &Option<FeatureRecord>) -> &str {
    record.as_ref().map_or("feature", |r| r.feature_type())
}

fn assemble(
    idx: usize,
    records: &mut [Option<FeatureRecord>],
    nodes: &[Node],
) -> Option<FeatureTree> {
    let mut tree = FeatureTree::new(records[idx].take()?);
    for &child in &nodes[idx].children {
        if let Some(subtree) = assemble(child, records, nodes) {
            tree.push(subtree);
        }
    }
    Some(tree)
}
