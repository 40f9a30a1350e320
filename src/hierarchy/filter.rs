use log::debug;

use crate::models::{FeatureKind, FeatureTree};

/// Feature types kept below a transcript by [`transcripts_only`]
pub const TRANSCRIPT_CHILD_TYPES: [&str; 2] = ["exon", "CDS"];

/// Reduces the trees to transcripts with their exons and CDS
///
/// Gene records are removed and their transcripts become roots, in input order.
/// Children of a transcript other than `exon` and `CDS` are dropped, and so is
/// everything that is not part of a transcript. This is the layout Apollo
/// expects when a gene model is imported.
///
/// ```rust
/// use gff2gff3::hierarchy::transcripts_only;
/// use gff2gff3::models::{FeatureRecord, FeatureTree};
///
/// let mut mrna = FeatureTree::new(FeatureRecord::new("chr1", "GMC", "mRNA", 1, 100));
/// mrna.push(FeatureTree::new(FeatureRecord::new("chr1", "GMC", "exon", 1, 40)));
/// mrna.push(FeatureTree::new(FeatureRecord::new("chr1", "GMC", "intron", 41, 59)));
/// let mut gene = FeatureTree::new(FeatureRecord::new("chr1", "GMC", "gene", 1, 100));
/// gene.push(mrna);
///
/// let trees = transcripts_only(vec![gene]);
/// assert_eq!(trees.len(), 1);
/// assert_eq!(trees[0].record().feature_type(), "mRNA");
/// assert_eq!(trees[0].len(), 2);
/// ```
pub fn transcripts_only(trees: Vec<FeatureTree>) -> Vec<FeatureTree> {
    let mut res = Vec::with_capacity(trees.len());
    for tree in trees {
        collect_transcripts(tree, &mut res);
    }
    res
}

fn collect_transcripts(tree: FeatureTree, res: &mut Vec<FeatureTree>) {
    let (record, children) = tree.into_parts();
    match record.kind() {
        FeatureKind::Transcript => {
            let mut transcript = FeatureTree::new(record);
            for child in children {
                if TRANSCRIPT_CHILD_TYPES.contains(&child.record().feature_type()) {
                    transcript.push(child);
                } else {
                    log_dropped(&child);
                }
            }
            res.push(transcript);
        }
        FeatureKind::Gene => {
            for child in children {
                collect_transcripts(child, res);
            }
        }
        FeatureKind::Child | FeatureKind::Other => log_dropped(&FeatureTree::new(record)),
    }
}

fn log_dropped(tree: &FeatureTree) {
    for record in tree.records() {
        debug!(
            "Dropping {} on line {:?}, it is not part of a transcript",
            record.feature_type(),
            record.line()
        );
    }
}
