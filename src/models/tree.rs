use crate::models::FeatureRecord;

/// A feature together with its ordered child features
///
/// ```rust
/// use gff2gff3::models::{FeatureRecord, FeatureTree};
///
/// let mut gene = FeatureTree::new(FeatureRecord::new("chr1", "GMC", "gene", 1, 100));
/// gene.push(FeatureTree::new(FeatureRecord::new("chr1", "GMC", "mRNA", 1, 100)));
/// assert_eq!(gene.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTree {
    record: FeatureRecord,
    children: Vec<FeatureTree>,
}

impl FeatureTree {
    pub fn new(record: FeatureRecord) -> Self {
        FeatureTree {
            record,
            children: vec![],
        }
    }

    pub fn record(&self) -> &FeatureRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut FeatureRecord {
        &mut self.record
    }

    pub fn children(&self) -> &[FeatureTree] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [FeatureTree] {
        &mut self.children
    }

    pub fn push(&mut self, child: FeatureTree) {
        self.children.push(child)
    }

    /// Splits the tree into its root record and the child trees
    pub fn into_parts(self) -> (FeatureRecord, Vec<FeatureTree>) {
        (self.record, self.children)
    }

    /// Number of nodes in the tree, including the root
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(|c| c.len()).sum::<usize>()
    }

    /// A tree always has at least its root node
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All records of the tree in depth-first pre-order
    pub fn records(&self) -> Vec<&FeatureRecord> {
        let mut records = Vec::with_capacity(self.len());
        self.collect_records(&mut records);
        records
    }

    fn collect_records<'a>(&'a self, records: &mut Vec<&'a FeatureRecord>) {
        records.push(&self.record);
        for child in &self.children {
            child.collect_records(records);
        }
    }
}
