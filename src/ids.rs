//! Assign GFF3 `ID` and `Parent` attributes to feature trees
//!
//! Identifiers have the form `<feature type><counter>`, e.g. `gene1`, `mRNA1`,
//! `exon3`. Every feature type has its own counter, starting at 1.
//! The counters belong to one [`IdAssigner`] instance, i.e. to one output file.

use std::collections::{HashMap, HashSet};

use crate::models::FeatureTree;

/// Mints unique identifiers for all features of one file
///
/// The trees are traversed depth-first in pre-order, so a parent always has
/// its identifier before any of its children is visited.
///
/// # Examples
///
/// ```rust
/// use gff2gff3::ids::IdAssigner;
/// use gff2gff3::models::{FeatureRecord, FeatureTree};
///
/// let mut gene = FeatureTree::new(FeatureRecord::new("chr1", "GMC", "gene", 1, 100));
/// gene.push(FeatureTree::new(FeatureRecord::new("chr1", "GMC", "exon", 1, 50)));
/// gene.push(FeatureTree::new(FeatureRecord::new("chr1", "GMC", "exon", 60, 100)));
/// let mut trees = vec![gene];
///
/// IdAssigner::new().assign(&mut trees);
///
/// let exon = trees[0].children()[1].record();
/// assert_eq!(exon.assigned_id(), Some("exon2"));
/// assert_eq!(exon.parent_id(), Some("gene1"));
/// ```
#[derive(Debug, Default)]
pub struct IdAssigner {
    counters: HashMap<String, u64>,
    issued: HashSet<String>,
}

impl IdAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `assigned_id` on every node and `parent_id` on every non-root node
    pub fn assign(&mut self, trees: &mut [FeatureTree]) {
        for tree in trees.iter_mut() {
            self.assign_tree(tree, None);
        }
    }

    /// Returns the next unused identifier for `feature_type`
    ///
    /// Counter values are never reused. If the formatted identifier was already
    /// issued for another type (e.g. `gene1` + `1` and `gene` + `11`), the
    /// counter moves on until the identifier is unique.
    pub fn next_id(&mut self, feature_type: &str) -> String {
        let counter = self.counters.entry(feature_type.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let id = format!("{}{}", feature_type, counter);
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Number of identifiers issued so far
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    fn assign_tree(&mut self, tree: &mut FeatureTree, parent: Option<&str>) {
        let id = self.next_id(tree.record().feature_type());
        tree.record_mut().set_assigned_id(id.clone());
        tree.record_mut().set_parent_id(parent.map(|p| p.to_string()));
        for child in tree.children_mut() {
            self.assign_tree(child, Some(&id));
        }
    }
}
