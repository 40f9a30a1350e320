//! Data structures of a feature annotation: records, their attributes and feature trees

mod attributes;
mod frame;
mod record;
mod strand;
mod tree;

pub use crate::models::attributes::{encode, Attributes};
pub use crate::models::frame::Frame;
pub use crate::models::record::{FeatureKind, FeatureRecord};
pub use crate::models::strand::Strand;
pub use crate::models::tree::FeatureTree;
