//! Error types and small helpers shared by all modules

pub mod errors;

/// Returns `true` if the two closed intervals overlap
///
/// ```rust
/// use gff2gff3::utils::overlaps;
///
/// assert!(overlaps((10, 20), (20, 30)));
/// assert!(!overlaps((10, 19), (20, 30)));
/// ```
pub fn overlaps(a: (u64, u64), b: (u64, u64)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}
