use std::fmt;

use thiserror::Error;

use crate::models::Attributes;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Fatal errors that abort the conversion of a single file
///
/// None of these produce partial output. The offending line number
/// is always part of the message so a user can locate the problem
/// in the source file.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The line does not have the 9 tab-separated GFF columns,
    /// or one of the fixed-vocabulary columns holds an unknown value
    #[error("Malformed line {line}: expected {expected}, found {found}")]
    MalformedLine {
        /// 1-based line number in the input
        line: usize,
        /// Description of the expected shape
        expected: String,
        /// Description of what was actually present
        found: String,
    },

    /// `start` or `end` are not positive integers or `start > end`
    #[error("Invalid coordinates on line {line}: start={start}, end={end} ({reason})")]
    InvalidCoordinate {
        line: usize,
        start: String,
        end: String,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ConvertError {
    pub fn malformed<E: Into<String>, F: Into<String>>(line: usize, expected: E, found: F) -> Self {
        ConvertError::MalformedLine {
            line,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn invalid_coordinate<R: Into<String>>(
        line: usize,
        start: &str,
        end: &str,
        reason: R,
    ) -> Self {
        ConvertError::InvalidCoordinate {
            line,
            start: start.to_string(),
            end: end.to_string(),
            reason: reason.into(),
        }
    }

    /// The input line that caused the error, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ConvertError::MalformedLine { line, .. } => Some(*line),
            ConvertError::InvalidCoordinate { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Recoverable anomalies
///
/// A conversion with warnings still produces complete, valid output.
/// The warnings are handed back to the caller so that they can be shown
/// to the user together with the original legacy attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A child feature has no discoverable parent and was promoted,
    /// either to a root of its own or under a synthetic parent
    OrphanFeature {
        line: Option<usize>,
        feature_type: String,
        attributes: Attributes,
        /// Feature type of the synthetic parent, `None` if the
        /// record itself became a root
        promoted_to: Option<String>,
    },
    /// The same legacy attribute key occurs more than once on a record.
    /// The last value is kept.
    DuplicateAttribute {
        line: usize,
        feature_type: String,
        key: String,
        /// Column 9 as written in the input, with all duplicate values
        raw_attributes: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::OrphanFeature {
                line,
                feature_type,
                attributes,
                promoted_to,
            } => {
                let line = match line {
                    Some(l) => l.to_string(),
                    None => "-".to_string(),
                };
                let target = match promoted_to {
                    Some(parent) => format!("synthetic {}", parent),
                    None => "root feature".to_string(),
                };
                write!(
                    f,
                    "Orphan {} on line {} promoted to {} [{}]",
                    feature_type, line, target, attributes
                )
            }
            Warning::DuplicateAttribute {
                line,
                feature_type,
                key,
                raw_attributes,
            } => write!(
                f,
                "Duplicate attribute '{}' on {} (line {}), keeping last value [{}]",
                key, feature_type, line, raw_attributes
            ),
        }
    }
}
