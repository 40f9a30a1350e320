use core::str::FromStr;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The reading frame (GFF3 calls it phase) of a CDS feature
///
/// Features other than `CDS` usually have no frame, which is
/// represented as `Frame::None` and written as `.`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    #[default]
    None,
    Zero,
    One,
    Two,
}

impl Frame {
    pub fn is_known(&self) -> bool {
        self != &Frame::None
    }
}

impl FromStr for Frame {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "." => Ok(Self::None),
            "0" => Ok(Self::Zero),
            "1" => Ok(Self::One),
            "2" => Ok(Self::Two),
            _ => Err(format!("invalid frame '{}'", s)),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Frame::None => ".",
                Frame::Zero => "0",
                Frame::One => "1",
                Frame::Two => "2",
            }
        )
    }
}
