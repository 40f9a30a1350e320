//! The GFF2 to GFF3 conversion pipeline
//!
//! parse → build hierarchy → assign identifiers → write
//!
//! Every call converts one file. All state (grouping strategy, identifier counters)
//! is created per call, so independent files can be converted in parallel.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::gff2::{self, Records};
use crate::gff3::{self, WriterOptions};
use crate::hierarchy::{
    transcripts_only, AdjacencyGrouping, AttributeGrouping, Hierarchy, HierarchyBuilder,
};
use crate::ids::IdAssigner;
use crate::utils::errors::{ConvertError, Result, Warning};

/// Settings for a conversion
///
/// ```rust
/// use gff2gff3::convert::ConvertOptions;
///
/// let options: ConvertOptions = serde_json::from_str(r#"{"source": "GEP"}"#).unwrap();
/// assert!(options.adjacency_grouping);
/// assert_eq!(options.source.as_deref(), Some("GEP"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Group records without `gene_id`/`transcript_id` with overlapping neighbours
    pub adjacency_grouping: bool,
    /// Emit `##sequence-region` directives
    pub sequence_region: bool,
    /// Emit `###` after every top-level feature
    pub resolution_directive: bool,
    /// Replace the source column of all features
    pub source: Option<String>,
    /// Write only transcripts with their exons and CDS, without gene records
    pub transcripts_only: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            adjacency_grouping: true,
            sequence_region: false,
            resolution_directive: false,
            source: None,
            transcripts_only: false,
        }
    }
}

impl ConvertOptions {
    /// Reads options from a JSON file; missing fields use their default
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|err| ConvertError::Config(format!("{}: {}", path.as_ref().display(), err)))
    }

    fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            sequence_region: self.sequence_region,
            resolution_directive: self.resolution_directive,
            source: self.source.clone(),
        }
    }
}

/// The complete GFF3 output of one file and all recoverable warnings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    pub lines: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl Conversion {
    /// Number of feature lines, i.e. without header and directives
    pub fn feature_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.starts_with('#')).count()
    }

    /// Writes all lines, each terminated by a single newline
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for line in &self.lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Converts a sequence of GFF2 lines
///
/// Either the complete GFF3 output is returned or an error, never partial output.
///
/// # Examples
///
/// ```rust
/// use gff2gff3::convert::{convert_lines, ConvertOptions};
///
/// let conversion = convert_lines(
///     vec![
///         "chr1\tGMC\tgene\t100\t500\t.\t+\t.\tgene_id \"g1\";",
///         "chr1\tGMC\texon\t100\t200\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";",
///     ],
///     &ConvertOptions::default(),
/// )
/// .unwrap();
///
/// assert_eq!(conversion.lines[0], "##gff-version 3");
/// assert!(conversion.lines[1].ends_with("\tID=gene1;gene_id=g1"));
/// assert!(conversion.lines[2].contains("\tID=exon1;Parent=gene1;"));
/// ```
pub fn convert_lines<I, S>(lines: I, options: &ConvertOptions) -> Result<Conversion>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let records = gff2::parse_lines(lines)?;
    Ok(convert_records(records, options))
}

/// Converts GFF2 data from any `std::io::Read` object
pub fn convert_reader<R: Read>(reader: R, options: &ConvertOptions) -> Result<Conversion> {
    let records = gff2::Reader::new(reader).records()?;
    Ok(convert_records(records, options))
}

/// Converts a GFF2 file
pub fn convert_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Conversion> {
    let records = gff2::Reader::from_file(path.as_ref())?.records()?;
    let conversion = convert_records(records, options);
    info!(
        "Converted {}: {} features, {} warnings",
        path.as_ref().display(),
        conversion.feature_count(),
        conversion.warnings.len()
    );
    Ok(conversion)
}

/// Runs the infallible part of the pipeline on already parsed records
pub fn convert_records(records: Records, options: &ConvertOptions) -> Conversion {
    let Records { records, mut warnings } = records;

    let Hierarchy {
        mut trees,
        warnings: hierarchy_warnings,
    } = if options.adjacency_grouping {
        HierarchyBuilder::new(AdjacencyGrouping::new(AttributeGrouping)).build(records)
    } else {
        HierarchyBuilder::new(AttributeGrouping).build(records)
    };
    warnings.extend(hierarchy_warnings);
    if options.transcripts_only {
        trees = transcripts_only(trees);
    }

    IdAssigner::new().assign(&mut trees);

    Conversion {
        lines: gff3::to_lines(&trees, &options.writer_options()),
        warnings,
    }
}
