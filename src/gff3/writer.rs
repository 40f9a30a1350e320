use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::{encode, FeatureRecord, FeatureTree};
use crate::utils::errors::{ConvertError, Result};

pub const HEADER: &str = "##gff-version 3";
const RESOLUTION_DIRECTIVE: &str = "###";

/// Attribute keys that are generated from the tree structure
const RESERVED_KEYS: [&str; 2] = ["ID", "Parent"];

/// Output settings of the GFF3 writer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriterOptions {
    /// Emit `##sequence-region` directives after the header
    pub sequence_region: bool,
    /// Emit `###` after every top-level feature tree
    pub resolution_directive: bool,
    /// Replaces the source column of every feature
    pub source: Option<String>,
}

/// Writes [`FeatureTree`]s as GFF3 into a `BufWriter`
///
/// The trees must have their identifiers assigned by an
/// [`IdAssigner`](`crate::ids::IdAssigner`).
///
/// # Examples
///
/// ```rust
/// use gff2gff3::gff3::Writer;
/// use gff2gff3::ids::IdAssigner;
/// use gff2gff3::models::{FeatureRecord, FeatureTree, Strand};
///
/// let mut gene = FeatureRecord::new("chr1", "GMC", "gene", 100, 500);
/// gene.set_strand(Strand::Plus);
/// let mut trees = vec![FeatureTree::new(gene)];
/// IdAssigner::new().assign(&mut trees);
///
/// let output = Vec::new(); // substitute this with proper IO (io::stdout())
/// let mut writer = Writer::new(output);
/// writer.write_trees(&trees).unwrap();
///
/// assert_eq!(
///     writer.into_inner().unwrap(),
///     b"##gff-version 3\nchr1\tGMC\tgene\t100\t500\t.\t+\t.\tID=gene1\n"
/// );
/// ```
pub struct Writer<W: std::io::Write> {
    inner: BufWriter<W>,
    header_written: bool,
    options: WriterOptions,
}

impl Writer<File> {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(file))
    }
}

impl<W: std::io::Write> Writer<W> {
    /// Creates a new generic Writer for any `std::io::Write` object
    pub fn new(writer: W) -> Self {
        Writer::from_buf_writer(BufWriter::new(writer))
    }

    pub fn with_capacity(capacity: usize, writer: W) -> Self {
        Writer::from_buf_writer(BufWriter::with_capacity(capacity, writer))
    }

    fn from_buf_writer(writer: BufWriter<W>) -> Self {
        Writer {
            inner: writer,
            header_written: false,
            options: WriterOptions::default(),
        }
    }

    pub fn options(&mut self, options: WriterOptions) {
        self.options = options
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.inner.flush()?)
    }

    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|err| ConvertError::Io(err.into_error()))
    }

    /// Writes the header, unless it was already written
    ///
    /// The trees are only needed for the `##sequence-region` directives.
    pub fn write_header(&mut self, trees: &[FeatureTree]) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        for line in header_lines(trees, self.options.sequence_region) {
            self.writeln(&line)?;
        }
        self.header_written = true;
        Ok(())
    }

    /// Writes all trees in depth-first pre-order
    pub fn write_trees(&mut self, trees: &[FeatureTree]) -> Result<()> {
        self.write_header(trees)?;
        for tree in trees {
            self.write_tree(tree)?;
        }
        Ok(())
    }

    pub fn write_tree(&mut self, tree: &FeatureTree) -> Result<()> {
        for record in tree.records() {
            let line = Gff3Line::new(record, self.options.source.as_deref());
            self.writeln(line.as_str())?;
        }
        if self.options.resolution_directive {
            self.writeln(RESOLUTION_DIRECTIVE)?;
        }
        Ok(())
    }

    fn writeln(&mut self, line: &str) -> Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all("\n".as_bytes())?;
        Ok(())
    }
}

/// Renders the trees as GFF3 lines, header included, without newlines
///
/// ```rust
/// use gff2gff3::gff3::{to_lines, WriterOptions};
///
/// let lines = to_lines(&[], &WriterOptions::default());
/// assert_eq!(lines, vec!["##gff-version 3".to_string()]);
/// ```
pub fn to_lines(trees: &[FeatureTree], options: &WriterOptions) -> Vec<String> {
    let mut lines = header_lines(trees, options.sequence_region);
    for tree in trees {
        lines.extend(
            tree.records()
                .into_iter()
                .map(|r| Gff3Line::new(r, options.source.as_deref()).line),
        );
        if options.resolution_directive {
            lines.push(RESOLUTION_DIRECTIVE.to_string());
        }
    }
    lines
}

fn header_lines(trees: &[FeatureTree], sequence_region: bool) -> Vec<String> {
    let mut lines = vec![HEADER.to_string()];
    if !sequence_region {
        return lines;
    }
    // sequences in order of first appearance
    let mut regions: Vec<(&str, u64, u64)> = vec![];
    for record in trees.iter().flat_map(|t| t.records()) {
        match regions.iter_mut().find(|r| r.0 == record.seq_id()) {
            Some(region) => {
                region.1 = region.1.min(record.start());
                region.2 = region.2.max(record.end());
            }
            None => regions.push((record.seq_id(), record.start(), record.end())),
        }
    }
    lines.extend(
        regions
            .into_iter()
            .map(|(seq_id, start, end)| format!("##sequence-region {} {} {}", seq_id, start, end)),
    );
    lines
}

/// A single feature line of a GFF3 file
struct Gff3Line {
    line: String,
}

impl Gff3Line {
    fn new(record: &FeatureRecord, source: Option<&str>) -> Self {
        let source = source.unwrap_or(record.source());
        Gff3Line {
            line: [
                record.seq_id().to_string(),
                dot_if_empty(source),
                record.feature_type().to_string(),
                record.start().to_string(),
                record.end().to_string(),
                record.score().map_or(".".to_string(), |s| s.to_string()),
                record.strand().to_string(),
                record.frame().to_string(),
                attribute_column(record),
            ]
            .join("\t"),
        }
    }

    fn as_str(&self) -> &str {
        &self.line
    }
}

fn dot_if_empty(s: &str) -> String {
    if s.is_empty() {
        ".".to_string()
    } else {
        s.to_string()
    }
}

fn attribute_column(record: &FeatureRecord) -> String {
    let mut pairs = vec![];
    if let Some(id) = record.assigned_id() {
        pairs.push(format!("ID={}", encode(id)));
    }
    if let Some(parent) = record.parent_id() {
        pairs.push(format!("Parent={}", encode(parent)));
    }
    for (key, value) in record.attributes().iter() {
        if RESERVED_KEYS.contains(&key) {
            log::debug!(
                "Dropping legacy '{}' attribute of {} {:?}",
                key,
                record.feature_type(),
                record.assigned_id()
            );
            continue;
        }
        pairs.push(format!("{}={}", encode(key), encode(value)));
    }
    if pairs.is_empty() {
        return ".".to_string();
    }
    pairs.join(";")
}

#[cfg(test)]
mod test_gff3_writer {
    use super::*;
    use crate::ids::IdAssigner;
    use crate::models::{Frame, Strand};

    fn annotated_gene() -> Vec<FeatureTree> {
        let mut gene = FeatureRecord::new("chr1", "GMC", "gene", 100, 500);
        gene.set_strand(Strand::Plus);
        gene.attributes_mut().insert("gene_id", "g1");
        let mut exon = FeatureRecord::new("chr1", "GMC", "CDS", 100, 200);
        exon.set_strand(Strand::Plus);
        exon.set_frame(Frame::Zero);
        exon.set_score(Some(0.5));
        exon.attributes_mut().insert("gene_id", "g1");
        exon.attributes_mut().insert("note", "contains; semicolon");
        let mut tree = FeatureTree::new(gene);
        tree.push(FeatureTree::new(exon));
        let mut trees = vec![tree, FeatureTree::new(FeatureRecord::new("chr2", "", "exon", 5, 9))];
        IdAssigner::new().assign(&mut trees);
        trees
    }

    #[test]
    fn test_lines() {
        let lines = to_lines(&annotated_gene(), &WriterOptions::default());
        assert_eq!(
            lines,
            vec![
                "##gff-version 3",
                "chr1\tGMC\tgene\t100\t500\t.\t+\t.\tID=gene1;gene_id=g1",
                "chr1\tGMC\tCDS\t100\t200\t0.5\t+\t0\tID=CDS1;Parent=gene1;gene_id=g1;note=contains%3B semicolon",
                "chr2\t.\texon\t5\t9\t.\t.\t.\tID=exon1",
            ]
        );
    }

    #[test]
    fn test_writer_matches_lines() {
        let trees = annotated_gene();
        let mut writer = Writer::new(Vec::new());
        writer.write_trees(&trees).unwrap();
        // header is only written once
        writer.write_header(&trees).unwrap();
        let written = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let expected = to_lines(&trees, &WriterOptions::default()).join("\n") + "\n";
        assert_eq!(written, expected);
        assert!(!written.ends_with("\n\n"));
    }

    #[test]
    fn test_directives_and_source() {
        let options = WriterOptions {
            sequence_region: true,
            resolution_directive: true,
            source: Some("GEP".to_string()),
        };
        let lines = to_lines(&annotated_gene(), &options);
        assert_eq!(lines[0], "##gff-version 3");
        assert_eq!(lines[1], "##sequence-region chr1 100 500");
        assert_eq!(lines[2], "##sequence-region chr2 5 9");
        assert!(lines[3].starts_with("chr1\tGEP\tgene"));
        assert_eq!(lines[5], "###");
        assert!(lines[6].starts_with("chr2\tGEP\texon"));
        assert_eq!(lines[7], "###");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_reserved_legacy_keys_are_dropped() {
        let mut rec = FeatureRecord::new("chr1", "GMC", "exon", 1, 2);
        rec.attributes_mut().insert("ID", "old");
        rec.attributes_mut().insert("Parent", "older");
        rec.attributes_mut().insert("Name", "kept");
        let mut trees = vec![FeatureTree::new(rec)];
        IdAssigner::new().assign(&mut trees);
        let lines = to_lines(&trees, &WriterOptions::default());
        assert!(lines[1].ends_with("\tID=exon1;Name=kept"));
    }

    #[test]
    fn test_unassigned_record() {
        let rec = FeatureRecord::new("chr1", "GMC", "exon", 1, 2);
        let line = Gff3Line::new(&rec, None);
        assert_eq!(line.as_str(), "chr1\tGMC\texon\t1\t2\t.\t.\t.\t.");
    }
}
