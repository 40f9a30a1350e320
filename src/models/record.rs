use crate::models::{Attributes, Frame, Strand};

const GENE_TYPES: [&str; 3] = ["gene", "pseudogene", "ncRNA_gene"];

const TRANSCRIPT_TYPES: [&str; 11] = [
    "mRNA",
    "transcript",
    "ncRNA",
    "lnc_RNA",
    "tRNA",
    "rRNA",
    "snRNA",
    "snoRNA",
    "miRNA",
    "primary_transcript",
    "pseudogenic_transcript",
];

const CHILD_TYPES: [&str; 11] = [
    "exon",
    "CDS",
    "UTR",
    "five_prime_UTR",
    "three_prime_UTR",
    "5UTR",
    "3UTR",
    "start_codon",
    "stop_codon",
    "intron",
    "Selenocysteine",
];

/// Level of a feature type in the gene → transcript → child grammar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Gene,
    Transcript,
    /// Leaf features of a transcript, e.g. `exon` or `CDS`
    Child,
    /// Any feature type outside the gene model vocabulary
    Other,
}

impl FeatureKind {
    pub fn from_type(feature_type: &str) -> Self {
        if GENE_TYPES.contains(&feature_type) {
            FeatureKind::Gene
        } else if TRANSCRIPT_TYPES.contains(&feature_type) {
            FeatureKind::Transcript
        } else if CHILD_TYPES.contains(&feature_type) {
            FeatureKind::Child
        } else {
            FeatureKind::Other
        }
    }

    /// Can a feature of kind `child` be placed below a feature of this kind
    pub fn accepts(&self, child: FeatureKind) -> bool {
        matches!(
            (self, child),
            (FeatureKind::Gene, FeatureKind::Transcript)
                | (FeatureKind::Gene, FeatureKind::Child)
                | (FeatureKind::Gene, FeatureKind::Other)
                | (FeatureKind::Transcript, FeatureKind::Child)
                | (FeatureKind::Transcript, FeatureKind::Other)
        )
    }
}

/// A single annotated genomic interval, i.e. one line of a GFF file
///
/// Records are created by the [GFF2 parser](`crate::gff2`) and later receive
/// their GFF3 identifiers from the [`IdAssigner`](`crate::ids::IdAssigner`).
///
/// # Examples
///
/// ```rust
/// use gff2gff3::models::{FeatureKind, FeatureRecord, Strand};
///
/// let mut exon = FeatureRecord::new("chr1", "GMC", "exon", 100, 200);
/// exon.set_strand(Strand::Plus);
/// exon.attributes_mut().insert("transcript_id", "t1");
///
/// assert_eq!(exon.kind(), FeatureKind::Child);
/// assert_eq!(exon.transcript_id(), Some("t1"));
/// assert_eq!(exon.gene_id(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    seq_id: String,
    source: String,
    feature_type: String,
    start: u64,
    end: u64,
    score: Option<f64>,
    strand: Strand,
    frame: Frame,
    attributes: Attributes,
    assigned_id: Option<String>,
    parent_id: Option<String>,
    line: Option<usize>,
}

impl FeatureRecord {
    pub fn new(seq_id: &str, source: &str, feature_type: &str, start: u64, end: u64) -> Self {
        FeatureRecord {
            seq_id: seq_id.to_string(),
            source: source.to_string(),
            feature_type: feature_type.to_string(),
            start,
            end,
            score: None,
            strand: Strand::Unknown,
            frame: Frame::None,
            attributes: Attributes::new(),
            assigned_id: None,
            parent_id: None,
            line: None,
        }
    }

    pub fn seq_id(&self) -> &str {
        &self.seq_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
    }

    pub fn feature_type(&self) -> &str {
        &self.feature_type
    }

    pub fn kind(&self) -> FeatureKind {
        FeatureKind::from_type(&self.feature_type)
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Widens the record to include the interval `start..=end`
    pub fn expand(&mut self, start: u64, end: u64) {
        self.start = self.start.min(start);
        self.end = self.end.max(end);
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn set_score(&mut self, score: Option<f64>) {
        self.score = score;
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn set_strand(&mut self, strand: Strand) {
        self.strand = strand;
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    /// The legacy `gene_id` attribute
    pub fn gene_id(&self) -> Option<&str> {
        self.attributes.get("gene_id").filter(|s| !s.is_empty())
    }

    /// The legacy `transcript_id` attribute
    pub fn transcript_id(&self) -> Option<&str> {
        self.attributes.get("transcript_id").filter(|s| !s.is_empty())
    }

    pub fn assigned_id(&self) -> Option<&str> {
        self.assigned_id.as_deref()
    }

    pub fn set_assigned_id(&mut self, id: String) {
        self.assigned_id = Some(id);
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn set_parent_id(&mut self, id: Option<String>) {
        self.parent_id = id;
    }

    /// 1-based line number in the input file, `None` for synthetic records
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn set_line(&mut self, line: Option<usize>) {
        self.line = line;
    }

    /// Records that were not part of the input, but created to hold orphans
    pub fn is_synthetic(&self) -> bool {
        self.line.is_none()
    }
}

#[cfg(test)]
mod test_record {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(FeatureKind::from_type("gene"), FeatureKind::Gene);
        assert_eq!(FeatureKind::from_type("mRNA"), FeatureKind::Transcript);
        assert_eq!(FeatureKind::from_type("transcript"), FeatureKind::Transcript);
        assert_eq!(FeatureKind::from_type("CDS"), FeatureKind::Child);
        assert_eq!(FeatureKind::from_type("stop_codon"), FeatureKind::Child);
        assert_eq!(FeatureKind::from_type("repeat_region"), FeatureKind::Other);
        // types are case sensitive
        assert_eq!(FeatureKind::from_type("Exon"), FeatureKind::Other);
    }

    #[test]
    fn test_grammar() {
        assert!(FeatureKind::Gene.accepts(FeatureKind::Transcript));
        assert!(FeatureKind::Gene.accepts(FeatureKind::Child));
        assert!(FeatureKind::Transcript.accepts(FeatureKind::Child));
        assert!(!FeatureKind::Transcript.accepts(FeatureKind::Gene));
        assert!(!FeatureKind::Child.accepts(FeatureKind::Child));
        assert!(!FeatureKind::Gene.accepts(FeatureKind::Gene));
    }

    #[test]
    fn test_grouping_attributes() {
        let mut rec = FeatureRecord::new("chr1", "GMC", "exon", 1, 10);
        assert_eq!(rec.gene_id(), None);
        rec.attributes_mut().insert("gene_id", "");
        assert_eq!(rec.gene_id(), None);
        rec.attributes_mut().insert("gene_id", "g1");
        assert_eq!(rec.gene_id(), Some("g1"));
    }

    #[test]
    fn test_expand() {
        let mut rec = FeatureRecord::new("chr1", "GMC", "mRNA", 50, 60);
        rec.expand(10, 55);
        rec.expand(40, 90);
        assert_eq!((rec.start(), rec.end()), (10, 90));
        assert!(rec.is_synthetic());
        rec.set_line(Some(4));
        assert!(!rec.is_synthetic());
    }
}
