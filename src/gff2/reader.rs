use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, warn};

use crate::models::{Attributes, FeatureRecord, Frame, Strand};
use crate::utils::errors::{ConvertError, Result, Warning};

const N_COLUMNS: usize = 9;

/// A parsed GFF2 data line and the recoverable issues found while parsing it
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub record: FeatureRecord,
    pub warnings: Vec<Warning>,
}

/// All records of one input and the warnings collected on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records {
    pub records: Vec<FeatureRecord>,
    pub warnings: Vec<Warning>,
}

impl Records {
    fn push(&mut self, parsed: ParsedLine) {
        self.records.push(parsed.record);
        self.warnings.extend(parsed.warnings);
    }
}

/// Lines without feature information: comments, blank lines and
/// UCSC browser directives
fn is_skippable(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
}

/// Parses a single GFF2 line
///
/// Returns `Ok(None)` for lines that do not hold a feature (comments, blank lines,
/// `track` and `browser` lines).
///
/// # Examples
///
/// ```rust
/// use gff2gff3::gff2::parse_line;
///
/// let line = "chr1\tGMC\texon\t100\t200\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";";
/// let parsed = parse_line(line, 1).unwrap().unwrap();
/// assert_eq!(parsed.record.feature_type(), "exon");
/// assert_eq!(parsed.record.start(), 100);
/// assert_eq!(parsed.record.transcript_id(), Some("t1"));
///
/// assert!(parse_line("# a comment", 2).unwrap().is_none());
/// assert!(parse_line("chr1\tGMC\texon\t100", 3).is_err());
/// ```
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<ParsedLine>> {
    let line = line.trim_end_matches(['\n', '\r']);
    if is_skippable(line) {
        debug!("Skipping line {}", line_no);
        return Ok(None);
    }

    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() < N_COLUMNS {
        return Err(ConvertError::malformed(
            line_no,
            format!("{} tab-separated columns", N_COLUMNS),
            format!("{} columns", cols.len()),
        ));
    }
    if cols.len() > N_COLUMNS {
        debug!(
            "Ignoring {} extra columns on line {}",
            cols.len() - N_COLUMNS,
            line_no
        );
    }

    let (start, end) = parse_coordinates(cols[3], cols[4], line_no)?;

    let mut record = FeatureRecord::new(cols[0], cols[1], cols[2], start, end);
    record.set_line(Some(line_no));
    record.set_score(parse_score(cols[5], line_no)?);
    record.set_strand(
        cols[6]
            .parse::<Strand>()
            .map_err(|err| ConvertError::malformed(line_no, "strand '+', '-' or '.'", err))?,
    );
    record.set_frame(
        cols[7]
            .parse::<Frame>()
            .map_err(|err| ConvertError::malformed(line_no, "frame '0', '1', '2' or '.'", err))?,
    );

    let (attributes, duplicates) = Attributes::from_gff2(cols[8]);
    let warnings = duplicates
        .into_iter()
        .map(|key| {
            let warning = Warning::DuplicateAttribute {
                line: line_no,
                feature_type: cols[2].to_string(),
                key,
                raw_attributes: cols[8].to_string(),
            };
            warn!("{}", warning);
            warning
        })
        .collect();
    record.set_attributes(attributes);

    Ok(Some(ParsedLine { record, warnings }))
}

fn parse_coordinates(start: &str, end: &str, line_no: usize) -> Result<(u64, u64)> {
    let parse = |value: &str| match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ConvertError::invalid_coordinate(
            line_no,
            start,
            end,
            format!("'{}' is not a positive integer", value),
        )),
        Ok(x) => Ok(x),
    };
    let (s, e) = (parse(start)?, parse(end)?);
    if s > e {
        return Err(ConvertError::invalid_coordinate(
            line_no,
            start,
            end,
            "start is greater than end",
        ));
    }
    Ok((s, e))
}

fn parse_score(score: &str, line_no: usize) -> Result<Option<f64>> {
    match score.trim() {
        "" | "." => Ok(None),
        s => match s.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(Some(x)),
            _ => Err(ConvertError::malformed(
                line_no,
                "numeric score or '.'",
                format!("'{}'", s),
            )),
        },
    }
}

/// Parses GFF2 records from an in-memory sequence of lines
///
/// Line numbers are counted from 1, including skipped lines.
pub fn parse_lines<I, S>(lines: I) -> Result<Records>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut res = Records::default();
    for (idx, line) in lines.into_iter().enumerate() {
        if let Some(parsed) = parse_line(line.as_ref(), idx + 1)? {
            res.push(parsed);
        }
    }
    Ok(res)
}

/// Parses GFF2 files and returns [`FeatureRecord`]s
///
/// The reader can be used as an iterator over all data lines, or
/// consumed at once using [`records`](`Reader::records`).
///
/// # Examples
///
/// ```rust
/// use gff2gff3::gff2::Reader;
///
/// let data = b"##gff-version 2\nchr1\tGMC\tCDS\t10\t20\t.\t-\t0\tgene_id \"g1\";\n";
/// let mut reader = Reader::new(&data[..]);
/// let parsed = reader.records().unwrap();
/// assert_eq!(parsed.records.len(), 1);
/// assert_eq!(parsed.records[0].line(), Some(2));
/// ```
pub struct Reader<R> {
    inner: BufReader<R>,
    buffer: String,
    line_no: usize,
}

impl Reader<File> {
    /// Creates a Reader instance that reads from a File
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(file))
    }
}

impl<R: Read> Reader<R> {
    /// Creates a new Reader instance from any `std::io::Read` object
    pub fn new(reader: R) -> Self {
        Reader::from_buf_reader(BufReader::new(reader))
    }

    /// Creates a new Reader instance with a known capacity
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Reader::from_buf_reader(BufReader::with_capacity(capacity, reader))
    }

    fn from_buf_reader(reader: BufReader<R>) -> Self {
        Reader {
            inner: reader,
            buffer: String::with_capacity(256),
            line_no: 0,
        }
    }

    /// Returns the next data line, skipping comments and blank lines
    ///
    /// Returns `Ok(None)` at the end of the input.
    pub fn read_record(&mut self) -> Result<Option<ParsedLine>> {
        loop {
            self.buffer.clear();
            if self.inner.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if let Some(parsed) = parse_line(&self.buffer, self.line_no)? {
                return Ok(Some(parsed));
            }
        }
    }

    /// Reads all remaining records
    ///
    /// Stops at the first fatal error; no records are returned in that case.
    pub fn records(&mut self) -> Result<Records> {
        let mut res = Records::default();
        while let Some(parsed) = self.read_record()? {
            res.push(parsed);
        }
        Ok(res)
    }
}

impl<R: Read> Iterator for Reader<R> {
    type Item = Result<ParsedLine>;
    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}
