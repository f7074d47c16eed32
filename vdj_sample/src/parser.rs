// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

use crate::clonotype::{Clonotype, ClonotypeIdentity};
use anyhow::{Context, Result};
use csv::{StringRecord, StringRecordsIntoIter};
use log::{debug, info};
use std::io::Read;
use vdj_types::Software;

/// A lazy stream of clonotypes feeding sample construction.
///
/// `Ok(None)` marks a row that was skipped (malformed or filtered by the
/// source) and is not an error. `Err` aborts the construction of the sample.
pub trait ClonotypeStreamParser: Iterator<Item = Result<Option<Clonotype>>> {
    /// Called exactly once after the stream has been consumed, including when
    /// the consumer stopped early.
    fn finish(&mut self) {}

    /// True if the source reports one row per read, in which case frequencies
    /// are only meaningful once the whole sample is known.
    fn is_per_read_output(&self) -> bool {
        false
    }
}

/// Source over clonotypes that are already in memory.
pub struct IterSource<I> {
    inner: I,
    per_read: bool,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Option<Clonotype>>,
{
    /// Wrap an iterator of clonotypes or skipped-row markers.
    pub fn new<T>(items: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        IterSource {
            inner: items.into_iter(),
            per_read: false,
        }
    }

    /// Mark the source as per-read output.
    pub fn per_read(mut self) -> Self {
        self.per_read = true;
        self
    }
}

impl<I> Iterator for IterSource<I>
where
    I: Iterator<Item = Option<Clonotype>>,
{
    type Item = Result<Option<Clonotype>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Ok)
    }
}

impl<I> ClonotypeStreamParser for IterSource<I>
where
    I: Iterator<Item = Option<Clonotype>>,
{
    fn is_per_read_output(&self) -> bool {
        self.per_read
    }
}

/// Column positions of one software dialect.
#[derive(Debug, Clone, Copy)]
struct Columns {
    header_lines: usize,
    count: usize,
    freq: usize,
    cdr3nt: usize,
    cdr3aa: usize,
    v: usize,
    d: usize,
    j: usize,
}

impl Columns {
    fn of(software: Software) -> Columns {
        match software {
            Software::VdjTools => Columns {
                header_lines: 1,
                count: 0,
                freq: 1,
                cdr3nt: 2,
                cdr3aa: 3,
                v: 4,
                d: 5,
                j: 6,
            },
            Software::MiGec => Columns {
                header_lines: 1,
                count: 0,
                freq: 1,
                cdr3nt: 2,
                cdr3aa: 3,
                v: 4,
                j: 5,
                d: 6,
            },
            // Version line followed by the column header.
            Software::MiTcr => Columns {
                header_lines: 2,
                count: 0,
                freq: 1,
                cdr3nt: 2,
                cdr3aa: 5,
                v: 7,
                j: 9,
                d: 11,
            },
        }
    }
}

/// Parser for tab-delimited clonotype tables.
pub struct TabularParser<R: Read> {
    records: StringRecordsIntoIter<R>,
    software: Software,
    columns: Columns,
    rows: usize,
    skipped: usize,
}

impl<R: Read> TabularParser<R> {
    /// Create a parser and consume the header lines of `software`.
    pub fn new(reader: R, software: Software) -> Result<Self> {
        let columns = Columns::of(software);
        let mut records = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader)
            .into_records();
        for _ in 0..columns.header_lines {
            if let Some(header) = records.next() {
                header.with_context(|| format!("reading {software} table header"))?;
            }
        }
        Ok(TabularParser {
            records,
            software,
            columns,
            rows: 0,
            skipped: 0,
        })
    }

    fn decode(&self, record: &StringRecord) -> Option<Clonotype> {
        let c = &self.columns;
        let field = |i: usize| record.get(i).map(str::trim);
        let count: u64 = field(c.count)?.parse().ok()?;
        let freq: f64 = field(c.freq)?.parse().ok()?;
        if count == 0 || !freq.is_finite() {
            return None;
        }
        let identity = ClonotypeIdentity::new(
            field(c.cdr3nt)?,
            field(c.cdr3aa)?,
            field(c.v)?,
            // Dialects leave D empty when it was not determined.
            field(c.d).filter(|d| !d.is_empty()).unwrap_or("."),
            field(c.j)?,
        );
        if identity.cdr3nt.is_empty() && identity.cdr3aa.is_empty() {
            return None;
        }
        Some(Clonotype::new(count, freq, identity))
    }
}

impl<R: Read> Iterator for TabularParser<R> {
    type Item = Result<Option<Clonotype>>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                self.rows += 1;
                self.skipped += 1;
                debug!("skipping malformed {} row {}: {e}", self.software, self.rows);
                return Some(Ok(None));
            }
            Err(e) => {
                return Some(
                    Err(e).with_context(|| format!("reading {} table", self.software)),
                )
            }
        };
        self.rows += 1;
        let clonotype = self.decode(&record);
        if clonotype.is_none() {
            self.skipped += 1;
            debug!(
                "skipping malformed {} row {}: {:?}",
                self.software,
                self.rows,
                record.iter().collect::<Vec<_>>()
            );
        }
        Some(Ok(clonotype))
    }
}

impl<R: Read> ClonotypeStreamParser for TabularParser<R> {
    fn finish(&mut self) {
        info!(
            "read {} rows from {} table, skipped {}",
            self.rows, self.software, self.skipped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VDJTOOLS: &str = "count\tfreq\tcdr3nt\tcdr3aa\tv\td\tj
20\t0.5\tTGTGCCAGCAGT\tCASS\tTRBV12-3\tTRBD1\tTRBJ2-7
not_a_number\t0.1\tTGTGCC\tCA\tTRBV12-3\t.\tTRBJ2-7
10\t0.25\tTGTGCCTGG\tCAW\tTRBV5-1\t\tTRBJ1-1
10\t0.25\tTGTGCCTGG
";

    #[test]
    fn test_vdjtools_table() {
        let parser = TabularParser::new(VDJTOOLS.as_bytes(), Software::VdjTools).unwrap();
        let rows: Vec<_> = parser.map(Result::unwrap).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[0],
            Some(Clonotype::new(
                20,
                0.5,
                ClonotypeIdentity::new("TGTGCCAGCAGT", "CASS", "TRBV12-3", "TRBD1", "TRBJ2-7")
            ))
        );
        assert_eq!(rows[1], None);
        assert_eq!(rows[2].as_ref().map(Clonotype::d), Some("."));
        assert_eq!(rows[3], None);
    }

    #[test]
    fn test_invalid_utf8_row_is_skipped() {
        let table: &[u8] = b"count\tfreq\tcdr3nt\tcdr3aa\tv\td\tj
5\t0.5\tTGTGCC\tCA\tTRBV1\t.\tTRBJ1-1
3\t0.3\tTGT\xffGCC\tCA\tTRBV1\t.\tTRBJ1-1
2\t0.2\tTGTGCT\tCA\tTRBV1\t.\tTRBJ1-1
";
        let parser = TabularParser::new(table, Software::VdjTools).unwrap();
        let rows: Vec<_> = parser.map(Result::unwrap).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], None);
        assert_eq!(rows[2].as_ref().map(Clonotype::cdr3nt), Some("TGTGCT"));
    }

    #[test]
    fn test_migec_column_order() {
        let table = "Count\tPercentage\tCDR3 nucleotide sequence\tCDR3 amino acid sequence\tV segments\tJ segments\tD segments
7\t0.7\tTGTGCC\tCA\tTRBV1\tTRBJ1-1\tTRBD2
";
        let mut parser = TabularParser::new(table.as_bytes(), Software::MiGec).unwrap();
        let clonotype = parser.next().unwrap().unwrap().unwrap();
        assert_eq!(clonotype.v(), "TRBV1");
        assert_eq!(clonotype.j(), "TRBJ1-1");
        assert_eq!(clonotype.d(), "TRBD2");
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_mitcr_skips_version_line() {
        let table = "MiTCRFullExportV1.1
Read count\tPercentage\tCDR3 nucleotide sequence\tCDR3 nucleotide quality\tMin quality\tCDR3 amino acid sequence\tV alleles\tV segments\tJ alleles\tJ segments\tD alleles\tD segments
3\t0.3\tTGTGCC\tIIIIII\t40\tCA\tTRBV1*01\tTRBV1\tTRBJ1-1*01\tTRBJ1-1\t\t
";
        let mut parser = TabularParser::new(table.as_bytes(), Software::MiTcr).unwrap();
        let clonotype = parser.next().unwrap().unwrap().unwrap();
        assert_eq!(clonotype.count(), 3);
        assert_eq!(clonotype.cdr3aa(), "CA");
        assert_eq!(clonotype.v(), "TRBV1");
        assert_eq!(clonotype.j(), "TRBJ1-1");
        assert_eq!(clonotype.d(), ".");
        assert!(!parser.is_per_read_output());
    }

    #[test]
    fn test_iter_source() {
        let source = IterSource::new(vec![None::<Clonotype>]).per_read();
        assert!(source.is_per_read_output());
        let items: Vec<_> = source.map(Result::unwrap).collect();
        assert_eq!(items, vec![None]);
    }
}
