//! FASTA alignments, read and written through `bio::io::fasta`
//!
//! A FASTA file holds exactly one alignment: every record in the file. An empty file
//! holds none.

use crate::alignment::{AlignedSeq, Alignment};
use crate::error::{ConvertError, Result};
use crate::formats::AlignmentWriter;
use bio::io::fasta;
use std::io::{self, BufRead, BufReader, Write};

const FORMAT: &str = "fasta";

/// Reader yielding the single alignment of a FASTA stream
pub struct FastaReader<R: BufRead> {
    records: Option<fasta::Records<BufReader<R>>>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            records: Some(fasta::Reader::new(reader).records()),
        }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<Alignment>;

    fn next(&mut self) -> Option<Self::Item> {
        let records = self.records.take()?;
        let mut rows = Vec::new();
        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(e) => return Some(Err(map_fasta_error(e))),
            };
            rows.push(AlignedSeq {
                id: record.id().to_string(),
                description: record.desc().map(str::to_string),
                sequence: String::from_utf8_lossy(record.seq()).into_owned(),
            });
        }
        if rows.is_empty() {
            return None;
        }
        Some(Alignment::new(rows))
    }
}

// bio reports grammar problems as io::Error; keep real I/O failures distinct.
fn map_fasta_error(e: io::Error) -> ConvertError {
    match e.kind() {
        io::ErrorKind::Other | io::ErrorKind::InvalidData => ConvertError::Malformed {
            format: FORMAT,
            message: e.to_string(),
        },
        _ => ConvertError::Io(e),
    }
}

/// Writes every alignment row as a FASTA record
pub struct FastaWriter<W: Write> {
    inner: fasta::Writer<W>,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: fasta::Writer::new(writer),
        }
    }
}

impl<W: Write> AlignmentWriter for FastaWriter<W> {
    fn write_alignment(&mut self, alignment: &Alignment) -> Result<()> {
        for record in alignment {
            self.inner.write(
                &record.id,
                record.description.as_deref(),
                record.sequence.as_bytes(),
            )?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_single_alignment() {
        let input = ">seq1 first one\nACGT\n--GG\n>seq2\nACGTAAGG\n";
        let alignments: Vec<Alignment> = FastaReader::new(Cursor::new(input))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(alignments.len(), 1);
        let aln = &alignments[0];
        assert_eq!(aln.len(), 2);
        assert_eq!(aln.records()[0].id, "seq1");
        assert_eq!(aln.records()[0].description.as_deref(), Some("first one"));
        assert_eq!(aln.records()[0].sequence, "ACGT--GG");
        assert_eq!(aln.records()[1].id, "seq2");
        assert_eq!(aln.records()[1].description, None);
    }

    #[test]
    fn test_empty_input_has_no_alignments() {
        let mut reader = FastaReader::new(Cursor::new(""));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_missing_header_is_malformed() {
        let mut reader = FastaReader::new(Cursor::new("ACGT\n>seq1\nACGT\n"));
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, ConvertError::Malformed { .. }));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_unequal_lengths_rejected() {
        let mut reader = FastaReader::new(Cursor::new(">a\nACGT\n>b\nACG\n"));
        assert!(reader.next().unwrap().is_err());
    }

    #[test]
    fn test_write_keeps_description() {
        let aln = Alignment::new(vec![
            AlignedSeq {
                id: "seq1".to_string(),
                description: Some("first one".to_string()),
                sequence: "AC-T".to_string(),
            },
            AlignedSeq::new("seq2", "ACGT"),
        ])
        .unwrap();

        let mut out = Vec::new();
        {
            let mut writer = FastaWriter::new(&mut out);
            writer.write_alignment(&aln).unwrap();
            writer.finish().unwrap();
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            ">seq1 first one\nAC-T\n>seq2\nACGT\n"
        );
    }
}
