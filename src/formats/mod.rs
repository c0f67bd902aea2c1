//! Alignment format registry
//!
//! Every format is selected by a tag (`fasta`, `phylip-relaxed`, ...) and provides two
//! capabilities: a lazy reader producing alignments one block at a time, and a writer
//! consuming them.

pub mod clustal;
pub mod fasta;
mod lines;
pub mod phylip;
pub mod stockholm;

use crate::alignment::Alignment;
use crate::error::{ConvertError, Result};
use clustal::{ClustalReader, ClustalWriter};
use fasta::{FastaReader, FastaWriter};
use phylip::{PhylipReader, PhylipStyle, PhylipWriter};
use std::io::{BufRead, Write};
use stockholm::{StockholmReader, StockholmWriter};

/// Lazy stream of alignments read from one input
pub type Alignments<'a> = Box<dyn Iterator<Item = Result<Alignment>> + 'a>;

/// Sink for alignments in a particular format
pub trait AlignmentWriter {
    /// Serialize one alignment. Fails without writing if the format cannot represent it.
    fn write_alignment(&mut self, alignment: &Alignment) -> Result<()>;

    /// Flush buffered output
    fn finish(&mut self) -> Result<()>;
}

/// Supported alignment formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFormat {
    Fasta,
    Phylip,
    PhylipRelaxed,
    PhylipSequential,
    Clustal,
    Stockholm,
}

impl AlignmentFormat {
    pub const ALL: [AlignmentFormat; 6] = [
        AlignmentFormat::Fasta,
        AlignmentFormat::Phylip,
        AlignmentFormat::PhylipRelaxed,
        AlignmentFormat::PhylipSequential,
        AlignmentFormat::Clustal,
        AlignmentFormat::Stockholm,
    ];

    /// Canonical tag
    pub fn name(self) -> &'static str {
        match self {
            AlignmentFormat::Fasta => "fasta",
            AlignmentFormat::Phylip => "phylip",
            AlignmentFormat::PhylipRelaxed => "phylip-relaxed",
            AlignmentFormat::PhylipSequential => "phylip-sequential",
            AlignmentFormat::Clustal => "clustal",
            AlignmentFormat::Stockholm => "stockholm",
        }
    }

    /// Lazily parse alignments from `reader`
    pub fn parse_alignments<'a, R: BufRead + 'a>(self, reader: R) -> Alignments<'a> {
        match self {
            AlignmentFormat::Fasta => Box::new(FastaReader::new(reader)),
            AlignmentFormat::Phylip => Box::new(PhylipReader::new(reader, PhylipStyle::Strict)),
            AlignmentFormat::PhylipRelaxed => {
                Box::new(PhylipReader::new(reader, PhylipStyle::Relaxed))
            }
            AlignmentFormat::PhylipSequential => {
                Box::new(PhylipReader::new(reader, PhylipStyle::Sequential))
            }
            AlignmentFormat::Clustal => Box::new(ClustalReader::new(reader)),
            AlignmentFormat::Stockholm => Box::new(StockholmReader::new(reader)),
        }
    }

    /// Writer serializing alignments into `writer`
    pub fn alignment_writer<'a, W: Write + 'a>(self, writer: W) -> Box<dyn AlignmentWriter + 'a> {
        match self {
            AlignmentFormat::Fasta => Box::new(FastaWriter::new(writer)),
            AlignmentFormat::Phylip => Box::new(PhylipWriter::new(writer, PhylipStyle::Strict)),
            AlignmentFormat::PhylipRelaxed => {
                Box::new(PhylipWriter::new(writer, PhylipStyle::Relaxed))
            }
            AlignmentFormat::PhylipSequential => {
                Box::new(PhylipWriter::new(writer, PhylipStyle::Sequential))
            }
            AlignmentFormat::Clustal => Box::new(ClustalWriter::new(writer)),
            AlignmentFormat::Stockholm => Box::new(StockholmWriter::new(writer)),
        }
    }

    fn supported() -> String {
        Self::ALL
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for AlignmentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for AlignmentFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fasta" | "fa" | "fas" => Ok(AlignmentFormat::Fasta),
            "phylip" => Ok(AlignmentFormat::Phylip),
            "phylip-relaxed" => Ok(AlignmentFormat::PhylipRelaxed),
            "phylip-sequential" => Ok(AlignmentFormat::PhylipSequential),
            "clustal" | "aln" => Ok(AlignmentFormat::Clustal),
            "stockholm" | "sto" => Ok(AlignmentFormat::Stockholm),
            _ => Err(ConvertError::UnknownFormat {
                kind: "alignment",
                name: s.to_string(),
                supported: Self::supported(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_round_trip() {
        for format in AlignmentFormat::ALL {
            assert_eq!(format.name().parse::<AlignmentFormat>().unwrap(), format);
            assert_eq!(format.to_string(), format.name());
        }
    }

    #[test]
    fn test_format_aliases_case_insensitive() {
        assert_eq!("FASTA".parse::<AlignmentFormat>().unwrap(), AlignmentFormat::Fasta);
        assert_eq!("sto".parse::<AlignmentFormat>().unwrap(), AlignmentFormat::Stockholm);
    }

    #[test]
    fn test_unknown_format() {
        let err = "no-such-format".parse::<AlignmentFormat>().unwrap_err();
        assert!(matches!(err, ConvertError::UnknownFormat { .. }));
        assert!(err.to_string().contains("phylip-relaxed"));
    }
}
