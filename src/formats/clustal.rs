//! Clustal alignment reader and writer

use crate::alignment::{AlignedSeq, Alignment};
use crate::error::{ConvertError, Result};
use crate::formats::lines::LineReader;
use crate::formats::AlignmentWriter;
use std::collections::HashMap;
use std::io::{BufRead, Write};

const FORMAT: &str = "clustal";
const HEADER: &str = "CLUSTAL 1.81 multiple sequence alignment";
const BLOCK_WIDTH: usize = 50;
const ID_WIDTH: usize = 36;
const MAX_ID_LEN: usize = 30;

fn is_header(line: &str) -> bool {
    ["CLUSTAL", "MUSCLE", "PROBCONS"]
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Streaming reader yielding one alignment per `CLUSTAL` header
pub struct ClustalReader<R> {
    lines: LineReader<R>,
    done: bool,
}

impl<R: BufRead> ClustalReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: LineReader::new(reader),
            done: false,
        }
    }

    fn read_alignment(&mut self) -> Result<Option<Alignment>> {
        let header = match self.lines.next_nonblank()? {
            Some(line) => line,
            None => return Ok(None),
        };
        if !is_header(&header) {
            return Err(ConvertError::parse(
                FORMAT,
                self.lines.line_num(),
                format!("expected a CLUSTAL header, found '{}'", header.trim_end()),
            ));
        }

        let mut order: Vec<String> = Vec::new();
        let mut sequences: HashMap<String, String> = HashMap::new();

        loop {
            let next_starts = match self.lines.peek_line()? {
                Some(line) => is_header(line),
                None => true,
            };
            if next_starts {
                break;
            }
            let Some(line) = self.lines.next_line()? else {
                break;
            };

            let trimmed = line.trim_end();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            // conservation line
            if trimmed.starts_with(char::is_whitespace) {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let name = fields.next().unwrap_or_default();
            let fragment = fields.next().ok_or_else(|| {
                ConvertError::parse(
                    FORMAT,
                    self.lines.line_num(),
                    format!("missing sequence fragment for '{}'", name),
                )
            })?;
            let entry = sequences.entry(name.to_string()).or_insert_with(|| {
                order.push(name.to_string());
                String::new()
            });
            entry.push_str(fragment);
        }

        if order.is_empty() {
            return Err(ConvertError::parse(
                FORMAT,
                self.lines.line_num(),
                "no sequences found",
            ));
        }

        let rows = order
            .into_iter()
            .map(|name| {
                let sequence = sequences.remove(&name).unwrap_or_default();
                AlignedSeq::new(name, sequence)
            })
            .collect();
        Alignment::new(rows).map(Some)
    }
}

impl<R: BufRead> Iterator for ClustalReader<R> {
    type Item = Result<Alignment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.read_alignment();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result.transpose()
    }
}

pub struct ClustalWriter<W> {
    writer: W,
}

impl<W: Write> ClustalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> AlignmentWriter for ClustalWriter<W> {
    fn write_alignment(&mut self, alignment: &Alignment) -> Result<()> {
        if alignment.is_empty() {
            return Err(ConvertError::write(FORMAT, "Must have at least one sequence"));
        }
        let length = alignment.alignment_length();
        if length == 0 {
            return Err(ConvertError::write(FORMAT, "Non-empty sequences are required"));
        }

        let ids: Vec<String> = alignment
            .iter()
            .map(|r| r.id.chars().take(MAX_ID_LEN).collect::<String>().replace(' ', "_"))
            .collect();

        writeln!(self.writer, "{}\n\n", HEADER)?;
        let mut start = 0;
        while start < length {
            let end = (start + BLOCK_WIDTH).min(length);
            for (id, record) in ids.iter().zip(alignment.iter()) {
                write!(self.writer, "{:<width$}", id, width = ID_WIDTH)?;
                self.writer.write_all(&record.sequence.as_bytes()[start..end])?;
                self.writer.write_all(b"\n")?;
            }
            self.writer.write_all(b"\n")?;
            start = end;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_BLOCKS: &str = "CLUSTAL W (1.83) multiple sequence alignment\n\
                              \n\
                              seq1      ATG-\n\
                              seq2      AT-A\n\
                              \x20         ** \n\
                              \n\
                              seq1      CTG\n\
                              seq2      CT-\n";

    #[test]
    fn test_read_clustal() {
        let alignments: Vec<Alignment> = ClustalReader::new(Cursor::new(TWO_BLOCKS))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(alignments.len(), 1);
        let rows = alignments[0].records();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "seq1");
        assert_eq!(rows[0].sequence, "ATG-CTG");
        assert_eq!(rows[1].id, "seq2");
        assert_eq!(rows[1].sequence, "AT-ACT-");
    }

    #[test]
    fn test_read_concatenated_alignments() {
        let input = format!("{}{}", TWO_BLOCKS, "MUSCLE (3.8) multiple sequence alignment\n\nx AC\n");
        let alignments: Vec<Alignment> = ClustalReader::new(Cursor::new(input))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(alignments.len(), 2);
        assert_eq!(alignments[1].records()[0].id, "x");
    }

    #[test]
    fn test_missing_header() {
        let mut reader = ClustalReader::new(Cursor::new("seq1 ACGT\n"));
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let aln = Alignment::new(vec![
            AlignedSeq::new("first seq", "A".repeat(60)),
            AlignedSeq::new("second", "C".repeat(60)),
        ])
        .unwrap();
        let mut out = Vec::new();
        {
            let mut writer = ClustalWriter::new(&mut out);
            writer.write_alignment(&aln).unwrap();
            writer.finish().unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("CLUSTAL 1.81 multiple sequence alignment\n\n\n"));
        assert!(text.contains(&format!("{:<36}{}", "first_seq", "A".repeat(50))));

        let back: Vec<Alignment> = ClustalReader::new(Cursor::new(text))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(back[0].records()[0].id, "first_seq");
        assert_eq!(back[0].records()[0].sequence, "A".repeat(60));
        assert_eq!(back[0].records()[1].sequence, "C".repeat(60));
    }
}
