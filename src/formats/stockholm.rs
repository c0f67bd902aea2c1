//! Stockholm alignment reader and writer
//!
//! Only the sequence lines and the `#=GS <id> DE` descriptions are kept; other
//! markup is skipped on read and not produced on write.

use crate::alignment::{AlignedSeq, Alignment};
use crate::error::{ConvertError, Result};
use crate::formats::lines::LineReader;
use crate::formats::AlignmentWriter;
use std::collections::HashMap;
use std::io::{BufRead, Write};

const FORMAT: &str = "stockholm";

pub struct StockholmReader<R> {
    lines: LineReader<R>,
    done: bool,
}

impl<R: BufRead> StockholmReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: LineReader::new(reader),
            done: false,
        }
    }

    fn error(&self, message: impl Into<String>) -> ConvertError {
        ConvertError::parse(FORMAT, self.lines.line_num(), message)
    }

    fn read_alignment(&mut self) -> Result<Option<Alignment>> {
        let header = match self.lines.next_nonblank()? {
            Some(line) => line,
            None => return Ok(None),
        };
        if !header.starts_with("# STOCKHOLM") {
            return Err(self.error(format!(
                "expected '# STOCKHOLM 1.0' header, found '{}'",
                header.trim_end()
            )));
        }

        let mut order: Vec<String> = Vec::new();
        let mut sequences: HashMap<String, String> = HashMap::new();
        let mut descriptions: HashMap<String, String> = HashMap::new();

        loop {
            let line = match self.lines.next_line()? {
                Some(line) => line,
                None => return Err(self.error("missing '//' terminator")),
            };
            let trimmed = line.trim();
            if trimmed == "//" {
                break;
            }
            if trimmed.is_empty() {
                continue;
            }
            if let Some(markup) = trimmed.strip_prefix("#=GS") {
                let description = markup
                    .trim_start()
                    .split_once(char::is_whitespace)
                    .and_then(|(id, rest)| Some((id, rest.trim_start().strip_prefix("DE ")?)));
                if let Some((id, text)) = description {
                    descriptions
                        .entry(id.to_string())
                        .and_modify(|d| {
                            d.push(' ');
                            d.push_str(text.trim());
                        })
                        .or_insert_with(|| text.trim().to_string());
                }
                continue;
            }
            // Other annotation
            if trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(name), Some(fragment), None) => {
                    let entry = sequences.entry(name.to_string()).or_insert_with(|| {
                        order.push(name.to_string());
                        String::new()
                    });
                    entry.push_str(fragment);
                }
                _ => return Err(self.error("expected exactly two fields")),
            }
        }

        let rows = order
            .into_iter()
            .map(|name| AlignedSeq {
                description: descriptions.remove(&name),
                sequence: sequences.remove(&name).unwrap_or_default(),
                id: name,
            })
            .collect();
        Alignment::new(rows).map(Some)
    }
}

impl<R: BufRead> Iterator for StockholmReader<R> {
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

pub struct StockholmWriter<W> {
    writer: W,
}

impl<W: Write> StockholmWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> AlignmentWriter for StockholmWriter<W> {
    fn write_alignment(&mut self, alignment: &Alignment) -> Result<()> {
        if alignment.is_empty() {
            return Err(ConvertError::write(FORMAT, "Must have at least one sequence"));
        }

        let ids: Vec<String> = alignment
            .iter()
            .map(|r| r.id.trim().replace(char::is_whitespace, "_"))
            .collect();
        let width = ids.iter().map(|id| id.chars().count()).max().unwrap_or(0);

        writeln!(self.writer, "# STOCKHOLM 1.0")?;
        writeln!(self.writer, "#=GF SQ {}", alignment.len())?;
        for (id, record) in ids.iter().zip(alignment.iter()) {
            if let Some(description) = &record.description {
                writeln!(self.writer, "#=GS {} DE {}", id, description)?;
            }
        }
        for (id, record) in ids.iter().zip(alignment.iter()) {
            write!(self.writer, "{:<width$} ", id, width = width)?;
            self.writer.write_all(record.sequence.as_bytes())?;
            self.writer.write_all(b"\n")?;
        }
        writeln!(self.writer, "//")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
