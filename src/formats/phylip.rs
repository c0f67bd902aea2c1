//! PHYLIP alignment reader and writer
//!
//! Three dialects are supported:
//!
//! - strict (`phylip`): names occupy the first 10 columns, interleaved blocks
//! - relaxed (`phylip-relaxed`): names end at the first whitespace, interleaved blocks
//! - sequential (`phylip-sequential`): strict names, each sequence on consecutive lines
//!
//! A file may hold several alignments back to back, each starting with a
//! `<sequences> <columns>` header.

use crate::alignment::{AlignedSeq, Alignment};
use crate::error::{ConvertError, Result};
use crate::formats::lines::LineReader;
use crate::formats::AlignmentWriter;
use std::collections::HashSet;
use std::io::{BufRead, Write};

const STRICT_NAME_WIDTH: usize = 10;

/// Columns per interleaved block and per space-separated chunk
const BLOCK_WIDTH: usize = 50;
const CHUNK_WIDTH: usize = 10;

/// PHYLIP dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhylipStyle {
    Strict,
    Relaxed,
    Sequential,
}

impl PhylipStyle {
    fn name(self) -> &'static str {
        match self {
            PhylipStyle::Strict => "phylip",
            PhylipStyle::Relaxed => "phylip-relaxed",
            PhylipStyle::Sequential => "phylip-sequential",
        }
    }
}

/// Streaming reader yielding one alignment per PHYLIP header
pub struct PhylipReader<R> {
    lines: LineReader<R>,
    style: PhylipStyle,
    done: bool,
}

impl<R: BufRead> PhylipReader<R> {
    pub fn new(reader: R, style: PhylipStyle) -> Self {
        Self {
            lines: LineReader::new(reader),
            style,
            done: false,
        }
    }

    fn error(&self, message: impl Into<String>) -> ConvertError {
        ConvertError::parse(self.style.name(), self.lines.line_num(), message)
    }

    fn read_alignment(&mut self) -> Result<Option<Alignment>> {
        let header = match self.lines.next_nonblank()? {
            Some(line) => line,
            None => return Ok(None),
        };
        let (count, columns) = self.parse_header(&header)?;

        let rows = match self.style {
            PhylipStyle::Sequential => self.read_sequential(count, columns)?,
            _ => self.read_interleaved(count, columns)?,
        };

        for row in &rows {
            if row.len() != columns {
                return Err(self.error(format!(
                    "sequence '{}' has {} columns, header declares {}",
                    row.id,
                    row.len(),
                    columns
                )));
            }
        }
        Alignment::new(rows).map(Some)
    }

    fn parse_header(&self, line: &str) -> Result<(usize, usize)> {
        let mut fields = line.split_whitespace();
        let count = fields.next().and_then(|f| f.parse::<usize>().ok());
        let columns = fields.next().and_then(|f| f.parse::<usize>().ok());
        match (count, columns) {
            (Some(count), Some(columns)) => Ok((count, columns)),
            _ => Err(self.error(format!(
                "expected header '<sequences> <columns>', found '{}'",
                line.trim()
            ))),
        }
    }

    fn next_data_line(&mut self, count: usize, columns: usize) -> Result<String> {
        self.lines.next_nonblank()?.ok_or_else(|| {
            self.error(format!(
                "unexpected end of input, expected {} sequences of {} columns",
                count, columns
            ))
        })
    }

    fn split_name<'l>(&self, line: &'l str) -> Result<(String, &'l str)> {
        match self.style {
            PhylipStyle::Relaxed => {
                let line = line.trim_start();
                match line.split_once(char::is_whitespace) {
                    Some((name, rest)) => Ok((name.to_string(), rest)),
                    None => Err(self.error(format!("missing sequence data for '{}'", line))),
                }
            }
            PhylipStyle::Strict | PhylipStyle::Sequential => {
                let split = line
                    .char_indices()
                    .nth(STRICT_NAME_WIDTH)
                    .map(|(i, _)| i)
                    .unwrap_or(line.len());
                let (name, rest) = line.split_at(split);
                let name = name.trim();
                if name.is_empty() {
                    return Err(self.error("missing sequence name"));
                }
                Ok((name.to_string(), rest))
            }
        }
    }

    fn read_interleaved(&mut self, count: usize, columns: usize) -> Result<Vec<AlignedSeq>> {
        let mut rows = Vec::new();
        for _ in 0..count {
            let line = self.next_data_line(count, columns)?;
            let (name, rest) = self.split_name(&line)?;
            rows.push(AlignedSeq::new(name, strip_whitespace(rest)));
        }

        while rows.iter().any(|row| row.len() < columns) {
            for row in rows.iter_mut() {
                let line = self.next_data_line(count, columns)?;
                row.sequence.push_str(&strip_whitespace(&line));
            }
        }
        Ok(rows)
    }

    fn read_sequential(&mut self, count: usize, columns: usize) -> Result<Vec<AlignedSeq>> {
        let mut rows = Vec::new();
        for _ in 0..count {
            let line = self.next_data_line(count, columns)?;
            let (name, rest) = self.split_name(&line)?;
            let mut row = AlignedSeq::new(name, strip_whitespace(rest));
            while row.len() < columns {
                let line = self.next_data_line(count, columns)?;
                row.sequence.push_str(&strip_whitespace(&line));
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

impl<R: BufRead> Iterator for PhylipReader<R> {
    type Item = Result<Alignment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_alignment() {
            Ok(Some(alignment)) => Some(Ok(alignment)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Drop characters PHYLIP tools choke on and optionally truncate
fn sanitize_name(name: &str, width: Option<usize>) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')' | ','))
        .map(|c| if c == ':' || c == ';' { '|' } else { c })
        .collect();
    match width {
        Some(width) => cleaned.chars().take(width).collect(),
        None => cleaned,
    }
}

/// PHYLIP writer for all three dialects
pub struct PhylipWriter<W> {
    writer: W,
    style: PhylipStyle,
}

impl<W: Write> PhylipWriter<W> {
    pub fn new(writer: W, style: PhylipStyle) -> Self {
        Self { writer, style }
    }

    fn checked_names(&self, alignment: &Alignment) -> Result<(Vec<String>, usize)> {
        let format = self.style.name();
        if alignment.is_empty() {
            return Err(ConvertError::write(format, "Must have at least one sequence"));
        }
        if alignment.alignment_length() == 0 {
            return Err(ConvertError::write(format, "Non-empty sequences are required"));
        }

        let (names, width) = match self.style {
            PhylipStyle::Relaxed => {
                if let Some(bad) = alignment
                    .iter()
                    .find(|r| r.id.trim().contains(char::is_whitespace))
                {
                    return Err(ConvertError::write(
                        format,
                        format!("Whitespace not allowed in identifier: {}", bad.id.trim()),
                    ));
                }
                let names: Vec<String> =
                    alignment.iter().map(|r| sanitize_name(&r.id, None)).collect();
                let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0) + 1;
                (names, width)
            }
            PhylipStyle::Strict | PhylipStyle::Sequential => {
                let names: Vec<String> = alignment
                    .iter()
                    .map(|r| sanitize_name(&r.id, Some(STRICT_NAME_WIDTH)))
                    .collect();
                (names, STRICT_NAME_WIDTH)
            }
        };

        let mut seen = HashSet::new();
        for (name, record) in names.iter().zip(alignment.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(ConvertError::write(
                    format,
                    format!(
                        "Repeated name '{}' (originally '{}'), possibly due to truncation",
                        name, record.id
                    ),
                ));
            }
            // '.' means "same as the first sequence" to PHYLIP readers
            if record.sequence.contains('.') {
                return Err(ConvertError::write(
                    format,
                    format!(
                        "'.' in sequence '{}' is not allowed, use '-' for gaps",
                        record.id
                    ),
                ));
            }
        }
        Ok((names, width))
    }

    fn write_interleaved(&mut self, alignment: &Alignment, names: &[String], width: usize) -> Result<()> {
        let length = alignment.alignment_length();
        let mut block = 0;
        loop {
            for (name, record) in names.iter().zip(alignment.iter()) {
                if block == 0 {
                    write!(self.writer, "{:<width$}", name, width = width)?;
                } else {
                    write!(self.writer, "{:width$}", "", width = width)?;
                }
                let bytes = record.sequence.as_bytes();
                for chunk in 0..BLOCK_WIDTH / CHUNK_WIDTH {
                    let start = block * BLOCK_WIDTH + chunk * CHUNK_WIDTH;
                    if start >= length {
                        break;
                    }
                    let end = (start + CHUNK_WIDTH).min(length);
                    self.writer.write_all(b" ")?;
                    self.writer.write_all(&bytes[start..end])?;
                }
                self.writer.write_all(b"\n")?;
            }
            block += 1;
            if block * BLOCK_WIDTH >= length {
                return Ok(());
            }
            self.writer.write_all(b"\n")?;
        }
    }

    fn write_sequential(&mut self, alignment: &Alignment, names: &[String], width: usize) -> Result<()> {
        for (name, record) in names.iter().zip(alignment.iter()) {
            write!(self.writer, "{:<width$}", name, width = width)?;
            self.writer.write_all(record.sequence.as_bytes())?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl<W: Write> AlignmentWriter for PhylipWriter<W> {
    fn write_alignment(&mut self, alignment: &Alignment) -> Result<()> {
        let (names, width) = self.checked_names(alignment)?;
        writeln!(
            self.writer,
            " {} {}",
            alignment.len(),
            alignment.alignment_length()
        )?;
        match self.style {
            PhylipStyle::Sequential => self.write_sequential(alignment, &names, width),
            _ => self.write_interleaved(alignment, &names, width),
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
