//! GFF3 feature writer
//!
//! Output layout:
//!
//! ```text
//! ##gff-version 3
//! ##sequence-region <id> 1 <length>
//! <id> <source> <type> <start> <end> <score> <strand> <phase> <attributes>
//! ...
//! ##FASTA            (optional)
//! ```
//!
//! Columns are tab separated. `source`, `score` and `phase` come from qualifiers of the
//! same name when present; every other qualifier becomes an attribute.

use crate::annotation::{Feature, RecordWriter, SeqRecord};
use crate::error::Result;
use bio::io::fasta;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeMap;
use std::io::Write;

const HEADER: &str = "##gff-version 3";
const DEFAULT_SOURCE: &str = "feature";
const DEFAULT_TYPE: &str = "sequence_feature";
const EMPTY: &str = ".";

/// Qualifiers that fill dedicated columns
const COLUMN_QUALIFIERS: [&str; 3] = ["source", "score", "phase"];

/// Bytes escaped in attribute values: all but unreserved characters, `:`, `/` and space
const ATTRIBUTE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b':')
    .remove(b'/')
    .remove(b' ');

/// Bytes escaped in the seqid column
const SEQ_ID: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b':')
    .remove(b'^')
    .remove(b'*')
    .remove(b'$')
    .remove(b'@')
    .remove(b'!')
    .remove(b'+')
    .remove(b'_')
    .remove(b'?')
    .remove(b'-')
    .remove(b'|');

pub struct Gff3Writer<W: Write> {
    writer: W,
    include_fasta: bool,
    header_written: bool,
    fasta_records: Vec<(String, Option<String>, String)>,
}

impl<W: Write> Gff3Writer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            include_fasta: false,
            header_written: false,
            fasta_records: Vec::new(),
        }
    }

    /// Append a `##FASTA` section holding the record sequences
    pub fn with_fasta(mut self, include_fasta: bool) -> Self {
        self.include_fasta = include_fasta;
        self
    }

    fn ensure_header(&mut self) -> Result<()> {
        if !self.header_written {
            writeln!(self.writer, "{}", HEADER)?;
            self.header_written = true;
        }
        Ok(())
    }

    fn write_feature(&mut self, seq_id: &str, feature: &Feature) -> Result<()> {
        let source = feature
            .qualifier_values("source")
            .next()
            .unwrap_or(DEFAULT_SOURCE);
        let score = feature.qualifier_values("score").next().unwrap_or(EMPTY);
        let phase = feature.qualifier_values("phase").next().unwrap_or(EMPTY);
        let kind = if feature.kind.is_empty() {
            DEFAULT_TYPE
        } else {
            feature.kind.as_str()
        };
        let attributes = format_attributes(feature);

        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            seq_id,
            source,
            kind,
            feature.start + 1,
            feature.end,
            score,
            feature.strand,
            phase,
            if attributes.is_empty() { EMPTY } else { attributes.as_str() },
        )?;
        Ok(())
    }
}

impl<W: Write> RecordWriter for Gff3Writer<W> {
    fn write_record(&mut self, record: &SeqRecord) -> Result<()> {
        self.ensure_header()?;
        let seq_id = encode_seq_id(&record.id);
        if record.length > 0 {
            writeln!(
                self.writer,
                "##sequence-region {} 1 {}",
                seq_id, record.length
            )?;
        }
        for feature in &record.features {
            self.write_feature(&seq_id, feature)?;
        }
        if self.include_fasta && !record.sequence.is_empty() {
            self.fasta_records.push((
                record.id.clone(),
                record.description.clone(),
                record.sequence.clone(),
            ));
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.ensure_header()?;
        if !self.fasta_records.is_empty() {
            writeln!(self.writer, "##FASTA")?;
            let mut fasta_writer = fasta::Writer::new(&mut self.writer);
            for (id, description, sequence) in &self.fasta_records {
                fasta_writer.write(id, description.as_deref(), sequence.as_bytes())?;
            }
            fasta_writer.flush()?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// `key=v1,v2;key2=...` with keys sorted and values trimmed, deduplicated and escaped
fn format_attributes(feature: &Feature) -> String {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (key, value) in &feature.qualifiers {
        grouped.entry(key.as_str()).or_default().push(value.as_str());
    }
    grouped.retain(|key, values| !(COLUMN_QUALIFIERS.contains(key) && values.len() == 1));

    grouped
        .into_iter()
        .map(|(key, values)| {
            let key = key.trim();
            let mut encoded: Vec<String> = Vec::new();
            for value in values {
                let value = encode_value(value.trim());
                if !key.is_empty() && !value.is_empty() && !encoded.contains(&value) {
                    encoded.push(value);
                }
            }
            format!("{}={}", key, encoded.join(","))
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, ATTRIBUTE_VALUE).to_string()
}

fn encode_seq_id(id: &str) -> String {
    utf8_percent_encode(id, SEQ_ID).to_string()
}
