//! GenBank input, parsed by the `gb-io` crate

use crate::annotation::{Feature, SeqRecord, Strand};
use crate::error::{ConvertError, Result};
use gb_io::reader::SeqReader;
use gb_io::seq::{Location, Seq};
use log::debug;
use std::io::Read;

const FORMAT: &str = "GenBank";

/// Identifier used when a record has no VERSION, ACCESSION or LOCUS name
pub const UNKNOWN_ID: &str = "<unknown id>";

/// Streaming GenBank reader yielding one record per `LOCUS ... //` entry
pub struct GenBankReader<R: Read> {
    inner: SeqReader<R>,
    done: bool,
}

impl<R: Read> GenBankReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: SeqReader::new(reader),
            done: false,
        }
    }
}

impl<R: Read> Iterator for GenBankReader<R> {
    type Item = Result<SeqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.inner.next()? {
            Ok(seq) => convert_seq(seq),
            Err(e) => Err(ConvertError::Malformed {
                format: FORMAT,
                message: e.to_string(),
            }),
        };
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// VERSION, then ACCESSION, then LOCUS name; first token only
fn record_id(seq: &Seq) -> String {
    [
        seq.version.as_deref(),
        seq.accession.as_deref(),
        seq.name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(|value| value.split_whitespace().next())
    .map(str::to_string)
    .unwrap_or_else(|| UNKNOWN_ID.to_string())
}

fn convert_seq(seq: Seq) -> Result<SeqRecord> {
    let id = record_id(&seq);
    let features = seq
        .features
        .iter()
        .map(|f| convert_feature(&id, f))
        .collect::<Result<Vec<_>>>()?;
    let sequence = String::from_utf8_lossy(&seq.seq).into_owned();
    let length = if sequence.is_empty() {
        seq.len.unwrap_or(0)
    } else {
        sequence.len()
    };
    debug!("Parsed record {} ({} bp, {} features)", id, length, features.len());

    Ok(SeqRecord {
        id,
        description: seq.definition.clone(),
        sequence,
        length,
        features,
    })
}

fn convert_feature(record_id: &str, feature: &gb_io::seq::Feature) -> Result<Feature> {
    let kind = feature.kind.to_string();
    let (start, end) = feature.location.find_bounds().map_err(|e| ConvertError::Malformed {
        format: FORMAT,
        message: format!(
            "cannot resolve bounds of {} feature on {}: {:?}",
            kind, record_id, e
        ),
    })?;
    let qualifiers = feature
        .qualifiers
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone().unwrap_or_default()))
        .collect();

    Ok(Feature {
        strand: location_strand(&feature.location),
        kind,
        start,
        end,
        qualifiers,
    })
}

fn location_strand(location: &Location) -> Strand {
    match location {
        Location::Range(..) | Location::Between(..) => Strand::Forward,
        Location::Complement(inner) => location_strand(inner).reverse(),
        Location::Join(parts) | Location::Order(parts) => combined_strand(parts),
        _ => Strand::Unknown,
    }
}

// Parts on different strands leave the whole feature unstranded
fn combined_strand(parts: &[Location]) -> Strand {
    let mut strands = parts.iter().map(location_strand);
    let first = match strands.next() {
        Some(strand) => strand,
        None => return Strand::Unknown,
    };
    if strands.all(|s| s == first) {
        first
    } else {
        Strand::Unknown
    }
}
