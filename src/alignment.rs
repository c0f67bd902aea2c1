//! Multiple sequence alignment model
//!
//! An [`Alignment`] is an ordered block of aligned sequences that all share the same
//! length (gaps included). Readers build alignments, writers consume them; nothing in
//! between reorders or edits the records.

use crate::error::{ConvertError, Result};

/// One row of an alignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedSeq {
    /// Sequence identifier
    pub id: String,
    /// Free-text description (FASTA header remainder), if the source format had one
    pub description: Option<String>,
    /// Aligned symbols, gaps included
    pub sequence: String,
}

impl AlignedSeq {
    /// Create a record without a description
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            sequence: sequence.into(),
        }
    }

    /// Number of aligned columns in this row
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// A block of equal-length aligned sequences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    records: Vec<AlignedSeq>,
}

impl Alignment {
    /// Build an alignment, rejecting rows of unequal length
    pub fn new(records: Vec<AlignedSeq>) -> Result<Self> {
        if let Some(first) = records.first() {
            let expected = first.len();
            if let Some(bad) = records.iter().find(|r| r.len() != expected) {
                return Err(ConvertError::InvalidInput(format!(
                    "Sequences must all be the same length: '{}' has {} columns, '{}' has {}",
                    first.id,
                    expected,
                    bad.id,
                    bad.len()
                )));
            }
        }
        Ok(Self { records })
    }

    /// Rows in input order
    pub fn records(&self) -> &[AlignedSeq] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlignedSeq> {
        self.records.iter()
    }

    /// Number of sequences
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of columns (0 for an empty alignment)
    pub fn alignment_length(&self) -> usize {
        self.records.first().map(AlignedSeq::len).unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Alignment {
    type Item = &'a AlignedSeq;
    type IntoIter = std::slice::Iter<'a, AlignedSeq>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
