//! Annotated sequence records
//!
//! Records come out of [`genbank::GenBankReader`] and go into a [`RecordWriter`] such as
//! [`gff::Gff3Writer`]. Feature order is the order of the input feature table.

pub mod genbank;
pub mod gff;

use crate::error::Result;

/// Strand of a feature location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl Strand {
    /// Opposite strand; unknown stays unknown
    pub fn reverse(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
            Strand::Unknown => Strand::Unknown,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// One annotation feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Feature key, e.g. `CDS` or `gene`
    pub kind: String,
    /// 0-based start of the outermost bounds
    pub start: i64,
    /// Exclusive end of the outermost bounds
    pub end: i64,
    pub strand: Strand,
    /// Qualifiers in input order; flag qualifiers carry an empty value
    pub qualifiers: Vec<(String, String)>,
}

impl Feature {
    /// All values of qualifier `key`, in input order
    pub fn qualifier_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.qualifiers
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A sequence with its feature table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    pub id: String,
    pub description: Option<String>,
    pub sequence: String,
    /// Declared sequence length (falls back to the sequence itself)
    pub length: usize,
    pub features: Vec<Feature>,
}

/// Sink for annotated records
pub trait RecordWriter {
    fn write_record(&mut self, record: &SeqRecord) -> Result<()>;

    /// Write any trailing sections and flush
    fn finish(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_display_and_reverse() {
        assert_eq!(Strand::Forward.to_string(), "+");
        assert_eq!(Strand::Forward.reverse(), Strand::Reverse);
        assert_eq!(Strand::Unknown.reverse().to_string(), ".");
    }

    #[test]
    fn test_qualifier_values() {
        let feature = Feature {
            kind: "CDS".to_string(),
            start: 0,
            end: 9,
            strand: Strand::Forward,
            qualifiers: vec![
                ("note".to_string(), "a".to_string()),
                ("gene".to_string(), "abc".to_string()),
                ("note".to_string(), "b".to_string()),
            ],
        };
        let notes: Vec<&str> = feature.qualifier_values("note").collect();
        assert_eq!(notes, vec!["a", "b"]);
        assert_eq!(feature.qualifier_values("product").count(), 0);
    }
}
