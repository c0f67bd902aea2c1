//! Conversion pipelines
//!
//! Both converters are a single pass: open input, pull records lazily from a reader,
//! push them into a writer, commit the output. Output is staged in a temporary file next
//! to the destination and only moved into place once every record has been written, so a
//! failed conversion never leaves a partial file behind.

use crate::annotation::genbank::GenBankReader;
use crate::annotation::gff::Gff3Writer;
use crate::annotation::RecordWriter;
use crate::error::{ConvertError, Result};
use crate::formats::AlignmentFormat;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Counts reported by the alignment converter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentCounts {
    pub alignments: usize,
    pub sequences: usize,
}

/// Counts reported by the annotation converter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationCounts {
    pub records: usize,
    pub features: usize,
}

/// Summary of one finished conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary<C> {
    pub input: String,
    pub output: String,
    pub input_format: String,
    pub output_format: String,
    #[serde(flatten)]
    pub counts: C,
}

/// Re-serialize every alignment in `input` into `output`, in input order
pub fn convert_alignments<R: BufRead, W: Write>(
    input: R,
    input_format: AlignmentFormat,
    output: W,
    output_format: AlignmentFormat,
) -> Result<AlignmentCounts> {
    let mut writer = output_format.alignment_writer(output);
    let mut counts = AlignmentCounts::default();

    for alignment in input_format.parse_alignments(input) {
        let alignment = alignment?;
        debug!(
            "Alignment {}: {} sequences x {} columns",
            counts.alignments + 1,
            alignment.len(),
            alignment.alignment_length()
        );
        writer.write_alignment(&alignment)?;
        counts.alignments += 1;
        counts.sequences += alignment.len();
    }
    writer.finish()?;

    Ok(counts)
}

/// Write every feature of every GenBank record in `input` as GFF3 into `output`
pub fn convert_genbank_to_gff<R: Read, W: Write>(
    input: R,
    output: W,
    include_fasta: bool,
) -> Result<AnnotationCounts> {
    let mut writer = Gff3Writer::new(output).with_fasta(include_fasta);
    let mut counts = AnnotationCounts::default();

    for record in GenBankReader::new(input) {
        let record = record?;
        writer.write_record(&record)?;
        counts.records += 1;
        counts.features += record.features.len();
    }
    writer.finish()?;

    Ok(counts)
}

/// File-to-file alignment conversion
pub fn convert_alignment_file(
    input: &Path,
    input_format: AlignmentFormat,
    output: &Path,
    output_format: AlignmentFormat,
) -> Result<ConversionSummary<AlignmentCounts>> {
    let reader = open_input(input)?;
    let mut staged = AtomicOutput::create(output)?;
    info!(
        "Converting {} ({}) to {} ({})",
        input.display(),
        input_format,
        output.display(),
        output_format
    );

    let counts = convert_alignments(reader, input_format, &mut staged, output_format)?;
    staged.commit()?;
    info!(
        "Wrote {} alignments ({} sequences) to {}",
        counts.alignments,
        counts.sequences,
        output.display()
    );

    Ok(ConversionSummary {
        input: input.display().to_string(),
        output: output.display().to_string(),
        input_format: input_format.to_string(),
        output_format: output_format.to_string(),
        counts,
    })
}

/// File-to-file GenBank to GFF3 conversion
pub fn convert_genbank_file(
    input: &Path,
    output: &Path,
    include_fasta: bool,
) -> Result<ConversionSummary<AnnotationCounts>> {
    let reader = open_input(input)?;
    let mut staged = AtomicOutput::create(output)?;
    info!("Converting {} (genbank) to {} (gff3)", input.display(), output.display());

    let counts = convert_genbank_to_gff(reader, &mut staged, include_fasta)?;
    staged.commit()?;
    info!(
        "Wrote {} features from {} records to {}",
        counts.features,
        counts.records,
        output.display()
    );

    Ok(ConversionSummary {
        input: input.display().to_string(),
        output: output.display().to_string(),
        input_format: "genbank".to_string(),
        output_format: "gff3".to_string(),
        counts,
    })
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound(path.display().to_string()));
    }
    Ok(BufReader::new(File::open(path)?))
}

/// Output file staged in the destination directory until [`AtomicOutput::commit`]
///
/// Dropping it without committing removes the staged file.
pub struct AtomicOutput {
    target: PathBuf,
    staged: BufWriter<NamedTempFile>,
}

impl AtomicOutput {
    pub fn create(target: &Path) -> Result<Self> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged = NamedTempFile::new_in(dir)?;
        Ok(Self {
            target: target.to_path_buf(),
            staged: BufWriter::new(staged),
        })
    }

    /// Move the staged file over the target path
    pub fn commit(self) -> Result<()> {
        let staged = self.staged.into_inner().map_err(|e| e.into_error())?;
        staged
            .as_file()
            .set_permissions(target_permissions(&self.target)?)?;
        staged.persist(&self.target).map_err(|e| e.error)?;
        debug!("Committed {}", self.target.display());
        Ok(())
    }
}

impl Write for AtomicOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.staged.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.staged.flush()
    }
}

// Temp files are created owner-only; keep an existing target's mode, else use 0644.
fn target_permissions(target: &Path) -> Result<std::fs::Permissions> {
    if let Ok(metadata) = std::fs::metadata(target) {
        return Ok(metadata.permissions());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Ok(std::fs::Permissions::from_mode(0o644))
    }
    #[cfg(not(unix))]
    {
        let file = tempfile::tempfile()?;
        Ok(file.metadata()?.permissions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    const TWO_SEQS: &str = ">seq1\nACGT--GG\n>seq2\nACGTAAGG\n";

    #[test]
    fn test_convert_fasta_to_relaxed_phylip() {
        let mut out = Vec::new();
        let counts = convert_alignments(
            Cursor::new(TWO_SEQS),
            AlignmentFormat::Fasta,
            &mut out,
            AlignmentFormat::PhylipRelaxed,
        )
        .unwrap();

        assert_eq!(
            counts,
            AlignmentCounts {
                alignments: 1,
                sequences: 2
            }
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            " 2 8\nseq1  ACGT--GG\nseq2  ACGTAAGG\n"
        );
    }

    #[test]
    fn test_stockholm_blocks_keep_order() {
        let input = "# STOCKHOLM 1.0\nb AC\na GT\n//\n# STOCKHOLM 1.0\nc TT\n//\n";
        let mut out = Vec::new();
        let counts = convert_alignments(
            Cursor::new(input),
            AlignmentFormat::Stockholm,
            &mut out,
            AlignmentFormat::Fasta,
        )
        .unwrap();

        assert_eq!(counts.alignments, 2);
        assert_eq!(String::from_utf8(out).unwrap(), ">b\nAC\n>a\nGT\n>c\nTT\n");
    }

    #[test]
    fn test_round_trip_through_clustal() {
        let mut clustal = Vec::new();
        convert_alignments(
            Cursor::new(TWO_SEQS),
            AlignmentFormat::Fasta,
            &mut clustal,
            AlignmentFormat::Clustal,
        )
        .unwrap();
        let mut fasta = Vec::new();
        convert_alignments(
            Cursor::new(clustal),
            AlignmentFormat::Clustal,
            &mut fasta,
            AlignmentFormat::Fasta,
        )
        .unwrap();

        assert_eq!(String::from_utf8(fasta).unwrap(), TWO_SEQS);
    }

    #[test]
    fn test_genbank_to_gff() {
        let mut out = Vec::new();
        let counts = convert_genbank_to_gff(
            Cursor::new(crate::annotation::genbank::tests::TWO_CDS),
            &mut out,
            false,
        )
        .unwrap();
        assert_eq!(
            counts,
            AnnotationCounts {
                records: 1,
                features: 2
            }
        );

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "##gff-version 3");
        let features: Vec<&str> = lines.into_iter().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(features.len(), 2);
        assert_eq!(
            features[0],
            "TEST0001.1\tfeature\tCDS\t1\t9\t.\t+\t.\tgene=abc;product=first protein"
        );
        assert_eq!(
            features[1],
            "TEST0001.1\tfeature\tCDS\t13\t24\t.\t-\t.\tgene=xyz;note=second%3B reverse"
        );
    }

    #[test]
    fn test_file_conversion_commits_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fasta");
        let output = dir.path().join("out.phy");
        std::fs::write(&input, TWO_SEQS).unwrap();

        let summary = convert_alignment_file(
            &input,
            AlignmentFormat::Fasta,
            &output,
            AlignmentFormat::PhylipRelaxed,
        )
        .unwrap();

        assert_eq!(summary.counts.sequences, 2);
        assert_eq!(summary.output_format, "phylip-relaxed");
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with(" 2 8\n"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_failed_conversion_leaves_no_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.fasta");
        let output = dir.path().join("out.phy");
        std::fs::write(&input, ">a\nACGT\n>b\nAC\n").unwrap();

        let result = convert_alignment_file(
            &input,
            AlignmentFormat::Fasta,
            &output,
            AlignmentFormat::PhylipRelaxed,
        );

        assert!(result.is_err());
        assert!(!output.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempdir().unwrap();
        let err = convert_genbank_file(
            &dir.path().join("nope.gb"),
            &dir.path().join("out.gff"),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound(_)));
    }

    #[test]
    fn test_summary_serializes_flat() {
        let summary = ConversionSummary {
            input: "a.fasta".to_string(),
            output: "a.phy".to_string(),
            input_format: "fasta".to_string(),
            output_format: "phylip-relaxed".to_string(),
            counts: AlignmentCounts {
                alignments: 1,
                sequences: 2,
            },
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["alignments"], 1);
        assert_eq!(json["output_format"], "phylip-relaxed");
    }
}
