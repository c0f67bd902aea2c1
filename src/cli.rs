//! Command-line interface for the `alignio` and `genbank2gff` binaries

use crate::convert::{convert_alignment_file, convert_genbank_file, ConversionSummary};
use crate::formats::AlignmentFormat;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// Convert a multiple sequence alignment from one format to another
#[derive(Debug, Parser)]
#[command(name = "alignio")]
#[command(version, about, long_about = None)]
pub struct AlignIoArgs {
    /// Input alignment file
    #[arg(value_name = "ALIGN_IN")]
    pub input: PathBuf,

    /// Output alignment file
    #[arg(value_name = "ALIGN_OUT")]
    pub output: PathBuf,

    /// Input format of alignment (fasta, phylip, phylip-relaxed, phylip-sequential, clustal, stockholm)
    #[arg(short = 'i', long = "input", value_name = "FORMAT", default_value = "fasta")]
    pub input_format: String,

    /// Output format of alignment
    #[arg(short = 'o', long = "output", value_name = "FORMAT", default_value = "phylip-relaxed")]
    pub output_format: String,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a JSON summary of the conversion to stdout
    #[arg(long)]
    pub json: bool,
}

/// Convert a GenBank file to GFF3
#[derive(Debug, Parser)]
#[command(name = "genbank2gff")]
#[command(version, about, long_about = None)]
pub struct GenBank2GffArgs {
    /// GenBank input file
    #[arg(value_name = "GENBANK_IN")]
    pub input: PathBuf,

    /// GFF3 output file
    #[arg(value_name = "GFF_OUT")]
    pub output: PathBuf,

    /// Append record sequences in a ##FASTA section
    #[arg(long)]
    pub fasta: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a JSON summary of the conversion to stdout
    #[arg(long)]
    pub json: bool,
}

/// Default log level is `warn`, `info` with `--verbose`; `RUST_LOG` overrides both
fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when running in-process
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn print_summary<C: Serialize>(summary: &ConversionSummary<C>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Run the alignment converter with already parsed arguments
pub fn alignio(args: &AlignIoArgs) -> Result<()> {
    init_logging(args.verbose);

    let input_format: AlignmentFormat = args.input_format.parse()?;
    let output_format: AlignmentFormat = args.output_format.parse()?;

    let summary = convert_alignment_file(&args.input, input_format, &args.output, output_format)
        .with_context(|| {
            format!(
                "failed to convert {} ({}) to {} ({})",
                args.input.display(),
                input_format,
                args.output.display(),
                output_format
            )
        })?;

    if args.json {
        print_summary(&summary)?;
    }
    Ok(())
}

/// Run the GenBank to GFF3 converter with already parsed arguments
pub fn genbank2gff(args: &GenBank2GffArgs) -> Result<()> {
    init_logging(args.verbose);

    let summary = convert_genbank_file(&args.input, &args.output, args.fasta).with_context(|| {
        format!(
            "failed to convert {} to GFF3 {}",
            args.input.display(),
            args.output.display()
        )
    })?;

    if args.json {
        print_summary(&summary)?;
    }
    Ok(())
}

/// Entry point of the `alignio` binary
pub fn run_alignio() -> Result<()> {
    alignio(&AlignIoArgs::parse())
}

/// Entry point of the `genbank2gff` binary
pub fn run_genbank2gff() -> Result<()> {
    genbank2gff(&GenBank2GffArgs::parse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_alignio_defaults() {
        let args = AlignIoArgs::try_parse_from(["alignio", "in.fasta", "out.phy"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in.fasta"));
        assert_eq!(args.output, PathBuf::from("out.phy"));
        assert_eq!(args.input_format, "fasta");
        assert_eq!(args.output_format, "phylip-relaxed");
        assert!(!args.verbose);
    }

    #[test]
    fn test_alignio_formats() {
        let args = AlignIoArgs::try_parse_from([
            "alignio", "-i", "stockholm", "--output", "clustal", "-v", "in.sto", "out.aln",
        ])
        .unwrap();
        assert_eq!(args.input_format, "stockholm");
        assert_eq!(args.output_format, "clustal");
        assert!(args.verbose);
    }

    #[test]
    fn test_missing_positionals_rejected() {
        assert!(AlignIoArgs::try_parse_from(["alignio", "in.fasta"]).is_err());
        assert!(GenBank2GffArgs::try_parse_from(["genbank2gff"]).is_err());
    }

    #[test]
    fn test_unknown_format_touches_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.phy");
        let args = AlignIoArgs {
            input: dir.path().join("missing.fasta"),
            output: output.clone(),
            input_format: "fasta".to_string(),
            output_format: "no-such-format".to_string(),
            verbose: false,
            json: false,
        };

        let err = alignio(&args).unwrap_err();
        assert!(err.to_string().contains("Unknown alignment format: no-such-format"));
        assert!(!output.exists());
    }

    #[test]
    fn test_genbank2gff_flags() {
        let args =
            GenBank2GffArgs::try_parse_from(["genbank2gff", "--fasta", "in.gb", "out.gff"]).unwrap();
        assert!(args.fasta);
        assert_eq!(args.output, PathBuf::from("out.gff"));
    }
}
