//! seqconvert - sequence file format conversion
//!
//! Two one-shot converters built on a small format registry:
//!
//! - `alignio` re-serializes multiple sequence alignments between FASTA, PHYLIP
//!   (strict, relaxed, sequential), Clustal and Stockholm.
//! - `genbank2gff` writes every feature of every GenBank record as GFF3.
//!
//! # Example
//!
//! ```no_run
//! use seqconvert::convert::convert_alignment_file;
//! use seqconvert::formats::AlignmentFormat;
//! use std::path::Path;
//!
//! let summary = convert_alignment_file(
//!     Path::new("aln.fasta"),
//!     AlignmentFormat::Fasta,
//!     Path::new("aln.phy"),
//!     AlignmentFormat::PhylipRelaxed,
//! )
//! .unwrap();
//! println!("{} sequences", summary.counts.sequences);
//! ```

pub mod alignment;
pub mod annotation;
pub mod cli;
pub mod convert;
pub mod error;
pub mod formats;

pub use alignment::{AlignedSeq, Alignment};
pub use error::{ConvertError, Result};
pub use formats::AlignmentFormat;
