//! genbank2gff - write the feature tables of a GenBank file as GFF3

use seqconvert::cli;

fn main() {
    if let Err(e) = cli::run_genbank2gff() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
