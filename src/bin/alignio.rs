//! alignio - convert a multiple sequence alignment between formats

use seqconvert::cli;

fn main() {
    if let Err(e) = cli::run_alignio() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
