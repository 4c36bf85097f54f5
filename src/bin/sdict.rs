//! Build a dictionary file from a newline-delimited key list.
//!
//! ```bash
//! sdict --input words.txt --output words.dict
//! ```
//!
//! Empty lines are skipped; each remaining line's value is its position
//! among the non-empty lines. `RUST_LOG` tunes logging on top of the
//! default `sdict=info`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use sdict::{Dictionary, KeyBuffer};
use tracing::info;

/// Succinct dictionary builder
#[derive(Parser, Debug)]
#[command(name = "sdict")]
#[command(about = "Build a LOUDS trie dictionary from a key list")]
struct Args {
    /// Input file, one key per line
    #[arg(long, env = "SDICT_INPUT")]
    input: PathBuf,

    /// Output dictionary file
    #[arg(long, env = "SDICT_OUTPUT")]
    output: PathBuf,
}

fn main() {
    let args = Args::parse();
    if let Err(error) = init_tracing().and_then(|()| run(&args)) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sdict=info".parse().context("bad log directive")?),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn run(args: &Args) -> Result<()> {
    let dict = build(&args.input)?;
    dict.dump_file(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), "dictionary written");
    Ok(())
}

fn build(input: &Path) -> Result<Dictionary> {
    let keys = KeyBuffer::from_file(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    info!(keys = keys.len(), input = %input.display(), "read key list");
    let dict = Dictionary::from_key_buffer(&keys)
        .with_context(|| format!("failed to build dictionary from {}", input.display()))?;
    info!(nodes = dict.trie().num_nodes(), "built dictionary");
    Ok(dict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_both_paths() {
        assert!(Args::try_parse_from(["sdict"]).is_err());
        let args = Args::try_parse_from(["sdict", "--input", "a.txt", "--output", "a.dict"]).unwrap();
        assert_eq!(args.input, PathBuf::from("a.txt"));
        assert_eq!(args.output, PathBuf::from("a.dict"));
    }

    #[test]
    fn builds_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("words.txt");
        let output = dir.path().join("words.dict");
        std::fs::write(&input, "She\nsell\n\nsells\nseashells\n").unwrap();

        run(&Args {
            input: input.clone(),
            output: output.clone(),
        })
        .unwrap();

        let dict = Dictionary::<sdict::SuccinctBitVector>::load_file(&output).unwrap();
        assert_eq!(dict.len(), 4);
        assert_eq!(dict.get_value("sells"), Some(2));
        assert_eq!(dict.get_all_words("se").unwrap().len(), 3);
    }

    #[test]
    fn missing_input_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.dict");
        let err = run(&Args {
            input: dir.path().join("absent.txt"),
            output: output.clone(),
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("failed to read"));
        assert!(!output.exists());
    }
}
