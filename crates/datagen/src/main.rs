mod wthor;

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use byteorder::{LittleEndian, WriteBytesExt};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::wthor::GameRecord;

/// Magic bytes identifying the training-tuple output format.
const OUTPUT_MAGIC: &[u8; 4] = b"OTHD";

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: SubCommands,
}

#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Converts WTHOR databases into training tuples.
    Wthor {
        /// Glob matching the database files to ingest.
        #[arg(long, default_value = "*.wtb")]
        input_glob: String,

        /// Output file for the binary training tuples.
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Writes all training tuples as little-endian records: two bitboard
/// planes, the move index, and the outcome value.
fn write_records(output: &PathBuf, games: &[GameRecord]) -> Result<u64> {
    let state_count: u64 = games.iter().map(|g| g.states.len() as u64).sum();

    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("creating {}", output.display()))?,
    );
    writer.write_all(OUTPUT_MAGIC)?;
    writer.write_u64::<LittleEndian>(state_count)?;

    for game in games {
        for state in &game.states {
            let (mine, opp, mv, value) = state.to_data(game.outcome);
            writer.write_u64::<LittleEndian>(mine)?;
            writer.write_u64::<LittleEndian>(opp)?;
            writer.write_u8(mv)?;
            writer.write_i8(value)?;
        }
    }
    writer.flush()?;

    Ok(state_count)
}

fn ingest_wthor(input_glob: &str, output: &PathBuf) -> Result<()> {
    let paths: Vec<PathBuf> = glob::glob(input_glob)
        .context("invalid input glob")?
        .collect::<std::result::Result<_, _>>()?;
    ensure!(!paths.is_empty(), "no files match {input_glob}");

    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan}] {pos}/{len} {msg}")
            .expect("progress template is valid"),
    );

    let mut games = Vec::new();
    for path in &paths {
        bar.set_message(path.display().to_string());
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let parsed = wthor::parse_db(&bytes).with_context(|| format!("parsing {}", path.display()))?;
        games.extend(parsed);
        bar.inc(1);
    }
    bar.finish_and_clear();

    let states = write_records(output, &games)?;
    println!(
        "Ingested {} games ({states} states) from {} databases into {}",
        games.len(),
        paths.len(),
        output.display()
    );

    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    match args.command {
        SubCommands::Wthor { input_glob, output } => ingest_wthor(&input_glob, &output),
    }
}
