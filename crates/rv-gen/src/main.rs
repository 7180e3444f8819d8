use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rv_gen::{encode_program, hello_world, Board, Preset};
use rv_macroasm::catalog;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a UART hello-world image for a RISC-V board")]
struct Opts {
    /// Output binary file (little-endian instruction words)
    #[arg(value_name = "OUTFILE")]
    output: PathBuf,
    /// Board preset
    #[arg(long, value_enum, default_value_t = Preset::QemuVirt)]
    board: Preset,
    /// JSON board description, replaces the preset
    #[arg(long, value_name = "FILE")]
    board_config: Option<PathBuf>,
    /// Text written to the UART
    #[arg(long, default_value = "Hello, World!\n")]
    message: String,
    /// Print one line per emitted instruction
    #[arg(long)]
    listing: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let board = match &opts.board_config {
        Some(path) => Board::load(path)?,
        None => opts.board.board(),
    };

    let program = hello_world(&board, &opts.message)?;
    let encoded = encode_program(catalog()?, &program)?;

    let mut out = Vec::with_capacity(encoded.len() * 4);
    for e in &encoded {
        if opts.listing {
            let word = e.word.value().unwrap_or_default();
            println!("{:<6} {word:#010x}", e.mnemonic);
        }
        out.extend_from_slice(&e.bytes());
    }
    std::fs::write(&opts.output, &out)
        .with_context(|| format!("writing {}", opts.output.display()))?;
    tracing::info!(board = %board.name, bytes = out.len(), "wrote image");
    Ok(())
}
