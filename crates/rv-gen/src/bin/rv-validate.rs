use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use rv_gen::validate_formats;
use rv_macroasm::catalog;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Check that every catalog format covers its word exactly once"
)]
struct Opts {
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let report = validate_formats(catalog()?.iter());

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(if report.ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
