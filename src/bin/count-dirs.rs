use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::PathBuf,
};

use case_statistics::report::{self, Tally};
use clap::Parser;
use eyre::Context;
use log::debug;

/// Counts `case <path>` lines per directory and prints them least common first
#[derive(Parser, Debug)]
#[clap(version, color = clap::ColorChoice::Never)]
struct Args {
    /// Print a JSON object instead of the text report
    #[clap(long)]
    json: bool,

    /// Files to read instead of standard input
    #[clap(parse(from_os_str))]
    files: Vec<PathBuf>,
}

fn main() -> eyre::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut tally = Tally::new();

    if args.files.is_empty() {
        tally
            .read_from(BufReader::new(io::stdin()))
            .wrap_err("failed to read standard input")?;
    } else {
        for path in &args.files {
            debug!("reading {}", path.display());
            let file = File::open(path).wrap_err_with(|| format!("{} not found", path.display()))?;
            tally
                .read_from(BufReader::new(file))
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        }
    }

    debug!("{} case lines in {} directories", tally.total(), tally.len());

    let entries = tally.least_common();
    let mut stdout = BufWriter::new(io::stdout().lock());
    if args.json {
        report::write_json(&mut stdout, &entries)?;
    } else {
        report::write_report(&mut stdout, &entries)?;
    }
    stdout.flush()?;

    Ok(())
}
