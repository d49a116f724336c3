use std::path::PathBuf;

use clap::Parser;

/// Aggregate eBay sales-report exports into daily/weekly/monthly datasets.
#[derive(Parser, Debug)]
pub struct Args {
    /// Directory containing the .csv report exports
    #[clap(short, long, default_value = "./")]
    pub dir: PathBuf,

    /// Directory to write the generated datasets to
    #[clap(short, long, default_value = "./")]
    pub out_dir: PathBuf,
}

pub fn parse() -> Args {
    Args::parse()
}
