use std::path::Path;

use anyhow::Result;
use log::info;

pub mod aggregate;
pub mod classify;
pub mod export;
pub mod import;
pub mod ir;
pub mod timeframe;

use timeframe::Timeframe;

/// Load every report export in `dir`, write the combined ledger and one
/// aggregated dataset per timeframe into `out_dir`.
pub fn run(dir: &Path, out_dir: &Path) -> Result<()> {
    let rules = classify::default_rules()?;
    let transactions = import::load_reports(dir)?;
    info!("loaded {} transactions", transactions.len());

    export::write_raw(&out_dir.join("raw_data_combined.csv"), &transactions)?;

    for timeframe in [Timeframe::Daily, Timeframe::Weekly, Timeframe::Monthly] {
        let rows = aggregate::aggregate(&transactions, timeframe, &rules);
        export::write_rows(&out_dir.join(timeframe.output_filename()), &rows)?;
    }

    Ok(())
}
