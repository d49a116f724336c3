use anyhow::Result;

mod args;

fn main() -> Result<()> {
    env_logger::init();
    let args = args::parse();
    ebay_sales_report::run(&args.dir, &args.out_dir)
}
