use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use colstore::cli::{Args, normalize_args};
use colstore::query::plan::build_plan;
use colstore::query::results;
use colstore::{ARENA_CAPACITY, Arena, Executor, MIN_AREA_SQM, QuerySpec, Store};

fn main() -> Result<()> {
    env_logger::init();
    // accept the historic single-dash flag spellings alongside clap's own
    let args = Args::parse_from(normalize_args(std::env::args_os()));

    let spec = QuerySpec::from_matric(&args.matric)?;
    if !args.data.is_file() {
        bail!("data file does not exist: {}", args.data.display());
    }

    println!("Query:");
    println!(
        "- Time range: {}-{:02} to {}-{:02}",
        spec.year,
        spec.month,
        spec.year,
        spec.month + 1
    );
    println!("- Town: {}", spec.town_name());
    println!("- Area: >= {MIN_AREA_SQM}m²");

    let mut arena = Arena::with_capacity(ARENA_CAPACITY);
    let store = Store::new(&args.data, "./column_store");
    let catalog = store.build(&mut arena).context("store build failed")?;

    let plan = build_plan(&catalog, &spec.params()?);
    info!("{plan}");

    Executor::new(&plan, &catalog, store.dir())
        .run(&mut arena)
        .context("query execution failed")?;

    let values = results::collect(&plan);
    let report = PathBuf::from("./results").join(format!("ScanResult_{}.csv", spec.matric));
    results::write_report(&report, spec.year, spec.month, spec.town_name(), &values)?;

    for (category, value) in results::CATEGORIES.iter().zip(&values) {
        println!("{category}: {value:.2}");
    }
    println!("Results written to {}", report.display());
    Ok(())
}
