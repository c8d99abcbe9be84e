extern crate supply_repair;

use clap::{Args, Parser};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use supply_repair::input::{ingest_config, RepairConfig};
use supply_repair::output::FileOutput;
use supply_repair::{
    run_repair, BuildingList, ReferenceGenerator, ResourceTable, ResourceTables, RunFlags,
};
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct RepairArgs {
    #[arg(help = "Path to the population in .csv format, one individual per row")]
    population_file: String,
    #[arg(
        long,
        short,
        help = "Path to the geothermal potential table (Name, Area_geo) in .csv format"
    )]
    geothermal_potential: String,
    #[arg(long, short, help = "Path to the total demand table (Name) in .csv format")]
    total_demand: String,
    #[arg(
        long,
        short,
        help = "Nominal installed capacity of the district heating plant, in W"
    )]
    nominal_capacity: f64,
    #[arg(long, short, help = "Path to a repair configuration in .json format")]
    config: Option<String>,
    #[command(flatten)]
    scenario: ScenarioChoice,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

#[derive(Args, Clone, Copy, Default, Debug)]
#[group(required = false, multiple = false)]
struct ScenarioChoice {
    #[arg(
        long,
        help = "Replace every individual by the reference scenario before repairing"
    )]
    reference: bool,
    #[arg(
        long,
        help = "Replace every individual by the configured manual scenario before repairing"
    )]
    manual: bool,
}

impl From<ScenarioChoice> for RunFlags {
    fn from(choice: ScenarioChoice) -> Self {
        let mut flags = RunFlags::empty();
        if choice.reference {
            flags.insert(RunFlags::REFERENCE_SCENARIO);
        }
        if choice.manual {
            flags.insert(RunFlags::MANUAL_CONFIGURATION);
        }
        flags
    }
}

fn main() -> anyhow::Result<()> {
    let args = RepairArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(tracing::Level::INFO);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let config = match args.config {
        Some(ref file) => ingest_config(BufReader::new(File::open(file)?))?,
        None => RepairConfig::default(),
    };

    let tables = ResourceTables {
        buildings: BuildingList::from_total_demand_csv(BufReader::new(File::open(
            &args.total_demand,
        )?))?,
        geothermal: ResourceTable::from_csv(BufReader::new(File::open(
            &args.geothermal_potential,
        )?))?,
    };

    let population_file = Path::new(args.population_file.as_str());
    let population_stem = population_file
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("population");
    let output_path = population_file.with_file_name(format!("{population_stem}__repaired"));
    fs::create_dir_all(&output_path)?;
    let file_output = FileOutput::new(
        PathBuf::from(&output_path),
        format!("{population_stem}__{{}}.{{}}"),
    );

    let summary = run_repair(
        BufReader::new(File::open(population_file)?),
        &file_output,
        &tables,
        &config,
        args.nominal_capacity,
        &ReferenceGenerator,
        args.scenario.into(),
    )?;

    info!("Summary: {}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
