use std::fs;
use std::path::PathBuf;

use aircraft_model::record::csv_sheet::worksheet_path;
use aircraft_model::reporting::display_report;
use aircraft_model::*;
use chrono::Local;
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "main")]
#[command(version)]
#[command(about = "Recompute a fixed-wing aircraft model and reconcile it with its CSV worksheet")]
struct Args {
    /// Worksheet to load, as a header-less CSV file
    sheet: PathBuf,

    /// JSON model configuration (constants, tolerance, strictness)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to save the synchronized worksheet [default: a new plane_<dd-mm-HHMM>.csv copy]
    #[arg(short, long, conflicts_with = "in_place")]
    out: Option<PathBuf>,

    /// Save back into the loaded worksheet
    #[arg(long)]
    in_place: bool,

    /// Fail unless validation collects no issue at all
    #[arg(long)]
    strict: bool,

    /// Override an input before pushing, e.g. `--set wing.span=1.3`
    #[arg(long = "set", value_parser = parse_assignment)]
    overrides: Vec<(String, String, f64)>,

    /// Also write a JSON snapshot of every field
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn parse_assignment(s: &str) -> Result<(String, String, f64), String> {
    let (target, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected component.field=value, got `{s}`"))?;
    let (component, field) = target
        .split_once('.')
        .ok_or_else(|| format!("expected component.field, got `{target}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value `{value}`: {e}"))?;
    Ok((component.trim().to_string(), field.trim().to_string(), value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ModelConfig::from_file(path)?,
        None => ModelConfig::default(),
    };
    if args.strict {
        config.strictness = Strictness::Strict;
    }

    info!("Opening worksheet {}", args.sheet.display());
    let sheet = CsvSheet::open(&args.sheet)?;
    let mut env = Environment::new(sheet, config)?;

    let report = env.load();
    display_report("Load", &report);

    if !args.overrides.is_empty() {
        for (component, field, value) in &args.overrides {
            env.set_input(component, field, *value)?;
            println!("Set {component}.{field} = {value}");
        }
        display_report("Recompute", &env.recompute());
    }

    let report = env.push();
    display_report("Push", &report);

    let outcome = env.validate();
    display_report("Validate", &outcome.report);

    let snapshot = ModelSnapshot::capture(&env);
    println!();
    snapshot.display_data();
    if let Some(path) = &args.snapshot {
        fs::write(path, snapshot.to_json()?)?;
        println!("Snapshot written to {}", path.display());
    }

    let out = match (&args.out, args.in_place) {
        (Some(path), _) => path.clone(),
        (None, true) => args.sheet.clone(),
        (None, false) => worksheet_path(&args.sheet, Local::now()),
    };
    env.record().save(&out)?;
    println!("Worksheet saved to {}", out.display());

    if outcome.passed {
        println!("All validations passed");
        Ok(())
    } else {
        Err(format!("validation failed: {}", outcome.report).into())
    }
}
