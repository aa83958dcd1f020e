//! procplan CLI: plans machining for part documents.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use procplan::kernel::BrepKernel;
use procplan::pipeline::{plan_batch, PlanRequest, ProcessPlan};
use procplan::profile::SectionProfile;
use procplan::reference::ReferenceData;

#[derive(Parser)]
#[command(name = "procplan")]
#[command(about = "Process planning for machined parts", long_about = None)]
struct Cli {
    /// Shop reference data overriding the built-in tables (.toml or .json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan one or more part documents
    Plan {
        /// Part documents (.json)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Material code, e.g. aluminum_6061
        #[arg(short, long)]
        material: String,
        /// Print the plans as pretty JSON
        #[arg(long)]
        json: bool,
    },
    /// List the material table
    Materials,
}

fn main() -> Result<()> {
    // WARN by default; override with RUST_LOG (e.g. RUST_LOG=procplan=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let reference = match &cli.config {
        Some(path) => ReferenceData::load_from_file(path)
            .with_context(|| format!("loading shop config {}", path.display()))?,
        None => ReferenceData::default(),
    };

    match cli.command {
        Commands::Plan { files, material, json } => plan(&reference, files, &material, json),
        Commands::Materials => {
            println!("{:<18} {:>14} {:>10}", "code", "min/cm3", "setup min");
            for m in &reference.materials {
                println!(
                    "{:<18} {:>14.3} {:>10.1}",
                    m.code, m.mrr_factor_min_per_cm3, m.setup_time_min
                );
            }
            Ok(())
        }
    }
}

fn plan(reference: &ReferenceData, files: Vec<PathBuf>, material: &str, json: bool) -> Result<()> {
    let requests: Vec<PlanRequest> = files.into_iter().map(|f| PlanRequest::new(f, material)).collect();
    let results = plan_batch(&BrepKernel, reference, &requests);

    let mut plans = Vec::new();
    let mut failed = 0usize;
    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(plan) => plans.push(plan),
            Err(err) => {
                failed += 1;
                eprintln!("{}: {err}", request.path.display());
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
    } else {
        for plan in &plans {
            print_summary(plan);
        }
    }

    if failed > 0 {
        bail!("{failed} of {} parts could not be planned", requests.len());
    }
    Ok(())
}

fn print_summary(plan: &ProcessPlan) {
    let axis = plan.axis.main_axis.map_or_else(|| "none".to_owned(), |a| a.to_string());
    println!("{}", plan.source.display());
    println!(
        "  {} part, axis {axis}, {} features, rotational ratio {:.2}",
        plan.axis.part_type,
        plan.features.len(),
        plan.axis.rotational_ratio
    );
    match &plan.profile {
        SectionProfile::Rotational(p) => println!(
            "  profile: {} outer / {} inner stations, max radius {:.2} mm",
            p.outer.len(),
            p.inner.len(),
            p.max_radius()
        ),
        SectionProfile::Prismatic { views } => println!("  profile: {} section views", views.len()),
        SectionProfile::NoResult { reason } => println!("  profile: no result ({reason})"),
    }
    println!(
        "  constraints: {} found, penalty x{:.2}{}",
        plan.constraints.constraints.len(),
        plan.constraints.penalty_multiplier,
        if plan.constraints.has_critical { ", critical" } else { "" }
    );
    println!(
        "  time: {:.1} min total ({:.1} cutting, {:.1} cm3 removed, {})",
        plan.estimate.total_min,
        plan.estimate.cutting_min(),
        plan.estimate.material_to_remove_cm3,
        plan.material
    );
    for setup in &plan.setups {
        let ids: Vec<&str> = setup.features.iter().map(|f| f.id.as_str()).collect();
        println!(
            "  setup {}: {} [{}, {}] {}",
            setup.id,
            setup.description,
            setup.fixture,
            setup.machine_type,
            ids.join(" ")
        );
    }
    for option in &plan.machine.options {
        let marker = if option.machine_type == plan.machine.recommended { "*" } else { " " };
        println!(
            "  {marker} {:<10} {} setups, {:.1} min, {:.2}",
            option.machine_type.to_string(),
            option.setup_count,
            option.total_time_min,
            option.total_cost
        );
    }
}
