//! Output formatting utilities

use colored::*;
use hangar_deploy::PlanSummary;
use hangar_types::GuestSpec;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "GROUP")]
    name: String,
    #[tabled(rename = "MACHINES")]
    machines: usize,
    #[tabled(rename = "MOUNT")]
    mount: String,
    #[tabled(rename = "RESERVABLE")]
    reservable: usize,
}

#[derive(Tabled, Serialize)]
struct SizeRow {
    #[tabled(rename = "SIZE")]
    name: String,
    #[tabled(rename = "CPU KIND")]
    cpu_kind: String,
    #[tabled(rename = "CPUS")]
    cpus: u32,
    #[tabled(rename = "MEMORY (MB)")]
    memory_mb: u32,
}

/// Print a single item in the specified format
fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(data)?);
        }
    }
    Ok(())
}

/// Print a plan summary
pub fn print_summary(summary: &PlanSummary, format: OutputFormat) -> anyhow::Result<()> {
    if !matches!(format, OutputFormat::Text) {
        return print_single(summary, format);
    }

    println!(
        "{} {} (release {} v{})",
        "✓".green(),
        "Preflight passed".bold(),
        summary.release_id,
        summary.release_version
    );
    println!("  App:        {}", summary.app);
    println!("  Image:      {} ({})", summary.image, summary.image_source);
    println!("  Strategy:   {}", summary.strategy);
    if let Some(guest) = &summary.guest {
        println!("  Guest:      {}", guest);
    }
    println!(
        "  Timeouts:   wait {}, lease {} (renew every {})",
        summary.wait_timeout, summary.lease_timeout, summary.lease_delay_between
    );
    if summary.first_deploy {
        println!("  {}", "First deploy".cyan());
    }
    if summary.restart_only {
        println!("  {}", "Restart only".yellow());
    }
    if summary.skip_health_checks {
        println!("  {}", "Health checks skipped".yellow());
    }
    if let Some(machine) = &summary.release_command_machine {
        println!("  Release command machine: {}", machine);
    }

    let rows: Vec<GroupRow> = summary
        .groups
        .iter()
        .map(|g| GroupRow {
            name: g.name.clone(),
            machines: g.machines,
            mount: g.mount.clone().unwrap_or_else(|| "-".into()),
            reservable: g.reservable,
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}

/// Print the recognized machine sizes
pub fn print_sizes(format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<SizeRow> = GuestSpec::preset_names()
        .into_iter()
        .filter_map(|name| {
            GuestSpec::from_size(&name).ok().map(|spec| SizeRow {
                cpu_kind: spec.cpu_kind.as_str().to_string(),
                cpus: spec.cpus,
                memory_mb: spec.memory_mb,
                name,
            })
        })
        .collect();

    match format {
        OutputFormat::Text => {
            println!("{}", Table::new(rows));
            Ok(())
        }
        _ => print_single(&rows, format),
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}
