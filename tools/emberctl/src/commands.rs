//! Subcommand handlers
//!
//! Every handler takes an already configured client and prints to stdout.

use anyhow::{anyhow, Result};
use colored::*;
use ember_comlink::{BuilderClient, ComlinkError, JobListKind};
use ember_model::{JobDefaults, OptionMode, WireBuffer};
use errors::EmberErrorTrait;

/// Error for the terminal, tagged with its code
fn report(err: ComlinkError) -> anyhow::Error {
    anyhow!("[{}] {}", err.error_code(), err)
}

/// Received defaults as key/value pairs, builder wire keys first
pub fn defaults_pairs(defaults: &JobDefaults) -> Vec<(String, String)> {
    let mut buffer = WireBuffer::new();
    defaults.fgm.stream_for(OptionMode::Copy, &mut buffer);
    defaults.fbp.stream_for(OptionMode::Copy, &mut buffer);
    defaults.fmc.stream_for(OptionMode::Copy, &mut buffer);

    let mut lines = buffer.lines().into_iter();
    let mut pairs = Vec::new();
    while let (Some(key), Some(value)) = (lines.next(), lines.next()) {
        pairs.push((key, value));
    }

    let fwi = [
        ("fwispacinterp", defaults.fwi.fwi_spac_interp),
        ("fwifromspacweather", defaults.fwi.fwi_from_spac_weather),
        ("historyonfwi", defaults.fwi.history_on_effected_fwi),
        ("fwitemporalinterp", defaults.fwi.fwi_temporal_interp),
        ("burningconditionson", defaults.fwi.burning_conditions_on),
    ];
    for (key, value) in fwi {
        if let Some(v) = value {
            pairs.push((key.to_string(), v.to_string()));
        }
    }

    pairs.extend(defaults.unknown.iter().cloned());
    pairs
}

pub async fn show_defaults(client: &BuilderClient) -> Result<()> {
    let defaults = client.get_defaults().await.map_err(report)?;
    let pairs = defaults_pairs(&defaults);
    if pairs.is_empty() {
        println!("{}", "Builder sent no defaults".yellow());
        return Ok(());
    }

    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    println!("{}", "Builder defaults:".bright_cyan());
    for (key, value) in &pairs {
        println!("  {:width$}  {}", key, value, width = width);
    }
    if !defaults.unknown.is_empty() {
        println!(
            "{} {} key(s) not recognised",
            "Note:".yellow(),
            defaults.unknown.len()
        );
    }
    Ok(())
}

pub async fn list_timezones(client: &BuilderClient, yaml: bool) -> Result<()> {
    let zones = client.list_timezones().await.map_err(report)?;
    if yaml {
        print!("{}", serde_yaml::to_string(&zones)?);
        return Ok(());
    }
    println!("{} {}", "Timezones:".bright_cyan(), zones.len());
    for zone in &zones {
        println!("  {:>6}  {}", zone.value, zone.name);
    }
    Ok(())
}

pub async fn list_licenses(client: &BuilderClient, yaml: bool) -> Result<()> {
    let licenses = client.get_licenses().await.map_err(report)?;
    if yaml {
        print!("{}", serde_yaml::to_string(&licenses)?);
        return Ok(());
    }
    for license in &licenses {
        println!(
            "{} {} ({})",
            license.name.bold(),
            license.version,
            license.license
        );
        if !license.url.is_empty() {
            println!("    {}", license.url.dimmed());
        }
    }
    Ok(())
}

pub async fn archive(client: &BuilderClient, job: &str, zip: bool) -> Result<()> {
    let lines = if zip {
        client.archive_zip(job).await
    } else {
        client.archive_tar(job).await
    }
    .map_err(report)?;
    let kind = if zip { "zip" } else { "tar" };
    println!("{} {} archive requested for {}", "✓".green(), kind, job);
    print_lines(&lines);
    Ok(())
}

pub async fn delete(client: &BuilderClient, job: &str) -> Result<()> {
    let lines = client.delete_job(job).await.map_err(report)?;
    println!("{} delete requested for {}", "✓".green(), job);
    print_lines(&lines);
    Ok(())
}

pub async fn stop(client: &BuilderClient, job: &str, priority: u16) -> Result<()> {
    let lines = client.stop_job(job, priority).await.map_err(report)?;
    println!(
        "{} stop requested for {} (priority {})",
        "✓".green(),
        job,
        priority
    );
    print_lines(&lines);
    Ok(())
}

pub async fn list_jobs(client: &BuilderClient, kind: JobListKind) -> Result<()> {
    let jobs = client.list_jobs(kind).await.map_err(report)?;
    if jobs.is_empty() {
        println!("{}", "No jobs".yellow());
    }
    for job in &jobs {
        println!("{}", job);
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        println!("  {}", line);
    }
}
