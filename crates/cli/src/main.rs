use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use n9_core::{validate_objects, Kind, Manifest, Object};
use n9_decode::{standard, Decoder};
use n9_sources::{resolve_object_source, ObjectSource, ReaderConfig, SourceReader};
use n9_validation::PropertyPlan;
use serde::Serialize;
use tracing::{info, warn};

const STDIN_SOURCE: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "n9ctl", version, about = "Read and validate n9 manifests")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", env = "N9_OUTPUT", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
    Yaml,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode manifests and print the objects
    Read {
        /// Files, directories, glob patterns, URLs or `-` for stdin
        #[arg(required = true)]
        sources: Vec<String>,
    },
    /// Decode and validate manifests, exiting non-zero on any failure
    Validate {
        /// Files, directories, glob patterns, URLs or `-` for stdin
        #[arg(required = true)]
        sources: Vec<String>,
    },
    /// Print the validation plan of a kind
    Plan {
        /// Object kind, e.g. "SLO" or "alertpolicy"
        kind: Kind,
    },
}

fn init_tracing() {
    let env = std::env::var("N9_LOG").unwrap_or_else(|_| "info".to_string());
    let filter =
        tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("N9_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid N9_METRICS_ADDR; expected host:port");
        }
    }
}

fn print_structured<T: Serialize + ?Sized>(output: Output, value: &T) -> Result<()> {
    match output {
        Output::Yaml => print!("{}", serde_yaml::to_string(value)?),
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn build_sources(raws: &[String]) -> Result<Vec<ObjectSource>> {
    let mut sources = Vec::with_capacity(raws.len());
    let mut stdin_taken = false;
    for raw in raws {
        if raw == STDIN_SOURCE {
            if stdin_taken {
                warn!("stdin given more than once, reading it once");
                continue;
            }
            stdin_taken = true;
            sources.push(ObjectSource::reader(std::io::stdin(), STDIN_SOURCE));
            continue;
        }
        sources.push(resolve_object_source(raw).with_context(|| format!("resolving source '{raw}'"))?);
    }
    Ok(sources)
}

async fn read_objects(raws: &[String]) -> Result<Vec<Object>> {
    let registry = standard().context("building parser registry")?;
    let decoder = Decoder::new(Arc::new(registry));
    let config = ReaderConfig::from_env();
    let reader = SourceReader::new(decoder, config).context("building http client")?;
    let started = Instant::now();
    let objects = reader.read_objects_from_sources(build_sources(raws)?).await.context("reading objects")?;
    info!(count = objects.len(), took_ms = started.elapsed().as_millis() as u64, "objects read");
    Ok(objects)
}

fn print_objects(output: Output, objects: &[Object]) -> Result<()> {
    if output != Output::Human {
        return print_structured(output, objects);
    }
    for o in objects {
        let scope = match o.project() {
            Some(project) => format!("{}/{}", project, o.name()),
            None => o.name().to_string(),
        };
        println!("{} • {} • {}", o.kind(), scope, o.manifest_source());
    }
    Ok(())
}

fn print_plan(output: Output, plans: &[PropertyPlan]) -> Result<()> {
    if output != Output::Human {
        return print_structured(output, plans);
    }
    for p in plans {
        let mut flags = Vec::new();
        if p.is_optional {
            flags.push("optional");
        }
        if p.is_hidden {
            flags.push("hidden");
        }
        let flags = if flags.is_empty() { String::new() } else { format!(" ({})", flags.join(", ")) };
        println!("{} • {}{}", p.path, p.type_name, flags);
        for r in &p.rules {
            let code = if r.error_code.is_empty() { String::new() } else { format!(" [{}]", r.error_code) };
            println!("  - {}{}", r.description, code);
            if !r.details.is_empty() {
                println!("      {}", r.details);
            }
            for c in &r.conditions {
                println!("      when {c}");
            }
        }
        if !p.examples.is_empty() {
            println!("  examples: {}", p.examples.join(", "));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    match cli.command {
        Commands::Read { sources } => {
            info!(sources = ?sources, "read invoked");
            let objects = read_objects(&sources).await?;
            print_objects(cli.output, &objects)?;
        }
        Commands::Validate { sources } => {
            info!(sources = ?sources, "validate invoked");
            let objects = read_objects(&sources).await?;
            if let Err(errors) = validate_objects(&objects) {
                warn!(failed = errors.len(), total = objects.len(), "validation failed");
                match cli.output {
                    Output::Human => println!("{errors}"),
                    output => print_structured(output, &errors)?,
                }
                return Ok(ExitCode::FAILURE);
            }
            if cli.output == Output::Human {
                println!("{} object(s) valid", objects.len());
            }
        }
        Commands::Plan { kind } => {
            let plans = n9_core::v1alpha::plan_for(kind).with_context(|| format!("no validation plan for kind {kind}"))?;
            print_plan(cli.output, &plans)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_metrics_reach_the_prometheus_recorder() {
        let handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder().unwrap();
        let decoder = Decoder::new(Arc::new(standard().unwrap()));
        decoder.decode_objects(b"apiVersion: n9/v1alpha\nkind: Project\nmetadata:\n  name: a\n").unwrap();
        let rendered = handle.render();
        assert!(rendered.contains("objects_decoded_total"), "{rendered}");
    }
}
