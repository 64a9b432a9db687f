//! # formfill CLI
//!
//! ## Usage
//!
//! ```bash
//! # Run the remote fill service
//! formfill serve --listen 0.0.0.0:8787
//!
//! # Export records, trying a remote fill service first
//! formfill export --template https://cdn.example.com/coc.pdf \
//!   --mapping mapping.json --records submissions.json \
//!   --endpoint https://fill.example.com/pdf-export --bulk
//!
//! # Fill one record locally
//! formfill fill --template coc.pdf --mapping mapping.json --record jane.json
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use export::{
    DeliveryPath, ExportConfig, Exporter, HttpFetcher, LocalFiller, MemoryMappingStore,
    TemplateLocation,
};
use fill_server::ServerConfig;
use filler::naming::{single_file_name, UniqueNames};
use filler::{Mapping, Record};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// formfill - fill PDF templates from mapped records
#[derive(Parser, Debug)]
#[command(name = "formfill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the remote fill service
    Serve(ServerConfig),

    /// Export records, trying a remote fill service first
    Export {
        /// Template URL or local path
        #[arg(long)]
        template: String,

        /// Mapping JSON file
        #[arg(long)]
        mapping: PathBuf,

        /// Records JSON file (one object or an array)
        #[arg(long)]
        records: PathBuf,

        /// Remote fill endpoint
        #[arg(long, env = "FORMFILL_ENDPOINT")]
        endpoint: Option<String>,

        /// Bearer token for the remote fill endpoint
        #[arg(long, env = "FORMFILL_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// API key for the remote fill endpoint
        #[arg(long, env = "FORMFILL_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Pack all records into one ZIP
        #[arg(long)]
        bulk: bool,

        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Network timeout in seconds
        #[arg(long, default_value_t = 20)]
        timeout: u64,
    },

    /// Fill one record locally
    Fill {
        /// Template URL or local path
        #[arg(long)]
        template: String,

        /// Mapping JSON file
        #[arg(long)]
        mapping: PathBuf,

        /// Record JSON file
        #[arg(long)]
        record: PathBuf,

        /// Output file (defaults to the record's display name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(config) => fill_server::serve(config).await?,
        Commands::Export {
            template,
            mapping,
            records,
            endpoint,
            token,
            api_key,
            bulk,
            out_dir,
            timeout,
        } => {
            let mapping = read_mapping(&mapping)?;
            let records = read_records(&records)?;

            let mut config =
                ExportConfig::new(&template).with_timeout(Duration::from_secs(timeout));
            config.endpoint = endpoint;
            config.token = token;
            config.api_key = api_key;

            let exporter = Exporter::new(config, Arc::new(MemoryMappingStore::new()))?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;

            if bulk {
                let deliverable = exporter.bulk_with(&records, &mapping).await?;
                let path = out_dir.join(&deliverable.file_name);
                write_output(&path, &deliverable.bytes, deliverable.path)?;
            } else {
                let mut names = UniqueNames::new();
                for record in &records {
                    let deliverable = exporter.single_with(record, &mapping).await?;
                    let name = names.claim(record.display_name().as_deref());
                    let path = out_dir.join(name);
                    write_output(&path, &deliverable.bytes, deliverable.path)?;
                }
            }
        }
        Commands::Fill {
            template,
            mapping,
            record,
            output,
        } => {
            let mapping = read_mapping(&mapping)?;
            let record = Record::from_value(read_json(&record)?)?;

            let filler = LocalFiller::new(
                HttpFetcher::new(export::DEFAULT_TIMEOUT)?,
                TemplateLocation::parse(&template)?,
            );
            let bytes = filler.single(&record, &mapping).await?;

            let output = output.unwrap_or_else(|| PathBuf::from(single_file_name(&record)));
            write_output(&output, &bytes, DeliveryPath::Local)?;
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn read_mapping(path: &Path) -> anyhow::Result<Mapping> {
    Ok(Mapping::from_value(read_json(path)?)?)
}

fn read_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let records = match read_json(path)? {
        Value::Array(values) => values
            .into_iter()
            .map(Record::from_value)
            .collect::<Result<Vec<_>, _>>()?,
        value => vec![Record::from_value(value)?],
    };
    if records.is_empty() {
        bail!("{} contains no records", path.display());
    }
    Ok(records)
}

fn write_output(path: &Path, bytes: &[u8], delivery: DeliveryPath) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!(
        "wrote {} ({} bytes, {:?} fill)",
        path.display(),
        bytes.len(),
        delivery
    );
    Ok(())
}
