use anyhow::Context;
use clap::Parser;
use mongo_drawio::{DrawioExporter, Schema, SchemaFilter};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mongo-drawio")]
#[command(version)]
#[command(about = "Export an entity schema as a draw.io ER diagram", long_about = None)]
struct Cli {
    /// Schema JSON files, merged in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Tables to leave out (comma-separated)
    #[arg(long, value_delimiter = ',')]
    exclude_tables: Vec<String>,

    /// Fields to leave out of every table (comma-separated)
    #[arg(long, value_delimiter = ',')]
    exclude_fields: Vec<String>,

    /// Only keep these fields (comma-separated); `a` also keeps `a.b`
    #[arg(long, value_delimiter = ',')]
    include_fields: Option<Vec<String>>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut schema = Schema::default();
    for path in &cli.inputs {
        let input = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let part: Schema = serde_json::from_str(&input)
            .with_context(|| format!("failed to parse schema {}", path.display()))?;
        schema.merge(part);
    }

    let filter = SchemaFilter {
        exclude_tables: cli.exclude_tables,
        exclude_fields: cli.exclude_fields,
        include_fields: cli.include_fields,
    };
    if !filter.exclude_tables.is_empty() {
        tracing::info!("exclude tables: {}", filter.exclude_tables.join(", "));
    }
    if !filter.exclude_fields.is_empty() {
        tracing::info!("exclude fields: {}", filter.exclude_fields.join(", "));
    }
    let schema = filter.apply(&schema);

    for table in &schema.tables {
        tracing::info!("export table {}", table.name);
    }

    let exporter = DrawioExporter::new()?;
    let export = exporter.export(&schema)?;
    if !export.unresolved.is_empty() {
        tracing::info!(
            "{} reference(s) skipped, {} connection(s) drawn",
            export.unresolved.len(),
            export.connections.len()
        );
    }

    match cli.output {
        Some(path) => fs::write(&path, &export.xml)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", export.xml),
    }

    Ok(())
}
