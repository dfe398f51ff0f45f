//! pnpgen CLI
//!
//! Turns a plain-language site description into a PnP provisioning template.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use pnpgen::{
    error::{AppError, Result},
    models::Config,
    pipeline,
    services::{OpenAiGenerator, StructureGenerator, XsdValidator},
    storage::LocalStorage,
};

/// pnpgen - SharePoint PnP Provisioning XML Generator
#[derive(Parser, Debug)]
#[command(
    name = "pnpgen",
    version,
    about = "Generate SharePoint PnP provisioning templates from site descriptions"
)]
struct Cli {
    /// Site description; prompted for when omitted
    description: Vec<String>,

    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
    pnpgen::utils::log::init(level);
}

/// Ask for a description on stdin.
fn prompt_description() -> Result<String> {
    println!("Examples:");
    println!("  'Create a communication site for HR policies with document library'");
    println!(
        "  'Team site for project management with a document library called \"Project Files\"'"
    );
    println!("  'Educational hub with class materials and events calendar'");
    println!();
    print!("Enter site description: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    let generator = OpenAiGenerator::from_config(&config.generator)?;
    match &generator {
        Some(_) => log::info!("Chat model integration available"),
        None => log::warn!(
            "{} is not set; using the fallback extractor. Add it to the environment or a .env file.",
            config.generator.api_key_env
        ),
    }

    let description = if cli.description.is_empty() {
        prompt_description()?
    } else {
        cli.description.join(" ")
    };
    if description.is_empty() {
        return Err(AppError::config("No description provided"));
    }

    let validator = XsdValidator::new(&config.output.schema_file);
    let storage = LocalStorage::new(".", config.output.clone());

    pipeline::run_pipeline(
        &config,
        &description,
        generator.as_ref().map(|g| g as &dyn StructureGenerator),
        &validator,
        &storage,
    )
    .await?;

    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
