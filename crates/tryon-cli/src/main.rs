//! Try-on CLI - Command-line interface for garment generation and virtual try-on
//!
//! Usage:
//!     tryon [OPTIONS] <COMMAND>
//!
//! Environment Variables:
//!     REPLICATE_API_TOKEN: API token for the Replicate prediction API (required)
//!     REPLICATE_API_BASE: API base URL (default: https://api.replicate.com/v1)
//!     TRYON_LANG: Output language, ja or en (default: ja)
//!     TRYON_POLL_INTERVAL: Seconds between prediction status polls (default: 0.5)
//!     TRYON_COMPLETION_TIMEOUT: Seconds one submission may run (default: no limit)
//!     RUST_LOG: Log filter (default: info)

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tryon_client::{
    create_english_prompt, get_message, preview, probe_connectivity, GarmentTransferClient,
    ImageRef, ImageSynthesisClient, InferenceOutcome, Language, ReplicateConfig, API_TOKEN_ENV,
    DEFAULT_API_BASE,
};

/// Try-on - garment generation and virtual try-on
#[derive(Parser, Debug)]
#[command(name = "tryon")]
#[command(about = "Try-on - garment generation and virtual try-on")]
#[command(after_help = r#"Examples:
    # Check whether the API token is configured
    tryon status

    # Generate a garment image from a prompt
    tryon generate "red floral summer dress"

    # Wrap the prompt in the fashion photography template
    tryon generate --enhance "red floral summer dress"

    # Dress a local photo in a generated garment
    tryon transfer --person ./me.jpg --garment https://replicate.delivery/xezq/out-0.png

    # Print the result as JSON
    tryon --json transfer --person ./me.jpg --garment ./dress.png
"#)]
struct Cli {
    /// Replicate API base URL
    #[arg(long, env = "REPLICATE_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    api_base: String,

    /// Language for messages (ja or en, default: ja)
    #[arg(long, env = "TRYON_LANG", default_value = "ja", value_parser = ["ja", "en"], global = true)]
    lang: String,

    /// Print the outcome as a JSON body
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether the provider credential is configured
    Status,

    /// Generate a garment image from a text prompt
    Generate {
        /// Garment description sent to the image model
        prompt: String,

        /// Wrap the prompt in the fashion photography template
        #[arg(long)]
        enhance: bool,
    },

    /// Composite a garment image onto a person image
    Transfer {
        /// Person image: URL, data URI or image file
        #[arg(long, value_name = "IMAGE")]
        person: String,

        /// Garment image: URL, data URI or image file
        #[arg(long, value_name = "IMAGE")]
        garment: String,
    },
}

/// Install the tracing subscriber; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print a probe result; returns whether the credential is configured
fn run_status(config: &ReplicateConfig, lang: Language, json: bool) -> Result<bool> {
    let status = probe_connectivity(config, lang);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let icon = if status.configured { "\u{2705}" } else { "\u{274C}" };
        println!("{}: {} {}", get_message("status", lang), icon, status.message);
        println!("  API base: {}", config.api_base);
        if !status.configured {
            println!("  Solution: export {}=r8_...", API_TOKEN_ENV);
        }
    }

    Ok(status.configured)
}

/// Print an outcome; returns whether it succeeded
fn report(outcome: &InferenceOutcome, lang: Language, json: bool) -> Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(outcome.is_success());
    }

    println!("{}", "-".repeat(50));
    match outcome {
        InferenceOutcome::Success { image_url } => {
            println!("\u{2705} {}", get_message("succeeded", lang));
            println!("{}: {}", get_message("result_image", lang), image_url);
        }
        InferenceOutcome::Failure { message } => {
            println!("\u{274C} {}", get_message("failed", lang));
            println!("   Error: {}", message);
        }
    }
    println!("{}", "-".repeat(50));

    Ok(outcome.is_success())
}

async fn run_generate(
    config: &ReplicateConfig,
    lang: Language,
    json: bool,
    prompt: &str,
    enhance: bool,
) -> Result<bool> {
    let prompt = if enhance {
        create_english_prompt(prompt)
    } else {
        prompt.to_string()
    };

    if !json {
        println!("\u{1F3A8} {}...", get_message("generating", lang));
        println!("{}: {}", get_message("prompt", lang), prompt);
    }

    let outcome = ImageSynthesisClient::new(config).generate(&prompt).await;
    report(&outcome, lang, json)
}

async fn run_transfer(
    config: &ReplicateConfig,
    lang: Language,
    json: bool,
    person: &str,
    garment: &str,
) -> Result<bool> {
    let person = ImageRef::resolve(person)
        .await
        .map_err(|e| anyhow!("{}: {}", get_message("person_image", lang), e))?;
    let garment = ImageRef::resolve(garment)
        .await
        .map_err(|e| anyhow!("{}: {}", get_message("garment_image", lang), e))?;

    debug!(
        "Person image {} chars, garment image {} chars",
        person.as_str().len(),
        garment.as_str().len()
    );

    if !json {
        println!("\u{1F457} {}...", get_message("transferring", lang));
        println!("{}: {}", get_message("person_image", lang), preview(person.as_str(), 50));
        println!("{}: {}", get_message("garment_image", lang), preview(garment.as_str(), 50));
    }

    let outcome = GarmentTransferClient::new(config)
        .transfer(person.as_str(), garment.as_str())
        .await;
    report(&outcome, lang, json)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let lang = Language::from_str(&args.lang);
    let config = ReplicateConfig::from_env().with_api_base(&args.api_base);
    debug!("Using {:?}", config);

    let ok = match &args.command {
        Command::Status => run_status(&config, lang, args.json)?,
        Command::Generate { prompt, enhance } => {
            run_generate(&config, lang, args.json, prompt, *enhance).await?
        }
        Command::Transfer { person, garment } => {
            run_transfer(&config, lang, args.json, person, garment).await?
        }
    };

    if !ok {
        std::process::exit(1);
    }

    Ok(())
}
