mod output;
mod settings;

use std::{
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use review_client::{HttpAssistBackend, Outcome, ReviewAssistController};
use review_shared::domain::{AssistMode, ReviewId};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::{
    output::print_report,
    settings::{load_settings, CliOverrides, Settings},
};

#[derive(Parser, Debug)]
#[command(name = "review-assist", about = "Drive the review assist endpoints from a terminal")]
struct Args {
    /// Settings file (defaults to ./review_assist.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    generate_url: Option<String>,
    #[arg(long, global = true)]
    pros_cons_url: Option<String>,
    #[arg(long, global = true)]
    csrf_token: Option<String>,
    /// Print the final session as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite the review text in the chosen mode.
    Generate {
        #[arg(long)]
        mode: Option<String>,
        #[command(flatten)]
        input: ReviewInput,
    },
    /// Extract pros and cons from the review text.
    ProsCons {
        #[command(flatten)]
        input: ReviewInput,
    },
    /// Extract pros and cons of a published review.
    CardProsCons {
        #[arg(long, conflicts_with = "review_id")]
        url: Option<Url>,
        #[arg(long)]
        review_id: Option<i64>,
    },
}

#[derive(ClapArgs, Debug)]
struct ReviewInput {
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
}

impl ReviewInput {
    /// Falls back to stdin when neither `--text` nor `--file` is given.
    fn read(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read review file '{}'", path.display()));
        }
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read review text from stdin")?;
        Ok(text)
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn backend(settings: &Settings) -> Result<HttpAssistBackend> {
    match settings.request_timeout_secs {
        Some(secs) => HttpAssistBackend::with_timeout(Duration::from_secs(secs))
            .context("failed to build HTTP client"),
        None => Ok(HttpAssistBackend::new()),
    }
}

async fn run(args: Args, settings: Settings) -> Result<Outcome> {
    let backend = Arc::new(backend(&settings)?);

    let (controller, outcome) = match &args.command {
        Command::Generate { mode, input } => {
            let form = settings.review_form(input.read()?)?;
            if form.generate_url.is_none() {
                bail!("generate_url is not configured (use --generate-url or the settings file)");
            }
            let controller =
                ReviewAssistController::new(form, backend).with_stale_policy(settings.stale_policy);
            if let Some(mode) = mode {
                controller
                    .select_mode(&AssistMode::new(mode.clone()))
                    .await
                    .with_context(|| format!("cannot select mode '{mode}'"))?;
            }
            let outcome = controller.generate().await;
            (controller, outcome)
        }
        Command::ProsCons { input } => {
            let form = settings.review_form(input.read()?)?;
            if form.pros_cons_url.is_none() {
                bail!("pros_cons_url is not configured (use --pros-cons-url or the settings file)");
            }
            let controller = ReviewAssistController::new(form, backend);
            let outcome = controller.extract_pros_cons().await;
            (controller, outcome)
        }
        Command::CardProsCons { url, review_id } => {
            let card = match (url, review_id) {
                (Some(url), _) => review_client::ReviewCardControl {
                    review_id: None,
                    pros_cons_url: Some(url.clone()),
                },
                (None, Some(id)) => settings.card_control(ReviewId(*id))?,
                (None, None) => return Err(anyhow!("pass --url or --review-id")),
            };
            let form = settings.review_form("")?.with_review_card(card);
            let controller = ReviewAssistController::new(form, backend);
            let outcome = controller.extract_card_pros_cons(0).await;
            (controller, outcome)
        }
    };

    print_report(&outcome, &controller.session().await, args.json)?;
    Ok(outcome)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    settings.apply_cli_overrides(CliOverrides {
        generate_url: args.generate_url.clone(),
        pros_cons_url: args.pros_cons_url.clone(),
        csrf_token: args.csrf_token.clone(),
    });
    init_tracing(&settings);
    tracing::debug!(
        stale_policy = ?settings.stale_policy,
        timeout_secs = ?settings.request_timeout_secs,
        "assist: settings loaded"
    );

    let outcome = run(args, settings).await?;
    Ok(match outcome {
        Outcome::Applied => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
