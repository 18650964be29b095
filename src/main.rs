//! pumpdrive - runs an assessment from an answers file and prints the report.
//!
//! ```text
//! pumpdrive <answers.yaml|answers.json> [--json]
//! ```
//!
//! Configuration comes from `PUMPDRIVE__*` environment variables (see
//! `pumpdrive_engine::config`). Logs go to stderr; the report goes to stdout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Deserialize;
use tracing::{error, info};

use pumpdrive_engine::application::RecommendationEngine;
use pumpdrive_engine::config::{AppConfig, LogFormat, LoggingConfig};
use pumpdrive_engine::domain::foundation::Category;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Answers file layout.
#[derive(Debug, Deserialize)]
struct AnswersFile {
    #[serde(default)]
    answers: Vec<Answer>,
    #[serde(default)]
    priorities: BTreeMap<Category, f64>,
}

#[derive(Debug, Deserialize)]
struct Answer {
    category: Category,
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    topics: Vec<String>,
}

struct Args {
    answers: PathBuf,
    json: bool,
}

impl Args {
    fn parse(raw: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut answers = None;
        let mut json = false;
        for arg in raw {
            match arg.as_str() {
                "--json" => json = true,
                flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
                path => answers = Some(PathBuf::from(path)),
            }
        }
        let answers = answers.ok_or_else(|| "missing answers file".to_string())?;
        Ok(Self { answers, json })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}\nusage: pumpdrive <answers.yaml|answers.json> [--json]");
            return ExitCode::from(2);
        }
    };

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("logging setup failed: {e}");
        return ExitCode::from(2);
    }

    match run(&config, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "assessment failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), BoxError> {
    let filter = logging.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Json => builder.json().try_init()?,
        LogFormat::Pretty => builder.try_init()?,
    }
    Ok(())
}

async fn run(config: &AppConfig, args: &Args) -> Result<(), BoxError> {
    let answers = read_answers(&args.answers)?;
    let engine = RecommendationEngine::from_config(config).await?;

    info!(
        session_id = %engine.session_id().await,
        answers = answers.answers.len(),
        online = config.is_online(),
        "starting assessment"
    );

    for (category, priority) in &answers.priorities {
        engine.set_category_priority(*category, *priority).await?;
    }
    for answer in answers.answers {
        engine.begin_category(answer.category).await?;
        engine
            .submit_category_response(answer.category, answer.transcript, answer.topics)
            .await?;
    }
    engine.wait_for_enrichment().await;

    let recommendation = engine.get_final_recommendation().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
    } else {
        println!("{}", recommendation.report);
    }

    let stats = engine.get_cache_stats().await;
    info!(
        hit_rate = stats.hit_rate,
        total_requests = stats.total_requests,
        cache_hits = stats.cache_hits,
        "assessment complete"
    );
    Ok(())
}

fn read_answers(path: &Path) -> Result<AnswersFile, BoxError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    parse_answers(&text, path)
}

fn parse_answers(text: &str, path: &Path) -> Result<AnswersFile, BoxError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let answers = if is_json {
        serde_json::from_str(text)?
    } else {
        serde_yaml::from_str(text)?
    };
    Ok(answers)
}
