//! Ask command - answers a single query through the full pipeline

use std::time::Duration;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::api::types::AnswerResponse;
use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::services::AnswerParams;

/// Arguments for the ask command
#[derive(Args, Clone, Debug)]
pub struct AskArgs {
    /// Query text
    pub query: String,

    /// Maximum number of search results to retrieve
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Context budget in characters
    #[arg(long)]
    pub context_budget: Option<usize>,

    /// Overall deadline in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl AskArgs {
    fn params(&self) -> AnswerParams {
        AnswerParams {
            max_results: self.max_results,
            context_budget: self.context_budget,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Run a single query and print the answer as JSON on stdout
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    let service = crate::build_answer_service(&config)?;
    info!(
        model = service.model_id(),
        search_provider = service.search_provider(),
        "Answering query"
    );

    let result = service.answer(&args.query, args.params()).await?;
    let response = AnswerResponse::from(result);

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
