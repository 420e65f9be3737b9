//! Verify command - checks a single claim and prints the verdict

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::api::types::FactCheckResponse;
use crate::config::AppConfig;
use crate::domain::Claim;
use crate::infrastructure::logging;
use crate::infrastructure::services::{AnswerParams, FactCheckService};

/// Arguments for the verify command
#[derive(Args, Clone, Debug)]
pub struct VerifyArgs {
    /// Claim to verify
    pub claim: String,

    /// Date the claim was made
    #[arg(long)]
    pub date_claimed: Option<String>,

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

impl VerifyArgs {
    fn params(&self) -> AnswerParams {
        AnswerParams {
            max_results: self.max_results,
            context_budget: self.context_budget,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Verify one claim and print the verdict as JSON on stdout
pub async fn run(args: VerifyArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    let claim = Claim::new(&args.claim, args.date_claimed.as_deref())?;

    let answers = Arc::new(crate::build_answer_service(&config)?);
    info!(
        model = answers.model_id(),
        search_provider = answers.search_provider(),
        "Verifying claim"
    );

    let service = FactCheckService::new(answers);
    let verdict = service.verify(&claim, args.params()).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&FactCheckResponse::from(verdict))?
    );

    Ok(())
}
