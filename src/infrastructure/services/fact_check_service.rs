//! Fact-check service - verifies a claim through the answer pipeline
//!
//! claim -> evidence search -> context -> verification prompt -> verdict

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{info, instrument, warn, Span};

use super::{AnswerParams, AnswerService};
use crate::domain::factcheck::render_fact_check_prompt;
use crate::domain::{Claim, DomainError, ErrorKind, InferenceResult, Query, Verdict};
use crate::infrastructure::observability::record_fact_check;

const DEFAULT_NAMESPACE: &str = "fact_checks";

/// Verifies claims, sharing retrieval, slots, workers and cache with [`AnswerService`]
#[derive(Debug)]
pub struct FactCheckService {
    answers: Arc<AnswerService>,
    namespace: String,
}

impl FactCheckService {
    pub fn new(answers: Arc<AnswerService>) -> Self {
        Self {
            answers,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Verify `claim` against web evidence.
    ///
    /// Model failures and unparseable replies yield an unverified fallback
    /// verdict with zero confidence. Invalid claims and lack of capacity are
    /// still reported as errors.
    #[instrument(skip(self, claim, params), fields(cache_key = tracing::field::Empty))]
    pub async fn verify(
        &self,
        claim: &Claim,
        params: AnswerParams,
    ) -> Result<Verdict, DomainError> {
        let started = Instant::now();

        let outcome = self.verify_inner(claim, &params, started).await;

        let label = match &outcome {
            Ok((_, label)) => *label,
            Err(e) => e.kind().as_str(),
        };
        record_fact_check(label, started.elapsed());

        outcome.map(|(verdict, _)| verdict)
    }

    async fn verify_inner(
        &self,
        claim: &Claim,
        params: &AnswerParams,
        started: Instant,
    ) -> Result<(Verdict, &'static str), DomainError> {
        let query = Query::new(&claim.search_query(), self.answers.query_params(params))?;
        let deadline = started + query.params().timeout;

        let key_params = query
            .cache_key_params()
            .with_component("date_claimed", claim.date_claimed().unwrap_or_default());
        let key = self.answers.namespaced_key(&self.namespace, &key_params);
        Span::current().record("cache_key", key.as_str());

        if let Some(cached) = self.answers.lookup(&key).await {
            match Verdict::parse(&cached.text) {
                Ok(verdict) => {
                    info!("Serving cached verdict");
                    return Ok((with_context_sources(verdict, &cached), "cached"));
                }
                Err(e) => warn!(error = %e, "Ignoring unparseable cached verdict"),
            }
        }

        let context = self.answers.gather_context(&query, deadline).await?;
        let prompt = render_fact_check_prompt(claim, &context);

        let result = match self.answers.generate(prompt, &context, deadline).await {
            Ok(result) => result,
            Err(e) if degrades_to_fallback(&e) => {
                warn!(error = %e, kind = %e.kind(), "Verification failed, reporting fallback verdict");
                return Ok((Verdict::fallback(&e), "fallback"));
            }
            Err(e) => return Err(e),
        };

        let verdict = match Verdict::parse(&result.text) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, model = %result.model, "Model reply is not a verdict");
                return Ok((Verdict::fallback(&e), "fallback"));
            }
        };

        self.answers.store(&key, &result).await;

        let label = if verdict.verified { "verified" } else { "refuted" };
        info!(
            verified = verdict.verified,
            confidence = verdict.confidence,
            latency_ms = result.latency_ms,
            "Claim checked"
        );

        Ok((with_context_sources(verdict, &result), label))
    }
}

/// Model-side failures become a fallback verdict; everything else is the caller's problem
fn degrades_to_fallback(error: &DomainError) -> bool {
    matches!(
        error.kind(),
        ErrorKind::InferenceFailed | ErrorKind::ResourceExhausted
    )
}

/// Fall back to the context's URLs when the model cites none
fn with_context_sources(mut verdict: Verdict, result: &InferenceResult) -> Verdict {
    if verdict.sources.is_empty() {
        verdict.sources = result.sources.clone();
    }
    verdict
}
