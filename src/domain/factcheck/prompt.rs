//! Verification prompt

use super::Claim;
use crate::domain::context::Context;
use crate::domain::inference::EMPTY_CONTEXT_PLACEHOLDER;

const UNKNOWN_DATE: &str = "Unknown";

/// Prompt asking the model to judge `claim` against `context` and reply in JSON
pub fn render_fact_check_prompt(claim: &Claim, context: &Context) -> String {
    let evidence = if context.is_empty() {
        EMPTY_CONTEXT_PLACEHOLDER.to_string()
    } else {
        context.render()
    };

    format!(
        "You are an expert auditor verifying public claims against independent evidence.\n\n\
Claim: {claim}\n\
Date claimed: {date}\n\n\
Search results:\n{evidence}\n\n\
Decide whether the search results support the claim.\n\
- If they confirm it, set is_verified to true.\n\
- If they contradict it, set is_verified to false.\n\
- If they are inconclusive, set is_verified to false with a low confidence such as 0.1.\n\
Summarize the evidence in evidence_summary and list the URLs you relied on in source_urls.\n\n\
Reply with a single JSON object and nothing else:\n\
{{\"is_verified\": bool, \"confidence\": number between 0 and 1, \
\"evidence_summary\": string, \"source_urls\": [string]}}",
        claim = claim.description(),
        date = claim.date_claimed().unwrap_or(UNKNOWN_DATE),
        evidence = evidence,
    )
}
