//! Fact-check domain - claims, verdicts and the verification prompt

mod claim;
mod prompt;
mod verdict;

pub use claim::Claim;
pub use prompt::render_fact_check_prompt;
pub use verdict::Verdict;
