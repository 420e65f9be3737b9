use crate::domain::DomainError;

const SEARCH_SUFFIX: &str = "verification audit report";

/// A statement to verify against web evidence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    description: String,
    date_claimed: Option<String>,
}

impl Claim {
    pub fn new(description: &str, date_claimed: Option<&str>) -> Result<Self, DomainError> {
        let description = description.trim();

        if description.is_empty() {
            return Err(DomainError::validation("Claim cannot be empty"));
        }

        let date_claimed = date_claimed
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Self {
            description: description.to_string(),
            date_claimed,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date_claimed(&self) -> Option<&str> {
        self.date_claimed.as_deref()
    }

    /// Search text used to gather evidence for the claim
    pub fn search_query(&self) -> String {
        format!("{} {}", self.description, SEARCH_SUFFIX)
    }
}
