use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a model as the runtime knows it: `name` or `name:tag`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Parse an optional request field; blank names mean "no preference"
    pub fn from_request(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bare model name without the tag
    pub fn name(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(name, _)| name)
    }

    pub fn tag(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, tag)| tag)
    }

    /// Whether an installed listing entry satisfies this request.
    ///
    /// A bare name accepts every tag of that name, a tagged name only
    /// accepts itself.
    pub fn matches_installed(&self, installed: &str) -> bool {
        installed == self.0
            || installed
                .strip_prefix(self.0.as_str())
                .is_some_and(|rest| rest.starts_with(':'))
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for ModelId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ModelId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name_matches_any_tag() {
        let id = ModelId::new("llama3.1");
        assert!(id.matches_installed("llama3.1"));
        assert!(id.matches_installed("llama3.1:latest"));
        assert!(id.matches_installed("llama3.1:70b-instruct-q4_0"));
        assert!(!id.matches_installed("llama3.10:latest"));
        assert!(!id.matches_installed("llama3"));
    }

    #[test]
    fn test_tagged_name_matches_exactly() {
        let id = ModelId::new("llama3.1:8b");
        assert!(id.matches_installed("llama3.1:8b"));
        assert!(!id.matches_installed("llama3.1:latest"));
        assert!(!id.matches_installed("llama3.1"));
    }

    #[test]
    fn test_name_and_tag() {
        let id = ModelId::new("phi3:mini");
        assert_eq!(id.name(), "phi3");
        assert_eq!(id.tag(), Some("mini"));

        let bare = ModelId::new("deepseek-r1");
        assert_eq!(bare.name(), "deepseek-r1");
        assert_eq!(bare.tag(), None);
    }

    #[test]
    fn test_blank_request_is_no_preference() {
        assert_eq!(ModelId::from_request(None), None);
        assert_eq!(ModelId::from_request(Some("")), None);
        assert_eq!(ModelId::from_request(Some("   ")), None);
        assert_eq!(
            ModelId::from_request(Some(" mistral:7b ")),
            Some(ModelId::new("mistral:7b"))
        );
    }
}
