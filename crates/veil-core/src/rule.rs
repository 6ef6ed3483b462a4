use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// How a rule's match text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Exact substring, escaped before compilation.
    Literal,
    /// User-authored regular expression, used verbatim.
    Pattern,
}

impl RuleKind {
    /// Forward ordering rank: literal rules consume their spans before
    /// pattern rules see the text.
    pub(crate) fn rank(self) -> u8 {
        match self {
            RuleKind::Literal => 1,
            RuleKind::Pattern => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Literal => "literal",
            RuleKind::Pattern => "pattern",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown rule kind: {0}")]
pub struct UnknownKind(String);

impl std::str::FromStr for RuleKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "literal" => Ok(RuleKind::Literal),
            "pattern" => Ok(RuleKind::Pattern),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// A user-authored rewrite directive.
///
/// `priority` orders rules within their kind group only (lower = applied
/// earlier on redact); the two kind groups are ordered by kind, not by
/// priority. Timestamps are informational and never consulted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(rename = "match")]
    pub match_text: String,
    pub replacement: String,
    pub kind: RuleKind,
    pub enabled: bool,
    pub case_sensitive: bool,
    pub priority: i64,
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::timestamp")]
    pub updated_at: OffsetDateTime,
}

impl Rule {
    pub fn new(match_text: impl Into<String>, replacement: impl Into<String>, kind: RuleKind) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            match_text: match_text.into(),
            replacement: replacement.into(),
            kind,
            enabled: true,
            case_sensitive: false,
            priority: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn literal(match_text: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::new(match_text, replacement, RuleKind::Literal)
    }

    pub fn pattern(match_text: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::new(match_text, replacement, RuleKind::Pattern)
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Mark the rule as edited now.
    pub fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rule_defaults() {
        let rule = Rule::literal("secret", "[HIDDEN]");
        assert!(rule.enabled);
        assert!(!rule.case_sensitive);
        assert_eq!(rule.priority, 0);
        assert_eq!(rule.kind, RuleKind::Literal);
        assert!(!rule.id.is_empty());
    }

    #[test]
    fn test_serde_match_field_name() {
        let rule = Rule::pattern(r"\d{3}-\d{4}", "[PHONE]").with_priority(3);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["match"], r"\d{3}-\d{4}");
        assert_eq!(json["kind"], "pattern");

        let parsed: Rule = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.match_text, rule.match_text);
        assert_eq!(parsed.priority, 3);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("literal".parse::<RuleKind>().unwrap(), RuleKind::Literal);
        assert_eq!("pattern".parse::<RuleKind>().unwrap(), RuleKind::Pattern);
        assert!("regex".parse::<RuleKind>().is_err());
    }
}
