//! Built-in rule templates
//!
//! A small catalog of suggested pattern rules for common sensitive values.
//! These are never applied implicitly; the CLI and options UI offer them as
//! a starting point and the user seeds them into the store explicitly.

use lazy_static::lazy_static;

use crate::rule::{Rule, RuleKind};

#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub pattern: &'static str,
    pub placeholder: &'static str,
}

lazy_static! {
    static ref TEMPLATES: Vec<Template> = vec![
        Template {
            name: "email",
            pattern: r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
            placeholder: "[EMAIL]",
        },
        Template {
            name: "us-phone",
            pattern: r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}",
            placeholder: "[PHONE]",
        },
        Template {
            name: "ssn",
            pattern: r"\d{3}-\d{2}-\d{4}",
            placeholder: "[SSN]",
        },
        Template {
            name: "aws-access-key",
            pattern: r"AKIA[0-9A-Z]{16}",
            placeholder: "[AWS_KEY]",
        },
        Template {
            name: "api-key",
            pattern: r"sk-[a-zA-Z0-9]{20,}",
            placeholder: "[API_KEY]",
        },
        Template {
            name: "ipv4",
            pattern: r"\b(?:\d{1,3}\.){3}\d{1,3}\b",
            placeholder: "[IP]",
        },
    ];
}

pub fn templates() -> &'static [Template] {
    &TEMPLATES
}

/// Fresh rules from the catalog, priorities assigned in catalog order
/// starting at `base_priority`.
pub fn seed_rules(base_priority: i64) -> Vec<Rule> {
    TEMPLATES
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Rule::new(t.pattern, t.placeholder, RuleKind::Pattern)
                .with_priority(base_priority + i as i64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::redact;

    #[test]
    fn test_all_templates_compile() {
        for template in templates() {
            assert!(
                regex::Regex::new(template.pattern).is_ok(),
                "template {} must compile",
                template.name
            );
        }
    }

    #[test]
    fn test_seed_rules_are_pattern_kind_with_unique_priorities() {
        let rules = seed_rules(10);
        assert_eq!(rules.len(), templates().len());

        let mut priorities: Vec<i64> = rules.iter().map(|r| r.priority).collect();
        priorities.dedup();
        assert_eq!(priorities.len(), rules.len());
        assert!(rules.iter().all(|r| r.kind == RuleKind::Pattern && r.enabled));
    }

    #[test]
    fn test_seeded_email_rule_matches() {
        let rules = seed_rules(0);
        let result = redact("mail me at sam@example.com", &rules);
        assert_eq!(result.text, "mail me at [EMAIL]");
    }
}
