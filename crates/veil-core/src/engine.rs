//! Forward and reverse text rewriting
//!
//! `redact` applies the rule set in deterministic order: literal rules
//! before pattern rules, ascending priority within a kind, each as a global
//! replace-all over the text produced so far. `unredact` is the best-effort
//! inverse: pattern rules before literal rules, descending priority, with
//! every replacement searched for verbatim. When replacement strings of
//! different rules overlap, the reverse order is a heuristic, not a
//! correctness guarantee.

use std::cmp::Reverse;

use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::rule::{Rule, RuleKind};

/// A rule compiled into an executable matcher.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub id: String,
    pub kind: RuleKind,
    pub priority: i64,
    pub replacement: String,
    matcher: Regex,
}

impl CompiledRule {
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }
}

/// Outcome of a single redact pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteResult {
    pub text: String,
    /// Ids of rules that changed the text, in application order.
    pub applied: Vec<String>,
}

impl RewriteResult {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            applied: Vec::new(),
        }
    }

    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Compile a rule into a matcher.
///
/// A pattern rule whose source fails to compile degrades to matching its
/// source text literally; compilation never returns an error.
pub fn compile(rule: &Rule) -> CompiledRule {
    let build = |source: &str| {
        RegexBuilder::new(source)
            .case_insensitive(!rule.case_sensitive)
            .build()
    };

    let matcher = match rule.kind {
        RuleKind::Literal => build(&regex::escape(&rule.match_text)),
        RuleKind::Pattern => build(&rule.match_text).or_else(|err| {
            warn!(rule_id = %rule.id, error = %err, "invalid pattern, matching literally");
            build(&regex::escape(&rule.match_text))
        }),
    }
    .expect("escaped literal always compiles");

    CompiledRule {
        id: rule.id.clone(),
        kind: rule.kind,
        priority: rule.priority,
        replacement: rule.replacement.clone(),
        matcher,
    }
}

/// Replace every match of every enabled rule, original → placeholder.
pub fn redact(text: &str, rules: &[Rule]) -> RewriteResult {
    if text.is_empty() || rules.is_empty() {
        return RewriteResult::unchanged(text);
    }

    let mut compiled: Vec<CompiledRule> = rules
        .iter()
        .filter(|r| r.enabled && !r.match_text.is_empty())
        .map(compile)
        .collect();
    compiled.sort_by_key(|r| (Reverse(r.kind.rank()), r.priority));

    let mut current = text.to_string();
    let mut applied = Vec::new();
    for rule in &compiled {
        // NoExpand: the replacement is inserted verbatim, `$` and friends
        // carry no capture-group meaning.
        let next = rule.matcher.replace_all(&current, NoExpand(&rule.replacement));
        if next != current {
            current = next.into_owned();
            applied.push(rule.id.clone());
        }
    }

    RewriteResult {
        text: current,
        applied,
    }
}

/// Replace every occurrence of each enabled rule's replacement with its
/// match text, placeholder → original.
///
/// Replacements are searched for verbatim; a pattern rule's match source is
/// re-inserted as written since the matched text cannot be reconstructed.
pub fn unredact(text: &str, rules: &[Rule]) -> String {
    if text.is_empty() || rules.is_empty() {
        return text.to_string();
    }

    // An empty replacement was never inserted and cannot be searched for.
    let mut ordered: Vec<&Rule> = rules
        .iter()
        .filter(|r| r.enabled && !r.replacement.is_empty())
        .collect();
    ordered.sort_by_key(|r| (r.kind.rank(), Reverse(r.priority)));

    let mut current = text.to_string();
    for rule in ordered {
        if current.contains(&rule.replacement) {
            current = current.replace(&rule.replacement, &rule.match_text);
        }
    }
    current
}
