//! Conditional execution rules
//!
//! Models the [rules](https://docs.gitlab.com/ee/ci/yaml/#rules) keyword,
//! which includes or excludes jobs in pipelines.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::types::{Render, impl_render_traits};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Timing policy of a rule, see [when](https://docs.gitlab.com/ee/ci/yaml/#when)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum When {
    /// Run regardless of the status of earlier stages
    Always,
    /// Run after a delay
    Delayed,
    /// Run only when triggered manually
    Manual,
    /// Do not run
    Never,
    /// Run only when an earlier stage failed
    OnFailure,
    /// Run only when all earlier stages succeeded
    #[default]
    OnSuccess,
}

impl When {
    /// Keyword value as written in `.gitlab-ci.yml`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Delayed => "delayed",
            Self::Manual => "manual",
            Self::Never => "never",
            Self::OnFailure => "on_failure",
            Self::OnSuccess => "on_success",
        }
    }
}

impl fmt::Display for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule deciding whether a job runs
#[derive(Debug, Clone, Default)]
pub struct Rule {
    if_statement: Option<String>,
    when: When,
    allow_failure: bool,
    changes: Option<Vec<String>>,
    exists: Option<Vec<String>>,
    variables: BTreeMap<String, String>,
}

impl Rule {
    /// Creates a rule that runs on success and does not allow failure
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule builder
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Returns a copy of this rule with `when` set to [`When::Never`].
    ///
    /// Keep one rule describing when a job should run and derive its
    /// negation at the point of use:
    ///
    /// ```
    /// use nay::pipeline::{Render, Rule};
    ///
    /// let on_main = Rule::builder()
    ///     .if_statement("$CI_COMMIT_BRANCH == \"main\"")
    ///     .build();
    /// let not_on_main = on_main.never();
    ///
    /// assert_eq!(not_on_main.render()["when"], "never");
    /// assert_eq!(on_main.render()["when"], "on_success");
    /// ```
    pub fn never(&self) -> Self {
        Self {
            when: When::Never,
            ..self.clone()
        }
    }

    /// Adds variables to this rule in place and returns it for chaining.
    ///
    /// Unlike [`Rule::never`] this mutates the receiver. Keys already present
    /// are overwritten.
    pub fn add_variables<I, K, V>(&mut self, variables: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in variables {
            let key = key.into();
            tracing::trace!(key = %key, "Adding rule variable");
            self.variables.insert(key, value.into());
        }
        self
    }

    /// Condition expression
    pub fn if_statement(&self) -> Option<&str> {
        self.if_statement.as_deref()
    }

    /// Timing policy
    pub fn when(&self) -> When {
        self.when
    }

    /// Whether the job may fail without failing the pipeline
    pub fn allow_failure(&self) -> bool {
        self.allow_failure
    }

    /// File globs whose modification triggers the rule
    pub fn changes(&self) -> Option<&[String]> {
        self.changes.as_deref()
    }

    /// File globs whose existence triggers the rule
    pub fn exists(&self) -> Option<&[String]> {
        self.exists.as_deref()
    }

    /// Variables set for the job when the rule matches
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }
}

fn sequence(values: &[String]) -> Value {
    Value::Sequence(values.iter().cloned().map(Value::from).collect())
}

impl Render for Rule {
    fn render(&self) -> Mapping {
        let mut rendered = Mapping::new();

        if let Some(if_statement) = self.if_statement.as_deref().filter(|s| !s.is_empty()) {
            rendered.insert(Value::from("if"), Value::from(if_statement));
        }

        rendered.insert(Value::from("when"), Value::from(self.when.as_str()));
        rendered.insert(Value::from("allow_failure"), Value::from(self.allow_failure));

        if let Some(changes) = self.changes.as_deref().filter(|c| !c.is_empty()) {
            rendered.insert(Value::from("changes"), sequence(changes));
        }

        if let Some(exists) = self.exists.as_deref().filter(|e| !e.is_empty()) {
            rendered.insert(Value::from("exists"), sequence(exists));
        }

        if !self.variables.is_empty() {
            let variables = self
                .variables
                .iter()
                .map(|(k, v)| (Value::from(k.as_str()), Value::from(v.as_str())))
                .collect();
            rendered.insert(Value::from("variables"), Value::Mapping(variables));
        }

        rendered
    }
}

impl_render_traits!(Rule);

/// Builder for creating rules
#[derive(Debug, Clone, Default)]
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleBuilder {
    /// Sets the condition expression
    pub fn if_statement(mut self, if_statement: impl Into<String>) -> Self {
        self.rule.if_statement = Some(if_statement.into());
        self
    }

    /// Sets the timing policy
    pub fn when(mut self, when: When) -> Self {
        self.rule.when = when;
        self
    }

    /// Sets whether the job may fail
    pub fn allow_failure(mut self, allow_failure: bool) -> Self {
        self.rule.allow_failure = allow_failure;
        self
    }

    /// Sets the file globs checked for changes
    pub fn changes<I, S>(mut self, changes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule.changes = Some(changes.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the file globs checked for existence
    pub fn exists<I, S>(mut self, exists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule.exists = Some(exists.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the variables of the rule
    pub fn variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.rule.variables = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Builds the rule
    pub fn build(self) -> Rule {
        self.rule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn klocwork_rule() -> Rule {
        Rule::builder()
            .if_statement("KLOCWORK_ISSUES > 5")
            .when(When::OnFailure)
            .allow_failure(true)
            .variables([("KLOCWORK_ISSUES", "10"), ("KLOCWORK_SEVERITY", "high")])
            .build()
    }

    fn mapping(pairs: &[(&str, Value)]) -> Mapping {
        pairs
            .iter()
            .map(|(k, v)| (Value::from(*k), v.clone()))
            .collect()
    }

    #[rstest]
    #[case(When::Always, "always")]
    #[case(When::Delayed, "delayed")]
    #[case(When::Manual, "manual")]
    #[case(When::Never, "never")]
    #[case(When::OnFailure, "on_failure")]
    #[case(When::OnSuccess, "on_success")]
    fn test_when_values(#[case] when: When, #[case] expected: &str) {
        assert_eq!(when.as_str(), expected);
        assert_eq!(when.to_string(), expected);
        assert_eq!(serde_json::to_value(when).unwrap(), expected);
        let parsed: When = serde_yaml::from_str(expected).unwrap();
        assert_eq!(parsed, when);
    }

    #[test]
    fn test_default_rule() {
        let rule = Rule::new();
        assert_eq!(rule.when(), When::OnSuccess);
        assert!(!rule.allow_failure());
        assert_eq!(rule.if_statement(), None);
        assert!(rule.variables().is_empty());
        assert_eq!(
            rule.render(),
            mapping(&[("when", "on_success".into()), ("allow_failure", false.into())])
        );
    }

    #[test]
    fn test_never() {
        let rule = klocwork_rule();
        let negated = rule.never();
        assert_eq!(negated.when(), When::Never);
        assert_eq!(negated.if_statement(), Some("KLOCWORK_ISSUES > 5"));
        assert_eq!(rule.when(), When::OnFailure);
    }

    #[test]
    fn test_never_copy_is_independent() {
        let rule = klocwork_rule();
        let mut negated = rule.never();
        negated.add_variables([("KLOCWORK_ISSUES", "0")]);

        assert_eq!(negated.variables()["KLOCWORK_ISSUES"], "0");
        assert_eq!(rule.variables()["KLOCWORK_ISSUES"], "10");
    }

    #[test]
    fn test_add_variables() {
        let mut rule = Rule::new();
        rule.add_variables([("KLOCWORK_ISSUES", "10"), ("KLOCWORK_SEVERITY", "high")]);
        assert_eq!(
            rule.variables(),
            &BTreeMap::from([
                ("KLOCWORK_ISSUES".to_string(), "10".to_string()),
                ("KLOCWORK_SEVERITY".to_string(), "high".to_string()),
            ])
        );
    }

    #[test]
    fn test_add_variables_overwrites_and_chains() {
        let mut rule = Rule::new();
        rule.add_variables([("STAGE", "test"), ("DEPLOY", "false")])
            .add_variables([("DEPLOY", "true")]);

        assert_eq!(rule.variables().len(), 2);
        assert_eq!(rule.variables()["DEPLOY"], "true");
        assert_eq!(rule.variables()["STAGE"], "test");
    }

    #[test]
    fn test_equals() {
        assert!(klocwork_rule().equals(Some(&klocwork_rule())));
        assert_eq!(klocwork_rule(), klocwork_rule());
    }

    #[test]
    fn test_not_equals() {
        let other = Rule::builder()
            .if_statement("KLOCWORK_ISSUES > 3")
            .when(When::OnFailure)
            .allow_failure(true)
            .variables([("KLOCWORK_ISSUES", "5"), ("KLOCWORK_SEVERITY", "medium")])
            .build();
        assert!(!klocwork_rule().equals(Some(&other)));
        assert!(!klocwork_rule().equals(None));
    }

    #[test]
    fn test_allow_failure_changes_equality() {
        let lenient = Rule::builder().allow_failure(true).build();
        let strict = Rule::builder().allow_failure(false).build();
        assert_ne!(lenient, strict);
    }

    #[test]
    fn test_render_klocwork_rule() {
        let expected = mapping(&[
            ("if", "KLOCWORK_ISSUES > 5".into()),
            ("when", "on_failure".into()),
            ("allow_failure", true.into()),
            (
                "variables",
                Value::Mapping(mapping(&[
                    ("KLOCWORK_ISSUES", "10".into()),
                    ("KLOCWORK_SEVERITY", "high".into()),
                ])),
            ),
        ]);
        assert_eq!(klocwork_rule().render(), expected);
    }

    #[test]
    fn test_render_changes_and_exists() {
        let rule = Rule::builder()
            .changes(["src/**/*.rs", "Cargo.toml"])
            .exists(["Dockerfile"])
            .build();
        assert_eq!(
            rule.render(),
            mapping(&[
                ("when", "on_success".into()),
                ("allow_failure", false.into()),
                (
                    "changes",
                    Value::Sequence(vec!["src/**/*.rs".into(), "Cargo.toml".into()])
                ),
                ("exists", Value::Sequence(vec!["Dockerfile".into()])),
            ])
        );
    }

    #[test]
    fn test_render_skips_empty_fields() {
        let rule = Rule::builder()
            .if_statement("")
            .changes(Vec::<String>::new())
            .exists(Vec::<String>::new())
            .build();
        assert_eq!(rule.render(), Rule::new().render());
    }

    #[test]
    fn test_render_is_stable() {
        let mut rule = Rule::new();
        rule.add_variables([("ZETA", "1"), ("ALPHA", "2")]);
        let first = serde_yaml::to_string(&rule).unwrap();
        let second = serde_yaml::to_string(&rule).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            "when: on_success\nallow_failure: false\nvariables:\n  ALPHA: '2'\n  ZETA: '1'\n"
        );
    }
}
