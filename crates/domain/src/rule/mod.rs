//! Rule — trigger → condition → action automation.
//!
//! Rules are written as short text atoms in the configuration and compiled
//! once into an AST. An atom that does not parse is reported and replaced by
//! a no-op (or a guard that never holds), so the rest of the rule set keeps
//! working.

mod action;
mod condition;
mod trigger;

pub use action::{Action, Command};
pub use condition::Condition;
pub use trigger::{TriggerEvent, TriggerKey};

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// A string atom or a (possibly nested) list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expr {
    One(String),
    Many(Vec<Expr>),
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl<T: Into<Expr>> From<Vec<T>> for Expr {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values.into_iter().map(Into::into).collect())
    }
}

/// A rule as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub when: Expr,
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<Expr>,
    #[serde(default, rename = "else", skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Expr>,
}

/// A compiled rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub when: Vec<TriggerKey>,
    pub condition: Condition,
    pub then: Action,
    pub otherwise: Action,
}

impl Rule {
    /// Compile one configuration entry, collecting every malformed atom.
    #[must_use]
    pub fn compile(config: &RuleConfig, errors: &mut Vec<RuleError>) -> Self {
        let mut when = Vec::new();
        compile_triggers(&config.when, &mut when, errors);
        Self {
            when,
            condition: config
                .condition
                .as_ref()
                .map_or(Condition::Always, |expr| compile_condition(expr, errors)),
            then: compile_action(config.then.as_ref(), errors),
            otherwise: compile_action(config.otherwise.as_ref(), errors),
        }
    }

    #[must_use]
    pub fn matches(&self, key: &TriggerKey) -> bool {
        self.when.contains(key)
    }

    /// The branch to run for a given guard outcome.
    #[must_use]
    pub fn branch(&self, holds: bool) -> &Action {
        if holds { &self.then } else { &self.otherwise }
    }
}

fn compile_triggers(expr: &Expr, into: &mut Vec<TriggerKey>, errors: &mut Vec<RuleError>) {
    match expr {
        Expr::One(text) => match text.parse() {
            Ok(key) => into.push(key),
            Err(err) => errors.push(err),
        },
        Expr::Many(items) => {
            for item in items {
                compile_triggers(item, into, errors);
            }
        }
    }
}

fn compile_condition(expr: &Expr, errors: &mut Vec<RuleError>) -> Condition {
    match expr {
        Expr::One(text) => text.parse().unwrap_or_else(|err| {
            errors.push(err);
            Condition::Never
        }),
        Expr::Many(items) => Condition::Any(
            items
                .iter()
                .map(|item| compile_condition(item, errors))
                .collect(),
        ),
    }
}

fn compile_action(expr: Option<&Expr>, errors: &mut Vec<RuleError>) -> Action {
    match expr {
        None => Action::Noop,
        Some(Expr::One(text)) => text.parse().map_or_else(
            |err| {
                errors.push(err);
                Action::Noop
            },
            Action::Command,
        ),
        Some(Expr::Many(items)) => Action::Sequence(
            items
                .iter()
                .map(|item| compile_action(Some(item), errors))
                .collect(),
        ),
    }
}

/// The compiled rule set, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile every entry. Malformed atoms are returned alongside the set
    /// instead of failing it.
    #[must_use]
    pub fn compile(configs: &[RuleConfig]) -> (Self, Vec<RuleError>) {
        let mut errors = Vec::new();
        let rules = configs
            .iter()
            .map(|config| Rule::compile(config, &mut errors))
            .collect();
        (Self { rules }, errors)
    }

    /// Rules listening for `key`, in configuration order.
    pub fn matching<'a>(&'a self, key: &TriggerKey) -> impl Iterator<Item = &'a Rule> + use<'a> {
        let key = key.clone();
        self.rules.iter().filter(move |rule| rule.matches(&key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::Alias;
    use crate::gesture::Gesture;

    const RULES: &str = r#"
[[rules]]
when = "click switch1"
if = ["off light1"]
then = ["on light1", "ifft lights_on"]
else = "off light1"

[[rules]]
when = ["longclick switch1", "doubleclick switch1"]
then = "switch hall"
"#;

    #[derive(Deserialize)]
    struct File {
        rules: Vec<RuleConfig>,
    }

    fn parse(text: &str) -> Vec<RuleConfig> {
        toml::from_str::<File>(text).unwrap().rules
    }

    fn key(text: &str) -> TriggerKey {
        text.parse().unwrap()
    }

    #[test]
    fn should_deserialize_rules_from_toml() {
        let rules = parse(RULES);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].when, Expr::from("click switch1"));
        assert_eq!(rules[0].condition, Some(Expr::from(vec!["off light1"])));
        assert_eq!(rules[1].otherwise, None);
    }

    #[test]
    fn should_compile_rules_without_errors() {
        let (set, errors) = RuleSet::compile(&parse(RULES));
        assert!(errors.is_empty());
        assert_eq!(set.len(), 2);

        let rule = set.matching(&key("click switch1")).next().unwrap();
        assert_eq!(
            rule.condition,
            Condition::Any(vec![Condition::State {
                alias: Alias::new("light1").unwrap(),
                on: false,
            }])
        );
        assert!(matches!(rule.branch(true), Action::Sequence(items) if items.len() == 2));
        assert!(matches!(rule.branch(false), Action::Command(Command::Off { .. })));
    }

    #[test]
    fn should_match_any_listed_trigger() {
        let (set, _) = RuleSet::compile(&parse(RULES));
        let longclick = TriggerKey::new(Gesture::LongClick, Alias::new("switch1").unwrap());
        assert_eq!(set.matching(&longclick).count(), 1);
        assert_eq!(set.matching(&key("singleclick switch1")).count(), 0);
    }

    #[test]
    fn should_default_missing_branches() {
        let config = RuleConfig {
            when: "click a".into(),
            condition: None,
            then: None,
            otherwise: None,
        };
        let mut errors = Vec::new();
        let rule = Rule::compile(&config, &mut errors);
        assert_eq!(rule.condition, Condition::Always);
        assert_eq!(rule.then, Action::Noop);
        assert_eq!(rule.otherwise, Action::Noop);
    }

    #[test]
    fn should_compile_malformed_atoms_to_noops() {
        let config = RuleConfig {
            when: vec!["click a", "squeeze a"].into(),
            condition: Some(vec!["dim b", "on b"].into()),
            then: Some(vec!["on b", "set b lots", "off c"].into()),
            otherwise: None,
        };
        let (set, errors) = RuleSet::compile(&[config]);
        assert_eq!(errors.len(), 3);

        let rule = set.matching(&key("click a")).next().unwrap();
        assert_eq!(rule.when.len(), 1);
        let Condition::Any(tests) = &rule.condition else {
            panic!("expected a list");
        };
        assert_eq!(tests[0], Condition::Never);
        let Action::Sequence(actions) = &rule.then else {
            panic!("expected a sequence");
        };
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[1], Action::Noop);
    }

    #[test]
    fn should_flatten_nested_trigger_lists() {
        let config = RuleConfig {
            when: Expr::Many(vec![
                "click a".into(),
                Expr::Many(vec!["click b".into()]),
            ]),
            condition: None,
            then: None,
            otherwise: None,
        };
        let (set, _) = RuleSet::compile(&[config]);
        assert_eq!(set.matching(&key("click b")).count(), 1);
    }
}
