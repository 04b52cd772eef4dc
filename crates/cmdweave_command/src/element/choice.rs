//! Elements that pick from a set of named candidates: choices, pattern
//! matching, enums, and fixed literals.

use std::fmt;
use std::sync::Arc;

use cmdweave_foundation::{ArgumentParseError, Value};
use regex::{Regex, RegexBuilder};

use crate::args::CommandArgs;
use crate::context::CommandContext;
use crate::format::{PIPE, starts_with_ignore_case};
use crate::source::CommandSource;

/// Choice sets larger than this are shown as `<key>` in usage unless
/// explicitly requested.
pub const CHOICES_USAGE_CUTOFF: usize = 5;

/// Supplies candidate names and the value each one stands for.
pub trait ChoiceProvider: Send + Sync {
    /// Candidate names available to `source`.
    fn choices(&self, source: &dyn CommandSource) -> Vec<String>;

    /// The value for an exact candidate name.
    fn value(&self, choice: &str) -> Option<Value>;
}

/// A fixed list of named values.
#[derive(Clone, Debug, Default)]
pub struct StaticChoices {
    entries: Vec<(String, Value)>,
}

impl StaticChoices {
    /// Creates a choice list. Later duplicates of a name are ignored.
    #[must_use]
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut unique: Vec<(String, Value)> = Vec::new();
        for (key, value) in entries {
            let key = key.into();
            if !unique.iter().any(|(k, _)| *k == key) {
                unique.push((key, value.into()));
            }
        }
        Self { entries: unique }
    }
}

impl ChoiceProvider for StaticChoices {
    fn choices(&self, _source: &dyn CommandSource) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    fn value(&self, choice: &str) -> Option<Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == choice)
            .map(|(_, v)| v.clone())
    }
}

type ChoicesFn = dyn Fn(&dyn CommandSource) -> Vec<String> + Send + Sync;
type ValueFn = dyn Fn(&str) -> Option<Value> + Send + Sync;

/// Candidates computed on every call.
#[derive(Clone)]
pub struct DynamicChoices {
    choices: Arc<ChoicesFn>,
    value: Arc<ValueFn>,
}

impl DynamicChoices {
    /// Creates a provider from a name supplier and a value lookup.
    pub fn new(
        choices: impl Fn(&dyn CommandSource) -> Vec<String> + Send + Sync + 'static,
        value: impl Fn(&str) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            choices: Arc::new(choices),
            value: Arc::new(value),
        }
    }
}

impl ChoiceProvider for DynamicChoices {
    fn choices(&self, source: &dyn CommandSource) -> Vec<String> {
        (self.choices)(source)
    }

    fn value(&self, choice: &str) -> Option<Value> {
        (self.value)(choice)
    }
}

impl fmt::Debug for DynamicChoices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DynamicChoices(..)")
    }
}

/// An enum whose variants can be picked by name.
pub trait EnumValue: Clone + Send + Sync + 'static {
    /// Every variant, in declaration order.
    fn variants() -> &'static [Self];

    /// The variant's name. Matched case-insensitively.
    fn name(&self) -> &str;
}

/// Picks exactly one candidate by name.
#[derive(Clone)]
pub struct ChoicesElement {
    pub(crate) key: String,
    provider: Arc<dyn ChoiceProvider>,
    case_sensitive: bool,
    in_usage: Option<bool>,
}

impl ChoicesElement {
    /// Creates a choice element.
    #[must_use]
    pub fn new(key: impl Into<String>, provider: Arc<dyn ChoiceProvider>, case_sensitive: bool) -> Self {
        Self {
            key: key.into(),
            provider,
            case_sensitive,
            in_usage: None,
        }
    }

    /// Forces the candidates to be listed in usage, or hidden.
    #[must_use]
    pub fn with_choices_in_usage(mut self, show: bool) -> Self {
        self.in_usage = Some(show);
        self
    }

    fn lookup(&self, source: &dyn CommandSource, choice: &str) -> Option<Value> {
        if self.case_sensitive {
            return self.provider.value(choice);
        }
        let lowered = choice.to_lowercase();
        self.provider
            .choices(source)
            .into_iter()
            .find(|c| c.to_lowercase() == lowered)
            .and_then(|c| self.provider.value(&c))
    }

    pub(crate) fn parse(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Result<(), ArgumentParseError> {
        let choice = args.next()?;
        match self.lookup(source, &choice) {
            Some(value) => {
                context.put_arg(self.key.clone(), value);
                Ok(())
            }
            None => Err(args.create_error(format!(
                "Argument was not a valid choice. Valid choices: [{}]",
                self.provider.choices(source).join(", ")
            ))),
        }
    }

    pub(crate) fn complete(&self, source: &dyn CommandSource, args: &mut CommandArgs) -> Vec<String> {
        let prefix = args.next_if_present().unwrap_or_default();
        self.provider
            .choices(source)
            .into_iter()
            .filter(|c| starts_with_ignore_case(c, &prefix))
            .collect()
    }

    pub(crate) fn usage(&self, source: &dyn CommandSource) -> String {
        let choices = self.provider.choices(source);
        if self.in_usage.unwrap_or(choices.len() <= CHOICES_USAGE_CUTOFF) {
            format!("<{}>", choices.join(PIPE))
        } else {
            format!("<{}>", self.key)
        }
    }
}

impl fmt::Debug for ChoicesElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChoicesElement")
            .field("key", &self.key)
            .field("case_sensitive", &self.case_sensitive)
            .finish_non_exhaustive()
    }
}

/// Matches a token against candidate names by prefix or regex, inserting a
/// value for every match.
#[derive(Clone)]
pub struct PatternMatchElement {
    pub(crate) key: String,
    provider: Arc<dyn ChoiceProvider>,
    use_regex: bool,
}

enum Matcher {
    Prefix(String),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Prefix(prefix) => starts_with_ignore_case(candidate, prefix),
            Self::Pattern(regex) => regex.is_match(candidate),
        }
    }
}

impl PatternMatchElement {
    /// Creates a pattern element. With `use_regex`, the token is read as a
    /// case-insensitive regex anchored at the start of each candidate;
    /// otherwise as a case-insensitive prefix.
    #[must_use]
    pub fn new(key: impl Into<String>, provider: Arc<dyn ChoiceProvider>, use_regex: bool) -> Self {
        Self {
            key: key.into(),
            provider,
            use_regex,
        }
    }

    fn matcher(&self, pattern: &str) -> Option<Matcher> {
        if self.use_regex {
            RegexBuilder::new(&format!("^(?:{pattern})"))
                .case_insensitive(true)
                .build()
                .ok()
                .map(Matcher::Pattern)
        } else {
            Some(Matcher::Prefix(pattern.to_string()))
        }
    }

    pub(crate) fn parse(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Result<(), ArgumentParseError> {
        let pattern = args.next()?;
        let choices = self.provider.choices(source);

        let lowered = pattern.to_lowercase();
        if let Some(value) = choices
            .iter()
            .find(|c| c.to_lowercase() == lowered)
            .and_then(|c| self.provider.value(c))
        {
            context.put_arg(self.key.clone(), value);
            return Ok(());
        }

        let matcher = self
            .matcher(&pattern)
            .ok_or_else(|| args.create_error(format!("Invalid pattern '{pattern}'")))?;
        let values: Vec<Value> = choices
            .iter()
            .filter(|c| matcher.matches(c))
            .filter_map(|c| self.provider.value(c))
            .collect();
        if values.is_empty() {
            return Err(args.create_error(format!(
                "No values matching pattern '{pattern}' present for {}!",
                self.key
            )));
        }
        for value in values {
            context.put_arg(self.key.clone(), value);
        }
        Ok(())
    }

    pub(crate) fn complete(&self, source: &dyn CommandSource, args: &mut CommandArgs) -> Vec<String> {
        let choices = self.provider.choices(source);
        match args.next_if_present() {
            None => choices,
            Some(pattern) => match self.matcher(&pattern) {
                Some(matcher) => choices.into_iter().filter(|c| matcher.matches(c)).collect(),
                None => Vec::new(),
            },
        }
    }
}

impl fmt::Debug for PatternMatchElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternMatchElement")
            .field("key", &self.key)
            .field("use_regex", &self.use_regex)
            .finish_non_exhaustive()
    }
}

/// A fixed phrase, matched token by token ignoring case.
#[derive(Clone, Debug)]
pub struct LiteralElement {
    pub(crate) key: Option<String>,
    expected: Vec<String>,
    value: Value,
}

impl LiteralElement {
    /// Creates a literal storing `value` under `key` when it matches.
    #[must_use]
    pub fn new(key: Option<String>, value: Value, expected: Vec<String>) -> Self {
        Self { key, expected, value }
    }

    pub(crate) fn parse(
        &self,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Result<(), ArgumentParseError> {
        for expected in &self.expected {
            let current = args.next()?;
            if current.to_lowercase() != expected.to_lowercase() {
                return Err(args.create_error(format!(
                    "Argument {current} did not match expected next argument {expected}"
                )));
            }
        }
        if let Some(key) = &self.key {
            context.put_arg(key.clone(), self.value.clone());
        }
        Ok(())
    }

    pub(crate) fn complete(&self, args: &mut CommandArgs) -> Vec<String> {
        for expected in &self.expected {
            let Some(next) = args.next_if_present() else {
                break;
            };
            if args.has_next() {
                if next.to_lowercase() != expected.to_lowercase() {
                    break;
                }
            } else if starts_with_ignore_case(expected, &next) {
                return vec![expected.clone()];
            }
        }
        Vec::new()
    }

    pub(crate) fn usage(&self) -> String {
        self.expected.join(" ")
    }
}
