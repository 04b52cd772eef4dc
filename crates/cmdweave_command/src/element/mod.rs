//! The element algebra: composable grammar nodes.
//!
//! An [`Element`] can
//! - [`parse`](Element::parse) tokens from a [`CommandArgs`] into a
//!   [`CommandContext`], failing with a positioned error;
//! - [`complete`](Element::complete) the current position, which never fails
//!   and explores the same grammar the parser would;
//! - render its [`usage`](Element::usage).
//!
//! Speculative attempts capture a snapshot of the cursor and the context
//! and restore both when the attempt fails, so every combinator returns an
//! explicit `Result` instead of unwinding.
//!
//! # Example
//!
//! ```
//! use cmdweave_command::{BufferedSource, CommandArgs, CommandContext, Element, InputTokenizer};
//!
//! let grammar = Element::seq([
//!     Element::string("name"),
//!     Element::optional_with(Element::integer("count"), 1),
//! ]);
//! let input = "widget";
//! let tokens = InputTokenizer::default().tokenize(input, false).unwrap();
//! let mut args = CommandArgs::new(input, tokens);
//! let mut context = CommandContext::new();
//! grammar.parse(&BufferedSource::new("doc"), &mut args, &mut context).unwrap();
//! assert_eq!(context.get_one("count").and_then(|v| v.as_int()), Some(1));
//! ```

mod choice;
mod duration;
mod leaf;
mod suggest;

use std::sync::Arc;

use cmdweave_foundation::{ArgumentParseError, Value};

pub use choice::{
    CHOICES_USAGE_CUTOFF, ChoiceProvider, ChoicesElement, DynamicChoices, EnumValue, LiteralElement,
    PatternMatchElement, StaticChoices,
};
pub use duration::parse_duration;
pub use leaf::{LeafElement, LeafKind};
pub use suggest::{ConstrainedSuggestions, WithSuggestions};

use crate::args::CommandArgs;
use crate::child::ChildCommands;
use crate::context::CommandContext;
use crate::flags::CommandFlags;
use crate::format::{PIPE, extend_unique};
use crate::source::CommandSource;

/// Tokens accepted by [`Element::bool`] as true.
pub const TRUE_CHOICES: [&str; 6] = ["true", "t", "y", "yes", "verymuchso", "1"];
/// Tokens accepted by [`Element::bool`] as false.
pub const FALSE_CHOICES: [&str; 6] = ["false", "f", "n", "no", "notatall", "0"];

/// One node of the argument grammar.
///
/// Elements are immutable once built and can be shared across threads and
/// invocations.
#[derive(Clone, Debug)]
pub enum Element {
    /// Each element in order.
    Sequence(Vec<Element>),
    /// The first element that parses.
    FirstParsing(Vec<Element>),
    /// An element that may be absent.
    Optional(OptionalElement),
    /// An element parsed exactly `times` times.
    Repeated {
        /// The repeated element.
        element: Box<Element>,
        /// How many times it must parse.
        times: usize,
    },
    /// An element parsed until the tokens run out.
    AllOf(Box<Element>),
    /// An element whose key may end up with at most one value.
    OnlyOne(Box<Element>),
    /// One named candidate.
    Choices(ChoicesElement),
    /// Every candidate matching a prefix or pattern.
    PatternMatch(PatternMatchElement),
    /// A fixed phrase.
    Literal(LiteralElement),
    /// A typed value.
    Leaf(LeafElement),
    /// Prefix flags around a child element.
    Flags(Arc<CommandFlags>),
    /// Overridden completions.
    WithSuggestions(WithSuggestions),
    /// Filtered completions.
    ConstrainedSuggestions(ConstrainedSuggestions),
    /// A nested dispatcher of subcommands.
    Child(Arc<ChildCommands>),
}

/// An element that may be absent, with an optional default.
#[derive(Clone, Debug)]
pub struct OptionalElement {
    element: Box<Element>,
    default: Option<Value>,
    weak: bool,
}

impl OptionalElement {
    fn put_default(&self, context: &mut CommandContext) {
        if let (Some(key), Some(default)) = (self.element.key(), &self.default) {
            context.put_arg(key.to_string(), default.clone());
        }
    }

    fn parse(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Result<(), ArgumentParseError> {
        if !args.has_next() {
            self.put_default(context);
            return Ok(());
        }
        let args_state = args.snapshot();
        let context_state = context.snapshot();
        match self.element.parse(source, args, context) {
            Ok(()) => Ok(()),
            Err(_) if self.weak || args.has_next() => {
                args.apply_snapshot(&args_state, true);
                context.apply_snapshot(&context_state);
                self.put_default(context);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

impl Element {
    // -------------------------------------------------------------------------
    // Combinators
    // -------------------------------------------------------------------------

    /// An element that consumes nothing and stores nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::Sequence(Vec::new())
    }

    /// Parses each element in order.
    #[must_use]
    pub fn seq(elements: impl IntoIterator<Item = Element>) -> Self {
        Self::Sequence(elements.into_iter().collect())
    }

    /// Tries each element on a fresh snapshot and keeps the first that parses.
    #[must_use]
    pub fn first_parsing(elements: impl IntoIterator<Item = Element>) -> Self {
        Self::FirstParsing(elements.into_iter().collect())
    }

    /// Makes `element` optional.
    ///
    /// A failed parse is treated as absence only when more tokens follow.
    #[must_use]
    pub fn optional(element: Element) -> Self {
        Self::make_optional(element, None, false)
    }

    /// Makes `element` optional, storing `default` when absent.
    #[must_use]
    pub fn optional_with(element: Element, default: impl Into<Value>) -> Self {
        Self::make_optional(element, Some(default.into()), false)
    }

    /// Makes `element` optional; any failed parse counts as absence.
    #[must_use]
    pub fn optional_weak(element: Element) -> Self {
        Self::make_optional(element, None, true)
    }

    /// Like [`optional_weak`](Self::optional_weak), storing `default` when absent.
    #[must_use]
    pub fn optional_weak_with(element: Element, default: impl Into<Value>) -> Self {
        Self::make_optional(element, Some(default.into()), true)
    }

    fn make_optional(element: Element, default: Option<Value>, weak: bool) -> Self {
        Self::Optional(OptionalElement {
            element: Box::new(element),
            default,
            weak,
        })
    }

    /// Parses `element` exactly `times` times.
    #[must_use]
    pub fn repeated(element: Element, times: usize) -> Self {
        Self::Repeated {
            element: Box::new(element),
            times,
        }
    }

    /// Parses `element` until no tokens remain.
    #[must_use]
    pub fn all_of(element: Element) -> Self {
        Self::AllOf(Box::new(element))
    }

    /// Fails if `element` leaves more than one value under its key.
    #[must_use]
    pub fn only_one(element: Element) -> Self {
        Self::OnlyOne(Box::new(element))
    }

    // -------------------------------------------------------------------------
    // Leaves
    // -------------------------------------------------------------------------

    fn leaf(key: impl Into<String>, kind: LeafKind) -> Self {
        Self::Leaf(LeafElement::new(key, kind))
    }

    /// Consumes nothing and stores `true`.
    #[must_use]
    pub fn mark_true(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::MarkTrue)
    }

    /// One token, as a string.
    #[must_use]
    pub fn string(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::String)
    }

    /// A 32-bit integer.
    #[must_use]
    pub fn integer(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::Integer)
    }

    /// A 64-bit integer.
    #[must_use]
    pub fn long_num(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::Long)
    }

    /// A floating point number.
    #[must_use]
    pub fn double_num(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::Double)
    }

    /// An arbitrary-precision integer.
    #[must_use]
    pub fn big_integer(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::BigInteger)
    }

    /// An arbitrary-precision decimal.
    #[must_use]
    pub fn big_decimal(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::BigDecimal)
    }

    /// A UUID.
    #[must_use]
    pub fn uuid(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::Uuid)
    }

    /// An absolute URL.
    #[must_use]
    pub fn url(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::Url)
    }

    /// An IP address literal.
    #[must_use]
    pub fn ip(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::Ip)
    }

    /// A date-time, time, or date.
    #[must_use]
    pub fn date_time(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::DateTime { or_now: false })
    }

    /// A date-time that falls back to the current time.
    #[must_use]
    pub fn date_time_or_now(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::DateTime { or_now: true })
    }

    /// A duration.
    #[must_use]
    pub fn duration(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::Duration)
    }

    /// Every remaining token, joined with single spaces.
    #[must_use]
    pub fn remaining_joined_strings(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::RemainingJoined { raw: false })
    }

    /// The raw input from the next token onward.
    #[must_use]
    pub fn remaining_raw_joined_strings(key: impl Into<String>) -> Self {
        Self::leaf(key, LeafKind::RemainingJoined { raw: true })
    }

    // -------------------------------------------------------------------------
    // Choices
    // -------------------------------------------------------------------------

    /// A boolean written as one of [`TRUE_CHOICES`] or [`FALSE_CHOICES`].
    #[must_use]
    pub fn bool(key: impl Into<String>) -> Self {
        let entries = TRUE_CHOICES
            .iter()
            .map(|c| (*c, true))
            .chain(FALSE_CHOICES.iter().map(|c| (*c, false)));
        Self::choices(key, entries)
    }

    /// One of a fixed set of names, matched exactly.
    #[must_use]
    pub fn choices<K, V>(key: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Choices(ChoicesElement::new(key, Arc::new(StaticChoices::new(entries)), true))
    }

    /// One of a fixed set of names, ignoring case.
    #[must_use]
    pub fn choices_insensitive<K, V>(key: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Choices(ChoicesElement::new(key, Arc::new(StaticChoices::new(entries)), false))
    }

    /// Every candidate matching the token by prefix, or by regex if `use_regex`.
    #[must_use]
    pub fn pattern(key: impl Into<String>, provider: Arc<dyn ChoiceProvider>, use_regex: bool) -> Self {
        Self::PatternMatch(PatternMatchElement::new(key, provider, use_regex))
    }

    /// A variant of `T`, by name prefix.
    #[must_use]
    pub fn enum_value<T: EnumValue>(key: impl Into<String>) -> Self {
        let entries = T::variants()
            .iter()
            .map(|v| (v.name().to_lowercase(), Value::any(v.clone())));
        Self::pattern(key, Arc::new(StaticChoices::new(entries)), false)
    }

    /// A fixed phrase; stores `true` under `key` when given.
    #[must_use]
    pub fn literal(key: Option<&str>, expected: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::literal_with_value(key, true, expected)
    }

    /// A fixed phrase; stores `value` under `key` when given.
    #[must_use]
    pub fn literal_with_value(
        key: Option<&str>,
        value: impl Into<Value>,
        expected: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::Literal(LiteralElement::new(
            key.map(str::to_string),
            value.into(),
            expected.into_iter().map(Into::into).collect(),
        ))
    }

    // -------------------------------------------------------------------------
    // Suggestion wrappers
    // -------------------------------------------------------------------------

    /// Suggests `suggestions` instead of the element's own completions. With
    /// `require_begin`, only those starting with the typed prefix.
    #[must_use]
    pub fn with_suggestions(element: Element, suggestions: Vec<String>, require_begin: bool) -> Self {
        Self::with_dynamic_suggestions(element, move |_| suggestions.clone(), require_begin)
    }

    /// Suggests whatever `suggestions` returns for the source.
    #[must_use]
    pub fn with_dynamic_suggestions(
        element: Element,
        suggestions: impl Fn(&dyn CommandSource) -> Vec<String> + Send + Sync + 'static,
        require_begin: bool,
    ) -> Self {
        Self::WithSuggestions(WithSuggestions::new(element, Arc::new(suggestions), require_begin))
    }

    /// Keeps only the element's completions accepted by `predicate`.
    #[must_use]
    pub fn with_constrained_suggestions(
        element: Element,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::ConstrainedSuggestions(ConstrainedSuggestions::new(element, Arc::new(predicate)))
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    /// The key results are stored under, if the element has one.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Choices(c) => Some(&c.key),
            Self::PatternMatch(p) => Some(&p.key),
            Self::Literal(l) => l.key.as_deref(),
            Self::Leaf(l) => Some(&l.key),
            Self::OnlyOne(e) => e.key(),
            Self::WithSuggestions(w) => w.element.key(),
            Self::ConstrainedSuggestions(c) => c.element.key(),
            Self::Child(c) => Some(c.key()),
            Self::Sequence(_)
            | Self::FirstParsing(_)
            | Self::Optional(_)
            | Self::Repeated { .. }
            | Self::AllOf(_)
            | Self::Flags(_) => None,
        }
    }

    /// Returns true for [`Element::Optional`].
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Consumes tokens and stores results.
    ///
    /// # Errors
    ///
    /// A positioned error describing the first token that did not fit. The
    /// cursor and context are left wherever the failure happened; callers
    /// that retry restore their own snapshots.
    pub fn parse(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Result<(), ArgumentParseError> {
        match self {
            Self::Sequence(elements) => {
                for element in elements {
                    element.parse(source, args, context)?;
                }
                Ok(())
            }
            Self::FirstParsing(elements) => parse_first(elements, source, args, context),
            Self::Optional(optional) => optional.parse(source, args, context),
            Self::Repeated { element, times } => {
                for _ in 0..*times {
                    element.parse(source, args, context)?;
                }
                Ok(())
            }
            Self::AllOf(element) => {
                while args.has_next() {
                    let before = args.snapshot();
                    element.parse(source, args, context)?;
                    // nothing consumed
                    if args.snapshot() == before {
                        break;
                    }
                }
                Ok(())
            }
            Self::OnlyOne(element) => {
                element.parse(source, args, context)?;
                match element.key() {
                    Some(key) if context.get_all(key).len() > 1 => Err(args.create_error(
                        format!("Argument {key} may have only one value!"),
                    )),
                    _ => Ok(()),
                }
            }
            Self::Choices(choices) => choices.parse(source, args, context),
            Self::PatternMatch(pattern) => pattern.parse(source, args, context),
            Self::Literal(literal) => literal.parse(args, context),
            Self::Leaf(leaf) => leaf.parse(args, context),
            Self::Flags(flags) => flags.parse(source, args, context),
            Self::WithSuggestions(w) => w.element.parse(source, args, context),
            Self::ConstrainedSuggestions(c) => c.element.parse(source, args, context),
            Self::Child(child) => child.parse(source, args, context),
        }
    }

    /// Suggestions for the token at the cursor. Never fails.
    pub fn complete(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Vec<String> {
        match self {
            Self::Sequence(elements) => complete_sequence(elements, source, args, context),
            Self::FirstParsing(elements) => {
                let mut completions = Vec::new();
                for element in elements {
                    let args_state = args.snapshot();
                    let context_state = context.snapshot();
                    extend_unique(&mut completions, element.complete(source, args, context));
                    args.apply_snapshot(&args_state, true);
                    context.apply_snapshot(&context_state);
                }
                completions
            }
            Self::Optional(optional) => optional.element.complete(source, args, context),
            Self::Repeated { element, times } => {
                for _ in 0..*times {
                    if let Some(completions) = try_or_complete(element, source, args, context) {
                        return completions;
                    }
                }
                Vec::new()
            }
            Self::AllOf(element) => {
                while args.has_next() {
                    if let Some(completions) = try_or_complete(element, source, args, context) {
                        return completions;
                    }
                }
                Vec::new()
            }
            Self::OnlyOne(element) => element.complete(source, args, context),
            Self::Choices(choices) => choices.complete(source, args),
            Self::PatternMatch(pattern) => pattern.complete(source, args),
            Self::Literal(literal) => literal.complete(args),
            Self::Leaf(leaf) => leaf.complete(args),
            Self::Flags(flags) => flags.complete(source, args, context),
            Self::WithSuggestions(w) => w.complete(source, args),
            Self::ConstrainedSuggestions(c) => c.complete(source, args, context),
            Self::Child(child) => child.complete(source, args, context),
        }
    }

    /// Usage string for this element.
    #[must_use]
    pub fn usage(&self, source: &dyn CommandSource) -> String {
        match self {
            Self::Sequence(elements) => elements
                .iter()
                .map(|e| e.usage(source))
                .filter(|u| !u.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            Self::FirstParsing(elements) => elements
                .iter()
                .map(|e| e.usage(source))
                .collect::<Vec<_>>()
                .join(PIPE),
            Self::Optional(optional) => {
                let inner = optional.element.usage(source);
                if inner.is_empty() {
                    inner
                } else {
                    format!("[{inner}]")
                }
            }
            Self::Repeated { element, times } => format!("{times}*{}", element.usage(source)),
            Self::AllOf(element) => format!("{}*", element.usage(source)),
            Self::OnlyOne(element) => element.usage(source),
            Self::Choices(choices) => choices.usage(source),
            Self::PatternMatch(pattern) => format!("<{}>", pattern.key),
            Self::Literal(literal) => literal.usage(),
            Self::Leaf(leaf) => leaf.usage(),
            Self::Flags(flags) => flags.usage(source),
            Self::WithSuggestions(w) => w.element.usage(source),
            Self::ConstrainedSuggestions(c) => c.element.usage(source),
            Self::Child(child) => child.usage(source),
        }
    }
}

impl From<CommandFlags> for Element {
    fn from(flags: CommandFlags) -> Self {
        Self::Flags(Arc::new(flags))
    }
}

fn parse_first(
    elements: &[Element],
    source: &dyn CommandSource,
    args: &mut CommandArgs,
    context: &mut CommandContext,
) -> Result<(), ArgumentParseError> {
    let mut last_error = None;
    for element in elements {
        let args_state = args.snapshot();
        let context_state = context.snapshot();
        match element.parse(source, args, context) {
            Ok(()) => return Ok(()),
            Err(err) => {
                args.apply_snapshot(&args_state, true);
                context.apply_snapshot(&context_state);
                last_error = Some(err);
            }
        }
    }
    last_error.map_or(Ok(()), Err)
}

/// Parses `element` once; on failure rewinds and returns its completions.
fn try_or_complete(
    element: &Element,
    source: &dyn CommandSource,
    args: &mut CommandArgs,
    context: &mut CommandContext,
) -> Option<Vec<String>> {
    let args_state = args.snapshot();
    let context_state = context.snapshot();
    if element.parse(source, args, context).is_ok() {
        return None;
    }
    args.apply_snapshot(&args_state, true);
    context.apply_snapshot(&context_state);
    Some(element.complete(source, args, context))
}

fn complete_sequence(
    elements: &[Element],
    source: &dyn CommandSource,
    args: &mut CommandArgs,
    context: &mut CommandContext,
) -> Vec<String> {
    let mut completions = Vec::new();
    for element in elements {
        let state = args.snapshot();
        let before = context.snapshot();
        if element.parse(source, args, context).is_err() {
            args.apply_snapshot(&state, true);
            context.apply_snapshot(&before);
            extend_unique(&mut completions, element.complete(source, args, context));
            break;
        }
        let after = context.snapshot();
        if args.snapshot() == state {
            context.apply_snapshot(&before);
            extend_unique(&mut completions, element.complete(source, args, context));
            args.apply_snapshot(&state, true);
            context.apply_snapshot(&after);
        } else if args.has_next() {
            completions.clear();
        } else {
            // The last token may still be a prefix of something longer.
            context.apply_snapshot(&before);
            args.apply_snapshot(&state, true);
            extend_unique(&mut completions, element.complete(source, args, context));
            if !element.is_optional() {
                break;
            }
            context.apply_snapshot(&before);
            args.apply_snapshot(&state, true);
        }
    }
    completions
}
