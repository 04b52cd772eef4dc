//! Prefix flags layered over a child element.
//!
//! Flags may appear anywhere among the arguments (or only before the first
//! positional token when anchored). Every matched flag token, together with
//! any value it consumed, is removed from the stream before the child
//! element parses what is left.

use std::collections::{BTreeMap, HashMap};

use cmdweave_foundation::ArgumentParseError;

use crate::args::CommandArgs;
use crate::context::CommandContext;
use crate::element::Element;
use crate::format::{PIPE, starts_with_ignore_case};
use crate::source::CommandSource;

/// What to do with a flag nobody declared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnknownFlagBehavior {
    /// Fail the parse.
    #[default]
    Error,
    /// Leave the token in place for the child element.
    Ignore,
    /// Store `true`, or the inline `=value` of a long flag.
    AcceptNonValue,
    /// Store the inline `=value`, or else the following token.
    AcceptValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum FlagName {
    Short(char),
    Long(String),
}

impl FlagName {
    fn key(&self) -> String {
        match self {
            Self::Short(c) => c.to_string(),
            Self::Long(name) => name.clone(),
        }
    }
}

/// A flag scanner wrapping a child element.
#[derive(Clone, Debug)]
pub struct CommandFlags {
    child: Element,
    usage_flags: Vec<(Vec<FlagName>, usize)>,
    elements: Vec<Element>,
    short_flags: HashMap<char, usize>,
    long_flags: BTreeMap<String, usize>,
    unknown_short: UnknownFlagBehavior,
    unknown_long: UnknownFlagBehavior,
    anchor_flags: bool,
}

impl CommandFlags {
    /// Starts declaring flags.
    #[must_use]
    pub fn builder() -> FlagsBuilder {
        FlagsBuilder::default()
    }

    pub(crate) fn parse(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Result<(), ArgumentParseError> {
        let state = args.snapshot();
        while args.has_next() {
            let arg = args.next()?;
            if let Some(flag) = arg.strip_prefix('-') {
                let start = args.snapshot();
                let remove = match flag.strip_prefix('-') {
                    Some(long) => self.parse_long_flag(source, long, args, context)?,
                    None => self.parse_short_flags(source, flag, args, context)?,
                };
                if remove {
                    let end = args.snapshot();
                    args.remove_args(&start, &end);
                }
            } else if self.anchor_flags {
                break;
            }
        }
        // Rewind over the edited stream; removed flags stay removed.
        args.apply_snapshot(&state, false);
        self.child.parse(source, args, context)
    }

    fn parse_long_flag(
        &self,
        source: &dyn CommandSource,
        long: &str,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Result<bool, ArgumentParseError> {
        let (name, inline) = split_inline(long);
        let flag = name.to_lowercase();
        let Some(&index) = self.long_flags.get(&flag) else {
            return match self.unknown_long {
                UnknownFlagBehavior::Error => {
                    Err(args.create_error(format!("Unknown long flag {name} specified")))
                }
                UnknownFlagBehavior::AcceptNonValue => {
                    match inline {
                        Some(value) => context.put_arg(flag, value),
                        None => context.put_arg(flag, true),
                    }
                    Ok(true)
                }
                UnknownFlagBehavior::AcceptValue => {
                    let value = match inline {
                        Some(value) => value.to_string(),
                        None => args.next()?,
                    };
                    context.put_arg(flag, value);
                    Ok(true)
                }
                UnknownFlagBehavior::Ignore => Ok(false),
            };
        };
        if let Some(value) = inline {
            args.insert_arg(value);
        }
        self.elements[index].parse(source, args, context)?;
        Ok(true)
    }

    fn parse_short_flags(
        &self,
        source: &dyn CommandSource,
        flags: &str,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Result<bool, ArgumentParseError> {
        for (i, flag) in flags.chars().enumerate() {
            if let Some(&index) = self.short_flags.get(&flag) {
                self.elements[index].parse(source, args, context)?;
                continue;
            }
            match self.unknown_short {
                UnknownFlagBehavior::Ignore if i == 0 => return Ok(false),
                UnknownFlagBehavior::Ignore | UnknownFlagBehavior::Error => {
                    return Err(args.create_error(format!("Unknown short flag {flag} specified")));
                }
                UnknownFlagBehavior::AcceptNonValue => context.put_arg(flag.to_string(), true),
                UnknownFlagBehavior::AcceptValue => {
                    let value = args.next()?;
                    context.put_arg(flag.to_string(), value);
                }
            }
        }
        Ok(true)
    }

    pub(crate) fn complete(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Vec<String> {
        let state = args.snapshot();
        while let Some(next) = args.next_if_present() {
            if let Some(flag) = next.strip_prefix('-') {
                let start = args.snapshot();
                let completions = match flag.strip_prefix('-') {
                    Some(long) => self.complete_long_flag(source, long, args, context),
                    None => self.complete_short_flags(source, flag, args, context),
                };
                if let Some(completions) = completions {
                    return completions;
                }
                let end = args.snapshot();
                args.remove_args(&start, &end);
            } else if self.anchor_flags {
                break;
            }
        }
        args.apply_snapshot(&state, false);

        // Every token went to flags; the last one is still being typed.
        if !args.has_next() && !args.raw().is_empty() && !args.raw().ends_with(char::is_whitespace) {
            return Vec::new();
        }
        self.child.complete(source, args, context)
    }

    /// `None` means the flag is settled and scanning continues.
    fn complete_long_flag(
        &self,
        source: &dyn CommandSource,
        long: &str,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Option<Vec<String>> {
        let (name, inline) = split_inline(long);
        let index = match self.long_flags.get(&name.to_lowercase()) {
            Some(&index) if inline.is_some() || args.has_next() => index,
            _ => {
                return Some(
                    self.long_flags
                        .keys()
                        .filter(|flag| starts_with_ignore_case(flag, name))
                        .map(|flag| format!("--{flag}"))
                        .collect(),
                );
            }
        };
        if let Some(value) = inline {
            args.insert_arg(value);
        }
        let completions = complete_flag_value(&self.elements[index], source, args, context)?;
        match inline {
            // Offering nothing keeps the typed flag intact.
            Some(_) => Some(
                completions
                    .into_iter()
                    .map(|c| format!("--{name}={c}"))
                    .collect(),
            ),
            None if completions.is_empty() => None,
            None => Some(completions),
        }
    }

    fn complete_short_flags(
        &self,
        source: &dyn CommandSource,
        flags: &str,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Option<Vec<String>> {
        for (i, flag) in flags.chars().enumerate() {
            match self.short_flags.get(&flag) {
                Some(&index) => {
                    let completions = complete_flag_value(&self.elements[index], source, args, context);
                    if let Some(completions) = completions.filter(|c| !c.is_empty()) {
                        return Some(completions);
                    }
                }
                None if i == 0 && self.unknown_short == UnknownFlagBehavior::AcceptValue => {
                    args.next_if_present();
                    return None;
                }
                None => {}
            }
        }
        None
    }

    pub(crate) fn usage(&self, source: &dyn CommandSource) -> String {
        let mut usage = String::new();
        for (names, index) in &self.usage_flags {
            let names: Vec<String> = names
                .iter()
                .map(|name| match name {
                    FlagName::Short(c) => format!("-{c}"),
                    FlagName::Long(long) => format!("--{long}"),
                })
                .collect();
            usage.push_str(&format!("[{}", names.join(PIPE)));
            let value = self.elements[*index].usage(source);
            if !value.trim().is_empty() {
                usage.push_str(&format!(" {value}"));
            }
            usage.push_str("] ");
        }
        usage.push_str(&self.child.usage(source));
        usage.trim_end().to_string()
    }
}

fn split_inline(long: &str) -> (&str, Option<&str>) {
    match long.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (long, None),
    }
}

/// Completions for a flag's value element.
///
/// Returns `None` when the value parsed and more tokens follow. Otherwise
/// the cursor and context are rewound to where the value starts.
fn complete_flag_value(
    element: &Element,
    source: &dyn CommandSource,
    args: &mut CommandArgs,
    context: &mut CommandContext,
) -> Option<Vec<String>> {
    let start = args.snapshot();
    let before = context.snapshot();
    let completions = match element.parse(source, args, context) {
        Ok(()) if args.snapshot() == start => element.complete(source, args, context),
        Ok(()) if args.has_next() => return None,
        Ok(()) => {
            // The value parsed but is the last token; it may still grow.
            args.previous();
            let current = args.peek().map(str::to_string).ok();
            let mut completions = element.complete(source, args, context);
            if let Some(current) = current.filter(|c| !completions.contains(c)) {
                completions.push(current);
            }
            completions
        }
        Err(_) => {
            args.apply_snapshot(&start, true);
            context.apply_snapshot(&before);
            element.complete(source, args, context)
        }
    };
    args.apply_snapshot(&start, true);
    context.apply_snapshot(&before);
    Some(completions)
}

/// Declares flags, then wraps a child element with
/// [`build_with`](Self::build_with).
///
/// A spec starting with `-` names a long flag (`"-help"` is `--help`);
/// otherwise every character of the spec is a short flag. Values are stored
/// under the first name of each declaration.
#[derive(Debug, Default)]
pub struct FlagsBuilder {
    usage_flags: Vec<(Vec<FlagName>, usize)>,
    elements: Vec<Element>,
    short_flags: HashMap<char, usize>,
    long_flags: BTreeMap<String, usize>,
    unknown_short: UnknownFlagBehavior,
    unknown_long: UnknownFlagBehavior,
    anchor_flags: bool,
}

impl FlagsBuilder {
    fn declare(mut self, specs: &[&str], element_for: impl FnOnce(&str) -> Element) -> Self {
        let index = self.elements.len();
        let mut names = Vec::new();
        for spec in specs {
            if let Some(long) = spec.strip_prefix('-') {
                names.push(FlagName::Long(long.to_string()));
                self.long_flags.insert(long.to_lowercase(), index);
            } else {
                for c in spec.chars() {
                    names.push(FlagName::Short(c));
                    self.short_flags.insert(c, index);
                }
            }
        }
        let Some(first) = names.first() else {
            return self;
        };
        self.elements.push(element_for(&first.key()));
        self.usage_flags.push((names, index));
        self
    }

    /// A boolean flag that stores `true` when present.
    #[must_use]
    pub fn flag(self, specs: &[&str]) -> Self {
        self.declare(specs, |key: &str| Element::mark_true(key))
    }

    /// A flag followed by a value parsed with `element`.
    #[must_use]
    pub fn value_flag(self, element: Element, specs: &[&str]) -> Self {
        self.declare(specs, |_| element)
    }

    /// Policy for undeclared `--long` flags.
    #[must_use]
    pub const fn set_unknown_long_flag_behavior(mut self, behavior: UnknownFlagBehavior) -> Self {
        self.unknown_long = behavior;
        self
    }

    /// Policy for undeclared `-s` flags.
    #[must_use]
    pub const fn set_unknown_short_flag_behavior(mut self, behavior: UnknownFlagBehavior) -> Self {
        self.unknown_short = behavior;
        self
    }

    /// Stop scanning for flags at the first positional token.
    #[must_use]
    pub const fn set_anchor_flags(mut self, anchor: bool) -> Self {
        self.anchor_flags = anchor;
        self
    }

    /// Finishes the flags, wrapping `child`.
    #[must_use]
    pub fn build_with(self, child: Element) -> Element {
        Element::from(CommandFlags {
            child,
            usage_flags: self.usage_flags,
            elements: self.elements,
            short_flags: self.short_flags,
            long_flags: self.long_flags,
            unknown_short: self.unknown_short,
            unknown_long: self.unknown_long,
            anchor_flags: self.anchor_flags,
        })
    }
}
