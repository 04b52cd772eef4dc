//! Sample commands for the `cmdweave` binary.

use std::sync::{Arc, Weak};

use chrono::{Local, TimeDelta};
use cmdweave_command::{
    CommandContext, CommandFlags, CommandManager, CommandResult, CommandSource, CommandSpec,
    Element, OwnerMetadata,
};
use cmdweave_foundation::{Error, Result};

/// Owner id the sample commands are registered under.
pub const DEMO_OWNER: &str = "demo";

fn owner() -> OwnerMetadata {
    OwnerMetadata {
        name: Some("cmdweave demo".to_string()),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        description: Some("Sample commands".to_string()),
        ..OwnerMetadata::new(DEMO_OWNER)
    }
}

fn int(context: &CommandContext, key: &str) -> Result<i32> {
    context
        .require_one(key)?
        .as_int()
        .ok_or_else(|| Error::message(format!("{key} is not an integer")))
}

fn echo() -> Result<CommandSpec> {
    CommandSpec::builder()
        .description("Prints its arguments")
        .arguments(Element::optional_with(Element::remaining_joined_strings("text"), ""))
        .executor(|source: &dyn CommandSource, context: &CommandContext| {
            let text = context.require_one("text")?;
            source.send_message(text.as_str().unwrap_or_default());
            Ok(CommandResult::success())
        })
        .build()
}

fn binary(description: &str, op: fn(i32, i32) -> Option<i32>) -> Result<CommandSpec> {
    CommandSpec::builder()
        .description(description)
        .arguments(Element::seq([Element::integer("a"), Element::integer("b")]))
        .executor(move |source: &dyn CommandSource, context: &CommandContext| {
            let (a, b) = (int(context, "a")?, int(context, "b")?);
            let value = op(a, b).ok_or_else(|| Error::message(format!("Cannot compute {a} and {b}")))?;
            source.send_message(&value.to_string());
            Ok(CommandResult::query(value))
        })
        .build()
}

fn math() -> Result<CommandSpec> {
    CommandSpec::builder()
        .description("Integer arithmetic")
        .child(Arc::new(binary("Adds two numbers", i32::checked_add)?), ["add", "plus"])
        .child(Arc::new(binary("Subtracts b from a", i32::checked_sub)?), ["sub"])
        .child(Arc::new(binary("Multiplies two numbers", i32::checked_mul)?), ["mul"])
        .child(Arc::new(binary("Divides a by b", i32::checked_div)?), ["div"])
        .build()
}

fn greet() -> Result<CommandSpec> {
    let grammar = CommandFlags::builder()
        .flag(&["l", "-loud"])
        .value_flag(Element::integer("times"), &["t", "-times"])
        .build_with(Element::string("name"));
    CommandSpec::builder()
        .description("Greets someone")
        .arguments(grammar)
        .executor(|source: &dyn CommandSource, context: &CommandContext| {
            let name = context.require_one("name")?;
            let mut greeting = format!("Hello, {name}!");
            if context.has_any("l") {
                greeting = greeting.to_uppercase();
            }
            let times = context.get_one("times").and_then(|v| v.as_int()).unwrap_or(1);
            for _ in 0..times.max(0) {
                source.send_message(&greeting);
            }
            Ok(CommandResult::success().with_success_count(times))
        })
        .build()
}

fn time() -> Result<CommandSpec> {
    CommandSpec::builder()
        .description("Shows the local time, optionally shifted")
        .extended_description("Offsets use ISO-8601 or shorthand such as 90m or 1d2h.")
        .arguments(Element::optional_with(Element::duration("offset"), TimeDelta::zero()))
        .executor(|source: &dyn CommandSource, context: &CommandContext| {
            let offset = context
                .get_one("offset")
                .and_then(|v| v.as_duration())
                .unwrap_or_default();
            let at = Local::now().naive_local() + offset;
            source.send_message(&at.format("%Y-%m-%d %H:%M:%S").to_string());
            Ok(CommandResult::success())
        })
        .build()
}

fn help(manager: Weak<CommandManager>) -> Result<CommandSpec> {
    CommandSpec::builder()
        .description("Lists the available commands")
        .executor(move |source: &dyn CommandSource, _: &CommandContext| {
            let Some(manager) = manager.upgrade() else {
                return Ok(CommandResult::empty());
            };
            if let Some(text) = manager.help(source) {
                for line in text.lines() {
                    source.send_message(line);
                }
            }
            Ok(CommandResult::success())
        })
        .build()
}

/// Registers the sample commands on `manager`.
///
/// # Errors
///
/// Returns an error if a command is assembled incorrectly or an alias is
/// already registered by the demo owner.
pub fn register(manager: &Arc<CommandManager>) -> Result<()> {
    let owner = owner();
    manager.register(&owner, Arc::new(echo()?), ["echo", "say"])?;
    manager.register(&owner, Arc::new(math()?), ["math"])?;
    manager.register(&owner, Arc::new(greet()?), ["greet"])?;
    manager.register(&owner, Arc::new(time()?), ["time"])?;
    manager.register(&owner, Arc::new(help(Arc::downgrade(manager))?), ["help", "?"])?;
    Ok(())
}
