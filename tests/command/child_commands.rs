//! Subcommands and the specs that host them

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cmdweave_command::{
    BufferedSource, CommandCallable, CommandContext, CommandResult, CommandSource, CommandSpec,
    Dispatcher, Element, ErrorKind,
};

fn flag_executor(
    flag: &Arc<AtomicBool>,
) -> impl Fn(&dyn CommandSource, &CommandContext) -> cmdweave_command::Result<CommandResult> + Send + Sync + 'static
{
    let flag = Arc::clone(flag);
    move |_: &dyn CommandSource, _: &CommandContext| {
        flag.store(true, Ordering::SeqCst);
        Ok(CommandResult::success())
    }
}

fn report(label: &'static str, key: &'static str) -> impl Fn(&dyn CommandSource, &CommandContext) -> cmdweave_command::Result<CommandResult> + Send + Sync + 'static {
    move |source: &dyn CommandSource, context: &CommandContext| {
        let value = context.get_one(key).map(ToString::to_string).unwrap_or_default();
        source.send_message(&format!("{label}:{value}"));
        Ok(CommandResult::success())
    }
}

fn number_child() -> Arc<dyn CommandCallable> {
    Arc::new(
        CommandSpec::builder()
            .arguments(Element::integer("n"))
            .executor(report("child", "n"))
            .build()
            .unwrap(),
    )
}

fn parent_with_fallback(fallback: bool) -> CommandSpec {
    CommandSpec::builder()
        .arguments(Element::optional_with(Element::remaining_joined_strings("value"), "none"))
        .executor(report("parent", "value"))
        .child(number_child(), ["child"])
        .child_argument_parse_fallback(fallback)
        .build()
        .unwrap()
}

fn run(spec: CommandSpec, line: &str) -> (BufferedSource, cmdweave_command::Result<CommandResult>) {
    let dispatcher = Dispatcher::new();
    dispatcher.register(Arc::new(spec), ["parent"]);
    let source = BufferedSource::new("test");
    let result = dispatcher.process(&source, line);
    (source, result)
}

// =============================================================================
// Specs
// =============================================================================

#[test]
fn empty_children_work() {
    let ran = Arc::new(AtomicBool::new(false));
    let spec = CommandSpec::builder()
        .children(Vec::new())
        .executor(flag_executor(&ran))
        .build()
        .unwrap();
    let (_, result) = run(spec, "parent");
    assert_eq!(result.unwrap(), CommandResult::success());
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn spec_without_arguments_runs() {
    let ran = Arc::new(AtomicBool::new(false));
    let spec = CommandSpec::builder().executor(flag_executor(&ran)).build().unwrap();
    spec.process(&BufferedSource::new("test"), "").unwrap();
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn missing_executor_is_an_invalid_spec() {
    let err = CommandSpec::builder().arguments(Element::string("a")).build().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidSpec(_)));
}

// =============================================================================
// Dispatch to children
// =============================================================================

#[test]
fn simple_child_command() {
    let child_ran = Arc::new(AtomicBool::new(false));
    let child = CommandSpec::builder().executor(flag_executor(&child_ran)).build().unwrap();
    let spec = CommandSpec::builder().child(Arc::new(child), ["child"]).build().unwrap();
    run(spec, "parent child").1.unwrap();
    assert!(child_ran.load(Ordering::SeqCst));
}

#[test]
fn child_aliases_ignore_case() {
    let child_ran = Arc::new(AtomicBool::new(false));
    let child = CommandSpec::builder().executor(flag_executor(&child_ran)).build().unwrap();
    let spec = CommandSpec::builder()
        .child(Arc::new(child), ["child", "kid"])
        .build()
        .unwrap();
    run(spec, "parent KID").1.unwrap();
    assert!(child_ran.load(Ordering::SeqCst));
}

#[test]
fn unknown_child_is_an_error() {
    let child = CommandSpec::builder()
        .executor(|_: &dyn CommandSource, _: &CommandContext| Ok(CommandResult::success()))
        .build()
        .unwrap();
    let spec = CommandSpec::builder().child(Arc::new(child), ["child"]).build().unwrap();
    let err = run(spec, "parent wrong").1.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Input command wrong was not a valid subcommand!\nwrong\n^"
    );
}

#[test]
fn missing_child_is_an_error() {
    let spec = CommandSpec::builder().child(number_child(), ["child"]).build().unwrap();
    let err = run(spec, "parent").1.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ArgumentParse(_)));
}

#[test]
fn child_parses_its_own_arguments() {
    let (source, result) = run(parent_with_fallback(true), "parent child 3");
    result.unwrap();
    assert_eq!(source.messages(), vec!["child:3"]);
}

#[test]
fn parent_executor_runs_without_a_child() {
    let (source, result) = run(parent_with_fallback(true), "parent");
    result.unwrap();
    assert_eq!(source.messages(), vec!["parent:none"]);
}

#[test]
fn unknown_child_falls_back_to_parent_arguments() {
    let (source, result) = run(parent_with_fallback(true), "parent other words");
    result.unwrap();
    assert_eq!(source.messages(), vec!["parent:other words"]);
}

#[test]
fn failed_child_parse_falls_back() {
    let (source, result) = run(parent_with_fallback(true), "parent child notnum");
    result.unwrap();
    assert_eq!(source.messages(), vec!["parent:child notnum"]);
}

#[test]
fn failed_child_parse_without_fallback_carries_usage() {
    let (source, result) = run(parent_with_fallback(false), "parent child notnum");
    let err = result.unwrap_err();
    let ErrorKind::ArgumentParse(parse) = &err.kind else {
        panic!("expected a parse error, got {err:?}");
    };
    assert_eq!(parse.message(), "Expected an integer, but input 'notnum' was not");
    assert_eq!(err.usage(), Some("child <n>"));
    assert!(source.messages().is_empty());
}

#[test]
fn parent_arguments_precede_children() {
    let spec = CommandSpec::builder()
        .arguments(Element::string("target"))
        .child(
            Arc::new(
                CommandSpec::builder()
                    .executor(report("show", "target"))
                    .build()
                    .unwrap(),
            ),
            ["show"],
        )
        .build()
        .unwrap();
    let (source, result) = run(spec, "parent lamp show");
    result.unwrap();
    assert_eq!(source.messages(), vec!["show:lamp"]);
}

#[test]
fn child_permission_is_checked() {
    let secret = CommandSpec::builder()
        .permission("admin")
        .executor(|_: &dyn CommandSource, _: &CommandContext| Ok(CommandResult::success()))
        .build()
        .unwrap();
    let spec = CommandSpec::builder().child(Arc::new(secret), ["secret"]).build().unwrap();
    let dispatcher = Dispatcher::new();
    dispatcher.register(Arc::new(spec), ["parent"]);

    let denied = BufferedSource::new("guest").with_denied("admin");
    let err = dispatcher.process(&denied, "parent secret").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::PermissionDenied(_)));
    assert!(dispatcher.process(&BufferedSource::new("root"), "parent secret").is_ok());
}

#[test]
fn nested_dispatchers_receive_the_remainder() {
    let inner = Dispatcher::new();
    inner.register(
        Arc::new(
            CommandSpec::builder()
                .arguments(Element::remaining_joined_strings("text"))
                .executor(report("inner", "text"))
                .build()
                .unwrap(),
        ),
        ["inner"],
    );
    let spec = CommandSpec::builder()
        .child(Arc::new(inner), ["nested"])
        .build()
        .unwrap();
    let (source, result) = run(spec, "parent nested inner hello  there");
    result.unwrap();
    assert_eq!(source.messages(), vec!["inner:hello there"]);
}

// =============================================================================
// Completion and usage
// =============================================================================

#[test]
fn child_aliases_complete() {
    let spec = CommandSpec::builder()
        .child(number_child(), ["child"])
        .child(number_child(), ["other", "alt"])
        .build()
        .unwrap();
    let source = BufferedSource::new("test");
    assert_eq!(spec.suggestions(&source, "").unwrap(), vec!["alt", "child", "other"]);
    assert_eq!(spec.suggestions(&source, "o").unwrap(), vec!["other"]);
    assert!(spec.suggestions(&source, "nothing more").unwrap().is_empty());
}

#[test]
fn child_arguments_complete() {
    let child = CommandSpec::builder()
        .arguments(Element::choices("speed", [("fast", 1), ("slow", 2)]))
        .executor(|_: &dyn CommandSource, _: &CommandContext| Ok(CommandResult::success()))
        .build()
        .unwrap();
    let spec = CommandSpec::builder().child(Arc::new(child), ["go"]).build().unwrap();
    let source = BufferedSource::new("test");
    assert_eq!(spec.suggestions(&source, "go s").unwrap(), vec!["slow"]);
    assert_eq!(spec.suggestions(&source, "go ").unwrap(), vec!["fast", "slow"]);
}

#[test]
fn child_usage_lists_primary_aliases() {
    let spec = CommandSpec::builder()
        .child(number_child(), ["child", "kid"])
        .child(number_child(), ["other"])
        .build()
        .unwrap();
    assert_eq!(spec.usage(&BufferedSource::new("test")), "child|other");
}
