//! Flags parsed through whole command specs

use cmdweave_command::{
    BufferedSource, CommandCallable, CommandContext, CommandFlags, CommandResult, CommandSource,
    CommandSpec, Element, ErrorKind, UnknownFlagBehavior, Value,
};

/// Sends every key it finds, sorted, as `key=value` lines.
fn dump(source: &dyn CommandSource, context: &CommandContext) -> cmdweave_command::Result<CommandResult> {
    let mut keys: Vec<&str> = context.keys().collect();
    keys.sort_unstable();
    keys.dedup();
    for key in keys {
        let values: Vec<String> = context.get_all(key).iter().map(ToString::to_string).collect();
        source.send_message(&format!("{key}={}", values.join(",")));
    }
    Ok(CommandResult::success())
}

fn spec(arguments: Element) -> CommandSpec {
    CommandSpec::builder().arguments(arguments).executor(dump).build().unwrap()
}

fn process(spec: &CommandSpec, input: &str) -> Vec<String> {
    let source = BufferedSource::new("test");
    spec.process(&source, input).unwrap();
    source.messages()
}

fn flagged() -> CommandSpec {
    spec(
        CommandFlags::builder()
            .flag(&["a"])
            .value_flag(Element::integer("quot"), &["q"])
            .build_with(Element::string("key")),
    )
}

fn with_unknown(behavior: UnknownFlagBehavior) -> CommandSpec {
    spec(
        CommandFlags::builder()
            .set_unknown_long_flag_behavior(behavior)
            .set_unknown_short_flag_behavior(behavior)
            .flag(&["h", "-help"])
            .build_with(Element::none()),
    )
}

const UNKNOWN_INPUT: &str = "-h --other something -q else --forceargs=always";

#[test]
fn flags_in_any_position() {
    let expected = vec!["a=true", "key=something", "quot=42"];
    assert_eq!(process(&flagged(), "-a -q 42 something"), expected);
    assert_eq!(process(&flagged(), "-aq 42 something"), expected);
    assert_eq!(process(&flagged(), "-a something -q 42"), expected);
}

#[test]
fn flags_are_optional() {
    assert_eq!(process(&flagged(), "something"), vec!["key=something"]);
}

#[test]
fn bad_flag_value_points_at_it() {
    let err = flagged()
        .process(&BufferedSource::new("test"), "-q many something")
        .unwrap_err();
    let ErrorKind::ArgumentParse(parse) = &err.kind else {
        panic!("expected a parse error, got {err:?}");
    };
    assert_eq!(parse.message(), "Expected an integer, but input 'many' was not");
    assert_eq!(parse.position(), 3);
}

#[test]
fn long_and_short_names_share_a_key() {
    let spec = spec(
        CommandFlags::builder()
            .flag(&["l", "-loud"])
            .build_with(Element::optional(Element::string("name"))),
    );
    assert_eq!(process(&spec, "--loud"), vec!["l=true"]);
    assert_eq!(process(&spec, "-l bob"), vec!["l=true", "name=bob"]);
    assert_eq!(process(&spec, "--LOUD bob"), vec!["l=true", "name=bob"]);
}

#[test]
fn unknown_flags_fail_by_default() {
    let err = with_unknown(UnknownFlagBehavior::Error)
        .process(&BufferedSource::new("test"), UNKNOWN_INPUT)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown long flag other specified\n-h --other something -q else --forceargs=always\n   ^"
    );
}

#[test]
fn ignored_unknown_flags_reach_the_child() {
    let spec = spec(
        CommandFlags::builder()
            .set_unknown_long_flag_behavior(UnknownFlagBehavior::Ignore)
            .set_unknown_short_flag_behavior(UnknownFlagBehavior::Ignore)
            .flag(&["h", "-help"])
            .build_with(Element::remaining_joined_strings("rest")),
    );
    assert_eq!(
        process(&spec, UNKNOWN_INPUT),
        vec!["h=true", "rest=--other something -q else --forceargs=always"]
    );
}

#[test]
fn unknown_flags_accepted_without_values() {
    let spec = spec(
        CommandFlags::builder()
            .set_unknown_long_flag_behavior(UnknownFlagBehavior::AcceptNonValue)
            .set_unknown_short_flag_behavior(UnknownFlagBehavior::AcceptNonValue)
            .flag(&["h", "-help"])
            .build_with(Element::all_of(Element::string("rest"))),
    );
    assert_eq!(
        process(&spec, UNKNOWN_INPUT),
        vec!["forceargs=always", "h=true", "other=true", "q=true", "rest=something,else"]
    );
}

#[test]
fn unknown_flags_accepted_with_values() {
    assert_eq!(
        process(&with_unknown(UnknownFlagBehavior::AcceptValue), UNKNOWN_INPUT),
        vec!["forceargs=always", "h=true", "other=something", "q=else"]
    );
}

#[test]
fn flag_values_keep_their_types() {
    let source = BufferedSource::new("test");
    let spec = CommandSpec::builder()
        .arguments(
            CommandFlags::builder()
                .value_flag(Element::integer("times"), &["t", "-times"])
                .build_with(Element::none()),
        )
        .executor(|_: &dyn CommandSource, context: &CommandContext| {
            assert_eq!(context.get_one("times"), Some(&Value::Int(3)));
            Ok(CommandResult::success())
        })
        .build()
        .unwrap();
    spec.process(&source, "--times=3").unwrap();
    spec.process(&source, "-t 3").unwrap();
}

// =============================================================================
// Completion and usage
// =============================================================================

fn painter() -> CommandSpec {
    spec(
        CommandFlags::builder()
            .flag(&["v", "-verbose"])
            .value_flag(
                Element::choices("color", [("red", 1), ("green", 2), ("blue", 3)]),
                &["c", "-color"],
            )
            .build_with(Element::choices("size", [("small", 1), ("large", 2)])),
    )
}

fn suggest(spec: &CommandSpec, input: &str) -> Vec<String> {
    let mut results = spec.suggestions(&BufferedSource::new("test"), input).unwrap();
    results.sort();
    results
}

#[test]
fn completes_long_flag_names() {
    assert_eq!(suggest(&painter(), "--"), vec!["--color", "--verbose"]);
    assert_eq!(suggest(&painter(), "--v"), vec!["--verbose"]);
}

#[test]
fn completes_flag_values() {
    assert_eq!(suggest(&painter(), "-c "), vec!["blue", "green", "red"]);
    assert_eq!(suggest(&painter(), "--color r"), vec!["red"]);
    assert_eq!(suggest(&painter(), "--color=g"), vec!["--color=green"]);
}

#[test]
fn completes_child_after_flags() {
    assert_eq!(suggest(&painter(), "--color red "), vec!["large", "small"]);
    assert_eq!(suggest(&painter(), "-v s"), vec!["small"]);
    assert_eq!(suggest(&painter(), ""), vec!["large", "small"]);
}

#[test]
fn usage_lists_flags_then_child() {
    assert_eq!(
        painter().usage(&BufferedSource::new("test")),
        "[-v|--verbose] [-c|--color <red|green|blue>] <small|large>"
    );
}
