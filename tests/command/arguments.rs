//! Parsing with the element grammar

use std::sync::Arc;

use chrono::TimeDelta;
use cmdweave_command::element::{EnumValue, StaticChoices};
use cmdweave_command::{
    ArgumentParseError, BufferedSource, CommandArgs, CommandContext, CommandResult, CommandSource,
    CommandSpec, Element, InputTokenizer, Value,
};

fn spec_for(element: Element, tokenizer: InputTokenizer) -> CommandSpec {
    CommandSpec::builder()
        .arguments(element)
        .executor(|_: &dyn CommandSource, _: &CommandContext| Ok(CommandResult::success()))
        .input_tokenizer(tokenizer)
        .build()
        .unwrap()
}

fn parse_with(
    input: &str,
    element: Element,
    tokenizer: InputTokenizer,
) -> Result<CommandContext, ArgumentParseError> {
    let spec = spec_for(element, tokenizer);
    let tokens = spec.tokenizer().tokenize(input, false)?;
    let mut args = CommandArgs::new(input, tokens);
    let mut context = CommandContext::new();
    spec.populate_context(&BufferedSource::new("test"), &mut args, &mut context)?;
    Ok(context)
}

fn parse_for_input(input: &str, element: Element) -> Result<CommandContext, ArgumentParseError> {
    parse_with(input, element, InputTokenizer::quoted_strings(false))
}

fn one<'a>(context: &'a CommandContext, key: &str) -> &'a Value {
    context.get_one(key).unwrap()
}

// =============================================================================
// Combinators
// =============================================================================

#[test]
fn none_rejects_arguments() {
    let err = parse_for_input("a", Element::none()).unwrap_err();
    assert_eq!(err.message(), "Too many arguments!");
    assert!(parse_for_input("", Element::none()).is_ok());
}

#[test]
fn sequence_needs_every_element() {
    let element = || {
        Element::seq([
            Element::string("one"),
            Element::string("two"),
            Element::string("three"),
        ])
    };
    let context = parse_for_input("a b c", element()).unwrap();
    assert_eq!(one(&context, "one").as_str(), Some("a"));
    assert_eq!(one(&context, "three").as_str(), Some("c"));

    let err = parse_for_input("a b", element()).unwrap_err();
    assert_eq!(err.message(), "Not enough arguments!");
}

#[test]
fn first_parsing_keeps_the_first_success() {
    let element = || Element::first_parsing([Element::integer("val"), Element::string("val")]);
    let context = parse_for_input("word", element()).unwrap();
    assert_eq!(one(&context, "val").as_str(), Some("word"));

    let context = parse_for_input("42", element()).unwrap();
    assert_eq!(one(&context, "val").as_int(), Some(42));
}

#[test]
fn first_parsing_reports_the_last_failure() {
    let element = Element::first_parsing([Element::integer("val"), Element::long_num("val")]);
    let err = parse_for_input("nope", element).unwrap_err();
    assert_eq!(err.message(), "Expected a long, but input 'nope' was not");
}

#[test]
fn first_parsing_over_literal_phrases() {
    let element = || {
        Element::first_parsing([
            Element::literal(Some("far"), ["go", "far"]),
            Element::literal(Some("near"), ["go"]),
        ])
    };
    let context = parse_with("go far", element(), InputTokenizer::space_split()).unwrap();
    assert_eq!(one(&context, "far").as_bool(), Some(true));
    assert!(!context.has_any("near"));

    let context = parse_with("GO", element(), InputTokenizer::space_split()).unwrap();
    assert_eq!(one(&context, "near").as_bool(), Some(true));
    assert!(!context.has_any("far"));
}

#[test]
fn literal_mismatch() {
    let err = parse_for_input("stop", Element::literal(None, ["go"])).unwrap_err();
    assert_eq!(err.message(), "Argument stop did not match expected next argument go");
}

#[test]
fn optional_stores_default_when_absent() {
    let context = parse_for_input("", Element::optional_with(Element::integer("n"), 7)).unwrap();
    assert_eq!(one(&context, "n").as_int(), Some(7));

    let context = parse_for_input("", Element::optional(Element::integer("n"))).unwrap();
    assert!(!context.has_any("n"));
}

#[test]
fn optional_failure_is_absence_only_when_more_follows() {
    let element = || {
        Element::seq([
            Element::optional(Element::integer("n")),
            Element::string("s"),
            Element::string("t"),
        ])
    };
    let context = parse_for_input("word other", element()).unwrap();
    assert!(!context.has_any("n"));
    assert_eq!(one(&context, "s").as_str(), Some("word"));

    let err = parse_for_input("word", Element::optional(Element::integer("n"))).unwrap_err();
    assert_eq!(err.message(), "Expected an integer, but input 'word' was not");
}

#[test]
fn weak_optional_swallows_failures() {
    let element = Element::seq([
        Element::optional_weak(Element::integer("n")),
        Element::string("s"),
    ]);
    let context = parse_for_input("word", element).unwrap();
    assert!(!context.has_any("n"));
    assert_eq!(one(&context, "s").as_str(), Some("word"));

    let element = Element::seq([
        Element::optional_weak_with(Element::integer("n"), 3),
        Element::string("s"),
    ]);
    let context = parse_for_input("x", element).unwrap();
    assert_eq!(one(&context, "n").as_int(), Some(3));
}

#[test]
fn repeated_collects_in_order() {
    let context = parse_for_input("1 1 2 3 5", Element::repeated(Element::integer("key"), 5)).unwrap();
    let values: Vec<i32> = context
        .get_all("key")
        .into_iter()
        .filter_map(Value::as_int)
        .collect();
    assert_eq!(values, vec![1, 1, 2, 3, 5]);

    assert!(parse_for_input("1 1 2", Element::repeated(Element::integer("key"), 5)).is_err());
}

#[test]
fn all_of_consumes_everything() {
    let context = parse_for_input("2 4 8 16", Element::all_of(Element::integer("key"))).unwrap();
    assert_eq!(context.get_all("key").len(), 4);

    let err = parse_for_input("2 x", Element::all_of(Element::integer("key"))).unwrap_err();
    assert_eq!(err.position(), 2);
}

#[test]
fn only_one_rejects_multiple_values() {
    let provider = || Arc::new(StaticChoices::new([("alpha", "alpha"), ("alpine", "alpine")]));
    let context = parse_for_input("alpha", Element::only_one(Element::pattern("p", provider(), false))).unwrap();
    assert_eq!(one(&context, "p").as_str(), Some("alpha"));

    let err = parse_for_input("alp", Element::only_one(Element::pattern("p", provider(), false))).unwrap_err();
    assert_eq!(err.message(), "Argument p may have only one value!");
}

// =============================================================================
// Choices
// =============================================================================

#[test]
fn choices_are_case_sensitive() {
    let element = || Element::choices("val", [("a", "one"), ("b", "two")]);
    let context = parse_for_input("a", element()).unwrap();
    assert_eq!(one(&context, "val").as_str(), Some("one"));

    let err = parse_for_input("A", element()).unwrap_err();
    assert_eq!(err.message(), "Argument was not a valid choice. Valid choices: [a, b]");
}

#[test]
fn insensitive_choices() {
    let element = || Element::choices_insensitive("val", [("a", "one"), ("b", "two")]);
    let context = parse_for_input("A", element()).unwrap();
    assert_eq!(one(&context, "val").as_str(), Some("one"));
    assert!(parse_for_input("c", element()).is_err());
}

#[test]
fn bool_choices() {
    for (input, expected) in [("true", true), ("t", true), ("yes", true), ("f", false), ("0", false)] {
        let context = parse_for_input(input, Element::bool("val")).unwrap();
        assert_eq!(one(&context, "val").as_bool(), Some(expected), "parsing {input}");
    }
    assert!(parse_for_input("maybe", Element::bool("val")).is_err());
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum TestEnum {
    One,
    Two,
    Red,
}

impl EnumValue for TestEnum {
    fn variants() -> &'static [Self] {
        &[Self::One, Self::Two, Self::Red]
    }

    fn name(&self) -> &str {
        match self {
            Self::One => "ONE",
            Self::Two => "TWO",
            Self::Red => "RED",
        }
    }
}

#[test]
fn enum_values() {
    for (input, expected) in [("one", TestEnum::One), ("TwO", TestEnum::Two), ("RED", TestEnum::Red)] {
        let context = parse_for_input(input, Element::enum_value::<TestEnum>("val")).unwrap();
        assert_eq!(one(&context, "val").downcast_ref::<TestEnum>(), Some(&expected));
    }

    let err = parse_for_input("notanel", Element::enum_value::<TestEnum>("val")).unwrap_err();
    assert_eq!(err.message(), "No values matching pattern 'notanel' present for val!");
}

// =============================================================================
// Pattern matching
// =============================================================================

fn test_choices() -> Arc<StaticChoices> {
    Arc::new(StaticChoices::new(
        ["test1", "test2", "test123", "test124"].map(|c| (c, c)),
    ))
}

fn matched(input: &str, use_regex: bool) -> Vec<String> {
    let context = parse_with(
        input,
        Element::pattern("test", test_choices(), use_regex),
        InputTokenizer::quoted_strings(true),
    )
    .unwrap();
    let mut values: Vec<String> = context.get_all("test").iter().map(ToString::to_string).collect();
    values.sort();
    values
}

#[test]
fn exact_match_wins() {
    assert_eq!(matched("test1", false), vec!["test1"]);
    assert_eq!(matched("TEST2", false), vec!["test2"]);
}

#[test]
fn prefix_matches_every_candidate() {
    assert_eq!(matched("test", false), vec!["test1", "test123", "test124", "test2"]);
    assert_eq!(matched("test12", false), vec!["test123", "test124"]);
}

#[test]
fn regex_matches() {
    assert_eq!(matched("test1[0-9]4", true), vec!["test124"]);
    assert_eq!(matched("t.st2", true), vec!["test2"]);
}

#[test]
fn unmatched_pattern_fails() {
    let err = parse_for_input("gibberish", Element::pattern("test", test_choices(), false)).unwrap_err();
    assert_eq!(err.message(), "No values matching pattern 'gibberish' present for test!");
    assert!(parse_for_input("(", Element::pattern("test", test_choices(), true)).is_err());
}

// =============================================================================
// Leaves
// =============================================================================

#[test]
fn quoted_strings() {
    let context = parse_for_input("\"here it is\"", Element::string("a")).unwrap();
    assert_eq!(one(&context, "a").as_str(), Some("here it is"));
}

#[test]
fn integers_in_several_radixes() {
    for (input, expected) in [("52", 52), ("0xdead", 0xdead), ("0b101010", 0b10_1010), ("-3", -3)] {
        let context = parse_for_input(input, Element::integer("a")).unwrap();
        assert_eq!(one(&context, "a").as_int(), Some(expected), "parsing {input}");
    }
    let err = parse_for_input("notanumber", Element::integer("a")).unwrap_err();
    assert_eq!(err.message(), "Expected an integer, but input 'notanumber' was not");
    assert_eq!(err.position(), 0);
}

#[test]
fn longs_and_doubles() {
    let context = parse_for_input("524903294023901", Element::long_num("a")).unwrap();
    assert_eq!(one(&context, "a").as_long(), Some(524_903_294_023_901));

    let context = parse_for_input("2.5", Element::double_num("a")).unwrap();
    assert_eq!(one(&context, "a").as_double(), Some(2.5));

    let err = parse_for_input("2.5", Element::long_num("a")).unwrap_err();
    assert_eq!(err.message(), "Expected a long, but input '2.5' was not");
}

#[test]
fn big_numbers() {
    let context = parse_for_input("123456789012345678901234567890", Element::big_integer("a")).unwrap();
    assert_eq!(one(&context, "a").to_string(), "123456789012345678901234567890");

    let context = parse_for_input("3.14159", Element::big_decimal("a")).unwrap();
    assert!(one(&context, "a").as_big_decimal().is_some());
}

#[test]
fn uuid_url_and_ip() {
    let context = parse_for_input("550e8400-e29b-41d4-a716-446655440000", Element::uuid("a")).unwrap();
    assert_eq!(
        one(&context, "a").as_uuid().map(|u| u.to_string()).as_deref(),
        Some("550e8400-e29b-41d4-a716-446655440000")
    );
    let err = parse_for_input("nope", Element::uuid("a")).unwrap_err();
    assert_eq!(err.message(), "Invalid UUID: nope");

    let context = parse_for_input("https://example.com/path", Element::url("a")).unwrap();
    assert_eq!(one(&context, "a").as_url().map(|u| u.as_str()), Some("https://example.com/path"));
    let err = parse_for_input("nope", Element::url("a")).unwrap_err();
    assert_eq!(err.message(), "Invalid URL: nope");

    let context = parse_for_input("127.0.0.1", Element::ip("a")).unwrap();
    assert_eq!(one(&context, "a").as_ip().map(|ip| ip.to_string()).as_deref(), Some("127.0.0.1"));
    let err = parse_for_input("localhost", Element::ip("a")).unwrap_err();
    assert_eq!(err.message(), "Invalid IP address: localhost");
}

#[test]
fn date_times() {
    let context = parse_for_input("2024-05-06T07:08:09", Element::date_time("a")).unwrap();
    assert_eq!(one(&context, "a").as_date_time().unwrap().to_string(), "2024-05-06 07:08:09");

    let context = parse_for_input("2024-05-06", Element::date_time("a")).unwrap();
    assert_eq!(one(&context, "a").as_date_time().unwrap().to_string(), "2024-05-06 00:00:00");

    let err = parse_for_input("yesterday", Element::date_time("a")).unwrap_err();
    assert_eq!(err.message(), "Invalid date-time: yesterday");
}

#[test]
fn date_time_or_now_falls_back() {
    let context = parse_for_input("", Element::date_time_or_now("a")).unwrap();
    assert!(one(&context, "a").as_date_time().is_some());

    let element = Element::seq([Element::date_time_or_now("a"), Element::string("b")]);
    let context = parse_for_input("later", element).unwrap();
    assert!(one(&context, "a").as_date_time().is_some());
    assert_eq!(one(&context, "b").as_str(), Some("later"));
}

#[test]
fn durations() {
    for (input, expected) in [
        ("90m", TimeDelta::minutes(90)),
        ("1d2h", TimeDelta::hours(26)),
        ("PT30S", TimeDelta::seconds(30)),
        ("3d", TimeDelta::days(3)),
    ] {
        let context = parse_for_input(input, Element::duration("a")).unwrap();
        assert_eq!(one(&context, "a").as_duration(), Some(expected), "parsing {input}");
    }
    let err = parse_for_input("soon", Element::duration("a")).unwrap_err();
    assert_eq!(err.message(), "Invalid duration: soon");
}

#[test]
fn remaining_joined_strings() {
    let context = parse_for_input("one  \"two three\" four", Element::remaining_joined_strings("a")).unwrap();
    assert_eq!(one(&context, "a").as_str(), Some("one two three four"));

    let context = parse_for_input("one  \"two three\" four", Element::remaining_raw_joined_strings("a")).unwrap();
    assert_eq!(one(&context, "a").as_str(), Some("one  \"two three\" four"));
}

#[test]
fn mark_true_consumes_nothing() {
    let element = Element::seq([Element::mark_true("flag"), Element::string("s")]);
    let context = parse_for_input("x", element).unwrap();
    assert_eq!(one(&context, "flag"), &Value::Bool(true));
}
