//! Tab completion across optional elements, sequences, and flags

use cmdweave_command::{
    BufferedSource, CommandArgs, CommandContext, CommandFlags, Element, InputTokenizer,
};

fn choices(key: &str, names: &[&str]) -> Element {
    Element::choices(key, names.iter().map(|n| (*n, *n)))
}

fn first() -> Element {
    Element::optional_weak(first_not_optional())
}

fn first_not_optional() -> Element {
    choices("first", &["arg", "arg1", "test1"])
}

fn second() -> Element {
    Element::optional_weak(choices("second", &["arg", "arg2", "test2"]))
}

fn second_not_optional() -> Element {
    choices("third", &["arg3", "arg4"])
}

fn third() -> Element {
    Element::optional_weak(choices("third", &["arg3", "arg4"]))
}

fn third_not_optional() -> Element {
    choices("third", &["arg3", "arg4"])
}

fn long_flag(value: Element, child: Element) -> Element {
    CommandFlags::builder().value_flag(value, &["-flag"]).build_with(child)
}

fn complete(element: &Element, input: &str) -> Vec<String> {
    let tokens = InputTokenizer::quoted_strings(false).tokenize(input, true).unwrap();
    let mut args = CommandArgs::new(input, tokens);
    let mut results = element.complete(
        &BufferedSource::new("test"),
        &mut args,
        &mut CommandContext::for_completion(),
    );
    results.sort();
    results
}

fn check(element: &Element, input: &str, expected: &[&str]) {
    let mut expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
    expected.sort();
    assert_eq!(complete(element, input), expected, "completing {input:?}");
}

// =============================================================================
// Optional sequences
// =============================================================================

#[test]
fn optional_sequence_offers_every_position() {
    let element1 = Element::seq([first(), second(), third()]);
    check(&element1, "", &["arg", "arg1", "test1", "arg2", "test2", "arg3", "arg4"]);
    check(&element1, "a", &["arg", "arg1", "arg2", "arg3", "arg4"]);
    check(&element1, "arg a", &["arg", "arg2", "arg3", "arg4"]);
    check(&element1, "arg", &["arg", "arg1", "arg2", "arg3", "arg4"]);
    check(&element1, "arg1", &["arg1"]);
    check(&element1, "arg1 arg", &["arg", "arg2", "arg3", "arg4"]);
}

#[test]
fn required_tail_stops_the_union() {
    let element2 = Element::seq([first(), second(), third_not_optional()]);
    check(&element2, "arg", &["arg", "arg1", "arg2", "arg3", "arg4"]);
    check(&element2, "arg1", &["arg1"]);

    let element3 = Element::seq([first(), second_not_optional(), third_not_optional()]);
    check(&element3, "arg a", &["arg3", "arg4"]);
    check(&element3, "arg1", &["arg1"]);
    check(&element3, "arg1 arg", &["arg3", "arg4"]);
}

#[test]
fn zero_width_leading_element() {
    let element4 = Element::seq([
        Element::optional_weak(Element::mark_true("true")),
        first(),
        second(),
    ]);
    check(&element4, "arg1", &["arg1"]);
    check(&element4, "t", &["test1", "test2"]);
}

// =============================================================================
// Flags
// =============================================================================

#[test]
fn long_flag_names() {
    let flag = long_flag(first(), Element::none());
    check(&flag, "--f", &["--flag"]);
}

#[test]
fn short_flag_values() {
    let sflag2 = CommandFlags::builder()
        .value_flag(second_not_optional(), &["f"])
        .build_with(Element::none());
    check(&sflag2, "-f a", &["arg3", "arg4"]);
    check(&sflag2, "-f arg", &["arg3", "arg4"]);
    check(&sflag2, "-f arg4", &["arg4"]);
}

#[test]
fn long_flag_values() {
    let second_flag_not_optional = long_flag(first_not_optional(), second_not_optional());
    let second_flag_int = long_flag(first_not_optional(), Element::integer("int"));
    check(&second_flag_not_optional, "--flag a", &["arg", "arg1"]);
    check(&second_flag_int, "--flag a", &["arg", "arg1"]);
}

#[test]
fn inline_long_flag_values() {
    let second_flag = long_flag(first_not_optional(), second());
    let second_flag_not_optional = long_flag(first_not_optional(), second_not_optional());
    let second_flag_int = long_flag(first_not_optional(), Element::integer("int"));
    let second_flag_with_int = long_flag(Element::integer("int"), second_not_optional());

    check(&second_flag_not_optional, "--flag=a", &["--flag=arg", "--flag=arg1"]);
    check(&second_flag, "--flag=a", &["--flag=arg", "--flag=arg1"]);
    check(&second_flag_int, "--flag=a", &["--flag=arg", "--flag=arg1"]);
    check(&second_flag_with_int, "--flag=a", &[]);
    check(&second_flag, "--flag=b", &[]);
}

#[test]
fn uncompletable_flag_value_falls_through_to_child() {
    let second_flag_with_int = long_flag(Element::integer("int"), second_not_optional());
    check(&second_flag_with_int, "--flag a", &["arg3", "arg4"]);
}

// =============================================================================
// Other elements
// =============================================================================

#[test]
fn first_parsing_unions_alternatives() {
    let element = Element::first_parsing([
        choices("a", &["red", "green"]),
        choices("b", &["green", "grey"]),
    ]);
    check(&element, "g", &["green", "grey"]);
}

#[test]
fn suggestions_wrap_leaves() {
    let element = Element::with_suggestions(
        Element::string("name"),
        vec!["alice".to_string(), "bob".to_string(), "alfred".to_string()],
        true,
    );
    check(&element, "al", &["alfred", "alice"]);
    check(&element, "", &["alfred", "alice", "bob"]);
}

#[test]
fn bool_completion() {
    let element = Element::bool("flag");
    let completions = complete(&element, "y");
    assert_eq!(completions, vec!["y", "yes"]);
}
