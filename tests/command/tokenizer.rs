//! Integration tests for the input tokenizers

use cmdweave_command::{InputTokenizer, Token};

fn quoted(input: &str) -> Vec<String> {
    InputTokenizer::quoted_strings(false)
        .tokenize(input, false)
        .unwrap()
        .into_iter()
        .map(|t| t.value)
        .collect()
}

fn space_split(input: &str) -> Vec<String> {
    InputTokenizer::space_split()
        .tokenize(input, false)
        .unwrap()
        .into_iter()
        .map(|t| t.value)
        .collect()
}

// =============================================================================
// Quoted strings
// =============================================================================

#[test]
fn quoted_flag_string() {
    assert_eq!(
        quoted("-abc value something --a=b -- pure strings"),
        vec!["-abc", "value", "something", "--a=b", "--", "pure", "strings"]
    );
}

#[test]
fn quoted_single_and_double() {
    assert_eq!(
        quoted("a 'single quoted string' is here"),
        vec!["a", "single quoted string", "is", "here"]
    );
    assert_eq!(
        quoted("a \"double quoted string\" is here"),
        vec!["a", "double quoted string", "is", "here"]
    );
}

#[test]
fn quoted_unterminated_renders_caret() {
    let err = InputTokenizer::quoted_strings(false)
        .tokenize("an \"unterminated quoted string is bad", false)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unterminated quoted string found\n\
         an \"unterminated quoted string is bad\n                                    ^"
    );
}

#[test]
fn quoted_escapes() {
    assert_eq!(
        quoted("this demonstrates\\ escapes \\\"of 'various' characters'"),
        vec!["this", "demonstrates escapes", "\"of", "various", "characters'"]
    );
}

#[test]
fn quoted_trailing_space() {
    assert_eq!(
        quoted("a test argument string "),
        vec!["a", "test", "argument", "string", ""]
    );
}

#[test]
fn quoted_token_offsets() {
    let tokens = InputTokenizer::default().tokenize("go 'to there' now", false).unwrap();
    assert_eq!(tokens[1], Token::new("to there", 3, 13));
    assert_eq!(tokens[2], Token::new("now", 14, 17));
}

// =============================================================================
// Space split
// =============================================================================

#[test]
fn space_split_table() {
    let cases: &[(&str, &[&str])] = &[
        ("", &[]),
        (" ", &[]),
        ("first second third", &["first", "second", "third"]),
        ("first second third ", &["first", "second", "third", ""]),
        ("first second  third", &["first", "second", "third"]),
        ("first second  third ", &["first", "second", "third", ""]),
        (
            "-abc value something --a=b -- pure strings",
            &["-abc", "value", "something", "--a=b", "--", "pure", "strings"],
        ),
        (
            "a 'single quoted string' is here",
            &["a", "'single", "quoted", "string'", "is", "here"],
        ),
        (
            "a \"double quoted string\" is here",
            &["a", "\"double", "quoted", "string\"", "is", "here"],
        ),
        (
            "an \"unterminated quoted string is okay",
            &["an", "\"unterminated", "quoted", "string", "is", "okay"],
        ),
        ("a test argument string ", &["a", "test", "argument", "string", ""]),
    ];
    for (input, expected) in cases {
        assert_eq!(space_split(input), *expected, "input {input:?}");
    }
}

#[test]
fn raw_input_is_one_token() {
    let tokens = InputTokenizer::raw_input().tokenize("  keep   everything ", false).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].value, "  keep   everything ");
}
