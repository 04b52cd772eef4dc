//! Input tokenization.
//!
//! Splits a raw argument string into positioned [`Token`]s. Offsets are
//! character indices into the original input so that parse errors can point
//! back at the text the user typed.

use cmdweave_foundation::ArgumentParseError;

const DOUBLE_QUOTE: char = '"';
const SINGLE_QUOTE: char = '\'';
const BACKSLASH: char = '\\';

/// One positioned lexical unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// The token text, with quotes and escapes resolved.
    pub value: String,
    /// Character offset where the token starts.
    pub start: usize,
    /// Character offset just past the token's last character.
    pub end: usize,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            value: value.into(),
            start,
            end,
        }
    }
}

/// Options for the quote-aware tokenizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotedStrings {
    /// Treat `'` and `"` at the start of a token as quote delimiters.
    pub handle_quoted_strings: bool,
    /// Never fail on an unterminated quote, even outside completion.
    pub force_lenient: bool,
    /// Swallow whitespace after the last token instead of emitting an
    /// empty trailing token.
    pub trim_trailing_space: bool,
}

impl Default for QuotedStrings {
    fn default() -> Self {
        Self {
            handle_quoted_strings: true,
            force_lenient: false,
            trim_trailing_space: false,
        }
    }
}

/// Strategy used to turn an argument string into tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputTokenizer {
    /// Whitespace-separated tokens with quoting and backslash escapes.
    Quoted(QuotedStrings),
    /// Splits on single spaces; no quoting.
    SpaceSplit,
    /// The whole input as one token.
    RawInput,
}

impl Default for InputTokenizer {
    fn default() -> Self {
        Self::quoted_strings(false)
    }
}

impl InputTokenizer {
    /// Quote-aware tokenizer. With `force_lenient`, unterminated quotes
    /// never fail.
    #[must_use]
    pub fn quoted_strings(force_lenient: bool) -> Self {
        Self::Quoted(QuotedStrings {
            force_lenient,
            ..QuotedStrings::default()
        })
    }

    /// Tokenizer that splits on spaces.
    #[must_use]
    pub const fn space_split() -> Self {
        Self::SpaceSplit
    }

    /// Tokenizer that returns the input as a single token.
    #[must_use]
    pub const fn raw_input() -> Self {
        Self::RawInput
    }

    /// Tokenizes `input`.
    ///
    /// `lenient` is set while computing completions, where an unfinished
    /// quote is expected and must not fail.
    ///
    /// # Errors
    ///
    /// Returns a positioned error for an unterminated quote or a trailing
    /// backslash, unless running leniently.
    pub fn tokenize(&self, input: &str, lenient: bool) -> Result<Vec<Token>, ArgumentParseError> {
        match self {
            Self::Quoted(options) => tokenize_quoted(*options, input, lenient),
            Self::SpaceSplit => Ok(tokenize_space_split(input)),
            Self::RawInput => Ok(vec![Token::new(input, 0, input.chars().count())]),
        }
    }
}

struct TokenizerState<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
    lenient: bool,
}

impl<'a> TokenizerState<'a> {
    fn new(input: &'a str, lenient: bool) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
            lenient,
        }
    }

    fn has_more(&self) -> bool {
        self.pos < self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<char, ArgumentParseError> {
        let c = self
            .peek()
            .ok_or_else(|| self.error("Buffer overrun while parsing args"))?;
        self.pos += 1;
        Ok(c)
    }

    /// Error positioned at the last consumed character.
    fn error(&self, message: &str) -> ArgumentParseError {
        ArgumentParseError::new(message, self.input, self.pos.saturating_sub(1))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }
}

fn tokenize_quoted(
    options: QuotedStrings,
    input: &str,
    lenient: bool,
) -> Result<Vec<Token>, ArgumentParseError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut state = TokenizerState::new(input, lenient || options.force_lenient);
    let mut tokens = Vec::new();
    if options.trim_trailing_space {
        state.skip_whitespace();
    }
    while state.has_more() {
        if !options.trim_trailing_space {
            state.skip_whitespace();
        }
        let start = state.pos;
        let value = next_arg(&mut state, options.handle_quoted_strings)?;
        tokens.push(Token::new(value, start, state.pos));
        if options.trim_trailing_space {
            state.skip_whitespace();
        }
    }
    Ok(tokens)
}

fn next_arg(state: &mut TokenizerState<'_>, handle_quotes: bool) -> Result<String, ArgumentParseError> {
    let mut arg = String::new();
    match state.peek() {
        Some(quote @ (DOUBLE_QUOTE | SINGLE_QUOTE)) if handle_quotes => {
            parse_quoted(state, quote, &mut arg)?;
        }
        Some(_) => parse_unquoted(state, &mut arg)?,
        None => {}
    }
    Ok(arg)
}

fn parse_quoted(
    state: &mut TokenizerState<'_>,
    quote: char,
    arg: &mut String,
) -> Result<(), ArgumentParseError> {
    state.next()?;
    loop {
        match state.peek() {
            None if state.lenient => return Ok(()),
            None => return Err(state.error("Unterminated quoted string found")),
            Some(c) if c == quote => {
                state.pos += 1;
                return Ok(());
            }
            Some(BACKSLASH) => parse_escape(state, arg)?,
            Some(c) => {
                state.pos += 1;
                arg.push(c);
            }
        }
    }
}

fn parse_unquoted(state: &mut TokenizerState<'_>, arg: &mut String) -> Result<(), ArgumentParseError> {
    while let Some(c) = state.peek() {
        if c.is_whitespace() {
            break;
        }
        if c == BACKSLASH {
            parse_escape(state, arg)?;
        } else {
            state.pos += 1;
            arg.push(c);
        }
    }
    Ok(())
}

/// Consumes a backslash and appends the following character literally.
fn parse_escape(state: &mut TokenizerState<'_>, arg: &mut String) -> Result<(), ArgumentParseError> {
    state.next()?;
    if !state.has_more() && state.lenient {
        return Ok(());
    }
    arg.push(state.next()?);
    Ok(())
}

fn tokenize_space_split(input: &str) -> Vec<Token> {
    if input.chars().all(|c| c == ' ') {
        return Vec::new();
    }
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut pieces = input.split(' ').peekable();
    while let Some(piece) = pieces.next() {
        let len = piece.chars().count();
        let last = pieces.peek().is_none();
        if !piece.is_empty() || last {
            tokens.push(Token::new(piece, offset, offset + len));
        }
        offset += len + 1;
    }
    tokens
}
