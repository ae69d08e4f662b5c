//! Recursive descent parser from JSON text to [`Value`].
//!
//! Every grammar rule is a `Parser`. Given a cursor into the text a rule
//! either
//!
//! - matches, returning the advanced cursor and the value it built,
//! - misses, returning the cursor it was given and an absent value, or
//! - fails with an [`Error`] once it has seen enough to know the input is
//!   malformed.
//!
//! A miss is not an error: `AnyValue` relies on it to try each rule in
//! turn. Rules commit as soon as their opening lexeme matches, so `[1,` or
//! `"abc` fail outright rather than falling through to the next alternative.

use std::collections::BTreeMap;
use std::fmt;

use crate::lexer::prelude::*;
use crate::limits::Limits;
use crate::value::Value;

/// The grammar rules, used to say where a parse failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Map,
    Any,
    Document,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rule::Null => "null",
            Rule::Boolean => "boolean",
            Rule::Number => "number",
            Rule::String => "string",
            Rule::Array => "array",
            Rule::Map => "map",
            Rule::Any => "value",
            Rule::Document => "document",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{rule} at offset {offset}: {source}")]
    Expected {
        rule: Rule,
        offset: usize,
        #[source]
        source: LexError,
    },
    #[error("{rule} at offset {offset}: expected a value")]
    MissingValue { rule: Rule, offset: usize },
    #[error("map at offset {offset}: expected a key")]
    MissingKey { offset: usize },
    #[error("map at offset {offset}: empty key")]
    EmptyKey { offset: usize },
    #[error("map at offset {offset}: duplicate key \"{key}\"")]
    DuplicateKey { offset: usize, key: String },
    #[error("number at offset {offset}: cannot convert \"{text}\"")]
    InvalidNumber { offset: usize, text: String },
    #[error("{rule} at offset {offset}: nesting exceeds {limit} levels")]
    TooDeep {
        rule: Rule,
        offset: usize,
        limit: usize,
    },
    #[error("no JSON value at offset {offset}")]
    NoValue { offset: usize },
    #[error("unexpected trailing input at offset {offset}")]
    TrailingInput { offset: usize },
}

impl Error {
    /// Byte offset into the input where the problem was found.
    pub fn offset(&self) -> usize {
        match self {
            Error::Expected { offset, .. }
            | Error::MissingValue { offset, .. }
            | Error::MissingKey { offset }
            | Error::EmptyKey { offset }
            | Error::DuplicateKey { offset, .. }
            | Error::InvalidNumber { offset, .. }
            | Error::TooDeep { offset, .. }
            | Error::NoValue { offset }
            | Error::TrailingInput { offset } => *offset,
        }
    }

    /// The rule that rejected the input.
    pub fn rule(&self) -> Rule {
        match self {
            Error::Expected { rule, .. }
            | Error::MissingValue { rule, .. }
            | Error::TooDeep { rule, .. } => *rule,
            Error::MissingKey { .. } | Error::EmptyKey { .. } | Error::DuplicateKey { .. } => {
                Rule::Map
            }
            Error::InvalidNumber { .. } => Rule::Number,
            Error::NoValue { .. } | Error::TrailingInput { .. } => Rule::Document,
        }
    }
}

/// The lexemes of the grammar, built once per parse.
struct Lexicon {
    whitespace: RcLexer,
    null: RcLexer,
    true_: RcLexer,
    false_: RcLexer,
    minus: RcLexer,
    digits: RcLexer,
    dot: RcLexer,
    quote: RcLexer,
    string_body: RcLexer,
    open_bracket: RcLexer,
    close_bracket: RcLexer,
    open_brace: RcLexer,
    close_brace: RcLexer,
    comma: RcLexer,
    colon: RcLexer,
}

impl Lexicon {
    fn new() -> Self {
        let quote = is('"');
        Self {
            whitespace: many(one_of(" \t\n")),
            null: exact("null"),
            true_: exact("true"),
            false_: exact("false"),
            minus: is('-'),
            digits: label(some(char_range('0', '9')), "a digit"),
            dot: is('.'),
            // A backslash always takes the next character with it.
            string_body: many_until(alt(&[seq(&[is('\\'), any()]), any()]), quote.clone()),
            quote: label(quote, "a closing '\"'"),
            open_bracket: is('['),
            close_bracket: label(is(']'), "',' or ']'"),
            open_brace: is('{'),
            close_brace: label(is('}'), "',' or '}'"),
            comma: is(','),
            colon: is(':'),
        }
    }
}

/// A position in the input.
///
/// Cursors are values: advancing returns a new cursor, so backtracking is
/// just going on with an older one.
#[derive(Clone, Copy)]
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
    limits: Limits,
    lexicon: &'a Lexicon,
}

impl<'a> Cursor<'a> {
    /// Byte offset from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.text.len()
    }

    fn advance(self, len: usize) -> Self {
        Self {
            pos: self.pos + len,
            ..self
        }
    }

    /// Skips spaces, tabs and newlines. Never fails.
    pub fn skip(self) -> Self {
        let len = self.lexicon.whitespace.lex(self.rest()).unwrap_or(0);
        self.advance(len)
    }

    /// Input consumed between `self` and the later cursor `end`.
    fn slice_to(&self, end: Cursor<'a>) -> &'a str {
        &self.text[self.pos..end.pos]
    }

    /// Consumes `lexer` if it matches here.
    fn eat(self, lexer: &RcLexer) -> Option<Self> {
        lexer.lex(self.rest()).map(|len| self.advance(len))
    }

    /// Consumes `lexer`, failing the parse if it does not match here.
    fn expect(self, rule: Rule, lexer: &RcLexer) -> Result<Self, Error> {
        lexer
            .lex_result(self.rest())
            .map(|len| self.advance(len))
            .map_err(|source| Error::Expected {
                rule,
                offset: self.pos,
                source,
            })
    }

    /// Enters an array or map.
    fn descend(self, rule: Rule) -> Result<Self, Error> {
        let depth = self.depth + 1;
        if !self.limits.allows_depth(depth) {
            return Err(Error::TooDeep {
                rule,
                offset: self.pos,
                limit: self.limits.max_depth.unwrap_or(usize::MAX),
            });
        }
        Ok(Self { depth, ..self })
    }

    fn ascend(self) -> Self {
        Self {
            depth: self.depth.saturating_sub(1),
            ..self
        }
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.pos)
            .field("depth", &self.depth)
            .field("rest", &self.rest())
            .finish()
    }
}

/// Outcome of a rule that matched or missed.
pub(crate) type Step<'a> = (Cursor<'a>, Value);

pub(crate) trait Parser {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> Result<Step<'a>, Error>;

    fn rule(&self) -> Rule;
}

fn miss(cursor: Cursor<'_>) -> Result<Step<'_>, Error> {
    Ok((cursor, Value::absent()))
}

pub(crate) struct NullLit;

impl Parser for NullLit {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> Result<Step<'a>, Error> {
        match cursor.skip().eat(&cursor.lexicon.null) {
            Some(next) => Ok((next, Value::null())),
            None => miss(cursor),
        }
    }

    fn rule(&self) -> Rule {
        Rule::Null
    }
}

pub(crate) struct BooleanLit;

impl Parser for BooleanLit {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> Result<Step<'a>, Error> {
        let start = cursor.skip();
        if let Some(next) = start.eat(&cursor.lexicon.true_) {
            return Ok((next, Value::from(true)));
        }
        if let Some(next) = start.eat(&cursor.lexicon.false_) {
            return Ok((next, Value::from(false)));
        }
        miss(cursor)
    }

    fn rule(&self) -> Rule {
        Rule::Boolean
    }
}

/// `-?[0-9]+(\.[0-9]+)?`
///
/// Input that starts with neither `-` nor a digit is a miss. Once either is
/// seen the number must be complete: a lone `-` or a `.` without digits
/// after it fails the parse.
pub(crate) struct NumberLit;

impl Parser for NumberLit {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> Result<Step<'a>, Error> {
        let lexicon = cursor.lexicon;
        let start = cursor.skip();
        let signed = start.eat(&lexicon.minus);
        if signed.is_none() && start.eat(&lexicon.digits).is_none() {
            return miss(cursor);
        }

        let integral = signed
            .unwrap_or(start)
            .expect(self.rule(), &lexicon.digits)?;
        let (end, fractional) = match integral.eat(&lexicon.dot) {
            Some(after_dot) => (after_dot.expect(self.rule(), &lexicon.digits)?, true),
            None => (integral, false),
        };

        let text = start.slice_to(end);
        let number = if fractional {
            text.parse::<f64>().ok()
        } else {
            // Integers too wide for i64 still have a float value.
            text.parse::<i64>()
                .map(|n| n as f64)
                .or_else(|_| text.parse::<f64>())
                .ok()
        };
        match number {
            Some(n) => Ok((end, Value::from(n))),
            None => Err(Error::InvalidNumber {
                offset: start.position(),
                text: text.to_string(),
            }),
        }
    }

    fn rule(&self) -> Rule {
        Rule::Number
    }
}

/// A double-quoted string, kept exactly as written.
///
/// Escapes are not decoded; a backslash only stops the character after it
/// from ending the string.
pub(crate) struct StringLit;

impl StringLit {
    /// The raw text between the quotes, or `None` on a miss.
    fn scan<'a>(&self, cursor: Cursor<'a>) -> Result<Option<(Cursor<'a>, &'a str)>, Error> {
        let lexicon = cursor.lexicon;
        let open = match cursor.skip().eat(&lexicon.quote) {
            Some(open) => open,
            None => return Ok(None),
        };
        let body_end = open.eat(&lexicon.string_body).unwrap_or(open);
        let close = body_end.expect(self.rule(), &lexicon.quote)?;
        Ok(Some((close, open.slice_to(body_end))))
    }
}

impl Parser for StringLit {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> Result<Step<'a>, Error> {
        match self.scan(cursor)? {
            Some((next, text)) => Ok((next, Value::from(text))),
            None => miss(cursor),
        }
    }

    fn rule(&self) -> Rule {
        Rule::String
    }
}

/// `[` values separated by `,` `]`. A value is required after every comma.
pub(crate) struct ArrayLit;

impl Parser for ArrayLit {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> Result<Step<'a>, Error> {
        let lexicon = cursor.lexicon;
        let inner = match cursor.skip().eat(&lexicon.open_bracket) {
            Some(inner) => inner.descend(self.rule())?,
            None => return miss(cursor),
        };

        let mut items = Vec::new();
        let (mut next, first) = AnyValue.parse(inner)?;
        if !first.is_absent() {
            items.push(first);
            while let Some(after_comma) = next.skip().eat(&lexicon.comma) {
                let (after_item, item) = AnyValue.parse(after_comma)?;
                if item.is_absent() {
                    return Err(Error::MissingValue {
                        rule: self.rule(),
                        offset: after_comma.skip().position(),
                    });
                }
                items.push(item);
                next = after_item;
            }
        }

        let end = next.skip().expect(self.rule(), &lexicon.close_bracket)?;
        Ok((end.ascend(), Value::array(items)))
    }

    fn rule(&self) -> Rule {
        Rule::Array
    }
}

/// `{` `"key" : value` members separated by `,` `}`.
///
/// Keys must be non-empty and unique, and a member is required after every
/// comma.
pub(crate) struct MapLit;

impl MapLit {
    fn member<'a>(
        &self,
        cursor: Cursor<'a>,
        entries: &mut BTreeMap<String, Value>,
    ) -> Result<Option<Cursor<'a>>, Error> {
        let lexicon = cursor.lexicon;
        let key_start = cursor.skip();
        let (after_key, key) = match StringLit.scan(cursor)? {
            Some(scanned) => scanned,
            None => return Ok(None),
        };
        if key.is_empty() {
            return Err(Error::EmptyKey {
                offset: key_start.position(),
            });
        }

        let after_colon = after_key.skip().expect(self.rule(), &lexicon.colon)?;
        let (after_value, value) = AnyValue.parse(after_colon)?;
        if value.is_absent() {
            return Err(Error::MissingValue {
                rule: self.rule(),
                offset: after_colon.skip().position(),
            });
        }
        if entries.contains_key(key) {
            return Err(Error::DuplicateKey {
                offset: key_start.position(),
                key: key.to_string(),
            });
        }
        entries.insert(key.to_string(), value);
        Ok(Some(after_value))
    }
}

impl Parser for MapLit {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> Result<Step<'a>, Error> {
        let lexicon = cursor.lexicon;
        let inner = match cursor.skip().eat(&lexicon.open_brace) {
            Some(inner) => inner.descend(self.rule())?,
            None => return miss(cursor),
        };

        let mut entries = BTreeMap::new();
        let mut next = inner;
        if let Some(after_first) = self.member(inner, &mut entries)? {
            next = after_first;
            while let Some(after_comma) = next.skip().eat(&lexicon.comma) {
                next = self.member(after_comma, &mut entries)?.ok_or(Error::MissingKey {
                    offset: after_comma.skip().position(),
                })?;
            }
        }

        let end = next.skip().expect(self.rule(), &lexicon.close_brace)?;
        Ok((end.ascend(), Value::map(entries)))
    }

    fn rule(&self) -> Rule {
        Rule::Map
    }
}

const ALTERNATIVES: [&dyn Parser; 6] = [
    &NullLit,
    &BooleanLit,
    &NumberLit,
    &StringLit,
    &ArrayLit,
    &MapLit,
];

/// Tries each rule in turn: null, boolean, number, string, array, map.
pub(crate) struct AnyValue;

impl Parser for AnyValue {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> Result<Step<'a>, Error> {
        for parser in ALTERNATIVES.iter() {
            let (next, value) = parser.parse(cursor)?;
            if !value.is_absent() {
                return Ok((next, value));
            }
        }
        miss(cursor)
    }

    fn rule(&self) -> Rule {
        Rule::Any
    }
}

/// Parses a complete JSON document with the default [`Limits`].
///
/// Documents nested deeper than [`DEFAULT_MAX_DEPTH`] fail with
/// [`Error::TooDeep`] even when well formed. Use
/// `parse_with_limits(text, Limits::unlimited())` to read them.
///
/// [`DEFAULT_MAX_DEPTH`]: crate::limits::DEFAULT_MAX_DEPTH
pub fn parse(text: &str) -> Result<Value, Error> {
    parse_with_limits(text, Limits::default())
}

/// Parses a complete JSON document.
///
/// The document is a single value, optionally surrounded by whitespace.
pub fn parse_with_limits(text: &str, limits: Limits) -> Result<Value, Error> {
    let lexicon = Lexicon::new();
    let start = Cursor {
        text,
        pos: 0,
        depth: 0,
        limits,
        lexicon: &lexicon,
    };

    let (next, value) = AnyValue.parse(start)?;
    if value.is_absent() {
        return Err(Error::NoValue {
            offset: start.skip().position(),
        });
    }
    let end = next.skip();
    if !end.is_at_end() {
        return Err(Error::TrailingInput {
            offset: end.position(),
        });
    }
    Ok(value)
}

impl std::str::FromStr for Value {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
