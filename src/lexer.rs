//! Character-level scanning combinators.
//!
//! A [`Lexer`] looks at the front of its input and reports how many bytes it
//! recognises. `None` is a soft miss: the caller is free to try something
//! else. [`Lexer::lex_result`] turns a miss into a hard [`Error`] for places
//! where the grammar has already committed.

use std::ops::RangeBounds;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("expected {0}")]
    Expected(String),
}

pub trait Lexer {
    /// Length in bytes of the lexeme at the start of `input`, if any.
    fn lex(&self, input: &str) -> Option<usize>;

    /// Human readable description of what this lexer accepts.
    fn expected(&self) -> String;

    fn lex_result(&self, input: &str) -> Result<usize, Error> {
        self.lex(input)
            .ok_or_else(|| Error::Expected(self.expected()))
    }
}

pub type RcLexer = Rc<dyn Lexer>;

fn first_char_if(input: &str, accept: impl FnOnce(char) -> bool) -> Option<usize> {
    input
        .chars()
        .next()
        .filter(|&c| accept(c))
        .map(char::len_utf8)
}

pub struct Is(char);

impl Lexer for Is {
    fn lex(&self, input: &str) -> Option<usize> {
        first_char_if(input, |c| c == self.0)
    }

    fn expected(&self) -> String {
        format!("'{}'", self.0)
    }
}

pub fn is(c: char) -> RcLexer {
    Rc::new(Is(c))
}

pub struct Exact(String);

impl Lexer for Exact {
    fn lex(&self, input: &str) -> Option<usize> {
        input.starts_with(&self.0).then(|| self.0.len())
    }

    fn expected(&self) -> String {
        format!("\"{}\"", &self.0)
    }
}

pub fn exact(string: impl AsRef<str>) -> RcLexer {
    Rc::new(Exact(string.as_ref().to_string()))
}

/// Joins `items` with `sep`, using `last_sep` before the final item.
fn join_with_last<S: ToString>(items: impl AsRef<[S]>, sep: &str, last_sep: &str) -> String {
    let items = items.as_ref();
    let mut buf = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push_str(if i + 1 == items.len() { last_sep } else { sep });
        }
        buf.push_str(&item.to_string());
    }
    buf
}

pub struct OneOf(String);

impl Lexer for OneOf {
    fn lex(&self, input: &str) -> Option<usize> {
        first_char_if(input, |c| self.0.contains(c))
    }

    fn expected(&self) -> String {
        format!(
            "one of {}",
            join_with_last(
                self.0
                    .chars()
                    .map(|c| format!("{:?}", c))
                    .collect::<Vec<_>>(),
                ", ",
                ", or ",
            )
        )
    }
}

pub fn one_of(chars: impl AsRef<str>) -> RcLexer {
    Rc::new(OneOf(chars.as_ref().to_string()))
}

pub struct Any;

impl Lexer for Any {
    fn lex(&self, input: &str) -> Option<usize> {
        first_char_if(input, |_| true)
    }

    fn expected(&self) -> String {
        "any character".to_string()
    }
}

pub fn any() -> RcLexer {
    Rc::new(Any)
}

pub struct CharRange(char, char);

impl Lexer for CharRange {
    fn lex(&self, input: &str) -> Option<usize> {
        first_char_if(input, |c| (self.0..=self.1).contains(&c))
    }

    fn expected(&self) -> String {
        format!("a character between '{}' and '{}'", self.0, self.1)
    }
}

pub fn char_range(start: char, end: char) -> RcLexer {
    Rc::new(CharRange(start, end))
}

pub struct Repeat {
    lexer: RcLexer,
    min: usize,
    max: Option<usize>,
}

impl Lexer for Repeat {
    fn lex(&self, input: &str) -> Option<usize> {
        let mut count = 0;
        let mut len = 0;
        // `max` is exclusive.
        while self.max.map_or(true, |max| count + 1 < max) {
            match self.lexer.lex(&input[len..]) {
                // An empty match would repeat forever.
                Some(0) | None => break,
                Some(n) => {
                    count += 1;
                    len += n;
                }
            }
        }
        (count >= self.min).then(|| len)
    }

    fn expected(&self) -> String {
        let quantity = match self.max {
            Some(max) => format!("between {} and {}", self.min, max.saturating_sub(1)),
            None => format!("at least {}", self.min),
        };
        format!("{} of {}", quantity, self.lexer.expected())
    }
}

pub fn repeat(lexer: RcLexer, bounds: impl RangeBounds<usize>) -> RcLexer {
    let (min, max) = crate::get_bounds(bounds);
    Rc::new(Repeat { lexer, min, max })
}

pub fn some(lexer: RcLexer) -> RcLexer {
    repeat(lexer, 1..)
}

pub fn many(lexer: RcLexer) -> RcLexer {
    repeat(lexer, ..)
}

pub struct Alt(Vec<RcLexer>);

impl Lexer for Alt {
    fn lex(&self, input: &str) -> Option<usize> {
        self.0.iter().find_map(|lexer| lexer.lex(input))
    }

    fn expected(&self) -> String {
        join_with_last(
            self.0.iter().map(|l| l.expected()).collect::<Vec<_>>(),
            ", ",
            ", or ",
        )
    }
}

pub fn alt(lexers: impl AsRef<[RcLexer]>) -> RcLexer {
    Rc::new(Alt(lexers.as_ref().into()))
}

pub struct Seq(Vec<RcLexer>);

impl Lexer for Seq {
    fn lex(&self, input: &str) -> Option<usize> {
        let mut len = 0;
        for lexer in &self.0 {
            len += lexer.lex(&input[len..])?;
        }
        Some(len)
    }

    fn expected(&self) -> String {
        join_with_last(
            self.0.iter().map(|l| l.expected()).collect::<Vec<_>>(),
            " followed by ",
            " followed by ",
        )
    }
}

pub fn seq(lexers: impl AsRef<[RcLexer]>) -> RcLexer {
    Rc::new(Seq(lexers.as_ref().into()))
}

struct Reject(RcLexer);

impl Lexer for Reject {
    fn lex(&self, input: &str) -> Option<usize> {
        self.0.lex(input).is_none().then(|| 0)
    }

    fn expected(&self) -> String {
        format!("anything but {}", self.0.expected())
    }
}

/// Zero-width lexer that matches only where `lexer` does not.
pub fn reject(lexer: RcLexer) -> RcLexer {
    Rc::new(Reject(lexer))
}

pub fn many_until(lexer: RcLexer, stop_before: RcLexer) -> RcLexer {
    many(seq(&[reject(stop_before), lexer]))
}

struct Label(RcLexer, String);

impl Lexer for Label {
    fn lex(&self, input: &str) -> Option<usize> {
        self.0.lex(input)
    }

    fn expected(&self) -> String {
        self.1.clone()
    }
}

/// Replaces the description reported by `lexer` when it misses.
pub fn label(lexer: RcLexer, description: impl Into<String>) -> RcLexer {
    Rc::new(Label(lexer, description.into()))
}

pub mod prelude {
    pub use super::{
        alt,
        any,
        char_range,
        exact,
        is,
        label,
        many,
        many_until,
        one_of,
        reject,
        repeat,
        seq,
        some,
        Error as LexError,
        Lexer,
        RcLexer,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use test_case::test_case;

    #[test]
    fn is_counts_utf8_width() {
        assert_eq!(is('é').lex("étoile"), Some(2));
        assert_eq!(is('e').lex("étoile"), None);
        assert_eq!(any().lex("ß"), Some(2));
        assert_eq!(any().lex(""), None);
    }

    #[test]
    fn exact_matches_prefix_only() {
        assert_eq!(exact("null").lex("null,"), Some(4));
        assert_eq!(exact("null").lex("nul"), None);
        assert_eq!(exact("true").lex(" true"), None);
    }

    #[test_case("", Some(0) ; "empty input")]
    #[test_case("  \t\nx", Some(4) ; "stops at first non blank")]
    #[test_case("\r\n", Some(0) ; "carriage return is not blank")]
    fn many_one_of(input: &str, expected: Option<usize>) {
        assert_eq!(many(one_of(" \t\n")).lex(input), expected);
    }

    #[test]
    fn repeat_respects_bounds() {
        let digit = char_range('0', '9');
        assert_eq!(repeat(digit.clone(), 2..=3).lex("12345"), Some(3));
        assert_eq!(repeat(digit.clone(), 2..=3).lex("1x"), None);
        assert_eq!(some(digit.clone()).lex("x"), None);
        assert_eq!(repeat(digit, ..=1).lex("x"), Some(0));
    }

    #[test]
    fn repeat_of_empty_match_terminates() {
        assert_eq!(many(repeat(is('a'), ..=1)).lex("bbb"), Some(0));
    }

    #[test]
    fn alt_takes_first_match() {
        let lexer = alt(&[exact("ab"), exact("abc")]);
        assert_eq!(lexer.lex("abc"), Some(2));
    }

    #[test]
    fn seq_requires_every_part() {
        let lexer = seq(&[is('-'), some(char_range('0', '9'))]);
        assert_eq!(lexer.lex("-12."), Some(3));
        assert_eq!(lexer.lex("-."), None);
    }

    #[test]
    fn many_until_stops_before_terminator() {
        let body = many_until(alt(&[seq(&[is('\\'), any()]), any()]), is('"'));
        assert_eq!(body.lex(r#"ab\"c" tail"#), Some(5));
        assert_eq!(body.lex(r#"""#), Some(0));
    }

    #[test]
    fn reject_is_zero_width() {
        assert_eq!(reject(is('"')).lex("a"), Some(0));
        assert_eq!(reject(is('"')).lex("\""), None);
        assert_eq!(reject(is('"')).lex(""), Some(0));
    }

    #[test]
    fn lex_result_reports_expectation() {
        let err = one_of("]}").lex_result("x").unwrap_err();
        assert_eq!(err, LexError::Expected("one of ']', or '}'".to_string()));
        assert_eq!(err.to_string(), "expected one of ']', or '}'");
    }

    #[test]
    fn label_overrides_description() {
        let digits = label(some(char_range('0', '9')), "a digit");
        assert_eq!(digits.expected(), "a digit");
        assert_eq!(digits.lex("42"), Some(2));
        assert_eq!(
            some(char_range('0', '9')).expected(),
            "at least 1 of a character between '0' and '9'"
        );
    }
}
