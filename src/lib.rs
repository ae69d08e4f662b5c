//! A small JSON document model.
//!
//! [`Value`] holds any JSON value plus an `Absent` sentinel for "nothing
//! here". Values are built from Rust literals and collections or read from
//! text with [`parse`], and written back out with [`Value::stringify`].
//!
//! ```
//! use jsontree::{parse, Value};
//!
//! let doc = Value::new();
//! doc.set("a", true)?;
//! doc.set("b", vec![1, 2])?;
//! assert_eq!(doc.stringify()?, r#"{"a":true,"b":[1.0,2.0]}"#);
//!
//! let back = parse(&doc.stringify()?)?;
//! assert_eq!(back.get("b")?.at(1)?.as_f64()?, 2.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use std::ops::{Bound, RangeBounds};

pub mod lexer;
pub mod limits;
pub mod parser;
pub mod stringify;
pub mod value;

pub use lexer::Error as LexError;
pub use limits::Limits;
pub use parser::{parse, parse_with_limits, Error as ParseError, Rule};
pub use value::{Absent, Entry, Error as ValueError, Kind, Null, Value};

/// Converts range bounds into `(min, exclusive max)`.
fn get_bounds(bounds: impl RangeBounds<usize>) -> (usize, Option<usize>) {
    let min = match bounds.start_bound() {
        Bound::Included(n) => *n,
        Bound::Excluded(n) => *n + 1,
        Bound::Unbounded => 0,
    };
    let max = match bounds.end_bound() {
        Bound::Included(n) => n.checked_add(1),
        Bound::Excluded(n) => Some(*n),
        Bound::Unbounded => None,
    };
    (min, max)
}
