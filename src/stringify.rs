//! Serialization of [`Value`] trees back to JSON text.
//!
//! Strings are written between quotes exactly as stored, without escaping,
//! so a string holding `"` does not survive a round trip. Absent elements and
//! entries are left out of their container.

use crate::value::{Error, Value, Variant};

impl Value {
    /// Renders this value as JSON text.
    ///
    /// Fails with [`Error::Absent`] if the value itself is absent; absent
    /// values nested in arrays or maps are skipped instead.
    pub fn stringify(&self) -> Result<String, Error> {
        let mut out = String::new();
        self.write_json(&mut out)?;
        Ok(out)
    }

    fn write_json(&self, out: &mut String) -> Result<(), Error> {
        match self.variant() {
            Variant::Absent => return Err(Error::Absent),
            Variant::Null => out.push_str("null"),
            Variant::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Variant::Number(n) => out.push_str(&format_number(*n)),
            Variant::String(s) => write_quoted(out, s),
            Variant::Array(items) => {
                out.push('[');
                let mut first = true;
                for item in items.borrow().iter().filter(|v| !v.is_absent()) {
                    if !first {
                        out.push(',');
                    }
                    first = false;
                    item.write_json(out)?;
                }
                out.push(']');
            }
            Variant::Map(entries) => {
                out.push('{');
                let mut first = true;
                for (name, item) in entries.borrow().iter().filter(|(_, v)| !v.is_absent()) {
                    if !first {
                        out.push(',');
                    }
                    first = false;
                    write_quoted(out, name);
                    out.push(':');
                    item.write_json(out)?;
                }
                out.push('}');
            }
        }
        Ok(())
    }
}

fn write_quoted(out: &mut String, text: &str) {
    out.push('"');
    out.push_str(text);
    out.push('"');
}

/// Formats a number the way the parser reads it back.
///
/// `Display` for `f64` gives the shortest digits that round-trip and never
/// uses an exponent, which the grammar has no syntax for. A `.0` is appended
/// to integral values so every number is written in floating form. JSON has
/// no spelling for NaN or the infinities; they are written as `null`.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    let mut text = n.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}
