//! Parser configuration.
//!
//! The grammar is recursive, so every nested array or map costs stack. The
//! nesting bound turns pathological input into an ordinary parse error
//! instead of a stack overflow.

/// Nesting depth allowed by [`Limits::default`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Bounds enforced while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of arrays/maps open at once, `None` for no bound.
    pub max_depth: Option<usize>,
}

impl Limits {
    pub const fn new(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }

    /// No nesting bound. Deep enough input will exhaust the stack.
    pub const fn unlimited() -> Self {
        Self { max_depth: None }
    }

    /// Whether `depth` open containers are within bounds.
    pub fn allows_depth(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
