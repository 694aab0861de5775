//! Detection of error handlers that all wrap the error the same way.
//!
//! A function where every failing `if <err> != nil { return ..., expr }`
//! returns a structurally identical `expr` could use a single deferred
//! wrapper instead.

use crate::domain::ast::{Expr, Position};
use crate::domain::equal::equal;

/// A trailing expression captured from a failed match.
#[derive(Debug, Clone)]
pub struct Captured {
    pub expr: Expr,
    pub position: Position,
}

/// Per-function accumulator.
#[derive(Debug, Clone)]
pub enum SharedTrailing {
    /// No disqualifying handler seen; holds the expressions captured so far,
    /// all equal to each other.
    Valid(Vec<Captured>),
    Invalid,
}

impl Default for SharedTrailing {
    fn default() -> Self {
        SharedTrailing::Valid(Vec::new())
    }
}

impl SharedTrailing {
    /// Records a handler whose trailing value is `expr` rather than the error
    /// variable. The first expression that differs from the ones captured so
    /// far invalidates the accumulator.
    pub fn record(&mut self, expr: &Expr, position: impl FnOnce() -> Position) {
        let list = match self {
            SharedTrailing::Valid(list) => list,
            SharedTrailing::Invalid => return,
        };
        if let Some(first) = list.first() {
            if !equal(&first.expr, expr) {
                *self = SharedTrailing::Invalid;
                return;
            }
        }
        list.push(Captured {
            expr: expr.clone(),
            position: position(),
        });
    }

    /// Disqualifies the function, e.g. because it contains a try candidate.
    pub fn invalidate(&mut self) {
        *self = SharedTrailing::Invalid;
    }

    /// Returns the captured expressions if at least two handlers share them.
    pub fn finish(self) -> Vec<Captured> {
        match self {
            SharedTrailing::Valid(list) if list.len() >= 2 => list,
            _ => Vec::new(),
        }
    }
}
