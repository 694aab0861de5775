//! Classification counters.
//!
//! Every visited node is classified into a fixed set of buckets. Buckets that
//! identify interesting source locations also keep the positions they were
//! counted at, in counting order.

use crate::domain::ast::Position;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Func,
    FuncError,
    Stmt,
    If,
    IfErr,
    NonErrName,
    ReturnExpr,
    SingleStmt,
    ComplexBlock,
    HasElse,
    TryCand,
    SharedExpr,
}

struct KindInfo {
    name: &'static str,
    /// Bucket that percentages are reported against.
    parent: Kind,
    /// Positions are recorded and listed for this bucket.
    records: bool,
    desc: &'static str,
}

impl Kind {
    pub const COUNT: usize = 12;

    /// All buckets in report order.
    pub const ALL: [Kind; Kind::COUNT] = [
        Kind::Func,
        Kind::FuncError,
        Kind::Stmt,
        Kind::If,
        Kind::IfErr,
        Kind::NonErrName,
        Kind::ReturnExpr,
        Kind::SingleStmt,
        Kind::ComplexBlock,
        Kind::HasElse,
        Kind::TryCand,
        Kind::SharedExpr,
    ];

    fn info(self) -> KindInfo {
        let (name, parent, records, desc) = match self {
            Kind::Func => ("func", Kind::Func, false, "func declarations"),
            Kind::FuncError => (
                "func_error",
                Kind::Func,
                false,
                "func declarations returning an error",
            ),
            Kind::Stmt => ("stmt", Kind::Stmt, false, "statements"),
            Kind::If => ("if", Kind::Stmt, false, "if statements"),
            Kind::IfErr => ("if_err", Kind::If, false, "if <err> != nil statements"),
            Kind::NonErrName => (
                "non_err_name",
                Kind::IfErr,
                true,
                "<err> name is different from \"err\"",
            ),
            Kind::ReturnExpr => (
                "return_expr",
                Kind::IfErr,
                true,
                "return ..., <expr> blocks in if <err> != nil statements where <expr> is not <err>",
            ),
            Kind::SingleStmt => (
                "single_stmt",
                Kind::IfErr,
                true,
                "single statement, non-return error handler in if <err> != nil statements",
            ),
            Kind::ComplexBlock => (
                "complex_block",
                Kind::IfErr,
                true,
                "complex error handler in if <err> != nil statements; cannot use try",
            ),
            Kind::HasElse => (
                "has_else",
                Kind::IfErr,
                true,
                "non-empty else blocks in if <err> != nil statements; cannot use try",
            ),
            Kind::TryCand => ("try_cand", Kind::IfErr, true, "try candidates"),
            Kind::SharedExpr => (
                "shared_expr",
                Kind::ReturnExpr,
                true,
                "<expr> shared by all failing error handlers in a function",
            ),
        };
        KindInfo {
            name,
            parent,
            records,
            desc,
        }
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn parent(self) -> Kind {
        self.info().parent
    }

    pub fn records(self) -> bool {
        self.info().records
    }

    pub fn description(self) -> &'static str {
        self.info().desc
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Run-wide accumulator, owned by the caller and threaded through the walk.
#[derive(Debug, Clone)]
pub struct Stats {
    counts: [usize; Kind::COUNT],
    positions: [Vec<Position>; Kind::COUNT],
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            counts: [0; Kind::COUNT],
            positions: std::array::from_fn(|_| Vec::new()),
        }
    }
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `kind`. The position is only computed for
    /// buckets that record positions.
    pub fn count(&mut self, kind: Kind, position: impl FnOnce() -> Position) {
        self.counts[kind.index()] += 1;
        if kind.records() {
            self.positions[kind.index()].push(position());
        }
    }

    pub fn get(&self, kind: Kind) -> usize {
        self.counts[kind.index()]
    }

    pub fn positions(&self, kind: Kind) -> &[Position] {
        &self.positions[kind.index()]
    }

    /// Percentage of `kind` relative to its parent bucket. An empty parent
    /// reports 100%.
    pub fn percent(&self, kind: Kind) -> f64 {
        let total = self.get(kind.parent());
        if total == 0 {
            return 100.0;
        }
        self.get(kind) as f64 * 100.0 / total as f64
    }

    /// Appends `other` to `self`. Merging per-file results in input order
    /// yields the same position lists as a sequential run.
    pub fn merge(&mut self, other: Stats) {
        for (count, n) in self.counts.iter_mut().zip(other.counts) {
            *count += n;
        }
        for (list, more) in self.positions.iter_mut().zip(other.positions) {
            list.extend(more);
        }
    }

    /// Writes one summary line per bucket.
    pub fn write_counts(&self, out: &mut impl Write, listing: bool) -> io::Result<()> {
        writeln!(out, "--- stats ---")?;
        for kind in Kind::ALL {
            let help = if !listing && kind.records() {
                " (use -l flag to list file positions)"
            } else {
                ""
            };
            writeln!(
                out,
                "{:>7} ({:>5.1}% of {:>7}) {}{}",
                self.get(kind),
                self.percent(kind),
                self.get(kind.parent()),
                kind.description(),
                help
            )?;
        }
        Ok(())
    }

    /// Writes the recorded positions of every non-empty bucket.
    pub fn write_positions(&self, out: &mut impl Write) -> io::Result<()> {
        for kind in Kind::ALL {
            let list = self.positions(kind);
            if list.is_empty() {
                continue;
            }
            writeln!(out, "--- {} ---", kind.description())?;
            for (i, pos) in list.iter().enumerate() {
                writeln!(out, "{:>7}  {}", i + 1, pos)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
