//! Depth-first walk over error-returning functions.
//!
//! Function literals are never entered: the idiom is only recognized in the
//! bodies of top-level function and method declarations.

use crate::domain::ast::{Block, Decl, File, FuncDecl, Locator, Stmt};
use crate::domain::config::{Config, DEFAULT_ERR_NAME};
use crate::domain::matcher::{match_if, Handler, Outcome, Site};
use crate::domain::rewrite::rewrite;
use crate::domain::shared::SharedTrailing;
use crate::domain::stats::{Kind, Stats};

/// Walks every function declaration in `file`, counting into `stats` and, in
/// rewrite mode, collapsing candidates in place.
///
/// Returns whether the tree was modified.
pub fn walk_file(file: &mut File, config: &Config, stats: &mut Stats) -> bool {
    let File {
        path, decls, lines, ..
    } = file;
    let mut walker = Walker {
        config,
        stats,
        locator: Locator::new(path.as_str(), lines),
    };
    let mut modified = false;
    for decl in decls.iter_mut() {
        if let Decl::Func(f) = decl {
            modified |= walker.func(f);
        }
    }
    modified
}

#[derive(Default)]
struct FuncState {
    modified: bool,
    shared: SharedTrailing,
}

struct Walker<'a> {
    config: &'a Config,
    stats: &'a mut Stats,
    locator: Locator<'a>,
}

impl Walker<'_> {
    fn count(&mut self, kind: Kind, offset: usize) {
        let locator = self.locator;
        self.stats.count(kind, || locator.position(offset));
    }

    fn func(&mut self, f: &mut FuncDecl) -> bool {
        self.count(Kind::Func, f.span.start);
        if !f.has_error_result(&self.config.err_type_name) {
            return false;
        }
        let Some(body) = f.body.as_mut() else {
            return false;
        };
        self.count(Kind::FuncError, f.span.start);

        let mut state = FuncState::default();
        self.block(body, &mut state);
        for captured in state.shared.finish() {
            self.stats.count(Kind::SharedExpr, || captured.position);
        }
        state.modified
    }

    fn block(&mut self, b: &mut Block, state: &mut FuncState) {
        let mut tombstones = vec![false; b.stmts.len()];
        for i in 0..b.stmts.len() {
            self.count(Kind::Stmt, b.stmts[i].span().start);
            self.descend(&mut b.stmts[i], state);
            if matches!(b.stmts[i], Stmt::If(_)) {
                self.if_stmt(b, i, state, &mut tombstones);
            }
        }
        if tombstones.contains(&true) {
            b.compact(&tombstones);
        }
    }

    /// Walks the blocks nested in `s`. An `else if` is not entered.
    fn descend(&mut self, s: &mut Stmt, state: &mut FuncState) {
        match s {
            Stmt::Block(b) | Stmt::For { body: b, .. } | Stmt::Range { body: b, .. } => {
                self.block(b, state)
            }
            Stmt::If(s) => {
                self.block(&mut s.body, state);
                if let Some(Stmt::Block(els)) = s.els.as_deref_mut() {
                    self.block(els, state);
                }
            }
            Stmt::Switch { clauses, .. }
            | Stmt::TypeSwitch { clauses, .. }
            | Stmt::Select { clauses, .. } => {
                for clause in clauses {
                    self.block(&mut clause.body, state);
                }
            }
            Stmt::Labeled { stmt, .. } => self.descend(stmt, state),
            Stmt::Assign(_)
            | Stmt::Return(_)
            | Stmt::Expr { .. }
            | Stmt::Empty(_)
            | Stmt::Other { .. } => {}
        }
    }

    /// Classifies the `if` statement at `b.stmts[i]` and rewrites it when it
    /// is a candidate and rewriting is enabled.
    fn if_stmt(
        &mut self,
        b: &mut Block,
        i: usize,
        state: &mut FuncState,
        tombstones: &mut [bool],
    ) {
        let (before, rest) = b.stmts.split_at(i);
        let Stmt::If(s) = &rest[0] else {
            return;
        };
        let prev = before.last();
        self.count(Kind::If, s.span.start);

        let Some(m) = match_if(s, prev, self.config) else {
            return;
        };
        self.count(Kind::IfErr, s.span.start);
        if m.err_name != DEFAULT_ERR_NAME {
            self.count(Kind::NonErrName, s.span.start);
        }

        let mut candidate = None;
        match m.outcome {
            Outcome::Candidate(site) => {
                let at = match (site, prev) {
                    (Site::Preceding, Some(prev)) => prev.span().start,
                    _ => s.span.start,
                };
                self.count(Kind::TryCand, at);
                candidate = Some(site);
            }
            Outcome::Handler(Handler::SingleStmt) => self.count(Kind::SingleStmt, s.span.start),
            Outcome::Handler(Handler::Complex) => self.count(Kind::ComplexBlock, s.span.start),
            Outcome::TrailingExpr(expr) => {
                let offset = expr.span().start;
                self.count(Kind::ReturnExpr, offset);
                let locator = self.locator;
                state.shared.record(expr, || locator.position(offset));
            }
            Outcome::HasElse => self.count(Kind::HasElse, s.span.start),
            Outcome::NonZeroResult | Outcome::NotAssignment => {}
        }
        if m.trailing_is_err() {
            // naked or `..., err` returns, matched or not, rule the function out
            state.shared.invalidate();
        }

        if let Some(site) = candidate {
            if self.config.rewrite {
                rewrite(b, i, site, tombstones);
                state.modified = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::{
        AssignKind, AssignStmt, BasicLit, BinaryOp, CallExpr, Expr, Field, FieldList, FuncLit,
        FuncType, Ident, IfStmt, LineIndex, LitKind, ReturnStmt, Span,
    };

    fn ident(name: &str) -> Expr {
        Expr::Ident(Ident::new(name, Span::new(1, 2)))
    }

    fn call(name: &str) -> Expr {
        Expr::Call(CallExpr {
            fun: Box::new(ident(name)),
            args: vec![],
            ellipsis: false,
            span: Span::new(1, 4),
        })
    }

    fn assign(lhs: &[&str], kind: AssignKind) -> Stmt {
        Stmt::Assign(AssignStmt {
            lhs: lhs.iter().map(|n| ident(n)).collect(),
            kind,
            rhs: vec![call("f")],
            span: Span::new(1, 10),
        })
    }

    fn err_if(results: Vec<Expr>) -> Stmt {
        Stmt::If(IfStmt {
            init: None,
            cond: Expr::Binary {
                x: Box::new(ident("err")),
                op: BinaryOp::Neq,
                y: Box::new(ident("nil")),
                span: Span::new(11, 20),
            },
            body: Block {
                stmts: vec![Stmt::Return(ReturnStmt {
                    results,
                    span: Span::new(22, 30),
                })],
                span: Span::new(21, 31),
            },
            els: None,
            span: Span::new(11, 31),
        })
    }

    fn results(types: &[&str]) -> Option<FieldList> {
        Some(FieldList {
            list: types
                .iter()
                .map(|t| Field {
                    names: vec![],
                    ty: ident(t),
                    tag: None,
                })
                .collect(),
        })
    }

    fn func(result_types: &[&str], stmts: Vec<Stmt>) -> Decl {
        Decl::Func(FuncDecl {
            name: Ident::new("g", Span::new(5, 6)),
            recv: None,
            ty: FuncType {
                params: Some(FieldList::default()),
                results: results(result_types),
                span: Span::new(0, 10),
            },
            body: Some(Block {
                stmts,
                span: Span::new(0, 40),
            }),
            span: Span::new(0, 40),
        })
    }

    fn file(decls: Vec<Decl>) -> File {
        File {
            path: "t.go".to_string(),
            decls,
            lines: LineIndex::new("package p\n"),
            comments: Vec::new(),
        }
    }

    fn zero() -> Expr {
        Expr::BasicLit(BasicLit {
            kind: LitKind::Int,
            value: "0".to_string(),
            span: Span::new(23, 24),
        })
    }

    fn body(f: &File) -> &Block {
        match &f.decls[0] {
            Decl::Func(f) => f.body.as_ref().unwrap(),
            Decl::Other(_) => unreachable!(),
        }
    }

    #[test]
    fn test_separate_statement_candidate() {
        let mut f = file(vec![func(
            &["int", "error"],
            vec![
                assign(&["v", "err"], AssignKind::Assign),
                err_if(vec![zero(), ident("err")]),
            ],
        )]);
        let config = Config {
            rewrite: true,
            ..Config::default()
        };
        let mut stats = Stats::new();
        assert!(walk_file(&mut f, &config, &mut stats));
        assert_eq!(stats.get(Kind::TryCand), 1);
        // the return inside the if body counts too
        assert_eq!(stats.get(Kind::Stmt), 3);
        assert_eq!(body(&f).stmts.len(), 1);

        let mut again = Stats::new();
        assert!(!walk_file(&mut f, &config, &mut again));
        assert_eq!(again.get(Kind::TryCand), 0);
    }

    #[test]
    fn test_list_mode_leaves_tree_alone() {
        let mut f = file(vec![func(
            &["error"],
            vec![assign(&["err"], AssignKind::Define), err_if(vec![ident("err")])],
        )]);
        let mut stats = Stats::new();
        assert!(!walk_file(&mut f, &Config::default(), &mut stats));
        assert_eq!(stats.get(Kind::TryCand), 1);
        assert_eq!(body(&f).stmts.len(), 2);
    }

    #[test]
    fn test_non_error_functions_are_skipped() {
        let mut f = file(vec![func(
            &["int"],
            vec![assign(&["err"], AssignKind::Define), err_if(vec![ident("err")])],
        )]);
        let mut stats = Stats::new();
        walk_file(&mut f, &Config::default(), &mut stats);
        assert_eq!(stats.get(Kind::Func), 1);
        for kind in Kind::ALL.into_iter().filter(|k| *k != Kind::Func) {
            assert_eq!(stats.get(kind), 0, "{:?}", kind);
        }
    }

    #[test]
    fn test_function_literals_are_not_entered() {
        let closure = Expr::FuncLit(FuncLit {
            ty: FuncType {
                params: Some(FieldList::default()),
                results: results(&["error"]),
                span: Span::new(1, 2),
            },
            body: Block {
                stmts: vec![assign(&["err"], AssignKind::Define), err_if(vec![ident("err")])],
                span: Span::new(1, 30),
            },
            span: Span::new(1, 30),
        });
        let mut f = file(vec![func(
            &["error"],
            vec![Stmt::Assign(AssignStmt {
                lhs: vec![ident("h")],
                kind: AssignKind::Define,
                rhs: vec![closure],
                span: Span::new(1, 30),
            })],
        )]);
        let mut stats = Stats::new();
        walk_file(&mut f, &Config::default(), &mut stats);
        assert_eq!(stats.get(Kind::Stmt), 1);
        assert_eq!(stats.get(Kind::If), 0);
        assert_eq!(stats.get(Kind::TryCand), 0);
    }

    fn if_else(els: Stmt) -> Stmt {
        Stmt::If(IfStmt {
            init: None,
            cond: ident("ok"),
            body: Block {
                stmts: vec![],
                span: Span::new(5, 6),
            },
            els: Some(Box::new(els)),
            span: Span::new(1, 40),
        })
    }

    fn checked_block() -> Block {
        Block {
            stmts: vec![assign(&["err"], AssignKind::Define), err_if(vec![ident("err")])],
            span: Span::new(7, 39),
        }
    }

    #[test]
    fn test_else_if_bodies_are_not_entered() {
        let else_if = Stmt::If(IfStmt {
            init: None,
            cond: ident("retry"),
            body: checked_block(),
            els: None,
            span: Span::new(7, 39),
        });
        let mut f = file(vec![func(&["error"], vec![if_else(else_if)])]);
        let mut stats = Stats::new();
        walk_file(&mut f, &Config::default(), &mut stats);
        assert_eq!(stats.get(Kind::TryCand), 0);
        assert_eq!(stats.get(Kind::IfErr), 0);
    }

    #[test]
    fn test_plain_else_bodies_are_entered() {
        let els = Stmt::Block(checked_block());
        let mut f = file(vec![func(&["error"], vec![if_else(els)])]);
        let mut stats = Stats::new();
        walk_file(&mut f, &Config::default(), &mut stats);
        assert_eq!(stats.get(Kind::TryCand), 1);
    }

    #[test]
    fn test_shared_trailing_expressions() {
        let wrapped = || {
            Expr::Call(CallExpr {
                fun: Box::new(ident("wrap")),
                args: vec![ident("err")],
                ellipsis: false,
                span: Span::new(25, 34),
            })
        };
        let mut f = file(vec![func(
            &["error"],
            vec![
                assign(&["err"], AssignKind::Define),
                err_if(vec![wrapped()]),
                assign(&["err"], AssignKind::Assign),
                err_if(vec![wrapped()]),
            ],
        )]);
        let mut stats = Stats::new();
        walk_file(&mut f, &Config::default(), &mut stats);
        assert_eq!(stats.get(Kind::ReturnExpr), 2);
        assert_eq!(stats.get(Kind::SharedExpr), 2);
        assert_eq!(stats.get(Kind::TryCand), 0);
    }
}
