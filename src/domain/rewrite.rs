//! Collapsing a matched assignment and `if` into a `try` call.

use crate::domain::ast::{AssignStmt, Block, CallExpr, Expr, Ident, Span, Stmt};
use crate::domain::config::TRY_BUILTIN;
use crate::domain::matcher::Site;

/// Rewrites the candidate whose `if` statement sits at `block.stmts[index]`.
///
/// For [`Site::Preceding`] the assignment at `index - 1` is replaced and the
/// `if` slot is tombstoned; the caller compacts the block once it is done
/// iterating. For [`Site::Initializer`] only the initializer is replaced and
/// the `if` statement stays in place.
///
/// # Panics
///
/// Panics if the slots do not hold the shapes the matcher accepted.
pub fn rewrite(block: &mut Block, index: usize, site: Site, tombstones: &mut [bool]) {
    let if_end = match &block.stmts[index] {
        Stmt::If(s) => s.span,
        other => panic!("rewrite: expected an if statement, found {:?}", other.span()),
    };
    match site {
        Site::Preceding => {
            assert!(index > 0, "rewrite: candidate if statement has no predecessor");
            let slot = &mut block.stmts[index - 1];
            let assign = take_assign(slot);
            *slot = collapse(assign, if_end);
            tombstones[index] = true;
        }
        Site::Initializer => {
            let init = match &mut block.stmts[index] {
                Stmt::If(s) => s.init.as_deref_mut(),
                _ => None,
            };
            let slot = init.unwrap_or_else(|| panic!("rewrite: if statement has no initializer"));
            let assign = take_assign(slot);
            let span = assign.span;
            let mut stmt = collapse(assign, if_end);
            // keep the initializer's own extent so the if header is intact
            set_span(&mut stmt, span);
            *slot = stmt;
        }
    }
}

fn take_assign(slot: &mut Stmt) -> AssignStmt {
    let placeholder = Stmt::Empty(slot.span());
    match std::mem::replace(slot, placeholder) {
        Stmt::Assign(a) if a.rhs.len() == 1 && !a.lhs.is_empty() && a.rhs[0].is_call() => a,
        other => panic!(
            "rewrite: statement at {:?} is not a matched assignment",
            other.span()
        ),
    }
}

/// Drops the error target and wraps the call in `try(...)`. The result spans
/// from the assignment's start to the end of the `if` statement it absorbs.
fn collapse(mut a: AssignStmt, if_span: Span) -> Stmt {
    a.lhs.pop();
    let call = a.rhs.remove(0);
    let call_span = call.span();
    let try_call = Expr::Call(CallExpr {
        fun: Box::new(Expr::Ident(Ident::new(TRY_BUILTIN, Span::point(call_span.start)))),
        args: vec![call],
        ellipsis: false,
        span: call_span.to(if_span),
    });
    let span = a.span.to(if_span);
    if is_blanks(&a.lhs) {
        return Stmt::Expr { x: try_call, span };
    }
    a.rhs.push(try_call);
    a.span = span;
    Stmt::Assign(a)
}

fn set_span(stmt: &mut Stmt, new_span: Span) {
    match stmt {
        Stmt::Assign(a) => a.span = new_span,
        Stmt::Expr { span, .. } => *span = new_span,
        _ => {}
    }
}

/// Reports whether `list` is empty or contains only blank identifiers.
fn is_blanks(list: &[Expr]) -> bool {
    list.iter()
        .all(|x| matches!(x, Expr::Ident(id) if id.is_blank()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::{AssignKind, BinaryOp, IfStmt, ReturnStmt};

    fn ident(name: &str, at: usize) -> Expr {
        Expr::Ident(Ident::new(name, Span::new(at, at + name.len())))
    }

    fn call_f(at: usize) -> Expr {
        Expr::Call(CallExpr {
            fun: Box::new(ident("f", at)),
            args: vec![],
            ellipsis: false,
            span: Span::new(at, at + 3),
        })
    }

    fn assign(lhs: Vec<Expr>, start: usize) -> Stmt {
        Stmt::Assign(AssignStmt {
            lhs,
            kind: AssignKind::Assign,
            rhs: vec![call_f(start + 10)],
            span: Span::new(start, start + 13),
        })
    }

    fn err_if(init: Option<Stmt>, span: Span) -> Stmt {
        Stmt::If(IfStmt {
            init: init.map(Box::new),
            cond: Expr::Binary {
                x: Box::new(ident("err", span.start + 3)),
                op: BinaryOp::Neq,
                y: Box::new(ident("nil", span.start + 10)),
                span: Span::new(span.start + 3, span.start + 13),
            },
            body: Block {
                stmts: vec![Stmt::Return(ReturnStmt {
                    results: vec![ident("err", span.start + 25)],
                    span: Span::new(span.start + 18, span.start + 28),
                })],
                span: Span::new(span.start + 14, span.end),
            },
            els: None,
            span,
        })
    }

    fn try_arg(x: &Expr) -> &Expr {
        match x {
            Expr::Call(call) if call.fun.is_ident("try") => {
                assert!(call.is_synthetic());
                &call.args[0]
            }
            other => panic!("expected a try call, got {:?}", other),
        }
    }

    #[test]
    fn test_preceding_assignment_keeps_targets() {
        let mut block = Block {
            stmts: vec![
                assign(vec![ident("v", 0), ident("err", 3)], 0),
                err_if(None, Span::new(14, 44)),
            ],
            span: Span::default(),
        };
        let mut tombstones = vec![false; 2];
        rewrite(&mut block, 1, Site::Preceding, &mut tombstones);
        assert_eq!(tombstones, vec![false, true]);

        match &block.stmts[0] {
            Stmt::Assign(a) => {
                assert_eq!(a.lhs.len(), 1);
                assert!(a.lhs[0].is_ident("v"));
                assert_eq!(a.span, Span::new(0, 44));
                assert_eq!(a.rhs[0].span(), Span::new(10, 44));
                assert_eq!(try_arg(&a.rhs[0]).span(), Span::new(10, 13));
            }
            other => panic!("expected assignment, got {:?}", other),
        }

        block.compact(&tombstones);
        assert_eq!(block.stmts.len(), 1);
    }

    #[test]
    fn test_blank_targets_become_expression_statement() {
        let mut block = Block {
            stmts: vec![
                assign(vec![ident("_", 0), ident("err", 3)], 0),
                err_if(None, Span::new(14, 44)),
            ],
            span: Span::default(),
        };
        let mut tombstones = vec![false; 2];
        rewrite(&mut block, 1, Site::Preceding, &mut tombstones);
        assert!(matches!(&block.stmts[0], Stmt::Expr { x, .. } if try_arg(x).is_call()));
    }

    #[test]
    fn test_initializer_is_replaced_in_place() {
        let init = assign(vec![ident("v", 3), ident("err", 6)], 3);
        let mut block = Block {
            stmts: vec![err_if(Some(init), Span::new(0, 50))],
            span: Span::default(),
        };
        let mut tombstones = vec![false];
        rewrite(&mut block, 0, Site::Initializer, &mut tombstones);
        assert_eq!(tombstones, vec![false]);

        let s = match &block.stmts[0] {
            Stmt::If(s) => s,
            other => panic!("expected if, got {:?}", other),
        };
        assert_eq!(s.body.stmts.len(), 1);
        match s.init.as_deref() {
            Some(Stmt::Assign(a)) => {
                assert_eq!(a.span, Span::new(3, 16));
                assert_eq!(a.lhs.len(), 1);
                assert!(try_arg(&a.rhs[0]).is_call());
            }
            other => panic!("expected rewritten initializer, got {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "not a matched assignment")]
    fn test_unmatched_pair_panics() {
        let mut block = Block {
            stmts: vec![
                Stmt::Empty(Span::new(0, 1)),
                err_if(None, Span::new(2, 30)),
            ],
            span: Span::default(),
        };
        let mut tombstones = vec![false; 2];
        rewrite(&mut block, 1, Site::Preceding, &mut tombstones);
    }
}
