//! Recognition of the `v, err := f(); if err != nil { return ..., err }` idiom.

use crate::domain::ast::{AssignKind, BinaryOp, Block, Expr, IfStmt, Stmt};
use crate::domain::config::Config;
use crate::domain::zero::is_zero;

/// Where the assignment feeding a candidate lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    /// The statement immediately before the `if`.
    Preceding,
    /// The `if` statement's own initializer.
    Initializer,
}

/// Shape of an error handler that is more than a single `return`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// One statement, but not a `return`.
    SingleStmt,
    /// No statement, or more than one.
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<'a> {
    /// All requirements hold; the pair can be collapsed.
    Candidate(Site),
    /// The body is not a single `return`.
    Handler(Handler),
    /// The `return`'s trailing value is something other than the error
    /// variable.
    TrailingExpr(&'a Expr),
    /// A leading result of the `return` is not a zero value.
    NonZeroResult,
    /// The `if` has an `else` branch.
    HasElse,
    /// The statement checked is not `..., err = call()`.
    NotAssignment,
}

/// Result of inspecting one `if <err> != nil` statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    /// Name the error variable is bound to for this statement only.
    pub err_name: &'a str,
    pub outcome: Outcome<'a>,
}

impl Match<'_> {
    /// Reports whether the `return` was inspected (the body is a single
    /// `return` statement).
    pub fn reached_return(&self) -> bool {
        !matches!(self.outcome, Outcome::Handler(_))
    }

    /// Reports whether the handler's trailing value is absent or is the error
    /// variable itself.
    pub fn trailing_is_err(&self) -> bool {
        self.reached_return() && !matches!(self.outcome, Outcome::TrailingExpr(_))
    }
}

/// Inspects `s`, using `prev` (the statement before it, if any) as the
/// assignment when `s` has no initializer.
///
/// Returns `None` unless the condition is `<ident> != nil`.
pub fn match_if<'a>(s: &'a IfStmt, prev: Option<&'a Stmt>, config: &Config) -> Option<Match<'a>> {
    let err_name = err_test(&s.cond, config.err_var_name.as_deref())?;
    let outcome = classify(s, prev, err_name);
    Some(Match { err_name, outcome })
}

fn classify<'a>(s: &'a IfStmt, prev: Option<&'a Stmt>, err_name: &str) -> Outcome<'a> {
    let ret = match single_return(&s.body) {
        Ok(ret) => ret,
        Err(handler) => return Outcome::Handler(handler),
    };
    if let Some((last, leading)) = ret.split_last() {
        if !last.is_ident(err_name) {
            return Outcome::TrailingExpr(last);
        }
        if !leading.iter().all(is_zero) {
            return Outcome::NonZeroResult;
        }
    }
    if s.els.is_some() {
        return Outcome::HasElse;
    }
    let (stmt, site) = match &s.init {
        Some(init) => (Some(&**init), Site::Initializer),
        None => (prev, Site::Preceding),
    };
    match stmt {
        Some(stmt) if is_err_assign(stmt, err_name) => Outcome::Candidate(site),
        _ => Outcome::NotAssignment,
    }
}

/// Matches `x != nil` and returns the name of `x`. With `want` set, the name
/// must equal it; otherwise any identifier is accepted.
pub fn err_test<'a>(cond: &'a Expr, want: Option<&str>) -> Option<&'a str> {
    match cond {
        Expr::Binary {
            x,
            op: BinaryOp::Neq,
            y,
            ..
        } if y.is_ident("nil") => {
            let id = x.as_ident()?;
            match want {
                Some(want) if id.name != want => None,
                _ => Some(id.name.as_str()),
            }
        }
        _ => None,
    }
}

/// Returns the results of the block's only statement if it is a `return`.
fn single_return(body: &Block) -> Result<&[Expr], Handler> {
    match body.stmts.as_slice() {
        [Stmt::Return(ret)] => Ok(&ret.results),
        [_] => Err(Handler::SingleStmt),
        _ => Err(Handler::Complex),
    }
}

/// Reports whether `s` has the form
///
/// ```text
/// v1, v2, ..., vn, err  = f()
/// v1, v2, ..., vn, err := f()
/// ```
///
/// where `n` may be 0 and `f()` is any call (conversions included).
pub fn is_err_assign(s: &Stmt, err_name: &str) -> bool {
    let a = match s {
        Stmt::Assign(a) => a,
        _ => return false,
    };
    if !matches!(a.kind, AssignKind::Assign | AssignKind::Define) {
        return false;
    }
    matches!(a.lhs.last(), Some(last) if last.is_ident(err_name))
        && a.rhs.len() == 1
        && a.rhs[0].is_call()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::{AssignStmt, BasicLit, CallExpr, Ident, LitKind, ReturnStmt, Span};

    fn ident(name: &str) -> Expr {
        Expr::Ident(Ident::new(name, Span::default()))
    }

    fn call(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Call(CallExpr {
            fun: Box::new(ident(name)),
            args,
            ellipsis: false,
            span: Span::default(),
        })
    }

    fn zero_int() -> Expr {
        Expr::BasicLit(BasicLit {
            kind: LitKind::Int,
            value: "0".to_string(),
            span: Span::default(),
        })
    }

    fn neq_nil(name: &str) -> Expr {
        Expr::Binary {
            x: Box::new(ident(name)),
            op: BinaryOp::Neq,
            y: Box::new(ident("nil")),
            span: Span::default(),
        }
    }

    fn assign(lhs: &[&str], rhs: Expr) -> Stmt {
        Stmt::Assign(AssignStmt {
            lhs: lhs.iter().map(|n| ident(n)).collect(),
            kind: AssignKind::Define,
            rhs: vec![rhs],
            span: Span::default(),
        })
    }

    fn ret(results: Vec<Expr>) -> Stmt {
        Stmt::Return(ReturnStmt {
            results,
            span: Span::default(),
        })
    }

    fn if_stmt(cond: Expr, body: Vec<Stmt>) -> IfStmt {
        IfStmt {
            init: None,
            cond,
            body: Block {
                stmts: body,
                span: Span::default(),
            },
            els: None,
            span: Span::default(),
        }
    }

    #[test]
    fn test_err_test_binding() {
        assert_eq!(err_test(&neq_nil("err"), None), Some("err"));
        assert_eq!(err_test(&neq_nil("myErr"), None), Some("myErr"));
        assert_eq!(err_test(&neq_nil("myErr"), Some("err")), None);
        let eq = Expr::Binary {
            x: Box::new(ident("err")),
            op: BinaryOp::Eql,
            y: Box::new(ident("nil")),
            span: Span::default(),
        };
        assert_eq!(err_test(&eq, None), None);
    }

    #[test]
    fn test_candidate_with_preceding_assignment() {
        let prev = assign(&["v", "err"], call("f", vec![]));
        let s = if_stmt(
            neq_nil("err"),
            vec![ret(vec![zero_int(), ident("err")])],
        );
        let m = match_if(&s, Some(&prev), &Config::default()).unwrap();
        assert_eq!(m.err_name, "err");
        assert_eq!(m.outcome, Outcome::Candidate(Site::Preceding));
    }

    #[test]
    fn test_initializer_takes_precedence() {
        let prev = assign(&["v", "err"], call("f", vec![]));
        let mut s = if_stmt(neq_nil("err"), vec![ret(vec![ident("err")])]);
        s.init = Some(Box::new(assign(&["v"], call("f", vec![]))));
        let m = match_if(&s, Some(&prev), &Config::default()).unwrap();
        assert_eq!(m.outcome, Outcome::NotAssignment);
    }

    #[test]
    fn test_handler_shapes() {
        let prev = assign(&["err"], call("f", vec![]));
        let log = Stmt::Expr {
            x: call("log", vec![ident("err")]),
            span: Span::default(),
        };
        let single = if_stmt(neq_nil("err"), vec![log]);
        let m = match_if(&single, Some(&prev), &Config::default()).unwrap();
        assert_eq!(m.outcome, Outcome::Handler(Handler::SingleStmt));
        assert!(!m.reached_return());

        let empty = if_stmt(neq_nil("err"), vec![]);
        let m = match_if(&empty, Some(&prev), &Config::default()).unwrap();
        assert_eq!(m.outcome, Outcome::Handler(Handler::Complex));
    }

    #[test]
    fn test_trailing_expression_mismatch() {
        let prev = assign(&["err"], call("f", vec![]));
        let s = if_stmt(
            neq_nil("err"),
            vec![ret(vec![call("wrap", vec![ident("err")])])],
        );
        let m = match_if(&s, Some(&prev), &Config::default()).unwrap();
        assert!(matches!(m.outcome, Outcome::TrailingExpr(Expr::Call(_))));
        assert!(!m.trailing_is_err());
    }

    #[test]
    fn test_naked_return_and_non_zero_results() {
        let prev = assign(&["err"], call("f", vec![]));
        let naked = if_stmt(neq_nil("err"), vec![ret(vec![])]);
        let m = match_if(&naked, Some(&prev), &Config::default()).unwrap();
        assert_eq!(m.outcome, Outcome::Candidate(Site::Preceding));

        let non_zero = if_stmt(neq_nil("err"), vec![ret(vec![ident("v"), ident("err")])]);
        let m = match_if(&non_zero, Some(&prev), &Config::default()).unwrap();
        assert_eq!(m.outcome, Outcome::NonZeroResult);
        assert!(m.trailing_is_err());
    }

    #[test]
    fn test_else_disqualifies() {
        let prev = assign(&["err"], call("f", vec![]));
        let mut s = if_stmt(neq_nil("err"), vec![ret(vec![ident("err")])]);
        s.els = Some(Box::new(Stmt::Block(Block::default())));
        let m = match_if(&s, Some(&prev), &Config::default()).unwrap();
        assert_eq!(m.outcome, Outcome::HasElse);
    }

    #[test]
    fn test_assignment_requirements() {
        assert!(is_err_assign(&assign(&["_", "err"], call("f", vec![])), "err"));
        assert!(!is_err_assign(&assign(&["err", "v"], call("f", vec![])), "err"));
        assert!(!is_err_assign(&assign(&["err"], ident("g")), "err"));

        let mut compound = assign(&["err"], call("f", vec![]));
        if let Stmt::Assign(a) = &mut compound {
            a.kind = AssignKind::Compound(BinaryOp::Add);
        }
        assert!(!is_err_assign(&compound, "err"));

        let mut two_rhs = assign(&["v", "err"], call("f", vec![]));
        if let Stmt::Assign(a) = &mut two_rhs {
            a.rhs.push(call("g", vec![]));
        }
        assert!(!is_err_assign(&two_rhs, "err"));
    }

    #[test]
    fn test_missing_preceding_statement() {
        let s = if_stmt(neq_nil("err"), vec![ret(vec![ident("err")])]);
        let m = match_if(&s, None, &Config::default()).unwrap();
        assert_eq!(m.outcome, Outcome::NotAssignment);
    }
}
