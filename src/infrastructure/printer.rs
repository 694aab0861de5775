//! Source printer that splices rewritten statements into the original text.
//!
//! Everything the walker left alone is copied byte for byte, so formatting
//! and comments survive a rewrite. Only statements carrying a synthesized
//! `try` call are rendered fresh; comments inside the range they replace are
//! re-emitted after them at the statement's indentation.

use crate::domain::ast::{AssignStmt, Block, CallExpr, Decl, Expr, File, Span, Stmt};
use crate::domain::config::TRY_BUILTIN;
use crate::ports::SourcePrinter;
use anyhow::{anyhow, bail, Result};

pub struct SplicePrinter;

impl SourcePrinter for SplicePrinter {
    fn print(&self, source: &str, file: &File) -> Result<String> {
        let mut splicer = Splicer {
            src: source,
            comments: &file.comments,
            out: String::with_capacity(source.len()),
            cursor: 0,
        };
        for decl in &file.decls {
            if let Decl::Func(f) = decl {
                if let Some(body) = &f.body {
                    splicer.block(body)?;
                }
            }
        }
        splicer.copy_to(source.len())?;
        Ok(splicer.out)
    }
}

/// Copies the source up to each rewritten statement, emits the replacement,
/// then skips past the replaced range. Statements are visited in source order.
struct Splicer<'s> {
    src: &'s str,
    comments: &'s [Span],
    out: String,
    cursor: usize,
}

impl<'s> Splicer<'s> {
    fn slice(&self, span: Span) -> Result<&'s str> {
        self.src
            .get(span.start..span.end)
            .ok_or_else(|| anyhow!("span {}..{} is outside the source", span.start, span.end))
    }

    fn copy_to(&mut self, pos: usize) -> Result<()> {
        if pos < self.cursor {
            bail!("rewritten statements overlap at byte {}", pos);
        }
        let text = self.slice(Span::new(self.cursor, pos))?;
        self.out.push_str(text);
        self.cursor = pos;
        Ok(())
    }

    fn replace(&mut self, span: Span, text: &str) -> Result<()> {
        self.copy_to(span.start)?;
        self.out.push_str(text);
        self.cursor = span.end;
        Ok(())
    }

    /// Leading whitespace of the line containing `pos`.
    fn indent(&self, pos: usize) -> &'s str {
        let before = self.src.get(..pos).unwrap_or("");
        let line = &before[before.rfind('\n').map_or(0, |i| i + 1)..];
        &line[..line.len() - line.trim_start().len()]
    }

    /// Replaces `span` with a collapsed statement. Comments in `span` that
    /// are not inside one of the `kept` ranges reused by `text` follow it:
    /// on the same line if they started there, otherwise on their own lines.
    fn collapse(&mut self, span: Span, mut text: String, kept: &[Span]) -> Result<()> {
        let indent = self.indent(span.start);
        let mut ends_in_line_comment = false;
        let comments = self.comments;
        let displaced = comments.iter().filter(|c| {
            span.start <= c.start
                && c.end <= span.end
                && !kept.iter().any(|k| k.start <= c.start && c.end <= k.end)
        });
        for &comment in displaced {
            if self.slice(Span::new(span.start, comment.start))?.contains('\n') {
                text.push('\n');
                text.push_str(indent);
            } else {
                text.push(' ');
            }
            let comment = self.slice(comment)?;
            text.push_str(comment);
            ends_in_line_comment = comment.starts_with("//");
        }
        if ends_in_line_comment {
            let rest = self.slice(Span::new(span.end, self.src.len()))?;
            if !rest.split('\n').next().unwrap_or("").trim().is_empty() {
                // keep whatever followed the replaced range out of the comment
                text.push('\n');
                text.push_str(indent);
            }
        }
        self.replace(span, &text)
    }

    fn block(&mut self, b: &Block) -> Result<()> {
        for s in &b.stmts {
            self.stmt(s)?;
        }
        Ok(())
    }

    fn stmt(&mut self, s: &Stmt) -> Result<()> {
        match s {
            Stmt::Assign(a) => {
                if let Some(call) = try_call(&a.rhs) {
                    let text = self.assign(a, call)?;
                    let kept: Vec<Span> = a
                        .lhs
                        .iter()
                        .chain(&call.args)
                        .map(Expr::span)
                        .collect();
                    self.collapse(a.span, text, &kept)?;
                }
            }
            Stmt::Expr {
                x: Expr::Call(call),
                span,
            } if call.is_synthetic() => {
                let text = self.try_text(call)?;
                let kept: Vec<Span> = call.args.iter().map(Expr::span).collect();
                self.collapse(*span, text, &kept)?;
            }
            Stmt::If(s) => {
                if let Some(init) = &s.init {
                    self.stmt(init)?;
                }
                self.block(&s.body)?;
                if let Some(els) = &s.els {
                    self.stmt(els)?;
                }
            }
            Stmt::Block(b) | Stmt::For { body: b, .. } | Stmt::Range { body: b, .. } => {
                self.block(b)?
            }
            Stmt::Switch { clauses, .. }
            | Stmt::TypeSwitch { clauses, .. }
            | Stmt::Select { clauses, .. } => {
                for clause in clauses {
                    self.block(&clause.body)?;
                }
            }
            Stmt::Labeled { stmt, .. } => self.stmt(stmt)?,
            Stmt::Expr { .. } | Stmt::Return(_) | Stmt::Empty(_) | Stmt::Other { .. } => {}
        }
        Ok(())
    }

    fn assign(&self, a: &AssignStmt, call: &CallExpr) -> Result<String> {
        let lhs = a
            .lhs
            .iter()
            .map(|x| self.slice(x.span()))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "{} {} {}",
            lhs.join(", "),
            a.kind.token(),
            self.try_text(call)?
        ))
    }

    /// `try(<original call text>)`.
    fn try_text(&self, call: &CallExpr) -> Result<String> {
        let [arg] = call.args.as_slice() else {
            bail!("try call at byte {} must have one argument", call.span.start);
        };
        Ok(format!("{}({})", TRY_BUILTIN, self.slice(arg.span())?))
    }
}

fn try_call(rhs: &[Expr]) -> Option<&CallExpr> {
    match rhs {
        [Expr::Call(call)] if call.is_synthetic() => Some(call),
        _ => None,
    }
}
