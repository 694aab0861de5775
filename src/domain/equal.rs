//! Structural equality of expressions.
//!
//! Positions and comments are ignored. The comparison is conservative: any
//! pair of nodes it does not understand compares unequal, function literals
//! included.

use crate::domain::ast::{Expr, FieldList, Ident};

/// Reports whether `x` and `y` describe the same Go expression.
pub fn equal(x: &Expr, y: &Expr) -> bool {
    match (x, y) {
        (Expr::Ident(x), Expr::Ident(y)) => x.name == y.name,
        (Expr::BasicLit(x), Expr::BasicLit(y)) => {
            // literal text, not value: 0x10 and 16 differ
            x.kind == y.kind && x.value == y.value
        }
        (Expr::CompositeLit(x), Expr::CompositeLit(y)) => {
            !x.incomplete
                && !y.incomplete
                && equal_opt(x.ty.as_deref(), y.ty.as_deref())
                && equal_list(&x.elts, &y.elts)
        }
        (Expr::Paren { x, .. }, Expr::Paren { x: y, .. }) => equal(x, y),
        (Expr::Selector { x, sel, .. }, Expr::Selector { x: y, sel: ysel, .. }) => {
            equal(x, y) && sel.name == ysel.name
        }
        (
            Expr::Index { x, indices, .. },
            Expr::Index {
                x: y,
                indices: yindices,
                ..
            },
        ) => equal(x, y) && equal_list(indices, yindices),
        (Expr::Slice(x), Expr::Slice(y)) => {
            equal(&x.x, &y.x)
                && equal_opt(x.low.as_deref(), y.low.as_deref())
                && equal_opt(x.high.as_deref(), y.high.as_deref())
                && equal_opt(x.max.as_deref(), y.max.as_deref())
                && x.slice3 == y.slice3
        }
        (Expr::TypeAssert { x, ty, .. }, Expr::TypeAssert { x: y, ty: yty, .. }) => {
            equal(x, y) && equal_opt(ty.as_deref(), yty.as_deref())
        }
        (Expr::Call(x), Expr::Call(y)) => {
            equal(&x.fun, &y.fun) && equal_list(&x.args, &y.args) && x.ellipsis == y.ellipsis
        }
        (Expr::Star { x, .. }, Expr::Star { x: y, .. }) => equal(x, y),
        (Expr::Unary { op, x, .. }, Expr::Unary { op: yop, x: y, .. }) => {
            op == yop && equal(x, y)
        }
        (
            Expr::Binary { x, op, y, .. },
            Expr::Binary {
                x: x2,
                op: op2,
                y: y2,
                ..
            },
        ) => equal(x, x2) && op == op2 && equal(y, y2),
        (
            Expr::KeyValue { key, value, .. },
            Expr::KeyValue {
                key: key2,
                value: value2,
                ..
            },
        ) => equal(key, key2) && equal(value, value2),
        (Expr::Ellipsis { elt, .. }, Expr::Ellipsis { elt: elt2, .. }) => {
            equal_opt(elt.as_deref(), elt2.as_deref())
        }
        (
            Expr::ArrayType { len, elt, .. },
            Expr::ArrayType {
                len: len2,
                elt: elt2,
                ..
            },
        ) => equal_opt(len.as_deref(), len2.as_deref()) && equal(elt, elt2),
        (
            Expr::StructType {
                fields, incomplete, ..
            },
            Expr::StructType {
                fields: fields2,
                incomplete: incomplete2,
                ..
            },
        ) => !incomplete && !incomplete2 && equal_fields(Some(fields), Some(fields2)),
        (Expr::FuncType(x), Expr::FuncType(y)) => {
            equal_fields(x.params.as_ref(), y.params.as_ref())
                && equal_fields(x.results.as_ref(), y.results.as_ref())
        }
        (
            Expr::InterfaceType {
                methods,
                incomplete,
                ..
            },
            Expr::InterfaceType {
                methods: methods2,
                incomplete: incomplete2,
                ..
            },
        ) => !incomplete && !incomplete2 && equal_fields(Some(methods), Some(methods2)),
        (
            Expr::MapType { key, value, .. },
            Expr::MapType {
                key: key2,
                value: value2,
                ..
            },
        ) => equal(key, key2) && equal(value, value2),
        (
            Expr::ChanType { dir, value, .. },
            Expr::ChanType {
                dir: dir2,
                value: value2,
                ..
            },
        ) => dir == dir2 && equal(value, value2),
        // FuncLit: comparing bodies would need statement equality.
        _ => false,
    }
}

/// Two absent expressions are equal; one absent expression is not.
fn equal_opt(x: Option<&Expr>, y: Option<&Expr>) -> bool {
    match (x, y) {
        (None, None) => true,
        (Some(x), Some(y)) => equal(x, y),
        _ => false,
    }
}

pub fn equal_list(x: &[Expr], y: &[Expr]) -> bool {
    x.len() == y.len() && x.iter().zip(y).all(|(x, y)| equal(x, y))
}

pub fn equal_fields(x: Option<&FieldList>, y: Option<&FieldList>) -> bool {
    let (x, y) = match (x, y) {
        (None, None) => return true,
        (Some(x), Some(y)) => (x, y),
        _ => return false,
    };
    if x.list.len() != y.list.len() {
        return false;
    }
    x.list.iter().zip(&y.list).all(|(x, y)| {
        equal_idents(&x.names, &y.names)
            && equal(&x.ty, &y.ty)
            && match (&x.tag, &y.tag) {
                (None, None) => true,
                (Some(xt), Some(yt)) => xt.kind == yt.kind && xt.value == yt.value,
                _ => false,
            }
    })
}

fn equal_idents(x: &[Ident], y: &[Ident]) -> bool {
    x.len() == y.len() && x.iter().zip(y).all(|(x, y)| x.name == y.name)
}
