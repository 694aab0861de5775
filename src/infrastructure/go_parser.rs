//! Go frontend built on tree-sitter.
//!
//! Lowers the `tree-sitter-go` concrete syntax tree into the domain syntax
//! tree. Shapes the analysis never inspects are kept as opaque nodes with
//! their spans.

use crate::domain::ast::{
    AssignKind, AssignStmt, BasicLit, BinaryOp, Block, CallExpr, CaseClause, ChanDir,
    CompositeLit, Decl, Expr, Field, FieldList, File, FuncDecl, FuncLit, FuncType, Ident,
    IfStmt, LineIndex, LitKind, ReturnStmt, SliceExpr, Span, Stmt, UnaryOp,
};
use crate::ports::SourceParser;
use anyhow::{anyhow, bail, Result};
use tree_sitter::{Node, Parser};

pub struct TreeSitterGoParser;

impl TreeSitterGoParser {
    fn parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| anyhow!("Failed to load the Go grammar: {}", e))?;
        Ok(parser)
    }
}

impl SourceParser for TreeSitterGoParser {
    fn parse(&self, path: &str, source: &str) -> Result<File> {
        let tree = self
            .parser()?
            .parse(source, None)
            .ok_or_else(|| anyhow!("parsing was cancelled"))?;
        let root = tree.root_node();
        if root.has_error() {
            let at = first_error(root).unwrap_or(root).start_position();
            bail!("{}:{}: syntax error", at.row + 1, at.column + 1);
        }
        let lower = Lower { src: source };
        Ok(File {
            path: path.to_string(),
            decls: lower.file(root),
            lines: LineIndex::new(source),
            comments: comments(root),
        })
    }
}

/// Spans of all comment nodes, in source order.
fn comments(root: Node) -> Vec<Span> {
    let mut out = Vec::new();
    let mut cursor = root.walk();
    'walk: loop {
        let node = cursor.node();
        if node.kind() == "comment" {
            out.push(span(node));
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                continue 'walk;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    out
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Named children, comments excluded.
fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

/// Named children that are not attached to a field, comments excluded.
fn unfielded_children(node: Node) -> Vec<Node> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return out;
    }
    loop {
        let child = cursor.node();
        if child.is_named() && child.kind() != "comment" && cursor.field_name().is_none() {
            out.push(child);
        }
        if !cursor.goto_next_sibling() {
            return out;
        }
    }
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

fn span(node: Node) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

struct Lower<'s> {
    src: &'s str,
}

impl Lower<'_> {
    fn text(&self, node: Node) -> &str {
        &self.src[node.start_byte()..node.end_byte()]
    }

    fn ident(&self, node: Node) -> Ident {
        Ident::new(self.text(node), span(node))
    }

    fn file(&self, root: Node) -> Vec<Decl> {
        named_children(root)
            .into_iter()
            .map(|child| match child.kind() {
                "function_declaration" | "method_declaration" => Decl::Func(self.func_decl(child)),
                _ => Decl::Other(span(child)),
            })
            .collect()
    }

    fn func_decl(&self, node: Node) -> FuncDecl {
        let name = match node.child_by_field_name("name") {
            Some(n) => self.ident(n),
            None => Ident::new("", Span::point(node.start_byte())),
        };
        FuncDecl {
            name,
            recv: node
                .child_by_field_name("receiver")
                .map(|n| self.field_list(n)),
            ty: self.func_type(node),
            body: node.child_by_field_name("body").map(|n| self.block(n)),
            span: span(node),
        }
    }

    /// Signature of a declaration, literal, or function type node.
    fn func_type(&self, node: Node) -> FuncType {
        let params = node.child_by_field_name("parameters");
        let result = node.child_by_field_name("result");
        let end = result.or(params).map_or(node.end_byte(), |n| n.end_byte());
        FuncType {
            params: params.map(|n| self.field_list(n)),
            results: result.map(|n| self.results(n)),
            span: Span::new(node.start_byte(), end),
        }
    }

    fn results(&self, node: Node) -> FieldList {
        if node.kind() == "parameter_list" {
            return self.field_list(node);
        }
        FieldList {
            list: vec![Field {
                names: vec![],
                ty: self.expr(node),
                tag: None,
            }],
        }
    }

    fn field_list(&self, node: Node) -> FieldList {
        let list = named_children(node)
            .into_iter()
            .map(|decl| {
                let names = field_children(decl, "name")
                    .into_iter()
                    .map(|n| self.ident(n))
                    .collect();
                let ty = self.expr_field(decl, "type");
                let ty = if decl.kind() == "variadic_parameter_declaration" {
                    Expr::Ellipsis {
                        span: Span::new(decl.start_byte(), ty.span().end),
                        elt: Some(Box::new(ty)),
                    }
                } else {
                    ty
                };
                Field {
                    names,
                    ty,
                    tag: None,
                }
            })
            .collect();
        FieldList { list }
    }

    fn block(&self, node: Node) -> Block {
        Block {
            stmts: self.statements(node),
            span: span(node),
        }
    }

    /// Statements directly inside `node`; fielded children such as case
    /// values are skipped.
    fn statements(&self, node: Node) -> Vec<Stmt> {
        let mut out = Vec::new();
        for child in unfielded_children(node) {
            if child.kind() == "statement_list" {
                out.extend(self.statements(child));
            } else {
                out.push(self.stmt(child));
            }
        }
        out
    }

    fn clauses(&self, node: Node) -> Vec<CaseClause> {
        named_children(node)
            .into_iter()
            .filter(|c| c.kind().ends_with("_case"))
            .map(|clause| {
                let stmts = self.statements(clause);
                let body_span = match (stmts.first(), stmts.last()) {
                    (Some(first), Some(last)) => first.span().to(last.span()),
                    _ => Span::point(clause.end_byte()),
                };
                CaseClause {
                    body: Block {
                        stmts,
                        span: body_span,
                    },
                    span: span(clause),
                }
            })
            .collect()
    }

    fn stmt(&self, node: Node) -> Stmt {
        let sp = span(node);
        match node.kind() {
            "block" => Stmt::Block(self.block(node)),
            "if_statement" => Stmt::If(IfStmt {
                init: node
                    .child_by_field_name("initializer")
                    .map(|n| Box::new(self.stmt(n))),
                cond: self.expr_field(node, "condition"),
                body: match node.child_by_field_name("consequence") {
                    Some(n) => self.block(n),
                    None => Block::default(),
                },
                els: node
                    .child_by_field_name("alternative")
                    .map(|n| Box::new(self.stmt(n))),
                span: sp,
            }),
            "short_var_declaration" => self.assign(node, AssignKind::Define),
            "assignment_statement" => {
                let op = node
                    .child_by_field_name("operator")
                    .map(|n| self.text(n))
                    .unwrap_or("=");
                let kind = match op {
                    "=" => Some(AssignKind::Assign),
                    _ => op
                        .strip_suffix('=')
                        .and_then(BinaryOp::from_token)
                        .map(AssignKind::Compound),
                };
                match kind {
                    Some(kind) => self.assign(node, kind),
                    None => Stmt::Other {
                        kind: node.kind().to_string(),
                        span: sp,
                    },
                }
            }
            "return_statement" => {
                let results = match unfielded_children(node).first() {
                    Some(list) => self.expr_list(*list),
                    None => Vec::new(),
                };
                Stmt::Return(ReturnStmt { results, span: sp })
            }
            "expression_statement" => match named_children(node).first() {
                Some(x) => Stmt::Expr {
                    x: self.expr(*x),
                    span: sp,
                },
                None => Stmt::Empty(sp),
            },
            "for_statement" => {
                let body = match node.child_by_field_name("body") {
                    Some(n) => self.block(n),
                    None => Block::default(),
                };
                if named_children(node)
                    .iter()
                    .any(|c| c.kind() == "range_clause")
                {
                    Stmt::Range { body, span: sp }
                } else {
                    Stmt::For { body, span: sp }
                }
            }
            "expression_switch_statement" => Stmt::Switch {
                clauses: self.clauses(node),
                span: sp,
            },
            "type_switch_statement" => Stmt::TypeSwitch {
                clauses: self.clauses(node),
                span: sp,
            },
            "select_statement" => Stmt::Select {
                clauses: self.clauses(node),
                span: sp,
            },
            "labeled_statement" => {
                let label = match node.child_by_field_name("label") {
                    Some(n) => self.ident(n),
                    None => Ident::new("", Span::point(node.start_byte())),
                };
                let stmt = match unfielded_children(node).first() {
                    Some(inner) => self.stmt(*inner),
                    None => Stmt::Empty(Span::point(node.end_byte())),
                };
                Stmt::Labeled {
                    label,
                    stmt: Box::new(stmt),
                    span: sp,
                }
            }
            "empty_statement" => Stmt::Empty(sp),
            kind => Stmt::Other {
                kind: kind.to_string(),
                span: sp,
            },
        }
    }

    fn assign(&self, node: Node, kind: AssignKind) -> Stmt {
        let side = |field: &str| match node.child_by_field_name(field) {
            Some(list) => self.expr_list(list),
            None => Vec::new(),
        };
        Stmt::Assign(AssignStmt {
            lhs: side("left"),
            kind,
            rhs: side("right"),
            span: span(node),
        })
    }

    fn expr_list(&self, node: Node) -> Vec<Expr> {
        if node.kind() != "expression_list" {
            return vec![self.expr(node)];
        }
        named_children(node)
            .into_iter()
            .map(|n| self.expr(n))
            .collect()
    }

    fn expr_field(&self, node: Node, field: &str) -> Expr {
        match node.child_by_field_name(field) {
            Some(n) => self.expr(n),
            None => Expr::Bad {
                kind: format!("missing {}", field),
                span: Span::point(node.end_byte()),
            },
        }
    }

    fn opt_field(&self, node: Node, field: &str) -> Option<Box<Expr>> {
        node.child_by_field_name(field)
            .map(|n| Box::new(self.expr(n)))
    }

    fn boxed_field(&self, node: Node, field: &str) -> Box<Expr> {
        Box::new(self.expr_field(node, field))
    }

    /// Expression built from the first named child, for wrapper nodes.
    fn inner(&self, node: Node) -> Box<Expr> {
        Box::new(match named_children(node).first() {
            Some(n) => self.expr(*n),
            None => Expr::Bad {
                kind: node.kind().to_string(),
                span: span(node),
            },
        })
    }

    fn lit(&self, node: Node, kind: LitKind) -> Expr {
        Expr::BasicLit(BasicLit {
            kind,
            value: self.text(node).to_string(),
            span: span(node),
        })
    }

    fn expr(&self, node: Node) -> Expr {
        let sp = span(node);
        match node.kind() {
            "identifier" | "type_identifier" | "field_identifier" | "package_identifier"
            | "label_name" | "blank_identifier" | "nil" | "true" | "false" | "iota" => {
                Expr::Ident(self.ident(node))
            }
            "int_literal" => self.lit(node, LitKind::Int),
            "float_literal" => self.lit(node, LitKind::Float),
            "imaginary_literal" => self.lit(node, LitKind::Imag),
            "rune_literal" => self.lit(node, LitKind::Char),
            "raw_string_literal" | "interpreted_string_literal" => self.lit(node, LitKind::String),
            "composite_literal" => Expr::CompositeLit(CompositeLit {
                ty: self.opt_field(node, "type"),
                elts: match node.child_by_field_name("body") {
                    Some(body) => self.elements(body),
                    None => Vec::new(),
                },
                incomplete: node.has_error(),
                span: sp,
            }),
            "literal_value" => Expr::CompositeLit(CompositeLit {
                ty: None,
                elts: self.elements(node),
                incomplete: node.has_error(),
                span: sp,
            }),
            "literal_element" => *self.inner(node),
            "keyed_element" => {
                let parts = named_children(node);
                match parts.as_slice() {
                    [key, value] => Expr::KeyValue {
                        key: Box::new(self.expr(*key)),
                        value: Box::new(self.expr(*value)),
                        span: sp,
                    },
                    _ => Expr::Bad {
                        kind: node.kind().to_string(),
                        span: sp,
                    },
                }
            }
            "func_literal" => Expr::FuncLit(FuncLit {
                ty: self.func_type(node),
                body: match node.child_by_field_name("body") {
                    Some(n) => self.block(n),
                    None => Block::default(),
                },
                span: sp,
            }),
            "parenthesized_expression" | "parenthesized_type" => Expr::Paren {
                x: self.inner(node),
                span: sp,
            },
            "selector_expression" => Expr::Selector {
                x: self.boxed_field(node, "operand"),
                sel: match node.child_by_field_name("field") {
                    Some(n) => self.ident(n),
                    None => Ident::new("", Span::point(node.end_byte())),
                },
                span: sp,
            },
            "qualified_type" => Expr::Selector {
                x: self.boxed_field(node, "package"),
                sel: match node.child_by_field_name("name") {
                    Some(n) => self.ident(n),
                    None => Ident::new("", Span::point(node.end_byte())),
                },
                span: sp,
            },
            "index_expression" => Expr::Index {
                x: self.boxed_field(node, "operand"),
                indices: vec![self.expr_field(node, "index")],
                span: sp,
            },
            "generic_type" => Expr::Index {
                x: self.boxed_field(node, "type"),
                indices: match node.child_by_field_name("type_arguments") {
                    Some(args) => named_children(args)
                        .into_iter()
                        .map(|n| self.expr(n))
                        .collect(),
                    None => Vec::new(),
                },
                span: sp,
            },
            "type_instantiation_expression" => Expr::Index {
                x: self.boxed_field(node, "type"),
                indices: unfielded_children(node)
                    .into_iter()
                    .map(|n| self.expr(n))
                    .collect(),
                span: sp,
            },
            "slice_expression" => {
                let max = self.opt_field(node, "capacity");
                Expr::Slice(SliceExpr {
                    x: self.boxed_field(node, "operand"),
                    low: self.opt_field(node, "start"),
                    high: self.opt_field(node, "end"),
                    slice3: max.is_some(),
                    max,
                    span: sp,
                })
            }
            "type_assertion_expression" => Expr::TypeAssert {
                x: self.boxed_field(node, "operand"),
                ty: self.opt_field(node, "type"),
                span: sp,
            },
            "call_expression" => self.call(node),
            "type_conversion_expression" => Expr::Call(CallExpr {
                fun: self.boxed_field(node, "type"),
                args: vec![self.expr_field(node, "operand")],
                ellipsis: false,
                span: sp,
            }),
            "unary_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .map(|n| self.text(n))
                    .unwrap_or("");
                let x = self.boxed_field(node, "operand");
                match op {
                    "*" => Expr::Star { x, span: sp },
                    _ => match UnaryOp::from_token(op) {
                        Some(op) => Expr::Unary { op, x, span: sp },
                        None => Expr::Bad {
                            kind: node.kind().to_string(),
                            span: sp,
                        },
                    },
                }
            }
            "binary_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .map(|n| self.text(n))
                    .and_then(BinaryOp::from_token);
                match op {
                    Some(op) => Expr::Binary {
                        x: self.boxed_field(node, "left"),
                        op,
                        y: self.boxed_field(node, "right"),
                        span: sp,
                    },
                    None => Expr::Bad {
                        kind: node.kind().to_string(),
                        span: sp,
                    },
                }
            }
            "pointer_type" => Expr::Star {
                x: self.inner(node),
                span: sp,
            },
            "negated_type" => Expr::Unary {
                op: UnaryOp::Tilde,
                x: self.inner(node),
                span: sp,
            },
            "type_elem" | "constraint_elem" => self.union(node),
            "array_type" => Expr::ArrayType {
                len: self.opt_field(node, "length"),
                elt: self.boxed_field(node, "element"),
                span: sp,
            },
            "implicit_length_array_type" => Expr::ArrayType {
                len: Some(Box::new(Expr::Ellipsis {
                    elt: None,
                    span: Span::new(sp.start + 1, sp.start + 4),
                })),
                elt: self.boxed_field(node, "element"),
                span: sp,
            },
            "slice_type" => Expr::ArrayType {
                len: None,
                elt: self.boxed_field(node, "element"),
                span: sp,
            },
            "map_type" => Expr::MapType {
                key: self.boxed_field(node, "key"),
                value: self.boxed_field(node, "value"),
                span: sp,
            },
            "channel_type" => Expr::ChanType {
                dir: chan_dir(node),
                value: self.boxed_field(node, "value"),
                span: sp,
            },
            "function_type" => Expr::FuncType(self.func_type(node)),
            "struct_type" => Expr::StructType {
                fields: match named_children(node).first() {
                    Some(list) => self.struct_fields(*list),
                    None => FieldList::default(),
                },
                incomplete: node.has_error(),
                span: sp,
            },
            "interface_type" => Expr::InterfaceType {
                methods: self.interface_elems(node),
                incomplete: node.has_error(),
                span: sp,
            },
            "variadic_argument" => *self.inner(node),
            kind => Expr::Bad {
                kind: kind.to_string(),
                span: sp,
            },
        }
    }

    fn call(&self, node: Node) -> Expr {
        let mut args = Vec::new();
        let mut ellipsis = false;
        if let Some(list) = node.child_by_field_name("arguments") {
            for arg in named_children(list) {
                if arg.kind() == "variadic_argument" {
                    ellipsis = true;
                }
                args.push(self.expr(arg));
            }
        }
        Expr::Call(CallExpr {
            fun: self.boxed_field(node, "function"),
            args,
            ellipsis,
            span: span(node),
        })
    }

    fn elements(&self, body: Node) -> Vec<Expr> {
        named_children(body)
            .into_iter()
            .map(|n| self.expr(n))
            .collect()
    }

    /// `A | B | C` constraint terms, folded left like binary expressions.
    fn union(&self, node: Node) -> Expr {
        let mut terms = named_children(node).into_iter();
        let Some(first) = terms.next() else {
            return Expr::Bad {
                kind: node.kind().to_string(),
                span: span(node),
            };
        };
        terms.fold(self.expr(first), |acc, term| {
            let y = self.expr(term);
            Expr::Binary {
                span: acc.span().to(y.span()),
                x: Box::new(acc),
                op: BinaryOp::Or,
                y: Box::new(y),
            }
        })
    }

    fn struct_fields(&self, list: Node) -> FieldList {
        let fields = named_children(list)
            .into_iter()
            .filter(|n| n.kind() == "field_declaration")
            .map(|decl| {
                let names: Vec<Ident> = field_children(decl, "name")
                    .into_iter()
                    .map(|n| self.ident(n))
                    .collect();
                let mut ty = self.expr_field(decl, "type");
                if names.is_empty() && self.text(decl).starts_with('*') {
                    ty = Expr::Star {
                        span: Span::new(decl.start_byte(), ty.span().end),
                        x: Box::new(ty),
                    };
                }
                let tag = decl.child_by_field_name("tag").map(|n| BasicLit {
                    kind: LitKind::String,
                    value: self.text(n).to_string(),
                    span: span(n),
                });
                Field { names, ty, tag }
            })
            .collect();
        FieldList { list: fields }
    }

    fn interface_elems(&self, node: Node) -> FieldList {
        let list = named_children(node)
            .into_iter()
            .map(|elem| match elem.kind() {
                "method_elem" | "method_spec" => Field {
                    names: elem
                        .child_by_field_name("name")
                        .map(|n| self.ident(n))
                        .into_iter()
                        .collect(),
                    ty: Expr::FuncType(self.func_type(elem)),
                    tag: None,
                },
                _ => Field {
                    names: vec![],
                    ty: self.expr(elem),
                    tag: None,
                },
            })
            .collect();
        FieldList { list }
    }
}

fn chan_dir(node: Node) -> ChanDir {
    let mut cursor = node.walk();
    let tokens: Vec<&str> = node
        .children(&mut cursor)
        .filter(|c| !c.is_named())
        .map(|c| c.kind())
        .collect();
    match tokens.as_slice() {
        ["<-", "chan", ..] => ChanDir::Recv,
        ["chan", "<-", ..] => ChanDir::Send,
        _ => ChanDir::Both,
    }
}
