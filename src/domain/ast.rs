//! Go syntax tree used by the try analysis.
//!
//! Only the shapes the analysis needs are modelled precisely; everything else
//! is carried as an opaque node with its source span so that the printer can
//! reproduce it verbatim.

use std::fmt;

/// Byte range into the original source (end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `pos`; used for synthesized identifiers.
    pub fn point(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn to(self, end: Span) -> Span {
        Span::new(self.start, end.end)
    }
}

/// A 1-based source location, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Line start offsets for one source file.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// Returns the 1-based (line, column) of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - self.starts[line] + 1)
    }
}

/// One parsed Go source file.
#[derive(Debug, Clone)]
pub struct File {
    pub path: String,
    pub decls: Vec<Decl>,
    pub lines: LineIndex,
    /// Comment ranges in source order. Comments are not attached to nodes;
    /// the printer uses these to keep the ones a rewrite absorbs.
    pub comments: Vec<Span>,
}

/// Borrowed view of a file's path and line index; lets the walker resolve
/// positions while it holds the declarations mutably.
#[derive(Debug, Clone, Copy)]
pub struct Locator<'a> {
    path: &'a str,
    lines: &'a LineIndex,
}

impl<'a> Locator<'a> {
    pub fn new(path: &'a str, lines: &'a LineIndex) -> Self {
        Self { path, lines }
    }

    pub fn position(&self, offset: usize) -> Position {
        let (line, column) = self.lines.line_col(offset);
        Position {
            file: self.path.to_string(),
            line,
            column,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Decl {
    Func(FuncDecl),
    /// Imports, package clause, type/var/const declarations.
    Other(Span),
}

/// A top-level function or method declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    pub recv: Option<FieldList>,
    pub ty: FuncType,
    /// Absent for declarations implemented elsewhere (assembly, linkname).
    pub body: Option<Block>,
    pub span: Span,
}

impl FuncDecl {
    /// Reports whether the last declared result has the type name `type_name`.
    /// The type is matched by name only.
    pub fn has_error_result(&self, type_name: &str) -> bool {
        match self.ty.results.as_ref().and_then(|r| r.list.last()) {
            Some(field) => field.ty.is_ident(type_name),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit {
    pub kind: LitKind,
    /// Literal text exactly as written, quotes included.
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    Xor,
    And,
    Arrow,
    Tilde,
}

impl UnaryOp {
    pub fn from_token(tok: &str) -> Option<Self> {
        Some(match tok {
            "+" => UnaryOp::Plus,
            "-" => UnaryOp::Minus,
            "!" => UnaryOp::Not,
            "^" => UnaryOp::Xor,
            "&" => UnaryOp::And,
            "<-" => UnaryOp::Arrow,
            "~" => UnaryOp::Tilde,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    LAnd,
    LOr,
    Eql,
    Neq,
    Lss,
    Gtr,
    Leq,
    Geq,
}

impl BinaryOp {
    pub fn from_token(tok: &str) -> Option<Self> {
        Some(match tok {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Quo,
            "%" => BinaryOp::Rem,
            "&" => BinaryOp::And,
            "|" => BinaryOp::Or,
            "^" => BinaryOp::Xor,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "&^" => BinaryOp::AndNot,
            "&&" => BinaryOp::LAnd,
            "||" => BinaryOp::LOr,
            "==" => BinaryOp::Eql,
            "!=" => BinaryOp::Neq,
            "<" => BinaryOp::Lss,
            ">" => BinaryOp::Gtr,
            "<=" => BinaryOp::Leq,
            ">=" => BinaryOp::Geq,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<BasicLit>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldList {
    pub list: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    pub params: Option<FieldList>,
    pub results: Option<FieldList>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLit {
    pub ty: Option<Box<Expr>>,
    pub elts: Vec<Expr>,
    /// Set when the literal's element list could not be fully recovered.
    pub incomplete: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncLit {
    pub ty: FuncType,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub fun: Box<Expr>,
    pub args: Vec<Expr>,
    /// `f(xs...)`
    pub ellipsis: bool,
    pub span: Span,
}

impl CallExpr {
    /// Reports whether this call was synthesized by the rewrite rather than
    /// parsed. Synthesized callees carry a zero-width span.
    pub fn is_synthetic(&self) -> bool {
        matches!(&*self.fun, Expr::Ident(id) if id.span.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpr {
    pub x: Box<Expr>,
    pub low: Option<Box<Expr>>,
    pub high: Option<Box<Expr>>,
    pub max: Option<Box<Expr>>,
    pub slice3: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    CompositeLit(CompositeLit),
    FuncLit(FuncLit),
    Paren {
        x: Box<Expr>,
        span: Span,
    },
    Selector {
        x: Box<Expr>,
        sel: Ident,
        span: Span,
    },
    Index {
        x: Box<Expr>,
        indices: Vec<Expr>,
        span: Span,
    },
    Slice(SliceExpr),
    TypeAssert {
        x: Box<Expr>,
        /// `None` for `x.(type)`.
        ty: Option<Box<Expr>>,
        span: Span,
    },
    Call(CallExpr),
    Star {
        x: Box<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        x: Box<Expr>,
        span: Span,
    },
    Binary {
        x: Box<Expr>,
        op: BinaryOp,
        y: Box<Expr>,
        span: Span,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Ellipsis {
        elt: Option<Box<Expr>>,
        span: Span,
    },
    ArrayType {
        /// `None` for slice types.
        len: Option<Box<Expr>>,
        elt: Box<Expr>,
        span: Span,
    },
    StructType {
        fields: FieldList,
        incomplete: bool,
        span: Span,
    },
    FuncType(FuncType),
    InterfaceType {
        methods: FieldList,
        incomplete: bool,
        span: Span,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    ChanType {
        dir: ChanDir,
        value: Box<Expr>,
        span: Span,
    },
    /// Anything the frontend does not model.
    Bad {
        kind: String,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(id) => id.span,
            Expr::BasicLit(lit) => lit.span,
            Expr::CompositeLit(lit) => lit.span,
            Expr::FuncLit(lit) => lit.span,
            Expr::Call(call) => call.span,
            Expr::Slice(s) => s.span,
            Expr::FuncType(ft) => ft.span,
            Expr::Paren { span, .. }
            | Expr::Selector { span, .. }
            | Expr::Index { span, .. }
            | Expr::TypeAssert { span, .. }
            | Expr::Star { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::KeyValue { span, .. }
            | Expr::Ellipsis { span, .. }
            | Expr::ArrayType { span, .. }
            | Expr::StructType { span, .. }
            | Expr::InterfaceType { span, .. }
            | Expr::MapType { span, .. }
            | Expr::ChanType { span, .. }
            | Expr::Bad { span, .. } => *span,
        }
    }

    /// Reports whether the expression is the identifier `name`.
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Expr::Ident(id) if id.name == name)
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call(_))
    }
}

/// An ordered, owned statement sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    /// Includes the braces when the block is braced; case clause bodies span
    /// their statements only.
    pub span: Span,
}

impl Block {
    /// Drops every slot whose tombstone is set, keeping survivors in order.
    pub fn compact(&mut self, tombstones: &[bool]) {
        debug_assert_eq!(tombstones.len(), self.stmts.len());
        let mut slot = 0;
        self.stmts.retain(|_| {
            let keep = !tombstones[slot];
            slot += 1;
            keep
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignKind {
    /// `:=`
    Define,
    /// `=`
    Assign,
    /// `+=`, `<<=`, ...
    Compound(BinaryOp),
}

impl AssignKind {
    pub fn token(&self) -> &'static str {
        match self {
            AssignKind::Define => ":=",
            AssignKind::Assign => "=",
            AssignKind::Compound(op) => match op {
                BinaryOp::Add => "+=",
                BinaryOp::Sub => "-=",
                BinaryOp::Mul => "*=",
                BinaryOp::Quo => "/=",
                BinaryOp::Rem => "%=",
                BinaryOp::And => "&=",
                BinaryOp::Or => "|=",
                BinaryOp::Xor => "^=",
                BinaryOp::Shl => "<<=",
                BinaryOp::Shr => ">>=",
                BinaryOp::AndNot => "&^=",
                _ => "=",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub kind: AssignKind,
    pub rhs: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub body: Block,
    pub els: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub results: Vec<Expr>,
    pub span: Span,
}

/// A `case`/`default` clause of a switch or select statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Block),
    If(IfStmt),
    Assign(AssignStmt),
    Return(ReturnStmt),
    Expr {
        x: Expr,
        span: Span,
    },
    For {
        body: Block,
        span: Span,
    },
    Range {
        body: Block,
        span: Span,
    },
    Switch {
        clauses: Vec<CaseClause>,
        span: Span,
    },
    TypeSwitch {
        clauses: Vec<CaseClause>,
        span: Span,
    },
    Select {
        clauses: Vec<CaseClause>,
        span: Span,
    },
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
        span: Span,
    },
    Empty(Span),
    /// Declarations, inc/dec, send, go, defer, and branch statements.
    Other {
        kind: String,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(b) => b.span,
            Stmt::If(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Empty(span) => *span,
            Stmt::Expr { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Range { span, .. }
            | Stmt::Switch { span, .. }
            | Stmt::TypeSwitch { span, .. }
            | Stmt::Select { span, .. }
            | Stmt::Labeled { span, .. }
            | Stmt::Other { span, .. } => *span,
        }
    }
}
