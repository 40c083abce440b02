// AST definitions consumed by the ape interpreter
//
// The lexer, parser and type checker live outside this crate; they hand the
// interpreter a validated tree built from these nodes. The small constructor
// helpers at the bottom of the file let embedders and tests assemble programs
// without going through source text.

use std::rc::Rc;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Kind of a literal token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Str,
    Int,
    Rational,
    True,
    False,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
}

impl BinOp {
    /// Operator as written in source, used in diagnostics
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not, // !x
    Neg, // -x
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, `None` for `=`
    pub fn binary_op(&self) -> Option<BinOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinOp::Add),
            AssignOp::SubAssign => Some(BinOp::Sub),
            AssignOp::MulAssign => Some(BinOp::Mul),
            AssignOp::DivAssign => Some(BinOp::Div),
            AssignOp::ModAssign => Some(BinOp::Mod),
        }
    }
}

/// Increment / decrement statement operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncOp {
    Increment,
    Decrement,
}

/// Expressions
#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        kind: LiteralKind,
        lexeme: String,
    },
    Ident(String),
    Group(Box<Expr>),
    Unary {
        op: UnOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Dot {
        object: Box<Expr>,
        field: String,
    },
    Index {
        container: Box<Expr>,
        index: Box<Expr>,
    },
    List(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
}

/// A brace-delimited statement list
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Block { statements }
    }
}

/// Condition and body of an `if` or `elif` arm
#[derive(Debug, Clone)]
pub struct CondBlock {
    pub condition: Expr,
    pub body: Block,
}

/// Switch case
#[derive(Debug, Clone)]
pub enum CaseNode {
    Case { value: Expr, body: Block },
    Default { body: Block },
}

impl CaseNode {
    pub fn body(&self) -> &Block {
        match self {
            CaseNode::Case { body, .. } => body,
            CaseNode::Default { body } => body,
        }
    }
}

/// `seize(pattern) { body }`; a bare `seize { body }` has no pattern
#[derive(Debug, Clone)]
pub struct Seize {
    pub pattern: Option<Expr>,
    pub body: Block,
}

/// `skip { body } seize(...) { ... } ...`
#[derive(Debug, Clone)]
pub struct SkipStmt {
    pub body: Block,
    pub seizes: Vec<Seize>,
}

/// Statements
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Block(Block),
    Expr {
        expr: Expr,
        /// Statement replayed to invert `expr` when a skip rolls back
        undo: Option<Rc<Stmt>>,
    },
    Return(Option<Expr>),
    Decl(Decl),
    Assign {
        target: Expr,
        op: AssignOp,
        value: Expr,
    },
    IncDec {
        target: Expr,
        op: IncOp,
    },
    /// `for` and `while`; a `while` loop has no initializer
    For {
        init: Option<VarDecl>,
        condition: Expr,
        increment: Option<Box<Stmt>>,
        body: Block,
    },
    If {
        branches: Vec<CondBlock>,
        else_branch: Option<Block>,
    },
    Break,
    Fallthrough,
    Switch {
        subject: Expr,
        cases: Vec<CaseNode>,
    },
    Skip(SkipStmt),
    Reverse(Expr),
}

/// Function declaration
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Block>,
}

/// `var`/`val` declaration; a missing initializer binds Void
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub value: Option<Expr>,
}

/// Class declaration
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub members: Vec<Decl>,
}

/// Declarations
#[derive(Debug, Clone)]
pub enum Decl {
    Func(FuncDecl),
    Var(VarDecl),
    Class(ClassDecl),
}

/// Top-level program structure
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub declarations: Vec<Decl>,
}

impl Program {
    pub fn new(declarations: Vec<Decl>) -> Self {
        Program { declarations }
    }
}

// Constructors

impl Expr {
    pub fn literal(kind: LiteralKind, lexeme: impl Into<String>) -> Self {
        Expr::Literal {
            kind,
            lexeme: lexeme.into(),
        }
    }

    pub fn int(n: i64) -> Self {
        Expr::literal(LiteralKind::Int, n.to_string())
    }

    pub fn rational(x: f64) -> Self {
        Expr::literal(LiteralKind::Rational, format!("{:?}", x))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::literal(LiteralKind::Str, s)
    }

    pub fn bool(b: bool) -> Self {
        if b {
            Expr::literal(LiteralKind::True, "true")
        } else {
            Expr::literal(LiteralKind::False, "false")
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn group(expr: Expr) -> Self {
        Expr::Group(Box::new(expr))
    }

    pub fn unary(op: UnOp, expr: Expr) -> Self {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Call of a named function: `name(args...)`
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(Expr::ident(name)),
            args,
        }
    }

    pub fn call_value(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn dot(object: Expr, field: impl Into<String>) -> Self {
        Expr::Dot {
            object: Box::new(object),
            field: field.into(),
        }
    }

    pub fn index(container: Expr, index: Expr) -> Self {
        Expr::Index {
            container: Box::new(container),
            index: Box::new(index),
        }
    }
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Stmt {
            kind,
            location: SourceLocation::default(),
        }
    }

    /// Attach a source location
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.location = SourceLocation::new(line, column);
        self
    }

    pub fn expr(expr: Expr) -> Self {
        Stmt::new(StmtKind::Expr { expr, undo: None })
    }

    /// Expression statement carrying an `undo` annotation
    pub fn expr_with_undo(expr: Expr, undo: Stmt) -> Self {
        Stmt::new(StmtKind::Expr {
            expr,
            undo: Some(Rc::new(undo)),
        })
    }

    pub fn block(statements: Vec<Stmt>) -> Self {
        Stmt::new(StmtKind::Block(Block::new(statements)))
    }

    pub fn ret(expr: Expr) -> Self {
        Stmt::new(StmtKind::Return(Some(expr)))
    }

    pub fn ret_void() -> Self {
        Stmt::new(StmtKind::Return(None))
    }

    /// `name := value`
    pub fn var(name: impl Into<String>, value: Expr) -> Self {
        Stmt::new(StmtKind::Decl(Decl::var(name, value)))
    }

    pub fn decl(decl: Decl) -> Self {
        Stmt::new(StmtKind::Decl(decl))
    }

    /// `name = value`
    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Stmt::assign_to(Expr::ident(name), AssignOp::Assign, value)
    }

    pub fn assign_to(target: Expr, op: AssignOp, value: Expr) -> Self {
        Stmt::new(StmtKind::Assign { target, op, value })
    }

    pub fn increment(target: Expr) -> Self {
        Stmt::new(StmtKind::IncDec {
            target,
            op: IncOp::Increment,
        })
    }

    pub fn decrement(target: Expr) -> Self {
        Stmt::new(StmtKind::IncDec {
            target,
            op: IncOp::Decrement,
        })
    }

    pub fn for_loop(init: VarDecl, condition: Expr, increment: Stmt, body: Vec<Stmt>) -> Self {
        Stmt::new(StmtKind::For {
            init: Some(init),
            condition,
            increment: Some(Box::new(increment)),
            body: Block::new(body),
        })
    }

    pub fn while_loop(condition: Expr, body: Vec<Stmt>) -> Self {
        Stmt::new(StmtKind::For {
            init: None,
            condition,
            increment: None,
            body: Block::new(body),
        })
    }

    pub fn if_else(condition: Expr, then_body: Vec<Stmt>, else_body: Option<Vec<Stmt>>) -> Self {
        Stmt::new(StmtKind::If {
            branches: vec![CondBlock {
                condition,
                body: Block::new(then_body),
            }],
            else_branch: else_body.map(Block::new),
        })
    }

    pub fn brk() -> Self {
        Stmt::new(StmtKind::Break)
    }

    pub fn fallthrough() -> Self {
        Stmt::new(StmtKind::Fallthrough)
    }

    pub fn switch(subject: Expr, cases: Vec<CaseNode>) -> Self {
        Stmt::new(StmtKind::Switch { subject, cases })
    }

    pub fn skip(body: Vec<Stmt>, seizes: Vec<Seize>) -> Self {
        Stmt::new(StmtKind::Skip(SkipStmt {
            body: Block::new(body),
            seizes,
        }))
    }

    pub fn reverse(payload: Expr) -> Self {
        Stmt::new(StmtKind::Reverse(payload))
    }
}

impl CaseNode {
    pub fn case(value: Expr, body: Vec<Stmt>) -> Self {
        CaseNode::Case {
            value,
            body: Block::new(body),
        }
    }

    pub fn default(body: Vec<Stmt>) -> Self {
        CaseNode::Default {
            body: Block::new(body),
        }
    }
}

impl Seize {
    pub fn matching(pattern: Expr, body: Vec<Stmt>) -> Self {
        Seize {
            pattern: Some(pattern),
            body: Block::new(body),
        }
    }

    /// Bare `seize { ... }`, tried after every pattern
    pub fn any(body: Vec<Stmt>) -> Self {
        Seize {
            pattern: None,
            body: Block::new(body),
        }
    }
}

impl Decl {
    pub fn func(name: impl Into<String>, params: &[&str], body: Vec<Stmt>) -> Self {
        Decl::Func(FuncDecl {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Rc::new(Block::new(body)),
        })
    }

    pub fn var(name: impl Into<String>, value: Expr) -> Self {
        Decl::Var(VarDecl::new(name, Some(value)))
    }
}

impl VarDecl {
    pub fn new(name: impl Into<String>, value: Option<Expr>) -> Self {
        VarDecl {
            name: name.into(),
            value,
        }
    }
}
