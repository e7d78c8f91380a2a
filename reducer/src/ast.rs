// AST node types for the GLSL subset handled by the reducer.
//
// A `TranslationUnit` is the tree of one shader stage. Every declaration,
// statement and expression carries a `NodeId`; nodes never point at their
// parent (see `parent_map` for the recomputed parent index).
//
// Preconditions: produced by the parser, or synthesised by `synth`.
// Postconditions: after `number_nodes`, every node has a distinct id.
// Failure modes: none (data-only module).
// Side effects: none.

use crate::id::{IdAllocator, NodeId};

// ── Root ──

/// The tree of one shader stage: an ordered list of top-level declarations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationUnit {
    pub declarations: Vec<Declaration>,
}

impl TranslationUnit {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        TranslationUnit { declarations }
    }

    /// Remove the top-level declaration with the given id. Returns it if found.
    pub fn remove_declaration(&mut self, id: NodeId) -> Option<Declaration> {
        let pos = self.declarations.iter().position(|d| d.id == id)?;
        Some(self.declarations.remove(pos))
    }

    /// Add a top-level declaration after the leading preamble
    /// (directives and default-precision statements).
    pub fn add_declaration(&mut self, decl: Declaration) {
        let pos = self
            .declarations
            .iter()
            .position(|d| !d.is_preamble())
            .unwrap_or(self.declarations.len());
        self.declarations.insert(pos, decl);
    }

    /// Assign fresh ids to every node that still carries the placeholder.
    pub fn number_nodes(&mut self, ids: &mut IdAllocator) {
        crate::walk::number_nodes(self, ids);
    }
}

// ── Declarations ──

/// A top-level declaration with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub id: NodeId,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn new(kind: DeclKind) -> Self {
        Declaration {
            id: NodeId::UNASSIGNED,
            kind,
        }
    }

    fn is_preamble(&self) -> bool {
        matches!(self.kind, DeclKind::Directive(_) | DeclKind::Precision { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// A preprocessor line kept verbatim, e.g. `#version 310 es`.
    Directive(String),
    /// `precision highp float;`
    Precision {
        precision: Precision,
        ty: BasicType,
    },
    /// `uniform float a, b[2] = ...;`
    Variables(VariablesDecl),
    /// `layout(std430, binding = 0) buffer name { int data[]; } instance;`
    InterfaceBlock(InterfaceBlock),
    /// Qualifier-only declaration, e.g. `layout(local_size_x = 1) in;`
    Qualifiers(Vec<TypeQualifier>),
    /// Function prototype (`body == None`) or definition.
    Function(FunctionDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariablesDecl {
    pub ty: QualifiedType,
    pub vars: Vec<VarDeclInfo>,
}

impl VariablesDecl {
    pub fn has_qualifier(&self, qualifier: &TypeQualifier) -> bool {
        self.ty.qualifiers.contains(qualifier)
    }
}

/// One declarator: `name`, `name[size]`, `name = init`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclInfo {
    pub name: String,
    pub array: Option<ArrayInfo>,
    pub init: Option<Expr>,
}

/// Array suffix on a declarator; `size == None` for `name[]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayInfo {
    pub size: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceBlock {
    pub qualifiers: Vec<TypeQualifier>,
    pub name: String,
    pub members: Vec<BlockMember>,
    pub instance: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockMember {
    pub ty: QualifiedType,
    pub name: String,
    pub array: Option<ArrayInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub return_type: QualifiedType,
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub body: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub ty: QualifiedType,
    pub name: Option<String>,
    pub array: Option<ArrayInfo>,
}

// ── Types ──

#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedType {
    pub qualifiers: Vec<TypeQualifier>,
    pub base: BasicType,
}

impl QualifiedType {
    pub fn plain(base: BasicType) -> Self {
        QualifiedType {
            qualifiers: Vec::new(),
            base,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeQualifier {
    Const,
    Uniform,
    In,
    Out,
    InOut,
    Flat,
    Buffer,
    Precision(Precision),
    Layout(Vec<LayoutQualifier>),
}

/// `name` or `name = value` inside `layout(...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutQualifier {
    pub name: String,
    pub value: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    High,
    Medium,
    Low,
}

/// Built-in GLSL types. Struct types are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    Void,
    Bool,
    Int,
    Uint,
    Float,
    Vec(u8),
    IVec(u8),
    UVec(u8),
    BVec(u8),
    Mat(u8, u8),
    Sampler2D,
    Sampler3D,
    SamplerCube,
}

impl BasicType {
    /// Map a GLSL type name to a basic type.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "void" => BasicType::Void,
            "bool" => BasicType::Bool,
            "int" => BasicType::Int,
            "uint" => BasicType::Uint,
            "float" => BasicType::Float,
            "sampler2D" => BasicType::Sampler2D,
            "sampler3D" => BasicType::Sampler3D,
            "samplerCube" => BasicType::SamplerCube,
            _ => return Self::from_composite_name(name),
        };
        Some(ty)
    }

    fn from_composite_name(name: &str) -> Option<Self> {
        let dim = |s: &str| match s {
            "2" => Some(2u8),
            "3" => Some(3),
            "4" => Some(4),
            _ => None,
        };
        if let Some(rest) = name.strip_prefix("mat") {
            return match rest.split_once('x') {
                Some((cols, rows)) => Some(BasicType::Mat(dim(cols)?, dim(rows)?)),
                None => dim(rest).map(|n| BasicType::Mat(n, n)),
            };
        }
        if let Some(n) = name.strip_prefix("ivec") {
            return dim(n).map(BasicType::IVec);
        }
        if let Some(n) = name.strip_prefix("uvec") {
            return dim(n).map(BasicType::UVec);
        }
        if let Some(n) = name.strip_prefix("bvec") {
            return dim(n).map(BasicType::BVec);
        }
        if let Some(n) = name.strip_prefix("vec") {
            return dim(n).map(BasicType::Vec);
        }
        None
    }
}

// ── Statements ──

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Stmt {
            id: NodeId::UNASSIGNED,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Block(Vec<Stmt>),
    Decl(VariablesDecl),
    Expr(Expr),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    For {
        init: Box<Stmt>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Discard,
    Empty,
}

// ── Expressions ──

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            id: NodeId::UNASSIGNED,
            kind,
        }
    }

    pub fn literal(lit: Literal) -> Self {
        Expr::new(ExprKind::Literal(lit))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::new(ExprKind::Variable(name.into()))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::new(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn index(base: Expr, index: Expr) -> Self {
        Expr::new(ExprKind::Index {
            base: Box::new(base),
            index: Box::new(index),
        })
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExprKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Variable(String),
    Paren(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// Function call or type constructor, e.g. `vec4(1.0)`.
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// Field selection or swizzle, e.g. `v.xyz`.
    Member {
        base: Box<Expr>,
        field: String,
    },
}

/// A constant leaf. Integer literals are 32-bit per GLSL ES.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Int(i32),
    Uint(u32),
    Float(f32),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalXor,
    LogicalOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}
