// printer.rs — GLSL text output for shader ASTs
//
// Deterministic pretty-printer. Parentheses are AST nodes, so printing adds
// none: the output re-parses to a tree of the same shape.
//
// Preconditions: none.
// Postconditions: output ends with a newline when the unit is non-empty.
// Failure modes: none.
// Side effects: none.

use std::fmt::{self, Write};

use crate::ast::*;

const INDENT: &str = "  ";

/// Print a whole translation unit.
pub fn to_glsl(tu: &TranslationUnit) -> String {
    let mut p = Printer::default();
    for decl in &tu.declarations {
        p.declaration(decl);
    }
    p.out
}

impl fmt::Display for TranslationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_glsl(self))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_expr(&mut out, self);
        f.write_str(&out)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Uint(v) => write!(f, "{v}u"),
            // Debug keeps a fractional part or an exponent, so the text stays a float literal.
            Literal::Float(v) => write!(f, "{v:?}"),
            Literal::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasicType::Void => write!(f, "void"),
            BasicType::Bool => write!(f, "bool"),
            BasicType::Int => write!(f, "int"),
            BasicType::Uint => write!(f, "uint"),
            BasicType::Float => write!(f, "float"),
            BasicType::Vec(n) => write!(f, "vec{n}"),
            BasicType::IVec(n) => write!(f, "ivec{n}"),
            BasicType::UVec(n) => write!(f, "uvec{n}"),
            BasicType::BVec(n) => write!(f, "bvec{n}"),
            BasicType::Mat(c, r) if c == r => write!(f, "mat{c}"),
            BasicType::Mat(c, r) => write!(f, "mat{c}x{r}"),
            BasicType::Sampler2D => write!(f, "sampler2D"),
            BasicType::Sampler3D => write!(f, "sampler3D"),
            BasicType::SamplerCube => write!(f, "samplerCube"),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::High => write!(f, "highp"),
            Precision::Medium => write!(f, "mediump"),
            Precision::Low => write!(f, "lowp"),
        }
    }
}

impl fmt::Display for TypeQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeQualifier::Const => write!(f, "const"),
            TypeQualifier::Uniform => write!(f, "uniform"),
            TypeQualifier::In => write!(f, "in"),
            TypeQualifier::Out => write!(f, "out"),
            TypeQualifier::InOut => write!(f, "inout"),
            TypeQualifier::Flat => write!(f, "flat"),
            TypeQualifier::Buffer => write!(f, "buffer"),
            TypeQualifier::Precision(p) => write!(f, "{p}"),
            TypeQualifier::Layout(ids) => {
                write!(f, "layout(")?;
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match id.value {
                        Some(v) => write!(f, "{} = {}", id.name, v)?,
                        None => write!(f, "{}", id.name)?,
                    }
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for QualifiedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for q in &self.qualifiers {
            write!(f, "{q} ")?;
        }
        write!(f, "{}", self.base)
    }
}

impl UnaryOp {
    fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }

    /// Prefix operators built from `+` / `-` glue onto each other (`- -x` vs `--x`).
    fn is_sign_like(self) -> bool {
        matches!(
            self,
            UnaryOp::Neg | UnaryOp::Plus | UnaryOp::PreInc | UnaryOp::PreDec
        )
    }
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalXor => "^^",
            BinaryOp::LogicalOr => "||",
        }
    }
}

impl AssignOp {
    fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
        }
    }
}

// ── Expressions ──

fn write_expr(out: &mut String, e: &Expr) {
    match &e.kind {
        ExprKind::Literal(lit) => {
            let _ = write!(out, "{lit}");
        }
        ExprKind::Variable(name) => out.push_str(name),
        ExprKind::Paren(inner) => {
            out.push('(');
            write_expr(out, inner);
            out.push(')');
        }
        ExprKind::Unary { op, operand } if op.is_postfix() => {
            write_expr(out, operand);
            out.push_str(op.symbol());
        }
        ExprKind::Unary { op, operand } => {
            out.push_str(op.symbol());
            if op.is_sign_like()
                && matches!(&operand.kind, ExprKind::Unary { op: inner, .. } if inner.is_sign_like())
            {
                out.push(' ');
            }
            write_expr(out, operand);
        }
        ExprKind::Binary { op, lhs, rhs } => {
            write_expr(out, lhs);
            let _ = write!(out, " {} ", op.symbol());
            write_expr(out, rhs);
        }
        ExprKind::Assign { op, lhs, rhs } => {
            write_expr(out, lhs);
            let _ = write!(out, " {} ", op.symbol());
            write_expr(out, rhs);
        }
        ExprKind::Ternary {
            cond,
            then,
            otherwise,
        } => {
            write_expr(out, cond);
            out.push_str(" ? ");
            write_expr(out, then);
            out.push_str(" : ");
            write_expr(out, otherwise);
        }
        ExprKind::Call { callee, args } => {
            out.push_str(callee);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg);
            }
            out.push(')');
        }
        ExprKind::Index { base, index } => {
            write_expr(out, base);
            out.push('[');
            write_expr(out, index);
            out.push(']');
        }
        ExprKind::Member { base, field } => {
            write_expr(out, base);
            out.push('.');
            out.push_str(field);
        }
    }
}

// ── Declarations and statements ──

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn declaration(&mut self, decl: &Declaration) {
        match &decl.kind {
            DeclKind::Directive(text) => {
                self.out.push_str(text);
                self.out.push('\n');
            }
            DeclKind::Precision { precision, ty } => {
                let _ = writeln!(self.out, "precision {precision} {ty};");
            }
            DeclKind::Variables(vars) => {
                self.out.push_str(&variables_text(vars));
                self.out.push('\n');
            }
            DeclKind::InterfaceBlock(block) => self.interface_block(block),
            DeclKind::Qualifiers(qualifiers) => {
                let text: Vec<String> = qualifiers.iter().map(|q| q.to_string()).collect();
                let _ = writeln!(self.out, "{};", text.join(" "));
            }
            DeclKind::Function(func) => self.function(func),
        }
    }

    fn interface_block(&mut self, block: &InterfaceBlock) {
        for q in &block.qualifiers {
            let _ = write!(self.out, "{q} ");
        }
        let _ = writeln!(self.out, "{} {{", block.name);
        for member in &block.members {
            let _ = writeln!(
                self.out,
                "{INDENT}{} {}{};",
                member.ty,
                member.name,
                array_text(&member.array)
            );
        }
        self.out.push('}');
        if let Some(instance) = &block.instance {
            let _ = write!(self.out, " {instance}");
        }
        self.out.push_str(";\n");
    }

    fn function(&mut self, func: &FunctionDef) {
        let params: Vec<String> = func
            .params
            .iter()
            .map(|p| match &p.name {
                Some(name) => format!("{} {}{}", p.ty, name, array_text(&p.array)),
                None => p.ty.to_string(),
            })
            .collect();
        let _ = write!(
            self.out,
            "{} {}({})",
            func.return_type,
            func.name,
            params.join(", ")
        );
        match &func.body {
            None => self.out.push_str(";\n"),
            Some(body) => {
                self.out.push_str(" {\n");
                self.depth += 1;
                for stmt in body {
                    self.stmt(stmt);
                }
                self.depth -= 1;
                self.out.push_str("}\n");
            }
        }
    }

    fn stmt(&mut self, s: &Stmt) {
        self.indent();
        self.stmt_inline(s);
    }

    /// Print a statement starting at the current column.
    fn stmt_inline(&mut self, s: &Stmt) {
        match &s.kind {
            StmtKind::Block(stmts) => {
                self.out.push_str("{\n");
                self.block_contents(stmts);
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                let _ = write!(self.out, "if ({cond})");
                self.sub_stmt(then);
                if let Some(otherwise) = otherwise {
                    self.indent();
                    self.out.push_str("else");
                    if matches!(otherwise.kind, StmtKind::If { .. }) {
                        self.out.push(' ');
                        self.stmt_inline(otherwise);
                    } else {
                        self.sub_stmt(otherwise);
                    }
                }
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let cond = cond.as_ref().map(|c| c.to_string()).unwrap_or_default();
                let step = step.as_ref().map(|c| c.to_string()).unwrap_or_default();
                let _ = write!(self.out, "for ({} {}; {})", simple_stmt_text(init), cond, step);
                self.sub_stmt(body);
            }
            StmtKind::While { cond, body } => {
                let _ = write!(self.out, "while ({cond})");
                self.sub_stmt(body);
            }
            StmtKind::DoWhile { body, cond } => {
                self.out.push_str("do");
                self.sub_stmt(body);
                self.indent();
                let _ = writeln!(self.out, "while ({cond});");
            }
            _ => {
                self.out.push_str(&simple_stmt_text(s));
                self.out.push('\n');
            }
        }
    }

    /// Body of a control statement: a block stays on the header line.
    fn sub_stmt(&mut self, s: &Stmt) {
        match &s.kind {
            StmtKind::Block(stmts) => {
                self.out.push_str(" {\n");
                self.block_contents(stmts);
            }
            _ => {
                self.out.push('\n');
                self.depth += 1;
                self.stmt(s);
                self.depth -= 1;
            }
        }
    }

    fn block_contents(&mut self, stmts: &[Stmt]) {
        self.depth += 1;
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.depth -= 1;
        self.indent();
        self.out.push_str("}\n");
    }
}

fn array_text(array: &Option<ArrayInfo>) -> String {
    match array {
        None => String::new(),
        Some(ArrayInfo { size: None }) => "[]".to_string(),
        Some(ArrayInfo { size: Some(size) }) => format!("[{size}]"),
    }
}

fn variables_text(vars: &VariablesDecl) -> String {
    let declarators: Vec<String> = vars
        .vars
        .iter()
        .map(|v| {
            let mut text = format!("{}{}", v.name, array_text(&v.array));
            if let Some(init) = &v.init {
                let _ = write!(text, " = {init}");
            }
            text
        })
        .collect();
    format!("{} {};", vars.ty, declarators.join(", "))
}

/// Single-line statements, also used for `for` initialisers.
fn simple_stmt_text(s: &Stmt) -> String {
    match &s.kind {
        StmtKind::Decl(vars) => variables_text(vars),
        StmtKind::Expr(e) => format!("{e};"),
        StmtKind::Return(None) => "return;".to_string(),
        StmtKind::Return(Some(e)) => format!("return {e};"),
        StmtKind::Break => "break;".to_string(),
        StmtKind::Continue => "continue;".to_string(),
        StmtKind::Discard => "discard;".to_string(),
        StmtKind::Empty => ";".to_string(),
        StmtKind::Block(_)
        | StmtKind::If { .. }
        | StmtKind::For { .. }
        | StmtKind::While { .. }
        | StmtKind::DoWhile { .. } => {
            let mut p = Printer::default();
            p.stmt_inline(s);
            p.out.trim_end().to_string()
        }
    }
}
