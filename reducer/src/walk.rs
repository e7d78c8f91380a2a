// walk.rs — Structural traversal of shader ASTs
//
// The single place that knows which children each node kind owns and in which
// slot. Parent-map construction, node numbering, lookup and the opportunity
// finder all traverse through `children` / `children_mut`, so a new node kind
// only needs to be taught here.
//
// Preconditions: none.
// Postconditions: `children` yields every direct child exactly once, in source order.
// Failure modes: none.
// Side effects: `number_nodes` assigns ids; everything else is read-only or
// hands out mutable references.

use crate::ast::*;
use crate::id::{IdAllocator, NodeId};

// ── Slots ──────────────────────────────────────────────────────────────────

/// The role a child plays inside its parent. Indexed slots carry the
/// position within the parent's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Top-level declaration of a translation unit.
    TopLevel(usize),
    /// Array size of the n-th declarator.
    ArraySize(usize),
    /// Initializer of the n-th declarator.
    Init(usize),
    ParamArraySize(usize),
    MemberArraySize(usize),
    /// n-th statement of a function body or block.
    Body(usize),
    /// Expression of an expression statement or `return`.
    Expr,
    Cond,
    Then,
    Else,
    ForInit,
    Step,
    LoopBody,
    Operand,
    Lhs,
    Rhs,
    Arg(usize),
    Base,
    Index,
}

// ── Node handles ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Decl(&'a Declaration),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::Decl(d) => d.id,
            NodeRef::Stmt(s) => s.id,
            NodeRef::Expr(e) => e.id,
        }
    }

    pub fn as_expr(&self) -> Option<&'a Expr> {
        match self {
            NodeRef::Expr(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum NodeMut<'a> {
    Decl(&'a mut Declaration),
    Stmt(&'a mut Stmt),
    Expr(&'a mut Expr),
}

impl NodeMut<'_> {
    pub fn id(&self) -> NodeId {
        match self {
            NodeMut::Decl(d) => d.id,
            NodeMut::Stmt(s) => s.id,
            NodeMut::Expr(e) => e.id,
        }
    }

    fn id_mut(&mut self) -> &mut NodeId {
        match self {
            NodeMut::Decl(d) => &mut d.id,
            NodeMut::Stmt(s) => &mut s.id,
            NodeMut::Expr(e) => &mut e.id,
        }
    }
}

// ── Children (shared) ──────────────────────────────────────────────────────

/// Top-level declarations of a unit, in order.
pub fn roots(tu: &TranslationUnit) -> Vec<(Slot, NodeRef<'_>)> {
    tu.declarations
        .iter()
        .enumerate()
        .map(|(i, d)| (Slot::TopLevel(i), NodeRef::Decl(d)))
        .collect()
}

/// Direct children of a node with their slots, in source order.
pub fn children(node: NodeRef<'_>) -> Vec<(Slot, NodeRef<'_>)> {
    let mut out = Vec::new();
    match node {
        NodeRef::Decl(d) => match &d.kind {
            DeclKind::Variables(vars) => var_children(vars, &mut out),
            DeclKind::InterfaceBlock(block) => {
                for (i, member) in block.members.iter().enumerate() {
                    if let Some(size) = array_size(&member.array) {
                        out.push((Slot::MemberArraySize(i), NodeRef::Expr(size)));
                    }
                }
            }
            DeclKind::Function(func) => {
                for (i, param) in func.params.iter().enumerate() {
                    if let Some(size) = array_size(&param.array) {
                        out.push((Slot::ParamArraySize(i), NodeRef::Expr(size)));
                    }
                }
                if let Some(body) = &func.body {
                    for (i, stmt) in body.iter().enumerate() {
                        out.push((Slot::Body(i), NodeRef::Stmt(stmt)));
                    }
                }
            }
            DeclKind::Directive(_) | DeclKind::Precision { .. } | DeclKind::Qualifiers(_) => {}
        },
        NodeRef::Stmt(s) => match &s.kind {
            StmtKind::Block(stmts) => {
                for (i, stmt) in stmts.iter().enumerate() {
                    out.push((Slot::Body(i), NodeRef::Stmt(stmt)));
                }
            }
            StmtKind::Decl(vars) => var_children(vars, &mut out),
            StmtKind::Expr(e) | StmtKind::Return(Some(e)) => out.push((Slot::Expr, NodeRef::Expr(e))),
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                out.push((Slot::Cond, NodeRef::Expr(cond)));
                out.push((Slot::Then, NodeRef::Stmt(then)));
                if let Some(otherwise) = otherwise {
                    out.push((Slot::Else, NodeRef::Stmt(otherwise)));
                }
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                out.push((Slot::ForInit, NodeRef::Stmt(init)));
                if let Some(cond) = cond {
                    out.push((Slot::Cond, NodeRef::Expr(cond)));
                }
                if let Some(step) = step {
                    out.push((Slot::Step, NodeRef::Expr(step)));
                }
                out.push((Slot::LoopBody, NodeRef::Stmt(body)));
            }
            StmtKind::While { cond, body } => {
                out.push((Slot::Cond, NodeRef::Expr(cond)));
                out.push((Slot::LoopBody, NodeRef::Stmt(body)));
            }
            StmtKind::DoWhile { body, cond } => {
                out.push((Slot::LoopBody, NodeRef::Stmt(body)));
                out.push((Slot::Cond, NodeRef::Expr(cond)));
            }
            StmtKind::Return(None)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Discard
            | StmtKind::Empty => {}
        },
        NodeRef::Expr(e) => match &e.kind {
            ExprKind::Literal(_) | ExprKind::Variable(_) => {}
            ExprKind::Paren(inner) => out.push((Slot::Operand, NodeRef::Expr(inner))),
            ExprKind::Unary { operand, .. } => out.push((Slot::Operand, NodeRef::Expr(operand))),
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs, .. } => {
                out.push((Slot::Lhs, NodeRef::Expr(lhs)));
                out.push((Slot::Rhs, NodeRef::Expr(rhs)));
            }
            ExprKind::Ternary {
                cond,
                then,
                otherwise,
            } => {
                out.push((Slot::Cond, NodeRef::Expr(cond)));
                out.push((Slot::Then, NodeRef::Expr(then)));
                out.push((Slot::Else, NodeRef::Expr(otherwise)));
            }
            ExprKind::Call { args, .. } => {
                for (i, arg) in args.iter().enumerate() {
                    out.push((Slot::Arg(i), NodeRef::Expr(arg)));
                }
            }
            ExprKind::Index { base, index } => {
                out.push((Slot::Base, NodeRef::Expr(base)));
                out.push((Slot::Index, NodeRef::Expr(index)));
            }
            ExprKind::Member { base, .. } => out.push((Slot::Base, NodeRef::Expr(base))),
        },
    }
    out
}

fn array_size(array: &Option<ArrayInfo>) -> Option<&Expr> {
    array.as_ref().and_then(|a| a.size.as_ref())
}

fn var_children<'a>(vars: &'a VariablesDecl, out: &mut Vec<(Slot, NodeRef<'a>)>) {
    for (i, var) in vars.vars.iter().enumerate() {
        if let Some(size) = array_size(&var.array) {
            out.push((Slot::ArraySize(i), NodeRef::Expr(size)));
        }
        if let Some(init) = &var.init {
            out.push((Slot::Init(i), NodeRef::Expr(init)));
        }
    }
}

// ── Children (mutable) ─────────────────────────────────────────────────────

/// Mutable counterpart of `children`; must list the same slots in the same order.
pub fn children_mut(node: NodeMut<'_>) -> Vec<(Slot, NodeMut<'_>)> {
    let mut out = Vec::new();
    match node {
        NodeMut::Decl(d) => match &mut d.kind {
            DeclKind::Variables(vars) => var_children_mut(vars, &mut out),
            DeclKind::InterfaceBlock(block) => {
                for (i, member) in block.members.iter_mut().enumerate() {
                    if let Some(size) = array_size_mut(&mut member.array) {
                        out.push((Slot::MemberArraySize(i), NodeMut::Expr(size)));
                    }
                }
            }
            DeclKind::Function(func) => {
                for (i, param) in func.params.iter_mut().enumerate() {
                    if let Some(size) = array_size_mut(&mut param.array) {
                        out.push((Slot::ParamArraySize(i), NodeMut::Expr(size)));
                    }
                }
                if let Some(body) = &mut func.body {
                    for (i, stmt) in body.iter_mut().enumerate() {
                        out.push((Slot::Body(i), NodeMut::Stmt(stmt)));
                    }
                }
            }
            DeclKind::Directive(_) | DeclKind::Precision { .. } | DeclKind::Qualifiers(_) => {}
        },
        NodeMut::Stmt(s) => match &mut s.kind {
            StmtKind::Block(stmts) => {
                for (i, stmt) in stmts.iter_mut().enumerate() {
                    out.push((Slot::Body(i), NodeMut::Stmt(stmt)));
                }
            }
            StmtKind::Decl(vars) => var_children_mut(vars, &mut out),
            StmtKind::Expr(e) | StmtKind::Return(Some(e)) => out.push((Slot::Expr, NodeMut::Expr(e))),
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                out.push((Slot::Cond, NodeMut::Expr(cond)));
                out.push((Slot::Then, NodeMut::Stmt(then)));
                if let Some(otherwise) = otherwise {
                    out.push((Slot::Else, NodeMut::Stmt(otherwise)));
                }
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                out.push((Slot::ForInit, NodeMut::Stmt(init)));
                if let Some(cond) = cond {
                    out.push((Slot::Cond, NodeMut::Expr(cond)));
                }
                if let Some(step) = step {
                    out.push((Slot::Step, NodeMut::Expr(step)));
                }
                out.push((Slot::LoopBody, NodeMut::Stmt(body)));
            }
            StmtKind::While { cond, body } => {
                out.push((Slot::Cond, NodeMut::Expr(cond)));
                out.push((Slot::LoopBody, NodeMut::Stmt(body)));
            }
            StmtKind::DoWhile { body, cond } => {
                out.push((Slot::LoopBody, NodeMut::Stmt(body)));
                out.push((Slot::Cond, NodeMut::Expr(cond)));
            }
            StmtKind::Return(None)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Discard
            | StmtKind::Empty => {}
        },
        NodeMut::Expr(e) => match &mut e.kind {
            ExprKind::Literal(_) | ExprKind::Variable(_) => {}
            ExprKind::Paren(inner) => out.push((Slot::Operand, NodeMut::Expr(inner))),
            ExprKind::Unary { operand, .. } => out.push((Slot::Operand, NodeMut::Expr(operand))),
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs, .. } => {
                out.push((Slot::Lhs, NodeMut::Expr(lhs)));
                out.push((Slot::Rhs, NodeMut::Expr(rhs)));
            }
            ExprKind::Ternary {
                cond,
                then,
                otherwise,
            } => {
                out.push((Slot::Cond, NodeMut::Expr(cond)));
                out.push((Slot::Then, NodeMut::Expr(then)));
                out.push((Slot::Else, NodeMut::Expr(otherwise)));
            }
            ExprKind::Call { args, .. } => {
                for (i, arg) in args.iter_mut().enumerate() {
                    out.push((Slot::Arg(i), NodeMut::Expr(arg)));
                }
            }
            ExprKind::Index { base, index } => {
                out.push((Slot::Base, NodeMut::Expr(base)));
                out.push((Slot::Index, NodeMut::Expr(index)));
            }
            ExprKind::Member { base, .. } => out.push((Slot::Base, NodeMut::Expr(base))),
        },
    }
    out
}

fn array_size_mut(array: &mut Option<ArrayInfo>) -> Option<&mut Expr> {
    array.as_mut().and_then(|a| a.size.as_mut())
}

fn var_children_mut<'a>(vars: &'a mut VariablesDecl, out: &mut Vec<(Slot, NodeMut<'a>)>) {
    for (i, var) in vars.vars.iter_mut().enumerate() {
        if let Some(size) = array_size_mut(&mut var.array) {
            out.push((Slot::ArraySize(i), NodeMut::Expr(size)));
        }
        if let Some(init) = &mut var.init {
            out.push((Slot::Init(i), NodeMut::Expr(init)));
        }
    }
}

// ── Traversals ─────────────────────────────────────────────────────────────

/// Assign ids from `ids` to every node still carrying the placeholder,
/// in pre-order.
pub fn number_nodes(tu: &mut TranslationUnit, ids: &mut IdAllocator) {
    let mut stack: Vec<NodeMut<'_>> = tu.declarations.iter_mut().map(NodeMut::Decl).rev().collect();
    while let Some(mut node) = stack.pop() {
        let id = node.id_mut();
        if !id.is_assigned() {
            *id = ids.alloc();
        }
        let kids = children_mut(node);
        stack.extend(kids.into_iter().rev().map(|(_, child)| child));
    }
}

/// Find the node with the given id.
pub fn find(tu: &TranslationUnit, id: NodeId) -> Option<NodeRef<'_>> {
    let mut stack: Vec<NodeRef<'_>> = roots(tu).into_iter().map(|(_, n)| n).collect();
    while let Some(node) = stack.pop() {
        if node.id() == id {
            return Some(node);
        }
        stack.extend(children(node).into_iter().map(|(_, child)| child));
    }
    None
}

/// Find the node with the given id, mutably.
pub fn find_mut(tu: &mut TranslationUnit, id: NodeId) -> Option<NodeMut<'_>> {
    let mut stack: Vec<NodeMut<'_>> = tu.declarations.iter_mut().map(NodeMut::Decl).collect();
    while let Some(node) = stack.pop() {
        if node.id() == id {
            return Some(node);
        }
        stack.extend(children_mut(node).into_iter().map(|(_, child)| child));
    }
    None
}

/// Find an expression node by id.
pub fn find_expr(tu: &TranslationUnit, id: NodeId) -> Option<&Expr> {
    find(tu, id).and_then(|node| node.as_expr())
}
