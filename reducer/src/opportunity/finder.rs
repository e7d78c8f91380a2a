// finder.rs — Enumerate literal-to-uniform opportunities in a job
//
// Walks every function body of every stage and yields one opportunity per
// promotable literal, in stage order then traversal order.
//
// Preconditions: none.
// Postconditions: every returned opportunity's array is registered in the job.
// Failure modes: none; literals that cannot be promoted are skipped.
// Side effects: registers the literal arrays in the job's metadata.

use crate::ast::{DeclKind, ExprKind, Literal, StmtKind, TypeQualifier};
use crate::id::NodeId;
use crate::job::{ShaderJob, ShaderKind};
use crate::registry::{NumericValue, FLOAT_LITERAL_UNIFORM_VALUES, INT_LITERAL_UNIFORM_VALUES};
use crate::walk::{self, NodeRef, Slot};

use super::{LiteralToUniformOpportunity, ReductionOpportunity};

struct Candidate {
    stage: ShaderKind,
    node: NodeId,
    literal: Literal,
    depth: usize,
}

/// All literal-to-uniform opportunities of `job`.
///
/// Literals outside function bodies (global initializers), in `const`
/// declarations, in array sizes, and those already indexing a literal array
/// are left alone, as are bool, unsigned and non-finite literals.
pub fn find_opportunities(job: &mut ShaderJob) -> Vec<ReductionOpportunity> {
    let mut candidates = Vec::new();
    for (stage, tree) in job.shaders() {
        for (_, root) in walk::roots(tree) {
            if let NodeRef::Decl(decl) = root {
                if matches!(&decl.kind, DeclKind::Function(f) if f.body.is_some()) {
                    collect(*stage, root, 0, &mut candidates);
                }
            }
        }
    }

    candidates
        .into_iter()
        .filter_map(|c| {
            LiteralToUniformOpportunity::new(job, c.stage, c.node, c.literal)
                .ok()
                .map(|op| ReductionOpportunity::from(op.with_depth(c.depth)))
        })
        .collect()
}

fn collect(stage: ShaderKind, node: NodeRef<'_>, depth: usize, out: &mut Vec<Candidate>) {
    match node {
        NodeRef::Expr(e) => {
            if let ExprKind::Literal(literal) = &e.kind {
                if NumericValue::from_literal(literal).is_some() {
                    out.push(Candidate {
                        stage,
                        node: e.id,
                        literal: *literal,
                        depth,
                    });
                }
                return;
            }
            if indexes_literal_array(&e.kind) {
                return;
            }
        }
        NodeRef::Stmt(s) => {
            if let StmtKind::Decl(vars) = &s.kind {
                if vars.has_qualifier(&TypeQualifier::Const) {
                    return;
                }
            }
        }
        NodeRef::Decl(_) => {}
    }

    for (slot, child) in walk::children(node) {
        if matches!(
            slot,
            Slot::ArraySize(_) | Slot::ParamArraySize(_) | Slot::MemberArraySize(_)
        ) {
            continue;
        }
        collect(stage, child, depth + 1, out);
    }
}

/// `_GLF_uniform_{int,float}_values[<literal>]`, the shape left by an earlier promotion.
fn indexes_literal_array(kind: &ExprKind) -> bool {
    let ExprKind::Index { base, index } = kind else {
        return false;
    };
    let is_array = matches!(
        &base.kind,
        ExprKind::Variable(name)
            if name == INT_LITERAL_UNIFORM_VALUES || name == FLOAT_LITERAL_UNIFORM_VALUES
    );
    is_array && index.as_literal().is_some()
}
