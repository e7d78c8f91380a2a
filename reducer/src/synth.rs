// synth.rs — Synthesised declarations and index expressions
//
// Builds the tree-level syntax that materialises a literal array:
// `uniform <type> <name>[<length>];` and `<name>[<index>]`.
// Fresh node ids are drawn from the job allocator; nothing else is touched.

use crate::ast::*;
use crate::id::IdAllocator;
use crate::registry::ElementType;

/// `uniform <element_type> <name>[<length>];`
pub fn build_array_declaration(
    name: &str,
    element_type: ElementType,
    length: usize,
    ids: &mut IdAllocator,
) -> Declaration {
    let size = int_literal(length, ids);
    let decl = VariablesDecl {
        ty: QualifiedType {
            qualifiers: vec![TypeQualifier::Uniform],
            base: element_type.basic_type(),
        },
        vars: vec![VarDeclInfo {
            name: name.to_string(),
            array: Some(ArrayInfo { size: Some(size) }),
            init: None,
        }],
    };
    Declaration {
        id: ids.alloc(),
        kind: DeclKind::Variables(decl),
    }
}

/// `<name>[<index>]`
pub fn build_index_expression(name: &str, index: usize, ids: &mut IdAllocator) -> Expr {
    let mut base = Expr::variable(name);
    base.id = ids.alloc();
    let index = int_literal(index, ids);
    let mut expr = Expr::index(base, index);
    expr.id = ids.alloc();
    expr
}

fn int_literal(value: usize, ids: &mut IdAllocator) -> Expr {
    // Array lengths and indices are bounded by the number of distinct literals.
    let value = i32::try_from(value).unwrap_or(i32::MAX);
    let mut lit = Expr::literal(Literal::Int(value));
    lit.id = ids.alloc();
    lit
}

/// Length declared by a synthesised (or parsed) `uniform T name[N];`.
pub fn declared_length(decl: &VariablesDecl) -> Option<i32> {
    let size = decl.vars.first()?.array.as_ref()?.size.as_ref()?;
    match size.as_literal()? {
        Literal::Int(n) => Some(*n),
        _ => None,
    }
}
