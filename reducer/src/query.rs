// query.rs — Shared helpers for querying top-level declarations
//
// Lookups over a translation unit's global scope, plus the one in-place edit
// the opportunity code needs, instead of open-coded declaration scans.

use crate::ast::*;
use crate::id::NodeId;

impl TranslationUnit {
    /// Top-level `uniform` variable declarations, in source order.
    pub fn uniform_decls(&self) -> impl Iterator<Item = (NodeId, &VariablesDecl)> {
        self.declarations.iter().filter_map(|decl| match &decl.kind {
            DeclKind::Variables(vars) if vars.has_qualifier(&TypeQualifier::Uniform) => {
                Some((decl.id, vars))
            }
            _ => None,
        })
    }

    /// Drop the declarator `name` from every top-level `uniform` declaration.
    /// A declaration left with no declarators is removed; sibling declarators
    /// stay where they are. Returns the number of declarators removed.
    pub fn remove_uniform_declarator(&mut self, name: &str) -> usize {
        let mut removed = 0;
        self.declarations.retain_mut(|decl| {
            let DeclKind::Variables(vars) = &mut decl.kind else {
                return true;
            };
            if !vars.has_qualifier(&TypeQualifier::Uniform) {
                return true;
            }
            let before = vars.vars.len();
            vars.vars.retain(|v| v.name != name);
            removed += before - vars.vars.len();
            !vars.vars.is_empty()
        });
        removed
    }

    /// Function definitions (prototypes excluded).
    pub fn function_bodies(&self) -> impl Iterator<Item = (&FunctionDef, &[Stmt])> {
        self.declarations.iter().filter_map(|decl| match &decl.kind {
            DeclKind::Function(func) => func.body.as_deref().map(|body| (func, body)),
            _ => None,
        })
    }
}
