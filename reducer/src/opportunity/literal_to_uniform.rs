// literal_to_uniform.rs — Replace a literal by an element of a uniform array
//
// Moves one int or float literal out of the shader text and into pipeline
// metadata: the value is appended (deduplicated) to `_GLF_uniform_int_values`
// or `_GLF_uniform_float_values`, every stage re-declares the grown array,
// and the literal becomes `<array>[<index>]`. The shader computes the same
// values, but its constants are no longer visible to the compiler.
//
// Preconditions: constructed against the job (or a clone) it is applied to.
// Postconditions: every stage declares the array exactly once, sized to the
//   metadata; the literal's slot holds the index expression.
// Failure modes: `NodeNotFound` / `NotAnExpression` are detected before any
//   mutation; registry errors abort before stages are touched.
// Side effects: mutates metadata and all stage trees of the job.

use std::fmt;

use tracing::{debug, trace};

use crate::ast::{Literal, TranslationUnit};
use crate::error::ReduceError;
use crate::id::{IdAllocator, NodeId};
use crate::job::{ShaderJob, ShaderKind};
use crate::parent_map::ParentMap;
use crate::registry::{ElementType, NumericValue};
use crate::synth::{build_array_declaration, build_index_expression};
use crate::walk;

#[derive(Debug, Clone)]
pub struct LiteralToUniformOpportunity {
    literal: NodeId,
    stage: ShaderKind,
    value: NumericValue,
    depth: usize,
}

impl LiteralToUniformOpportunity {
    /// Bind an opportunity to the literal `node` holding `literal` in
    /// `stage`, registering the target array in the job's metadata.
    ///
    /// Bool and unsigned literals and non-finite floats are rejected with
    /// `UnsupportedLiteral`; nothing is registered for them.
    pub fn new(
        job: &mut ShaderJob,
        stage: ShaderKind,
        node: NodeId,
        literal: Literal,
    ) -> Result<Self, ReduceError> {
        let value =
            NumericValue::from_literal(&literal).ok_or_else(|| ReduceError::UnsupportedLiteral {
                node,
                literal: literal.to_string(),
            })?;
        let element_type = value.element_type();
        job.pipeline_info_mut()
            .ensure_registered(element_type.literal_array_name(), element_type);
        Ok(LiteralToUniformOpportunity {
            literal: node,
            stage,
            value,
            depth: 0,
        })
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn node(&self) -> NodeId {
        self.literal
    }

    pub fn stage(&self) -> ShaderKind {
        self.stage
    }

    pub fn value(&self) -> NumericValue {
        self.value
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn element_type(&self) -> ElementType {
        self.value.element_type()
    }

    /// Always applicable: promoting a literal never depends on earlier edits.
    pub fn precondition_holds(&self, _job: &ShaderJob) -> bool {
        true
    }

    pub fn apply(self, job: &mut ShaderJob) -> Result<(), ReduceError> {
        let element_type = self.element_type();
        let array = element_type.literal_array_name();
        let (info, stages, ids) = job.parts_mut();

        let owner = stages
            .iter()
            .position(|(kind, _)| *kind == self.stage)
            .ok_or(ReduceError::NodeNotFound(self.literal))?;

        // Locate the literal before touching anything.
        {
            let tree = &stages[owner].1;
            ParentMap::build(tree).parent_of(self.literal)?;
            if walk::find_expr(tree, self.literal).is_none() {
                return Err(ReduceError::NotAnExpression(self.literal));
            }
        }

        let index = info.promote(array, self.value)?;
        let length = info.snapshot(array)?.length;

        for (kind, tree) in stages.iter_mut() {
            redeclare_array(tree, array, element_type, length, ids);
            trace!(stage = %kind, array, length, "re-declared literal array");
        }

        let tree = &mut stages[owner].1;
        let parents = ParentMap::build(tree);
        let replacement = build_index_expression(array, index, ids);
        parents.replace(tree, self.literal, replacement)?;

        debug!(
            stage = %self.stage,
            node = %self.literal,
            value = %self.value,
            array,
            index,
            "promoted literal to uniform"
        );
        Ok(())
    }
}

/// Replace the stage's declaration of `array` (if any) by one of `length`.
fn redeclare_array(
    tree: &mut TranslationUnit,
    array: &str,
    element_type: ElementType,
    length: usize,
    ids: &mut IdAllocator,
) {
    tree.remove_uniform_declarator(array);
    tree.add_declaration(build_array_declaration(array, element_type, length, ids));
}

impl fmt::Display for LiteralToUniformOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: literal {} at {} -> {}",
            self.stage,
            self.value,
            self.literal,
            self.element_type().literal_array_name()
        )
    }
}
