// opportunity — Reduction opportunities over shader jobs
//
// An opportunity is one candidate edit, found against a job and applied to
// it (or to a clone of it) later. Opportunities are a closed set of variants
// so a driver can hold them in one list.
//
// Preconditions: an opportunity is applied to the job it was found on, or a clone.
// Postconditions: `apply` consumes the opportunity.
// Failure modes: see `ReduceError`.
// Side effects: `apply` mutates the job.

use std::fmt;

use crate::error::ReduceError;
use crate::id::NodeId;
use crate::job::{ShaderJob, ShaderKind};

pub mod finder;
pub mod literal_to_uniform;

pub use finder::find_opportunities;
pub use literal_to_uniform::LiteralToUniformOpportunity;

#[derive(Debug, Clone)]
pub enum ReductionOpportunity {
    LiteralToUniform(LiteralToUniformOpportunity),
}

impl ReductionOpportunity {
    pub fn precondition_holds(&self, job: &ShaderJob) -> bool {
        match self {
            ReductionOpportunity::LiteralToUniform(op) => op.precondition_holds(job),
        }
    }

    pub fn apply(self, job: &mut ShaderJob) -> Result<(), ReduceError> {
        match self {
            ReductionOpportunity::LiteralToUniform(op) => op.apply(job),
        }
    }

    /// Nesting depth of the target node below its top-level declaration.
    pub fn depth(&self) -> usize {
        match self {
            ReductionOpportunity::LiteralToUniform(op) => op.depth(),
        }
    }

    pub fn stage(&self) -> ShaderKind {
        match self {
            ReductionOpportunity::LiteralToUniform(op) => op.stage(),
        }
    }

    pub fn node(&self) -> NodeId {
        match self {
            ReductionOpportunity::LiteralToUniform(op) => op.node(),
        }
    }

    /// One-line human-readable summary.
    pub fn describe(&self) -> String {
        match self {
            ReductionOpportunity::LiteralToUniform(op) => op.to_string(),
        }
    }
}

impl fmt::Display for ReductionOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<LiteralToUniformOpportunity> for ReductionOpportunity {
    fn from(op: LiteralToUniformOpportunity) -> Self {
        ReductionOpportunity::LiteralToUniform(op)
    }
}
