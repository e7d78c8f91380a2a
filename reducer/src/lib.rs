// glsl-reduce — Structural reduction opportunities for GLSL shader jobs
//
// Library root. Front end (lexer, parser, printer), tree utilities (walk,
// parent_map, query, synth), job metadata (pipeline_info, registry) and the
// opportunities themselves.

pub mod ast;
pub mod error;
pub mod id;
pub mod job;
pub mod lexer;
pub mod opportunity;
pub mod parent_map;
pub mod parser;
pub mod pipeline_info;
pub mod printer;
pub mod query;
pub mod registry;
pub mod synth;
pub mod walk;

pub use error::{JobError, ReduceError};
pub use job::{ShaderJob, ShaderKind};
pub use opportunity::{find_opportunities, LiteralToUniformOpportunity, ReductionOpportunity};
