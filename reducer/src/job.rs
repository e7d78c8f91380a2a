// job.rs — Shader jobs: stage trees plus pipeline metadata
//
// A shader job is one `<stem>.json` metadata file and up to three stage
// sources next to it (`<stem>.vert`, `<stem>.frag`, `<stem>.comp`). The job
// owns every stage tree, the metadata, and the node-id allocator all trees
// were numbered from.
//
// Preconditions: `load` needs the metadata file and at least one stage file.
// Postconditions: stages are kept in vertex, fragment, compute order.
// Failure modes: I/O, JSON and GLSL parse errors surface as `JobError`.
// Side effects: `load` / `write` touch the filesystem; nothing else does.

use std::fmt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chumsky::error::Rich;
use chumsky::span::SimpleSpan;
use tracing::debug;

use crate::ast::TranslationUnit;
use crate::error::JobError;
use crate::id::IdAllocator;
use crate::lexer::Token;
use crate::parser;
use crate::pipeline_info::PipelineInfo;
use crate::printer::to_glsl;

// ── Stages ──────────────────────────────────────────────────────────────────

/// Pipeline stage of one shader source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderKind {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderKind {
    /// All kinds, in job order.
    pub const ALL: [ShaderKind; 3] = [ShaderKind::Vertex, ShaderKind::Fragment, ShaderKind::Compute];

    pub fn extension(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vert",
            ShaderKind::Fragment => "frag",
            ShaderKind::Compute => "comp",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.extension() == ext)
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ── ShaderJob ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ShaderJob {
    stages: Vec<(ShaderKind, TranslationUnit)>,
    pipeline_info: PipelineInfo,
    ids: IdAllocator,
}

impl ShaderJob {
    pub fn new(pipeline_info: PipelineInfo) -> Self {
        ShaderJob {
            stages: Vec::new(),
            pipeline_info,
            ids: IdAllocator::new(),
        }
    }

    /// Parse `source` as the `kind` stage, numbering its nodes from the job
    /// allocator. An existing stage of the same kind is replaced.
    pub fn add_shader(
        &mut self,
        kind: ShaderKind,
        source: &str,
    ) -> Result<(), Vec<Rich<'static, Token, SimpleSpan>>> {
        let unit = parser::parse_unit(source, &mut self.ids)?;
        match self.stages.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, existing)) => *existing = unit,
            None => {
                self.stages.push((kind, unit));
                self.stages.sort_by_key(|(k, _)| *k);
            }
        }
        Ok(())
    }

    /// Load `<stem>.json` and every stage file that exists next to it.
    pub fn load(json_path: &Path) -> Result<Self, JobError> {
        let text = read(json_path)?;
        let pipeline_info = PipelineInfo::from_json(&text).map_err(|source| JobError::Json {
            path: json_path.to_path_buf(),
            source,
        })?;
        let mut job = ShaderJob::new(pipeline_info);

        for kind in ShaderKind::ALL {
            let path = json_path.with_extension(kind.extension());
            if !path.exists() {
                continue;
            }
            let source = read(&path)?;
            job.add_shader(kind, &source)
                .map_err(|errors| JobError::Parse {
                    path: path.clone(),
                    errors: errors.iter().map(|e| e.to_string()).collect(),
                })?;
            debug!(stage = %kind, path = %path.display(), "loaded stage");
        }

        if job.stages.is_empty() {
            return Err(JobError::MissingShaders {
                path: json_path.to_path_buf(),
            });
        }
        Ok(job)
    }

    /// Write the metadata to `json_path` and each stage next to it.
    pub fn write(&self, json_path: &Path) -> Result<(), JobError> {
        let mut json = self
            .pipeline_info
            .to_json_pretty()
            .map_err(|source| JobError::Json {
                path: json_path.to_path_buf(),
                source,
            })?;
        json.push('\n');
        write(json_path, &json)?;
        for (kind, unit) in &self.stages {
            write(&json_path.with_extension(kind.extension()), &to_glsl(unit))?;
        }
        Ok(())
    }

    pub fn pipeline_info(&self) -> &PipelineInfo {
        &self.pipeline_info
    }

    pub fn pipeline_info_mut(&mut self) -> &mut PipelineInfo {
        &mut self.pipeline_info
    }

    /// Stage trees in job order.
    pub fn shaders(&self) -> &[(ShaderKind, TranslationUnit)] {
        &self.stages
    }

    pub fn shader(&self, kind: ShaderKind) -> Option<&TranslationUnit> {
        self.stages.iter().find(|(k, _)| *k == kind).map(|(_, tu)| tu)
    }

    /// Borrow metadata, stages and allocator at once for an edit that
    /// touches all three.
    pub(crate) fn parts_mut(
        &mut self,
    ) -> (
        &mut PipelineInfo,
        &mut [(ShaderKind, TranslationUnit)],
        &mut IdAllocator,
    ) {
        (&mut self.pipeline_info, &mut self.stages, &mut self.ids)
    }

    /// SHA-256 over the compact metadata JSON and every printed stage, as hex.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.pipeline_info.canonical_json()?.as_bytes());
        for (kind, unit) in &self.stages {
            hasher.update([0u8]);
            hasher.update(kind.extension().as_bytes());
            hasher.update([0u8]);
            hasher.update(to_glsl(unit).as_bytes());
        }
        let digest = hasher.finalize();

        let mut hex = String::with_capacity(64);
        for b in digest.iter() {
            let _ = write!(hex, "{:02x}", b);
        }
        Ok(hex)
    }
}

fn read(path: &Path) -> Result<String, JobError> {
    std::fs::read_to_string(path).map_err(|source| JobError::Io {
        path: PathBuf::from(path),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), JobError> {
    std::fs::write(path, contents).map_err(|source| JobError::Io {
        path: PathBuf::from(path),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAG: &str = "#version 310 es\nprecision highp float;\nvoid main() { float x = 1.0; }\n";
    const VERT: &str = "void main() { gl_Position = vec4(0.0); }\n";

    #[test]
    fn stages_kept_in_job_order() {
        let mut job = ShaderJob::default();
        job.add_shader(ShaderKind::Fragment, FRAG).unwrap();
        job.add_shader(ShaderKind::Vertex, VERT).unwrap();
        let kinds: Vec<ShaderKind> = job.shaders().iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![ShaderKind::Vertex, ShaderKind::Fragment]);
    }

    #[test]
    fn ids_are_unique_across_stages() {
        let mut job = ShaderJob::default();
        job.add_shader(ShaderKind::Vertex, VERT).unwrap();
        job.add_shader(ShaderKind::Fragment, FRAG).unwrap();
        let vert = job.shader(ShaderKind::Vertex).unwrap();
        let frag = job.shader(ShaderKind::Fragment).unwrap();
        let vert_main = vert.declarations[0].id;
        assert!(frag.declarations.iter().all(|d| d.id != vert_main));
    }

    #[test]
    fn add_shader_rejects_bad_source() {
        let mut job = ShaderJob::default();
        assert!(job.add_shader(ShaderKind::Fragment, "void main( {").is_err());
        assert!(job.shaders().is_empty());
    }

    #[test]
    fn extension_round_trip() {
        for kind in ShaderKind::ALL {
            assert_eq!(ShaderKind::from_extension(kind.extension()), Some(kind));
        }
        assert_eq!(ShaderKind::from_extension("geom"), None);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let mut a = ShaderJob::default();
        a.add_shader(ShaderKind::Fragment, FRAG).unwrap();
        let b = a.clone();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);

        let mut c = ShaderJob::default();
        c.add_shader(ShaderKind::Fragment, VERT).unwrap();
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
    }

    #[test]
    fn load_and_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("shader.json");
        std::fs::write(&json, r#"{"resolution":{"func":"glUniform2f","args":[256.0,256.0]}}"#).unwrap();
        std::fs::write(dir.path().join("shader.frag"), FRAG).unwrap();

        let job = ShaderJob::load(&json).unwrap();
        assert_eq!(job.shaders().len(), 1);
        assert!(job.pipeline_info().has_uniform("resolution"));

        let out = dir.path().join("out.json");
        job.write(&out).unwrap();
        let reloaded = ShaderJob::load(&out).unwrap();
        assert_eq!(job.fingerprint().unwrap(), reloaded.fingerprint().unwrap());
    }

    #[test]
    fn load_without_stages_fails() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("lonely.json");
        std::fs::write(&json, "{}").unwrap();
        assert!(matches!(
            ShaderJob::load(&json),
            Err(JobError::MissingShaders { .. })
        ));
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("bad.json");
        std::fs::write(&json, "{}").unwrap();
        std::fs::write(dir.path().join("bad.frag"), "void main() { x = ; }").unwrap();
        let err = ShaderJob::load(&json).unwrap_err();
        assert!(matches!(&err, JobError::Parse { path, .. } if path.ends_with("bad.frag")));
    }

    #[test]
    fn load_accepts_block_comment_header() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("licensed.json");
        std::fs::write(&json, "{}").unwrap();
        std::fs::write(
            dir.path().join("licensed.frag"),
            "/*\n * Copyright 2024 The Authors\n *\n * Licensed under the Apache License.\n */\n\
             #version 310 es\nprecision highp float;\n\
             void main() { /* inline */ float x = 1.0; }\n",
        )
        .unwrap();
        let job = ShaderJob::load(&json).unwrap();
        let frag = job.shader(ShaderKind::Fragment).unwrap();
        assert_eq!(frag.declarations.len(), 3);
        assert!(to_glsl(frag).starts_with("#version 310 es\n"));
    }
}
