// Scenario tests for literal-to-uniform promotion.
//
// Drives the library API the way a reducer would: build a job from sources,
// bind opportunities to literal nodes, apply them, and inspect metadata and
// printed stages.

use glsl_reduce::ast::{DeclKind, ExprKind, Literal, TranslationUnit};
use glsl_reduce::id::NodeId;
use glsl_reduce::pipeline_info::PipelineInfo;
use glsl_reduce::registry::{NumericValue, FLOAT_LITERAL_UNIFORM_VALUES, INT_LITERAL_UNIFORM_VALUES};
use glsl_reduce::synth::declared_length;
use glsl_reduce::walk::{self, NodeRef};
use glsl_reduce::{LiteralToUniformOpportunity, ReduceError, ShaderJob, ShaderKind};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn job(stages: &[(ShaderKind, &str)]) -> ShaderJob {
    let mut job = ShaderJob::new(PipelineInfo::new());
    for (kind, source) in stages {
        job.add_shader(*kind, source)
            .unwrap_or_else(|e| panic!("{kind} failed to parse: {e:?}"));
    }
    job
}

/// Literal nodes of a stage in traversal order.
fn literals(tu: &TranslationUnit) -> Vec<(NodeId, Literal)> {
    fn visit(node: NodeRef<'_>, out: &mut Vec<(NodeId, Literal)>) {
        if let Some(lit) = node.as_expr().and_then(|e| e.as_literal()) {
            out.push((node.id(), *lit));
        }
        for (_, child) in walk::children(node) {
            visit(child, out);
        }
    }
    let mut out = Vec::new();
    for (_, root) in walk::roots(tu) {
        visit(root, &mut out);
    }
    out
}

fn promote(job: &mut ShaderJob, kind: ShaderKind, node: NodeId, literal: Literal) {
    LiteralToUniformOpportunity::new(job, kind, node, literal)
        .unwrap()
        .apply(job)
        .unwrap();
}

/// Index used by the expression now sitting where a promoted literal was.
fn index_exprs(tu: &TranslationUnit, array: &str) -> Vec<i32> {
    fn visit(node: NodeRef<'_>, array: &str, out: &mut Vec<i32>) {
        if let Some(ExprKind::Index { base, index }) = node.as_expr().map(|e| &e.kind) {
            if matches!(&base.kind, ExprKind::Variable(n) if n == array) {
                if let Some(Literal::Int(i)) = index.as_literal() {
                    out.push(*i);
                }
            }
        }
        for (_, child) in walk::children(node) {
            visit(child, array, out);
        }
    }
    let mut out = Vec::new();
    for (_, root) in walk::roots(tu) {
        visit(root, array, &mut out);
    }
    out
}

/// Declared lengths of every top-level declaration of `array`.
fn declarations_of(tu: &TranslationUnit, array: &str) -> Vec<Option<i32>> {
    tu.declarations
        .iter()
        .filter_map(|d| match &d.kind {
            DeclKind::Variables(vars) if vars.vars.iter().any(|v| v.name == array) => {
                Some(declared_length(vars))
            }
            _ => None,
        })
        .collect()
}

// ── Scenario A: deduplicated ints ───────────────────────────────────────────

#[test]
fn scenario_a_repeated_int_reuses_slot() {
    let mut job = job(&[(ShaderKind::Fragment, "void main() { int a = 5; int b = 7; int c = 5; }")]);
    let lits = literals(job.shader(ShaderKind::Fragment).unwrap());
    assert_eq!(lits.len(), 3);
    for (id, lit) in lits {
        promote(&mut job, ShaderKind::Fragment, id, lit);
    }

    let snap = job.pipeline_info().snapshot(INT_LITERAL_UNIFORM_VALUES).unwrap();
    assert_eq!(snap.length, 2);
    assert_eq!(snap.values, vec![NumericValue::Int(5), NumericValue::Int(7)]);

    let frag = job.shader(ShaderKind::Fragment).unwrap();
    assert_eq!(index_exprs(frag, INT_LITERAL_UNIFORM_VALUES), vec![0, 1, 0]);
    assert_eq!(declarations_of(frag, INT_LITERAL_UNIFORM_VALUES), vec![Some(2)]);
}

// ── Scenario B: other stages gain the declaration ───────────────────────────

#[test]
fn scenario_b_every_stage_declares_the_array() {
    let mut job = job(&[
        (ShaderKind::Vertex, "void main() { gl_Position = vec4(0.0); }"),
        (ShaderKind::Fragment, "void main() { float x = 2.0; }"),
    ]);
    let (id, lit) = literals(job.shader(ShaderKind::Fragment).unwrap())[0];
    let vertex_before = job.shader(ShaderKind::Vertex).unwrap().clone();
    promote(&mut job, ShaderKind::Fragment, id, lit);

    let vert = job.shader(ShaderKind::Vertex).unwrap();
    assert_eq!(declarations_of(vert, FLOAT_LITERAL_UNIFORM_VALUES), vec![Some(1)]);
    // The vertex literal itself is untouched.
    assert_eq!(literals(vert).last(), literals(&vertex_before).last());
    assert!(index_exprs(vert, FLOAT_LITERAL_UNIFORM_VALUES).is_empty());

    let frag = job.shader(ShaderKind::Fragment).unwrap();
    assert_eq!(declarations_of(frag, FLOAT_LITERAL_UNIFORM_VALUES), vec![Some(1)]);
    assert_eq!(index_exprs(frag, FLOAT_LITERAL_UNIFORM_VALUES), vec![0]);
}

// ── Scenario C: ints and floats go to separate arrays ───────────────────────

#[test]
fn scenario_c_float_and_int_are_separate() {
    let mut job = job(&[(ShaderKind::Fragment, "void main() { float f = 3.5; int i = 3; }")]);
    for (id, lit) in literals(job.shader(ShaderKind::Fragment).unwrap()) {
        promote(&mut job, ShaderKind::Fragment, id, lit);
    }

    let info = job.pipeline_info();
    let floats = info.snapshot(FLOAT_LITERAL_UNIFORM_VALUES).unwrap();
    let ints = info.snapshot(INT_LITERAL_UNIFORM_VALUES).unwrap();
    assert_eq!(floats.values, vec![NumericValue::Float(3.5)]);
    assert_eq!(ints.values, vec![NumericValue::Int(3)]);

    let bindings = [
        info.uniform(INT_LITERAL_UNIFORM_VALUES).unwrap().binding,
        info.uniform(FLOAT_LITERAL_UNIFORM_VALUES).unwrap().binding,
    ];
    assert_eq!(bindings, [Some(1), Some(0)]);
}

// ── Negative: node from another tree ────────────────────────────────────────

#[test]
fn node_from_another_stage_is_rejected_without_changes() {
    let mut job = job(&[
        (ShaderKind::Vertex, "void main() { float v = 1.0; }"),
        (ShaderKind::Fragment, "void main() { float f = 2.0; }"),
    ]);
    let (vertex_literal, lit) = literals(job.shader(ShaderKind::Vertex).unwrap())[0];
    let op = LiteralToUniformOpportunity::new(&mut job, ShaderKind::Fragment, vertex_literal, lit)
        .unwrap();
    let before = job.clone();

    let err = op.apply(&mut job).unwrap_err();
    assert!(matches!(err, ReduceError::NodeNotFound(id) if id == vertex_literal));
    assert_eq!(job.pipeline_info(), before.pipeline_info());
    assert_eq!(job.shaders(), before.shaders());
    assert_eq!(
        job.pipeline_info()
            .snapshot(FLOAT_LITERAL_UNIFORM_VALUES)
            .unwrap()
            .length,
        0
    );
}

#[test]
fn already_promoted_literal_is_gone() {
    let mut job = job(&[(ShaderKind::Fragment, "void main() { int x = 4; }")]);
    let (id, lit) = literals(job.shader(ShaderKind::Fragment).unwrap())[0];
    let first = LiteralToUniformOpportunity::new(&mut job, ShaderKind::Fragment, id, lit).unwrap();
    let second = first.clone();
    first.apply(&mut job).unwrap();
    assert!(matches!(second.apply(&mut job), Err(ReduceError::NodeNotFound(_))));
}

// ── Clones ──────────────────────────────────────────────────────────────────

#[test]
fn opportunity_applies_to_a_clone_of_its_job() {
    let mut original = job(&[(ShaderKind::Fragment, "void main() { int x = 9; }")]);
    let (id, lit) = literals(original.shader(ShaderKind::Fragment).unwrap())[0];
    let op = LiteralToUniformOpportunity::new(&mut original, ShaderKind::Fragment, id, lit).unwrap();

    let mut variant = original.clone();
    op.apply(&mut variant).unwrap();

    assert_eq!(
        variant
            .pipeline_info()
            .snapshot(INT_LITERAL_UNIFORM_VALUES)
            .unwrap()
            .values,
        vec![NumericValue::Int(9)]
    );
    // The original still holds the literal.
    assert_eq!(literals(original.shader(ShaderKind::Fragment).unwrap()), vec![(id, lit)]);
}

// ── Cross-stage consistency ─────────────────────────────────────────────────

#[test]
fn growth_redeclares_in_every_stage() {
    let mut job = job(&[
        (ShaderKind::Vertex, "void main() { int v = 1; }"),
        (ShaderKind::Fragment, "void main() { int f = 2; int g = 3; }"),
    ]);
    let vert_lits = literals(job.shader(ShaderKind::Vertex).unwrap());
    let frag_lits = literals(job.shader(ShaderKind::Fragment).unwrap());
    for (id, lit) in vert_lits {
        promote(&mut job, ShaderKind::Vertex, id, lit);
    }
    for (id, lit) in frag_lits {
        promote(&mut job, ShaderKind::Fragment, id, lit);
    }

    let length = job
        .pipeline_info()
        .snapshot(INT_LITERAL_UNIFORM_VALUES)
        .unwrap()
        .length;
    assert_eq!(length, 3);
    for (_, tu) in job.shaders() {
        assert_eq!(
            declarations_of(tu, INT_LITERAL_UNIFORM_VALUES),
            vec![Some(length as i32)]
        );
    }
    let entry = job.pipeline_info().uniform(INT_LITERAL_UNIFORM_VALUES).unwrap();
    assert_eq!(entry.count, Some(3));
    assert_eq!(entry.args.len(), 3);
}

#[test]
fn other_uniforms_keep_their_bindings() {
    let info = PipelineInfo::from_json(
        r#"{"injectionSwitch":{"func":"glUniform2f","args":[0.0,1.0],"binding":0}}"#,
    )
    .unwrap();
    let mut job = ShaderJob::new(info);
    job.add_shader(ShaderKind::Fragment, "uniform vec2 injectionSwitch;\nvoid main() { float x = 0.25; }")
        .unwrap();
    let (id, lit) = literals(job.shader(ShaderKind::Fragment).unwrap())[0];
    promote(&mut job, ShaderKind::Fragment, id, lit);

    let info = job.pipeline_info();
    assert_eq!(info.uniform("injectionSwitch").unwrap().binding, Some(0));
    assert_eq!(info.uniform(FLOAT_LITERAL_UNIFORM_VALUES).unwrap().binding, Some(1));
    assert_eq!(info.num_bindings(), 2);
}
