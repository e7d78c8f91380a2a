use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glsl_reduce::pipeline_info::PipelineInfo;
use glsl_reduce::*;

// Sample fragment shaders of varying literal density
const SIMPLE_SHADER: &str = r#"
#version 310 es
precision highp float;
layout(location = 0) out vec4 _GLF_color;
void main()
{
    _GLF_color = vec4(1.0, 0.0, 0.0, 1.0);
}
"#;

const LOOP_SHADER: &str = r#"
#version 310 es
precision highp float;
layout(location = 0) out vec4 _GLF_color;
uniform vec2 resolution;
void main()
{
    float acc = 0.0;
    for (int i = 0; i < 16; i++) {
        if (i % 3 == 1) {
            acc += 0.125;
        } else {
            acc -= 0.0625 * float(i);
        }
    }
    int n = 4;
    while (n > 0) {
        n = n - 1;
        acc = acc * 0.5 + 2.0;
    }
    _GLF_color = vec4(acc / resolution.x, 0.25, 0.75, 1.0);
}
"#;

const FUNCTIONS_SHADER: &str = r#"
#version 310 es
precision highp float;
layout(location = 0) out vec4 _GLF_color;
uniform vec2 injectionSwitch;
float wave(float x, int k)
{
    float s = 0.0;
    for (int j = 1; j <= k; j++) {
        s += sin(x * float(j) * 3.14159) / float(j);
    }
    return s * 0.6366;
}
vec3 palette(float t)
{
    vec3 a = vec3(0.5, 0.5, 0.5);
    vec3 b = vec3(0.5, 0.5, 0.5);
    vec3 c = vec3(1.0, 1.0, 1.0);
    vec3 d = vec3(0.0, 0.33, 0.67);
    return a + b * cos(6.28318 * (c * t + d));
}
void main()
{
    if (injectionSwitch.x > injectionSwitch.y) {
        return;
    }
    float w = wave(gl_FragCoord.x / 256.0, 8);
    int bands = 5;
    int band = int(w * float(bands)) % bands;
    _GLF_color = vec4(palette(float(band) / 5.0), 1.0);
}
"#;

const SHADERS: [(&str, &str); 3] = [
    ("simple", SIMPLE_SHADER),
    ("loop", LOOP_SHADER),
    ("functions", FUNCTIONS_SHADER),
];

fn job_for(source: &str) -> ShaderJob {
    let mut job = ShaderJob::new(PipelineInfo::new());
    if job.add_shader(ShaderKind::Fragment, source).is_err() {
        panic!("benchmark shader failed to parse");
    }
    job
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, source) in SHADERS {
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| {
                let result = parser::parse(black_box(source));
                black_box(&result.unit);
            });
        });
    }
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_opportunities");
    for (name, source) in SHADERS {
        let job = job_for(source);
        group.bench_with_input(BenchmarkId::from_parameter(name), &job, |b, job| {
            b.iter(|| {
                let mut job = job.clone();
                black_box(find_opportunities(&mut job));
            });
        });
    }
    group.finish();
}

fn bench_reduce_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_all");
    for (name, source) in SHADERS {
        let job = job_for(source);
        group.bench_with_input(BenchmarkId::from_parameter(name), &job, |b, job| {
            b.iter(|| {
                // Each application rebuilds the parent map and re-declares the array
                let mut job = job.clone();
                for op in find_opportunities(&mut job) {
                    let _ = op.apply(&mut job);
                }
                black_box(job.pipeline_info().num_uniforms());
            });
        });
    }
    group.finish();
}

fn bench_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("print");
    for (name, source) in SHADERS {
        let mut job = job_for(source);
        for op in find_opportunities(&mut job) {
            let _ = op.apply(&mut job);
        }
        group.bench_with_input(BenchmarkId::from_parameter(name), &job, |b, job| {
            b.iter(|| {
                for (_, unit) in job.shaders() {
                    black_box(printer::to_glsl(unit));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_find, bench_reduce_all, bench_print);
criterion_main!(benches);
