use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glsl_reduce::{find_opportunities, ShaderJob, ShaderKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Stage {
    Vert,
    Frag,
    Comp,
}

impl From<Stage> for ShaderKind {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Vert => ShaderKind::Vertex,
            Stage::Frag => ShaderKind::Fragment,
            Stage::Comp => ShaderKind::Compute,
        }
    }
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum Emit {
    Job,
    Glsl,
    Metadata,
    Opportunities,
    Info,
}

#[derive(Parser, Debug)]
#[command(
    name = "glsl-reduce",
    version,
    about = "Promotes GLSL literals to uniform arrays in a shader job"
)]
struct Cli {
    /// Shader job metadata file; stages are read from sibling .vert/.frag/.comp files
    job: PathBuf,

    /// Output metadata path for `--emit job`; stages are written next to it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Apply at most this many opportunities
    #[arg(long)]
    limit: Option<usize>,

    /// Only consider literals in this stage
    #[arg(long, value_enum)]
    stage: Option<Stage>,

    /// What to print or write
    #[arg(long, value_enum, default_value_t = Emit::Glsl)]
    emit: Emit,

    /// Debug-level logging on stderr
    #[arg(long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn fingerprint_or_exit(job: &ShaderJob) -> String {
    match job.fingerprint() {
        Ok(hex) => hex,
        Err(e) => {
            eprintln!("glsl-reduce: error: {}", e);
            std::process::exit(2);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // ── Load ──
    let mut job = match ShaderJob::load(&cli.job) {
        Ok(job) => job,
        Err(e) => {
            eprintln!("glsl-reduce: error: {}", e);
            std::process::exit(2);
        }
    };
    let before = fingerprint_or_exit(&job);

    // ── Find ──
    let mut opportunities = find_opportunities(&mut job);
    if let Some(stage) = cli.stage {
        let kind = ShaderKind::from(stage);
        opportunities.retain(|op| op.stage() == kind);
    }
    let found = opportunities.len();
    tracing::debug!(found, "found opportunities");

    if let Emit::Opportunities = cli.emit {
        for op in &opportunities {
            println!("{}\tdepth {}", op.describe(), op.depth());
        }
        return;
    }

    // ── Apply ──
    let limit = cli.limit.unwrap_or(usize::MAX);
    let mut applied = 0usize;
    for op in opportunities.into_iter().take(limit) {
        if !op.precondition_holds(&job) {
            continue;
        }
        let description = op.describe();
        if let Err(e) = op.apply(&mut job) {
            eprintln!("glsl-reduce: error: {}: {}", description, e);
            std::process::exit(1);
        }
        applied += 1;
    }

    // ── Emit ──
    match cli.emit {
        Emit::Job => {
            let Some(output) = &cli.output else {
                eprintln!("glsl-reduce: error: --emit job needs an output path (-o)");
                std::process::exit(2);
            };
            if let Err(e) = job.write(output) {
                eprintln!("glsl-reduce: error: {}", e);
                std::process::exit(2);
            }
        }
        Emit::Glsl => {
            for (kind, unit) in job.shaders() {
                println!("// {}", kind);
                print!("{}", unit);
            }
        }
        Emit::Metadata => match job.pipeline_info().to_json_pretty() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("glsl-reduce: error: {}", e);
                std::process::exit(2);
            }
        },
        Emit::Info => {
            let after = fingerprint_or_exit(&job);
            let info = serde_json::json!({
                "stages": job.shaders().len(),
                "opportunities": found,
                "applied": applied,
                "fingerprint_before": before,
                "fingerprint_after": after,
            });
            println!("{}", info);
        }
        Emit::Opportunities => {}
    }

    if cli.verbose {
        eprintln!("glsl-reduce: applied {} of {} opportunities", applied, found);
    }
}
