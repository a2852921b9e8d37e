use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{ArgAction, Parser};
use serde::Serialize;

use resin_eval::Evaluator;
use resin_lexer::Lexer;
use resin_parser::Binder;

#[derive(Parser, Debug)]
#[command(name = "resin-bench", about = "Run Resin benchmarks")]
struct Cli {
    /// Specific demo(s) to run (by name, e.g. primes). If omitted, runs all
    /// discovered scripts.
    #[arg(short = 't', long = "test", action = ArgAction::Append)]
    tests: Vec<String>,

    /// Iterations per script (measured)
    #[arg(short = 'n', long = "iterations", default_value_t = 10)]
    iterations: u32,

    /// Warmup iterations (not measured)
    #[arg(short = 'w', long = "warmup", default_value_t = 2)]
    warmup: u32,

    /// Output JSON file path; default: bench-results/<timestamp>.json
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// List discovered scripts and exit
    #[arg(long = "list", default_value_t = false)]
    list: bool,
}

#[derive(Debug, Serialize)]
struct BenchResult {
    name: String,
    iterations: u32,
    avg_total_ms: f64,
    min_total_ms: f64,
    max_total_ms: f64,
    avg_lex_ms: f64,
    avg_parse_ms: f64,
    avg_eval_ms: f64,
    /// Arena size after evaluation: bound nodes plus every clone and
    /// rewrite the partial evaluator appended.
    arena_nodes: usize,
}

#[derive(Debug, Serialize)]
struct OutputDoc {
    timestamp: String,
    resin_version: String,
    benchmarks: Vec<BenchResult>,
}

#[derive(Debug, Clone)]
struct ScriptCase {
    name: String,
    path: PathBuf,
}

fn workspace_root() -> PathBuf {
    // crates/resin-bench -> crates -> root
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn discover_scripts() -> Vec<ScriptCase> {
    let dir = workspace_root().join("demos");
    let mut out = Vec::new();
    if let Ok(entries) = fs::read_dir(&dir) {
        for e in entries.flatten() {
            let p = e.path();
            if p.extension().and_then(|s| s.to_str()) == Some("resin") {
                let name = p.file_stem().and_then(|s| s.to_str()).unwrap_or("").to_string();
                out.push(ScriptCase { name, path: p });
            }
        }
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

fn read_script(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

/// One full pipeline run against empty input and a sink output, returning
/// the per-phase timings and the final arena size.
fn run_once(src: &str) -> (f64, f64, f64, usize) {
    let mut t = Instant::now();
    let tokens = Lexer::new(src).tokenize().expect("lex error");
    let t_lex = dur_ms(t.elapsed());

    t = Instant::now();
    let mut tree = Binder::new(tokens).parse_program().expect("parse error");
    let t_parse = dur_ms(t.elapsed());

    t = Instant::now();
    Evaluator::new(io::empty(), io::sink())
        .run(&mut tree)
        .expect("runtime error");
    let t_eval = dur_ms(t.elapsed());

    (t_lex, t_parse, t_eval, tree.len())
}

fn measure_script(src: &str, iterations: u32, warmup: u32) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, usize) {
    for _ in 0..warmup {
        run_once(src);
    }

    let mut totals = Vec::with_capacity(iterations as usize);
    let mut lexes = Vec::with_capacity(iterations as usize);
    let mut parses = Vec::with_capacity(iterations as usize);
    let mut evals = Vec::with_capacity(iterations as usize);
    let mut arena_nodes = 0;

    for _ in 0..iterations {
        let (t_lex, t_parse, t_eval, nodes) = run_once(src);
        arena_nodes = nodes;
        lexes.push(t_lex);
        parses.push(t_parse);
        evals.push(t_eval);
        totals.push(t_lex + t_parse + t_eval);
    }

    (totals, lexes, parses, evals, arena_nodes)
}

fn dur_ms(d: std::time::Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn stats(vals: &[f64]) -> (f64, f64, f64) {
    let min = vals.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = vals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let avg = if vals.is_empty() {
        0.0
    } else {
        vals.iter().sum::<f64>() / (vals.len() as f64)
    };
    (avg, min, max)
}

fn ensure_dir(p: &Path) {
    if let Err(e) = fs::create_dir_all(p) {
        panic!("Failed to create {}: {}", p.display(), e);
    }
}

fn main() {
    let cli = Cli::parse();

    let mut scripts = discover_scripts();

    if cli.list {
        println!("Discovered scripts:");
        for s in &scripts {
            println!("- {} ({})", s.name, s.path.display());
        }
        return;
    }

    if !cli.tests.is_empty() {
        let wanted: std::collections::HashSet<_> =
            cli.tests.iter().map(|s| s.to_lowercase()).collect();
        scripts.retain(|s| wanted.contains(&s.name.to_lowercase()));
        if scripts.is_empty() {
            eprintln!("No matching scripts. Use --list to see available.");
            std::process::exit(2);
        }
    }

    if scripts.is_empty() {
        eprintln!("No .resin scripts found in demos.");
        std::process::exit(2);
    }

    let mut results = Vec::new();

    for case in &scripts {
        let src = read_script(&case.path);
        let (totals, lexes, parses, evals, arena_nodes) =
            measure_script(&src, cli.iterations, cli.warmup);
        let (avg_t, min_t, max_t) = stats(&totals);
        let (avg_l, _, _) = stats(&lexes);
        let (avg_p, _, _) = stats(&parses);
        let (avg_e, _, _) = stats(&evals);

        println!(
            "{:>12}: total avg={:.3}ms min={:.3}ms max={:.3}ms | lex={:.3}ms parse={:.3}ms eval={:.3}ms | arena={} nodes",
            case.name, avg_t, min_t, max_t, avg_l, avg_p, avg_e, arena_nodes
        );

        results.push(BenchResult {
            name: case.name.clone(),
            iterations: cli.iterations,
            avg_total_ms: avg_t,
            min_total_ms: min_t,
            max_total_ms: max_t,
            avg_lex_ms: avg_l,
            avg_parse_ms: avg_p,
            avg_eval_ms: avg_e,
            arena_nodes,
        });
    }

    let out_path = if let Some(p) = cli.output.clone() {
        p
    } else {
        let results_dir = workspace_root().join("bench-results");
        ensure_dir(&results_dir);
        let ts_file = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%SZ").to_string();
        results_dir.join(format!("{}.json", ts_file))
    };

    let doc = OutputDoc {
        timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        resin_version: env!("CARGO_PKG_VERSION").to_string(),
        benchmarks: results,
    };

    let json = serde_json::to_string_pretty(&doc).expect("serialize json");
    if let Some(parent) = out_path.parent() {
        ensure_dir(parent);
    }
    fs::write(&out_path, json).expect("write results json");

    println!("\nSaved results to {}", out_path.display());
}
