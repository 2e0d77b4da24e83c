//! Batch syntax checker for `.iml` files.
//!
//! Parses each file given on the command line and prints one line per
//! diagnostic as `path:offset+len: message` (byte offsets; editors keep
//! their own line index). Exits nonzero when any file had diagnostics.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use nabu_iml::{Document, NodeId};

#[derive(Parser)]
#[command(name = "nabu-imlcheck", version, about = "Parse .iml files and report syntax diagnostics")]
struct Args {
    /// Files to check.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Dump the token stream of each file.
    #[arg(long)]
    tokens: bool,

    /// Dump the syntax tree of each file.
    #[arg(long)]
    tree: bool,
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let mut clean = true;
    for path in &args.files {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let doc = Document::parse(text);
        log::info!(
            "{}: {} tokens, {} diagnostics",
            path.display(),
            doc.tokens().len(),
            doc.diagnostics().len()
        );
        if args.tokens {
            dump_tokens(&doc);
        }
        if args.tree {
            dump_tree(&doc, doc.tree().root(), 0);
        }
        for diag in doc.diagnostics() {
            println!("{}:{}+{}: {}", path.display(), diag.token.start, diag.token.len, diag.message);
            clean = false;
        }
    }
    Ok(clean)
}

fn dump_tokens(doc: &Document) {
    for tok in doc.tokens() {
        println!("  {:>5}..{:<5} {:?} {:?}", tok.start, tok.end(), tok.kind, doc.token_text(*tok));
    }
}

fn dump_tree(doc: &Document, id: NodeId, depth: usize) {
    let node = doc.tree().node(id);
    let span = match node.end_token() {
        Some(end) => format!("{}..{}", node.start_token().start, end.end()),
        None => format!("{}..", node.start_token().start),
    };
    let name = doc.node_name(id).unwrap_or("");
    let state = if doc.tree().is_complete(id) { "" } else { " (incomplete)" };
    println!("  {:indent$}{:?} {name} [{span}]{state}", "", node.syntax_kind(), indent = depth * 2);
    for &child in doc.tree().children(id) {
        dump_tree(doc, child, depth + 1);
    }
}

fn init_logging() {
    // RUST_LOG wins; a batch tool defaults to warnings only.
    let mut builder = env_logger::Builder::new();
    if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(log::LevelFilter::Warn);
    }
    builder.init();
}
