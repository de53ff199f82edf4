//! Mailforge CLI
//!
//! Usage:
//!   mailforge [OPTIONS] [FILE]
//!
//! Options:
//!   -t, --tokens <DIR>       Directory of per-category token files (TOML format)
//!   -f, --format <FORMAT>    Output: html, mjml or json [default: html]
//!   --timeout-ms <N>         Give up if lowering takes longer than N milliseconds
//!   --compact                Do not pretty print markup
//!   -v, --verbose            Debug logging on stderr
//!   -h, --help               Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use mailforge::{
    compose, DirTokenStore, Document, MarkupConfig, MjmlLowerer, RenderConfig, RenderError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Client-ready HTML
    Html,
    /// Intermediate markup, before lowering
    Mjml,
    /// The full render result as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "mailforge")]
#[command(about = "Render structured email documents to client-ready HTML")]
struct Cli {
    /// Document JSON file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Directory of per-category token files (TOML format)
    #[arg(short, long, value_name = "DIR")]
    tokens: Option<PathBuf>,

    /// What to print
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Give up if lowering takes longer than this many milliseconds
    #[arg(long, value_name = "N")]
    timeout_ms: Option<u64>,

    /// Do not pretty print markup
    #[arg(long)]
    compact: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("mailforge=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    init_tracing(cli.verbose);

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => fail(format!("reading file '{}': {}", path.display(), e)),
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => fail(format!("reading from stdin: {}", e)),
            }
        }
    };

    let document = match Document::from_json(&source) {
        Ok(document) => document,
        Err(e) => fail(RenderError::from(e)),
    };

    let markup = MarkupConfig::new().with_pretty_print(!cli.compact);
    let mut config = RenderConfig::new()
        .with_markup(markup.clone())
        .with_lowerer(Arc::new(MjmlLowerer::with_config(markup)));
    if let Some(dir) = &cli.tokens {
        if !dir.is_dir() {
            fail(format!("token directory '{}' does not exist", dir.display()));
        }
        config = config.with_token_store(Arc::new(DirTokenStore::new(dir)));
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_deadline(Duration::from_millis(ms));
    }

    let composed = match compose(&document, &config) {
        Ok(composed) => composed,
        Err(e) => fail(e),
    };

    if cli.format == Format::Mjml {
        print_warnings(&composed.warnings);
        println!("{}", composed.intermediate_markup);
        return;
    }

    let intermediate = composed.intermediate_markup.clone();
    let result = match composed.lower(&config) {
        Ok(result) => result,
        Err(RenderError::Lowering(e)) => {
            eprint!("{}", e.format(&intermediate, "email.mjml"));
            process::exit(1);
        }
        Err(e) => fail(e),
    };

    print_warnings(&result.warnings);
    match cli.format {
        Format::Json => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(format!("serializing result: {}", e)),
        },
        _ => println!("{}", result.final_markup),
    }
}

fn print_intro() {
    println!(
        r#"Mailforge - structured email documents to client-ready HTML

USAGE:
    mailforge [OPTIONS] [FILE]
    cat document.json | mailforge

OPTIONS:
    -t, --tokens       Directory of per-category token files (TOML)
    -f, --format       html (default), mjml or json
    --timeout-ms       Lowering deadline in milliseconds
    --compact          Do not pretty print markup
    -v, --verbose      Debug logging on stderr
    -h, --help         Print help

QUICK START:
    echo '{{"category":"cart_abandon","blocks":[{{"type":"hero","headline":"Hi"}}]}}' | mailforge

This renders a single hero section with the cart_abandon design tokens."#
    );
}
