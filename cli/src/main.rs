mod error;

use std::{fs, io, path::PathBuf, process::ExitCode};

use asn1::{AsnCompiler, LineCommentEnd};
use clap::{Parser, ValueEnum};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::error::{to_report, AsnCompilerCache};

/// Parse ASN.1 module definitions and report any problems found
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// ASN.1 source files to parse
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print every parsed module back as ASN.1 notation
    #[arg(long)]
    print: bool,

    /// How `--` comments are terminated
    #[arg(long, value_enum, default_value_t = CommentEnd::Eol)]
    line_comments: CommentEnd,

    /// Maximum nesting depth of types, values and constraints
    #[arg(long, default_value_t = 32)]
    max_depth: usize,

    /// Allow non-ascii letters in names
    #[arg(long)]
    unicode_identifiers: bool,

    /// Accept all unicode whitespace between tokens
    #[arg(long)]
    unicode_whitespace: bool,

    /// Log filter used when `RUST_LOG` is not set, e.g. `debug` or
    /// `asn1=trace`
    #[arg(long, default_value = "warn")]
    log: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CommentEnd {
    /// Only a newline ends a comment
    Eol,

    /// A newline or a second `--` ends a comment
    Hyphens,
}

impl From<CommentEnd> for LineCommentEnd {
    fn from(value: CommentEnd) -> Self {
        match value {
            CommentEnd::Eol => LineCommentEnd::EndOfLine,
            CommentEnd::Hyphens => LineCommentEnd::EndOfLineOrHyphens,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut compiler = AsnCompiler::new();
    compiler.line_comments = args.line_comments.into();
    compiler.max_depth = args.max_depth;
    compiler.unicode_identifiers = args.unicode_identifiers;
    compiler.unicode_whitespace = args.unicode_whitespace;

    for path in &args.files {
        match fs::read_to_string(path) {
            Ok(source) => {
                compiler.add_file(path.display().to_string(), source);
            }
            Err(err) => {
                error!(path = %path.display(), %err, "unable to read source file");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut cache = AsnCompilerCache::new(&compiler);
    for diag in compiler.diagnostics() {
        match to_report(diag) {
            Ok(report) => {
                if let Err(err) = report.eprint(&mut cache) {
                    error!(%err, "unable to print diagnostic");
                }
            }
            Err(err) => {
                debug!(%err, "printing diagnostic without source");
                eprintln!("{diag}");
            }
        }
    }

    if args.print {
        for id in compiler.sources() {
            println!("{}", compiler.print_ast(id));
        }
    }

    debug!(files = args.files.len(), "finished parsing");
    if compiler.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
