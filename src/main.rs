mod ast;
mod lexer;
mod options;
mod parser;
mod reporter;
mod token;

use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use log::{debug, error};

use options::Options;
use parser::Parser;
use reporter::{ConsoleReporter, Reporter};
use token::{Token, TokenType};

const EXIT_DATA_ERROR: u8 = 65;
const EXIT_IO_ERROR: u8 = 74;

fn has_expression(tokens: &[Token]) -> bool {
    tokens.iter().any(|token| token.token_type != TokenType::Eof)
}

/// Drops the line terminator left by `read_line`.
fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(&['\n', '\r'][..])
}

/// Scans and parses one unit of input. Returns the comment depth to carry into the next unit.
fn run<W: Write, R: Reporter>(
    source: &str,
    comment_depth: u32,
    opts: &Options,
    print_ast: bool,
    out: &mut W,
    reporter: &mut R
) -> io::Result<u32> {
    let scan = lexer::scan(source, comment_depth, reporter);

    if opts.log_tokens {
        for token in scan.tokens.iter() {
            writeln!(out, "{}", token)?;
        }
    }

    // Blank lines and lines that are only comments have nothing to parse
    if has_expression(&scan.tokens) {
        match Parser::new(scan.tokens).parse() {
            Ok(expr) => {
                if print_ast {
                    writeln!(out, "{}", expr)?;
                }
            },
            Err(err) => err.report(reporter)
        }
    }

    Ok(scan.comment_depth)
}

fn run_file(path: &str, opts: &Options) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            error!("Failed to read file '{}': {}", path, err);
            eprintln!("Could not read '{}': {}", path, err);
            return ExitCode::from(EXIT_IO_ERROR);
        }
    };
    debug!("Running file: {}", path);

    let mut reporter = ConsoleReporter::new();
    let stdout = io::stdout();
    let comment_depth = match run(&source, 0, opts, opts.log_ast, &mut stdout.lock(), &mut reporter) {
        Ok(depth) => depth,
        Err(err) => {
            error!("Failed to write output: {}", err);
            return ExitCode::from(EXIT_IO_ERROR);
        }
    };
    if comment_depth > 0 {
        debug!("File ends inside {} open block comment(s)", comment_depth);
    }

    if reporter.had_error() {
        return ExitCode::from(EXIT_DATA_ERROR);
    }
    ExitCode::SUCCESS
}

fn run_prompt(opts: &Options) -> ExitCode {
    debug!("Starting prompt");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reporter = ConsoleReporter::new();
    let mut comment_depth = 0;
    let mut line = String::new();

    loop {
        let mut out = stdout.lock();
        if write!(out, "> ").and_then(|_| out.flush()).is_err() {
            return ExitCode::from(EXIT_IO_ERROR);
        }

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {},
            Err(err) => {
                error!("Failed to read from stdin: {}", err);
                return ExitCode::from(EXIT_IO_ERROR);
            }
        }

        comment_depth = match run(strip_line_ending(&line), comment_depth, opts, true, &mut out, &mut reporter) {
            Ok(depth) => depth,
            Err(err) => {
                error!("Failed to write output: {}", err);
                return ExitCode::from(EXIT_IO_ERROR);
            }
        };
        reporter.reset();
    }

    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    env_logger::init();
    let opts = Options::parse();

    match &opts.file {
        Some(path) => run_file(path, &opts),
        None => run_prompt(&opts)
    }
}
