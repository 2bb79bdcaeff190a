//! Command-line inspector for the hackeme front end.
//!
//! Parses a source file and prints the resulting tree, either as a compact
//! s-expression or as JSON.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use hackeme::{canonicalize, parse_program, print_error, Ast};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "hackeme",
    version,
    about = "Front end for the hackeme language: canonical, arity-grouped ASTs."
)]
struct HackemeArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a source file and print the grouped AST.
    Ast {
        /// The path to the hackeme source file.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the tree as JSON instead of an s-expression.
        #[arg(long)]
        json: bool,
    },
    /// Print the canonical AST before arity grouping.
    Canonical {
        /// The path to the hackeme source file.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the tree as JSON instead of an s-expression.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = HackemeArgs::parse();
    match args.command {
        Command::Ast { file, json } => run(&file, json, parse_program),
        Command::Canonical { file, json } => run(&file, json, canonicalize),
    }
}

fn run(
    file: &Path,
    json: bool,
    parse: fn(&str, &str) -> Result<Ast, hackeme::HackemeError>,
) -> ExitCode {
    let source = match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read {}: {}", file.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let name = file.display().to_string();
    match parse(&name, &source) {
        Ok(tree) => {
            if json {
                // Ast serialization is infallible: string maps and vectors only.
                println!("{}", serde_json::to_string_pretty(&tree).unwrap());
            } else {
                println!("{}", tree.pretty());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_error(err);
            ExitCode::FAILURE
        }
    }
}
