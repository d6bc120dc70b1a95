//! Command line driver for the LR(1) parser generator.
//!
//! Run `cargo doc --open` to view this documentation in a browser.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::all)]

use std::{fs::File, io::BufReader, path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;

use lrgen::{generate, Artifacts};

/// Command line arguments accepted by the generator
#[derive(Clone, PartialEq, Eq, Parser)]
#[command(version, about)]
struct Args {
    /// dump the augmented grammar rules
    #[arg(short, long)]
    grammar: bool,
    /// dump the ACTION table
    #[arg(short, long)]
    action: bool,
    /// dump the GOTO table
    #[arg(short = 't', long = "goto")]
    goto_table: bool,
    /// dump the FOLLOW sets
    #[arg(short, long)]
    follow: bool,
    /// display all information
    #[arg(short, long)]
    verbose: bool,
    /// grammar source file
    input_file: PathBuf,
}

fn main() -> ExitCode {
    // parse command line arguments
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }

    let file = match File::open(&args.input_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "{} cannot open {}: {}",
                "[ERROR]".red(),
                args.input_file.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };

    let artifacts = match generate(BufReader::new(file)) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red(), e);
            return ExitCode::FAILURE;
        }
    };

    if args.grammar {
        dump_grammar(&artifacts);
    }
    if args.action {
        dump_action(&artifacts);
    }
    if args.goto_table {
        dump_goto(&artifacts);
    }
    if args.follow {
        dump_follow(&artifacts);
    }

    println!(
        "{} rules, {} tokens, {} states",
        artifacts.grammar().rules().len(),
        artifacts.grammar().tokens().len(),
        artifacts.action().len()
    );
    ExitCode::SUCCESS
}

/// Prints the augmented grammar, one numbered rule per line
fn dump_grammar(artifacts: &Artifacts) {
    println!("Rules:");
    for (i, rule) in artifacts.grammar().rules().iter().enumerate() {
        println!("  #{}: {}", i, rule);
    }
    if !artifacts.grammar().ignored().is_empty() {
        println!("Ignored:");
        for pattern in artifacts.grammar().ignored() {
            println!("  {}", pattern);
        }
    }
}

/// Prints the ACTION table, one state per block
fn dump_action(artifacts: &Artifacts) {
    println!("ACTION:");
    for (state, row) in artifacts.action().iter().enumerate() {
        println!("  state {}:", state);
        for (key, action) in row {
            println!("    {} -> {}", key, action);
        }
    }
}

/// Prints the GOTO table, one state per block
fn dump_goto(artifacts: &Artifacts) {
    println!("GOTO:");
    for (state, row) in artifacts.goto() {
        println!("  state {}:", state);
        for (nt, target) in row {
            println!("    {} -> {}", nt.qualified_name(), target);
        }
    }
}

/// Prints the FOLLOW sets, one non-terminal per line
fn dump_follow(artifacts: &Artifacts) {
    println!("FOLLOW:");
    for (nt, follow) in artifacts.follow() {
        let terminals: Vec<_> = follow.iter().map(|t| t.qualified_name()).collect();
        println!("  {}: {}", nt.qualified_name(), terminals.join(" "));
    }
}
