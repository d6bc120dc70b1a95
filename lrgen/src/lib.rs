//! A canonical LR(1) parser generator.
//!
//! Feeds a grammar written in a small BNF-like meta-language through four
//! stages, each consuming an immutable snapshot from the one before:
//!
//! 1. the [bnf] reader parses the meta-language into an augmented [grammar];
//! 2. the [analyze] stage computes the FIRST and FOLLOW sets;
//! 3. the [automaton] stage materialises the canonical collection of LR(1)
//!    item sets;
//! 4. the [tables] stage compiles ACTION and GOTO tables, proving the
//!    grammar LR(1) along the way.
//!
//! [generate] runs the whole pipeline and returns the [Artifacts] a
//! downstream code emitter needs: the grammar, both tables and the FOLLOW
//! sets (the latter drive panic-mode error recovery at parse time).

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::all)]

use std::{fmt::Display, io::BufRead};

pub mod analyze;
pub mod automaton;
pub mod bnf;
pub mod grammar;
pub mod tables;

use analyze::{FollowSets, GrammarAnalyzer};
use automaton::Automaton;
use grammar::Grammar;
use tables::{ActionTable, Conflict, GotoTable, Tables};

/// Everything that can abort the pipeline.
#[derive(Debug)]
pub enum Error {
    /// The grammar text was malformed
    Bnf(bnf::error::Error),
    /// Reserved: FIRST/FOLLOW computation cannot currently fail
    Analyzer(String),
    /// The grammar is not LR(1)
    Conflict(Conflict),
    /// An internal invariant was violated; reaching this is a bug
    Internal(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bnf(e) => e.fmt(f),
            Self::Analyzer(msg) | Self::Internal(msg) => write!(f, "{}", msg),
            Self::Conflict(conflict) => conflict.fmt(f),
        }
    }
}

impl From<bnf::error::Error> for Error {
    fn from(value: bnf::error::Error) -> Self {
        Self::Bnf(value)
    }
}

impl From<tables::Error> for Error {
    fn from(value: tables::Error) -> Self {
        match value {
            tables::Error::Conflict(conflict) => Self::Conflict(conflict),
            e @ tables::Error::UnknownState { .. } => Self::Internal(e.to_string()),
        }
    }
}

/// The immutable outcome of a successful run.
///
/// Iteration over every view is deterministic: states in numeric order, table
/// keys lexicographically, sets in their natural order. This is the contract
/// with downstream code emitters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// The augmented grammar, rule order fixed
    grammar: Grammar,
    /// The ACTION table
    action: ActionTable,
    /// The GOTO table
    goto: GotoTable,
    /// The FOLLOW sets, needed at parse time for panic-mode recovery
    follow: FollowSets,
}

impl Artifacts {
    /// Get the augmented grammar
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Get the ACTION table
    pub fn action(&self) -> &ActionTable {
        &self.action
    }

    /// Get the GOTO table
    pub fn goto(&self) -> &GotoTable {
        &self.goto
    }

    /// Get the FOLLOW sets
    pub fn follow(&self) -> &FollowSets {
        &self.follow
    }
}

/// Runs the whole pipeline over a grammar source.
///
/// # Errors
///
/// Fails with the originating stage's error: a malformed grammar, an LR(1)
/// conflict, or (never, short of a bug) a violated internal invariant. No
/// partial tables are ever returned.
pub fn generate<R: BufRead>(input: R) -> Result<Artifacts, Error> {
    let grammar = bnf::Reader::new(input)?.read()?;
    let analyzer = GrammarAnalyzer::new(&grammar);
    let automaton = Automaton::new(&grammar, &analyzer);
    let tables = Tables::build(&grammar, &automaton)?;

    let (action, goto) = tables.into_parts();
    Ok(Artifacts {
        grammar,
        action,
        goto,
        follow: analyzer.into_follow(),
    })
}
