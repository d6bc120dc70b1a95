//! ACTION and GOTO table construction.
//!
//! The ACTION table drives the shift-reduce loop: dense by state, sparse by
//! qualified terminal key, with a missing key meaning error. The GOTO table
//! holds the non-terminal transitions taken after reductions and is sparse in
//! both dimensions. Conflicts are detected the moment a cell would be
//! overwritten with a different action, so the grammar is proven LR(1) by
//! the mere existence of the tables.

use std::{collections::BTreeMap, fmt::Display};

use log::debug;

use crate::{
    automaton::Automaton,
    grammar::{Grammar, NonTerminal, Terminal, Token},
};

/// A single parse action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Consume the terminal and enter the given state
    Shift(usize),
    /// Reduce by the given rule
    Reduce(usize),
    /// Parse finished
    Accept,
    /// Dead cell; stored nowhere, reported for missing keys
    Error,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shift(state) => write!(f, "s{}", state),
            Self::Reduce(rule) => write!(f, "r{}", rule),
            Self::Accept => write!(f, "acc"),
            Self::Error => write!(f, "err"),
        }
    }
}

/// The two kinds of action that collided in one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Two shifts to different states
    ShiftShift,
    /// A shift against a reduction
    ShiftReduce,
    /// Two different reductions
    ReduceReduce,
}

impl Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Self::ShiftShift => "shift/shift",
            Self::ShiftReduce => "shift/reduce",
            Self::ReduceReduce => "reduce/reduce",
        };

        write!(f, "{}", str)
    }
}

/// Proof that the grammar is not LR(1): where two actions collided.
#[derive(Debug)]
pub struct Conflict {
    /// Which kinds of action collided
    pub kind: ConflictKind,
    /// The state whose row was being filled
    pub state: usize,
    /// The qualified terminal key of the cell
    pub key: String,
}

impl Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "grammar is not LR(1): {} conflict in state {} on `{}`",
            self.kind, self.state, self.key
        )
    }
}

/// Types of errors that can happen during table construction.
#[derive(Debug)]
pub enum Error {
    /// Two differing actions landed in one cell
    Conflict(Conflict),
    /// A transition led to a state missing from the canonical collection
    UnknownState {
        /// The state whose row was being filled
        state: usize,
        /// The key of the offending transition
        key: String,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict(conflict) => conflict.fmt(f),
            Self::UnknownState { state, key } => write!(
                f,
                "transition from state {} on `{}` leads outside the canonical collection",
                state, key
            ),
        }
    }
}

/// The ACTION table: indexed by state, keyed by qualified terminal name
pub type ActionTable = Vec<BTreeMap<String, Action>>;
/// The GOTO table: state to non-terminal to state, absent when undefined
pub type GotoTable = BTreeMap<usize, BTreeMap<NonTerminal, usize>>;

/// The ACTION/GOTO table pair of one grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    /// The ACTION table
    action: ActionTable,
    /// The GOTO table
    goto: GotoTable,
}

impl Tables {
    /// Builds both tables from the canonical collection.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Conflict`] on the first cell two differing actions
    /// fight over, which happens exactly when the grammar is not LR(1).
    pub fn build(grammar: &Grammar, automaton: &Automaton) -> Result<Self, Error> {
        let action = build_action(automaton)?;
        let goto = build_goto(grammar, automaton)?;

        debug!(
            "built {} action rows and {} goto rows",
            action.len(),
            goto.len()
        );
        Ok(Self { action, goto })
    }

    /// Get the ACTION table
    pub fn action_table(&self) -> &ActionTable {
        &self.action
    }

    /// Get the GOTO table
    pub fn goto_table(&self) -> &GotoTable {
        &self.goto
    }

    /// Look up one ACTION cell; missing keys are [`Action::Error`]
    pub fn action(&self, state: usize, key: &str) -> Action {
        self.action
            .get(state)
            .and_then(|row| row.get(key))
            .copied()
            .unwrap_or(Action::Error)
    }

    /// Split the pair into its parts
    pub fn into_parts(self) -> (ActionTable, GotoTable) {
        (self.action, self.goto)
    }
}

/// Fills the ACTION rows from the items of every state
fn build_action(automaton: &Automaton) -> Result<ActionTable, Error> {
    let mut action: ActionTable = vec![BTreeMap::new(); automaton.states().len()];

    for (number, state) in automaton.states().iter() {
        let row = &mut action[number];
        for item in state {
            match automaton.next_token(item) {
                // explicit ε in the production: the item is a reduction
                Some(Token::Terminal(t)) if t.is_epsilon() => insert(
                    row,
                    number,
                    item.lookahead.qualified_name(),
                    Action::Reduce(item.rule),
                )?,
                Some(Token::Terminal(t)) => {
                    let token = Token::Terminal(t.clone());
                    let target = automaton.goto(state, &token);
                    let next = automaton.states().number_of(&target).ok_or_else(|| {
                        Error::UnknownState {
                            state: number,
                            key: t.qualified_name(),
                        }
                    })?;
                    insert(row, number, t.qualified_name(), Action::Shift(next))?;
                }
                // non-terminal transitions belong to the GOTO table
                Some(Token::NonTerminal(_)) => {}
                None if item.rule == 0 => insert(
                    row,
                    number,
                    Terminal::end().qualified_name(),
                    Action::Accept,
                )?,
                None => insert(
                    row,
                    number,
                    item.lookahead.qualified_name(),
                    Action::Reduce(item.rule),
                )?,
            }
        }
    }

    Ok(action)
}

/// Fills the GOTO rows from the non-terminal transitions of every state
fn build_goto(grammar: &Grammar, automaton: &Automaton) -> Result<GotoTable, Error> {
    let mut goto = GotoTable::new();

    for (number, state) in automaton.states().iter() {
        for token in grammar.tokens() {
            let Token::NonTerminal(nt) = token else {
                continue;
            };
            let target = automaton.goto(state, token);
            if target.is_empty() {
                continue;
            }
            let next = automaton
                .states()
                .number_of(&target)
                .ok_or_else(|| Error::UnknownState {
                    state: number,
                    key: token.qualified_name(),
                })?;
            goto.entry(number).or_default().insert(nt.clone(), next);
        }
    }

    Ok(goto)
}

/// Writes one ACTION cell.
///
/// Re-writing the identical action is a no-op; a differing action is a
/// conflict, classified by the two kinds involved.
fn insert(
    row: &mut BTreeMap<String, Action>,
    state: usize,
    key: String,
    new: Action,
) -> Result<(), Error> {
    match row.get(&key) {
        None => {
            row.insert(key, new);
            Ok(())
        }
        Some(existing) if *existing == new => Ok(()),
        Some(existing) => Err(Error::Conflict(Conflict {
            kind: classify(*existing, new),
            state,
            key,
        })),
    }
}

/// Names the collision of two differing actions.
///
/// ACCEPT is the rule-0 reduction, so it classifies as a reduce.
fn classify(a: Action, b: Action) -> ConflictKind {
    match (a, b) {
        (Action::Shift(_), Action::Shift(_)) => ConflictKind::ShiftShift,
        (Action::Shift(_), _) | (_, Action::Shift(_)) => ConflictKind::ShiftReduce,
        _ => ConflictKind::ReduceReduce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analyze::GrammarAnalyzer, bnf::Reader};

    /// Runs the whole pipeline up to the tables
    fn build(input: &str) -> Result<Tables, Error> {
        let grammar = Reader::new(input.as_bytes()).unwrap().read().unwrap();
        let analyzer = GrammarAnalyzer::new(&grammar);
        let automaton = Automaton::new(&grammar, &analyzer);
        Tables::build(&grammar, &automaton)
    }

    const LIST: &str = "int = [0-9]+\n\
                        <S> = <T> <E>\n\
                        <E> = '+' <T> <E> | EPSILON\n\
                        <T> = int\n";

    #[test]
    fn the_list_grammar_is_lr1() {
        let tables = build(LIST).unwrap();

        // exactly one accepting cell, and it sits under the end marker
        let accepts: Vec<_> = tables
            .action_table()
            .iter()
            .flat_map(|row| row.iter())
            .filter(|(_, action)| matches!(action, Action::Accept))
            .collect();
        assert_eq!(accepts.len(), 1);
        assert_eq!(accepts[0].0, "T_$");
    }

    #[test]
    fn epsilon_rules_reduce_on_their_lookahead() {
        let tables = build(LIST).unwrap();

        // E -> ε is rule 3; FOLLOW(E) = {$}, so some state reduces by it on $
        let reduces = tables
            .action_table()
            .iter()
            .flat_map(|row| row.iter())
            .any(|(key, action)| key == "T_$" && matches!(action, Action::Reduce(3)));
        assert!(reduces);
    }

    #[test]
    fn epsilon_never_keys_a_cell() {
        let tables = build(LIST).unwrap();

        for row in tables.action_table() {
            assert!(!row.contains_key("T_"));
        }
    }

    #[test]
    fn missing_cells_read_as_error() {
        let tables = build(LIST).unwrap();
        assert_eq!(tables.action(0, "T_missing"), Action::Error);
        assert_eq!(tables.action(usize::MAX, "T_$"), Action::Error);
    }

    #[test]
    fn ambiguous_grammars_conflict_instead_of_overwriting() {
        let input = "a = 'a'\n\
                     <S> = <A> | <B>\n\
                     <A> = a | EPSILON\n\
                     <B> = a | EPSILON\n";
        let err = build(input).unwrap_err();

        let Error::Conflict(conflict) = err else {
            panic!("expected a conflict");
        };
        assert_eq!(conflict.kind, ConflictKind::ReduceReduce);
        assert_eq!(conflict.state, 0);
    }

    #[test]
    fn classification_covers_all_pairs() {
        assert_eq!(
            classify(Action::Shift(1), Action::Shift(2)),
            ConflictKind::ShiftShift
        );
        assert_eq!(
            classify(Action::Shift(1), Action::Reduce(2)),
            ConflictKind::ShiftReduce
        );
        assert_eq!(
            classify(Action::Accept, Action::Shift(1)),
            ConflictKind::ShiftReduce
        );
        assert_eq!(
            classify(Action::Reduce(1), Action::Reduce(2)),
            ConflictKind::ReduceReduce
        );
        assert_eq!(
            classify(Action::Reduce(1), Action::Accept),
            ConflictKind::ReduceReduce
        );
    }

    #[test]
    fn goto_rows_omit_absent_transitions() {
        let tables = build(LIST).unwrap();

        for (state, row) in tables.goto_table() {
            assert!(!row.is_empty(), "state {} has an empty goto row", state);
            for target in row.values() {
                assert!(*target < tables.action_table().len());
            }
        }
    }
}
