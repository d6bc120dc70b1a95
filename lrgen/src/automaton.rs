//! The LR(1) automaton: items, states and the canonical collection.
//!
//! The automaton is the state graph of a deterministic pushdown automaton.
//! Each state is a closed set of items; each item is a rule with a dot
//! marking how far through the production the parse has come, plus one
//! lookahead terminal. Transitions are computed from the token after the dot.

use std::collections::{BTreeSet, HashMap, VecDeque};

use log::debug;

use crate::{
    analyze::GrammarAnalyzer,
    grammar::{Grammar, Terminal, Token},
};

/// A single LR(1) item.
///
/// Items are plain value triples ordered lexicographically; the grammar they
/// index into travels separately.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    /// Index of the rule in the grammar
    pub rule: usize,
    /// Position of the dot within the rule's production, `0..=prod.len()`
    pub dot: usize,
    /// The lookahead terminal
    pub lookahead: Terminal,
}

/// A state of the automaton: a closed set of items
pub type State = BTreeSet<Item>;

/// A bijection between contiguous state numbers and states.
///
/// Lookup is O(1) on average in both directions: by number through a vector,
/// by content through a hash map.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StateMap {
    /// States in discovery order; the position is the state number
    states: Vec<State>,
    /// Reverse lookup from state content to its number
    numbers: HashMap<State, usize>,
}

impl StateMap {
    /// Registers a state under the next free number
    fn insert(&mut self, state: State) -> usize {
        let number = self.states.len();
        self.numbers.insert(state.clone(), number);
        self.states.push(state);
        number
    }

    /// The number of states registered so far
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no state has been registered yet
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Get a state by its number
    pub fn get(&self, number: usize) -> Option<&State> {
        self.states.get(number)
    }

    /// Get the number of a state by its content
    pub fn number_of(&self, state: &State) -> Option<usize> {
        self.numbers.get(state).copied()
    }

    /// Iterate over `(number, state)` pairs in numeric order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &State)> {
        self.states.iter().enumerate()
    }
}

/// The canonical collection of LR(1) states for one grammar.
pub struct Automaton<'a> {
    /// The grammar the automaton is built over
    grammar: &'a Grammar,
    /// Precomputed FIRST sets for closure lookaheads
    analyzer: &'a GrammarAnalyzer,
    /// Every reachable state, numbered in discovery order
    states: StateMap,
}

impl<'a> Automaton<'a> {
    /// Builds the canonical collection for the given grammar
    pub fn new(grammar: &'a Grammar, analyzer: &'a GrammarAnalyzer) -> Self {
        let mut automaton = Self {
            grammar,
            analyzer,
            states: StateMap::default(),
        };
        automaton.build();
        automaton
    }

    /// Get the states of the automaton
    pub fn states(&self) -> &StateMap {
        &self.states
    }

    /// The token after the dot, [None] when the dot is at the end
    pub fn next_token(&self, item: &Item) -> Option<&Token> {
        self.grammar.rule(item.rule).prod.get(item.dot)
    }

    /// Computes the closure of an arbitrary set of items.
    ///
    /// For every item `[A -> α·Bβ, a]` and every rule `B -> γ`, the items
    /// `[B -> ·γ, b]` with `b ∈ FIRST(βa)` join the set, to a fixed point.
    /// An item whose dot faces ε closes over nothing; it is a reduction.
    pub fn closure(&self, items: State) -> State {
        let mut closure = items;

        loop {
            let mut additions = Vec::new();
            for item in &closure {
                let Some(Token::NonTerminal(lhs)) = self.next_token(item) else {
                    continue;
                };

                let mut rest: Vec<Token> = self.grammar.rule(item.rule).prod[item.dot + 1..].to_vec();
                rest.push(Token::Terminal(item.lookahead.clone()));
                let lookaheads = self.analyzer.first_of_sequence(&rest);

                for (rule, candidate) in self.grammar.rules().iter().enumerate() {
                    if candidate.lhs != *lhs {
                        continue;
                    }
                    for lookahead in &lookaheads {
                        if lookahead.is_epsilon() {
                            continue;
                        }
                        additions.push(Item {
                            rule,
                            dot: 0,
                            lookahead: lookahead.clone(),
                        });
                    }
                }
            }

            let before = closure.len();
            closure.extend(additions);
            if closure.len() == before {
                break;
            }
        }

        closure
    }

    /// Computes the state reached from `state` over `next`.
    ///
    /// The result is empty when no item expects `next`; ε never labels a
    /// transition.
    pub fn goto(&self, state: &State, next: &Token) -> State {
        if next.is_epsilon() {
            return State::new();
        }

        let mut kernel = State::new();
        for item in state {
            if self.next_token(item) == Some(next) {
                kernel.insert(Item {
                    rule: item.rule,
                    dot: item.dot + 1,
                    lookahead: item.lookahead.clone(),
                });
            }
        }

        if kernel.is_empty() {
            kernel
        } else {
            self.closure(kernel)
        }
    }

    /// Breadth-first discovery of every reachable state.
    ///
    /// Candidate symbols are tried in canonical token order, which makes the
    /// state numbering deterministic.
    fn build(&mut self) {
        let start = self.closure(State::from([Item {
            rule: 0,
            dot: 0,
            lookahead: Terminal::end(),
        }]));

        let mut queue = VecDeque::from([self.states.insert(start)]);
        while let Some(number) = queue.pop_front() {
            let state = self.states.get(number).unwrap().clone();
            for token in self.grammar.tokens() {
                let target = self.goto(&state, token);
                if target.is_empty() || self.states.number_of(&target).is_some() {
                    continue;
                }
                let discovered = self.states.insert(target);
                debug!("state {} discovered from state {} on {}", discovered, number, token);
                queue.push_back(discovered);
            }
        }
        debug!("canonical collection holds {} states", self.states.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bnf::Reader;

    /// Parses a grammar for the automaton tests
    fn grammar(input: &str) -> Grammar {
        Reader::new(input.as_bytes()).unwrap().read().unwrap()
    }

    const LIST: &str = "int = [0-9]+\n\
                        <S> = <T> <E>\n\
                        <E> = '+' <T> <E> | EPSILON\n\
                        <T> = int\n";

    #[test]
    fn state_zero_is_the_closure_of_the_start_item() {
        let grammar = grammar(LIST);
        let analyzer = GrammarAnalyzer::new(&grammar);
        let automaton = Automaton::new(&grammar, &analyzer);

        let start = automaton.states().get(0).unwrap();
        assert!(start.contains(&Item {
            rule: 0,
            dot: 0,
            lookahead: Terminal::end(),
        }));
        // S -> ·T E and T -> ·int must have been pulled in
        assert!(start.iter().any(|i| i.rule == 1 && i.dot == 0));
        assert!(start.iter().any(|i| i.rule == 4 && i.dot == 0));
    }

    #[test]
    fn closure_is_idempotent() {
        let grammar = grammar(LIST);
        let analyzer = GrammarAnalyzer::new(&grammar);
        let automaton = Automaton::new(&grammar, &analyzer);

        let once = automaton.closure(State::from([Item {
            rule: 0,
            dot: 0,
            lookahead: Terminal::end(),
        }]));
        let twice = automaton.closure(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn goto_never_transitions_on_epsilon() {
        let grammar = grammar(LIST);
        let analyzer = GrammarAnalyzer::new(&grammar);
        let automaton = Automaton::new(&grammar, &analyzer);

        for (_, state) in automaton.states().iter() {
            let target = automaton.goto(state, &Token::Terminal(Terminal::epsilon()));
            assert!(target.is_empty());
        }
    }

    #[test]
    fn state_numbering_is_deterministic() {
        let grammar = grammar(LIST);
        let analyzer = GrammarAnalyzer::new(&grammar);

        let a = Automaton::new(&grammar, &analyzer);
        let b = Automaton::new(&grammar, &analyzer);
        assert_eq!(a.states(), b.states());
    }

    #[test]
    fn every_state_is_closed_and_findable_by_content() {
        let grammar = grammar(LIST);
        let analyzer = GrammarAnalyzer::new(&grammar);
        let automaton = Automaton::new(&grammar, &analyzer);

        for (number, state) in automaton.states().iter() {
            assert_eq!(automaton.states().number_of(state), Some(number));
            assert_eq!(automaton.closure(state.clone()), *state);
        }
    }
}
