//! FIRST and FOLLOW set computation.
//!
//! Both sets are computed as fixed points over the grammar:
//!
//! 1. FIRST(t) = {t} for every terminal t, FIRST(ε) = {ε}; then for every
//!    rule `A -> X1..Xk`, FIRST(A) grows by FIRST(Xi) \ {ε} for each prefix
//!    X1..Xi whose predecessors all derive ε, and by ε itself if every Xi
//!    does, until no set grows.
//!
//! 2. FOLLOW(S') = {$}; then for every rule `A -> α B β`, FOLLOW(B) grows by
//!    FIRST(β) \ {ε}, and by FOLLOW(A) whenever β is empty or derives ε,
//!    until no set grows.
//!
//! ε is a member of FIRST sets only; it is structurally kept out of FOLLOW.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::grammar::{Grammar, NonTerminal, Terminal, Token};

/// The FIRST sets of a grammar, one per token
pub type FirstSets = BTreeMap<Token, BTreeSet<Terminal>>;
/// The FOLLOW sets of a grammar, one per non-terminal
pub type FollowSets = BTreeMap<NonTerminal, BTreeSet<Terminal>>;

/// Precomputed FIRST and FOLLOW sets of one grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarAnalyzer {
    /// Cached result of the FIRST fixed point
    first: FirstSets,
    /// Cached result of the FOLLOW fixed point
    follow: FollowSets,
}

impl GrammarAnalyzer {
    /// Computes both fixed points for the given grammar
    pub fn new(grammar: &Grammar) -> Self {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);

        Self { first, follow }
    }

    /// Get the FIRST sets
    pub fn first(&self) -> &FirstSets {
        &self.first
    }

    /// Get the FOLLOW sets
    pub fn follow(&self) -> &FollowSets {
        &self.follow
    }

    /// Consume the analyzer, keeping only the FOLLOW sets
    pub fn into_follow(self) -> FollowSets {
        self.follow
    }

    /// The FIRST set of an arbitrary token sequence
    ///
    /// The empty sequence yields `{ε}`.
    pub fn first_of_sequence(&self, seq: &[Token]) -> BTreeSet<Terminal> {
        first_of(&self.first, seq)
    }
}

/// Calculate the FIRST of a token sequence given the sets computed so far
fn first_of(first: &FirstSets, seq: &[Token]) -> BTreeSet<Terminal> {
    let mut set = BTreeSet::new();

    for token in seq {
        let mut token_first = first.get(token).cloned().unwrap_or_default();
        let eps = token_first.remove(&Terminal::epsilon());
        set.extend(token_first);
        // stop at the first symbol that cannot derive ε
        if !eps {
            return set;
        }
    }

    set.insert(Terminal::epsilon());
    set
}

/// Compute the FIRST sets of a grammar
fn compute_first(grammar: &Grammar) -> FirstSets {
    // 1. terminals begin with themselves, non-terminals with nothing
    let mut first: FirstSets = grammar
        .tokens()
        .iter()
        .map(|token| match token {
            Token::Terminal(t) => (token.clone(), BTreeSet::from([t.clone()])),
            Token::NonTerminal(_) => (token.clone(), BTreeSet::new()),
        })
        .collect();
    first.insert(
        Token::Terminal(Terminal::epsilon()),
        BTreeSet::from([Terminal::epsilon()]),
    );
    for rule in grammar.rules() {
        first
            .entry(Token::NonTerminal(rule.lhs.clone()))
            .or_default();
    }

    // 2. grow each left-hand side by the FIRST of its production
    let mut passes = 0;
    loop {
        let mut new_first = first.clone();

        for rule in grammar.rules() {
            let addition = first_of(&first, &rule.prod);
            new_first
                .get_mut(&Token::NonTerminal(rule.lhs.clone()))
                .unwrap()
                .extend(addition);
        }

        // 3. repeat until the sets are equal
        passes += 1;
        if first != new_first {
            first = new_first;
        } else {
            break;
        }
    }
    debug!("FIRST converged after {} passes", passes);

    first
}

/// Compute the FOLLOW sets of a grammar
fn compute_follow(grammar: &Grammar, first: &FirstSets) -> FollowSets {
    // 1. the augmented start symbol is followed by the end of input
    let mut follow: FollowSets = grammar
        .tokens()
        .iter()
        .filter_map(|token| match token {
            Token::NonTerminal(nt) => Some((nt.clone(), BTreeSet::new())),
            Token::Terminal(_) => None,
        })
        .collect();
    follow.insert(grammar.start().clone(), BTreeSet::from([Terminal::end()]));

    // 2. grow the FOLLOW of every non-terminal occurrence from what can
    //    start the rest of its rule
    let mut passes = 0;
    loop {
        let mut new_follow = follow.clone();

        for rule in grammar.rules() {
            for (i, token) in rule.prod.iter().enumerate() {
                let Token::NonTerminal(nt) = token else {
                    continue;
                };
                let mut addition = first_of(first, &rule.prod[i + 1..]);
                let eps = addition.remove(&Terminal::epsilon());
                let set = new_follow.get_mut(nt).unwrap();
                set.extend(addition);
                if eps {
                    let lhs_follow = follow.get(&rule.lhs).cloned().unwrap_or_default();
                    set.extend(lhs_follow);
                }
            }
        }

        // 3. repeat until the sets are equal
        passes += 1;
        if follow != new_follow {
            follow = new_follow;
        } else {
            break;
        }
    }
    debug!("FOLLOW converged after {} passes", passes);

    follow
}
