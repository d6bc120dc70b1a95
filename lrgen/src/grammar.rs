//! Symbols, rules and the grammar itself.
//!
//! Also defines the two sentinel terminals (ε and the end-of-input marker)
//! and the qualified-name scheme used to key the generated tables.

use std::{
    cmp::Ordering,
    collections::BTreeSet,
    fmt::Display,
    hash::{Hash, Hasher},
};

/// A terminal symbol of the grammar.
///
/// Terminals come in two flavours. A *quote* terminal stands for its literal
/// text and carries no pattern; a *regex* terminal names a token class whose
/// lexical pattern is stored alongside the name. The flavour and the name take
/// part in comparisons, the pattern text does not, so a reference to a regex
/// terminal compares equal to its definition while a quote terminal and a
/// regex terminal sharing a name stay distinct.
#[derive(Debug, Clone)]
pub struct Terminal {
    /// Name of the terminal; for quote terminals this is the literal text
    name: String,
    /// Lexical pattern of a regex terminal; empty for quote terminals
    repr: String,
}

impl Terminal {
    /// Constructs a quote terminal from its literal text
    pub fn quote(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repr: String::new(),
        }
    }

    /// Constructs a regex terminal from its name and lexical pattern
    pub fn regex(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repr: pattern.into(),
        }
    }

    /// The ε sentinel: an empty production is a production holding only this
    pub fn epsilon() -> Self {
        Self::quote("")
    }

    /// The end-of-input marker `$`, reserved for the augmented start rule
    pub fn end() -> Self {
        Self::quote("$")
    }

    /// Get the name of the terminal
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the lexical pattern of a regex terminal
    pub fn pattern(&self) -> Option<&str> {
        if self.repr.is_empty() {
            None
        } else {
            Some(&self.repr)
        }
    }

    /// Whether this terminal stands for its literal text
    pub fn is_quote(&self) -> bool {
        self.repr.is_empty()
    }

    /// Whether this terminal names a token class with a lexical pattern
    pub fn is_regex(&self) -> bool {
        !self.repr.is_empty()
    }

    /// Whether this terminal is the ε sentinel
    pub fn is_epsilon(&self) -> bool {
        self.repr.is_empty() && self.name.is_empty()
    }

    /// The stable table key of the terminal: `T_name` or `R_name`
    pub fn qualified_name(&self) -> String {
        if self.repr.is_empty() {
            format!("T_{}", self.name)
        } else {
            format!("R_{}", self.name)
        }
    }
}

// Comparisons discriminate on flavour first and never look at the pattern
// text, so `regex("id", "[a-z]+")` == `regex("id", "x")` != `quote("id")`.

impl PartialEq for Terminal {
    fn eq(&self, other: &Self) -> bool {
        self.repr.is_empty() == other.repr.is_empty() && self.name == other.name
    }
}

impl Eq for Terminal {}

impl PartialOrd for Terminal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Terminal {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.repr.is_empty(), &self.name).cmp(&(other.repr.is_empty(), &other.name))
    }
}

impl Hash for Terminal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.repr.is_empty().hash(state);
        self.name.hash(state);
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_epsilon() {
            write!(f, "EPSILON")
        } else if self.is_quote() {
            write!(f, "'{}'", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// A non-terminal symbol, identified by name alone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonTerminal {
    /// Name of the non-terminal
    name: String,
}

impl NonTerminal {
    /// Constructs a non-terminal from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Get the name of the non-terminal
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stable table key of the non-terminal: `NT_name`
    pub fn qualified_name(&self) -> String {
        format!("NT_{}", self.name)
    }
}

impl Display for NonTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.name)
    }
}

/// A single symbol in a production, which may or may not be terminal.
///
/// The derived ordering puts every terminal before every non-terminal, with
/// the flavour-then-name order inside each variant; this is the canonical
/// token order the automaton iterates in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    /// A terminal symbol
    Terminal(Terminal),
    /// A non-terminal symbol
    NonTerminal(NonTerminal),
}

impl Token {
    /// Whether the token is a terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// Whether the token is a non-terminal
    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Self::NonTerminal(_))
    }

    /// Whether the token is the ε sentinel terminal
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Self::Terminal(t) if t.is_epsilon())
    }

    /// The stable table key of the token (`T_`, `R_` or `NT_` prefixed)
    pub fn qualified_name(&self) -> String {
        match self {
            Self::Terminal(t) => t.qualified_name(),
            Self::NonTerminal(nt) => nt.qualified_name(),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal(t) => t.fmt(f),
            Self::NonTerminal(nt) => nt.fmt(f),
        }
    }
}

/// An ordered sequence of tokens forming the right-hand side of a rule
pub type Production = Vec<Token>;

/// An entire grammar rule: a left-hand non-terminal and one production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The left-hand side of the rule
    pub lhs: NonTerminal,
    /// The production the left-hand side expands to
    pub prod: Production,
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for token in &self.prod {
            write!(f, " {}", token)?;
        }
        Ok(())
    }
}

/// The parsed, augmented user grammar.
///
/// Rule 0 is always the augmentation `S' -> S` where `S` is the first
/// non-terminal the user declared. The token set holds every symbol that
/// appears in a declaration plus the start non-terminal and the end marker;
/// ε is never a member. Iterating the set visits tokens in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    /// All rules, in declaration order behind the augmentation rule
    rules: Vec<Rule>,
    /// Every symbol of the grammar, in canonical order
    tokens: BTreeSet<Token>,
    /// Lexer patterns to drop, in declaration order
    ignored: Vec<String>,
}

impl Grammar {
    /// Assembles a grammar from parts already validated by the reader
    pub(crate) fn new(rules: Vec<Rule>, tokens: BTreeSet<Token>, ignored: Vec<String>) -> Self {
        Self {
            rules,
            tokens,
            ignored,
        }
    }

    /// Get the rules of the grammar
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Get a single rule by index
    pub fn rule(&self, i: usize) -> &Rule {
        &self.rules[i]
    }

    /// Get the token set of the grammar
    pub fn tokens(&self) -> &BTreeSet<Token> {
        &self.tokens
    }

    /// Get the ignore patterns of the grammar
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// The augmented start symbol `S'` (the left-hand side of rule 0)
    pub fn start(&self) -> &NonTerminal {
        &self.rules[0].lhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_and_regex_terminals_with_equal_names_are_distinct() {
        let quote = Terminal::quote("id");
        let regex = Terminal::regex("id", "[a-z]+");

        assert_ne!(quote, regex);
        assert_ne!(quote.qualified_name(), regex.qualified_name());
        assert_eq!(quote.qualified_name(), "T_id");
        assert_eq!(regex.qualified_name(), "R_id");
    }

    #[test]
    fn regex_reference_equals_its_definition() {
        // a reference carries no pattern knowledge worth comparing
        let definition = Terminal::regex("int", "[0-9]+");
        let reference = Terminal::regex("int", "[0-9]+x");

        assert_eq!(definition, reference);
        assert_eq!(definition.cmp(&reference), Ordering::Equal);
    }

    #[test]
    fn terminals_sort_regex_first_then_by_name() {
        let mut set = BTreeSet::new();
        set.insert(Terminal::quote("+"));
        set.insert(Terminal::regex("int", "[0-9]+"));
        set.insert(Terminal::quote("("));
        set.insert(Terminal::regex("id", "[a-z]+"));

        let names: Vec<_> = set.iter().map(Terminal::name).collect();
        assert_eq!(names, ["id", "int", "(", "+"]);
    }

    #[test]
    fn tokens_sort_terminals_before_non_terminals() {
        let mut set = BTreeSet::new();
        set.insert(Token::NonTerminal(NonTerminal::new("A")));
        set.insert(Token::Terminal(Terminal::quote("z")));

        let first = set.iter().next().unwrap();
        assert!(first.is_terminal());
    }

    #[test]
    fn sentinels() {
        assert!(Terminal::epsilon().is_epsilon());
        assert!(Terminal::epsilon().is_quote());
        assert_eq!(Terminal::end().qualified_name(), "T_$");
        assert!(!Terminal::end().is_epsilon());
    }
}
