//! Reader for the BNF meta-language.
//!
//! The meta-language is line based. Every non-blank line is one declaration
//! `LHS = RHS`:
//!
//! - `<name> = production | production | ...` declares a non-terminal; each
//!   production is a whitespace-separated sequence of tokens, where `<name>`
//!   is a non-terminal, `'...'`/`"..."` is a quote terminal, a bare name
//!   references an already declared regex terminal and the keyword `EPSILON`
//!   stands (alone) for the empty production.
//! - `name = pattern` declares a regex terminal; the pattern is the raw text
//!   up to the end of the line, trailing whitespace trimmed.
//! - `IGNORE = pattern` appends a pattern the generated lexer should drop.
//! - `EPSILON` cannot be redefined; such declarations warn and are discarded.
//!
//! Reading is a hand-written recursive descent with one byte of lookahead.
//! After the whole source is consumed the grammar is validated and augmented
//! with the start rule `S' -> S`.

use std::{
    collections::{BTreeMap, BTreeSet},
    io::BufRead,
};

use log::{debug, warn};

use crate::grammar::{Grammar, NonTerminal, Production, Rule, Terminal, Token};

mod buffer;
pub mod error;

use buffer::Buffer;
use error::{Error, ErrorKind};

/// The shapes a left-hand side can take
enum Lhs {
    /// `<name>`: a non-terminal declaration
    NonTerminal(String),
    /// A bare name: a regex terminal declaration
    Regex(String),
    /// The reserved `IGNORE` name
    Ignore,
    /// The reserved `EPSILON` name
    Epsilon,
}

/// Reads the meta-language and accumulates a [Grammar].
pub struct Reader<R> {
    /// Byte cursor over the source
    buf: Buffer<R>,
    /// Rules accumulated so far, in declaration order
    rules: Vec<Rule>,
    /// Symbols encountered so far
    tokens: BTreeSet<Token>,
    /// Ignore patterns, in declaration order
    ignored: Vec<String>,
    /// Patterns of the regex terminals declared so far, by name
    patterns: BTreeMap<String, String>,
    /// First use site of each non-terminal referenced on a right-hand side
    uses: BTreeMap<String, usize>,
}

impl<R: BufRead> Reader<R> {
    /// Construct the reader
    ///
    /// # Errors
    ///
    /// If the first line cannot be read (because of I/O) this function fails.
    pub fn new(input: R) -> Result<Self, Error> {
        let buf = Buffer::new(input).map_err(|e| Error::new(1, ErrorKind::Io(e)))?;

        Ok(Self {
            buf,
            rules: Vec::new(),
            tokens: BTreeSet::new(),
            ignored: Vec::new(),
            patterns: BTreeMap::new(),
            uses: BTreeMap::new(),
        })
    }

    /// Parse the whole source into a validated, augmented grammar
    ///
    /// # Errors
    ///
    /// Fails with the first malformed declaration, undefined symbol or I/O
    /// failure; there is no recovery past the first error.
    pub fn read(mut self) -> Result<Grammar, Error> {
        while self.buf.peek().is_some() {
            self.skip_ws()?;
            match self.buf.peek() {
                None => break,
                Some(b'\n') => self.advance()?,
                Some(_) => self.declaration()?,
            }
        }

        self.finish()
    }

    /// Gives a line number to an error kind
    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(self.buf.line_number(), kind)
    }

    /// Moves past the current byte
    fn advance(&mut self) -> Result<(), Error> {
        let line = self.buf.line_number();
        self.buf
            .advance()
            .map_err(|e| Error::new(line, ErrorKind::Io(e)))
    }

    /// Skips whitespace other than the line terminator
    fn skip_ws(&mut self) -> Result<(), Error> {
        while let Some(b) = self.buf.peek() {
            if b == b'\n' || !b.is_ascii_whitespace() {
                break;
            }
            self.advance()?;
        }
        Ok(())
    }

    /// Consumes one byte, failing if it is not the expected one
    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), Error> {
        if self.buf.peek() == Some(byte) {
            self.advance()
        } else {
            Err(self.error(ErrorKind::Unexpected {
                expected,
                found: self.buf.peek(),
            }))
        }
    }

    /// `ws* lhs ws* '=' ws* rhs newline`
    fn declaration(&mut self) -> Result<(), Error> {
        let lhs = self.lhs()?;
        self.skip_ws()?;
        self.expect(b'=', "`=`")?;
        self.skip_ws()?;

        match lhs {
            Lhs::NonTerminal(name) => self.productions(name)?,
            Lhs::Regex(name) => {
                let pattern = self.raw_text()?;
                if pattern.is_empty() {
                    return Err(self.error(ErrorKind::EmptyPattern));
                }
                if self.patterns.contains_key(&name) {
                    warn!("regex terminal `{}` redefined; keeping the first pattern", name);
                } else {
                    debug!("regex terminal `{}` = `{}`", name, pattern);
                    self.tokens
                        .insert(Token::Terminal(Terminal::regex(&name, &pattern)));
                    self.patterns.insert(name, pattern);
                }
            }
            Lhs::Ignore => {
                let pattern = self.raw_text()?;
                if pattern.is_empty() {
                    return Err(self.error(ErrorKind::EmptyPattern));
                }
                // declaration order, duplicates preserved
                self.ignored.push(pattern);
            }
            Lhs::Epsilon => {
                let _ = self.raw_text()?;
                warn!(
                    "`EPSILON` cannot be redefined; declaration on line {} discarded",
                    self.buf.line_number()
                );
            }
        }

        if self.buf.peek() == Some(b'\n') {
            self.advance()?;
        }
        Ok(())
    }

    /// The single token on the left-hand side of a declaration
    fn lhs(&mut self) -> Result<Lhs, Error> {
        match self.buf.peek() {
            Some(b'<') => Ok(Lhs::NonTerminal(self.angle_name()?)),
            Some(b'\'') | Some(b'"') => Err(self.error(ErrorKind::QuoteOnLhs)),
            Some(b) if b.is_ascii_alphabetic() => {
                let name = self.name()?;
                Ok(match name.as_str() {
                    "IGNORE" => Lhs::Ignore,
                    "EPSILON" => Lhs::Epsilon,
                    _ => Lhs::Regex(name),
                })
            }
            found => Err(self.error(ErrorKind::Unexpected {
                expected: "a declaration",
                found,
            })),
        }
    }

    /// `production ('|' production)*`
    fn productions(&mut self, name: String) -> Result<(), Error> {
        let lhs = NonTerminal::new(name);
        self.tokens.insert(Token::NonTerminal(lhs.clone()));

        loop {
            let prod = self.production()?;
            debug!("rule {}", Rule { lhs: lhs.clone(), prod: prod.clone() });
            self.rules.push(Rule {
                lhs: lhs.clone(),
                prod,
            });
            match self.buf.peek() {
                Some(b'|') => self.advance()?,
                // newline or end of input; declaration() consumes the former
                _ => break,
            }
        }
        Ok(())
    }

    /// `token (ws+ token)*`
    fn production(&mut self) -> Result<Production, Error> {
        let mut prod = Production::new();

        loop {
            self.skip_ws()?;
            match self.buf.peek() {
                None | Some(b'\n') | Some(b'|') => break,
                Some(_) => prod.push(self.rhs_token()?),
            }
        }

        if prod.is_empty() {
            return Err(self.error(ErrorKind::EmptyProduction));
        }
        if prod.iter().any(Token::is_epsilon) && prod.len() > 1 {
            return Err(self.error(ErrorKind::EpsilonNotAlone));
        }
        Ok(prod)
    }

    /// One token in production position
    fn rhs_token(&mut self) -> Result<Token, Error> {
        match self.buf.peek() {
            Some(b'<') => {
                let name = self.angle_name()?;
                let line = self.buf.line_number();
                self.uses.entry(name.clone()).or_insert(line);
                let token = Token::NonTerminal(NonTerminal::new(name));
                self.tokens.insert(token.clone());
                Ok(token)
            }
            Some(b'\'') | Some(b'"') => {
                let token = Token::Terminal(Terminal::quote(self.quote_text()?));
                self.tokens.insert(token.clone());
                Ok(token)
            }
            Some(b) if b.is_ascii_alphabetic() => {
                let name = self.name()?;
                if name == "EPSILON" {
                    // ε never joins the token set
                    return Ok(Token::Terminal(Terminal::epsilon()));
                }
                match self.patterns.get(&name) {
                    Some(pattern) => {
                        let token = Token::Terminal(Terminal::regex(name, pattern.clone()));
                        self.tokens.insert(token.clone());
                        Ok(token)
                    }
                    None => Err(self.error(ErrorKind::UndefinedTerminal(name))),
                }
            }
            found => Err(self.error(ErrorKind::Unexpected {
                expected: "a token",
                found,
            })),
        }
    }

    /// `'<' name '>'`
    fn angle_name(&mut self) -> Result<String, Error> {
        self.advance()?;
        let name = self.name()?;
        match self.buf.peek() {
            Some(b'>') => {
                self.advance()?;
                Ok(name)
            }
            _ => Err(self.error(ErrorKind::UnterminatedAngle)),
        }
    }

    /// The text of a `'...'` or `"..."` quote terminal
    fn quote_text(&mut self) -> Result<String, Error> {
        let init = self.buf.peek();
        self.advance()?;

        let mut text = Vec::new();
        loop {
            match self.buf.peek() {
                None | Some(b'\n') => return Err(self.error(ErrorKind::UnterminatedQuote)),
                b if b == init => break,
                Some(b) => {
                    text.push(b);
                    self.advance()?;
                }
            }
        }
        self.advance()?;

        let text = String::from_utf8_lossy(&text).into_owned();
        if text.is_empty() {
            return Err(self.error(ErrorKind::EmptyQuote));
        }
        if text == "$" {
            return Err(self.error(ErrorKind::ReservedEndMarker));
        }
        Ok(text)
    }

    /// `[A-Za-z][A-Za-z0-9_]*`
    fn name(&mut self) -> Result<String, Error> {
        let mut name = Vec::new();

        match self.buf.peek() {
            Some(b) if b.is_ascii_alphabetic() => {
                name.push(b);
                self.advance()?;
            }
            found => {
                return Err(self.error(ErrorKind::Unexpected {
                    expected: "a name",
                    found,
                }))
            }
        }
        while let Some(b) = self.buf.peek() {
            if !(b.is_ascii_alphanumeric() || b == b'_') {
                break;
            }
            name.push(b);
            self.advance()?;
        }

        Ok(String::from_utf8_lossy(&name).into_owned())
    }

    /// Raw text up to the end of the line, trailing whitespace trimmed
    fn raw_text(&mut self) -> Result<String, Error> {
        let mut text = Vec::new();
        while let Some(b) = self.buf.peek() {
            if b == b'\n' {
                break;
            }
            text.push(b);
            self.advance()?;
        }
        while text.last().is_some_and(u8::is_ascii_whitespace) {
            text.pop();
        }
        Ok(String::from_utf8_lossy(&text).into_owned())
    }

    /// Validates what was read and augments it into the final grammar
    fn finish(self) -> Result<Grammar, Error> {
        let Self {
            buf,
            mut rules,
            mut tokens,
            ignored,
            uses,
            ..
        } = self;

        if rules.is_empty() {
            return Err(Error::new(buf.line_number(), ErrorKind::EmptyGrammar));
        }

        // every non-terminal used on a right-hand side needs a defining rule
        let defined: BTreeSet<&str> = rules.iter().map(|r| r.lhs.name()).collect();
        for (name, line) in &uses {
            if !defined.contains(name.as_str()) {
                return Err(Error::new(
                    *line,
                    ErrorKind::UndefinedNonTerminal(name.clone()),
                ));
            }
        }

        // augment with `S' -> S` where S is the first declared non-terminal
        let start = rules[0].lhs.clone();
        rules.insert(
            0,
            Rule {
                lhs: NonTerminal::new("S'"),
                prod: vec![Token::NonTerminal(start.clone())],
            },
        );
        tokens.insert(Token::NonTerminal(start));
        tokens.insert(Token::Terminal(Terminal::end()));

        debug!("read {} rules and {} tokens", rules.len(), tokens.len());
        Ok(Grammar::new(rules, tokens, ignored))
    }
}
