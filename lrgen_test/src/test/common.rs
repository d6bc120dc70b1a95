#![allow(dead_code)]

use lrgen::{generate, Artifacts, Error};

/// The list grammar: one number, then `+ number` repeated via an ε rule
pub const LIST: &str = "int = [0-9]+\n\
                        <S> = <T> <E>\n\
                        <E> = '+' <T> <E> | EPSILON\n\
                        <T> = int\n";

/// The classical non-ambiguous arithmetic expression grammar
pub const ARITHMETIC: &str = "id = [0-9]+\n\
                              <S> = <E>\n\
                              <E> = <E> '+' <T> | <T>\n\
                              <T> = <T> '*' <F> | <F>\n\
                              <F> = '(' <E> ')' | id\n";

/// A grammar with two indistinguishable ε reductions
pub const AMBIGUOUS: &str = "a = 'a'\n\
                             <S> = <A> | <B>\n\
                             <A> = a | EPSILON\n\
                             <B> = a | EPSILON\n";

/// Initialise logging for whichever test runs first
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Runs the generator over an in-memory grammar source
pub fn run(input: &str) -> Result<Artifacts, Error> {
    init_logging();
    generate(input.as_bytes())
}
