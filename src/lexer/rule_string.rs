use crate::{ILexerRule, Symbol, TextSpan};

#[derive(Clone, Copy, PartialEq, Eq)]
enum LiteralState {
    Idle,
    Body,
    Escaping,
    Closed,
    Dead,
}

/// Hand-written rule for double-quoted string literals with C-style escapes.
///
/// Unlike [RegexRule](super::RegexRule) this rule decodes while it matches: the
/// factory receives the literal's *content* with `\"` `\\` `\n` `\r` `\t`
/// already resolved, not the raw quoted spelling. An unescaped newline inside
/// the literal kills the rule.
pub struct StringLiteralRule<S: Symbol, T> {
    name: &'static str,
    state: LiteralState,
    literal: Vec<S>,
    factory: Box<dyn Fn(&[S], TextSpan) -> Option<T>>,
}

impl<S: Symbol, T> StringLiteralRule<S, T> {
    pub fn new(
        name: &'static str,
        factory: impl Fn(&[S], TextSpan) -> Option<T> + 'static,
    ) -> Self {
        Self {
            name,
            state: LiteralState::Idle,
            literal: Vec::new(),
            factory: Box::new(factory),
        }
    }
}

fn is<S: Symbol>(c: S, literal: char) -> bool {
    S::from_char(literal) == Some(c)
}

fn unescape<S: Symbol>(c: S) -> Option<S> {
    const PAIRS: [(char, char); 5] = [
        ('"', '"'),
        ('\\', '\\'),
        ('n', '\n'),
        ('r', '\r'),
        ('t', '\t'),
    ];
    PAIRS
        .iter()
        .find(|(from, _)| is(c, *from))
        .and_then(|(_, to)| S::from_char(*to))
}

impl<S: Symbol, T> ILexerRule<S> for StringLiteralRule<S, T> {
    type Token = T;

    fn reset(&mut self) {
        self.state = LiteralState::Idle;
        self.literal.clear();
    }

    fn feed(&mut self, c: S) {
        self.state = match self.state {
            LiteralState::Idle => {
                if is(c, '"') {
                    LiteralState::Body
                } else {
                    LiteralState::Dead
                }
            }
            LiteralState::Body => {
                if is(c, '"') {
                    LiteralState::Closed
                } else if is(c, '\\') {
                    LiteralState::Escaping
                } else if is(c, '\n') {
                    LiteralState::Dead
                } else {
                    self.literal.push(c);
                    LiteralState::Body
                }
            }
            LiteralState::Escaping => match unescape(c) {
                Some(decoded) => {
                    self.literal.push(decoded);
                    LiteralState::Body
                }
                None => LiteralState::Dead,
            },
            // A closed literal accepts nothing further.
            LiteralState::Closed | LiteralState::Dead => LiteralState::Dead,
        };
    }

    fn is_match(&self) -> bool {
        self.state == LiteralState::Closed
    }

    fn is_dead(&self) -> bool {
        self.state == LiteralState::Dead
    }

    fn emit(&self, _matched: &[S], span: TextSpan) -> Option<T> {
        (self.factory)(&self.literal, span)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
