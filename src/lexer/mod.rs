//! Priority-layered streaming lexer.
//!
//! A [Lexer] owns one matcher per registered rule and runs them all in parallel
//! over the input, one character per [feed_char](Lexer::feed_char) call. Rules
//! are organized in three levels:
//!
//! * *major priority bands* — opened with [dec_priority_major](Lexer::dec_priority_major);
//! * *minor priority groups* within a band — opened with
//!   [dec_priority_minor](Lexer::dec_priority_minor);
//! * declaration order within a group.
//!
//! Tokenization is maximal munch: once every live matcher has died, the rule
//! with the longest recorded match wins; equal lengths fall back to the highest
//! band, then the lowest minor group, then the earliest declaration. Skip rules
//! (factories returning `None`) consume input without emitting — whitespace and
//! comments. A rule may also carry a pre-acceptance guard consulted once per
//! token with the previously emitted token, which is how e.g. a signed-number
//! pattern only fires where a sign could not be a binary operator.
//!
//! Positions are tracked by an embedded [SourceMap]; every token factory
//! receives a [TextSpan] with line, column, byte range and file name.
//!
//! # Example
//!
//! ```
//! use lang_lr::lexer::{Lexer, RegexRule};
//! use lang_lr::TextSpan;
//! use std::rc::Rc;
//!
//! #[derive(Debug, PartialEq)]
//! enum Token {
//!     Word(String),
//!     Number(String),
//! }
//!
//! let mut lexer: Lexer<u8, Token> = Lexer::new("input.txt");
//! lexer.add_rule(Box::new(
//!     RegexRule::new("word", "[a-zA-Z]+", |s: &[u8], _: TextSpan| {
//!         Some(Token::Word(String::from_utf8(s.to_vec()).unwrap()))
//!     })
//!     .unwrap(),
//! ));
//! lexer.add_rule(Box::new(
//!     RegexRule::new("number", "[0-9]+", |s: &[u8], _: TextSpan| {
//!         Some(Token::Number(String::from_utf8(s.to_vec()).unwrap()))
//!     })
//!     .unwrap(),
//! ));
//! lexer.dec_priority_major();
//! lexer.add_rule(Box::new(RegexRule::skip("space", " +").unwrap()));
//!
//! let mut tokens: Vec<Rc<Token>> = lexer.feed_all(b"abc 42").unwrap();
//! tokens.extend(lexer.feed_end().unwrap());
//! assert_eq!(*tokens[0], Token::Word("abc".into()));
//! assert_eq!(*tokens[1], Token::Number("42".into()));
//! ```

mod rule_regex;
mod rule_string;

#[cfg(test)]
mod __tests__;

pub use rule_regex::RegexRule;
pub use rule_string::StringLiteralRule;

use crate::utf8::{Utf8Decoder, Utf8Encoder};
use crate::{ILexerRule, LexerError, Log, Position, SourceMap, Symbol, TextSpan};
use once_cell::unsync::OnceCell;
use std::rc::Rc;

struct RuleSlot<S: Symbol, T> {
    rule: Box<dyn ILexerRule<S, Token = T>>,
    feed_len: usize,
    match_len: usize,
    suppressed: bool,
}

#[derive(Clone, Copy)]
struct CharInfo<S: Symbol> {
    c: S,
    line: usize,
    column: usize,
    begin: usize,
    end: usize,
}

/// Push-based tokenizer over an abstract [Symbol] alphabet.
pub struct Lexer<S: Symbol, T> {
    // major band -> minor group -> declaration order
    bands: Vec<Vec<Vec<RuleSlot<S, T>>>>,
    cache: Vec<CharInfo<S>>,
    /// How many cached characters the current matcher generation has seen.
    fed: usize,
    source: SourceMap,
    filename: String,
    line: usize,
    column: usize,
    last_token: Option<Rc<T>>,
    encoder: Box<dyn Fn(S, &mut Vec<u8>)>,
    debug: OnceCell<Log<&'static str>>,
}

impl<S: Symbol, T> Lexer<S, T> {
    /// Create a lexer with a custom symbol → byte encoder for position
    /// tracking.
    pub fn with_encoder(filename: &str, encoder: Box<dyn Fn(S, &mut Vec<u8>)>) -> Self {
        Self {
            bands: vec![vec![Vec::new()]],
            cache: Vec::new(),
            fed: 0,
            source: SourceMap::new(filename),
            filename: filename.to_string(),
            line: 1,
            column: 1,
            last_token: None,
            encoder,
            debug: OnceCell::new(),
        }
    }

    /// Register a rule in the current major band and minor group.
    pub fn add_rule(&mut self, rule: Box<dyn ILexerRule<S, Token = T>>) {
        let suppressed = !rule.accept_first(self.last_token.as_deref());
        let group = self
            .bands
            .last_mut()
            .expect("band list is never empty")
            .last_mut()
            .expect("group list is never empty");
        group.push(RuleSlot {
            rule,
            feed_len: 0,
            match_len: 0,
            suppressed,
        });
    }

    /// Open a new, strictly lower major priority band.
    pub fn dec_priority_major(&mut self) {
        self.bands.push(vec![Vec::new()]);
    }

    /// Open a new minor priority group within the current band.
    pub fn dec_priority_minor(&mut self) {
        self.bands
            .last_mut()
            .expect("band list is never empty")
            .push(Vec::new());
    }

    /// Set a log label to trace emitted tokens in debug builds.
    pub fn set_log(&self, label: Log<&'static str>) -> Result<(), String> {
        self.debug
            .set(label)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// The position record of everything scanned so far.
    pub fn source(&self) -> &SourceMap {
        &self.source
    }

    /// Zero all per-session state; registered rules and compiled automata are
    /// reused.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.fed = 0;
        self.line = 1;
        self.column = 1;
        self.last_token = None;
        self.source = SourceMap::new(&self.filename);
        self.reset_slots();
    }

    /// Feed one character; returns the tokens it completed (usually none or
    /// one, more after a cached run resolves).
    pub fn feed_char(&mut self, c: S) -> Result<Vec<Rc<T>>, LexerError> {
        let begin = self.source.len();
        let mut bytes = Vec::new();
        (self.encoder)(c, &mut bytes);
        self.source.push_bytes(&bytes);
        let info = CharInfo {
            c,
            line: self.line,
            column: self.column,
            begin,
            end: self.source.len(),
        };
        if S::from_char('\n') == Some(c) {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.cache.push(info);
        self.drain(false)
    }

    /// Feed a whole slice.
    pub fn feed_all(&mut self, input: &[S]) -> Result<Vec<Rc<T>>, LexerError> {
        let mut tokens = Vec::new();
        for &c in input {
            tokens.extend(self.feed_char(c)?);
        }
        Ok(tokens)
    }

    /// Signal end of input: flush the pending cache into tokens or fail with
    /// [LexerError::UnexpectedEof].
    pub fn feed_end(&mut self) -> Result<Vec<Rc<T>>, LexerError> {
        self.drain(true)
    }

    fn drain(&mut self, eof: bool) -> Result<Vec<Rc<T>>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            while self.fed < self.cache.len() {
                let info = self.cache[self.fed];
                self.fed += 1;

                let mut all_dead = true;
                for band in self.bands.iter_mut() {
                    for group in band.iter_mut() {
                        for slot in group.iter_mut() {
                            if slot.suppressed || slot.rule.is_dead() {
                                continue;
                            }
                            slot.rule.feed(info.c);
                            slot.feed_len += 1;
                            if slot.rule.is_match() {
                                slot.match_len = slot.feed_len;
                            }
                            if !slot.rule.is_dead() {
                                all_dead = false;
                            }
                        }
                    }
                }

                if all_dead {
                    if self.best_candidate()?.is_none() {
                        return Err(LexerError::NoMatch {
                            position: Position::new(info.line, info.column),
                            pointer: info.begin,
                            symbol: info.c.describe(),
                        });
                    }
                    if let Some(token) = self.emit_best()? {
                        tokens.push(token);
                    }
                }
            }

            if !eof || self.cache.is_empty() {
                return Ok(tokens);
            }

            if self.best_candidate()?.is_none() {
                return Err(LexerError::UnexpectedEof {
                    pointer: self.cache[0].begin,
                    pending: self.cache.len(),
                });
            }
            if let Some(token) = self.emit_best()? {
                tokens.push(token);
            }
        }
    }

    /// The best recorded match: longest first, then highest band, lowest minor
    /// group and earliest declaration. Two same-named rules tying at every
    /// level are a configuration error.
    fn best_candidate(&self) -> Result<Option<(usize, usize, usize, usize)>, LexerError> {
        let mut best: Option<(usize, usize, usize, usize)> = None;
        for (major, band) in self.bands.iter().enumerate() {
            for (minor, group) in band.iter().enumerate() {
                for (index, slot) in group.iter().enumerate() {
                    if slot.match_len == 0 {
                        continue;
                    }
                    let candidate = (slot.match_len, major, minor, index);
                    match best {
                        None => best = Some(candidate),
                        Some(current) => {
                            let (len, b_major, b_minor, b_index) = current;
                            if candidate.0 > len {
                                best = Some(candidate);
                            } else if candidate.0 == len && (major, minor) == (b_major, b_minor) {
                                let first = self.bands[b_major][b_minor][b_index].rule.name();
                                let second = slot.rule.name();
                                if first == second {
                                    let info = &self.cache[0];
                                    return Err(LexerError::RuleConflict {
                                        position: Position::new(info.line, info.column),
                                        first,
                                        second,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
        Ok(best)
    }

    fn emit_best(&mut self) -> Result<Option<Rc<T>>, LexerError> {
        let (len, major, minor, index) = self
            .best_candidate()?
            .expect("emit_best requires a recorded match");

        let first = self.cache[0];
        let last = self.cache[len - 1];
        let span = TextSpan::new(
            first.line,
            first.column,
            first.begin,
            last.end,
            self.source.filename(),
        );
        let symbols: Vec<S> = self.cache[..len].iter().map(|info| info.c).collect();

        let token = self.bands[major][minor][index]
            .rule
            .emit(&symbols, span)
            .map(Rc::new);

        #[cfg(debug_assertions)]
        if let Some(label) = self.debug.get() {
            if label.order() >= Log::Success(()).order() {
                println!(
                    "[{}; {}] rule '{}' consumed {} chars at {}:{}",
                    label,
                    if token.is_some() { "token" } else { "skip" },
                    self.bands[major][minor][index].rule.name(),
                    len,
                    first.line,
                    first.column
                );
            }
        }

        if let Some(token) = &token {
            self.last_token = Some(token.clone());
        }
        self.cache.drain(..len);
        self.fed = 0;
        self.reset_slots();
        Ok(token)
    }

    fn reset_slots(&mut self) {
        let last = self.last_token.clone();
        for band in self.bands.iter_mut() {
            for group in band.iter_mut() {
                for slot in group.iter_mut() {
                    slot.rule.reset();
                    slot.feed_len = 0;
                    slot.match_len = 0;
                    slot.suppressed = !slot.rule.accept_first(last.as_deref());
                }
            }
        }
    }
}

impl<T> Lexer<u8, T> {
    /// Byte-alphabet lexer; positions advance one byte per character.
    pub fn new(filename: &str) -> Self {
        Self::with_encoder(filename, Box::new(|c, out| out.push(c)))
    }
}

impl<T> Lexer<u32, T> {
    /// Code-point-alphabet lexer; positions advance by UTF-8 encoded length.
    pub fn unicode(filename: &str) -> Self {
        Self::with_encoder(
            filename,
            Box::new(|c, out| {
                let _ = Utf8Encoder::encode_into(c, out);
            }),
        )
    }
}

/// A [Lexer] over code points fed with raw UTF-8 bytes: the composition of
/// [Utf8Decoder] with a `u32` lexer.
pub struct Utf8Lexer<T> {
    inner: Lexer<u32, T>,
    decoder: Utf8Decoder,
}

impl<T> Utf8Lexer<T> {
    pub fn new(filename: &str) -> Self {
        Self {
            inner: Lexer::unicode(filename),
            decoder: Utf8Decoder::new(),
        }
    }

    pub fn add_rule(&mut self, rule: Box<dyn ILexerRule<u32, Token = T>>) {
        self.inner.add_rule(rule);
    }

    pub fn dec_priority_major(&mut self) {
        self.inner.dec_priority_major();
    }

    pub fn dec_priority_minor(&mut self) {
        self.inner.dec_priority_minor();
    }

    pub fn source(&self) -> &SourceMap {
        self.inner.source()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
        self.decoder.reset();
    }

    pub fn feed_byte(&mut self, byte: u8) -> Result<Vec<Rc<T>>, LexerError> {
        match self.decoder.decode(byte) {
            Ok(Some(cp)) => self.inner.feed_char(cp),
            Ok(None) => Ok(Vec::new()),
            Err(err) => Err(LexerError::Encoding {
                pointer: self.inner.source().len(),
                message: err.message().to_string(),
            }),
        }
    }

    pub fn feed_str(&mut self, text: &str) -> Result<Vec<Rc<T>>, LexerError> {
        let mut tokens = Vec::new();
        for &b in text.as_bytes() {
            tokens.extend(self.feed_byte(b)?);
        }
        Ok(tokens)
    }

    pub fn feed_end(&mut self) -> Result<Vec<Rc<T>>, LexerError> {
        if self.decoder.pending() > 0 {
            return Err(LexerError::Encoding {
                pointer: self.inner.source().len(),
                message: "truncated UTF-8 sequence".to_string(),
            });
        }
        self.inner.feed_end()
    }
}
