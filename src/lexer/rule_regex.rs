use crate::regex::{self, DfaMatcher};
use crate::{ILexerRule, IMatcher, Log, RegexError, Symbol, TextSpan};
use once_cell::unsync::OnceCell;

/// A pattern-backed lexer rule.
///
/// The pattern compiles to an optimized DFA once, at registration; matching is
/// a binary search per character. The factory receives the matched symbols and
/// their [TextSpan] and may return `None` to consume the input silently.
///
/// An optional guard turns the rule into a context-sensitive one: it is asked
/// once per token, with the previously emitted token, whether the rule may
/// participate at all.
pub struct RegexRule<S: Symbol, T> {
    name: &'static str,
    matcher: DfaMatcher<S>,
    factory: Box<dyn Fn(&[S], TextSpan) -> Option<T>>,
    guard: Option<Box<dyn Fn(Option<&T>) -> bool>>,
    log: OnceCell<Log<&'static str>>,
}

impl<S: Symbol, T> RegexRule<S, T> {
    /// Create a rule from a pattern and a token factory.
    pub fn new(
        name: &'static str,
        pattern: &str,
        factory: impl Fn(&[S], TextSpan) -> Option<T> + 'static,
    ) -> Result<Self, RegexError> {
        let matcher = regex::compile::<S>(pattern)?;
        Ok(Self {
            name,
            matcher,
            factory: Box::new(factory),
            guard: None,
            log: OnceCell::new(),
        })
    }

    /// Create a rule that consumes its matches without emitting tokens
    /// (whitespace, comments).
    pub fn skip(name: &'static str, pattern: &str) -> Result<Self, RegexError> {
        Self::new(name, pattern, |_, _| None)
    }

    /// Attach a pre-acceptance guard consulted once per token with the last
    /// emitted token.
    pub fn with_guard(mut self, guard: impl Fn(Option<&T>) -> bool + 'static) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Set a log label to trace this rule's matches in debug builds.
    pub fn set_log(&self, label: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(label)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }
}

impl<S: Symbol, T> ILexerRule<S> for RegexRule<S, T> {
    type Token = T;

    fn reset(&mut self) {
        self.matcher.reset();
    }

    fn feed(&mut self, c: S) {
        self.matcher.feed(c);
    }

    fn is_match(&self) -> bool {
        self.matcher.is_match()
    }

    fn is_dead(&self) -> bool {
        self.matcher.is_dead()
    }

    fn accept_first(&self, last: Option<&T>) -> bool {
        match &self.guard {
            Some(guard) => guard(last),
            None => true,
        }
    }

    fn emit(&self, matched: &[S], span: TextSpan) -> Option<T> {
        #[cfg(debug_assertions)]
        if let Some(label) = self.log.get() {
            if label.order() >= Log::Success(()).order() {
                println!("[{}; match] '{}' matched {} chars", label, self.name, matched.len());
            }
        }
        (self.factory)(matched, span)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
