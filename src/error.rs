use crate::{GrammarError, LexerError, ParserError, RegexError, Utf8Error};
use std::fmt::{Display, Formatter};

impl RegexError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for RegexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RegexError: {}", self.message)
    }
}

impl std::error::Error for RegexError {}

impl Utf8Error {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Utf8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Utf8Error: {}", self.message)
    }
}

impl std::error::Error for Utf8Error {}

impl Display for LexerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LexerError::NoMatch {
                position,
                pointer,
                symbol,
            } => write!(
                f,
                "LexerError: no rule matches {} at {} (offset {})",
                symbol, position, pointer
            ),
            LexerError::UnexpectedEof { pointer, pending } => write!(
                f,
                "LexerError: unexpected end of input at offset {}, {} unprocessed characters",
                pointer, pending
            ),
            LexerError::RuleConflict {
                position,
                first,
                second,
            } => write!(
                f,
                "LexerError: rules '{}' and '{}' tie at every priority level at {}",
                first, second, position
            ),
            LexerError::Encoding { pointer, message } => {
                write!(f, "LexerError: {} at offset {}", message, pointer)
            }
        }
    }
}

impl std::error::Error for LexerError {}

impl GrammarError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GrammarError: {}", self.message)
    }
}

impl std::error::Error for GrammarError {}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserError::UnknownToken { symbol } => {
                write!(f, "ParserError: token {} is not part of the grammar", symbol)
            }
            ParserError::Rejected { state, symbol } => {
                write!(f, "SyntaxError: unexpected {} in state {}", symbol, state)
            }
            ParserError::UnexpectedEnd { message } => {
                write!(f, "SyntaxError: unexpected end of input, {}", message)
            }
            ParserError::NotReady => {
                write!(f, "ParserError: generate_table() has not been called")
            }
        }
    }
}

impl std::error::Error for ParserError {}
