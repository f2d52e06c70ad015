use crate::{RegexError, Symbol};
use std::marker::PhantomData;

/// Streaming rewriter from the extended pattern dialect to the basic one.
///
/// `X?` becomes `(|X)`, `X+` becomes `XX*`, `X{m}`/`X{m,}`/`X{m,n}` expand by
/// repetition, and `.` becomes the full-alphabet class. Bracket classes pass
/// through verbatim; escapes of `{ } ? + .` drop their backslash (those
/// characters are ordinary in the basic dialect), every other escape is kept
/// for the tree pass to validate.
pub(crate) struct PatternExpander<S: Symbol> {
    out: Vec<char>,
    lparen_stack: Vec<usize>,
    /// Start offset of a `(…)` or `[…]` group that ended on the previous
    /// character; quantifiers must immediately follow the group they apply to.
    last_group: Option<usize>,
    escaping: bool,
    in_bracket: bool,
    bracket_escaping: bool,
    bracket_start: usize,
    brace: Option<BraceRepeat>,
    _alphabet: PhantomData<S>,
}

struct BraceRepeat {
    low: usize,
    high: Option<usize>,
    got_comma: bool,
    content: Vec<char>,
}

impl<S: Symbol> PatternExpander<S> {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            lparen_stack: Vec::new(),
            last_group: None,
            escaping: false,
            in_bracket: false,
            bracket_escaping: false,
            bracket_start: 0,
            brace: None,
            _alphabet: PhantomData,
        }
    }

    pub fn expand(pattern: &str) -> Result<Vec<char>, RegexError> {
        let mut expander = Self::new();
        for c in pattern.chars() {
            expander.feed(c)?;
        }
        expander.end()
    }

    pub fn feed(&mut self, c: char) -> Result<(), RegexError> {
        let last_group = self.last_group.take();

        if self.in_bracket {
            self.handle_bracket(c);
            return Ok(());
        }
        if self.brace.is_some() {
            return self.handle_brace(c);
        }

        if self.escaping {
            self.escaping = false;
            match c {
                // Ordinary characters in the basic dialect.
                '{' | '}' | '?' | '+' | '.' => self.out.push(c),
                _ => {
                    self.out.push('\\');
                    self.out.push(c);
                }
            }
            return Ok(());
        }

        match c {
            '(' => {
                self.lparen_stack.push(self.out.len());
                self.out.push(c);
            }
            ')' => {
                let open = self
                    .lparen_stack
                    .pop()
                    .ok_or_else(|| RegexError::new("unmatched ')'"))?;
                self.out.push(c);
                self.last_group = Some(open);
            }
            '\\' => self.escaping = true,
            '[' => {
                self.bracket_start = self.out.len();
                self.in_bracket = true;
                self.bracket_escaping = false;
                self.out.push(c);
            }
            '{' => {
                let content = self.last_node(last_group)?;
                self.brace = Some(BraceRepeat {
                    low: 0,
                    high: None,
                    got_comma: false,
                    content,
                });
            }
            '}' => return Err(RegexError::new("unexpected '}'")),
            '?' => {
                let node = self.last_node(last_group)?;
                self.out.truncate(self.out.len() - node.len());
                self.out.push('(');
                self.out.push('|');
                self.out.extend_from_slice(&node);
                self.out.push(')');
            }
            '+' => {
                let node = self.last_node(last_group)?;
                self.out.extend_from_slice(&node);
                self.out.push('*');
            }
            '.' => {
                let low = S::MIN
                    .to_char()
                    .ok_or_else(|| RegexError::new("alphabet minimum has no literal form"))?;
                let high = S::MAX
                    .to_char()
                    .ok_or_else(|| RegexError::new("alphabet maximum has no literal form"))?;
                let start = self.out.len();
                self.out.push('[');
                self.out.push(low);
                if low != high {
                    self.out.push('-');
                    self.out.push(high);
                }
                self.out.push(']');
                // A quantifier may follow the expanded class.
                self.last_group = Some(start);
            }
            _ => self.out.push(c),
        }
        Ok(())
    }

    pub fn end(mut self) -> Result<Vec<char>, RegexError> {
        if self.escaping {
            return Err(RegexError::new("pattern ends inside an escape"));
        }
        if self.in_bracket {
            return Err(RegexError::new("unterminated character class"));
        }
        if self.brace.is_some() {
            return Err(RegexError::new("unterminated repetition count"));
        }
        self.last_group = None;
        Ok(std::mem::take(&mut self.out))
    }

    fn handle_bracket(&mut self, c: char) {
        self.out.push(c);
        if self.bracket_escaping {
            self.bracket_escaping = false;
        } else if c == '\\' {
            self.bracket_escaping = true;
        } else if c == ']' {
            self.in_bracket = false;
            self.last_group = Some(self.bracket_start);
        }
    }

    fn handle_brace(&mut self, c: char) -> Result<(), RegexError> {
        let brace = self.brace.as_mut().expect("brace mode active");
        match c {
            ',' => {
                if brace.got_comma {
                    return Err(RegexError::new("repeated ',' in repetition count"));
                }
                brace.got_comma = true;
                brace.high = None;
            }
            '}' => {
                let brace = self.brace.take().expect("brace mode active");
                self.out.truncate(self.out.len() - brace.content.len());
                for _ in 0..brace.low {
                    self.out.extend_from_slice(&brace.content);
                }
                if brace.got_comma {
                    match brace.high {
                        None => {
                            // Open-ended: m copies followed by a starred one.
                            self.out.extend_from_slice(&brace.content);
                            self.out.push('*');
                        }
                        Some(high) => {
                            if high < brace.low {
                                return Err(RegexError::new(format!(
                                    "repetition range {{{},{}}} is inverted",
                                    brace.low, high
                                )));
                            }
                            let optional = high - brace.low;
                            for _ in 0..optional {
                                self.out.push('(');
                                self.out.push('|');
                                self.out.extend_from_slice(&brace.content);
                            }
                            for _ in 0..optional {
                                self.out.push(')');
                            }
                        }
                    }
                }
            }
            '0'..='9' => {
                let digit = c as usize - '0' as usize;
                if brace.got_comma {
                    brace.high = Some(brace.high.unwrap_or(0) * 10 + digit);
                } else {
                    brace.low = brace.low * 10 + digit;
                }
            }
            _ => {
                return Err(RegexError::new(format!(
                    "expected digit in repetition count, got {:?}",
                    c
                )))
            }
        }
        Ok(())
    }

    /// The pattern fragment a quantifier applies to: a whole group when one just
    /// closed, otherwise the last literal together with its escape backslash.
    fn last_node(&self, last_group: Option<usize>) -> Result<Vec<char>, RegexError> {
        if let Some(pos) = last_group {
            return Ok(self.out[pos..].to_vec());
        }
        let n = self.out.len();
        if n == 0 {
            return Err(RegexError::new("quantifier is missing its target"));
        }

        let run_before = |end: usize| {
            let mut count = 0;
            while count < end && self.out[end - 1 - count] == '\\' {
                count += 1;
            }
            count
        };

        if self.out[n - 1] == '\\' {
            // A trailing backslash can only be the tail of an escaped backslash.
            debug_assert!(run_before(n) % 2 == 0);
            Ok(vec!['\\', '\\'])
        } else if run_before(n - 1) % 2 == 1 {
            Ok(self.out[n - 2..].to_vec())
        } else {
            Ok(vec![self.out[n - 1]])
        }
    }
}
