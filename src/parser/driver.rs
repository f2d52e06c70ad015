use super::table::Action;
use super::{ParseSlot, ParseValue, Parser, StackEntry};
use crate::{ParserError, TokenImpl};
use std::io::Write;
use std::rc::Rc;

enum Step {
    Shift(usize),
    Reduce(usize),
    Stuck,
}

impl<TT: TokenImpl, TN, TCtx> Parser<TT, TN, TCtx> {
    /// Feed one token: apply every reduction the lookahead commits, then shift
    /// it.
    pub fn feed(&mut self, token: Rc<TT>) -> Result<(), ParserError> {
        loop {
            match self.resolve(Some(&token))? {
                Step::Shift(next) => {
                    if let Some(out) = &mut self.debug {
                        let _ = writeln!(out, "shift {:?} -> state {}", token.symbol(), next);
                    }
                    self.state_stack.push(next);
                    self.value_stack.push(StackEntry {
                        sym: token.symbol(),
                        value: ParseValue::Token(token),
                    });
                    return Ok(());
                }
                Step::Reduce(variant) => self.apply_reduction(variant)?,
                Step::Stuck => {
                    return Err(ParserError::Rejected {
                        state: *self.state_stack.last().expect("state stack is never empty"),
                        symbol: format!("{:?}", token.symbol()),
                    })
                }
            }
        }
    }

    /// Signal end of input: run the remaining reductions and accept when
    /// exactly one completed start symbol sits on the stack.
    pub fn end(&mut self) -> Result<TN, ParserError> {
        loop {
            match self.resolve(None)? {
                Step::Reduce(variant) => self.apply_reduction(variant)?,
                Step::Shift(_) | Step::Stuck => break,
            }
        }

        if self.value_stack.len() == 1
            && self.start_symbols.contains(&self.value_stack[0].sym)
        {
            let entry = self.value_stack.pop().expect("checked above");
            self.state_stack.truncate(1);
            match entry.value {
                ParseValue::Node(node) => Ok(node),
                _ => Err(ParserError::UnexpectedEnd {
                    message: "the start symbol was never reduced".to_string(),
                }),
            }
        } else if self.value_stack.is_empty() {
            Err(ParserError::UnexpectedEnd {
                message: "no input was consumed".to_string(),
            })
        } else {
            Err(ParserError::UnexpectedEnd {
                message: format!(
                    "{} unreduced symbols remain on the stack",
                    self.value_stack.len()
                ),
            })
        }
    }

    /// Convenience wrapper: reset, feed every token, end.
    pub fn parse(
        &mut self,
        tokens: impl IntoIterator<Item = Rc<TT>>,
    ) -> Result<TN, ParserError>
    where
        TCtx: Default,
    {
        self.reset();
        for token in tokens {
            self.feed(token)?;
        }
        self.end()
    }

    fn resolve(&self, lookahead: Option<&Rc<TT>>) -> Result<Step, ParserError> {
        let table = self.table.as_ref().ok_or(ParserError::NotReady)?;
        let state = *self.state_stack.last().expect("state stack is never empty");

        if let Some(token) = lookahead {
            if !self.terminals.contains(&token.symbol()) {
                return Err(ParserError::UnknownToken {
                    symbol: format!("{:?}", token.symbol()),
                });
            }
        }

        let key = lookahead.map(|token| token.symbol());
        let cell = match table.actions[state].get(&key) {
            Some(cell) => cell,
            None => return Ok(Step::Stuck),
        };

        for &variant in &cell.guarded {
            let slots = self.synthesize(variant);
            let decision = self.rules[self.variants[variant].rule]
                .decision
                .as_ref()
                .expect("guarded variants carry a decision")
                .clone();
            if decision(&self.context, &slots, lookahead) {
                return Ok(Step::Reduce(variant));
            }
        }

        Ok(match cell.fallback {
            Some(Action::Shift(next)) => Step::Shift(next),
            Some(Action::Reduce(variant)) => Step::Reduce(variant),
            None => Step::Stuck,
        })
    }

    /// The uncommitted right-hand-side slice of a pending reduction, padded
    /// with [ParseSlot::Absent] at the optional slots this variant drops.
    fn synthesize(&self, variant: usize) -> Vec<ParseSlot<'_, TT, TN>> {
        let variant = &self.variants[variant];
        let arity = variant.symbols.len();
        debug_assert!(self.value_stack.len() >= arity);
        let mut entries = self.value_stack[self.value_stack.len() - arity..].iter();

        variant
            .present
            .iter()
            .map(|&present| {
                if !present {
                    return ParseSlot::Absent;
                }
                match &entries.next().expect("arity matches present count").value {
                    ParseValue::Token(token) => ParseSlot::Token(token),
                    ParseValue::Node(node) => ParseSlot::Node(node),
                    ParseValue::Absent => ParseSlot::Absent,
                }
            })
            .collect()
    }

    fn apply_reduction(&mut self, variant_id: usize) -> Result<(), ParserError> {
        let arity = self.variants[variant_id].symbols.len();
        let lhs = self.variants[variant_id].lhs;
        debug_assert!(self.value_stack.len() >= arity);

        let popped = self.value_stack.split_off(self.value_stack.len() - arity);
        self.state_stack.truncate(self.state_stack.len() - arity);

        let mut values = popped.into_iter();
        let children: Vec<ParseValue<TT, TN>> = self.variants[variant_id]
            .present
            .iter()
            .map(|&present| {
                if present {
                    values.next().expect("arity matches present count").value
                } else {
                    ParseValue::Absent
                }
            })
            .collect();

        if let Some(out) = &mut self.debug {
            let _ = writeln!(
                out,
                "reduce rule {} -> {:?} ({} symbols)",
                self.variants[variant_id].rule, lhs, arity
            );
        }

        let callback = self.rules[self.variants[variant_id].rule].callback.clone();
        let node = callback(&mut self.context, children);

        let state = *self.state_stack.last().expect("state stack is never empty");
        let table = self.table.as_ref().expect("resolve checked the table");
        let next = match table.gotos[state].get(&lhs) {
            Some(&next) => next,
            None => {
                return Err(ParserError::Rejected {
                    state,
                    symbol: format!("{:?}", lhs),
                })
            }
        };
        self.state_stack.push(next);
        self.value_stack.push(StackEntry {
            sym: lhs,
            value: ParseValue::Node(node),
        });
        Ok(())
    }
}
