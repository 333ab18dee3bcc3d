//! Table-driven LR and LL interpreters (C8): stack machines that consume
//! lexan's token stream together with an [`LrTable`] or [`LlTable`].
use std::fmt::Debug;

use crate::error::InterpError;
use crate::grammar::Grammar;
use crate::ll_table::LlTable;
use crate::lr_table::{Action, LrTable};
use crate::symbol::Symbol;

/// A dynamically-typed value threaded through the parse stacks. The
/// interpreter itself never inspects a `Value` beyond moving it between
/// stacks and handing it to the evaluator.
#[derive(Debug, Clone)]
pub enum Value {
    Unit,
    Token(String),
    Int(i64),
    Str(String),
    List(Vec<Value>),
}

/// Production-evaluation capability a host supplies so the interpreter
/// itself never embeds a scripting runtime (§9 Design Notes / §4.6).
pub trait SemanticActionEvaluator {
    fn evaluate(&self, production_number: u32, args: &[Value]) -> Result<Value, InterpError>;
}

/// Default evaluator: accepts productions with no semantic action (passes
/// the lone child through, or yields `Unit` for an empty production) and
/// rejects any production whose action text is non-empty.
pub struct RejectingEvaluator<'g> {
    grammar: &'g Grammar,
}

impl<'g> RejectingEvaluator<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }
}

impl<'g> SemanticActionEvaluator for RejectingEvaluator<'g> {
    fn evaluate(&self, production_number: u32, args: &[Value]) -> Result<Value, InterpError> {
        let production = self
            .grammar
            .get_production(production_number)
            .expect("interpreter only reduces by known production numbers");
        if production.action().is_some() {
            return Err(InterpError::NoEvaluator(production_number));
        }
        Ok(args.first().cloned().unwrap_or(Value::Unit))
    }
}

/// Outcome of a successful parse.
#[derive(Debug, Clone)]
pub struct Accepted {
    pub value: Value,
}

/// LR interpreter: state stack seeded with 0, value stack aligned with it
/// (§4.6).
pub struct LrInterpreter<'g, 'e, E: SemanticActionEvaluator> {
    grammar: &'g Grammar,
    table: &'e LrTable,
    evaluator: &'e E,
}

impl<'g, 'e, E: SemanticActionEvaluator> LrInterpreter<'g, 'e, E> {
    pub fn new(grammar: &'g Grammar, table: &'e LrTable, evaluator: &'e E) -> Self {
        Self {
            grammar,
            table,
            evaluator,
        }
    }

    /// Drive `stream` to acceptance or a parse error. `T` is the tokenizer's
    /// own terminal-tag type; `tag_name` maps a tag to the terminal name
    /// the table indexes on.
    pub fn parse<T>(
        &self,
        stream: &mut lexan::TokenStream<T>,
        tag_name: impl Fn(&T) -> String,
    ) -> Result<Accepted, InterpError>
    where
        T: Copy + Ord + Debug + std::fmt::Display + std::hash::Hash,
    {
        let mut state_stack: Vec<u32> = vec![0];
        let mut value_stack: Vec<Value> = Vec::new();

        loop {
            let token = stream
                .front()
                .map_err(|e| self.lex_error_to_interp_error(&e))?;
            let tag = tag_name(&token.tag());
            let top = *state_stack.last().expect("state stack is never empty");

            match self.table.action(top, &tag) {
                Some(Action::Shift(next)) => {
                    value_stack.push(Value::Token(token.lexeme().to_string()));
                    state_stack.push(*next);
                    stream.advance();
                }
                Some(Action::Reduce(production_number)) => {
                    let production = self
                        .grammar
                        .get_production(*production_number)
                        .expect("reduce action names a known production");
                    let arity = production.rhs().len();
                    let new_len = state_stack.len() - arity;
                    state_stack.truncate(new_len);
                    let args: Vec<Value> = value_stack.split_off(value_stack.len() - arity);
                    let result = self.evaluator.evaluate(*production_number, &args)?;
                    value_stack.push(result);

                    let new_top = *state_stack.last().expect("state stack is never empty");
                    let goto = self
                        .table
                        .goto(new_top, production.lhs().name())
                        .ok_or_else(|| InterpError::ErrorCell {
                            state: new_top,
                            lexeme: production.lhs().name().to_string(),
                            location: token.location().to_string(),
                        })?;
                    state_stack.push(goto);
                }
                Some(Action::Accept) => {
                    return Ok(Accepted {
                        value: value_stack.pop().unwrap_or(Value::Unit),
                    });
                }
                Some(Action::Conflict(_)) | None => {
                    return Err(InterpError::ErrorCell {
                        state: top,
                        lexeme: token.lexeme().to_string(),
                        location: token.location().to_string(),
                    });
                }
            }
        }
    }

    fn lex_error_to_interp_error<T: Debug + std::fmt::Display>(
        &self,
        error: &lexan::Error<T>,
    ) -> InterpError {
        match error {
            lexan::Error::UnexpectedText { text, location } => InterpError::UnexpectedToken {
                tag: String::new(),
                lexeme: text.clone(),
                location: location.to_string(),
                expected: String::new(),
            },
            lexan::Error::AmbiguousMatches {
                tags,
                text,
                location,
            } => InterpError::UnexpectedToken {
                tag: format!("{tags:?}"),
                lexeme: text.clone(),
                location: location.to_string(),
                expected: String::new(),
            },
        }
    }
}

/// LL interpreter: symbol stack seeded with `[S, $]` (§4.6), plus a value
/// stack aligned with it the same way the LR interpreter aligns its state
/// and value stacks.
pub struct LlInterpreter<'g, 'e, E: SemanticActionEvaluator> {
    grammar: &'g Grammar,
    table: &'e LlTable,
    evaluator: &'e E,
}

#[derive(Debug, Clone)]
enum StackSymbol {
    Terminal(String),
    NonTerminal(String),
    /// Marker pushed under a production's expanded rhs: once every child has
    /// been matched (and has pushed its own value), pop `arity` values, run
    /// the evaluator, and push the synthesized result.
    Reduce(u32, usize),
    End,
}

impl<'g, 'e, E: SemanticActionEvaluator> LlInterpreter<'g, 'e, E> {
    pub fn new(grammar: &'g Grammar, table: &'e LlTable, evaluator: &'e E) -> Self {
        Self {
            grammar,
            table,
            evaluator,
        }
    }

    pub fn parse<T>(
        &self,
        stream: &mut lexan::TokenStream<T>,
        tag_name: impl Fn(&T) -> String,
    ) -> Result<Accepted, InterpError>
    where
        T: Copy + Ord + Debug + std::fmt::Display + std::hash::Hash,
    {
        let mut stack: Vec<StackSymbol> = vec![
            StackSymbol::End,
            StackSymbol::NonTerminal(self.grammar.user_start_symbol().name().to_string()),
        ];
        let mut value_stack: Vec<Value> = Vec::new();

        loop {
            let token = stream.front().map_err(|e| self.lex_error(&e))?;
            let tag = tag_name(&token.tag());
            let top = stack.pop().expect("symbol stack never empties before $");

            match top {
                StackSymbol::End => {
                    if tag == Symbol::END_NAME {
                        return Ok(Accepted {
                            value: value_stack.pop().unwrap_or(Value::Unit),
                        });
                    }
                    return Err(InterpError::UnexpectedToken {
                        tag,
                        lexeme: token.lexeme().to_string(),
                        location: token.location().to_string(),
                        expected: Symbol::END_NAME.to_string(),
                    });
                }
                StackSymbol::Terminal(name) => {
                    if name == tag {
                        value_stack.push(Value::Token(token.lexeme().to_string()));
                        stream.advance();
                    } else {
                        return Err(InterpError::UnexpectedToken {
                            tag,
                            lexeme: token.lexeme().to_string(),
                            location: token.location().to_string(),
                            expected: name,
                        });
                    }
                }
                StackSymbol::NonTerminal(name) => {
                    let production_number = self.table.get(&name, &tag).ok_or_else(|| {
                        InterpError::UnexpectedToken {
                            tag: tag.clone(),
                            lexeme: token.lexeme().to_string(),
                            location: token.location().to_string(),
                            expected: format!("a production of {name}"),
                        }
                    })?;
                    let production = self
                        .grammar
                        .get_production(production_number)
                        .expect("table only names known productions");
                    let arity = production.rhs().len();
                    stack.push(StackSymbol::Reduce(production_number, arity));
                    for symbol in production.rhs().iter().rev() {
                        if symbol.is_nonterminal() {
                            stack.push(StackSymbol::NonTerminal(symbol.name().to_string()));
                        } else {
                            stack.push(StackSymbol::Terminal(symbol.name().to_string()));
                        }
                    }
                }
                StackSymbol::Reduce(production_number, arity) => {
                    let args: Vec<Value> = value_stack.split_off(value_stack.len() - arity);
                    let result = self.evaluator.evaluate(production_number, &args)?;
                    value_stack.push(result);
                }
            }
        }
    }

    fn lex_error<T: Debug + std::fmt::Display>(&self, error: &lexan::Error<T>) -> InterpError {
        match error {
            lexan::Error::UnexpectedText { text, location } => InterpError::UnexpectedToken {
                tag: String::new(),
                lexeme: text.clone(),
                location: location.to_string(),
                expected: String::new(),
            },
            lexan::Error::AmbiguousMatches {
                tags,
                text,
                location,
            } => InterpError::UnexpectedToken {
                tag: format!("{tags:?}"),
                lexeme: text.clone(),
                location: location.to_string(),
                expected: String::new(),
            },
        }
    }
}
