//! Structured error taxonomy, one enum per fallible boundary.

/// Failures raised while a [`crate::Grammar`] is being built from a
/// [`crate::GrammarSpec`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("production {0} is not the augmented start production")]
    MissingStartProduction(u32),
    #[error("no production has left-hand side \"{0}\" (the start symbol)")]
    UnknownStartSymbol(String),
    #[error("symbol \"{0}\" on the right-hand side of production {1} is neither a declared nonterminal nor a lex terminal")]
    UndefinedSymbol(String, u32),
    #[error("operator \"{0}\" is declared more than once")]
    DuplicateOperator(String),
    #[error("\"%prec {0}\" in production {1} names a symbol with no declared precedence")]
    UnknownPrecedenceSymbol(String, u32),
    #[error(transparent)]
    Lex(#[from] lexan::BuildError),
}

/// Failures raised while projecting a canonical collection (or PREDICT sets)
/// into a parsing table.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TableError {
    #[error("state {state}: unresolved shift/reduce conflict on \"{symbol}\" ({entries})")]
    ShiftReduce {
        state: u32,
        symbol: String,
        entries: String,
    },
    #[error("state {state}: unresolved reduce/reduce conflict on \"{symbol}\" ({entries})")]
    ReduceReduce {
        state: u32,
        symbol: String,
        entries: String,
    },
    #[error("grammar is not LL(1): nonterminal \"{lhs}\" has more than one production predicting \"{terminal}\" ({entries})")]
    LL1Collision {
        lhs: String,
        terminal: String,
        entries: String,
    },
}

/// Failures raised while an interpreter (C8) drives a parse to completion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InterpError {
    #[error("{location}: unexpected token \"{lexeme}\" (tag {tag}); expected one of: {expected}")]
    UnexpectedToken {
        tag: String,
        lexeme: String,
        location: String,
        expected: String,
    },
    #[error("{location}: parse error in state {state} on \"{lexeme}\"")]
    ErrorCell {
        state: u32,
        lexeme: String,
        location: String,
    },
    #[error("no semantic-action evaluator installed, but production {0} has a non-empty action")]
    NoEvaluator(u32),
    #[error("semantic action for production {0} failed: {1}")]
    ActionFailed(u32, String),
}
