//! Immutable grammar atoms with stable numeric identity (C1).
use std::fmt;

/// A terminal or nonterminal, identified by name and a stable numeric id.
///
/// Symbols are interned by [`crate::Grammar`] during construction and never
/// mutated afterwards; the id is what every other component (sets, items,
/// tables) actually indexes on, the name is kept for display only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    id: u32,
    name: String,
    kind: SymbolKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
}

impl Symbol {
    pub(crate) fn new(id: u32, name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal)
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self.kind, SymbolKind::NonTerminal)
    }

    /// Name reserved for the empty-string symbol ε.
    pub const EPSILON_NAME: &'static str = "ε";
    /// Name reserved for the end-of-input marker.
    pub const END_NAME: &'static str = "$";
    /// Name of the synthesized augmented start symbol `S'`.
    pub const AUGMENTED_START_NAME: &'static str = "S'";

    pub fn is_epsilon(&self) -> bool {
        self.name == Self::EPSILON_NAME
    }

    pub fn is_end(&self) -> bool {
        self.name == Self::END_NAME
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    NonAssoc,
}

impl fmt::Display for Associativity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Associativity::Left => write!(f, "left"),
            Associativity::Right => write!(f, "right"),
            Associativity::NonAssoc => write!(f, "nonassoc"),
        }
    }
}

/// Precedence level (ascending, 1-based) and associativity attached to an
/// operator terminal, per the `operators` declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSpec {
    pub level: u32,
    pub associativity: Associativity,
}

/// A single production `lhs -> rhs`, numbered contiguously from 0.
///
/// Production 0 is always the synthesized augmented start production
/// `S' -> start`. Immutable once built by [`crate::Grammar`].
#[derive(Debug, Clone)]
pub struct Production {
    number: u32,
    lhs: Symbol,
    rhs: Vec<Symbol>,
    action: Option<String>,
    precedence: Option<OperatorSpec>,
    precedence_symbol: Option<String>,
}

impl Production {
    pub(crate) fn new(
        number: u32,
        lhs: Symbol,
        rhs: Vec<Symbol>,
        action: Option<String>,
        precedence: Option<OperatorSpec>,
        precedence_symbol: Option<String>,
    ) -> Self {
        Self {
            number,
            lhs,
            rhs,
            action,
            precedence,
            precedence_symbol,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn lhs(&self) -> &Symbol {
        &self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn precedence(&self) -> Option<OperatorSpec> {
        self.precedence
    }

    /// The symbol whose precedence this production inherited (explicit
    /// `%prec` override or the rightmost terminal), if any.
    pub fn precedence_symbol(&self) -> Option<&str> {
        self.precedence_symbol.as_deref()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        if self.rhs.is_empty() {
            write!(f, " {}", Symbol::EPSILON_NAME)?;
        } else {
            for symbol in &self.rhs {
                write!(f, " {symbol}")?;
            }
        }
        Ok(())
    }
}

impl PartialEq for Production {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}
impl Eq for Production {}
impl PartialOrd for Production {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Production {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.number.cmp(&other.number)
    }
}
