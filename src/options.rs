//! The core-facing subset of the invocation surface: the keys the core
//! itself consults, as opposed to paths and output routing which stay with
//! the external front-end.
use std::fmt;
use std::str::FromStr;

/// Table-construction strategy. `Lalr1BySlr1` is what most callers want: it
/// is cheaper to build than `Lalr1ByClr1` and differs only in pathological
/// grammars (§8 invariant 4 of the design notes this crate follows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Lr0,
    Slr1,
    Clr1,
    Lalr1BySlr1,
    Lalr1ByClr1,
    Ll1,
}

impl Mode {
    pub fn is_lr(self) -> bool {
        !matches!(self, Mode::Ll1)
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Lalr1BySlr1
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Mode::Lr0 => "LR0",
            Mode::Slr1 => "SLR1",
            Mode::Clr1 => "CLR1",
            Mode::Lalr1BySlr1 => "LALR1_BY_SLR1",
            Mode::Lalr1ByClr1 => "LALR1_BY_CLR1",
            Mode::Ll1 => "LL1",
        };
        write!(f, "{s}")
    }
}

/// Error returned by [`Mode::from_str`] for an unrecognized mode name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("\"{0}\" is not a recognized parser mode")]
pub struct UnknownMode(String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LR0" => Ok(Mode::Lr0),
            "SLR1" => Ok(Mode::Slr1),
            "CLR1" => Ok(Mode::Clr1),
            // LALR1 aliases LALR1_BY_SLR1.
            "LALR1" | "LALR1_BY_SLR1" => Ok(Mode::Lalr1BySlr1),
            "LALR1_BY_CLR1" => Ok(Mode::Lalr1ByClr1),
            "LL1" => Ok(Mode::Ll1),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Construction options the core consults directly.
///
/// Path-valued and output-routing keys of the full invocation surface
/// (`grammar`, `lex`, `parse`, `file`, `output`, the diagnostic-printout
/// selectors) are owned by the external front-end and have no
/// representation here.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub mode: Mode,
    /// Apply the default shift / lowest-production-number resolution to any
    /// conflict that precedence/associativity couldn't settle.
    pub resolve_conflicts: bool,
    /// Lex-wide case-insensitive matching.
    pub case_insensitive: bool,
    /// Track byte offset / line / column through construction and parsing.
    pub capture_locations: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::Lalr1BySlr1,
            resolve_conflicts: false,
            case_insensitive: false,
            capture_locations: true,
        }
    }
}
