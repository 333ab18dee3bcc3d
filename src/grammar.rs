//! Grammar builder (C2): turns already-normalized grammar data into an
//! immutable [`Grammar`].
use std::collections::HashMap;

use crate::error::BuildError;
use crate::options::Mode;
use crate::symbol::{Associativity, OperatorSpec, Production, Symbol, SymbolKind};

/// One `lhs : rhs { action }` alternative, already stripped of its own
/// `%prec` marker syntax by the (external) grammar-file normalizer.
#[derive(Debug, Clone, Default)]
pub struct RhsAlt {
    /// Right-hand side, symbols separated by whitespace. Literal terminals
    /// keep their quoted spelling, e.g. `"+"`.
    pub rhs: String,
    pub action: Option<String>,
    /// Explicit `%prec SYMBOL` override, if the normalizer recorded one.
    pub prec_override: Option<String>,
}

impl RhsAlt {
    pub fn new(rhs: impl Into<String>) -> Self {
        Self {
            rhs: rhs.into(),
            action: None,
            prec_override: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_prec(mut self, symbol: impl Into<String>) -> Self {
        self.prec_override = Some(symbol.into());
        self
    }
}

/// An `%left` / `%right` / `%nonassoc` declaration; iteration order of the
/// owning `operators` list fixes ascending precedence starting at 1.
#[derive(Debug, Clone)]
pub struct OperatorDecl {
    pub associativity: Associativity,
    pub terminals: Vec<String>,
}

/// Raw, already-loaded grammar data: the input to [`Grammar::build`].
///
/// `bnf` preserves declaration order because production numbering and
/// start-symbol inference (§4.1) are both order-sensitive.
#[derive(Debug, Clone, Default)]
pub struct GrammarSpec {
    pub bnf: Vec<(String, Vec<RhsAlt>)>,
    pub start: Option<String>,
    pub operators: Vec<OperatorDecl>,
    pub mode: Mode,
}

impl GrammarSpec {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_production(mut self, lhs: impl Into<String>, alts: Vec<RhsAlt>) -> Self {
        self.bnf.push((lhs.into(), alts));
        self
    }

    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_operator(mut self, associativity: Associativity, terminals: &[&str]) -> Self {
        self.operators.push(OperatorDecl {
            associativity,
            terminals: terminals.iter().map(|s| s.to_string()).collect(),
        });
        self
    }
}

/// Immutable, fully-built grammar: the output of C2 and the input every
/// downstream component (C4-C9) reads from.
#[derive(Debug)]
pub struct Grammar {
    productions: Vec<Production>,
    nonterminal_names: Vec<String>,
    terminal_names: Vec<String>,
    start: Symbol,
    user_start: Symbol,
    mode: Mode,
    operators: HashMap<String, OperatorSpec>,
    productions_by_lhs: HashMap<String, Vec<u32>>,
}

impl Grammar {
    pub fn build(spec: &GrammarSpec) -> Result<Self, BuildError> {
        log::debug!(
            "building grammar: {} nonterminal group(s), mode {}",
            spec.bnf.len(),
            spec.mode
        );

        let nonterminal_names: Vec<String> = spec.bnf.iter().map(|(lhs, _)| lhs.clone()).collect();
        let is_nonterminal = |name: &str| nonterminal_names.iter().any(|n| n == name);

        let user_start_name = match &spec.start {
            Some(s) => s.clone(),
            None => spec
                .bnf
                .first()
                .map(|(lhs, _)| lhs.clone())
                .ok_or_else(|| BuildError::UnknownStartSymbol(String::new()))?,
        };
        if !is_nonterminal(&user_start_name) {
            return Err(BuildError::UnknownStartSymbol(user_start_name));
        }

        let operators = Self::build_operator_table(&spec.operators)?;

        let mut next_symbol_id = 0u32;
        let mut intern = |name: &str, kind: SymbolKind, ids: &mut HashMap<String, u32>| -> Symbol {
            let id = *ids.entry(name.to_string()).or_insert_with(|| {
                let id = next_symbol_id;
                next_symbol_id += 1;
                id
            });
            Symbol::new(id, name, kind)
        };
        let mut ids: HashMap<String, u32> = HashMap::new();

        let augmented_start = intern(
            Symbol::AUGMENTED_START_NAME,
            SymbolKind::NonTerminal,
            &mut ids,
        );
        let user_start = intern(&user_start_name, SymbolKind::NonTerminal, &mut ids);

        let mut productions = Vec::new();
        productions.push(Production::new(
            0,
            augmented_start.clone(),
            vec![user_start.clone()],
            None,
            None,
            None,
        ));

        let mut terminal_names: Vec<String> = Vec::new();
        let mut number = 1u32;
        let mut productions_by_lhs: HashMap<String, Vec<u32>> = HashMap::new();
        productions_by_lhs.insert(Symbol::AUGMENTED_START_NAME.to_string(), vec![0]);

        for (lhs_name, alts) in &spec.bnf {
            let lhs = intern(lhs_name, SymbolKind::NonTerminal, &mut ids);
            for alt in alts {
                let rhs_names: Vec<&str> = alt.rhs.split_whitespace().collect();
                let mut rhs = Vec::with_capacity(rhs_names.len());
                for name in rhs_names.iter().copied() {
                    let kind = if is_nonterminal(name) {
                        SymbolKind::NonTerminal
                    } else {
                        SymbolKind::Terminal
                    };
                    if kind == SymbolKind::Terminal && !terminal_names.contains(&name.to_string())
                    {
                        terminal_names.push(name.to_string());
                    }
                    rhs.push(intern(name, kind, &mut ids));
                }

                let (precedence, precedence_symbol) =
                    Self::resolve_precedence(&rhs, alt.prec_override.as_deref(), &operators, number)?;

                productions.push(Production::new(
                    number,
                    lhs.clone(),
                    rhs,
                    alt.action.clone(),
                    precedence,
                    precedence_symbol,
                ));
                productions_by_lhs
                    .entry(lhs_name.clone())
                    .or_default()
                    .push(number);
                number += 1;
            }
        }

        log::debug!(
            "grammar built: {} production(s), {} terminal(s), {} nonterminal(s)",
            productions.len(),
            terminal_names.len(),
            nonterminal_names.len()
        );

        Ok(Self {
            productions,
            nonterminal_names,
            terminal_names,
            start: augmented_start,
            user_start,
            mode: spec.mode,
            operators,
            productions_by_lhs,
        })
    }

    fn build_operator_table(
        decls: &[OperatorDecl],
    ) -> Result<HashMap<String, OperatorSpec>, BuildError> {
        let mut table = HashMap::new();
        for (index, decl) in decls.iter().enumerate() {
            let level = index as u32 + 1;
            for terminal in &decl.terminals {
                if table.contains_key(terminal) {
                    return Err(BuildError::DuplicateOperator(terminal.clone()));
                }
                table.insert(
                    terminal.clone(),
                    OperatorSpec {
                        level,
                        associativity: decl.associativity,
                    },
                );
            }
        }
        Ok(table)
    }

    fn resolve_precedence(
        rhs: &[Symbol],
        prec_override: Option<&str>,
        operators: &HashMap<String, OperatorSpec>,
        production_number: u32,
    ) -> Result<(Option<OperatorSpec>, Option<String>), BuildError> {
        if let Some(name) = prec_override {
            let spec = operators
                .get(name)
                .copied()
                .ok_or_else(|| BuildError::UnknownPrecedenceSymbol(name.to_string(), production_number))?;
            return Ok((Some(spec), Some(name.to_string())));
        }
        for symbol in rhs.iter().rev() {
            if symbol.is_terminal() {
                if let Some(spec) = operators.get(symbol.name()) {
                    return Ok((Some(*spec), Some(symbol.name().to_string())));
                }
            }
        }
        Ok((None, None))
    }

    pub fn get_production(&self, n: u32) -> Option<&Production> {
        self.productions.get(n as usize)
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn get_productions_for_symbol(&self, lhs: &str) -> &[u32] {
        self.productions_by_lhs
            .get(lhs)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn terminals(&self) -> &[String] {
        &self.terminal_names
    }

    pub fn nonterminals(&self) -> &[String] {
        &self.nonterminal_names
    }

    pub fn start_symbol(&self) -> &Symbol {
        &self.start
    }

    pub fn user_start_symbol(&self) -> &Symbol {
        &self.user_start
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn get_operator(&self, terminal: &str) -> Option<OperatorSpec> {
        self.operators.get(terminal).copied()
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.nonterminal_names.iter().any(|n| n == name) || name == Symbol::AUGMENTED_START_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator_spec() -> GrammarSpec {
        GrammarSpec::new(Mode::Lalr1BySlr1)
            .with_operator(Associativity::Left, &["+"])
            .with_operator(Associativity::Left, &["*"])
            .with_production(
                "E",
                vec![
                    RhsAlt::new("E + E"),
                    RhsAlt::new("E * E"),
                    RhsAlt::new("NUMBER"),
                ],
            )
    }

    #[test]
    fn augments_start_and_numbers_productions_contiguously() {
        let grammar = Grammar::build(&calculator_spec()).unwrap();
        assert_eq!(grammar.productions().len(), 4);
        assert_eq!(grammar.get_production(0).unwrap().lhs().name(), "S'");
        assert_eq!(grammar.get_production(0).unwrap().rhs()[0].name(), "E");
        for (i, p) in grammar.productions().iter().enumerate() {
            assert_eq!(p.number(), i as u32);
        }
    }

    #[test]
    fn infers_terminal_vs_nonterminal_by_membership() {
        let grammar = Grammar::build(&calculator_spec()).unwrap();
        assert!(grammar.terminals().iter().any(|t| t == "+"));
        assert!(grammar.terminals().iter().any(|t| t == "NUMBER"));
        assert!(grammar.nonterminals().iter().any(|n| n == "E"));
    }

    #[test]
    fn inherits_precedence_from_rightmost_operator_terminal() {
        let grammar = Grammar::build(&calculator_spec()).unwrap();
        let plus_production = grammar.get_production(1).unwrap();
        assert_eq!(plus_production.precedence_symbol(), Some("+"));
        let star_production = grammar.get_production(2).unwrap();
        assert_eq!(star_production.precedence_symbol(), Some("*"));
    }

    #[test]
    fn duplicate_operator_terminal_is_an_error() {
        let spec = GrammarSpec::new(Mode::Slr1)
            .with_operator(Associativity::Left, &["+"])
            .with_operator(Associativity::Right, &["+"])
            .with_production("E", vec![RhsAlt::new("E + E")]);
        assert!(matches!(
            Grammar::build(&spec),
            Err(BuildError::DuplicateOperator(_))
        ));
    }

    #[test]
    fn prec_override_picks_named_operator() {
        let spec = GrammarSpec::new(Mode::Lalr1BySlr1)
            .with_operator(Associativity::Right, &["UMINUS"])
            .with_operator(Associativity::Left, &["+"])
            .with_production(
                "E",
                vec![RhsAlt::new("E + E"), RhsAlt::new("- E").with_prec("UMINUS")],
            );
        let grammar = Grammar::build(&spec).unwrap();
        let neg = grammar.get_production(2).unwrap();
        assert_eq!(neg.precedence_symbol(), Some("UMINUS"));
    }
}
