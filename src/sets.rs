//! FIRST / FOLLOW / PREDICT set computation to fixed point (C4).
use std::collections::{BTreeSet, HashMap};

use crate::grammar::Grammar;
use crate::symbol::Symbol;

/// A terminal set plus an explicit epsilon flag, rather than folding ε into
/// the terminal alphabet — keeps `contains_epsilon` a single bit check
/// instead of a string comparison against every terminal name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalSet {
    terminals: BTreeSet<String>,
    epsilon: bool,
}

impl TerminalSet {
    pub fn terminals(&self) -> &BTreeSet<String> {
        &self.terminals
    }

    pub fn contains_epsilon(&self) -> bool {
        self.epsilon
    }

    pub fn contains(&self, terminal: &str) -> bool {
        self.terminals.contains(terminal)
    }

    /// Merge `other` in, returning whether anything new was added (used to
    /// detect a fixed point).
    fn union_in(&mut self, other: &TerminalSet) -> bool {
        let mut changed = false;
        for t in &other.terminals {
            if self.terminals.insert(t.clone()) {
                changed = true;
            }
        }
        if other.epsilon && !self.epsilon {
            self.epsilon = true;
            changed = true;
        }
        changed
    }

    /// Merge in `other` minus epsilon, returning whether anything changed.
    fn union_in_sans_epsilon(&mut self, other: &TerminalSet) -> bool {
        let mut changed = false;
        for t in &other.terminals {
            if self.terminals.insert(t.clone()) {
                changed = true;
            }
        }
        changed
    }

    fn insert(&mut self, terminal: impl Into<String>) -> bool {
        self.terminals.insert(terminal.into())
    }
}

/// FIRST, FOLLOW and PREDICT sets for one grammar, computed once to a fixed
/// point and then treated as read-only (mirrors the immutability the
/// grammar itself has once built).
#[derive(Debug)]
pub struct SetTables {
    first: HashMap<String, TerminalSet>,
    follow: HashMap<String, TerminalSet>,
}

impl SetTables {
    pub fn build(grammar: &Grammar) -> Self {
        let first = Self::compute_first(grammar);
        let follow = Self::compute_follow(grammar, &first);
        log::debug!(
            "sets fixed point reached: {} FIRST set(s), {} FOLLOW set(s)",
            first.len(),
            follow.len()
        );
        Self { first, follow }
    }

    fn compute_first(grammar: &Grammar) -> HashMap<String, TerminalSet> {
        let mut first: HashMap<String, TerminalSet> = HashMap::new();
        for terminal in grammar.terminals() {
            let mut set = TerminalSet::default();
            set.insert(terminal.clone());
            first.insert(terminal.clone(), set);
        }
        for nonterminal in grammar.nonterminals() {
            first.insert(nonterminal.clone(), TerminalSet::default());
        }
        first.insert(Symbol::AUGMENTED_START_NAME.to_string(), TerminalSet::default());

        let mut pass = 0u32;
        loop {
            pass += 1;
            let mut changed = false;
            for production in grammar.productions() {
                let lhs_name = production.lhs().name().to_string();
                let rhs_first = Self::first_of_sequence(production.rhs(), &first);
                let entry = first.entry(lhs_name).or_default();
                if entry.union_in(&rhs_first) {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        log::trace!("FIRST sets converged after {pass} pass(es)");
        first
    }

    /// FIRST(X1 X2 ... Xn) per §4.2: union of FIRST(Xi)\{ε} up to and
    /// including the first Xi whose FIRST set doesn't contain ε; ε is only
    /// in the result if every Xi derives it (or the sequence is empty).
    fn first_of_sequence(rhs: &[Symbol], first: &HashMap<String, TerminalSet>) -> TerminalSet {
        let mut result = TerminalSet::default();
        if rhs.is_empty() {
            result.epsilon = true;
            return result;
        }
        for symbol in rhs {
            let symbol_first = first.get(symbol.name()).cloned().unwrap_or_default();
            result.union_in_sans_epsilon(&symbol_first);
            if !symbol_first.contains_epsilon() {
                return result;
            }
        }
        result.epsilon = true;
        result
    }

    fn compute_follow(
        grammar: &Grammar,
        first: &HashMap<String, TerminalSet>,
    ) -> HashMap<String, TerminalSet> {
        let mut follow: HashMap<String, TerminalSet> = HashMap::new();
        for nonterminal in grammar.nonterminals() {
            follow.insert(nonterminal.clone(), TerminalSet::default());
        }
        follow.insert(
            Symbol::AUGMENTED_START_NAME.to_string(),
            TerminalSet::default(),
        );
        follow
            .get_mut(Symbol::AUGMENTED_START_NAME)
            .unwrap()
            .insert(Symbol::END_NAME);

        let mut pass = 0u32;
        loop {
            pass += 1;
            let mut changed = false;
            for production in grammar.productions() {
                let rhs = production.rhs();
                for (i, symbol) in rhs.iter().enumerate() {
                    if !symbol.is_nonterminal() {
                        continue;
                    }
                    let beta = &rhs[i + 1..];
                    let beta_first = Self::first_of_sequence(beta, first);
                    {
                        let entry = follow.entry(symbol.name().to_string()).or_default();
                        if entry.union_in_sans_epsilon(&beta_first) {
                            changed = true;
                        }
                    }
                    if beta_first.contains_epsilon() {
                        let lhs_follow = follow
                            .get(production.lhs().name())
                            .cloned()
                            .unwrap_or_default();
                        let entry = follow.entry(symbol.name().to_string()).or_default();
                        if entry.union_in_sans_epsilon(&lhs_follow) {
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        log::trace!("FOLLOW sets converged after {pass} pass(es)");
        follow
    }

    pub fn first(&self, symbol_name: &str) -> TerminalSet {
        self.first.get(symbol_name).cloned().unwrap_or_default()
    }

    pub fn first_of(&self, rhs: &[Symbol]) -> TerminalSet {
        Self::first_of_sequence(rhs, &self.first)
    }

    pub fn follow(&self, nonterminal_name: &str) -> TerminalSet {
        self.follow.get(nonterminal_name).cloned().unwrap_or_default()
    }

    /// PREDICT(A -> alpha) = FIRST(alpha)\{ε} ∪ (FOLLOW(A) if ε ∈ FIRST(alpha) else ∅).
    pub fn predict(&self, production: &crate::symbol::Production) -> TerminalSet {
        let mut result = self.first_of(production.rhs());
        let has_epsilon = result.contains_epsilon();
        result.epsilon = false;
        if has_epsilon {
            let follow = self.follow(production.lhs().name());
            result.union_in_sans_epsilon(&follow);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarSpec, RhsAlt};
    use crate::options::Mode;

    fn ll1_arithmetic() -> Grammar {
        // E -> T E'; E' -> + T E' | ε; T -> ( E ) | id
        let spec = GrammarSpec::new(Mode::Ll1)
            .with_start("E")
            .with_production("E", vec![RhsAlt::new("T E'")])
            .with_production(
                "E'",
                vec![RhsAlt::new("+ T E'"), RhsAlt::new("")],
            )
            .with_production("T", vec![RhsAlt::new("( E )"), RhsAlt::new("id")]);
        Grammar::build(&spec).unwrap()
    }

    #[test]
    fn first_of_e_is_paren_and_id() {
        let grammar = ll1_arithmetic();
        let sets = SetTables::build(&grammar);
        let first_e = sets.first("E");
        assert!(first_e.contains("("));
        assert!(first_e.contains("id"));
        assert!(!first_e.contains_epsilon());
    }

    #[test]
    fn follow_of_e_prime_is_close_paren_and_end() {
        let grammar = ll1_arithmetic();
        let sets = SetTables::build(&grammar);
        let follow_e_prime = sets.follow("E'");
        assert!(follow_e_prime.contains(")"));
        assert!(follow_e_prime.contains("$"));
    }

    #[test]
    fn predict_respects_invariant_when_epsilon_derivable() {
        let grammar = ll1_arithmetic();
        let sets = SetTables::build(&grammar);
        let e_prime_epsilon = grammar.get_production(3).unwrap();
        assert!(e_prime_epsilon.is_empty());
        let predict = sets.predict(e_prime_epsilon);
        let follow = sets.follow("E'");
        for t in follow.terminals() {
            assert!(predict.contains(t));
        }
    }
}
