//! LR parsing table (C6): projects the canonical collection into ACTION /
//! GOTO rows, then detects and resolves shift/reduce and reduce/reduce
//! conflicts per the precedence policy in the design this follows.
use std::collections::HashMap;
use std::fmt;

use crate::collection::CanonicalCollection;
use crate::grammar::Grammar;
use crate::options::Mode;
use crate::sets::SetTables;
use crate::symbol::Associativity;

/// A single ACTION cell, or `Conflict` if more than one entry survived
/// resolution (the composite `s5/r3`-style encoding of §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(u32),
    Reduce(u32),
    Accept,
    Conflict(Vec<Action>),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Action::Shift(s) => write!(f, "s{s}"),
            Action::Reduce(r) => write!(f, "r{r}"),
            Action::Accept => write!(f, "acc"),
            Action::Conflict(entries) => {
                for (i, a) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, "/")?;
                    }
                    write!(f, "{a}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    Precedence,
    Associativity,
    Default,
    Unresolved,
}

#[derive(Debug, Clone)]
pub struct ConflictRecord {
    pub state: u32,
    pub symbol: String,
    pub kind: ConflictKind,
    pub resolved_by: ResolvedBy,
}

#[derive(Debug, Default)]
pub struct LrTable {
    action: HashMap<(u32, String), Action>,
    goto: HashMap<(u32, String), u32>,
    conflicts: Vec<ConflictRecord>,
}

impl LrTable {
    pub fn action(&self, state: u32, terminal: &str) -> Option<&Action> {
        self.action.get(&(state, terminal.to_string()))
    }

    pub fn goto(&self, state: u32, nonterminal: &str) -> Option<u32> {
        self.goto.get(&(state, nonterminal.to_string())).copied()
    }

    pub fn conflicts(&self) -> &[ConflictRecord] {
        &self.conflicts
    }

    pub fn has_unresolved_conflicts(&self) -> bool {
        self.conflicts
            .iter()
            .any(|c| c.resolved_by == ResolvedBy::Unresolved)
    }

    /// Build the table for `grammar`'s canonical `collection` under `mode`.
    /// When `resolve_conflicts` is set, conflicts precedence/associativity
    /// can't settle default to shift (shift/reduce) or the lowest-numbered
    /// production (reduce/reduce); otherwise they are left unresolved and
    /// recorded regardless.
    pub fn build(
        grammar: &Grammar,
        sets: &SetTables,
        collection: &CanonicalCollection,
        mode: Mode,
        resolve_conflicts: bool,
    ) -> Self {
        let mut table = LrTable::default();

        for state in collection.states() {
            for (symbol, target) in collection.transitions_from(state.id) {
                if grammar.is_nonterminal(symbol) {
                    table.goto.insert((state.id, symbol.to_string()), target);
                } else {
                    table
                        .action
                        .insert((state.id, symbol.to_string()), Action::Shift(target));
                }
            }

            for key in state.items.reducible_keys(grammar) {
                let production = key.production(grammar);
                let is_accept =
                    production.number() == 0 && key.dot == production.rhs().len();
                let lookaheads: Vec<String> = match mode {
                    Mode::Clr1 | Mode::Lalr1ByClr1 | Mode::Lalr1BySlr1 => {
                        state.items.lookahead(key).into_iter().collect()
                    }
                    Mode::Slr1 => sets
                        .follow(production.lhs().name())
                        .terminals()
                        .iter()
                        .cloned()
                        .collect(),
                    Mode::Lr0 => grammar.terminals().iter().cloned().chain(std::iter::once(
                        crate::symbol::Symbol::END_NAME.to_string(),
                    )).collect(),
                    Mode::Ll1 => Vec::new(),
                };

                for terminal in lookaheads {
                    let new_action = if is_accept && terminal == crate::symbol::Symbol::END_NAME {
                        Action::Accept
                    } else {
                        Action::Reduce(production.number())
                    };
                    table.merge_action(state.id, terminal, new_action);
                }
            }
        }

        table.resolve_conflicts(grammar, resolve_conflicts);
        log::debug!(
            "LR table built: {} ACTION cell(s), {} GOTO cell(s), {} conflict(s)",
            table.action.len(),
            table.goto.len(),
            table.conflicts.len()
        );
        table
    }

    fn merge_action(&mut self, state: u32, terminal: String, new_action: Action) {
        let key = (state, terminal);
        match self.action.remove(&key) {
            None => {
                self.action.insert(key, new_action);
            }
            Some(Action::Conflict(mut entries)) => {
                if !entries.contains(&new_action) {
                    entries.push(new_action);
                }
                self.action.insert(key, Action::Conflict(entries));
            }
            Some(existing) if existing == new_action => {
                self.action.insert(key, existing);
            }
            Some(existing) => {
                self.action
                    .insert(key, Action::Conflict(vec![existing, new_action]));
            }
        }
    }

    fn resolve_conflicts(&mut self, grammar: &Grammar, resolve_conflicts: bool) {
        let conflicted_cells: Vec<(u32, String, Vec<Action>)> = self
            .action
            .iter()
            .filter_map(|((state, symbol), action)| match action {
                Action::Conflict(entries) => Some((*state, symbol.clone(), entries.clone())),
                _ => None,
            })
            .collect();

        for (state, symbol, entries) in conflicted_cells {
            let shifts: Vec<&Action> = entries
                .iter()
                .filter(|a| matches!(a, Action::Shift(_)))
                .collect();
            let reduces: Vec<&Action> = entries
                .iter()
                .filter(|a| matches!(a, Action::Reduce(_) | Action::Accept))
                .collect();

            let resolved = if !shifts.is_empty() && !reduces.is_empty() {
                // A 3-way shift/reduce/reduce conflict: settle the
                // reduce/reduce sub-group first (recording its own conflict
                // record), then resolve the shift against whichever reduce
                // that leaves as the representative.
                if reduces.len() > 1 {
                    self.record_reduce_reduce_conflict(state, &symbol, resolve_conflicts);
                }
                let reduce_winner = Self::lowest_reduce(&reduces).clone();
                self.resolve_shift_reduce(
                    grammar,
                    state,
                    &symbol,
                    shifts[0],
                    &reduce_winner,
                    resolve_conflicts,
                )
            } else if reduces.len() > 1 {
                self.resolve_reduce_reduce(state, &symbol, &reduces, resolve_conflicts)
            } else {
                None
            };

            if let Some(action) = resolved {
                self.action.insert((state, symbol), action);
            }
        }
    }

    fn resolve_shift_reduce(
        &mut self,
        grammar: &Grammar,
        state: u32,
        symbol: &str,
        shift: &Action,
        reduce: &Action,
        resolve_conflicts: bool,
    ) -> Option<Action> {
        let reduce_production_number = match reduce {
            Action::Reduce(n) => Some(*n),
            Action::Accept => None,
            _ => unreachable!(),
        };

        let shift_prec = grammar.get_operator(symbol);
        let reduce_prec = reduce_production_number
            .and_then(|n| grammar.get_production(n))
            .and_then(|p| p.precedence());

        if let (Some(shift_spec), Some(reduce_spec)) = (shift_prec, reduce_prec) {
            let (resolved_action, resolved_by) = if reduce_spec.level > shift_spec.level {
                (reduce.clone(), ResolvedBy::Precedence)
            } else if reduce_spec.level < shift_spec.level {
                (shift.clone(), ResolvedBy::Precedence)
            } else {
                match reduce_spec.associativity {
                    Associativity::Left => (reduce.clone(), ResolvedBy::Associativity),
                    Associativity::Right => (shift.clone(), ResolvedBy::Associativity),
                    Associativity::NonAssoc => {
                        self.conflicts.push(ConflictRecord {
                            state,
                            symbol: symbol.to_string(),
                            kind: ConflictKind::ShiftReduce,
                            resolved_by: ResolvedBy::Associativity,
                        });
                        // Any input hitting this cell is a parse error.
                        return Some(Action::Conflict(vec![]));
                    }
                }
            };
            self.conflicts.push(ConflictRecord {
                state,
                symbol: symbol.to_string(),
                kind: ConflictKind::ShiftReduce,
                resolved_by,
            });
            Some(resolved_action)
        } else if resolve_conflicts {
            self.conflicts.push(ConflictRecord {
                state,
                symbol: symbol.to_string(),
                kind: ConflictKind::ShiftReduce,
                resolved_by: ResolvedBy::Default,
            });
            Some(shift.clone())
        } else {
            self.conflicts.push(ConflictRecord {
                state,
                symbol: symbol.to_string(),
                kind: ConflictKind::ShiftReduce,
                resolved_by: ResolvedBy::Unresolved,
            });
            None
        }
    }

    fn resolve_reduce_reduce(
        &mut self,
        state: u32,
        symbol: &str,
        reduces: &[&Action],
        resolve_conflicts: bool,
    ) -> Option<Action> {
        self.record_reduce_reduce_conflict(state, symbol, resolve_conflicts);
        if resolve_conflicts {
            Some(Self::lowest_reduce(reduces).clone())
        } else {
            None
        }
    }

    /// Records a reduce/reduce conflict without deciding the cell's final
    /// action; used both for a pure reduce/reduce family and for the
    /// reduce/reduce sub-group of a 3-way shift/reduce/reduce conflict.
    fn record_reduce_reduce_conflict(&mut self, state: u32, symbol: &str, resolve_conflicts: bool) {
        self.conflicts.push(ConflictRecord {
            state,
            symbol: symbol.to_string(),
            kind: ConflictKind::ReduceReduce,
            resolved_by: if resolve_conflicts {
                ResolvedBy::Default
            } else {
                ResolvedBy::Unresolved
            },
        });
    }

    /// The reduce/reduce tie-break: lowest-numbered production wins, with
    /// `Accept` (always production 0) taking priority over every other
    /// reduce.
    fn lowest_reduce<'a>(reduces: &[&'a Action]) -> &'a Action {
        reduces
            .iter()
            .min_by_key(|a| match a {
                Action::Reduce(n) => *n,
                Action::Accept => 0,
                _ => u32::MAX,
            })
            .copied()
            .expect("reduce family is never empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, GrammarSpec, RhsAlt};

    fn ambiguous_grammar() -> Grammar {
        let spec = GrammarSpec::new(Mode::Slr1)
            .with_production("S", vec![RhsAlt::new("A"), RhsAlt::new("B")])
            .with_production("A", vec![RhsAlt::new("x")])
            .with_production("B", vec![RhsAlt::new("x")]);
        Grammar::build(&spec).unwrap()
    }

    /// A cell with one shift and two reduce candidates must resolve the
    /// reduce/reduce sub-group (recording its own conflict) before
    /// resolving the shift against the winner, rather than silently
    /// dropping every reduce candidate past the first.
    #[test]
    fn three_way_conflict_resolves_reduce_reduce_then_shift_reduce() {
        let grammar = ambiguous_grammar();
        let mut table = LrTable::default();
        table.action.insert(
            (7, "x".to_string()),
            Action::Conflict(vec![Action::Shift(10), Action::Reduce(3), Action::Reduce(4)]),
        );

        table.resolve_conflicts(&grammar, true);

        assert_eq!(table.conflicts().len(), 2);
        assert_eq!(table.conflicts()[0].kind, ConflictKind::ReduceReduce);
        assert_eq!(table.conflicts()[1].kind, ConflictKind::ShiftReduce);
        assert_eq!(table.action(7, "x"), Some(&Action::Shift(10)));
    }
}
