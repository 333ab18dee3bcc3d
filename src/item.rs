//! LR item model: `(production, dot, lookahead-set)` plus the closure/goto
//! operations used to build the canonical collection (C5).
use std::collections::{BTreeMap, BTreeSet};

use crate::grammar::Grammar;
use crate::sets::SetTables;
use crate::symbol::Production;

/// The `(production#, dot)` pair that identifies an item's *kernel* identity
/// — lookaheads are tracked separately so LALR state-merging can compare
/// kernels without caring how lookaheads were computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub production: u32,
    pub dot: usize,
}

impl ItemKey {
    pub fn start() -> Self {
        Self {
            production: 0,
            dot: 0,
        }
    }

    pub fn shifted(self) -> Self {
        Self {
            dot: self.dot + 1,
            ..self
        }
    }

    pub fn is_kernel(self) -> bool {
        self.dot > 0 || self.production == 0
    }

    pub fn next_symbol<'g>(self, grammar: &'g Grammar) -> Option<&'g crate::symbol::Symbol> {
        grammar
            .get_production(self.production)
            .and_then(|p| p.rhs().get(self.dot))
    }

    pub fn is_reducible(self, grammar: &Grammar) -> bool {
        grammar
            .get_production(self.production)
            .map(|p| self.dot >= p.rhs().len())
            .unwrap_or(false)
    }

    pub fn production<'g>(self, grammar: &'g Grammar) -> &'g Production {
        grammar
            .get_production(self.production)
            .expect("item key references a valid production number")
    }
}

/// A full item set: kernel+non-kernel keys mapped to their lookahead sets.
/// Lookaheads are empty for LR(0)/SLR(1) and for LALR1_BY_SLR1 prior to the
/// post-hoc FOLLOW assignment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSet {
    items: BTreeMap<ItemKey, BTreeSet<String>>,
}

impl ItemSet {
    pub fn items(&self) -> &BTreeMap<ItemKey, BTreeSet<String>> {
        &self.items
    }

    pub fn insert(&mut self, key: ItemKey, lookahead: impl IntoIterator<Item = String>) -> bool {
        let mut changed = !self.items.contains_key(&key);
        let entry = self.items.entry(key).or_default();
        for l in lookahead {
            if entry.insert(l) {
                changed = true;
            }
        }
        changed
    }

    pub fn kernel_keys(&self) -> BTreeSet<ItemKey> {
        self.items.keys().copied().filter(|k| k.is_kernel()).collect()
    }

    /// Kernel-only equality: the criterion every LR mode uses to decide
    /// whether two item sets are "the same state" (§4.3).
    pub fn same_kernel(&self, other: &ItemSet) -> bool {
        self.kernel_keys() == other.kernel_keys()
    }

    pub fn reducible_keys(&self, grammar: &Grammar) -> Vec<ItemKey> {
        self.items
            .keys()
            .copied()
            .filter(|k| k.is_reducible(grammar))
            .collect()
    }

    pub fn lookahead(&self, key: ItemKey) -> BTreeSet<String> {
        self.items.get(&key).cloned().unwrap_or_default()
    }

    /// Closure under "dot before a nonterminal" expansion (§4.3). Lookahead
    /// propagation for CLR(1)/LALR1_BY_CLR1 follows FIRST(beta a); LR(0)/
    /// SLR(1)/LALR1_BY_SLR1 carry no lookahead at this stage.
    pub fn closure(
        mut self,
        grammar: &Grammar,
        sets: &SetTables,
        track_lookaheads: bool,
    ) -> ItemSet {
        loop {
            let mut additions: Vec<(ItemKey, BTreeSet<String>)> = Vec::new();
            for (&key, lookaheads) in self.items.iter() {
                let Some(next) = key.next_symbol(grammar) else {
                    continue;
                };
                if !next.is_nonterminal() {
                    continue;
                }
                let beta = &key.production(grammar).rhs()[key.dot + 1..];
                let new_lookaheads: BTreeSet<String> = if track_lookaheads {
                    let mut result = BTreeSet::new();
                    for a in lookaheads {
                        let mut beta_a = beta.to_vec();
                        let lookahead_symbol = crate::symbol::Symbol::new(
                            u32::MAX,
                            a.clone(),
                            crate::symbol::SymbolKind::Terminal,
                        );
                        beta_a.push(lookahead_symbol);
                        let first = sets.first_of(&beta_a);
                        result.extend(first.terminals().iter().cloned());
                    }
                    result
                } else {
                    BTreeSet::new()
                };
                for production_number in grammar.get_productions_for_symbol(next.name()) {
                    additions.push((
                        ItemKey {
                            production: *production_number,
                            dot: 0,
                        },
                        new_lookaheads.clone(),
                    ));
                }
            }
            let mut changed = false;
            for (key, lookaheads) in additions {
                if self.insert(key, lookaheads) {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        self
    }

    /// GOTO(state, X): shift every item with X after the dot, then close.
    pub fn goto(
        &self,
        grammar: &Grammar,
        sets: &SetTables,
        symbol_name: &str,
        track_lookaheads: bool,
    ) -> ItemSet {
        let mut result = ItemSet::default();
        for (&key, lookaheads) in &self.items {
            if let Some(next) = key.next_symbol(grammar) {
                if next.name() == symbol_name {
                    result.insert(key.shifted(), lookaheads.clone());
                }
            }
        }
        result.closure(grammar, sets, track_lookaheads)
    }
}
