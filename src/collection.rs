//! Canonical collection construction: the DFA of item sets built via
//! closure and GOTO under a chosen LR mode (C5).
use std::collections::HashMap;

use crate::grammar::Grammar;
use crate::item::{ItemKey, ItemSet};
use crate::options::Mode;
use crate::sets::SetTables;

/// One state of the canonical collection: a stable id plus its closed item
/// set.
#[derive(Debug, Clone)]
pub struct State {
    pub id: u32,
    pub items: ItemSet,
}

/// The finished DFA: states plus `(state, symbol) -> state` transitions.
/// Built once per grammar+mode, then immutable (§3 Lifecycle).
#[derive(Debug)]
pub struct CanonicalCollection {
    states: Vec<State>,
    goto: HashMap<(u32, String), u32>,
}

impl CanonicalCollection {
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn goto(&self, state: u32, symbol: &str) -> Option<u32> {
        self.goto.get(&(state, symbol.to_string())).copied()
    }

    pub fn transitions_from(&self, state: u32) -> impl Iterator<Item = (&str, u32)> {
        self.goto
            .iter()
            .filter(move |((s, _), _)| *s == state)
            .map(|((_, sym), target)| (sym.as_str(), *target))
    }

    /// Build the canonical collection for `grammar` under `mode`. Lookaheads
    /// are tracked item-by-item during closure for CLR(1)/LALR1_BY_CLR1;
    /// LR(0)/SLR(1) carry none, and LALR1_BY_SLR1 defers lookahead
    /// assignment to a post-hoc FOLLOW pass (§4.3).
    pub fn build(grammar: &Grammar, sets: &SetTables, mode: Mode) -> Self {
        let track_lookaheads = matches!(mode, Mode::Clr1 | Mode::Lalr1ByClr1);

        let start_key = ItemKey::start();
        let mut start_items = ItemSet::default();
        let start_lookahead = if track_lookaheads {
            vec![crate::symbol::Symbol::END_NAME.to_string()]
        } else {
            vec![]
        };
        start_items.insert(start_key, start_lookahead);
        let start_items = start_items.closure(grammar, sets, track_lookaheads);

        let mut states = vec![State {
            id: 0,
            items: start_items,
        }];
        let mut goto: HashMap<(u32, String), u32> = HashMap::new();

        let mut worklist = vec![0u32];
        while let Some(state_id) = worklist.pop() {
            let symbols = Self::symbols_after_dot(grammar, &states[state_id as usize].items);
            for symbol in symbols {
                let candidate =
                    states[state_id as usize]
                        .items
                        .goto(grammar, sets, &symbol, track_lookaheads);
                if candidate.items().is_empty() {
                    continue;
                }

                let existing = if track_lookaheads {
                    // CLR(1): full item equality, including lookaheads.
                    states.iter().find(|s| s.items == candidate).map(|s| s.id)
                } else {
                    states
                        .iter()
                        .find(|s| s.items.same_kernel(&candidate))
                        .map(|s| s.id)
                };

                let target_id = match existing {
                    Some(id) => id,
                    None => {
                        let id = states.len() as u32;
                        states.push(State {
                            id,
                            items: candidate,
                        });
                        worklist.push(id);
                        id
                    }
                };
                goto.insert((state_id, symbol), target_id);
            }
        }

        log::debug!(
            "canonical collection built: {} state(s) under {}",
            states.len(),
            mode
        );

        let mut collection = Self { states, goto };

        if mode == Mode::Lalr1ByClr1 {
            collection.merge_by_kernel();
        }
        if mode == Mode::Lalr1BySlr1 {
            collection.assign_follow_lookaheads(grammar, sets);
        }

        collection
    }

    fn symbols_after_dot(grammar: &Grammar, items: &ItemSet) -> Vec<String> {
        let mut symbols = Vec::new();
        for key in items.items().keys() {
            if let Some(symbol) = key.next_symbol(grammar) {
                if !symbols.contains(&symbol.name().to_string()) {
                    symbols.push(symbol.name().to_string());
                }
            }
        }
        symbols
    }

    /// LALR1_BY_CLR1: merge states whose kernels (ignoring lookaheads)
    /// match, unioning their per-item lookaheads, then repoint every
    /// transition at the surviving representative.
    fn merge_by_kernel(&mut self) {
        let mut representative: HashMap<u32, u32> = HashMap::new();
        let mut kernel_owner: Vec<(std::collections::BTreeSet<ItemKey>, u32)> = Vec::new();

        for state in &self.states {
            let kernel = state.items.kernel_keys();
            if let Some((_, owner)) = kernel_owner.iter().find(|(k, _)| *k == kernel) {
                representative.insert(state.id, *owner);
            } else {
                kernel_owner.push((kernel, state.id));
                representative.insert(state.id, state.id);
            }
        }

        let mut merged_states: std::collections::HashMap<u32, ItemSet> = HashMap::new();
        for state in &self.states {
            let owner = representative[&state.id];
            let entry = merged_states.entry(owner).or_insert_with(ItemSet::default);
            for (&key, lookahead) in state.items.items() {
                entry.insert(key, lookahead.clone());
            }
        }

        let mut surviving_ids: Vec<u32> = merged_states.keys().copied().collect();
        surviving_ids.sort_unstable();
        let renumber: HashMap<u32, u32> = surviving_ids
            .iter()
            .enumerate()
            .map(|(dense_id, &old_id)| (old_id, dense_id as u32))
            .collect();

        let new_states: Vec<State> = surviving_ids
            .iter()
            .map(|old_id| State {
                id: renumber[old_id],
                items: merged_states.remove(old_id).expect("surviving id present"),
            })
            .collect();

        let new_goto: HashMap<(u32, String), u32> = self
            .goto
            .iter()
            .map(|((from, sym), to)| {
                (
                    (renumber[&representative[from]], sym.clone()),
                    renumber[&representative[to]],
                )
            })
            .collect();

        let merged_count = self.states.len() - new_states.len();
        self.states = new_states;
        self.goto = new_goto;
        log::debug!("LALR1_BY_CLR1 merge collapsed {merged_count} state(s) by kernel");
    }

    /// LALR1_BY_SLR1: after the LR(0)-equivalent DFA is complete, give every
    /// reduce item (A -> alpha .) the lookahead set FOLLOW(A).
    fn assign_follow_lookaheads(&mut self, grammar: &Grammar, sets: &SetTables) {
        for state in &mut self.states {
            let reducible = state.items.reducible_keys(grammar);
            for key in reducible {
                let lhs_name = key.production(grammar).lhs().name().to_string();
                let follow = sets.follow(&lhs_name);
                state
                    .items
                    .insert(key, follow.terminals().iter().cloned());
            }
        }
    }
}
