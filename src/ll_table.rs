//! LL(1) parsing table (C7): one cell per (nonterminal, terminal) pair,
//! populated directly from PREDICT sets.
use std::collections::HashMap;

use crate::error::TableError;
use crate::grammar::Grammar;
use crate::sets::SetTables;

#[derive(Debug, Default)]
pub struct LlTable {
    cells: HashMap<(String, String), u32>,
    conflicts: Vec<TableError>,
}

impl LlTable {
    pub fn get(&self, nonterminal: &str, terminal: &str) -> Option<u32> {
        self.cells
            .get(&(nonterminal.to_string(), terminal.to_string()))
            .copied()
    }

    pub fn conflicts(&self) -> &[TableError] {
        &self.conflicts
    }

    /// Build the table from PREDICT sets. A collision (two productions
    /// predicting the same (A, t) pair) means the grammar is not LL(1);
    /// per §4.5 there is no precedence rescue in LL mode, so every
    /// collision is recorded and the first production wins the cell,
    /// leaving the caller to decide (validate vs. hard-fail) what to do
    /// with `conflicts()`.
    pub fn build(grammar: &Grammar, sets: &SetTables) -> Self {
        let mut table = LlTable::default();
        for production in grammar.productions() {
            if production.number() == 0 {
                continue;
            }
            let predict = sets.predict(production);
            for terminal in predict.terminals() {
                let key = (production.lhs().name().to_string(), terminal.clone());
                match table.cells.get(&key) {
                    Some(existing) => {
                        table.conflicts.push(TableError::LL1Collision {
                            lhs: production.lhs().name().to_string(),
                            terminal: terminal.clone(),
                            entries: format!("r{existing}/r{}", production.number()),
                        });
                    }
                    None => {
                        table.cells.insert(key, production.number());
                    }
                }
            }
        }
        log::debug!(
            "LL(1) table built: {} cell(s), {} conflict(s)",
            table.cells.len(),
            table.conflicts.len()
        );
        table
    }
}
