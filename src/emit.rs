//! Emitter interface (C9): a pure, structured export of the finished
//! grammar/sets/tables/collection, consumed by an external template-based
//! renderer. The core knows nothing about target languages; it only
//! guarantees deterministic ordering and the canonical cell encoding of
//! §4.4.
use crate::collection::CanonicalCollection;
use crate::grammar::Grammar;
use crate::ll_table::LlTable;
use crate::lr_table::LrTable;

#[derive(Debug, Clone)]
pub struct ProductionExport {
    pub number: u32,
    pub lhs: String,
    pub rhs: Vec<String>,
    pub action: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StateExport {
    pub id: u32,
    /// `(lhs, dot, lookaheads)` for every item in the state, sorted for
    /// byte-stable output.
    pub items: Vec<(u32, usize, Vec<String>)>,
}

#[derive(Debug, Clone)]
pub struct LrTableExport {
    /// `(state, terminal) -> canonical cell string` (§4.4 encoding).
    pub action: Vec<((u32, String), String)>,
    /// `(state, nonterminal) -> target state`.
    pub goto: Vec<((u32, String), u32)>,
}

#[derive(Debug, Clone)]
pub struct LlTableExport {
    pub cells: Vec<((String, String), u32)>,
}

/// The complete, structured export a code-emitter template renders from.
#[derive(Debug, Clone)]
pub struct GrammarExport {
    pub terminals: Vec<String>,
    pub nonterminals: Vec<String>,
    pub productions: Vec<ProductionExport>,
    pub start_symbol: String,
    pub states: Vec<StateExport>,
    pub lr_table: Option<LrTableExport>,
    pub ll_table: Option<LlTableExport>,
}

impl GrammarExport {
    pub fn from_lr(
        grammar: &Grammar,
        collection: &CanonicalCollection,
        table: &LrTable,
    ) -> Self {
        Self {
            terminals: sorted(grammar.terminals()),
            nonterminals: sorted(grammar.nonterminals()),
            productions: export_productions(grammar),
            start_symbol: grammar.user_start_symbol().name().to_string(),
            states: export_states(collection),
            lr_table: Some(export_lr_table(grammar, collection, table)),
            ll_table: None,
        }
    }

    pub fn from_ll(grammar: &Grammar, table: &LlTable) -> Self {
        let mut cells: Vec<((String, String), u32)> = Vec::new();
        for nonterminal in sorted(grammar.nonterminals()) {
            for terminal in sorted(grammar.terminals())
                .into_iter()
                .chain(std::iter::once(crate::symbol::Symbol::END_NAME.to_string()))
            {
                if let Some(production_number) = table.get(&nonterminal, &terminal) {
                    cells.push(((nonterminal.clone(), terminal), production_number));
                }
            }
        }
        Self {
            terminals: sorted(grammar.terminals()),
            nonterminals: sorted(grammar.nonterminals()),
            productions: export_productions(grammar),
            start_symbol: grammar.user_start_symbol().name().to_string(),
            states: Vec::new(),
            lr_table: None,
            ll_table: Some(LlTableExport { cells }),
        }
    }
}

fn sorted(names: &[String]) -> Vec<String> {
    let mut v = names.to_vec();
    v.sort();
    v
}

fn export_productions(grammar: &Grammar) -> Vec<ProductionExport> {
    grammar
        .productions()
        .iter()
        .map(|p| ProductionExport {
            number: p.number(),
            lhs: p.lhs().name().to_string(),
            rhs: p.rhs().iter().map(|s| s.name().to_string()).collect(),
            action: p.action().map(|s| s.to_string()),
        })
        .collect()
}

fn export_states(collection: &CanonicalCollection) -> Vec<StateExport> {
    collection
        .states()
        .iter()
        .map(|state| {
            let mut items: Vec<(u32, usize, Vec<String>)> = state
                .items
                .items()
                .iter()
                .map(|(key, lookahead)| {
                    (
                        key.production,
                        key.dot,
                        lookahead.iter().cloned().collect(),
                    )
                })
                .collect();
            items.sort_by_key(|(p, d, _)| (*p, *d));
            StateExport {
                id: state.id,
                items,
            }
        })
        .collect()
}

fn export_lr_table(
    grammar: &Grammar,
    collection: &CanonicalCollection,
    table: &LrTable,
) -> LrTableExport {
    let mut action = Vec::new();
    let mut goto = Vec::new();
    let terminals_and_end: Vec<String> = sorted(grammar.terminals())
        .into_iter()
        .chain(std::iter::once(crate::symbol::Symbol::END_NAME.to_string()))
        .collect();
    for state in collection.states() {
        for terminal in &terminals_and_end {
            if let Some(cell) = table.action(state.id, terminal) {
                action.push(((state.id, terminal.clone()), cell.to_string()));
            }
        }
        for nonterminal in sorted(grammar.nonterminals()) {
            if let Some(target) = table.goto(state.id, &nonterminal) {
                goto.push(((state.id, nonterminal), target));
            }
        }
    }
    LrTableExport { action, goto }
}
