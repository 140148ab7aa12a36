use tracing::debug;

use crate::{
    alphabet::{Alphabet, SymbolOf},
    dfa::{StateIndex, DFA},
    math,
    table::ObservationTable,
    word::Word,
};

/// Extracts the hypothesis automaton from a closed and consistent table: one
/// state per distinct short prefix row signature, the first short prefix with
/// a given signature acting as its representative. The state of a signature
/// is accepting iff the ε column holds `true` and the transition on a symbol
/// follows the row of the extended representative.
///
/// Panics if the table is not closed or not prefix-closed; the learner never
/// calls this on such a table.
pub(crate) fn extract_dfa<A: Alphabet>(
    alphabet: &A,
    table: &ObservationTable<SymbolOf<A>, bool>,
) -> DFA<A> {
    let epsilon_column = table
        .suffixes()
        .position(|suffix| suffix.is_empty())
        .expect("the empty suffix is always a column label");

    let mut classes: math::Map<Vec<bool>, StateIndex> = math::Map::default();
    let mut representatives: Vec<&Word<SymbolOf<A>>> = vec![];
    let mut accepting = vec![];
    for (prefix, signature) in table.short_prefix_rows() {
        if classes.contains_key(&signature) {
            continue;
        }
        accepting.push(signature[epsilon_column]);
        classes.insert(signature, representatives.len());
        representatives.push(prefix);
    }

    let mut transitions = Vec::with_capacity(representatives.len());
    for representative in &representatives {
        let mut successors = Vec::with_capacity(alphabet.size());
        for symbol in alphabet.symbols() {
            let extension = representative.append(symbol);
            let signature = table.row(&extension).unwrap_or_else(|| {
                panic!("missing row for {extension}, the table is not prefix-closed")
            });
            let target = classes.get(&signature).copied().unwrap_or_else(|| {
                panic!("no state for the row of {extension}, the table is not closed")
            });
            successors.push(target);
        }
        transitions.push(successors);
    }

    let initial = *classes
        .get(
            &table
                .row(&Word::epsilon())
                .expect("ε is always a short prefix"),
        )
        .expect("the row of ε belongs to some state");

    debug!(
        "extracted a hypothesis with {} states from {} short prefixes",
        representatives.len(),
        table.short_prefixes().count()
    );
    DFA::from_parts(alphabet.clone(), initial, accepting, transitions)
}
