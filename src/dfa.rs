use std::collections::VecDeque;

use itertools::Itertools;

use crate::{
    alphabet::{Alphabet, SymbolOf},
    math,
    word::Word,
};

/// Index of a state in a [`DFA`]. States are numbered consecutively from zero.
pub type StateIndex = usize;

/// A deterministic finite automaton over an [`Alphabet`]. The transition
/// function is total by construction: every state has exactly one successor
/// for every symbol of the alphabet.
#[derive(Debug, Clone)]
pub struct DFA<A: Alphabet> {
    alphabet: A,
    initial: StateIndex,
    accepting: Vec<bool>,
    transitions: Vec<Vec<StateIndex>>,
}

impl<A: Alphabet> DFA<A> {
    /// Assembles a DFA from its constituent parts. The `transitions` table
    /// holds, for each state, the successor per symbol index. Panics if the
    /// transition function is not total or any index is out of bounds.
    pub fn from_parts(
        alphabet: A,
        initial: StateIndex,
        accepting: Vec<bool>,
        transitions: Vec<Vec<StateIndex>>,
    ) -> Self {
        let states = accepting.len();
        assert!(states > 0, "a DFA must have at least one state");
        assert!(initial < states, "initial state out of bounds");
        assert_eq!(transitions.len(), states);
        for row in &transitions {
            assert_eq!(
                row.len(),
                alphabet.size(),
                "the transition function must be total"
            );
            assert!(row.iter().all(|target| *target < states));
        }
        Self {
            alphabet,
            initial,
            accepting,
            transitions,
        }
    }

    /// Convenience constructor that builds the transition table from a list of
    /// `(source, symbol, target)` edges. Panics unless the edges describe a
    /// total deterministic transition function.
    pub fn from_edges<Q, E>(alphabet: A, initial: StateIndex, accepting: Q, edges: E) -> Self
    where
        Q: IntoIterator<Item = bool>,
        E: IntoIterator<Item = (StateIndex, SymbolOf<A>, StateIndex)>,
    {
        let accepting = accepting.into_iter().collect_vec();
        let mut transitions = vec![vec![usize::MAX; alphabet.size()]; accepting.len()];
        for (source, symbol, target) in edges {
            let index = alphabet
                .index_of(symbol)
                .unwrap_or_else(|| panic!("symbol {symbol:?} is not part of the alphabet"));
            transitions[source][index] = target;
        }
        assert!(
            transitions
                .iter()
                .all(|row| row.iter().all(|target| *target != usize::MAX)),
            "the transition function must be total"
        );
        Self::from_parts(alphabet, initial, accepting, transitions)
    }

    /// Returns a reference to the underlying alphabet.
    pub fn alphabet(&self) -> &A {
        &self.alphabet
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.accepting.len()
    }

    /// The initial state.
    pub fn initial(&self) -> StateIndex {
        self.initial
    }

    /// Returns an iterator over all state indices.
    pub fn states(&self) -> std::ops::Range<StateIndex> {
        0..self.size()
    }

    /// Whether the given state is accepting.
    pub fn is_accepting(&self, state: StateIndex) -> bool {
        self.accepting[state]
    }

    /// The state reached from `state` on the given symbol, or `None` if the
    /// symbol is not part of the alphabet.
    pub fn successor(&self, state: StateIndex, symbol: SymbolOf<A>) -> Option<StateIndex> {
        let index = self.alphabet.index_of(symbol)?;
        Some(self.transitions[state][index])
    }

    /// Runs the word from the initial state and returns the reached state, or
    /// `None` if some symbol of the word is not part of the alphabet.
    pub fn reached(&self, word: &Word<SymbolOf<A>>) -> Option<StateIndex> {
        word.symbols()
            .try_fold(self.initial, |state, symbol| self.successor(state, symbol))
    }

    /// Whether the automaton accepts the given word.
    pub fn accepts(&self, word: &Word<SymbolOf<A>>) -> bool {
        self.reached(word)
            .is_some_and(|state| self.is_accepting(state))
    }

    /// Searches for a shortest word that `self` and `other` classify
    /// differently, by a breadth first traversal of the product of the two
    /// automata. Returns `None` if the automata are equivalent. Both automata
    /// must be over the same alphabet.
    pub fn separating_word(&self, other: &DFA<A>) -> Option<Word<SymbolOf<A>>> {
        let mut visited: math::Set<(StateIndex, StateIndex)> = math::Set::default();
        let mut queue = VecDeque::new();
        visited.insert((self.initial, other.initial));
        queue.push_back((self.initial, other.initial, Word::epsilon()));

        while let Some((left, right, access)) = queue.pop_front() {
            if self.is_accepting(left) != other.is_accepting(right) {
                return Some(access);
            }
            for symbol in self.alphabet.symbols() {
                let left_successor = self
                    .successor(left, symbol)
                    .expect("symbol stems from our own alphabet");
                let right_successor = other
                    .successor(right, symbol)
                    .expect("both automata must be over the same alphabet");
                if visited.insert((left_successor, right_successor)) {
                    queue.push_back((left_successor, right_successor, access.append(symbol)));
                }
            }
        }
        None
    }

    /// Whether `self` and `other` accept the same language.
    pub fn equivalent(&self, other: &DFA<A>) -> bool {
        self.separating_word(other).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::DFA;
    use crate::alphabet::CharAlphabet;

    fn even_length() -> DFA<CharAlphabet> {
        DFA::from_edges(
            CharAlphabet::new(['a', 'b']),
            0,
            [true, false],
            [
                (0, 'a', 1),
                (0, 'b', 1),
                (1, 'a', 0),
                (1, 'b', 0),
            ],
        )
    }

    #[test]
    fn runs_and_acceptance() {
        let dfa = even_length();
        assert!(dfa.accepts(&"".into()));
        assert!(dfa.accepts(&"ab".into()));
        assert!(!dfa.accepts(&"aba".into()));
        assert_eq!(dfa.reached(&"ax".into()), None);
        assert!(!dfa.accepts(&"x".into()));
    }

    #[test]
    fn separating_word_is_shortest() {
        let everything = DFA::from_edges(
            CharAlphabet::new(['a', 'b']),
            0,
            [true],
            [(0, 'a', 0), (0, 'b', 0)],
        );
        let dfa = even_length();
        let word = dfa.separating_word(&everything).unwrap();
        assert_eq!(word.len(), 1);
        assert!(dfa.equivalent(&dfa.clone()));
    }
}
