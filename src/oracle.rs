use crate::{
    alphabet::{Alphabet, Symbol, SymbolOf},
    dfa::DFA,
    word::Word,
    Observation,
};

/// Errors surfaced by a [`MembershipOracle`] are opaque to the learner and
/// propagated to the caller unchanged.
pub type OracleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A single membership query, asking whether the word `prefix · suffix`
/// belongs to the target language. The oracle answers by installing an output
/// via [`Query::answer`].
#[derive(Debug, Clone)]
pub struct Query<S: Symbol, D> {
    prefix: Word<S>,
    suffix: Word<S>,
    output: Option<D>,
}

impl<S: Symbol, D> Query<S, D> {
    /// Creates an unanswered query for the word `prefix · suffix`.
    pub fn new(prefix: Word<S>, suffix: Word<S>) -> Self {
        Self {
            prefix,
            suffix,
            output: None,
        }
    }

    /// The prefix part of the queried word.
    pub fn prefix(&self) -> &Word<S> {
        &self.prefix
    }

    /// The suffix part of the queried word.
    pub fn suffix(&self) -> &Word<S> {
        &self.suffix
    }

    /// The full queried word, i.e. the concatenation of prefix and suffix.
    pub fn word(&self) -> Word<S> {
        self.prefix.concat(&self.suffix)
    }

    /// Installs the oracle's answer for this query.
    pub fn answer(&mut self, output: D) {
        self.output = Some(output);
    }

    /// The answer installed so far, if any.
    pub fn output(&self) -> Option<&D> {
        self.output.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Word<S>, Word<S>, Option<D>) {
        (self.prefix, self.suffix, self.output)
    }
}

/// A word on which the current hypothesis and the target language disagree,
/// together with the target's classification of that word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample<S: Symbol, D> {
    word: Word<S>,
    output: D,
}

impl<S: Symbol, D> Counterexample<S, D> {
    /// Creates a counterexample from a word and its true classification.
    pub fn new(word: Word<S>, output: D) -> Self {
        Self { word, output }
    }

    /// The word the hypothesis misclassifies.
    pub fn word(&self) -> &Word<S> {
        &self.word
    }

    /// The classification of the word by the target language.
    pub fn output(&self) -> &D {
        &self.output
    }
}

/// A batch-processing membership oracle, the half of the minimally adequate
/// teacher the learner talks to directly. The learner always poses every
/// query generated by one populate step as a single batch, never one by one,
/// so implementations are free to parallelise, cache or dispatch the whole
/// batch at once.
pub trait MembershipOracle {
    /// The alphabet of the target language.
    type Alphabet: Alphabet;
    /// The classification the target language assigns to a word.
    type Output: Observation;

    /// Returns a reference to the underlying alphabet.
    fn alphabet(&self) -> &Self::Alphabet;

    /// Answers every query in the batch by calling [`Query::answer`] on it.
    /// An error must leave the batch untouched from the learner's point of
    /// view; the learner discards all answers of a failed batch.
    fn process_queries(
        &self,
        queries: &mut [Query<SymbolOf<Self::Alphabet>, Self::Output>],
    ) -> Result<(), OracleError>;
}

/// An oracle based on a [`DFA`] instance. It answers membership queries by
/// running the word through the automaton. On top of that it can play the
/// equivalence half of the teacher for tests and examples, by searching a
/// separating word between the target and a hypothesis.
#[derive(Debug, Clone)]
pub struct DFAOracle<A: Alphabet> {
    target: DFA<A>,
}

impl<A: Alphabet> DFAOracle<A> {
    /// Creates a new instance of a [`DFAOracle`] from the given automaton.
    pub fn new(target: DFA<A>) -> Self {
        Self { target }
    }

    /// Compares the hypothesis against the target automaton and returns a
    /// shortest word on which the two disagree, classified by the target.
    /// Returns `None` if the hypothesis is equivalent to the target.
    pub fn counterexample(&self, hypothesis: &DFA<A>) -> Option<Counterexample<SymbolOf<A>, bool>> {
        let word = self.target.separating_word(hypothesis)?;
        let output = self.target.accepts(&word);
        Some(Counterexample::new(word, output))
    }
}

impl<A: Alphabet> MembershipOracle for DFAOracle<A> {
    type Alphabet = A;
    type Output = bool;

    fn alphabet(&self) -> &Self::Alphabet {
        self.target.alphabet()
    }

    fn process_queries(
        &self,
        queries: &mut [Query<SymbolOf<A>, bool>],
    ) -> Result<(), OracleError> {
        for query in queries.iter_mut() {
            let accepted = self.target.accepts(&query.word());
            query.answer(accepted);
        }
        Ok(())
    }
}

/// An oracle that decides membership with a plain predicate on words. Useful
/// whenever the target language is easier to state as a property than as an
/// automaton.
#[derive(Debug, Clone)]
pub struct PredicateOracle<A: Alphabet, F> {
    alphabet: A,
    predicate: F,
}

impl<A: Alphabet, F> PredicateOracle<A, F>
where
    F: Fn(&Word<SymbolOf<A>>) -> bool,
{
    /// Creates an oracle for the language of all words satisfying `predicate`.
    pub fn new(alphabet: A, predicate: F) -> Self {
        Self {
            alphabet,
            predicate,
        }
    }
}

impl<A: Alphabet, F> MembershipOracle for PredicateOracle<A, F>
where
    F: Fn(&Word<SymbolOf<A>>) -> bool,
{
    type Alphabet = A;
    type Output = bool;

    fn alphabet(&self) -> &Self::Alphabet {
        &self.alphabet
    }

    fn process_queries(
        &self,
        queries: &mut [Query<SymbolOf<A>, bool>],
    ) -> Result<(), OracleError> {
        for query in queries.iter_mut() {
            let output = (self.predicate)(&query.word());
            query.answer(output);
        }
        Ok(())
    }
}
