use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    alphabet::{Alphabet, SymbolOf},
    dfa::DFA,
    error::LearnerError,
    hypothesis::extract_dfa,
    oracle::{Counterexample, MembershipOracle, Query},
    table::ObservationTable,
    word::Word,
};

/// An implementation of the L* algorithm by Dana Angluin.
///
/// The learner owns an [`ObservationTable`] and drives it through the
/// populate, close and consistency phases. Membership queries are batched:
/// each populate step poses a single [`MembershipOracle::process_queries`]
/// call with one query per unfilled cell. Equivalence queries are left to the
/// caller, who feeds back counterexamples through
/// [`LStar::refine_hypothesis`].
///
/// Counterexamples are processed with the original Angluin scheme, adding
/// every prefix of the counterexample to the short prefix region. Smarter
/// schemes exist, but they change the query counts this learner is expected
/// to produce.
pub struct LStar<A: Alphabet, O: MembershipOracle<Alphabet = A>> {
    alphabet: A,
    oracle: O,
    table: ObservationTable<SymbolOf<A>, O::Output>,
    started: bool,
}

impl<A, O> LStar<A, O>
where
    A: Alphabet,
    O: MembershipOracle<Alphabet = A>,
{
    /// Creates a learner for the given alphabet, posing its membership
    /// queries to the given oracle. No queries are posed yet; learning begins
    /// with [`LStar::start_learning`].
    pub fn new(alphabet: A, oracle: O) -> Self {
        assert!(!alphabet.is_empty(), "the alphabet must not be empty");
        let table = ObservationTable::new(&alphabet);
        Self {
            alphabet,
            oracle,
            table,
            started: false,
        }
    }

    /// Returns a reference to the alphabet being learned.
    pub fn alphabet(&self) -> &A {
        &self.alphabet
    }

    /// Returns a reference to the membership oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Returns a read-only view of the observation table, for inspection and
    /// printing.
    pub fn observation_table(&self) -> &ObservationTable<SymbolOf<A>, O::Output> {
        &self.table
    }

    /// Performs the first learning iteration: fills in all cells of the
    /// seeded table with one batched oracle call and establishes closedness
    /// and consistency. May be called at most once.
    pub fn start_learning(&mut self) -> Result<(), LearnerError> {
        if self.started {
            return Err(LearnerError::InvalidLifecycle(
                "start_learning may only be called once",
            ));
        }
        debug!("starting to learn over an alphabet of size {}", self.alphabet.size());
        self.fill_table()?;
        self.make_closed_and_consistent()?;
        self.started = true;
        Ok(())
    }

    /// Read-only access to the current suffix set.
    pub fn global_suffixes(&self) -> impl Iterator<Item = &Word<SymbolOf<A>>> + '_ {
        self.table.suffixes()
    }

    /// Appends the given suffixes to the table, fills the new columns and
    /// re-closes the table. Consistency is deliberately *not* re-checked
    /// here; the next refinement cycle repairs any inconsistency the new
    /// suffixes may have surfaced. Returns whether the number of short
    /// prefixes grew.
    pub fn add_global_suffixes<I>(&mut self, suffixes: I) -> Result<bool, LearnerError>
    where
        I: IntoIterator<Item = Word<SymbolOf<A>>>,
    {
        if !self.started {
            return Err(LearnerError::InvalidLifecycle(
                "learning must be started before suffixes can be added",
            ));
        }
        let short_count = self.table.short_prefixes().count();
        for suffix in suffixes {
            self.table.add_suffix(suffix);
        }
        self.fill_table()?;
        self.close_table()?;
        Ok(self.table.short_prefixes().count() != short_count)
    }

    /// Builds one batch with a query for every unfilled cell, poses it to the
    /// oracle and installs the answers. Installation only happens once the
    /// whole batch succeeded, a failing oracle leaves the table untouched.
    fn fill_table(&mut self) -> Result<(), LearnerError> {
        let mut queries = vec![];
        for prefix in self.table.short_prefixes().chain(self.table.long_prefixes()) {
            for suffix in self.table.suffixes() {
                if self.table.cell(prefix, suffix).is_none() {
                    queries.push(Query::new(prefix.clone(), suffix.clone()));
                }
            }
        }
        if queries.is_empty() {
            return Ok(());
        }

        trace!("posing a batch of {} membership queries", queries.len());
        self.oracle
            .process_queries(&mut queries)
            .map_err(LearnerError::Oracle)?;
        if queries.iter().any(|query| query.output().is_none()) {
            return Err(LearnerError::UnansweredQuery);
        }

        for query in queries {
            let (prefix, suffix, output) = query.into_parts();
            let output = output.expect("presence was verified for the whole batch");
            self.table.record(&prefix, &suffix, output);
        }
        Ok(())
    }

    /// Alternates the close and consistency phases until the table is both
    /// closed and consistent. Terminates because closing strictly grows the
    /// short prefix region and every consistency repair strictly grows the
    /// suffix set, both of which are bounded for a regular target language.
    fn make_closed_and_consistent(&mut self) -> Result<(), LearnerError> {
        loop {
            let mut stable = true;
            if !self.table.is_closed() {
                stable = false;
                self.close_table()?;
            }
            if !self.table.is_consistent_with(&self.alphabet) {
                stable = false;
                self.ensure_consistency()?;
            }
            if stable {
                return Ok(());
            }
        }
    }

    /// Promotes unmatched long prefixes until every long prefix row has a
    /// matching short prefix row, extending the promoted prefixes by every
    /// alphabet symbol and filling the new rows as it goes.
    fn close_table(&mut self) -> Result<(), LearnerError> {
        while let Some(candidate) = self.table.find_unclosed() {
            trace!("closing the table around {candidate}");
            self.table.move_long_to_short(&candidate);
            for symbol in self.alphabet.symbols() {
                let extension = candidate.append(symbol);
                if !self.table.is_short_prefix(&extension) {
                    self.table.add_long_prefix(extension);
                }
            }
            self.fill_table()?;
        }
        Ok(())
    }

    /// Repairs a single inconsistency by appending the witnessing suffix and
    /// filling the new column.
    fn ensure_consistency(&mut self) -> Result<(), LearnerError> {
        let Some(inconsistency) = self.table.find_inconsistency(&self.alphabet) else {
            return Ok(());
        };
        let witness = inconsistency.witness();
        trace!(
            "rows of {} and {} disagree after {:?}, adding suffix {witness}",
            inconsistency.left,
            inconsistency.right,
            inconsistency.symbol,
        );
        self.table.add_suffix(witness);
        self.fill_table()
    }
}

impl<A, O> LStar<A, O>
where
    A: Alphabet,
    O: MembershipOracle<Alphabet = A, Output = bool>,
{
    /// Extracts the current hypothesis automaton from the table. Requires
    /// that learning has started, so that the table is closed and consistent.
    pub fn hypothesis(&self) -> Result<DFA<A>, LearnerError> {
        if !self.started {
            return Err(LearnerError::InvalidLifecycle(
                "learning must be started before a hypothesis can be constructed",
            ));
        }
        Ok(extract_dfa(&self.alphabet, &self.table))
    }

    /// Refines the table with a counterexample: a word together with its true
    /// classification, on which the current hypothesis must disagree. Every
    /// prefix of the counterexample becomes a short prefix, the one-symbol
    /// extensions become long prefixes, and the table is re-filled, closed
    /// and made consistent. Returns `Ok(true)`, the table always strictly
    /// refines.
    ///
    /// Fails with [`LearnerError::InvalidCounterexample`] if the hypothesis
    /// already classifies the word as declared; the table is unchanged then.
    pub fn refine_hypothesis(
        &mut self,
        counterexample: Counterexample<SymbolOf<A>, bool>,
    ) -> Result<bool, LearnerError> {
        if !self.started {
            return Err(LearnerError::InvalidLifecycle(
                "learning must be started before the hypothesis can be refined",
            ));
        }
        let hypothesis = extract_dfa(&self.alphabet, &self.table);
        if hypothesis.accepts(counterexample.word()) == *counterexample.output() {
            return Err(LearnerError::InvalidCounterexample);
        }
        debug!("refining the hypothesis with counterexample {}", counterexample.word());

        let new_prefixes = counterexample
            .word()
            .prefixes(false)
            .filter(|prefix| !self.table.is_short_prefix(prefix))
            .collect_vec();
        for prefix in &new_prefixes {
            self.table.add_short_prefix(prefix.clone());
        }
        self.table.remove_short_prefixes_from_long();
        for prefix in &new_prefixes {
            for symbol in self.alphabet.symbols() {
                let candidate = prefix.append(symbol);
                if !self.table.is_short_prefix(&candidate) {
                    self.table.add_long_prefix(candidate);
                }
            }
        }

        self.fill_table()?;
        self.make_closed_and_consistent()?;
        Ok(true)
    }
}
