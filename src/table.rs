use itertools::Itertools;
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};
use tracing::trace;

use crate::{
    alphabet::{Alphabet, Symbol},
    math,
    word::Word,
    Observation, Show,
};

/// The signature of a row: the outputs of one prefix across all suffixes, in
/// suffix insertion order. Two prefixes with equal signatures are apparently
/// equivalent and end up in the same state of the hypothesis.
pub type RowSignature<D> = Vec<D>;

/// Witnesses a consistency violation: `left` and `right` are short prefixes
/// with equal row signatures whose one-symbol extensions by `symbol` disagree
/// on `suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency<S: Symbol> {
    /// The first of the two apparently equivalent short prefixes.
    pub left: Word<S>,
    /// The second of the two apparently equivalent short prefixes.
    pub right: Word<S>,
    /// The symbol on which the extensions of the two prefixes disagree.
    pub symbol: S,
    /// The suffix distinguishing the two extended rows.
    pub suffix: Word<S>,
}

impl<S: Symbol> Inconsistency<S> {
    /// The new suffix that repairs this inconsistency, i.e. `symbol · suffix`.
    /// Adding it to the table gives `left` and `right` distinct signatures.
    pub fn witness(&self) -> Word<S> {
        Word::letter(self.symbol).concat(&self.suffix)
    }
}

/// The central data structure of the L* algorithm. Rows are labelled by
/// prefixes, which come in two regions: the *short prefixes* represent
/// candidate states of the hypothesis, while the *long prefixes* are their
/// one-symbol extensions and determine the transitions. Columns are labelled
/// by suffixes; a cell holds the teacher's answer to the membership query
/// `prefix · suffix`.
///
/// The table only ever grows: prefixes and suffixes are never removed (though
/// a prefix may migrate from the long to the short region) and no cell is ever
/// erased. All iteration orders are insertion orders, which keeps every run
/// of the learner deterministic.
#[derive(Clone)]
pub struct ObservationTable<S: Symbol, D: Observation> {
    short: math::Set<Word<S>>,
    long: math::Set<Word<S>>,
    suffixes: math::Set<Word<S>>,
    rows: math::Map<Word<S>, math::Map<Word<S>, D>>,
}

impl<S: Symbol, D: Observation> ObservationTable<S, D> {
    /// Creates the initial table for the given alphabet: ε is the only short
    /// prefix, every single-symbol word is a long prefix and ε is the only
    /// suffix. No cells are filled in yet.
    pub fn new<A: Alphabet<Symbol = S>>(alphabet: &A) -> Self {
        let mut table = Self {
            short: math::Set::default(),
            long: math::Set::default(),
            suffixes: math::Set::default(),
            rows: math::Map::default(),
        };
        table.suffixes.insert(Word::epsilon());
        table.add_short_prefix(Word::epsilon());
        for symbol in alphabet.symbols() {
            table.add_long_prefix(Word::letter(symbol));
        }
        table
    }

    /// Returns an iterator over the short prefixes in insertion order.
    pub fn short_prefixes(&self) -> impl Iterator<Item = &Word<S>> + '_ {
        self.short.iter()
    }

    /// Returns an iterator over the long prefixes in insertion order.
    pub fn long_prefixes(&self) -> impl Iterator<Item = &Word<S>> + '_ {
        self.long.iter()
    }

    /// Returns an iterator over the suffixes in insertion order.
    pub fn suffixes(&self) -> impl Iterator<Item = &Word<S>> + '_ {
        self.suffixes.iter()
    }

    /// Whether the given word is a short prefix.
    pub fn is_short_prefix(&self, word: &Word<S>) -> bool {
        self.short.contains(word)
    }

    /// Whether the given word is a long prefix.
    pub fn is_long_prefix(&self, word: &Word<S>) -> bool {
        self.long.contains(word)
    }

    /// Inserts the given word into the short prefix region. Does nothing if it
    /// already is a short prefix. The word may simultaneously be a long
    /// prefix; callers that inject counterexample prefixes rely on this and
    /// resolve the overlap with [`Self::remove_short_prefixes_from_long`]
    /// right after.
    pub fn add_short_prefix(&mut self, prefix: Word<S>) {
        if self.short.contains(&prefix) {
            return;
        }
        trace!("adding short prefix {prefix}");
        self.rows.entry(prefix.clone()).or_default();
        self.short.insert(prefix);
    }

    /// Inserts the given word into the long prefix region. Does nothing if it
    /// already is a long prefix; panics if it is a short prefix.
    pub fn add_long_prefix(&mut self, prefix: Word<S>) {
        if self.long.contains(&prefix) {
            return;
        }
        assert!(
            !self.short.contains(&prefix),
            "{prefix} is already a short prefix"
        );
        trace!("adding long prefix {prefix}");
        self.rows.entry(prefix.clone()).or_default();
        self.long.insert(prefix);
    }

    /// Appends the given suffix to the column labels. Does nothing if it is
    /// already present.
    pub fn add_suffix(&mut self, suffix: Word<S>) {
        if self.suffixes.insert(suffix.clone()) {
            trace!("adding suffix {suffix}");
        }
    }

    /// Installs the output for the cell `(prefix, suffix)`. The prefix must
    /// have been added before and the suffix must be a column label.
    pub fn record(&mut self, prefix: &Word<S>, suffix: &Word<S>, output: D) {
        debug_assert!(
            self.suffixes.contains(suffix),
            "{suffix} is not a column label"
        );
        let row = self
            .rows
            .get_mut(prefix)
            .unwrap_or_else(|| panic!("{prefix} is not a row label"));
        row.insert(suffix.clone(), output);
    }

    /// The output stored in the cell `(prefix, suffix)`, if any.
    pub fn cell(&self, prefix: &Word<S>, suffix: &Word<S>) -> Option<&D> {
        self.rows.get(prefix)?.get(suffix)
    }

    /// The row signature of the given prefix, or `None` if the word is not a
    /// row label. Panics if the row has an unfilled cell, since signatures of
    /// partially populated rows are meaningless.
    pub fn row(&self, prefix: &Word<S>) -> Option<RowSignature<D>> {
        let row = self.rows.get(prefix)?;
        Some(
            self.suffixes
                .iter()
                .map(|suffix| {
                    row.get(suffix)
                        .unwrap_or_else(|| {
                            panic!("row of {prefix} has no value for suffix {suffix}")
                        })
                        .clone()
                })
                .collect(),
        )
    }

    /// Returns an iterator over the short prefixes paired with their row
    /// signatures, in insertion order.
    pub fn short_prefix_rows(&self) -> impl Iterator<Item = (&Word<S>, RowSignature<D>)> + '_ {
        self.short.iter().map(|prefix| {
            let signature = self
                .row(prefix)
                .expect("short prefixes always have a row");
            (prefix, signature)
        })
    }

    /// Whether every cell of the table is filled in. Closedness and
    /// consistency are only meaningful on a complete table.
    pub fn is_complete(&self) -> bool {
        let columns = self.suffixes.len();
        self.short
            .iter()
            .chain(self.long.iter())
            .all(|prefix| self.rows.get(prefix).is_some_and(|row| row.len() == columns))
    }

    /// Whether every long prefix row signature also appears as a short prefix
    /// row signature.
    pub fn is_closed(&self) -> bool {
        self.find_unclosed().is_none()
    }

    /// Returns the first long prefix, in insertion order, whose row signature
    /// does not appear among the short prefix rows. Promoting that prefix is
    /// the canonical step towards closing the table.
    pub fn find_unclosed(&self) -> Option<Word<S>> {
        let short_signatures: math::Set<RowSignature<D>> = self
            .short
            .iter()
            .map(|prefix| {
                self.row(prefix)
                    .expect("short prefixes always have a row")
            })
            .collect();
        self.long
            .iter()
            .find(|prefix| {
                let signature = self
                    .row(prefix)
                    .expect("long prefixes always have a row");
                !short_signatures.contains(&signature)
            })
            .cloned()
    }

    /// Moves the given word from the long to the short prefix region,
    /// appending it to the short prefix order. Panics if the word is not a
    /// long prefix.
    pub fn move_long_to_short(&mut self, prefix: &Word<S>) {
        assert!(
            self.long.shift_remove(prefix),
            "{prefix} is not a long prefix"
        );
        trace!("promoting {prefix} to a short prefix");
        self.short.insert(prefix.clone());
    }

    /// Drops every long prefix that is also a short prefix, resolving the
    /// overlap that counterexample injection creates.
    pub fn remove_short_prefixes_from_long(&mut self) {
        let Self { short, long, .. } = self;
        long.retain(|prefix| !short.contains(prefix));
    }

    /// Whether every pair of short prefixes with equal row signatures also has
    /// matching rows on all one-symbol extensions.
    pub fn is_consistent_with<A: Alphabet<Symbol = S>>(&self, alphabet: &A) -> bool {
        self.find_inconsistency(alphabet).is_none()
    }

    /// Searches for a consistency violation among the short prefixes. The
    /// search order is deterministic: prefix pairs in insertion order, then
    /// symbols in alphabet order, then suffixes in insertion order.
    pub fn find_inconsistency<A: Alphabet<Symbol = S>>(
        &self,
        alphabet: &A,
    ) -> Option<Inconsistency<S>> {
        let shorts = self.short.iter().collect_vec();
        for (position, left) in shorts.iter().enumerate() {
            let left_signature = self.row(left).expect("short prefixes always have a row");
            for right in &shorts[position + 1..] {
                if self.row(right).expect("short prefixes always have a row") != left_signature {
                    continue;
                }
                for symbol in alphabet.symbols() {
                    let left_extension = left.append(symbol);
                    let right_extension = right.append(symbol);
                    let left_row = self.row(&left_extension).unwrap_or_else(|| {
                        panic!("missing row for extension {left_extension}")
                    });
                    let right_row = self.row(&right_extension).unwrap_or_else(|| {
                        panic!("missing row for extension {right_extension}")
                    });
                    if left_row == right_row {
                        continue;
                    }
                    for (suffix, (left_output, right_output)) in self
                        .suffixes
                        .iter()
                        .zip(left_row.iter().zip(right_row.iter()))
                    {
                        if left_output != right_output {
                            return Some(Inconsistency {
                                left: (*left).clone(),
                                right: (*right).clone(),
                                symbol,
                                suffix: suffix.clone(),
                            });
                        }
                    }
                }
            }
        }
        None
    }
}

impl<S: Symbol, D: Observation> std::fmt::Display for ObservationTable<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = Builder::default();
        let mut header = vec![String::new()];
        header.extend(self.suffixes.iter().map(|suffix| suffix.to_string()));
        builder.push_record(header);

        for prefix in self.short.iter().chain(self.long.iter()) {
            let label = if self.short.contains(prefix) {
                prefix.to_string().bold().to_string()
            } else {
                prefix.to_string()
            };
            let row = self.rows.get(prefix).expect("every prefix has a row");
            let outputs = self
                .suffixes
                .iter()
                .map(|suffix| row.get(suffix).map(|output| output.show()).unwrap_or_default());
            builder.push_record(std::iter::once(label).chain(outputs));
        }

        let mut table = builder.build();
        table.with(Style::modern());
        write!(f, "{table}")
    }
}

impl<S: Symbol, D: Observation> std::fmt::Debug for ObservationTable<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::ObservationTable;
    use crate::{alphabet::CharAlphabet, word::Word};
    use itertools::Itertools;

    fn record_row(table: &mut ObservationTable<char, bool>, prefix: &str, outputs: &[bool]) {
        let prefix: Word<char> = prefix.into();
        let suffixes = table.suffixes().cloned().collect_vec();
        for (suffix, output) in suffixes.iter().zip(outputs) {
            table.record(&prefix, suffix, *output);
        }
    }

    #[test]
    fn seeding() {
        let alphabet = CharAlphabet::new(['a', 'b']);
        let table: ObservationTable<char, bool> = ObservationTable::new(&alphabet);
        assert_eq!(table.short_prefixes().collect_vec(), vec![&"".into()]);
        assert_eq!(
            table.long_prefixes().collect_vec(),
            vec![&"a".into(), &"b".into()]
        );
        assert_eq!(table.suffixes().collect_vec(), vec![&"".into()]);
        assert!(!table.is_complete());
    }

    #[test]
    fn idempotent_insertion() {
        let alphabet = CharAlphabet::new(['a']);
        let mut table: ObservationTable<char, bool> = ObservationTable::new(&alphabet);
        table.add_long_prefix("a".into());
        table.add_short_prefix("".into());
        table.add_suffix("".into());
        assert_eq!(table.long_prefixes().count(), 1);
        assert_eq!(table.short_prefixes().count(), 1);
        assert_eq!(table.suffixes().count(), 1);
    }

    #[test]
    #[should_panic(expected = "already a short prefix")]
    fn long_prefix_must_not_be_short() {
        let alphabet = CharAlphabet::new(['a']);
        let mut table: ObservationTable<char, bool> = ObservationTable::new(&alphabet);
        table.add_long_prefix("".into());
    }

    #[test]
    fn closedness_and_promotion() {
        // the language containing only the empty word, over {a}
        let alphabet = CharAlphabet::new(['a']);
        let mut table: ObservationTable<char, bool> = ObservationTable::new(&alphabet);
        record_row(&mut table, "", &[true]);
        record_row(&mut table, "a", &[false]);
        assert!(table.is_complete());
        assert!(!table.is_closed());
        assert_eq!(table.find_unclosed(), Some("a".into()));

        table.move_long_to_short(&"a".into());
        table.add_long_prefix("aa".into());
        record_row(&mut table, "aa", &[false]);
        assert!(table.is_closed());
        assert!(table.is_consistent_with(&alphabet));
        assert_eq!(
            table.short_prefixes().collect_vec(),
            vec![&"".into(), &"a".into()]
        );
    }

    #[test]
    fn unclosed_tie_break_follows_insertion_order() {
        let alphabet = CharAlphabet::new(['a', 'b']);
        let mut table: ObservationTable<char, bool> = ObservationTable::new(&alphabet);
        record_row(&mut table, "", &[false]);
        record_row(&mut table, "a", &[true]);
        record_row(&mut table, "b", &[true]);
        // both long prefixes are unmatched, the first inserted one wins
        assert_eq!(table.find_unclosed(), Some("a".into()));
    }

    #[test]
    fn inconsistency_witness() {
        // ε and a look equivalent on E = {ε} but their a-extensions differ
        let alphabet = CharAlphabet::new(['a']);
        let mut table: ObservationTable<char, bool> = ObservationTable::new(&alphabet);
        table.move_long_to_short(&"a".into());
        table.add_long_prefix("aa".into());
        record_row(&mut table, "", &[true]);
        record_row(&mut table, "a", &[true]);
        record_row(&mut table, "aa", &[false]);

        let inconsistency = table.find_inconsistency(&alphabet).unwrap();
        assert_eq!(inconsistency.left, "".into());
        assert_eq!(inconsistency.right, "a".into());
        assert_eq!(inconsistency.symbol, 'a');
        assert_eq!(inconsistency.suffix, "".into());
        assert_eq!(inconsistency.witness(), "a".into());
    }

    #[test]
    fn short_prefixes_leave_the_long_region() {
        let alphabet = CharAlphabet::new(['a', 'b']);
        let mut table: ObservationTable<char, bool> = ObservationTable::new(&alphabet);
        table.add_short_prefix("a".into());
        assert!(table.is_short_prefix(&"a".into()));
        assert!(table.is_long_prefix(&"a".into()));
        table.remove_short_prefixes_from_long();
        assert!(!table.is_long_prefix(&"a".into()));
        assert_eq!(table.long_prefixes().collect_vec(), vec![&"b".into()]);
    }

    #[test]
    fn suffixes_are_appended_in_order() {
        let alphabet = CharAlphabet::new(['a']);
        let mut table: ObservationTable<char, bool> = ObservationTable::new(&alphabet);
        table.add_suffix("a".into());
        table.add_suffix("aa".into());
        table.add_suffix("a".into());
        assert_eq!(
            table.suffixes().collect_vec(),
            vec![&"".into(), &"a".into(), &"aa".into()]
        );
    }

    #[test]
    fn rendering_marks_all_regions() {
        let alphabet = CharAlphabet::new(['a']);
        let mut table: ObservationTable<char, bool> = ObservationTable::new(&alphabet);
        record_row(&mut table, "", &[true]);
        record_row(&mut table, "a", &[false]);
        let rendered = table.to_string();
        assert!(rendered.contains('ε'));
        assert!(rendered.contains('+'));
        assert!(rendered.contains('-'));
    }
}
