use itertools::Itertools;

use crate::{alphabet::Symbol, Show};

/// A finite word over symbols of type `S`, in essence simply a sequence of
/// symbols. Words are immutable; all operations that extend a word return a
/// new one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Word<S>(Vec<S>);

impl<S> Word<S> {
    /// Creates an instance of the empty word ε.
    pub fn epsilon() -> Self {
        Self(vec![])
    }

    /// Takes in a single symbol and returns a word containing only that symbol.
    pub fn letter(symbol: S) -> Self {
        Self(vec![symbol])
    }
}

impl<S: Symbol> Word<S> {
    /// Returns an iterator over the symbols of the word.
    pub fn symbols(&self) -> impl Iterator<Item = S> + '_ {
        self.0.iter().copied()
    }

    /// Returns a new word that extends `self` by the given symbol.
    pub fn append(&self, symbol: S) -> Self {
        let mut symbols = self.0.clone();
        symbols.push(symbol);
        Self(symbols)
    }

    /// Returns the concatenation of `self` and `other`.
    pub fn concat(&self, other: &Self) -> Self {
        Self(self.symbols().chain(other.symbols()).collect())
    }

    /// Returns an iterator over the prefixes of `self` in order of increasing
    /// length, up to and including `self` itself. The empty word is part of
    /// the iteration precisely if `include_empty` is set.
    pub fn prefixes(&self, include_empty: bool) -> impl Iterator<Item = Word<S>> + '_ {
        let start = if include_empty { 0 } else { 1 };
        (start..=self.0.len()).map(|length| Self(self.0[..length].to_vec()))
    }
}

impl<S> std::ops::Deref for Word<S> {
    type Target = Vec<S>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> From<Vec<S>> for Word<S> {
    fn from(symbols: Vec<S>) -> Self {
        Self(symbols)
    }
}

impl<S> FromIterator<S> for Word<S> {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&str> for Word<char> {
    fn from(value: &str) -> Self {
        Self(value.chars().collect())
    }
}

impl<S: Symbol> std::fmt::Display for Word<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "ε")
        } else {
            write!(f, "{}", self.0.iter().map(|symbol| symbol.show()).join(""))
        }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Word<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0.iter().map(|symbol| format!("{:?}", symbol)).join("")
        )
    }
}

impl<S: Ord> Ord for Word<S> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl<S: Ord> PartialOrd for Word<S> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::Word;
    use itertools::Itertools;

    #[test]
    fn extension_and_concatenation() {
        let word: Word<char> = "ab".into();
        assert_eq!(word.append('c'), "abc".into());
        assert_eq!(word.concat(&"ba".into()), "abba".into());
        assert_eq!(word.len(), 2);
        assert!(Word::<char>::epsilon().is_empty());
    }

    #[test]
    fn prefixes_in_increasing_length() {
        let word: Word<char> = "abc".into();
        assert_eq!(
            word.prefixes(true).collect_vec(),
            vec!["".into(), "a".into(), "ab".into(), "abc".into()]
        );
        assert_eq!(
            word.prefixes(false).collect_vec(),
            vec!["a".into(), "ab".into(), "abc".into()]
        );
    }

    #[test]
    fn length_lexicographic_order() {
        let mut words: Vec<Word<char>> = vec!["ba".into(), "b".into(), "ab".into(), "".into()];
        words.sort();
        assert_eq!(
            words,
            vec!["".into(), "b".into(), "ab".into(), "ba".into()]
        );
    }

    #[test]
    fn display_uses_epsilon() {
        assert_eq!(Word::<char>::epsilon().to_string(), "ε");
        assert_eq!(Word::from("ab").to_string(), "ab");
    }
}
