#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

use std::{fmt::Debug, hash::Hash};

/// Module that contains definitions for dealing with alphabets.
pub mod alphabet;

/// Deterministic finite automata over an [`alphabet::Alphabet`], the output
/// type of the learner.
pub mod dfa;

/// The error taxonomy of the learner.
pub mod error;

mod hypothesis;

/// The L* learner itself.
pub mod learner;

/// This module contains some definitions of mathematical objects which are used
/// throughout the crate and do not really fit to the top level.
pub mod math;

/// The boundary towards the minimally adequate teacher: batched membership
/// queries and counterexamples.
pub mod oracle;

mod show;
pub use show::Show;

/// The observation table data structure driving the learner.
pub mod table;

/// Finite words over the symbols of an alphabet.
pub mod word;

/// An output that can be stored in a cell of an observation table. For learning
/// a [`dfa::DFA`] this is just `bool`, but the table itself works for any type
/// of output that can be compared, hashed and displayed.
pub trait Observation: Clone + Eq + Hash + Debug + Show {}
impl<D: Clone + Eq + Hash + Debug + Show> Observation for D {}

/// The prelude is supposed to make using this package easier. Including
/// everything, i.e. `use lstar::prelude::*;` should be enough to use the crate.
pub mod prelude {
    pub use crate::alphabet::{Alphabet, CharAlphabet, Symbol, SymbolOf};
    pub use crate::dfa::{StateIndex, DFA};
    pub use crate::error::LearnerError;
    pub use crate::learner::LStar;
    pub use crate::math;
    pub use crate::oracle::{
        Counterexample, DFAOracle, MembershipOracle, OracleError, PredicateOracle, Query,
    };
    pub use crate::table::{Inconsistency, ObservationTable, RowSignature};
    pub use crate::word::Word;
    pub use crate::{Observation, Show};
}
