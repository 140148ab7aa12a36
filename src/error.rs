use thiserror::Error;

use crate::oracle::OracleError;

/// Abstracts the ways in which a call on the learner can fail. Anything that
/// is not covered here, for example looking up the row of a prefix that was
/// never added to the observation table, is a bug in the learner itself and
/// leads to a panic instead.
#[derive(Debug, Error)]
pub enum LearnerError {
    /// The learner's operations were invoked in the wrong order, for example
    /// [`crate::learner::LStar::start_learning`] was called twice. The learner
    /// state is unchanged by the offending call.
    #[error("invalid lifecycle: {0}")]
    InvalidLifecycle(&'static str),
    /// The supplied counterexample does not actually contradict the current
    /// hypothesis, refining with it would not make progress.
    #[error("the counterexample does not contradict the current hypothesis")]
    InvalidCounterexample,
    /// The membership oracle returned successfully but did not answer every
    /// query it was given.
    #[error("the membership oracle left a query unanswered")]
    UnansweredQuery,
    /// The membership oracle itself failed. The observation table is left in
    /// the state it had before the batch was posed.
    #[error("membership oracle failed: {0}")]
    Oracle(OracleError),
}
