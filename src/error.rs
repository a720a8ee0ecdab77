//! Error types surfaced by the automaton kernel.

/// Error type for automaton construction and queries.
///
/// Two families of failures surface here: invalid input (out-of-range
/// states or symbols, an operation that requires a deterministic
/// automaton receiving a non-deterministic one, an unsupported edit
/// distance) and build-protocol violations (transitions added to a
/// state that has already been finished).
///
/// Internal contract violations — a non-empty live set at the end of a
/// determinizer subset, a multiset decrement of an absent value — are
/// implementation bugs, not caller errors, and abort via `assert!`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutomatonError {
    /// A state number does not exist in the automaton.
    #[error("state {state} is out of range (automaton has {num_states} states)")]
    StateOutOfRange {
        /// The offending state number.
        state: i32,
        /// The number of states in the automaton.
        num_states: i32,
    },

    /// A symbol falls outside `[0, alpha_max]`.
    #[error("symbol {symbol} is out of range (alphabet maximum is {alpha_max})")]
    SymbolOutOfRange {
        /// The offending symbol.
        symbol: i32,
        /// The inclusive alphabet ceiling.
        alpha_max: i32,
    },

    /// A transition interval has `min > max`.
    #[error("invalid transition interval [{min}, {max}]")]
    InvalidRange {
        /// Interval lower bound.
        min: i32,
        /// Interval upper bound.
        max: i32,
    },

    /// The build protocol was violated: a transition was added to a
    /// state after that state was implicitly or explicitly finished.
    #[error("cannot add a transition to state {state}: it has already been finished")]
    TransitionAfterFinish {
        /// The state whose transition list was already finished.
        state: i32,
    },

    /// An operation that requires deterministic input received a
    /// non-deterministic automaton.
    #[error("operation requires a deterministic automaton")]
    NondeterministicInput,

    /// A Levenshtein automaton was requested for a distance above
    /// [`MAXIMUM_SUPPORTED_DISTANCE`](crate::levenshtein::MAXIMUM_SUPPORTED_DISTANCE).
    #[error("edit distance {n} is not supported (maximum is 2)")]
    DistanceTooLarge {
        /// The requested distance.
        n: u32,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AutomatonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AutomatonError::StateOutOfRange {
            state: 7,
            num_states: 3,
        };
        assert_eq!(
            err.to_string(),
            "state 7 is out of range (automaton has 3 states)"
        );

        let err = AutomatonError::DistanceTooLarge { n: 3 };
        assert_eq!(err.to_string(), "edit distance 3 is not supported (maximum is 2)");
    }
}
