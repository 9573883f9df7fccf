//! Match outcomes and propagation signals.

/// Result of offering one occurrence to a waiter's match routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<T> {
    /// The occurrence matched; the wait resolves with this value.
    Resolved(T),
    /// Not a match. The wait stays outstanding and the occurrence keeps
    /// flowing to later listeners.
    Rejected,
    /// Not a match, and this waiter asks to stop the occurrence here.
    ///
    /// Only honoured by the pipeline when the waiter also blocks propagation.
    RejectedStopPropagation,
}

impl<T> MatchOutcome<T> {
    /// Whether the occurrence matched.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The resolved value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Rejected | Self::RejectedStopPropagation => None,
        }
    }

    /// Transform the resolved value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MatchOutcome<U> {
        match self {
            Self::Resolved(value) => MatchOutcome::Resolved(f(value)),
            Self::Rejected => MatchOutcome::Rejected,
            Self::RejectedStopPropagation => MatchOutcome::RejectedStopPropagation,
        }
    }

    /// The value-free signal reported back to the pipeline.
    pub fn propagation(&self) -> Propagation {
        match self {
            Self::Resolved(_) => Propagation::Accepted,
            Self::Rejected => Propagation::Rejected,
            Self::RejectedStopPropagation => Propagation::RejectedStopPropagation,
        }
    }
}

impl<T> From<Option<T>> for MatchOutcome<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Resolved(value),
            None => Self::Rejected,
        }
    }
}

/// What a listener reports to the pipeline after seeing an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// The listener consumed the occurrence.
    Accepted,
    /// The listener ignored the occurrence.
    Rejected,
    /// The listener ignored the occurrence and asks to stop it here.
    RejectedStopPropagation,
}

impl Propagation {
    /// Whether later listeners must be skipped, given the listener's
    /// `block_propagation` flag.
    pub fn blocks(self, block_propagation: bool) -> bool {
        block_propagation && !matches!(self, Self::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_option() {
        assert_eq!(MatchOutcome::from(Some(3)), MatchOutcome::Resolved(3));
        assert_eq!(MatchOutcome::<i32>::from(None), MatchOutcome::Rejected);
    }

    #[test]
    fn test_outcome_propagation() {
        assert_eq!(MatchOutcome::Resolved(()).propagation(), Propagation::Accepted);
        assert_eq!(
            MatchOutcome::<()>::RejectedStopPropagation.propagation(),
            Propagation::RejectedStopPropagation
        );
        assert_eq!(MatchOutcome::Resolved(2).map(|v| v * 2).into_value(), Some(4));
        assert!(!MatchOutcome::<()>::Rejected.is_resolved());
    }

    #[test]
    fn test_blocks_requires_flag() {
        assert!(!Propagation::Accepted.blocks(false));
        assert!(!Propagation::RejectedStopPropagation.blocks(false));
        assert!(Propagation::Accepted.blocks(true));
        assert!(Propagation::RejectedStopPropagation.blocks(true));
        assert!(!Propagation::Rejected.blocks(true));
    }
}
