//! Editor states and the allowed-transitions table

use crate::error::EditorError;
use std::fmt;

/// Editor state, with failure details where they exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    /// No active site
    Empty,
    /// Initial generation in flight
    Generating,
    /// Active site, nothing pending
    Ready,
    /// Active site, a persist is pending or running
    Saving,
    /// AI edit in flight
    AiEditing,
    /// Last generation failed
    GenerationFailed {
        /// Error shown to the user
        message: String,
    },
    /// Last AI edit failed; the document is untouched
    AiEditFailed {
        /// Instruction kept for retry
        instruction: String,
        /// Error shown to the user
        message: String,
    },
}

impl EditorState {
    /// Payload-free discriminant
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Empty => Phase::Empty,
            Self::Generating => Phase::Generating,
            Self::Ready => Phase::Ready,
            Self::Saving => Phase::Saving,
            Self::AiEditing => Phase::AiEditing,
            Self::GenerationFailed { .. } => Phase::GenerationFailed,
            Self::AiEditFailed { .. } => Phase::AiEditFailed,
        }
    }

    /// Check if a model request is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Generating | Self::AiEditing)
    }

    /// Check if an active site can be edited, saved or published
    #[inline]
    #[must_use]
    pub fn has_site(&self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Saving | Self::AiEditing | Self::AiEditFailed { .. }
        )
    }
}

/// [`EditorState`] without payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Empty,
    Generating,
    Ready,
    Saving,
    AiEditing,
    GenerationFailed,
    AiEditFailed,
}

impl Phase {
    /// Every phase
    pub const ALL: [Phase; 7] = [
        Phase::Empty,
        Phase::Generating,
        Phase::Ready,
        Phase::Saving,
        Phase::AiEditing,
        Phase::GenerationFailed,
        Phase::AiEditFailed,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Phases reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: Phase) -> Vec<Phase> {
    use Phase::*;
    match from {
        Empty => vec![Generating, Ready],
        Generating => vec![Ready, GenerationFailed, Empty],
        GenerationFailed => vec![Generating, Empty],
        Ready => vec![Saving, AiEditing, Empty],
        Saving => vec![Ready, Saving, AiEditing, Empty],
        AiEditing => vec![Saving, AiEditFailed, Empty],
        AiEditFailed => vec![AiEditing, Saving, Ready, Empty],
    }
}

/// Validate a single transition
///
/// # Errors
/// `EditorError::InvalidTransition` if `to` is not reachable from `from`
pub fn validate_transition(from: Phase, to: Phase) -> Result<(), EditorError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(EditorError::InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn phase() -> impl Strategy<Value = Phase> {
        proptest::sample::select(Phase::ALL.to_vec())
    }

    #[test]
    fn every_phase_can_return_to_empty() {
        for from in Phase::ALL {
            if from != Phase::Empty {
                assert!(validate_transition(from, Phase::Empty).is_ok(), "{from}");
            }
        }
    }

    #[test]
    fn ai_edit_needs_an_active_site() {
        assert!(validate_transition(Phase::Empty, Phase::AiEditing).is_err());
        assert!(validate_transition(Phase::Generating, Phase::AiEditing).is_err());
        assert!(validate_transition(Phase::GenerationFailed, Phase::AiEditing).is_err());
    }

    #[test]
    fn failed_edit_is_reenterable() {
        assert!(validate_transition(Phase::AiEditFailed, Phase::AiEditing).is_ok());
        assert!(validate_transition(Phase::GenerationFailed, Phase::Generating).is_ok());
    }

    proptest! {
        #[test]
        fn validation_agrees_with_table(from in phase(), to in phase()) {
            let listed = allowed_transitions(from).contains(&to);
            prop_assert_eq!(validate_transition(from, to).is_ok(), listed);
        }

        #[test]
        fn every_phase_is_reachable_from_empty(target in phase()) {
            let mut seen = vec![Phase::Empty];
            let mut frontier = vec![Phase::Empty];
            while let Some(p) = frontier.pop() {
                for next in allowed_transitions(p) {
                    if !seen.contains(&next) {
                        seen.push(next);
                        frontier.push(next);
                    }
                }
            }
            prop_assert!(seen.contains(&target));
        }
    }
}
