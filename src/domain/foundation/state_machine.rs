//! Shared transition checking for lifecycle enums.

use super::ValidationError;

/// A status enum with an explicit set of allowed moves.
///
/// Implementors list their outgoing edges once; `transition_to` turns a
/// disallowed move into `ValidationError::InvalidTransition`.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// States reachable in one step from `self`.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns `target` if the move is allowed.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        Err(ValidationError::InvalidTransition {
            from: format!("{:?}", self),
            to: format!("{:?}", target),
        })
    }

    /// True when no move leaves this state.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Red,
        Green,
        Broken,
    }

    impl StateMachine for Light {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Light::Red => vec![Light::Green, Light::Broken],
                Light::Green => vec![Light::Red, Light::Broken],
                Light::Broken => vec![],
            }
        }
    }

    #[test]
    fn allowed_move_returns_target() {
        assert_eq!(Light::Red.transition_to(Light::Green), Ok(Light::Green));
    }

    #[test]
    fn disallowed_move_names_both_states() {
        let err = Light::Broken.transition_to(Light::Red).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidTransition {
                from: "Broken".to_string(),
                to: "Red".to_string(),
            }
        );
    }

    #[test]
    fn state_without_moves_is_terminal() {
        assert!(Light::Broken.is_terminal());
        assert!(!Light::Green.is_terminal());
    }
}
