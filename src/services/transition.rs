//! Pure vote transition rules.
//!
//! Given the voter's current state and the requested direction, decide the
//! next state and the exact signed delta the content score must absorb. The
//! aggregate is maintained incrementally from these deltas alone and is never
//! recomputed from a scan of the vote rows.

use crate::models::Vote;

/// Outcome of one transition: the state to persist (`None` deletes the
/// record) and the delta to apply to the content score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: Option<Vote>,
    pub delta: i64,
}

/// Casting rules. Requesting the already-active direction toggles the vote
/// off; requesting the opposite direction switches in one step, without an
/// observable pass through "none".
pub fn next(current: Option<Vote>, requested: Vote) -> Transition {
    match (current, requested) {
        (None, Vote::Up) => Transition {
            next: Some(Vote::Up),
            delta: 1,
        },
        (None, Vote::Down) => Transition {
            next: Some(Vote::Down),
            delta: -1,
        },
        (Some(Vote::Up), Vote::Up) => Transition {
            next: None,
            delta: -1,
        },
        (Some(Vote::Down), Vote::Down) => Transition {
            next: None,
            delta: 1,
        },
        (Some(Vote::Up), Vote::Down) => Transition {
            next: Some(Vote::Down),
            delta: -2,
        },
        (Some(Vote::Down), Vote::Up) => Transition {
            next: Some(Vote::Up),
            delta: 2,
        },
    }
}

/// Explicit removal. Clearing an absent vote is a no-op, never an error.
pub fn clear(current: Option<Vote>) -> Transition {
    Transition {
        next: None,
        delta: current.map(|v| -v.value()).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_from_none_creates_vote() {
        assert_eq!(
            next(None, Vote::Up),
            Transition {
                next: Some(Vote::Up),
                delta: 1
            }
        );
        assert_eq!(
            next(None, Vote::Down),
            Transition {
                next: Some(Vote::Down),
                delta: -1
            }
        );
    }

    #[test]
    fn repeating_active_direction_toggles_off() {
        assert_eq!(
            next(Some(Vote::Up), Vote::Up),
            Transition {
                next: None,
                delta: -1
            }
        );
        assert_eq!(
            next(Some(Vote::Down), Vote::Down),
            Transition {
                next: None,
                delta: 1
            }
        );
    }

    #[test]
    fn opposite_direction_switches_in_one_step() {
        assert_eq!(
            next(Some(Vote::Up), Vote::Down),
            Transition {
                next: Some(Vote::Down),
                delta: -2
            }
        );
        assert_eq!(
            next(Some(Vote::Down), Vote::Up),
            Transition {
                next: Some(Vote::Up),
                delta: 2
            }
        );
    }

    #[test]
    fn clear_undoes_current_vote() {
        assert_eq!(
            clear(Some(Vote::Up)),
            Transition {
                next: None,
                delta: -1
            }
        );
        assert_eq!(
            clear(Some(Vote::Down)),
            Transition {
                next: None,
                delta: 1
            }
        );
    }

    #[test]
    fn clear_of_none_is_noop() {
        assert_eq!(
            clear(None),
            Transition {
                next: None,
                delta: 0
            }
        );
    }

    #[test]
    fn double_cast_nets_to_zero() {
        for requested in [Vote::Up, Vote::Down] {
            let first = next(None, requested);
            let second = next(first.next, requested);
            assert_eq!(second.next, None);
            assert_eq!(first.delta + second.delta, 0);
        }
    }

    #[test]
    fn cast_then_clear_matches_double_cast() {
        for requested in [Vote::Up, Vote::Down] {
            let cast = next(None, requested);
            let cleared = clear(cast.next);
            assert_eq!(cleared.next, None);
            assert_eq!(cast.delta + cleared.delta, 0);
        }
    }

    #[test]
    fn delta_always_matches_state_difference() {
        let states = [None, Some(Vote::Up), Some(Vote::Down)];
        let value = |s: Option<Vote>| s.map(Vote::value).unwrap_or(0);
        for current in states {
            for requested in [Vote::Up, Vote::Down] {
                let t = next(current, requested);
                assert_eq!(t.delta, value(t.next) - value(current));
            }
            let t = clear(current);
            assert_eq!(t.delta, value(t.next) - value(current));
        }
    }
}
