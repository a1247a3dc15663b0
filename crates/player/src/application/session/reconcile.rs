//! Reconciliation of inbound snapshots against the local one.
//!
//! The engine echoes every move back to both seats, including the mover.
//! Positions are compared by exact equality, so an echo of a move that was
//! already applied locally changes nothing and does not flip the turn.

use gambit_shared::Position;

/// How the turn flag follows an inbound snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRule {
    /// A new position means the other side moved; the turn flips
    Alternate,
    /// The message says outright whether the local player is on the move
    Owner(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnChange {
    Keep,
    Flip,
    Set(bool),
}

impl TurnChange {
    pub fn apply_to(self, my_turn: bool) -> bool {
        match self {
            TurnChange::Keep => my_turn,
            TurnChange::Flip => !my_turn,
            TurnChange::Set(value) => value,
        }
    }
}

/// Outcome of comparing an inbound snapshot with the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// Replace the local snapshot (and re-render)
    pub apply: bool,
    pub turn: TurnChange,
}

pub fn reconcile(
    current: Option<&Position>,
    incoming: &Position,
    rule: TurnRule,
) -> Reconciliation {
    let changed = current != Some(incoming);
    let turn = match rule {
        TurnRule::Owner(mine) => TurnChange::Set(mine),
        TurnRule::Alternate if changed => TurnChange::Flip,
        TurnRule::Alternate => TurnChange::Keep,
    };
    Reconciliation {
        apply: changed,
        turn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_of_applied_move_is_a_no_op() {
        let p = Position::from("p1");
        let outcome = reconcile(Some(&p), &p, TurnRule::Alternate);
        assert_eq!(
            outcome,
            Reconciliation {
                apply: false,
                turn: TurnChange::Keep
            }
        );
    }

    #[test]
    fn new_position_applies_and_flips() {
        let outcome = reconcile(
            Some(&Position::from("p1")),
            &Position::from("p2"),
            TurnRule::Alternate,
        );
        assert!(outcome.apply);
        assert_eq!(outcome.turn, TurnChange::Flip);
        assert!(outcome.turn.apply_to(false));
    }

    #[test]
    fn first_snapshot_always_applies() {
        let outcome = reconcile(None, &Position::initial(), TurnRule::Owner(true));
        assert!(outcome.apply);
        assert_eq!(outcome.turn, TurnChange::Set(true));
    }

    #[test]
    fn owner_rule_sets_turn_even_when_position_matches() {
        let p = Position::from("p1");
        let outcome = reconcile(Some(&p), &p, TurnRule::Owner(false));
        assert!(!outcome.apply);
        assert!(!outcome.turn.apply_to(true));
    }
}
