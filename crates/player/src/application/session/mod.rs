//! Protocol session: lifecycle phases, the transition function and the
//! reconciliation rule it applies to inbound snapshots.
//!
//! The machine is pure. It consumes [`SessionEvent`]s and answers with
//! [`Effect`]s; performing those effects (sending frames, touching the
//! board, persisting the handle) is the driver's job.

mod events;
mod machine;
mod reconcile;
mod state;

pub use events::{is_clean_close, Effect, MoveAttempt, SessionEvent, ViewUpdate, NORMAL_CLOSURE};
pub use machine::{MoveRejection, SessionMachine};
pub use reconcile::{reconcile, Reconciliation, TurnChange, TurnRule};
pub use state::{Phase, SessionHandle, SessionState};
