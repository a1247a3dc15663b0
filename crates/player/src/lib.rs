//! Gambit Player - session client for realtime two-player games.
//!
//! ## Structure
//!
//! - `application/` - identity store, protocol state machine, reconciliation
//! - `ports/` - what the session needs from the board UI, platform and transport
//! - `infrastructure/` - WebSocket client, handle stores, headless view
//! - `runner` - session driver tying the pieces together
//! - `config` - environment configuration

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod runner;


pub use application::identity::IdentityStore;
pub use application::session::{MoveAttempt, Phase, SessionHandle, SessionMachine, SessionState};
pub use config::PlayerConfig;
pub use infrastructure::websocket::GameClient;
pub use runner::{PlayerIntent, SessionDeps, SessionDriver};
