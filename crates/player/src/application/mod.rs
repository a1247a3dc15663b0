//! Application layer - session logic independent of transport and UI

pub mod identity;
pub mod session;
