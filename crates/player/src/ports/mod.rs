//! Ports layer - interfaces the session client needs from its surroundings

pub mod outbound;
