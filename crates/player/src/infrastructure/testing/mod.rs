//! Test doubles shared across unit and end-to-end tests.

#[cfg(test)]
mod recording_view;

#[cfg(test)]
pub use recording_view::{RecordingBoardView, ViewCall};
