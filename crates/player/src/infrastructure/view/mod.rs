//! Terminal-side stand-ins for the board UI.

mod log_view;
mod orientation;

pub use log_view::LogBoardView;
pub use orientation::FixedOrientation;
