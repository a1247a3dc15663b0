//! Outbound ports - what the session needs from the board UI, the platform
//! and the transport.

mod board_view;
mod platform;
mod transport;

pub use board_view::{BoardView, ViewNotice};
pub use platform::{handle_keys, HandleStore, OrientationChooser};
pub use transport::FrameSink;

#[cfg(test)]
pub use board_view::MockBoardView;
#[cfg(test)]
pub use platform::{MockHandleStore, MockOrientationChooser};
#[cfg(test)]
pub use transport::MockFrameSink;
