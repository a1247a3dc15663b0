use gambit_shared::Orientation;

use crate::ports::outbound::OrientationChooser;

/// Orientation fixed up front (config), or left open.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOrientation(pub Option<Orientation>);

impl OrientationChooser for FixedOrientation {
    fn selected(&self) -> Option<Orientation> {
        self.0
    }
}
