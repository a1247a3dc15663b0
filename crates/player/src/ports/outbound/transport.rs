use anyhow::Result;

/// Fire-and-forget outbound path for encoded frames.
///
/// Implemented by the WebSocket client. Fails when no connection is open;
/// frames are never queued across reconnects.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSink: Send + Sync {
    fn send_frame(&self, frame: String) -> Result<()>;
}
