//! Shared constants for the WebSocket client.
//!
//! Kept free of tokio so the backoff math stays testable on its own.

// Reconnection constants
pub const INITIAL_RETRY_DELAY_MS: u64 = 1_000;
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Reported when the peer closed without sending a status code.
pub const NO_STATUS_RECEIVED: u16 = 1005;

/// Reported when the socket died without a close frame (read error or EOF).
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Outbound frames buffered per connection before `send` reports backpressure.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 32;

/// Connection events buffered before the reader waits on the driver.
pub const EVENT_QUEUE_CAPACITY: usize = 64;
