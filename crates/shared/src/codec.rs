//! Newline-delimited frame codec.
//!
//! A single transport message may carry several envelopes separated by `\n`
//! (the engine batches queued messages into one write). Decoding is tolerant:
//! a frame that fails to parse, parses to `null`, or violates the protocol is
//! dropped and logged, and the remaining frames are still returned.

use serde::Serialize;

use crate::error::ProtocolError;
use crate::messages::Envelope;

const FRAME_SEPARATOR: char = '\n';

/// Decode a single frame.
///
/// Returns `Ok(None)` for blank frames and JSON `null`, which carry nothing
/// and are dropped silently.
pub fn decode_frame<T>(frame: &str) -> Result<Option<T>, ProtocolError>
where
    T: TryFrom<Envelope, Error = ProtocolError>,
{
    let frame = frame.trim();
    if frame.is_empty() {
        return Ok(None);
    }

    let envelope: Option<Envelope> =
        serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    match envelope {
        Some(envelope) => T::try_from(envelope).map(Some),
        None => Ok(None),
    }
}

/// Decode every frame in a transport message, in order, skipping bad ones.
pub fn decode_batch<T>(batch: &str) -> Vec<T>
where
    T: TryFrom<Envelope, Error = ProtocolError>,
{
    batch
        .split(FRAME_SEPARATOR)
        .enumerate()
        .filter_map(|(index, frame)| match decode_frame(frame) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(frame_index = index, error = %e, "Dropping inbound frame");
                None
            }
        })
        .collect()
}

/// Encode one envelope as a single frame.
pub fn encode<T: Serialize>(message: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Encode several envelopes into one newline-delimited transport message.
pub fn encode_batch<T: Serialize>(messages: &[T]) -> Result<String, ProtocolError> {
    let frames = messages
        .iter()
        .map(encode)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(frames.join("\n"))
}
