//! Wire format for cluster collectives
//!
//! Every message is a length-prefixed frame: a little-endian `u32` byte
//! count followed by the bincode encoding of a [`Frame`]. Bincode's
//! default configuration writes fixed-width little-endian integers, so
//! a `Body` always crosses the wire as seven 8-byte words regardless of
//! the compiler or platform that produced it.
//!
//! Reads are capped at [`MAX_FRAME_BYTES`] so a corrupt length prefix
//! cannot trigger an unbounded allocation.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::cluster::error::ClusterError;
use crate::simulation::states::Body;

/// Upper bound on a single frame's payload (64 MiB, roughly a million
/// bodies, far beyond anything a direct N² simulation can step).
pub const MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

/// Everything that travels between ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Frame {
    /// Worker introduces itself to the root after connecting.
    Hello { rank: u32, world_size: u32 },
    /// A full, globally consistent body array (broadcast and the result
    /// of each exchange).
    Bodies { step: u64, bodies: Vec<Body> },
    /// One rank's updated slice, starting at global index `start`.
    Slice {
        step: u64,
        start: u64,
        bodies: Vec<Body>,
    },
}

/// Encode a frame to its payload bytes (no length prefix).
pub fn encode(frame: &Frame) -> Result<Vec<u8>, ClusterError> {
    Ok(bincode::serialize(frame)?)
}

/// Write one already-encoded payload with its length prefix.
///
/// Split from [`write_frame`] so the root can serialize an assembled
/// array once and fan the same bytes out to every peer.
pub fn write_encoded<W: Write>(w: &mut W, payload: &[u8]) -> Result<(), ClusterError> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_BYTES)
        .ok_or_else(|| {
            ClusterError::Protocol(format!("frame of {} bytes exceeds the size cap", payload.len()))
        })?;

    w.write_all(&len.to_le_bytes())?;
    w.write_all(payload)?;
    w.flush()?;
    Ok(())
}

/// Encode and write one frame.
pub fn write_frame<W: Write>(w: &mut W, frame: &Frame) -> Result<(), ClusterError> {
    write_encoded(w, &encode(frame)?)
}

/// Read one frame, blocking until it is complete.
pub fn read_frame<R: Read>(r: &mut R) -> Result<Frame, ClusterError> {
    let mut len_bytes = [0u8; 4];
    r.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes);

    if len > MAX_FRAME_BYTES {
        return Err(ClusterError::Protocol(format!(
            "incoming frame claims {len} bytes, cap is {MAX_FRAME_BYTES}"
        )));
    }

    let mut payload = vec![0u8; len as usize];
    r.read_exact(&mut payload)?;

    Ok(bincode::deserialize(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::NVec3;

    #[test]
    fn frame_round_trip() {
        let frame = Frame::Slice {
            step: 7,
            start: 3,
            bodies: vec![Body {
                x: NVec3::new(1.0, -2.0, 3.5),
                v: NVec3::new(0.1, 0.0, -0.1),
                m: 1e20,
            }],
        };

        let mut buf = Vec::new();
        write_frame(&mut buf, &frame).unwrap();
        let decoded = read_frame(&mut buf.as_slice()).unwrap();

        assert_eq!(decoded, frame);
    }

    #[test]
    fn oversized_length_prefix_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_FRAME_BYTES + 1).to_le_bytes());
        buf.extend_from_slice(&[0u8; 16]);

        match read_frame(&mut buf.as_slice()) {
            Err(ClusterError::Protocol(_)) => {}
            other => panic!("expected protocol error, got {other:?}"),
        }
    }
}
