//! Error taxonomy for the synchronization layer
//!
//! Topology errors abort before initialization; everything else is a
//! collective failure and aborts the whole run; partial recovery is
//! meaningless in a barrier-synchronized system, so none is attempted.

use std::fmt;

#[derive(Debug)]
pub enum ClusterError {
    /// Invalid (rank, world_size) pair; rejected before INIT.
    Topology { rank: usize, world_size: usize },
    /// Transport failure during a collective.
    Io(std::io::Error),
    /// A frame could not be encoded or decoded.
    Codec(bincode::Error),
    /// A peer sent something the protocol does not allow here.
    Protocol(String),
    /// A peer's connection closed mid-collective.
    PeerDisconnected { rank: usize },
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterError::Topology { rank, world_size } => {
                write!(f, "invalid topology: rank {rank} of {world_size} processes")
            }
            ClusterError::Io(e) => write!(f, "collective transport error: {e}"),
            ClusterError::Codec(e) => write!(f, "frame encoding error: {e}"),
            ClusterError::Protocol(msg) => write!(f, "protocol violation: {msg}"),
            ClusterError::PeerDisconnected { rank } => {
                write!(f, "peer rank {rank} disconnected mid-collective")
            }
        }
    }
}

impl std::error::Error for ClusterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClusterError::Io(e) => Some(e),
            ClusterError::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClusterError {
    fn from(e: std::io::Error) -> Self {
        ClusterError::Io(e)
    }
}

impl From<bincode::Error> for ClusterError {
    fn from(e: bincode::Error) -> Self {
        ClusterError::Codec(e)
    }
}
