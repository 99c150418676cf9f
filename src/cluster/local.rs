//! In-process cluster for tests and single-machine runs
//!
//! All ranks live in one process (one thread per rank) and share a
//! publication board: each rank writes its own slice under the mutex,
//! everyone meets at the barrier, then everyone copies the assembled
//! array back out. The write ranges are disjoint by construction, so
//! the mutex only serializes the bookkeeping, never resolves races.
//!
//! Collective semantics are identical to the TCP transport, which is
//! what makes cross-world determinism testable in-process.

use std::sync::{Arc, Barrier, Mutex, MutexGuard};

use crate::cluster::error::ClusterError;
use crate::cluster::topology::Topology;
use crate::cluster::Communicator;
use crate::simulation::partition::Partition;
use crate::simulation::states::Body;

struct Board {
    bodies: Mutex<Vec<Body>>,
    barrier: Barrier,
}

/// One rank's handle onto the shared in-process cluster.
pub struct LocalCluster {
    topology: Topology,
    board: Arc<Board>,
}

impl LocalCluster {
    /// Create a world of `world_size` ranks sharing one board. Hand one
    /// handle to each worker thread.
    pub fn spawn(world_size: usize) -> Result<Vec<Self>, ClusterError> {
        // Validates world_size > 0 before any handle exists.
        Topology::new(0, world_size)?;

        let board = Arc::new(Board {
            bodies: Mutex::new(Vec::new()),
            barrier: Barrier::new(world_size),
        });

        (0..world_size)
            .map(|rank| {
                Ok(Self {
                    topology: Topology::new(rank, world_size)?,
                    board: Arc::clone(&board),
                })
            })
            .collect()
    }

    fn lock_board(&self) -> Result<MutexGuard<'_, Vec<Body>>, ClusterError> {
        self.board
            .bodies
            .lock()
            .map_err(|_| ClusterError::Protocol("publication board poisoned by a panicked rank".into()))
    }
}

impl Communicator for LocalCluster {
    fn rank(&self) -> usize {
        self.topology.rank
    }

    fn world_size(&self) -> usize {
        self.topology.world_size
    }

    fn broadcast_bodies(&mut self, bodies: &mut Vec<Body>) -> Result<(), ClusterError> {
        if self.topology.is_root() {
            *self.lock_board()? = bodies.clone();
        }
        self.board.barrier.wait();

        if !self.topology.is_root() {
            *bodies = self.lock_board()?.clone();
        }
        // Nobody reuses the board until every rank has its copy.
        self.board.barrier.wait();
        Ok(())
    }

    fn exchange_slice(
        &mut self,
        _step: u64,
        slice: &[Body],
        partition: &Partition,
        bodies: &mut [Body],
    ) -> Result<(), ClusterError> {
        {
            let mut board = self.lock_board()?;
            if board.len() != bodies.len() {
                return Err(ClusterError::Protocol(format!(
                    "publication board holds {} bodies, exchange expects {}",
                    board.len(),
                    bodies.len()
                )));
            }
            board[partition.indices()].clone_from_slice(slice);
        }
        self.board.barrier.wait();

        bodies.clone_from_slice(&self.lock_board()?);
        self.board.barrier.wait();
        Ok(())
    }
}
