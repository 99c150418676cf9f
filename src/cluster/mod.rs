//! Cross-process synchronization layer
//!
//! The simulation runs the same program image on every rank and
//! coordinates purely through two collectives:
//! - a broadcast installing rank 0's initial body array everywhere,
//! - a per-step slice exchange that makes every rank's updated slice
//!   visible to every other rank before the next step starts.
//!
//! Both collectives are barriers: no rank returns from them until the
//! whole world has participated. There is no recovery path: a failed
//! collective aborts the run.

pub mod error;
pub mod local;
pub mod tcp;
pub mod topology;
pub mod wire;

pub use error::ClusterError;
pub use local::LocalCluster;
pub use tcp::TcpCluster;
pub use topology::Topology;

use crate::simulation::partition::Partition;
use crate::simulation::states::Body;

/// Collective operations the driver needs, abstracted over transport.
///
/// Implementations must preserve global index order: the exchanged
/// array is assembled by each rank's partition range, never by message
/// arrival order.
pub trait Communicator {
    fn rank(&self) -> usize;

    fn world_size(&self) -> usize;

    /// Install rank 0's `bodies` on every rank. Doubles as the barrier
    /// between initialization and the step loop.
    fn broadcast_bodies(&mut self, bodies: &mut Vec<Body>) -> Result<(), ClusterError>;

    /// Publish this rank's updated `slice` (covering `partition`) and
    /// block until `bodies` holds every rank's step-`step` slice.
    ///
    /// Empty slices are legal; ranks with nothing to publish still
    /// participate so the barrier semantics hold.
    fn exchange_slice(
        &mut self,
        step: u64,
        slice: &[Body],
        partition: &Partition,
        bodies: &mut [Body],
    ) -> Result<(), ClusterError>;
}
