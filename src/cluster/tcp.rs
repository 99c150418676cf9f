//! TCP transport for the cluster collectives
//!
//! Hub topology: rank 0 binds a listener and every other rank connects
//! to it, identifying itself with a `Hello` frame. The root then drives
//! both collectives:
//! - broadcast: root pushes a `Bodies` frame to every peer,
//! - exchange: every worker sends its `Slice` frame and blocks; the
//!   root gathers all slices, assembles the global array in rank order,
//!   and pushes the assembled `Bodies` frame back out.
//!
//! Blocking reads give the exchange its barrier semantics for free: a
//! worker cannot proceed to step k+1 until the root has heard from the
//! whole world about step k.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use crate::cluster::error::ClusterError;
use crate::cluster::topology::Topology;
use crate::cluster::wire::{self, Frame};
use crate::cluster::Communicator;
use crate::simulation::partition::{partition_for, Partition};
use crate::simulation::states::Body;

/// How long a worker keeps retrying the initial connect while the root
/// is still starting up.
const CONNECT_ATTEMPTS: u32 = 50;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// One rank's endpoint of the TCP cluster.
pub struct TcpCluster {
    topology: Topology,
    role: Role,
}

enum Role {
    /// Connections to ranks 1..world_size, indexed by rank - 1.
    Root { peers: Vec<TcpStream> },
    Worker { root: TcpStream },
}

impl TcpCluster {
    /// Bind `addr` as rank 0 and wait for the rest of the world.
    pub fn root(addr: SocketAddr, world_size: usize) -> Result<Self, ClusterError> {
        let listener = TcpListener::bind(addr)?;
        Self::root_on(listener, world_size)
    }

    /// Rank 0 endpoint on an already-bound listener. Blocks until all
    /// `world_size - 1` peers have connected and identified themselves.
    pub fn root_on(listener: TcpListener, world_size: usize) -> Result<Self, ClusterError> {
        let topology = Topology::new(0, world_size)?;

        let mut slots: Vec<Option<TcpStream>> = Vec::new();
        slots.resize_with(world_size - 1, || None);
        let mut connected = 0;

        while connected < world_size - 1 {
            let (mut stream, peer_addr) = listener.accept()?;
            stream.set_nodelay(true)?;

            let rank = match wire::read_frame(&mut stream)? {
                Frame::Hello { rank, world_size: peer_world } => {
                    if peer_world as usize != world_size {
                        return Err(ClusterError::Protocol(format!(
                            "peer at {peer_addr} expects a world of {peer_world}, ours is {world_size}"
                        )));
                    }
                    rank as usize
                }
                other => {
                    return Err(ClusterError::Protocol(format!(
                        "expected Hello from {peer_addr}, got {other:?}"
                    )))
                }
            };

            if rank == 0 || rank >= world_size {
                return Err(ClusterError::Protocol(format!(
                    "peer at {peer_addr} claims invalid rank {rank}"
                )));
            }
            if slots[rank - 1].is_some() {
                return Err(ClusterError::Protocol(format!(
                    "rank {rank} connected twice (second time from {peer_addr})"
                )));
            }

            log::debug!("rank {rank} connected from {peer_addr}");
            slots[rank - 1] = Some(stream);
            connected += 1;
        }

        // Every slot is filled once `connected` reaches world_size - 1.
        let peers = slots.into_iter().flatten().collect();

        Ok(Self {
            topology,
            role: Role::Root { peers },
        })
    }

    /// Connect to the root as `rank`, retrying briefly while the root
    /// may still be binding its listener.
    pub fn worker(addr: SocketAddr, rank: usize, world_size: usize) -> Result<Self, ClusterError> {
        let topology = Topology::new(rank, world_size)?;
        if topology.is_root() {
            return Err(ClusterError::Protocol(
                "rank 0 is the root and cannot connect as a worker".into(),
            ));
        }

        let mut stream = connect_with_retry(addr)?;
        stream.set_nodelay(true)?;

        wire::write_frame(
            &mut stream,
            &Frame::Hello {
                rank: rank as u32,
                world_size: world_size as u32,
            },
        )?;

        Ok(Self {
            topology,
            role: Role::Worker { root: stream },
        })
    }
}

fn connect_with_retry(addr: SocketAddr) -> Result<TcpStream, ClusterError> {
    let mut attempt = 0;
    loop {
        match TcpStream::connect(addr) {
            Ok(stream) => return Ok(stream),
            Err(e) if attempt + 1 < CONNECT_ATTEMPTS => {
                log::debug!("connect to {addr} failed ({e}), retrying");
                attempt += 1;
                std::thread::sleep(CONNECT_RETRY_DELAY);
            }
            Err(e) => return Err(ClusterError::Io(e)),
        }
    }
}

/// Read one frame from a known peer, turning a closed connection into
/// the rank-attributed disconnect error.
fn read_from_rank(stream: &mut TcpStream, rank: usize) -> Result<Frame, ClusterError> {
    match wire::read_frame(stream) {
        Err(ClusterError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(ClusterError::PeerDisconnected { rank })
        }
        other => other,
    }
}

impl Communicator for TcpCluster {
    fn rank(&self) -> usize {
        self.topology.rank
    }

    fn world_size(&self) -> usize {
        self.topology.world_size
    }

    fn broadcast_bodies(&mut self, bodies: &mut Vec<Body>) -> Result<(), ClusterError> {
        match &mut self.role {
            Role::Root { peers } => {
                let payload = wire::encode(&Frame::Bodies {
                    step: 0,
                    bodies: bodies.clone(),
                })?;
                for peer in peers.iter_mut() {
                    wire::write_encoded(peer, &payload)?;
                }
                Ok(())
            }
            Role::Worker { root } => match read_from_rank(root, 0)? {
                Frame::Bodies { bodies: full, .. } => {
                    *bodies = full;
                    Ok(())
                }
                other => Err(ClusterError::Protocol(format!(
                    "expected initial Bodies broadcast, got {other:?}"
                ))),
            },
        }
    }

    fn exchange_slice(
        &mut self,
        step: u64,
        slice: &[Body],
        partition: &Partition,
        bodies: &mut [Body],
    ) -> Result<(), ClusterError> {
        let n = bodies.len();
        let world_size = self.topology.world_size;

        match &mut self.role {
            Role::Root { peers } => {
                // Root's own contribution first, then gather the rest.
                bodies[partition.indices()].clone_from_slice(slice);

                for (i, peer) in peers.iter_mut().enumerate() {
                    let rank = i + 1;
                    let expected = partition_for(n, world_size, rank);

                    match read_from_rank(peer, rank)? {
                        Frame::Slice {
                            step: peer_step,
                            start,
                            bodies: peer_slice,
                        } => {
                            if peer_step != step {
                                return Err(ClusterError::Protocol(format!(
                                    "rank {rank} published step {peer_step} during step {step}"
                                )));
                            }
                            if start as usize != expected.start || peer_slice.len() != expected.len()
                            {
                                return Err(ClusterError::Protocol(format!(
                                    "rank {rank} published [{start}, {}) but owns [{}, {})",
                                    start as usize + peer_slice.len(),
                                    expected.start,
                                    expected.end,
                                )));
                            }
                            // Assembled by the rank's own range: arrival
                            // order never decides placement.
                            bodies[expected.indices()].clone_from_slice(&peer_slice);
                        }
                        other => {
                            return Err(ClusterError::Protocol(format!(
                                "expected Slice from rank {rank}, got {other:?}"
                            )))
                        }
                    }
                }

                let payload = wire::encode(&Frame::Bodies {
                    step,
                    bodies: bodies.to_vec(),
                })?;
                for peer in peers.iter_mut() {
                    wire::write_encoded(peer, &payload)?;
                }
                Ok(())
            }
            Role::Worker { root } => {
                wire::write_frame(
                    root,
                    &Frame::Slice {
                        step,
                        start: partition.start as u64,
                        bodies: slice.to_vec(),
                    },
                )?;

                match read_from_rank(root, 0)? {
                    Frame::Bodies {
                        step: root_step,
                        bodies: full,
                    } => {
                        if root_step != step {
                            return Err(ClusterError::Protocol(format!(
                                "root assembled step {root_step} during step {step}"
                            )));
                        }
                        if full.len() != n {
                            return Err(ClusterError::Protocol(format!(
                                "root assembled {} bodies, expected {n}",
                                full.len()
                            )));
                        }
                        bodies.clone_from_slice(&full);
                        Ok(())
                    }
                    other => Err(ClusterError::Protocol(format!(
                        "expected assembled Bodies from root, got {other:?}"
                    ))),
                }
            }
        }
    }
}
