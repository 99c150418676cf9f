pub mod benchmark;
pub mod cluster;
pub mod configuration;
pub mod simulation;

pub use simulation::driver::{run, RunReport};
pub use simulation::forces::NewtonianGravity;
pub use simulation::integrator::advance_slice;
pub use simulation::params::Parameters;
pub use simulation::partition::{partition_for, Partition};
pub use simulation::scenario::{random_bodies, InitialCondition, Scenario};
pub use simulation::states::{Body, NVec3, System};

pub use cluster::{ClusterError, Communicator, LocalCluster, TcpCluster, Topology};

pub use configuration::config::{InitialConfig, ParametersConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_gravity, bench_step};
