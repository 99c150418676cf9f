use gravnet::{
    bench_gravity, bench_step, run, LocalCluster, RunReport, Scenario, ScenarioConfig, TcpCluster,
    Topology,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::thread;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario YAML in the scenarios/ directory
    #[arg(short, default_value = "uniform_cloud.yaml")]
    file_name: String,

    /// This process's rank, 0 = root
    #[arg(long, default_value_t = 0)]
    rank: usize,

    /// Total number of cooperating processes
    #[arg(long, default_value_t = 1)]
    world_size: usize,

    /// Address the root binds and the workers connect to
    #[arg(long, default_value = "127.0.0.1:7117")]
    addr: String,

    /// Run the whole cluster in-process with this many worker threads
    /// instead of joining a TCP world
    #[arg(long)]
    local: Option<usize>,

    /// Time the force kernel and integrator instead of simulating
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;

    Ok(scenario_cfg)
}

fn run_local(cfg: ScenarioConfig, world_size: usize) -> Result<()> {
    let comms = LocalCluster::spawn(world_size)?;

    let handles: Vec<_> = comms
        .into_iter()
        .map(|mut comm| {
            let cfg = cfg.clone();
            thread::spawn(move || -> Result<RunReport> {
                let mut scenario = Scenario::build_scenario(cfg);
                run(&mut scenario, &mut comm)
            })
        })
        .collect();

    for handle in handles {
        let report = handle
            .join()
            .map_err(|_| anyhow!("a worker thread panicked"))??;
        println!(
            "Process {} finished simulation in {:.3} seconds.",
            report.rank,
            report.elapsed.as_secs_f64()
        );
    }

    Ok(())
}

fn run_tcp(cfg: ScenarioConfig, rank: usize, world_size: usize, addr: &str) -> Result<()> {
    let topology = Topology::new(rank, world_size)?;
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid --addr {addr}"))?;

    let mut comm = if topology.is_root() {
        log::info!("starting N-body simulation with {world_size} processes...");
        TcpCluster::root(addr, world_size)?
    } else {
        TcpCluster::worker(addr, rank, world_size)?
    };

    let mut scenario = Scenario::build_scenario(cfg);
    let report = run(&mut scenario, &mut comm)?;

    println!(
        "Process {} finished simulation in {:.3} seconds.",
        report.rank,
        report.elapsed.as_secs_f64()
    );

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_step();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;

    match args.local {
        Some(world_size) => run_local(scenario_cfg, world_size),
        None => run_tcp(scenario_cfg, args.rank, args.world_size, &args.addr),
    }
}
