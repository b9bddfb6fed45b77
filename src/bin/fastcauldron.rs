use fastcauldron::base::{Config, DEFAULT_OUT_DIR};
use fastcauldron::mcf::SaturationConsistencySolver;
#[cfg(feature = "mpi")]
use fastcauldron::parallel::MpiComm;
#[cfg(not(feature = "mpi"))]
use fastcauldron::parallel::{run_ranks, SerialComm};
use fastcauldron::parallel::Communicator;
use fastcauldron::simulator::{run, CalculationMode, FastcauldronSimulator, ProjectData, RunSummary};
use fastcauldron::StrError;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "fastcauldron",
    about = "Builds the layers and Darcy subdomains of a basin project and visits its snapshot ages"
)]
struct Options {
    /// Project file (JSON)
    project: String,

    /// Calculation mode (e.g. decompaction, temperature, overpressure, hydrostaticdarcy)
    #[structopt(short, long, default_value = "decompaction")]
    mode: String,

    /// Configuration file (JSON); the flags below override it
    #[structopt(short, long)]
    config: Option<String>,

    /// Number of ranks (one thread per rank); ignored when built with MPI
    #[structopt(short, long, default_value = "1")]
    ranks: usize,

    /// Debug level in [0, 4]
    #[structopt(short, long, default_value = "1")]
    debug: usize,

    /// Output directory (default: the configuration's, then /tmp/fastcauldron/results)
    #[structopt(short, long)]
    output_dir: Option<String>,

    /// Element height refinement by formation name: pairs of name and factor
    #[structopt(long)]
    refine_named: Vec<String>,

    /// Element height refinement by formation index: pairs of index and factor
    #[structopt(long)]
    refine_numbered: Vec<String>,

    /// Solves the multi-component flow equations
    #[structopt(long)]
    flow: bool,

    /// Sediment indices of the Darcy subdomains (contiguous runs form one subdomain)
    #[structopt(long)]
    darcy_formations: Vec<i64>,

    /// Keeps the results computed so far if the Darcy solver fails
    #[structopt(long)]
    save_on_darcy_error: bool,

    /// Models permafrost (temperature modes only)
    #[structopt(long)]
    permafrost: bool,

    /// Runs the advanced lithosphere calculator (needs a crust and a mantle)
    #[structopt(long)]
    alc: bool,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // logger
    let level = match options.debug {
        0 => log::LevelFilter::Off,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder().filter_level(level).init();

    // input data
    let project = ProjectData::read_json(&options.project)?;
    let mode = CalculationMode::from_name(&options.mode).ok_or("unknown calculation mode")?;
    let mut config = match &options.config {
        Some(path) => Config::read_json(path)?,
        None => Config::new(),
    };
    config.set_debug_level(options.debug)?;
    if let Some(dir) = &options.output_dir {
        config.set_output_dir(dir)?;
    } else if config.output_dir.is_none() {
        config.set_output_dir(DEFAULT_OUT_DIR)?;
    }
    if !options.refine_named.is_empty() {
        let args: Vec<&str> = options.refine_named.iter().map(|s| s.as_str()).collect();
        config.set_refine_named_formations(&args)?;
    }
    if !options.refine_numbered.is_empty() {
        let args: Vec<&str> = options.refine_numbered.iter().map(|s| s.as_str()).collect();
        config.set_refine_numbered_formations(&args)?;
    }
    if !options.darcy_formations.is_empty() {
        config.set_darcy_formations(&options.darcy_formations)?;
    }
    if options.flow {
        config.set_solve_flow_equations(true)?;
    }
    if options.save_on_darcy_error {
        config.set_save_on_darcy_error(true)?;
    }
    if options.permafrost {
        config.set_permafrost(true)?;
    }
    if options.alc {
        config.set_alc(true)?;
    }
    log::info!("project {} with {} formations", project.name, project.formations.len());
    log::info!("calculation mode {}", mode);

    // run
    let (results, is_root) = run_all_ranks(options.ranks, project, config, mode);
    let mut summary = None;
    for result in results {
        summary = Some(result?);
    }

    // message
    if let (Some(summary), true) = (summary, is_root) {
        let ages: Vec<_> = summary.ages.iter().map(|a| format!("{}", a)).collect();
        println!("visited ages (Ma): {}", ages.join(" "));
        println!("active elements:   {:?}", summary.active_elements);
        println!("active subdomains: {:?}", summary.active_subdomains);
        if let Some(err) = &summary.darcy_error {
            println!("{}", err);
        }
    }
    Ok(())
}

/// Runs all ranks of this process with threads; returns the results and whether this process prints
#[cfg(not(feature = "mpi"))]
fn run_all_ranks(
    ranks: usize,
    project: ProjectData,
    config: Config,
    mode: CalculationMode,
) -> (Vec<Result<RunSummary, StrError>>, bool) {
    let results = if ranks > 1 {
        run_ranks(ranks, |comm| simulate(project.clone(), config.clone(), mode, Box::new(comm)))
    } else {
        vec![simulate(project, config, mode, Box::new(SerialComm))]
    };
    (results, true)
}

/// Runs the rank of this process over the MPI world; returns the result and whether this process prints
#[cfg(feature = "mpi")]
fn run_all_ranks(
    ranks: usize,
    project: ProjectData,
    config: Config,
    mode: CalculationMode,
) -> (Vec<Result<RunSummary, StrError>>, bool) {
    let universe = match mpi::initialize() {
        Some(universe) => universe,
        None => return (vec![Err("cannot initialise MPI")], true),
    };
    let comm = MpiComm::world(&universe);
    if ranks > 1 {
        log::warn!("the number of ranks is given by the MPI launcher; ignoring --ranks {}", ranks);
    }
    let is_root = comm.rank() == 0;
    (vec![simulate(project, config, mode, Box::new(comm))], is_root)
}

/// Runs one rank
fn simulate(
    project: ProjectData,
    config: Config,
    mode: CalculationMode,
    comm: Box<dyn Communicator>,
) -> Result<RunSummary, StrError> {
    let mut simulator = FastcauldronSimulator::new(project, config, comm)?;
    if !simulator.set_calculation_mode(mode)? {
        return Err("cannot start the calculation mode");
    }
    let mut solver = SaturationConsistencySolver::new();
    run(&mut simulator, &mut solver)
}
