use super::{CalculationMode, FastcauldronSimulator};
use crate::base::Tag;
use crate::mcf::DarcySolver;
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the summary of a run over the snapshot ages
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RunSummary {
    /// Project name
    pub project: String,

    /// Calculation mode
    pub mode: CalculationMode,

    /// Number of ranks
    pub n_ranks: usize,

    /// Ages (Ma) of the time steps that were prepared
    pub ages: Vec<f64>,

    /// Number of active elements (all formations and ranks) at each age
    pub active_elements: Vec<usize>,

    /// Number of active Darcy subdomains at each age
    pub active_subdomains: Vec<usize>,

    /// Largest stencil width of the subdomains at each age
    pub stencil_widths: Vec<usize>,

    /// Message of the Darcy failure, if any
    pub darcy_error: Option<String>,

    /// All snapshot ages were visited
    pub completed: bool,
}

impl RunSummary {
    /// Allocates an empty summary
    pub fn new(project: &str, mode: CalculationMode, n_ranks: usize) -> Self {
        RunSummary {
            project: project.to_string(),
            mode,
            n_ranks,
            ages: Vec::new(),
            active_elements: Vec::new(),
            active_subdomains: Vec::new(),
            stencil_widths: Vec::new(),
            darcy_error: None,
            completed: false,
        }
    }

    /// Reads a JSON file containing the summary
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(file);
        let summary = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(summary)
    }

    /// Writes a JSON file with the summary
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer_pretty(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

/// Visits the snapshot ages of the project, from the oldest to the youngest
///
/// At each age the formations and subdomains are updated; from the second age
/// on, the Darcy solver advances the active subdomains from the previous age.
///
/// If the Darcy solver fails on any rank, the failure is reported and either
/// the partial summary is returned (`save_on_darcy_error`) or the run aborts
/// with an error. Rank 0 writes the summary to
/// `{output_dir}/{project}_summary.json` when an output directory is set.
///
/// All ranks must call this function.
pub fn run(simulator: &mut FastcauldronSimulator, solver: &mut dyn DarcySolver) -> Result<RunSummary, StrError> {
    let mode = simulator
        .calculation_mode()
        .ok_or("the calculation mode must be set before running")?;
    let mut summary = RunSummary::new(&simulator.project().name, mode, simulator.collective().size());
    if mode == CalculationMode::NoCalculation {
        summary.completed = true;
        write_summary(simulator, &summary)?;
        return Ok(summary);
    }

    let ages = simulator.project().snapshots.clone();
    let mut previous_age: Option<f64> = None;
    for age in ages {
        simulator.prepare_time_step(age)?;
        summary.ages.push(age);
        summary.active_elements.push(simulator.number_of_active_elements()?);
        let (n_active, width) = match simulator.flow_handler() {
            Some(handler) => (
                handler.number_of_active_subdomains(),
                handler.subdomains().iter().map(|s| s.stencil_width()).max().unwrap_or(0),
            ),
            None => (0, 0),
        };
        summary.active_subdomains.push(n_active);
        summary.stencil_widths.push(width);
        log::info!("{} Ma: {} active subdomains, stencil width {}", age, n_active, width);

        if let Some(previous) = previous_age {
            let result = simulator.solve_darcy(previous, age, solver);
            let failed = simulator.collective().global_any(result.is_err())?;
            if failed {
                let message = match result {
                    Err(e) => {
                        simulator.diagnostics().info(&e.to_string());
                        e.to_string()
                    }
                    Ok(_) => "the Darcy calculation failed on another rank".to_string(),
                };
                summary.darcy_error = Some(message);
                if simulator.config().save_on_darcy_error {
                    simulator.diagnostics().report(
                        Tag::BasinWarning,
                        &format!("the Darcy calculation failed at {} Ma; saving the results computed so far", age),
                    );
                    write_summary(simulator, &summary)?;
                    return Ok(summary);
                }
                simulator
                    .diagnostics()
                    .report(Tag::BasinError, &format!("the Darcy calculation failed at {} Ma", age));
                return Err("the Darcy calculation failed");
            }
        }
        previous_age = Some(age);
    }
    summary.completed = true;
    write_summary(simulator, &summary)?;
    Ok(summary)
}

/// Writes the summary on rank 0 if an output directory is set
fn write_summary(simulator: &FastcauldronSimulator, summary: &RunSummary) -> Result<(), StrError> {
    if simulator.collective().rank() != 0 {
        return Ok(());
    }
    if let Some(dir) = &simulator.config().output_dir {
        let path = format!("{}/{}_summary.json", dir, summary.project);
        summary.write_json(&path)?;
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
