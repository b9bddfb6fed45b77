use super::{CalculationMode, Mesh, OutputActivity, OutputPropertySet, ProjectData};
use crate::base::{Config, Diagnostics, Tag};
use crate::layer::Formations;
use crate::mcf::{DarcyError, DarcySolver, MultiComponentFlowHandler};
use crate::parallel::{Collective, Communicator};
use crate::StrError;
use std::fs;

/// Holds the state of one rank of a basin simulation
///
/// The simulator is explicit context: it owns the project, the configuration,
/// the collective operations of the rank, the mesh, the formations and the
/// multi-component flow handler. The calculation mode is set once with
/// [FastcauldronSimulator::set_calculation_mode].
///
/// ```text
///  new ──► set_calculation_mode ──► prepare_time_step(age) ──► solve_darcy ──► ...
///            │ output activity        │ find_active_elements
///            │ mesh + validity        │ set_layer_element_activity
///            │ formations             │ allocate_new_vecs
///            └ subdomains             └ set_subdomain_activity
/// ```
pub struct FastcauldronSimulator {
    /// Project data
    project: ProjectData,

    /// Run configuration
    config: Config,

    /// Collective operations of this rank
    collective: Collective,

    /// Tagged user-visible messages
    diagnostics: Diagnostics,

    /// Formations from top to bottom
    formations: Formations,

    /// Calculation mode (set once)
    mode: Option<CalculationMode>,

    /// Output activity of the calculation mode
    activity: Option<OutputActivity>,

    /// Mesh (None for NoCalculation or before the mode is set)
    mesh: Option<Mesh>,

    /// Multi-component flow handler (Darcy modes with flow enabled)
    flow_handler: Option<MultiComponentFlowHandler>,

    /// Permafrost modelling is on
    permafrost: bool,

    /// Age of the last prepared time step
    current_age: Option<f64>,
}

impl FastcauldronSimulator {
    /// Allocates a new instance
    ///
    /// The element height refinement overrides of the configuration are applied
    /// here (numbered first, then named); any invalid override aborts.
    pub fn new(project: ProjectData, config: Config, comm: Box<dyn Communicator>) -> Result<Self, StrError> {
        if let Some(err) = project.validate() {
            println!("ERROR: {}", err);
            return Err("cannot allocate simulator because project.validate() failed");
        }
        if let Some(err) = config.validate() {
            println!("ERROR: {}", err);
            return Err("cannot allocate simulator because config.validate() failed");
        }
        let collective = Collective::new(comm);
        let diagnostics = Diagnostics::new(collective.rank());
        let formations = Formations::new(&project.formations);
        let mut simulator = FastcauldronSimulator {
            project,
            config,
            collective,
            diagnostics,
            formations,
            mode: None,
            activity: None,
            mesh: None,
            flow_handler: None,
            permafrost: false,
            current_age: None,
        };
        simulator.set_formation_element_height_scaling_factors()?;
        Ok(simulator)
    }

    /// Applies the element height refinement overrides of the configuration
    pub fn set_formation_element_height_scaling_factors(&mut self) -> Result<(), StrError> {
        self.formations.set_depth_refinement_factors(
            &self.config.refine_numbered_formations,
            &self.config.refine_named_formations,
        )
    }

    /// Sets the calculation mode and builds the state needed by the mode
    ///
    /// Returns `Ok(true)` if the output activity started and the mesh has
    /// active elements (always true for NoCalculation once started). Problems
    /// reported to the user give `Ok(false)`; in that case no formation or
    /// subdomain state is built.
    ///
    /// All ranks must call this function.
    pub fn set_calculation_mode(&mut self, mode: CalculationMode) -> Result<bool, StrError> {
        if let Some(current) = self.mode {
            self.diagnostics.report(
                Tag::BasinError,
                &format!("the calculation mode is already set to {}", current),
            );
            return Ok(false);
        }
        self.mode = Some(mode);

        // output activity
        let properties = OutputPropertySet::with_defaults(
            mode,
            self.config.chemical_compaction,
            self.config.solve_flow_equations,
        );
        let activity = match OutputActivity::start(
            mode,
            &self.project.name,
            self.config.output_dir.as_deref(),
            properties,
        ) {
            Ok(activity) => activity,
            Err(_) => {
                self.diagnostics.report(Tag::MessageError, "Could not open the output file.");
                return Ok(false);
            }
        };
        log::info!("started activity {} ({:?})", activity.name, activity.resolution);
        self.activity = Some(activity);

        // features
        if self.config.permafrost {
            if mode.solves_temperature() {
                self.permafrost = true;
                self.diagnostics.info("Permafrost is on.");
            } else {
                self.diagnostics.report(
                    Tag::BasinWarning,
                    &format!("permafrost is only modelled when the temperature is computed; it is off in {}", mode),
                );
            }
        }
        if self.config.alc && !self.formations.has_crust_and_mantle() {
            self.diagnostics
                .report(Tag::BasinError, "the advanced lithosphere calculator needs a crust and a mantle");
            return Ok(false);
        }
        if mode == CalculationMode::NoCalculation {
            return Ok(true);
        }

        // mesh
        let mut mesh = Mesh::new(
            &self.project,
            mode.resolution(),
            self.collective.rank(),
            self.collective.size(),
            self.config.geometric_loop,
        )?;
        let has_active_elements = mesh.initialise_element_grid(&self.collective)?;
        if self.config.debug2() {
            self.print_element_validity_map(&mesh)?;
        }
        if !has_active_elements {
            self.diagnostics
                .report(Tag::MessageError, "there are no active elements in the mesh.");
            self.mesh = Some(mesh);
            return Ok(false);
        }

        // formations and subdomains
        self.formations.initialise(&mesh)?;
        if mode.is_darcy() && self.config.solve_flow_equations {
            let mut handler = MultiComponentFlowHandler::new(&self.config);
            handler.initialise(
                &self.formations,
                &mesh,
                self.config.darcy_formations.as_deref(),
                &self.diagnostics,
            )?;
            self.flow_handler = Some(handler);
        }
        self.mesh = Some(mesh);
        Ok(true)
    }

    /// Writes the element validity map of this rank to the log and to the output directory
    ///
    /// The file is `{project}_{n_ranks}_element_activity_map.txt` on a single
    /// rank and `{project}_{n_ranks}_{rank}_element_activity_map.txt` otherwise.
    fn print_element_validity_map(&self, mesh: &Mesh) -> Result<(), StrError> {
        let image = mesh.map.image();
        log::debug!("element validity map of rank {}\n{}", self.collective.rank(), image);
        if let Some(dir) = &self.config.output_dir {
            let path = if self.collective.size() == 1 {
                format!("{}/{}_1_element_activity_map.txt", dir, self.project.name)
            } else {
                format!(
                    "{}/{}_{}_{}_element_activity_map.txt",
                    dir,
                    self.project.name,
                    self.collective.size(),
                    self.collective.rank()
                )
            };
            fs::write(&path, image).map_err(|_| "cannot write element activity map")?;
        }
        Ok(())
    }

    /// Returns the element validity map of this rank (None before the mesh is built)
    pub fn element_validity_map_image(&self) -> Option<String> {
        self.mesh.as_ref().map(|m| m.map.image())
    }

    /// Sets the number of active elements of every formation at the given age
    pub fn find_active_elements(&mut self, age: f64) {
        self.formations.find_active_elements(age);
    }

    /// Updates the formations and the subdomains to the given age
    ///
    /// All ranks must call this function with the same age.
    pub fn prepare_time_step(&mut self, age: f64) -> Result<(), StrError> {
        let mesh = self
            .mesh
            .as_ref()
            .ok_or("the calculation mode must be set before preparing a time step")?;
        if !self.formations.iter().all(|l| l.is_initialised()) {
            return Err("the formations must be initialised before preparing a time step");
        }
        self.formations.find_active_elements(age);
        self.formations.set_layer_element_activity(&mesh.map, age);
        let allocated = self.formations.allocate_new_vecs(mesh, self.config.surface_temperature);
        if allocated > 0 {
            log::debug!("allocated the field vectors of {} formations at {} Ma", allocated, age);
        }
        if let Some(handler) = &mut self.flow_handler {
            handler.set_subdomain_activity(&self.formations, mesh, &self.collective, age)?;
        }
        self.current_age = Some(age);
        Ok(())
    }

    /// Advances the multi-component flow of all active subdomains
    pub fn solve_darcy(
        &mut self,
        previous_age: f64,
        current_age: f64,
        solver: &mut dyn DarcySolver,
    ) -> Result<(), DarcyError> {
        match &self.flow_handler {
            Some(handler) => handler.solve(previous_age, current_age, &mut self.formations, solver),
            None => Ok(()),
        }
    }

    /// Resets the field vectors of all formations
    pub fn re_initialise(&mut self) {
        self.formations.re_initialise(self.config.surface_temperature);
    }

    /// Returns the number of active owned elements summed over all formations and ranks
    ///
    /// All ranks must call this function.
    pub fn number_of_active_elements(&self) -> Result<usize, StrError> {
        let local = self.formations.iter().map(|l| l.count_active_owned_elements()).sum();
        self.collective.global_sum(local)
    }

    /// Returns the project data
    pub fn project(&self) -> &ProjectData {
        &self.project
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the collective operations of this rank
    pub fn collective(&self) -> &Collective {
        &self.collective
    }

    /// Returns the diagnostics
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Returns the formations
    pub fn formations(&self) -> &Formations {
        &self.formations
    }

    /// Returns the calculation mode
    pub fn calculation_mode(&self) -> Option<CalculationMode> {
        self.mode
    }

    /// Returns the output activity
    pub fn activity(&self) -> Option<&OutputActivity> {
        self.activity.as_ref()
    }

    /// Returns the mesh
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Returns the multi-component flow handler
    pub fn flow_handler(&self) -> Option<&MultiComponentFlowHandler> {
        self.flow_handler.as_ref()
    }

    /// Returns true if permafrost is modelled
    pub fn permafrost(&self) -> bool {
        self.permafrost
    }

    /// Returns the age of the last prepared time step
    pub fn current_age(&self) -> Option<f64> {
        self.current_age
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
