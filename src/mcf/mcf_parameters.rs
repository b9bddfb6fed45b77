use crate::base::{DEFAULT_ADAPTIVE_TIME_STEP_FRACTION, DEFAULT_FACE_QUADRATURE_DEGREE};
use crate::base::{DEFAULT_FLUX_PERMEABILITY_MAXIMUM, DEFAULT_MASS_MATRIX_QUADRATURE_DEGREE};
use crate::base::{DEFAULT_MAXIMUM_GRAD_PRESSURE, DEFAULT_MAXIMUM_HC_FRACTION_FOR_FLUX};
use crate::base::{DEFAULT_MAXIMUM_PERMEABILITY, DEFAULT_MAXIMUM_TIME_STEP};
use crate::base::{DEFAULT_PREVIOUS_CONTRIBUTION_QUADRATURE_DEGREE, DEFAULT_RESIDUAL_HC_SATURATION_SCALING};
use crate::base::{DEFAULT_SOURCE_TERM_QUADRATURE_DEGREE, DEFAULT_TIME_STEP_SMOOTHING_FACTOR};
use crate::base::MAXIMUM_QUADRATURE_DEGREE;
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines how the Darcy solver chooses its time step
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum DarcyTimeStepping {
    /// Follows the time steps of the pressure/temperature solver (limited by the maximum time step)
    Pressure,

    /// Uses uniform sub-steps of the maximum time step
    Uniform,

    /// Uses the adaptive (CFL) time step scaled by the adaptive fraction
    Cfl,
}

/// Defines the sub-processes of a Darcy step that may be sub-sampled in time
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum SubProcess {
    Otgc,
    Pvt,
    Flux,
}

impl SubProcess {
    /// Parses a sub-process name (case insensitive; "flash" is an alias of "pvt")
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "otgc" => Some(SubProcess::Otgc),
            "pvt" | "flash" => Some(SubProcess::Pvt),
            "flux" => Some(SubProcess::Flux),
            _ => None,
        }
    }
}

/// Holds the tuning parameters of the multi-component (Darcy) flow solver
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct McfParameters {
    /// Debug level of the multi-component solver (0 means quiet)
    pub debug_level: usize,

    /// Maximum Darcy time step (Ma)
    pub maximum_time_step: f64,

    /// Time-stepping strategy
    pub time_stepping: DarcyTimeStepping,

    /// Fraction applied to the adaptive (CFL) time step
    pub adaptive_time_step_fraction: f64,

    /// Factor limiting the growth of consecutive time steps (None disables smoothing)
    pub time_step_smoothing_factor: Option<f64>,

    /// Number of Darcy steps between updates of the sub-sampled processes
    pub time_step_sub_sample: usize,

    /// Sub-processes using the sub-sampled time steps
    pub sub_sampled_processes: Vec<SubProcess>,

    /// Quadrature degree for the face flux integrals
    pub face_quadrature_degree: usize,

    /// Quadrature degree for the previous-content integrals
    pub previous_contribution_quadrature_degree: usize,

    /// Quadrature degree for the source term integral
    pub source_term_quadrature_degree: usize,

    /// Quadrature degree for the mass matrix integrals
    pub mass_matrix_quadrature_degree: usize,

    /// Maximum fraction of the hydrocarbons of an element that may leave it in one step
    pub maximum_hc_fraction_for_flux: f64,

    /// Scaling of the residual hydrocarbon saturation
    pub residual_hc_saturation_scaling: f64,

    /// Maximum permeability (mD) of the multi-component flow
    pub maximum_permeability: f64,

    /// Limit for the gradient of pressure (Pa/m) when computing fluxes
    pub grad_pressure_maximum: Option<f64>,

    /// Limit for the permeability (mD) when computing fluxes
    pub flux_permeability_maximum: Option<f64>,

    /// Applies OTGC (oil to gas cracking) in the Darcy domain
    pub apply_otgc: bool,

    /// Includes the immobile species in the porosity (requires OTGC)
    pub use_immobile_saturation: bool,

    /// Includes the water saturation in the overpressure calculation
    pub include_water_saturation_in_op: bool,

    /// Uses the capillary pressure in the Darcy flux
    pub include_capillary_pressure: bool,

    /// Averages the hydrocarbon densities and viscosities
    pub apply_pvt_averaging: bool,

    /// Interpolates the permeability in time
    pub interpolate_permeability: bool,

    /// Interpolates the pore volume in time
    pub interpolate_pore_volume: bool,

    /// Interpolates the face areas in time
    pub interpolate_face_area: bool,

    /// Interpolates the source term in time
    pub interpolate_source_term: bool,

    /// Age (Ma) after which source-rock contributions are no longer added
    pub stop_hc_contributions_age: Option<f64>,

    /// Age (Ma) after which hydrocarbons are no longer transported
    pub stop_hc_transport_age: Option<f64>,

    /// Includes Darcy maps in the output
    pub output_darcy_maps: bool,
}

impl McfParameters {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        McfParameters {
            debug_level: 0,
            maximum_time_step: DEFAULT_MAXIMUM_TIME_STEP,
            time_stepping: DarcyTimeStepping::Pressure,
            adaptive_time_step_fraction: DEFAULT_ADAPTIVE_TIME_STEP_FRACTION,
            time_step_smoothing_factor: Some(DEFAULT_TIME_STEP_SMOOTHING_FACTOR),
            time_step_sub_sample: 1,
            sub_sampled_processes: Vec::new(),
            face_quadrature_degree: DEFAULT_FACE_QUADRATURE_DEGREE,
            previous_contribution_quadrature_degree: DEFAULT_PREVIOUS_CONTRIBUTION_QUADRATURE_DEGREE,
            source_term_quadrature_degree: DEFAULT_SOURCE_TERM_QUADRATURE_DEGREE,
            mass_matrix_quadrature_degree: DEFAULT_MASS_MATRIX_QUADRATURE_DEGREE,
            maximum_hc_fraction_for_flux: DEFAULT_MAXIMUM_HC_FRACTION_FOR_FLUX,
            residual_hc_saturation_scaling: DEFAULT_RESIDUAL_HC_SATURATION_SCALING,
            maximum_permeability: DEFAULT_MAXIMUM_PERMEABILITY,
            grad_pressure_maximum: None,
            flux_permeability_maximum: None,
            apply_otgc: false,
            use_immobile_saturation: false,
            include_water_saturation_in_op: true,
            include_capillary_pressure: false,
            apply_pvt_averaging: false,
            interpolate_permeability: true,
            interpolate_pore_volume: true,
            interpolate_face_area: true,
            interpolate_source_term: true,
            stop_hc_contributions_age: None,
            stop_hc_transport_age: None,
            output_darcy_maps: false,
        }
    }

    /// Sets the debug level
    pub fn set_debug_level(&mut self, level: usize) -> Result<&mut Self, StrError> {
        self.debug_level = level;
        Ok(self)
    }

    /// Sets the maximum Darcy time step
    pub fn set_maximum_time_step(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value <= 0.0 {
            return Err("maximum Darcy time step must be > 0.0");
        }
        self.maximum_time_step = value;
        Ok(self)
    }

    /// Sets the time-stepping strategy from the uniform and CFL requests
    ///
    /// **Note:** If both are requested, the CFL (non-uniform) time stepping is used.
    pub fn set_time_stepping(&mut self, uniform: bool, cfl: bool) -> Result<&mut Self, StrError> {
        if uniform && cfl {
            log::warn!("both uniform and CFL Darcy time stepping requested; using CFL time stepping");
        }
        self.time_stepping = if cfl {
            DarcyTimeStepping::Cfl
        } else if uniform {
            DarcyTimeStepping::Uniform
        } else {
            DarcyTimeStepping::Pressure
        };
        Ok(self)
    }

    /// Sets the fraction applied to the adaptive time step
    pub fn set_adaptive_time_step_fraction(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value <= 0.0 {
            return Err("adaptive time step fraction must be > 0.0");
        }
        self.adaptive_time_step_fraction = value;
        Ok(self)
    }

    /// Sets the time step smoothing factor
    ///
    /// **Note:** Values smaller than 1.0 are ignored with a warning and the current value is kept.
    pub fn set_time_step_smoothing_factor(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value < 1.0 {
            log::warn!(
                "time step smoothing factor is less than 1, value = {:e}; smoothing will not be changed",
                value
            );
            return Ok(self);
        }
        self.time_step_smoothing_factor = Some(value);
        Ok(self)
    }

    /// Disables the time step smoothing
    pub fn unset_time_step_smoothing(&mut self) -> Result<&mut Self, StrError> {
        self.time_step_smoothing_factor = None;
        Ok(self)
    }

    /// Sets the time step sub-sampling and the list of sub-sampled processes
    ///
    /// Returns the names that were not recognised (they are ignored).
    pub fn set_time_step_sub_sampling(&mut self, step: usize, processes: &[&str]) -> Result<Vec<String>, StrError> {
        if step < 1 {
            return Err("time step sub-sampling must be ≥ 1");
        }
        self.time_step_sub_sample = step;
        let mut unknown = Vec::new();
        for name in processes {
            match SubProcess::from_name(name) {
                Some(p) => {
                    if !self.sub_sampled_processes.contains(&p) {
                        self.sub_sampled_processes.push(p);
                    }
                }
                None => unknown.push(name.to_string()),
            }
        }
        Ok(unknown)
    }

    /// Sets all quadrature degrees, clipping the value to [1, MAXIMUM_QUADRATURE_DEGREE]
    pub fn set_quadrature_degree(&mut self, degree: usize) -> Result<&mut Self, StrError> {
        let degree = clip_quadrature_degree(degree);
        self.face_quadrature_degree = degree;
        self.previous_contribution_quadrature_degree = degree;
        self.source_term_quadrature_degree = degree;
        self.mass_matrix_quadrature_degree = degree;
        Ok(self)
    }

    /// Sets the face quadrature degree (clipped)
    pub fn set_face_quadrature_degree(&mut self, degree: usize) -> Result<&mut Self, StrError> {
        self.face_quadrature_degree = clip_quadrature_degree(degree);
        Ok(self)
    }

    /// Sets the previous-content quadrature degree (clipped)
    pub fn set_previous_contribution_quadrature_degree(&mut self, degree: usize) -> Result<&mut Self, StrError> {
        self.previous_contribution_quadrature_degree = clip_quadrature_degree(degree);
        Ok(self)
    }

    /// Sets the source term quadrature degree (clipped)
    pub fn set_source_term_quadrature_degree(&mut self, degree: usize) -> Result<&mut Self, StrError> {
        self.source_term_quadrature_degree = clip_quadrature_degree(degree);
        Ok(self)
    }

    /// Sets the mass matrix quadrature degree (clipped)
    pub fn set_mass_matrix_quadrature_degree(&mut self, degree: usize) -> Result<&mut Self, StrError> {
        self.mass_matrix_quadrature_degree = clip_quadrature_degree(degree);
        Ok(self)
    }

    /// Sets the maximum fraction of hydrocarbons leaving an element per step
    pub fn set_maximum_hc_fraction_for_flux(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value <= 0.0 || value > 1.0 {
            return Err("maximum HC fraction for flux must be in 0.0 < value ≤ 1.0");
        }
        self.maximum_hc_fraction_for_flux = value;
        Ok(self)
    }

    /// Sets the scaling of the residual hydrocarbon saturation
    pub fn set_residual_hc_saturation_scaling(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value < 0.0 {
            return Err("residual HC saturation scaling must be ≥ 0.0");
        }
        self.residual_hc_saturation_scaling = value;
        Ok(self)
    }

    /// Sets the maximum permeability
    pub fn set_maximum_permeability(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value <= 0.0 {
            return Err("maximum permeability must be > 0.0");
        }
        self.maximum_permeability = value;
        Ok(self)
    }

    /// Limits the gradient of pressure when computing fluxes
    ///
    /// **Note:** `None` uses the default limit.
    pub fn set_limit_grad_pressure(&mut self, value: Option<f64>) -> Result<&mut Self, StrError> {
        let value = value.unwrap_or(DEFAULT_MAXIMUM_GRAD_PRESSURE);
        if value <= 0.0 {
            return Err("maximum gradient of pressure must be > 0.0");
        }
        self.grad_pressure_maximum = Some(value);
        Ok(self)
    }

    /// Limits the permeability when computing fluxes
    ///
    /// **Note:** `None` uses the default limit.
    pub fn set_limit_flux_permeability(&mut self, value: Option<f64>) -> Result<&mut Self, StrError> {
        let value = value.unwrap_or(DEFAULT_FLUX_PERMEABILITY_MAXIMUM);
        if value <= 0.0 {
            return Err("maximum flux permeability must be > 0.0");
        }
        self.flux_permeability_maximum = Some(value);
        Ok(self)
    }

    /// Sets the OTGC flags
    pub fn set_otgc(&mut self, apply: bool, use_immobile_saturation: bool) -> Result<&mut Self, StrError> {
        self.apply_otgc = apply;
        self.use_immobile_saturation = use_immobile_saturation;
        Ok(self)
    }

    /// Disables (or enables) all time interpolations
    pub fn set_interpolation(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.interpolate_permeability = flag;
        self.interpolate_pore_volume = flag;
        self.interpolate_face_area = flag;
        self.interpolate_source_term = flag;
        Ok(self)
    }

    /// Sets the age after which source-rock contributions stop
    pub fn set_stop_hc_contributions_age(&mut self, age: Option<f64>) -> Result<&mut Self, StrError> {
        self.stop_hc_contributions_age = age;
        Ok(self)
    }

    /// Sets the age after which hydrocarbon transport stops
    pub fn set_stop_hc_transport_age(&mut self, age: Option<f64>) -> Result<&mut Self, StrError> {
        self.stop_hc_transport_age = age;
        Ok(self)
    }

    /// Returns true if the given sub-process uses the sub-sampled time steps
    pub fn is_sub_sampled(&self, process: SubProcess) -> bool {
        self.time_step_sub_sample > 1 && self.sub_sampled_processes.contains(&process)
    }

    /// Returns true if source-rock contributions are still added at the given age
    pub fn hc_contributions_active(&self, age: f64) -> bool {
        match self.stop_hc_contributions_age {
            Some(stop) => age > stop,
            None => true,
        }
    }

    /// Returns true if hydrocarbons are still transported at the given age
    pub fn hc_transport_active(&self, age: f64) -> bool {
        match self.stop_hc_transport_age {
            Some(stop) => age > stop,
            None => true,
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.maximum_time_step <= 0.0 {
            return Some(format!(
                "maximum_time_step = {:?} is incorrect; it must be > 0.0",
                self.maximum_time_step
            ));
        }
        if self.adaptive_time_step_fraction <= 0.0 {
            return Some(format!(
                "adaptive_time_step_fraction = {:?} is incorrect; it must be > 0.0",
                self.adaptive_time_step_fraction
            ));
        }
        if let Some(factor) = self.time_step_smoothing_factor {
            if factor < 1.0 {
                return Some(format!(
                    "time_step_smoothing_factor = {:?} is incorrect; it must be ≥ 1.0",
                    factor
                ));
            }
        }
        if self.time_step_sub_sample < 1 {
            return Some(format!(
                "time_step_sub_sample = {:?} is incorrect; it must be ≥ 1",
                self.time_step_sub_sample
            ));
        }
        let degrees = [
            ("face_quadrature_degree", self.face_quadrature_degree),
            (
                "previous_contribution_quadrature_degree",
                self.previous_contribution_quadrature_degree,
            ),
            ("source_term_quadrature_degree", self.source_term_quadrature_degree),
            ("mass_matrix_quadrature_degree", self.mass_matrix_quadrature_degree),
        ];
        for (name, degree) in degrees {
            if degree < 1 || degree > MAXIMUM_QUADRATURE_DEGREE {
                return Some(format!(
                    "{} = {:?} is incorrect; it must be in [1, {}]",
                    name, degree, MAXIMUM_QUADRATURE_DEGREE
                ));
            }
        }
        if self.use_immobile_saturation && !self.apply_otgc {
            return Some("use_immobile_saturation requires apply_otgc".to_string());
        }
        None
    }
}

/// Clips a quadrature degree to [1, MAXIMUM_QUADRATURE_DEGREE]
fn clip_quadrature_degree(degree: usize) -> usize {
    let clipped = degree.clamp(1, MAXIMUM_QUADRATURE_DEGREE);
    if clipped != degree {
        log::warn!("quadrature degree {} clipped to {}", degree, clipped);
    }
    clipped
}

impl fmt::Display for McfParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multi-component flow parameters\n").unwrap();
        write!(f, "===============================\n").unwrap();
        write!(f, "debug_level = {:?}\n", self.debug_level).unwrap();
        write!(f, "maximum_time_step = {:?}\n", self.maximum_time_step).unwrap();
        write!(f, "time_stepping = {:?}\n", self.time_stepping).unwrap();
        write!(f, "adaptive_time_step_fraction = {:?}\n", self.adaptive_time_step_fraction).unwrap();
        write!(f, "time_step_smoothing_factor = {:?}\n", self.time_step_smoothing_factor).unwrap();
        write!(
            f,
            "quadrature_degrees = (face: {}, previous: {}, source: {}, mass: {})\n",
            self.face_quadrature_degree,
            self.previous_contribution_quadrature_degree,
            self.source_term_quadrature_degree,
            self.mass_matrix_quadrature_degree
        )
        .unwrap();
        write!(f, "apply_otgc = {:?}\n", self.apply_otgc).unwrap();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
