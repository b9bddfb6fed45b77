/// Defines the directory where the simulation result files are saved
pub const DEFAULT_OUT_DIR: &str = "/tmp/fastcauldron/results";

/// Defines an auxiliary directory where the test result files are saved
pub const DEFAULT_TEST_DIR: &str = "/tmp/fastcauldron/test";

/// Minimum thickness (m) of a segment to be considered as containing material
pub const DEPOSITING_THICKNESS_TOLERANCE: f64 = 0.001;

/// Relative tolerance used when comparing geological ages (Ma)
pub const AGE_TOLERANCE: f64 = 1.0e-6;

/// Value assigned to field entries that carry no meaningful state
pub const NULL_VALUE: f64 = 99999.0;

/// Highest quadrature degree accepted by the Darcy integrals
pub const MAXIMUM_QUADRATURE_DEGREE: usize = 10;

/// Number of hydrocarbon components transported by the Darcy solver
pub const NUMBER_OF_PVT_COMPONENTS: usize = 13;

/// Default quadrature degree for the face flux integrals
pub const DEFAULT_FACE_QUADRATURE_DEGREE: usize = 2;

/// Default quadrature degree for the previous-content integrals
pub const DEFAULT_PREVIOUS_CONTRIBUTION_QUADRATURE_DEGREE: usize = 3;

/// Default quadrature degree for the source term integral
pub const DEFAULT_SOURCE_TERM_QUADRATURE_DEGREE: usize = 2;

/// Default quadrature degree for the mass matrix integrals
pub const DEFAULT_MASS_MATRIX_QUADRATURE_DEGREE: usize = 3;

/// Default maximum gradient of pressure (Pa/m) used when limiting fluxes
pub const DEFAULT_MAXIMUM_GRAD_PRESSURE: f64 = 30000.0;

/// Default maximum permeability (mD) used when limiting fluxes
pub const DEFAULT_FLUX_PERMEABILITY_MAXIMUM: f64 = 1.0e-3;

/// Default factor limiting the growth of consecutive Darcy time steps
pub const DEFAULT_TIME_STEP_SMOOTHING_FACTOR: f64 = 1.5;

/// Default maximum permeability (mD) in the multi-component flow
pub const DEFAULT_MAXIMUM_PERMEABILITY: f64 = 2.0e-4;

/// Default maximum fraction of the hydrocarbons in an element that may leave it in one step
pub const DEFAULT_MAXIMUM_HC_FRACTION_FOR_FLUX: f64 = 1.0;

/// Default scaling of the residual hydrocarbon saturation
pub const DEFAULT_RESIDUAL_HC_SATURATION_SCALING: f64 = 0.75;

/// Default fraction applied to the adaptive (CFL) time step
pub const DEFAULT_ADAPTIVE_TIME_STEP_FRACTION: f64 = 0.05;

/// Default maximum Darcy time step (Ma)
pub const DEFAULT_MAXIMUM_TIME_STEP: f64 = 1.0e9;
