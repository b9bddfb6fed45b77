use crate::base::GridResolution;
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::path::Path;

/// Defines the calculation modes of the simulator
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum CalculationMode {
    /// Builds the model without solving anything
    NoCalculation,

    /// Hydrostatic decompaction on the low-resolution grid
    HydrostaticDecompaction,

    /// Hydrostatic decompaction on the high-resolution grid
    HydrostaticHighResDecompaction,

    /// Temperature with hydrostatic pressure
    HydrostaticTemperature,

    /// Overpressure with a previously computed temperature
    Overpressure,

    /// Temperature with a previously computed overpressure
    OverpressuredTemperature,

    /// High-resolution decompaction using the results of a coupled calculation
    CoupledHighResDecompaction,

    /// Fully-coupled pressure and temperature
    PressureAndTemperature,

    /// Hydrostatic temperature with Darcy flow
    HydrostaticDarcy,

    /// Fully-coupled pressure and temperature with Darcy flow
    CoupledDarcy,
}

impl CalculationMode {
    /// Holds all modes
    pub const ALL: [CalculationMode; 10] = [
        CalculationMode::NoCalculation,
        CalculationMode::HydrostaticDecompaction,
        CalculationMode::HydrostaticHighResDecompaction,
        CalculationMode::HydrostaticTemperature,
        CalculationMode::Overpressure,
        CalculationMode::OverpressuredTemperature,
        CalculationMode::CoupledHighResDecompaction,
        CalculationMode::PressureAndTemperature,
        CalculationMode::HydrostaticDarcy,
        CalculationMode::CoupledDarcy,
    ];

    /// Returns the name of the output activity started by the mode
    pub fn activity_name(&self) -> &'static str {
        match self {
            CalculationMode::NoCalculation => "NO_CALCULATION",
            CalculationMode::HydrostaticDecompaction => "Decompaction",
            CalculationMode::HydrostaticHighResDecompaction => "HighResDecompaction",
            CalculationMode::HydrostaticTemperature => "HydrostaticTemperature",
            CalculationMode::Overpressure => "Overpressure",
            CalculationMode::OverpressuredTemperature => "OverpressuredTemperature",
            CalculationMode::CoupledHighResDecompaction => "HighResDecompaction",
            CalculationMode::PressureAndTemperature => "CoupledPressureTemperature",
            CalculationMode::HydrostaticDarcy => "HydrostaticDarcy",
            CalculationMode::CoupledDarcy => "CoupledDarcy",
        }
    }

    /// Returns the resolution of the output grid
    pub fn resolution(&self) -> GridResolution {
        match self {
            CalculationMode::HydrostaticHighResDecompaction | CalculationMode::CoupledHighResDecompaction => {
                GridResolution::High
            }
            _ => GridResolution::Low,
        }
    }

    /// Parses a mode from its command line name (e.g. "itcoupled")
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "nocalculation" | "none" => Some(CalculationMode::NoCalculation),
            "decompaction" => Some(CalculationMode::HydrostaticDecompaction),
            "hrdecompaction" => Some(CalculationMode::HydrostaticHighResDecompaction),
            "temperature" => Some(CalculationMode::HydrostaticTemperature),
            "overpressure" => Some(CalculationMode::Overpressure),
            "itcoupled" => Some(CalculationMode::OverpressuredTemperature),
            "coupledhrdecompaction" => Some(CalculationMode::CoupledHighResDecompaction),
            "coupled" => Some(CalculationMode::PressureAndTemperature),
            "hydrostaticdarcy" => Some(CalculationMode::HydrostaticDarcy),
            "coupleddarcy" => Some(CalculationMode::CoupledDarcy),
            _ => None,
        }
    }

    /// Returns true for the modes with Darcy flow
    pub fn is_darcy(&self) -> bool {
        matches!(self, CalculationMode::HydrostaticDarcy | CalculationMode::CoupledDarcy)
    }

    /// Returns true for the modes solving the temperature
    pub fn solves_temperature(&self) -> bool {
        matches!(
            self,
            CalculationMode::HydrostaticTemperature
                | CalculationMode::OverpressuredTemperature
                | CalculationMode::PressureAndTemperature
                | CalculationMode::HydrostaticDarcy
                | CalculationMode::CoupledDarcy
        )
    }

    /// Returns true for the modes solving the pore pressure
    pub fn solves_pressure(&self) -> bool {
        matches!(
            self,
            CalculationMode::Overpressure | CalculationMode::PressureAndTemperature | CalculationMode::CoupledDarcy
        )
    }
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let image = match self {
            CalculationMode::NoCalculation => "No_Calculation",
            CalculationMode::HydrostaticDecompaction => "Hydrostatic_Decompaction",
            CalculationMode::HydrostaticHighResDecompaction => "Hydrostatic_High_Res_Decompaction",
            CalculationMode::HydrostaticTemperature => "Hydrostatic_Temperature",
            CalculationMode::Overpressure => "Overpressure",
            CalculationMode::OverpressuredTemperature => "Overpressured_Temperature",
            CalculationMode::CoupledHighResDecompaction => "Coupled_High_Res_Decompaction",
            CalculationMode::PressureAndTemperature => "Pressure_And_Temperature",
            CalculationMode::HydrostaticDarcy => "HydrostaticDarcy",
            CalculationMode::CoupledDarcy => "CoupledDarcy",
        };
        write!(f, "{}", image)
    }
}

/// Defines where an output property is written
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum OutputOption {
    /// Not written
    None,

    /// Written for the source rocks only
    SourceRockOnly,

    /// Written for the sediments only
    SedimentsOnly,

    /// Written for all formations
    SedimentsAndBasement,
}

/// Defines the properties known to the output layer
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub enum OutputProperty {
    Depth,
    Thickness,
    HydrostaticPressure,
    LithostaticPressure,
    PorePressure,
    Overpressure,
    Ves,
    MaxVes,
    Temperature,
    ChemicalCompaction,
    Porosity,
    Saturation,
    TimeOfInvasion,
}

impl OutputProperty {
    /// Holds all properties
    pub const ALL: [OutputProperty; 13] = [
        OutputProperty::Depth,
        OutputProperty::Thickness,
        OutputProperty::HydrostaticPressure,
        OutputProperty::LithostaticPressure,
        OutputProperty::PorePressure,
        OutputProperty::Overpressure,
        OutputProperty::Ves,
        OutputProperty::MaxVes,
        OutputProperty::Temperature,
        OutputProperty::ChemicalCompaction,
        OutputProperty::Porosity,
        OutputProperty::Saturation,
        OutputProperty::TimeOfInvasion,
    ];
}

/// Holds the output option of every property
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct OutputPropertySet {
    options: BTreeMap<OutputProperty, OutputOption>,
}

impl OutputPropertySet {
    /// Allocates a set with every property switched off
    pub fn new() -> Self {
        OutputPropertySet {
            options: OutputProperty::ALL.iter().map(|p| (*p, OutputOption::None)).collect(),
        }
    }

    /// Computes the default visibility of the properties for a calculation mode
    ///
    /// `chemical_compaction` and `flow` tell whether the chemical compaction and
    /// the Darcy flow equations are switched on.
    pub fn with_defaults(mode: CalculationMode, chemical_compaction: bool, flow: bool) -> Self {
        let mut set = OutputPropertySet::new();
        if mode == CalculationMode::NoCalculation {
            return set;
        }
        let sediments_if = |flag: bool| if flag { OutputOption::SedimentsOnly } else { OutputOption::None };
        set.set(OutputProperty::Depth, OutputOption::SedimentsAndBasement);
        set.set(OutputProperty::Thickness, OutputOption::SedimentsAndBasement);
        set.set(OutputProperty::HydrostaticPressure, OutputOption::SedimentsOnly);
        set.set(OutputProperty::LithostaticPressure, OutputOption::SedimentsOnly);
        set.set(OutputProperty::Ves, OutputOption::SedimentsOnly);
        set.set(OutputProperty::MaxVes, OutputOption::SedimentsOnly);
        set.set(OutputProperty::Porosity, OutputOption::SedimentsOnly);
        set.set(OutputProperty::PorePressure, sediments_if(mode.solves_pressure()));
        set.set(OutputProperty::Overpressure, sediments_if(mode.solves_pressure()));
        set.set(OutputProperty::ChemicalCompaction, sediments_if(chemical_compaction));
        set.set(OutputProperty::Saturation, sediments_if(mode.is_darcy() && flow));
        set.set(OutputProperty::TimeOfInvasion, sediments_if(mode.is_darcy() && flow));
        if mode.solves_temperature() {
            set.set(OutputProperty::Temperature, OutputOption::SedimentsAndBasement);
        }
        set
    }

    /// Returns the option of a property
    pub fn get(&self, property: OutputProperty) -> OutputOption {
        self.options.get(&property).copied().unwrap_or(OutputOption::None)
    }

    /// Sets the option of a property
    pub fn set(&mut self, property: OutputProperty, option: OutputOption) -> &mut Self {
        self.options.insert(property, option);
        self
    }

    /// Returns the properties that are written
    pub fn visible(&self) -> Vec<OutputProperty> {
        self.options
            .iter()
            .filter(|(_, o)| **o != OutputOption::None)
            .map(|(p, _)| *p)
            .collect()
    }
}

/// Holds the output activity started by a calculation mode
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct OutputActivity {
    /// Name of the activity
    pub name: String,

    /// Resolution of the output grid
    pub resolution: GridResolution,

    /// Path of the results file (None if file output is disabled)
    pub path: Option<String>,

    /// Output option of every property
    pub properties: OutputPropertySet,
}

impl OutputActivity {
    /// Starts the activity of a calculation mode
    ///
    /// If `output_dir` is given, the directory is created and the activity is
    /// written to `{output_dir}/{project_name}_{activity}.json`.
    pub fn start(
        mode: CalculationMode,
        project_name: &str,
        output_dir: Option<&str>,
        properties: OutputPropertySet,
    ) -> Result<Self, StrError> {
        let mut activity = OutputActivity {
            name: mode.activity_name().to_string(),
            resolution: mode.resolution(),
            path: None,
            properties,
        };
        if let Some(dir) = output_dir {
            fs::create_dir_all(dir).map_err(|_| "cannot create output directory")?;
            let path = format!("{}/{}_{}.json", dir, project_name, activity.name);
            activity.path = Some(path.clone());
            activity.write_json(&path)?;
        }
        Ok(activity)
    }

    /// Writes a JSON file with the activity
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer_pretty(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{CalculationMode, OutputActivity, OutputOption, OutputProperty, OutputPropertySet};
    use crate::base::{GridResolution, DEFAULT_TEST_DIR};
    use crate::StrError;

    #[test]
    fn mode_table_works() {
        let activities: Vec<_> = CalculationMode::ALL.iter().map(|m| m.activity_name()).collect();
        assert_eq!(
            activities,
            &[
                "NO_CALCULATION",
                "Decompaction",
                "HighResDecompaction",
                "HydrostaticTemperature",
                "Overpressure",
                "OverpressuredTemperature",
                "HighResDecompaction",
                "CoupledPressureTemperature",
                "HydrostaticDarcy",
                "CoupledDarcy",
            ]
        );
        let high: Vec<_> = CalculationMode::ALL
            .iter()
            .filter(|m| m.resolution() == GridResolution::High)
            .copied()
            .collect();
        assert_eq!(
            high,
            &[
                CalculationMode::HydrostaticHighResDecompaction,
                CalculationMode::CoupledHighResDecompaction
            ]
        );
        assert_eq!(format!("{}", CalculationMode::PressureAndTemperature), "Pressure_And_Temperature");
    }

    #[test]
    fn from_name_works() {
        assert_eq!(
            CalculationMode::from_name("ItCoupled"),
            Some(CalculationMode::OverpressuredTemperature)
        );
        assert_eq!(CalculationMode::from_name(" coupled "), Some(CalculationMode::PressureAndTemperature));
        assert_eq!(CalculationMode::from_name("darcy"), None);
        assert!(CalculationMode::CoupledDarcy.is_darcy());
        assert!(CalculationMode::CoupledDarcy.solves_pressure());
        assert!(!CalculationMode::HydrostaticDecompaction.solves_temperature());
    }

    #[test]
    fn default_visibility_works() {
        let set = OutputPropertySet::with_defaults(CalculationMode::NoCalculation, true, true);
        assert!(set.visible().is_empty());
        let set = OutputPropertySet::with_defaults(CalculationMode::HydrostaticTemperature, false, false);
        assert_eq!(set.get(OutputProperty::Temperature), OutputOption::SedimentsAndBasement);
        assert_eq!(set.get(OutputProperty::Overpressure), OutputOption::None);
        assert_eq!(set.get(OutputProperty::Saturation), OutputOption::None);
        let set = OutputPropertySet::with_defaults(CalculationMode::CoupledDarcy, true, true);
        assert_eq!(set.get(OutputProperty::Overpressure), OutputOption::SedimentsOnly);
        assert_eq!(set.get(OutputProperty::ChemicalCompaction), OutputOption::SedimentsOnly);
        assert_eq!(set.get(OutputProperty::TimeOfInvasion), OutputOption::SedimentsOnly);
        assert_eq!(set.visible().len(), 13);
    }

    #[test]
    fn start_works() -> Result<(), StrError> {
        let properties = OutputPropertySet::new();
        let activity = OutputActivity::start(CalculationMode::Overpressure, "basin", None, properties.clone())?;
        assert_eq!(activity.name, "Overpressure");
        assert_eq!(activity.path, None);
        let dir = format!("{}/activity", DEFAULT_TEST_DIR);
        let activity = OutputActivity::start(CalculationMode::HydrostaticHighResDecompaction, "basin", Some(&dir), properties)?;
        assert_eq!(activity.resolution, GridResolution::High);
        assert_eq!(activity.path, Some(format!("{}/basin_HighResDecompaction.json", dir)));
        Ok(())
    }
}
