use crate::base::FormationKind;
use crate::grid::GridDescription;
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the present-day thickness of a formation over the high-resolution nodes
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum ThicknessMap {
    /// Same thickness at every node
    Uniform(f64),

    /// One thickness per high-resolution node (i runs fastest)
    Nodal(Vec<f64>),
}

impl ThicknessMap {
    /// Returns the thickness at the high-resolution node (i,j)
    pub fn value(&self, i: usize, j: usize, n_nodes_x: usize) -> f64 {
        match self {
            ThicknessMap::Uniform(t) => *t,
            ThicknessMap::Nodal(values) => values.get(j * n_nodes_x + i).copied().unwrap_or(0.0),
        }
    }
}

/// Holds an erosion event removing thickness from the top of a formation
///
/// The eroded thickness grows linearly from zero at `start_age` to `thickness`
/// at `end_age`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct ErosionEvent {
    /// Age at which the erosion starts (Ma)
    pub start_age: f64,

    /// Age at which the erosion ends (Ma)
    pub end_age: f64,

    /// Total eroded thickness (m)
    pub thickness: f64,
}

/// Holds the stratigraphic record of a formation
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FormationRecord {
    /// Formation name (unique in the project)
    pub name: String,

    /// Formation kind
    pub kind: FormationKind,

    /// Age at which the deposition starts (Ma); older is larger
    pub deposition_start_age: f64,

    /// Age at which the deposition ends (Ma)
    pub depo_age: f64,

    /// Number of elements in depth before refinement
    pub base_element_count: usize,

    /// Present-day thickness (before erosion)
    pub present_day_thickness: ThicknessMap,

    /// Relative thickness of each element, top to bottom (uniform if empty)
    #[serde(default)]
    pub segment_weights: Vec<f64>,

    /// Optional erosion event after the deposition
    #[serde(default)]
    pub erosion: Option<ErosionEvent>,

    /// Ratio between solid and real thickness
    pub solid_fraction: f64,

    /// The formation is a source rock
    #[serde(default)]
    pub source_rock: bool,

    /// The source rock contains sulphur
    #[serde(default)]
    pub sulphur: bool,

    /// The formation takes part in the multi-component flow
    #[serde(default)]
    pub include_in_darcy: bool,

    /// The formation is a mobile layer (e.g., salt)
    #[serde(default)]
    pub mobile: bool,
}

impl FormationRecord {
    /// Allocates a sediment record with uniform thickness
    pub fn sediment(name: &str, deposition_start_age: f64, depo_age: f64, base_element_count: usize, thickness: f64) -> Self {
        FormationRecord {
            name: name.to_string(),
            kind: FormationKind::Sediment,
            deposition_start_age,
            depo_age,
            base_element_count,
            present_day_thickness: ThicknessMap::Uniform(thickness),
            segment_weights: Vec::new(),
            erosion: None,
            solid_fraction: 0.7,
            source_rock: false,
            sulphur: false,
            include_in_darcy: false,
            mobile: false,
        }
    }

    /// Allocates a crust or mantle record with uniform thickness
    ///
    /// The basement exists from the beginning of the basin history.
    pub fn basement(name: &str, kind: FormationKind, base_element_count: usize, thickness: f64) -> Self {
        FormationRecord {
            name: name.to_string(),
            kind,
            deposition_start_age: f64::MAX,
            depo_age: f64::MAX,
            base_element_count,
            present_day_thickness: ThicknessMap::Uniform(thickness),
            segment_weights: Vec::new(),
            erosion: None,
            solid_fraction: 1.0,
            source_rock: false,
            sulphur: false,
            include_in_darcy: false,
            mobile: false,
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self, n_nodes: usize) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("formation name must not be empty".to_string());
        }
        if self.base_element_count < 1 {
            return Some(format!("formation {}: base_element_count must be ≥ 1", self.name));
        }
        if self.kind.is_sediment() && !(self.deposition_start_age > self.depo_age) {
            return Some(format!(
                "formation {}: deposition_start_age = {:?} must be greater than depo_age = {:?}",
                self.name, self.deposition_start_age, self.depo_age
            ));
        }
        if self.solid_fraction <= 0.0 || self.solid_fraction > 1.0 {
            return Some(format!(
                "formation {}: solid_fraction = {:?} must be in (0, 1]",
                self.name, self.solid_fraction
            ));
        }
        match &self.present_day_thickness {
            ThicknessMap::Uniform(t) => {
                if *t < 0.0 {
                    return Some(format!("formation {}: thickness must be ≥ 0", self.name));
                }
            }
            ThicknessMap::Nodal(values) => {
                if values.len() != n_nodes {
                    return Some(format!(
                        "formation {}: thickness map has {} values but the grid has {} nodes",
                        self.name,
                        values.len(),
                        n_nodes
                    ));
                }
                if values.iter().any(|t| *t < 0.0) {
                    return Some(format!("formation {}: thickness must be ≥ 0", self.name));
                }
            }
        }
        if !self.segment_weights.is_empty() {
            if self.segment_weights.len() != self.base_element_count {
                return Some(format!(
                    "formation {}: there must be one segment weight per element ({})",
                    self.name, self.base_element_count
                ));
            }
            if self.segment_weights.iter().any(|w| *w < 0.0) || self.segment_weights.iter().sum::<f64>() <= 0.0 {
                return Some(format!(
                    "formation {}: segment weights must be ≥ 0 with a positive sum",
                    self.name
                ));
            }
        }
        if let Some(erosion) = &self.erosion {
            if !(erosion.start_age > erosion.end_age) || erosion.start_age > self.depo_age || erosion.thickness < 0.0 {
                return Some(format!(
                    "formation {}: erosion must happen after the deposition with start_age > end_age",
                    self.name
                ));
            }
        }
        None
    }
}

/// Holds the data of a basin project
///
/// Formations are listed from the top of the stratigraphy (youngest) to the bottom.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ProjectData {
    /// Project name
    pub name: String,

    /// High-resolution grid
    pub grid: GridDescription,

    /// Sub-sampling of the high-resolution grid giving the low-resolution grid
    pub low_resolution_step: (usize, usize),

    /// Validity of the high-resolution nodes (i runs fastest); all valid if None
    #[serde(default)]
    pub node_validity: Option<Vec<bool>>,

    /// Formations from top to bottom
    pub formations: Vec<FormationRecord>,

    /// Snapshot ages (Ma) visited by the run loop, oldest first
    pub snapshots: Vec<f64>,
}

impl ProjectData {
    /// Returns true if the high-resolution node (i,j) is valid
    pub fn node_is_valid(&self, i: usize, j: usize) -> bool {
        match &self.node_validity {
            Some(validity) => validity.get(j * self.grid.n_nodes_x + i).copied().unwrap_or(false),
            None => i < self.grid.n_nodes_x && j < self.grid.n_nodes_y,
        }
    }

    /// Returns the index of the formation with the given name
    pub fn formation_index(&self, name: &str) -> Option<usize> {
        self.formations.iter().position(|f| f.name == name)
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if let Some(err) = self.grid.validate() {
            return Some(err);
        }
        if self.low_resolution_step.0 < 1 || self.low_resolution_step.1 < 1 {
            return Some("low_resolution_step must be ≥ 1 in both directions".to_string());
        }
        let n_nodes = self.grid.n_nodes_x * self.grid.n_nodes_y;
        if let Some(validity) = &self.node_validity {
            if validity.len() != n_nodes {
                return Some(format!(
                    "node_validity has {} values but the grid has {} nodes",
                    validity.len(),
                    n_nodes
                ));
            }
        }
        if self.formations.is_empty() {
            return Some("there must be at least one formation".to_string());
        }
        for (index, formation) in self.formations.iter().enumerate() {
            if let Some(err) = formation.validate(n_nodes) {
                return Some(err);
            }
            if self.formations[..index].iter().any(|f| f.name == formation.name) {
                return Some(format!("formation name {} is repeated", formation.name));
            }
        }
        if self.snapshots.windows(2).any(|w| w[0] <= w[1]) {
            return Some("snapshot ages must be sorted from the oldest to the youngest".to_string());
        }
        None
    }

    /// Reads a JSON file containing the project data
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
        let project = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(project)
    }

    /// Writes a JSON file with the project data
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

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
