use crate::mcf::McfParameters;
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the run-wide configuration of a basin simulation
///
/// The configuration collects the scalar tuning parameters that the command
/// line (or a JSON file) supplies at startup. The core never parses command
/// line syntax itself; see `src/bin/fastcauldron.rs`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Uses the solid thickness (instead of the real thickness) as depositing thickness
    ///
    /// This corresponds to the geometric (iterative pressure) loop.
    pub geometric_loop: bool,

    /// Debug level (0 to 4); level 2 prints the element validity map
    pub debug_level: usize,

    /// Prints informative messages
    pub verbose: bool,

    /// Directory for the output activity files (None disables file output)
    pub output_dir: Option<String>,

    /// Element height refinement by formation name: name, factor, name, factor, ...
    pub refine_named_formations: Vec<String>,

    /// Element height refinement by formation index: index, factor, index, factor, ...
    pub refine_numbered_formations: Vec<String>,

    /// Keeps the results computed so far if the Darcy solver fails
    pub save_on_darcy_error: bool,

    /// Activates the permafrost model
    pub permafrost: bool,

    /// Activates the advanced lithosphere calculator (ALC)
    pub alc: bool,

    /// Activates the chemical compaction
    pub chemical_compaction: bool,

    /// Solves the multi-component (Darcy) flow equations
    pub solve_flow_equations: bool,

    /// Explicit list of sediment indices making up the Darcy subdomains
    ///
    /// **Note:** If None, the subdomains are determined from the formation stack.
    pub darcy_formations: Option<Vec<i64>>,

    /// Surface temperature (°C) used to initialise the temperature field
    pub surface_temperature: f64,

    /// Parameters of the multi-component flow solver
    pub mcf: McfParameters,
}

impl Config {
    /// Allocates a new instance
    pub fn new() -> Self {
        Config {
            geometric_loop: false,
            debug_level: 0,
            verbose: false,
            output_dir: None,
            refine_named_formations: Vec::new(),
            refine_numbered_formations: Vec::new(),
            save_on_darcy_error: false,
            permafrost: false,
            alc: false,
            chemical_compaction: false,
            solve_flow_equations: false,
            darcy_formations: None,
            surface_temperature: 10.0,
            mcf: McfParameters::new(),
        }
    }

    /// Sets the geometric loop (solid thickness) flag
    pub fn set_geometric_loop(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.geometric_loop = flag;
        Ok(self)
    }

    /// Sets the debug level
    pub fn set_debug_level(&mut self, level: usize) -> Result<&mut Self, StrError> {
        if level > 4 {
            return Err("debug level must be in 0 ≤ level ≤ 4");
        }
        self.debug_level = level;
        Ok(self)
    }

    /// Sets the verbose flag
    pub fn set_verbose(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.verbose = flag;
        Ok(self)
    }

    /// Sets the output directory
    pub fn set_output_dir(&mut self, dir: &str) -> Result<&mut Self, StrError> {
        if dir.trim().is_empty() {
            return Err("output directory must not be empty");
        }
        self.output_dir = Some(dir.to_string());
        Ok(self)
    }

    /// Sets the refinement by formation name (pairs of name and factor)
    pub fn set_refine_named_formations(&mut self, args: &[&str]) -> Result<&mut Self, StrError> {
        self.refine_named_formations = args.iter().map(|s| s.to_string()).collect();
        Ok(self)
    }

    /// Sets the refinement by formation index (pairs of index and factor)
    pub fn set_refine_numbered_formations(&mut self, args: &[&str]) -> Result<&mut Self, StrError> {
        self.refine_numbered_formations = args.iter().map(|s| s.to_string()).collect();
        Ok(self)
    }

    /// Keeps the results computed so far if the Darcy solver fails
    pub fn set_save_on_darcy_error(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.save_on_darcy_error = flag;
        Ok(self)
    }

    /// Sets the permafrost flag
    pub fn set_permafrost(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.permafrost = flag;
        Ok(self)
    }

    /// Sets the ALC flag
    pub fn set_alc(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.alc = flag;
        Ok(self)
    }

    /// Sets the chemical compaction flag
    pub fn set_chemical_compaction(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.chemical_compaction = flag;
        Ok(self)
    }

    /// Enables the multi-component flow solver
    pub fn set_solve_flow_equations(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.solve_flow_equations = flag;
        Ok(self)
    }

    /// Sets the explicit list of sediment indices in the Darcy subdomains
    pub fn set_darcy_formations(&mut self, indices: &[i64]) -> Result<&mut Self, StrError> {
        if indices.is_empty() {
            return Err("the list of Darcy formations must not be empty");
        }
        self.darcy_formations = Some(indices.to_vec());
        Ok(self)
    }

    /// Sets the surface temperature
    pub fn set_surface_temperature(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value < -273.15 {
            return Err("surface temperature must be ≥ -273.15");
        }
        self.surface_temperature = value;
        Ok(self)
    }

    /// Sets the parameters of the multi-component flow solver
    pub fn set_mcf(&mut self, mcf: McfParameters) -> Result<&mut Self, StrError> {
        self.mcf = mcf;
        Ok(self)
    }

    /// Returns true if the element validity map must be printed
    pub fn debug2(&self) -> bool {
        self.debug_level >= 2
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.debug_level > 4 {
            return Some(format!(
                "debug_level = {:?} is incorrect; it must be in [0, 4]",
                self.debug_level
            ));
        }
        if self.refine_named_formations.len() % 2 != 0 {
            return Some(format!(
                "refine_named_formations has {} values; it must have (name, factor) pairs",
                self.refine_named_formations.len()
            ));
        }
        if self.refine_numbered_formations.len() % 2 != 0 {
            return Some(format!(
                "refine_numbered_formations has {} values; it must have (index, factor) pairs",
                self.refine_numbered_formations.len()
            ));
        }
        if let Some(indices) = &self.darcy_formations {
            if indices.is_empty() {
                return Some("darcy_formations must not be empty".to_string());
            }
        }
        self.mcf.validate()
    }

    /// Reads a JSON file containing the configuration
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
        let config = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(config)
    }

    /// Writes a JSON file with the configuration
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
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration data\n").unwrap();
        write!(f, "==================\n").unwrap();
        write!(f, "geometric_loop = {:?}\n", self.geometric_loop).unwrap();
        write!(f, "debug_level = {:?}\n", self.debug_level).unwrap();
        write!(f, "output_dir = {:?}\n", self.output_dir).unwrap();
        write!(f, "refine_named_formations = {:?}\n", self.refine_named_formations).unwrap();
        write!(f, "refine_numbered_formations = {:?}\n", self.refine_numbered_formations).unwrap();
        write!(f, "save_on_darcy_error = {:?}\n", self.save_on_darcy_error).unwrap();
        write!(f, "permafrost = {:?}\n", self.permafrost).unwrap();
        write!(f, "alc = {:?}\n", self.alc).unwrap();
        write!(f, "solve_flow_equations = {:?}\n", self.solve_flow_equations).unwrap();
        write!(f, "darcy_formations = {:?}\n", self.darcy_formations).unwrap();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::base::DEFAULT_TEST_DIR;
    use crate::mcf::McfParameters;
    use crate::StrError;

    #[test]
    fn new_works() -> Result<(), StrError> {
        let mut config = Config::new();
        config
            .set_geometric_loop(true)?
            .set_debug_level(2)?
            .set_refine_named_formations(&["Shale", "2"])?
            .set_refine_numbered_formations(&["0", "3"])?
            .set_solve_flow_equations(true)?
            .set_darcy_formations(&[0, 1])?;
        assert!(config.debug2());
        assert_eq!(config.validate(), None);
        assert_eq!(
            format!("{}", config),
            "Configuration data\n\
             ==================\n\
             geometric_loop = true\n\
             debug_level = 2\n\
             output_dir = None\n\
             refine_named_formations = [\"Shale\", \"2\"]\n\
             refine_numbered_formations = [\"0\", \"3\"]\n\
             save_on_darcy_error = false\n\
             permafrost = false\n\
             alc = false\n\
             solve_flow_equations = true\n\
             darcy_formations = Some([0, 1])\n"
        );
        Ok(())
    }

    #[test]
    fn catch_some_errors() -> Result<(), StrError> {
        let mut config = Config::new();
        assert_eq!(config.set_debug_level(5).err(), Some("debug level must be in 0 ≤ level ≤ 4"));
        assert_eq!(config.set_output_dir(" ").err(), Some("output directory must not be empty"));
        assert_eq!(
            config.set_darcy_formations(&[]).err(),
            Some("the list of Darcy formations must not be empty")
        );
        config.set_refine_named_formations(&["Shale", "2", "Sand"])?;
        assert_eq!(
            config.validate(),
            Some("refine_named_formations has 3 values; it must have (name, factor) pairs".to_string())
        );
        Ok(())
    }

    #[test]
    fn read_and_write_json_work() -> Result<(), StrError> {
        let mut mcf = McfParameters::new();
        mcf.set_quadrature_degree(4)?;
        let mut config = Config::new();
        config
            .set_permafrost(true)?
            .set_surface_temperature(4.0)?
            .set_verbose(true)?
            .set_chemical_compaction(true)?
            .set_mcf(mcf)?;
        let path = format!("{}/config_read_and_write_json.json", DEFAULT_TEST_DIR);
        config.write_json(&path)?;
        let read = Config::read_json(&path)?;
        assert_eq!(read, config);
        assert_eq!(Config::read_json("/tmp/not_found/config.json").err(), Some("cannot open file"));
        Ok(())
    }
}
