use std::fmt;

/// Defines the failures of a Darcy time step
///
/// The message of each variant carries the `Basin_Error` tag looked for by
/// the tools reading the simulator output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DarcyError {
    /// The saturations could not be computed (probably negative concentrations)
    ErrorCalculatingSaturation,

    /// The concentrations could not be computed (probably negative concentrations)
    ErrorCalculatingConcentration,

    /// Any other failure
    UnknownDarcyError,
}

impl fmt::Display for DarcyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DarcyError::ErrorCalculatingSaturation => {
                write!(f, " Basin_Error:  Error when calculating the saturations. \n").unwrap();
                write!(f, " Basin_Error:  To fix this try reducing the Darcy time-step size.\n").unwrap();
            }
            DarcyError::ErrorCalculatingConcentration => {
                write!(f, " Basin_Error:  Error when calculating the concentrations. \n").unwrap();
                write!(f, " Basin_Error:  To fix this try reducing the Darcy time-step size.\n").unwrap();
            }
            DarcyError::UnknownDarcyError => {
                write!(f, " Basin_Error: An unknown error occurred \n").unwrap();
            }
        }
        Ok(())
    }
}

impl std::error::Error for DarcyError {}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::DarcyError;

    #[test]
    fn display_works() {
        let message = format!("{}", DarcyError::ErrorCalculatingSaturation);
        assert!(message.starts_with(" Basin_Error:  Error when calculating the saturations."));
        assert!(message.contains("reducing the Darcy time-step size"));
        let message = format!("{}", DarcyError::ErrorCalculatingConcentration);
        assert!(message.contains("concentrations"));
        assert_eq!(
            format!("{}", DarcyError::UnknownDarcyError),
            " Basin_Error: An unknown error occurred \n"
        );
    }
}
