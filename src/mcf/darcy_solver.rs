use super::DarcyError;
use crate::base::{Phase, NULL_VALUE, NUMBER_OF_PVT_COMPONENTS};
use crate::layer::Formations;
use crate::subdomain::Subdomain;

/// Defines the solver advancing the multi-component flow of one subdomain
pub trait DarcySolver {
    /// Advances the flow of an active subdomain from `previous_age` to `current_age`
    fn solve(
        &mut self,
        subdomain: &Subdomain,
        formations: &mut Formations,
        previous_age: f64,
        current_age: f64,
    ) -> Result<(), DarcyError>;
}

/// Implements a Darcy step without transport: checks the flow state and records invasions
///
/// The saturations of each owned element must lie in [0, 1] and add up to one,
/// and the component masses must be non-negative. Elements holding hydrocarbons
/// for the first time get the current age as time of invasion.
pub struct SaturationConsistencySolver {
    /// Tolerance on the sum of the saturations
    pub tolerance: f64,

    /// Number of steps solved so far
    pub number_of_steps: usize,
}

impl SaturationConsistencySolver {
    /// Allocates a new instance
    pub fn new() -> Self {
        SaturationConsistencySolver {
            tolerance: 1e-8,
            number_of_steps: 0,
        }
    }
}

impl DarcySolver for SaturationConsistencySolver {
    fn solve(
        &mut self,
        subdomain: &Subdomain,
        formations: &mut Formations,
        previous_age: f64,
        current_age: f64,
    ) -> Result<(), DarcyError> {
        if current_age > previous_age {
            return Err(DarcyError::UnknownDarcyError);
        }
        for id in subdomain.formations() {
            let layer = &mut formations[*id];
            if !layer.is_active() {
                continue;
            }
            let flow = match layer.flow_vectors_mut() {
                Some(flow) => flow,
                None => continue,
            };
            let owned = *flow.time_of_invasion().owned();
            let n = flow.time_of_invasion().len_k();
            for (i, j) in owned.iter() {
                for k in 0..n {
                    let mut sum = 0.0;
                    for phase in Phase::ALL {
                        let s = flow.saturation(phase)[(i, j, k)];
                        if !(0.0..=1.0).contains(&s) {
                            return Err(DarcyError::ErrorCalculatingSaturation);
                        }
                        sum += s;
                    }
                    if f64::abs(sum - 1.0) > self.tolerance {
                        return Err(DarcyError::ErrorCalculatingSaturation);
                    }
                    for c in 0..NUMBER_OF_PVT_COMPONENTS {
                        let mass = flow.component_mass(c).map(|m| m[(i, j, k)]).unwrap_or(0.0);
                        if mass < 0.0 {
                            return Err(DarcyError::ErrorCalculatingConcentration);
                        }
                    }
                    let hc = flow.saturation(Phase::Liquid)[(i, j, k)] + flow.saturation(Phase::Vapour)[(i, j, k)];
                    let invasion = &mut flow.time_of_invasion_mut()[(i, j, k)];
                    if hc > 0.0 && *invasion == NULL_VALUE {
                        *invasion = current_age;
                    }
                }
            }
        }
        self.number_of_steps += 1;
        Ok(())
    }
}
