use super::{DarcyError, DarcySolver, McfParameters};
use crate::base::{Config, Diagnostics, Tag};
use crate::layer::{FormationId, Formations};
use crate::parallel::Collective;
use crate::simulator::Mesh;
use crate::subdomain::Subdomain;
use crate::StrError;

/// Manages the Darcy subdomains of the multi-component flow solver
///
/// The subdomains are determined once, when the calculation mode is set. Each
/// formation belongs to at most one subdomain: a candidate overlapping an
/// accepted subdomain is rejected (first come, first served).
pub struct MultiComponentFlowHandler {
    /// Solves the flow equations (false makes every operation a no-op)
    solve_flow_equations: bool,

    /// Tuning parameters of the solver
    parameters: McfParameters,

    /// Accepted subdomains in acceptance order
    subdomains: Vec<Subdomain>,
}

impl MultiComponentFlowHandler {
    /// Allocates a handler without subdomains
    pub fn new(config: &Config) -> Self {
        MultiComponentFlowHandler {
            solve_flow_equations: config.solve_flow_equations,
            parameters: config.mcf.clone(),
            subdomains: Vec::new(),
        }
    }

    /// Determines and numbers the subdomains
    ///
    /// If `darcy_formations` is given, the subdomains are the contiguous runs of
    /// that list of sediment indices; otherwise they are found from the stack.
    pub fn initialise(
        &mut self,
        formations: &Formations,
        mesh: &Mesh,
        darcy_formations: Option<&[i64]>,
        diagnostics: &Diagnostics,
    ) -> Result<(), StrError> {
        if !self.solve_flow_equations {
            return Ok(());
        }
        match darcy_formations {
            Some(indices) => self.add_subdomains(formations, mesh, indices, diagnostics)?,
            None => self.determine_subdomains(formations, mesh)?,
        }
        self.number_subdomains();
        for subdomain in &self.subdomains {
            log::info!("\n{}", subdomain.image(formations));
        }
        Ok(())
    }

    /// Finds the subdomains from the stack of sediments
    ///
    /// Every maximal run of consecutive sediments included in the Darcy domain
    /// becomes a candidate; candidates without a source rock are discarded.
    pub fn determine_subdomains(&mut self, formations: &Formations, mesh: &Mesh) -> Result<(), StrError> {
        let sediments = formations.sediment_ids();
        let mut first = 0;
        while first < sediments.len() {
            if !formations[sediments[first]].include_in_darcy() {
                first += 1;
                continue;
            }
            let mut last = first;
            while last + 1 < sediments.len() && formations[sediments[last + 1]].include_in_darcy() {
                last += 1;
            }
            let has_source_rock = sediments[first..=last]
                .iter()
                .any(|id| formations[*id].is_source_rock());
            if has_source_rock {
                let candidate = Subdomain::new(formations, sediments[first], sediments[last], mesh)?;
                if !self.add_subdomain(candidate) {
                    log::debug!("subdomain [{}, {}] overlaps an accepted subdomain", first, last);
                }
            }
            first = last + 1;
        }
        Ok(())
    }

    /// Adds the subdomains given by a list of sediment indices
    ///
    /// The list is split into runs of consecutive indices, e.g. [0, 1, 1, 2]
    /// gives [0, 1] and [1, 2]. Runs outside the sediments are reported and
    /// skipped; runs overlapping an accepted subdomain are reported and dropped.
    pub fn add_subdomains(
        &mut self,
        formations: &Formations,
        mesh: &Mesh,
        indices: &[i64],
        diagnostics: &Diagnostics,
    ) -> Result<(), StrError> {
        let sediments = formations.sediment_ids();
        let last_index = sediments.len() as i64 - 1;
        for (count, (start, end)) in contiguous_runs(indices).into_iter().enumerate() {
            let in_range = |index: i64| 0 <= index && index <= last_index;
            if !in_range(start) || !in_range(end) {
                diagnostics.report(Tag::BasinError, &format!("invalid formation range: [{},{}]", start, end));
                diagnostics.report(
                    Tag::BasinError,
                    "This formation range will not be a part of the multi-component flow solver.",
                );
                continue;
            }
            let top = sediments[start as usize];
            let bottom = sediments[end as usize];
            let candidate = Subdomain::new(formations, top, bottom, mesh)?;
            if !self.add_subdomain(candidate) {
                diagnostics.report(
                    Tag::BasinWarning,
                    &format!(
                        "Subdomain {} with range [{},{}] was not added to the calculator.",
                        count + 1,
                        start,
                        end
                    ),
                );
                diagnostics.report(
                    Tag::BasinWarning,
                    &format!(
                        "Subdomain {} with range [{},{}] was not added to the calculator.",
                        count + 1,
                        formations[top].name,
                        formations[bottom].name
                    ),
                );
            }
        }
        Ok(())
    }

    /// Accepts a subdomain unless it overlaps an accepted one
    pub fn add_subdomain(&mut self, candidate: Subdomain) -> bool {
        if self.subdomains.iter().any(|s| s.overlaps(&candidate)) {
            return false;
        }
        self.subdomains.push(candidate);
        true
    }

    /// Numbers the subdomains from 1 in acceptance order
    pub fn number_subdomains(&mut self) {
        for (index, subdomain) in self.subdomains.iter_mut().enumerate() {
            subdomain.set_id(index + 1);
        }
    }

    /// Updates the activity of every subdomain
    ///
    /// All ranks must call this function (see [Subdomain::set_activity]).
    pub fn set_subdomain_activity(
        &mut self,
        formations: &Formations,
        mesh: &Mesh,
        collective: &Collective,
        age: f64,
    ) -> Result<(), StrError> {
        if !self.solve_flow_equations {
            return Ok(());
        }
        for subdomain in &mut self.subdomains {
            subdomain.set_activity(formations, mesh, collective, age)?;
        }
        Ok(())
    }

    /// Returns true if any subdomain is active
    pub fn any_subdomain_is_active(&self) -> bool {
        self.solve_flow_equations && self.subdomains.iter().any(|s| s.is_active())
    }

    /// Returns the number of active subdomains
    pub fn number_of_active_subdomains(&self) -> usize {
        if !self.solve_flow_equations {
            return 0;
        }
        self.subdomains.iter().filter(|s| s.is_active()).count()
    }

    /// Returns true if some subdomain holds a source rock containing sulphur
    pub fn model_contains_sulphur(&self) -> bool {
        self.solve_flow_equations && self.subdomains.iter().any(|s| s.contains_sulphur_source_rock())
    }

    /// Returns true if the formation belongs to a subdomain
    pub fn contains_formation(&self, formation: FormationId) -> bool {
        self.subdomains.iter().any(|s| s.has_layer(formation))
    }

    /// Advances the flow of every active subdomain; stops at the first failure
    pub fn solve(
        &self,
        previous_age: f64,
        current_age: f64,
        formations: &mut Formations,
        solver: &mut dyn DarcySolver,
    ) -> Result<(), DarcyError> {
        if !self.solve_flow_equations {
            return Ok(());
        }
        for subdomain in self.subdomains.iter().filter(|s| s.is_active()) {
            solver.solve(subdomain, formations, previous_age, current_age)?;
        }
        Ok(())
    }

    /// Returns true if the flow equations are solved
    pub fn solve_flow_equations(&self) -> bool {
        self.solve_flow_equations
    }

    /// Returns the tuning parameters
    pub fn parameters(&self) -> &McfParameters {
        &self.parameters
    }

    /// Returns the accepted subdomains
    pub fn subdomains(&self) -> &[Subdomain] {
        &self.subdomains
    }
}

/// Splits a list of indices into runs of consecutive values: (first, last)
fn contiguous_runs(indices: &[i64]) -> Vec<(i64, i64)> {
    let mut runs: Vec<(i64, i64)> = Vec::new();
    for index in indices {
        match runs.last_mut() {
            Some(run) if run.1 + 1 == *index => run.1 = *index,
            _ => runs.push((*index, *index)),
        }
    }
    runs
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{contiguous_runs, MultiComponentFlowHandler};
    use crate::base::{Config, Diagnostics, GridResolution, Phase};
    use crate::layer::{FormationId, Formations};
    use crate::mcf::{DarcyError, SaturationConsistencySolver};
    use crate::parallel::Collective;
    use crate::simulator::{Mesh, ProjectData, SampleProjects};
    use crate::StrError;

    struct Setup {
        formations: Formations,
        mesh: Mesh,
        collective: Collective,
        handler: MultiComponentFlowHandler,
    }

    fn setup(project: &ProjectData) -> Result<Setup, StrError> {
        let collective = Collective::serial();
        let mut mesh = Mesh::new(project, GridResolution::Low, 0, 1, false)?;
        mesh.initialise_element_grid(&collective)?;
        let mut formations = Formations::new(&project.formations);
        formations.initialise(&mesh)?;
        let mut config = Config::new();
        config.set_solve_flow_equations(true)?;
        Ok(Setup {
            formations,
            mesh,
            collective,
            handler: MultiComponentFlowHandler::new(&config),
        })
    }

    #[test]
    fn contiguous_runs_work() {
        assert!(contiguous_runs(&[]).is_empty());
        assert_eq!(contiguous_runs(&[3]), &[(3, 3)]);
        assert_eq!(contiguous_runs(&[0, 1, 1, 2]), &[(0, 1), (1, 2)]);
        assert_eq!(contiguous_runs(&[0, 1, 2, 5, 6]), &[(0, 2), (5, 6)]);
        assert_eq!(contiguous_runs(&[2, 1]), &[(2, 2), (1, 1)]);
    }

    #[test]
    fn determine_subdomains_works() -> Result<(), StrError> {
        let project = SampleProjects::layer_cake(3, 3, 1);
        let mut s = setup(&project)?;
        let diagnostics = Diagnostics::new_quiet(0);
        s.handler.initialise(&s.formations, &s.mesh, None, &diagnostics)?;
        assert_eq!(s.handler.subdomains().len(), 1);
        let subdomain = &s.handler.subdomains()[0];
        assert_eq!(subdomain.id(), 1);
        assert_eq!(subdomain.formations(), &[FormationId(1), FormationId(2)]);
        assert!(s.handler.contains_formation(FormationId(2)));
        assert!(!s.handler.contains_formation(FormationId(0)));
        assert!(!s.handler.model_contains_sulphur());
        Ok(())
    }

    #[test]
    fn runs_without_source_rock_are_discarded() -> Result<(), StrError> {
        let mut project = SampleProjects::layer_cake(3, 3, 1);
        project.formations[2].source_rock = false;
        let mut s = setup(&project)?;
        s.handler.determine_subdomains(&s.formations, &s.mesh)?;
        assert_eq!(s.handler.subdomains().len(), 0);
        Ok(())
    }

    #[test]
    fn add_subdomains_is_first_fit() -> Result<(), StrError> {
        let project = SampleProjects::darcy_stack(3, 3);
        let mut s = setup(&project)?;
        let diagnostics = Diagnostics::new_quiet(0);
        s.handler
            .initialise(&s.formations, &s.mesh, Some(&[0, 1, 1, 2, 3]), &diagnostics)?;
        let accepted: Vec<_> = s.handler.subdomains().iter().map(|s| s.formations().to_vec()).collect();
        // [1,1], [1,3] and [3,3] merge into the single range [1,3]
        assert_eq!(accepted, vec![vec![FormationId(0), FormationId(1)]]);
        assert_eq!(s.handler.subdomains()[0].id(), 1);
        assert!(!s.handler.contains_formation(FormationId(3)));
        assert!(diagnostics.contains("Basin_Warning Subdomain 2 with range [1,3] was not added to the calculator."));
        assert!(diagnostics.contains("Basin_Warning Subdomain 2 with range [B,D] was not added to the calculator."));
        assert_eq!(diagnostics.error_count(), 0);
        // the sulphur source rock D is outside every subdomain
        assert!(!s.handler.model_contains_sulphur());
        let all = s.handler.subdomains();
        for a in 0..all.len() {
            for b in (a + 1)..all.len() {
                assert!(!all[a].overlaps(&all[b]));
            }
        }
        Ok(())
    }

    #[test]
    fn add_subdomains_reports_invalid_ranges() -> Result<(), StrError> {
        let project = SampleProjects::darcy_stack(3, 3);
        let mut s = setup(&project)?;
        let diagnostics = Diagnostics::new_quiet(0);
        // the crust (index 4) is not a sediment
        s.handler.add_subdomains(&s.formations, &s.mesh, &[3, 4, -2], &diagnostics)?;
        assert_eq!(s.handler.subdomains().len(), 0);
        assert!(diagnostics.contains("Basin_Error invalid formation range: [3,4]"));
        assert!(diagnostics.contains("Basin_Error invalid formation range: [-2,-2]"));
        assert_eq!(diagnostics.error_count(), 4);
        Ok(())
    }

    #[test]
    fn activity_works() -> Result<(), StrError> {
        let project = SampleProjects::darcy_stack(3, 3);
        let mut s = setup(&project)?;
        let diagnostics = Diagnostics::new_quiet(0);
        s.handler
            .initialise(&s.formations, &s.mesh, Some(&[0, 1, 3]), &diagnostics)?;
        s.formations.find_active_elements(45.0);
        s.handler
            .set_subdomain_activity(&s.formations, &s.mesh, &s.collective, 45.0)?;
        assert_eq!(s.handler.number_of_active_subdomains(), 1);
        assert!(s.handler.any_subdomain_is_active());
        s.formations.find_active_elements(55.0);
        s.handler
            .set_subdomain_activity(&s.formations, &s.mesh, &s.collective, 55.0)?;
        assert!(!s.handler.any_subdomain_is_active());
        s.formations.find_active_elements(5.0);
        s.handler
            .set_subdomain_activity(&s.formations, &s.mesh, &s.collective, 5.0)?;
        assert_eq!(s.handler.number_of_active_subdomains(), 2);
        Ok(())
    }

    #[test]
    fn disabled_handler_does_nothing() -> Result<(), StrError> {
        let project = SampleProjects::darcy_stack(3, 3);
        let s = setup(&project)?;
        let mut handler = MultiComponentFlowHandler::new(&Config::new());
        let diagnostics = Diagnostics::new_quiet(0);
        handler.initialise(&s.formations, &s.mesh, None, &diagnostics)?;
        assert!(!handler.solve_flow_equations());
        assert_eq!(handler.subdomains().len(), 0);
        assert_eq!(handler.number_of_active_subdomains(), 0);
        Ok(())
    }

    #[test]
    fn solve_stops_at_the_first_error() -> Result<(), StrError> {
        let project = SampleProjects::darcy_stack(3, 3);
        let mut s = setup(&project)?;
        let diagnostics = Diagnostics::new_quiet(0);
        s.handler
            .initialise(&s.formations, &s.mesh, Some(&[0, 1, 3]), &diagnostics)?;
        s.formations.find_active_elements(5.0);
        s.formations.set_layer_element_activity(&s.mesh.map, 5.0);
        s.formations.allocate_new_vecs(&s.mesh, 10.0);
        s.handler
            .set_subdomain_activity(&s.formations, &s.mesh, &s.collective, 5.0)?;
        let mut solver = SaturationConsistencySolver::new();

        // oil arrives in B
        if let Some(flow) = s.formations[FormationId(1)].flow_vectors_mut() {
            flow.saturation_mut(Phase::Water)[(0, 0, 1)] = 0.6;
            flow.saturation_mut(Phase::Liquid)[(0, 0, 1)] = 0.4;
        }
        s.handler.solve(10.0, 5.0, &mut s.formations, &mut solver).unwrap();
        assert_eq!(solver.number_of_steps, 2);
        let flow = s.formations[FormationId(1)].flow_vectors().unwrap();
        assert_eq!(flow.time_of_invasion()[(0, 0, 1)], 5.0);

        // inconsistent saturation in A: the second subdomain is not solved
        if let Some(flow) = s.formations[FormationId(0)].flow_vectors_mut() {
            flow.saturation_mut(Phase::Water)[(1, 1, 0)] = 0.5;
        }
        let mut solver = SaturationConsistencySolver::new();
        assert_eq!(
            s.handler.solve(5.0, 0.0, &mut s.formations, &mut solver).err(),
            Some(DarcyError::ErrorCalculatingSaturation)
        );
        assert_eq!(solver.number_of_steps, 0);

        // negative mass in D
        if let Some(flow) = s.formations[FormationId(0)].flow_vectors_mut() {
            flow.saturation_mut(Phase::Water)[(1, 1, 0)] = 1.0;
        }
        if let Some(mass) = s.formations[FormationId(3)]
            .flow_vectors_mut()
            .and_then(|f| f.component_mass_mut(4))
        {
            mass[(0, 1, 0)] = -1.0;
        }
        assert_eq!(
            s.handler.solve(5.0, 0.0, &mut s.formations, &mut solver).err(),
            Some(DarcyError::ErrorCalculatingConcentration)
        );
        assert_eq!(solver.number_of_steps, 1);
        Ok(())
    }
}
