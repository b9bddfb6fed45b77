use fastcauldron::prelude::*;
use fastcauldron::StrError;

fn simulator(project: ProjectData, darcy_formations: Option<&[i64]>) -> Result<FastcauldronSimulator, StrError> {
    let mut config = Config::new();
    config.set_solve_flow_equations(true)?;
    if let Some(indices) = darcy_formations {
        config.set_darcy_formations(indices)?;
    }
    FastcauldronSimulator::new(project, config, Box::new(SerialComm))
}

#[test]
fn overlapping_ranges_keep_the_first_one() -> Result<(), StrError> {
    let mut sim = simulator(SampleProjects::darcy_stack(3, 3), Some(&[0, 1, 1, 2]))?;
    assert!(sim.set_calculation_mode(CalculationMode::CoupledDarcy)?);
    let handler = sim.flow_handler().unwrap();
    assert_eq!(handler.subdomains().len(), 1);
    assert_eq!(handler.subdomains()[0].formations(), &[FormationId(0), FormationId(1)]);
    assert_eq!(handler.subdomains()[0].id(), 1);
    assert!(!handler.contains_formation(FormationId(2)));
    assert!(sim
        .diagnostics()
        .contains("Basin_Warning Subdomain 2 with range [1,2] was not added to the calculator."));
    assert!(sim
        .diagnostics()
        .contains("Basin_Warning Subdomain 2 with range [B,C] was not added to the calculator."));
    assert_eq!(sim.diagnostics().error_count(), 0);
    Ok(())
}

#[test]
fn invalid_ranges_are_reported_and_skipped() -> Result<(), StrError> {
    let mut sim = simulator(SampleProjects::darcy_stack(3, 3), Some(&[2, 3, 4, 7]))?;
    assert!(sim.set_calculation_mode(CalculationMode::HydrostaticDarcy)?);
    assert_eq!(sim.flow_handler().unwrap().subdomains().len(), 0);
    assert!(sim.diagnostics().contains("Basin_Error invalid formation range: [2,4]"));
    assert!(sim.diagnostics().contains("Basin_Error invalid formation range: [7,7]"));
    assert_eq!(sim.diagnostics().error_count(), 4);
    Ok(())
}

#[test]
fn subdomains_without_source_rock_are_discarded() -> Result<(), StrError> {
    let mut project = SampleProjects::layer_cake(3, 3, 1);
    for formation in &mut project.formations {
        formation.source_rock = false;
    }
    let mut sim = simulator(project, None)?;
    assert!(sim.set_calculation_mode(CalculationMode::HydrostaticDarcy)?);
    assert!(sim.flow_handler().unwrap().subdomains().is_empty());
    sim.prepare_time_step(0.0)?;
    assert!(!sim.flow_handler().unwrap().any_subdomain_is_active());
    Ok(())
}

#[test]
fn no_active_elements_builds_no_solver_state() -> Result<(), StrError> {
    let mut sim = simulator(SampleProjects::without_valid_nodes(4, 4), None)?;
    assert_eq!(sim.set_calculation_mode(CalculationMode::CoupledDarcy)?, false);
    assert!(!sim.mesh().unwrap().has_active_elements);
    assert!(sim.flow_handler().is_none());
    assert!(sim.formations().iter().all(|l| !l.is_initialised()));
    assert!(sim
        .diagnostics()
        .contains("MeSsAgE ERROR there are no active elements in the mesh."));
    Ok(())
}

#[test]
fn non_darcy_modes_have_no_flow_handler() -> Result<(), StrError> {
    let mut sim = simulator(SampleProjects::layer_cake(3, 3, 1), None)?;
    assert!(sim.set_calculation_mode(CalculationMode::Overpressure)?);
    assert!(sim.flow_handler().is_none());
    Ok(())
}

#[test]
fn validity_map_marks_invalid_elements() -> Result<(), StrError> {
    // the invalid node (0,0) invalidates the element (0,0) only
    let mut sim = simulator(SampleProjects::with_invalid_nodes(4, 3, &[(0, 0)]), None)?;
    assert!(sim.set_calculation_mode(CalculationMode::HydrostaticDecompaction)?);
    let image = sim.element_validity_map_image().unwrap();
    let lines: Vec<_> = image.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.chars().count() == 3));
    let map = &sim.mesh().unwrap().map;
    assert!(!map.is_valid(0, 0));
    assert!(map.is_valid(1, 0));
    assert_eq!(map.number_of_valid_owned(), 5);
    Ok(())
}

#[test]
fn run_visits_every_snapshot() -> Result<(), StrError> {
    let mut sim = simulator(SampleProjects::layer_cake(3, 3, 1), None)?;
    assert!(sim.set_calculation_mode(CalculationMode::HydrostaticDarcy)?);
    let mut solver = SaturationConsistencySolver::new();
    let summary = run(&mut sim, &mut solver)?;
    assert!(summary.completed);
    assert_eq!(summary.ages, &[60.0, 40.0, 20.0, 10.0, 0.0]);
    assert_eq!(summary.active_subdomains, &[0, 1, 1, 1, 1]);
    assert_eq!(summary.darcy_error, None);
    Ok(())
}
