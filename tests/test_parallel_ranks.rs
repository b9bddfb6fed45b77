use fastcauldron::prelude::*;
use fastcauldron::StrError;

/// Holds what one rank sees after preparing a time step
struct RankView {
    stencil_width: usize,
    active_elements: usize,
    columns: Vec<((usize, usize), Vec<usize>)>,
}

fn prepare(comm: Box<dyn Communicator>, weights: &[f64], age: f64) -> Result<RankView, StrError> {
    let project = SampleProjects::single_formation(7, 5, weights);
    let mut config = Config::new();
    config.set_solve_flow_equations(true)?;
    let mut sim = FastcauldronSimulator::new(project, config, comm)?;
    if !sim.set_calculation_mode(CalculationMode::HydrostaticDarcy)? {
        return Err("cannot start the calculation mode");
    }
    sim.prepare_time_step(age)?;
    let subdomain = &sim.flow_handler().ok_or("no flow handler")?.subdomains()[0];
    let columns = sim
        .mesh()
        .ok_or("no mesh")?
        .nodes
        .owned()
        .iter()
        .map(|(i, j)| ((i, j), subdomain.dof_numbering().column(i, j).to_vec()))
        .collect();
    Ok(RankView {
        stencil_width: subdomain.stencil_width(),
        active_elements: sim.number_of_active_elements()?,
        columns,
    })
}

fn check_agreement(n_ranks: usize) -> Result<(), StrError> {
    let weights = [1.0, 0.0, 0.0, 1.0, 1.0, 0.0];
    let serial = prepare(Box::new(SerialComm), &weights, 0.0)?;
    assert_eq!(serial.stencil_width, 2);
    let views = run_ranks(n_ranks, |comm| prepare(Box::new(comm), &weights, 0.0));
    let mut n_columns = 0;
    for view in views {
        let view = view?;
        assert_eq!(view.stencil_width, serial.stencil_width);
        assert_eq!(view.active_elements, serial.active_elements);
        for (node, column) in &view.columns {
            let expected = serial.columns.iter().find(|(n, _)| n == node).unwrap();
            assert_eq!(column, &expected.1);
        }
        n_columns += view.columns.len();
    }
    assert_eq!(n_columns, serial.columns.len());
    Ok(())
}

#[test]
fn two_ranks_agree_with_one_rank() -> Result<(), StrError> {
    check_agreement(2)
}

#[test]
fn four_ranks_agree_with_one_rank() -> Result<(), StrError> {
    check_agreement(4)
}

#[test]
fn stencil_width_is_the_global_maximum() -> Result<(), StrError> {
    // the degenerate segments exist on the right half of the basin only
    let views = run_ranks(2, |comm| -> Result<usize, StrError> {
        let mut project = SampleProjects::single_formation(7, 5, &[1.0; 4]);
        let mut thickness = vec![100.0; 7 * 5];
        for j in 0..5 {
            for i in 5..7 {
                thickness[j * 7 + i] = 0.0;
            }
        }
        project.formations[0].present_day_thickness = fastcauldron::simulator::ThicknessMap::Nodal(thickness);
        let mut config = Config::new();
        config.set_solve_flow_equations(true)?;
        let mut sim = FastcauldronSimulator::new(project, config, Box::new(comm))?;
        sim.set_calculation_mode(CalculationMode::HydrostaticDarcy)?;
        sim.prepare_time_step(0.0)?;
        Ok(sim.flow_handler().ok_or("no flow handler")?.subdomains()[0].stencil_width())
    });
    for width in views {
        assert_eq!(width?, 4);
    }
    Ok(())
}

#[test]
fn collectives_called_in_different_order_fail() {
    let results = run_ranks(2, |comm| {
        let collective = Collective::new(Box::new(comm));
        if collective.rank() == 0 {
            collective.global_sum(1).map(|_| ())
        } else {
            collective.global_any(true).map(|_| ())
        }
    });
    for result in results {
        assert_eq!(
            result.err(),
            Some("collective operations were called in different order across ranks")
        );
    }
}
