use super::{FormationRecord, ProjectData};
use crate::base::FormationKind;
use crate::grid::GridDescription;

/// Holds some sample projects
pub struct SampleProjects;

impl SampleProjects {
    /// Returns a layer-cake basin: three sediments over a crust and a mantle
    ///
    /// ```text
    ///  name     elements   deposition (Ma)   notes
    ///  Shale        2         20 → 10
    ///  Sand         3         40 → 20        Darcy
    ///  Source       2         60 → 40        Darcy, source rock
    ///  Crust        2            -
    ///  Mantle       2            -
    /// ```
    ///
    /// The snapshots are 60, 40, 20, 10 and 0 Ma.
    pub fn layer_cake(n_nodes_x: usize, n_nodes_y: usize, low_resolution_step: usize) -> ProjectData {
        let shale = FormationRecord::sediment("Shale", 20.0, 10.0, 2, 100.0);
        let mut sand = FormationRecord::sediment("Sand", 40.0, 20.0, 3, 300.0);
        sand.include_in_darcy = true;
        let mut source = FormationRecord::sediment("Source", 60.0, 40.0, 2, 50.0);
        source.include_in_darcy = true;
        source.source_rock = true;
        ProjectData {
            name: "layer_cake".to_string(),
            grid: GridDescription::new(n_nodes_x, n_nodes_y),
            low_resolution_step: (low_resolution_step, low_resolution_step),
            node_validity: None,
            formations: vec![
                shale,
                sand,
                source,
                FormationRecord::basement("Crust", FormationKind::Crust, 2, 30_000.0),
                FormationRecord::basement("Mantle", FormationKind::Mantle, 2, 90_000.0),
            ],
            snapshots: vec![60.0, 40.0, 20.0, 10.0, 0.0],
        }
    }

    /// Returns a basin with one sediment of `weights.len()` elements over a crust and a mantle
    ///
    /// The sediment is deposited from 10 to 5 Ma with 100 m of present-day
    /// thickness split over the elements (top to bottom) according to the weights.
    pub fn single_formation(n_nodes_x: usize, n_nodes_y: usize, weights: &[f64]) -> ProjectData {
        let mut layer = FormationRecord::sediment("Layer", 10.0, 5.0, weights.len(), 100.0);
        layer.segment_weights = weights.to_vec();
        layer.include_in_darcy = true;
        layer.source_rock = true;
        ProjectData {
            name: "single_formation".to_string(),
            grid: GridDescription::new(n_nodes_x, n_nodes_y),
            low_resolution_step: (1, 1),
            node_validity: None,
            formations: vec![
                layer,
                FormationRecord::basement("Crust", FormationKind::Crust, 1, 30_000.0),
                FormationRecord::basement("Mantle", FormationKind::Mantle, 1, 90_000.0),
            ],
            snapshots: vec![10.0, 5.0, 0.0],
        }
    }

    /// Returns a basin with four Darcy sediments A, B, C, D (B and D are source rocks)
    pub fn darcy_stack(n_nodes_x: usize, n_nodes_y: usize) -> ProjectData {
        let names = ["A", "B", "C", "D"];
        let mut formations: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let start = 10.0 * (index + 2) as f64;
                let mut record = FormationRecord::sediment(name, start, start - 10.0, 2, 100.0);
                record.include_in_darcy = true;
                record.source_rock = index % 2 == 1;
                record
            })
            .collect();
        formations[3].sulphur = true;
        formations.push(FormationRecord::basement("Crust", FormationKind::Crust, 1, 30_000.0));
        formations.push(FormationRecord::basement("Mantle", FormationKind::Mantle, 1, 90_000.0));
        ProjectData {
            name: "darcy_stack".to_string(),
            grid: GridDescription::new(n_nodes_x, n_nodes_y),
            low_resolution_step: (1, 1),
            node_validity: None,
            formations,
            snapshots: vec![50.0, 30.0, 10.0, 0.0],
        }
    }

    /// Returns the layer-cake basin with every node outside the modelled domain
    pub fn without_valid_nodes(n_nodes_x: usize, n_nodes_y: usize) -> ProjectData {
        let mut project = SampleProjects::layer_cake(n_nodes_x, n_nodes_y, 1);
        project.name = "without_valid_nodes".to_string();
        project.node_validity = Some(vec![false; n_nodes_x * n_nodes_y]);
        project
    }

    /// Returns the layer-cake basin with the given high-resolution nodes outside the modelled domain
    pub fn with_invalid_nodes(n_nodes_x: usize, n_nodes_y: usize, invalid: &[(usize, usize)]) -> ProjectData {
        let mut project = SampleProjects::layer_cake(n_nodes_x, n_nodes_y, 1);
        project.name = "with_invalid_nodes".to_string();
        let mut validity = vec![true; n_nodes_x * n_nodes_y];
        for (i, j) in invalid {
            validity[j * n_nodes_x + i] = false;
        }
        project.node_validity = Some(validity);
        project
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::SampleProjects;

    #[test]
    fn samples_are_valid() {
        assert_eq!(SampleProjects::layer_cake(4, 3, 1).validate(), None);
        assert_eq!(SampleProjects::layer_cake(5, 5, 2).validate(), None);
        assert_eq!(SampleProjects::single_formation(3, 3, &[1.0; 10]).validate(), None);
        assert_eq!(SampleProjects::darcy_stack(3, 3).validate(), None);
        assert_eq!(SampleProjects::without_valid_nodes(3, 3).validate(), None);
        let project = SampleProjects::with_invalid_nodes(4, 4, &[(0, 0)]);
        assert_eq!(project.validate(), None);
        assert!(!project.node_is_valid(0, 0));
        assert!(project.node_is_valid(1, 0));
    }
}
