use super::ProjectData;
use crate::base::{GridResolution, MapEdge};
use crate::grid::{ElementGrid, GridDescription, LocalArray2D, MapElementArray, NodalGrid};
use crate::parallel::{Collective, Partition};
use crate::StrError;

/// Holds the per-rank areal mesh of a calculation: grids, node validity and map elements
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    /// Resolution of the grid
    pub resolution: GridResolution,

    /// Nodes of the grid at this resolution
    pub description: GridDescription,

    /// Sub-sampling steps relative to the high-resolution grid
    pub step: (usize, usize),

    /// Number of nodes along x of the high-resolution grid
    pub high_res_n_nodes_x: usize,

    /// Element view of this rank
    pub elements: ElementGrid,

    /// Node view of this rank
    pub nodes: NodalGrid,

    /// Validity of the ghosted nodes
    pub node_validity: LocalArray2D<bool>,

    /// Classification of the ghosted elements
    pub map: MapElementArray,

    /// At least one element is valid on some rank
    pub has_active_elements: bool,

    /// Uses the solid thickness as depositing thickness
    pub geometric_loop: bool,
}

impl Mesh {
    /// Allocates the mesh of a rank
    ///
    /// The map elements are all invalid until [Mesh::initialise_element_grid] is called.
    pub fn new(
        project: &ProjectData,
        resolution: GridResolution,
        rank: usize,
        n_ranks: usize,
        geometric_loop: bool,
    ) -> Result<Self, StrError> {
        let step = match resolution {
            GridResolution::High => (1, 1),
            GridResolution::Low => project.low_resolution_step,
        };
        let description = project.grid.subsampled(step.0, step.1)?;
        let partition = Partition::new(description.n_elements_x(), description.n_elements_y(), n_ranks)?;
        let elements = ElementGrid::new(&description, &partition, rank)?;
        let nodes = NodalGrid::new(&elements);
        let mut node_validity = LocalArray2D::new(*nodes.owned(), *nodes.ghosted(), false);
        for (i, j) in nodes.ghosted().iter() {
            node_validity[(i, j)] = project.node_is_valid(i * step.0, j * step.1);
        }
        let map = MapElementArray::new(&elements);
        Ok(Mesh {
            resolution,
            description,
            step,
            high_res_n_nodes_x: project.grid.n_nodes_x,
            elements,
            nodes,
            node_validity,
            map,
            has_active_elements: false,
            geometric_loop,
        })
    }

    /// Returns the high-resolution indices of node (i,j)
    pub fn high_res_node(&self, i: usize, j: usize) -> (usize, usize) {
        (i * self.step.0, j * self.step.1)
    }

    /// Returns true if the ghosted node (i,j) is valid (false outside the ghosted range)
    pub fn node_is_valid(&self, i: usize, j: usize) -> bool {
        self.node_validity.get(i, j).copied().unwrap_or(false)
    }

    /// Classifies the map elements and returns true if any element is valid on any rank
    ///
    /// All ranks must call this function; the classification of a ghost element
    /// is the one computed by its owner.
    pub fn initialise_element_grid(&mut self, collective: &Collective) -> Result<bool, StrError> {
        let owned = *self.elements.owned();
        let ghosted = *self.elements.ghosted();
        let n_x = self.elements.n_elements_x();
        let n_y = self.elements.n_elements_y();

        // validity of owned elements
        let mut validity = LocalArray2D::new(owned, ghosted, false);
        let mut count = 0;
        for (i, j) in owned.iter() {
            let valid = self.node_is_valid(i, j)
                && self.node_is_valid(i + 1, j)
                && self.node_is_valid(i + 1, j + 1)
                && self.node_is_valid(i, j + 1);
            validity[(i, j)] = valid;
            if valid {
                count += 1;
            }
        }
        let global_count = collective.global_sum(count)?;
        self.has_active_elements = global_count > 0;
        collective.ghost_exchange_2d(&mut validity)?;

        // ownership and processor boundaries
        for (i, j) in ghosted.iter() {
            let ghost_i = i < owned.first_i || i > owned.last_i;
            let ghost_j = j < owned.first_j || j > owned.last_j;
            let element = &mut self.map.elements[(i, j)];
            element.is_corner_ghost = ghost_i && ghost_j;
            element.is_on_processor = !ghost_i && !ghost_j;
            element.global_validity = validity[(i, j)];
            element.is_valid = validity[(i, j)] && !element.is_corner_ghost;
            element.on_processor_boundary = [false; 4];
            element.on_domain_boundary = [false; 4];
            if element.is_on_processor {
                element.on_processor_boundary[MapEdge::Front.index()] = j == owned.first_j;
                element.on_processor_boundary[MapEdge::Right.index()] = i == owned.last_i;
                element.on_processor_boundary[MapEdge::Back.index()] = j == owned.last_j;
                element.on_processor_boundary[MapEdge::Left.index()] = i == owned.first_i;
            }
        }

        // domain boundaries of owned elements (out-of-range neighbours are invalid)
        let is_valid = |i: Option<usize>, j: Option<usize>| match (i, j) {
            (Some(i), Some(j)) if i < n_x && j < n_y => validity.get(i, j).copied().unwrap_or(false),
            _ => false,
        };
        for (i, j) in owned.iter() {
            if !validity[(i, j)] {
                continue;
            }
            let flags = [
                !is_valid(Some(i), j.checked_sub(1)),
                !is_valid(Some(i + 1), Some(j)),
                !is_valid(Some(i), Some(j + 1)),
                !is_valid(i.checked_sub(1), Some(j)),
            ];
            self.map.elements[(i, j)].on_domain_boundary = flags;
        }

        // ghosts take the classification of their owners
        let mut packed = LocalArray2D::new(owned, ghosted, 0u8);
        for (i, j) in owned.iter() {
            packed[(i, j)] = self.map.elements[(i, j)].pack_classification();
        }
        collective.ghost_exchange_2d(&mut packed)?;
        for (i, j) in ghosted.iter() {
            if owned.contains(i, j) {
                continue;
            }
            let element = &mut self.map.elements[(i, j)];
            element.unpack_classification(packed[(i, j)]);
            element.is_valid = element.global_validity && !element.is_corner_ghost;
        }
        log::debug!(
            "rank {}: {} valid owned elements ({} in total)",
            collective.rank(),
            count,
            global_count
        );
        Ok(self.has_active_elements)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Mesh;
    use crate::base::{GridResolution, MapEdge};
    use crate::parallel::Collective;
    use crate::simulator::SampleProjects;
    use crate::StrError;

    #[test]
    fn new_works() -> Result<(), StrError> {
        let project = SampleProjects::layer_cake(5, 5, 2);
        let mesh = Mesh::new(&project, GridResolution::Low, 0, 1, false)?;
        assert_eq!(mesh.description.n_nodes_x, 3);
        assert_eq!(mesh.elements.n_elements_x(), 2);
        assert_eq!(mesh.high_res_node(1, 2), (2, 4));
        assert!(mesh.node_is_valid(2, 2));
        assert!(!mesh.node_is_valid(3, 0));
        let mesh = Mesh::new(&project, GridResolution::High, 0, 1, false)?;
        assert_eq!(mesh.elements.n_elements_x(), 4);
        Ok(())
    }

    #[test]
    fn initialise_element_grid_works() -> Result<(), StrError> {
        let project = SampleProjects::with_invalid_nodes(4, 4, &[(0, 0)]);
        let mut mesh = Mesh::new(&project, GridResolution::High, 0, 1, false)?;
        let collective = Collective::serial();
        assert!(mesh.initialise_element_grid(&collective)?);
        assert!(!mesh.map.is_valid(0, 0));
        assert!(mesh.map.is_valid(1, 0));
        let e = mesh.map.get(1, 0).unwrap();
        assert!(e.is_on_domain_boundary(MapEdge::Front));
        assert!(e.is_on_domain_boundary(MapEdge::Left));
        assert!(!e.is_on_domain_boundary(MapEdge::Right));
        assert!(e.is_on_processor_boundary(MapEdge::Front));
        assert_eq!(mesh.map.number_of_valid_owned(), 8);
        assert_eq!(mesh.map.image(), "###\n#*#\n+##\n");
        Ok(())
    }

    #[test]
    fn no_valid_nodes_gives_no_active_elements() -> Result<(), StrError> {
        let project = SampleProjects::without_valid_nodes(3, 3);
        let mut mesh = Mesh::new(&project, GridResolution::Low, 0, 1, false)?;
        assert!(!mesh.initialise_element_grid(&Collective::serial())?);
        assert_eq!(mesh.map.image(), "++\n++\n");
        Ok(())
    }
}
