use super::{DofNumbering, FormationSubdomainElementGrid, SubdomainElementRef};
use crate::base::DEPOSITING_THICKNESS_TOLERANCE;
use crate::grid::{MapElementArray, VolumeGrid, VolumeGridKind, VolumeGridSet};
use crate::layer::{FormationId, Formations};
use crate::parallel::Collective;
use crate::simulator::Mesh;
use crate::StrError;
use std::fmt::Write;

/// Holds a contiguous stack of formations solved together by the Darcy solver
///
/// The elements of all member formations are numbered in depth by a single
/// subdomain index, the global-k, from the top element of the top formation:
///
/// ```text
///  global-k   formation   local k
///     0        Shale         0
///     1        Shale         1
///     2        Sand          0
///     3        Sand          1
///     4        Sand          2
/// ```
///
/// Only the deepest `number_of_elements()` elements are active at a given age;
/// the first of them is the frontier (see [Subdomain::first_active_k]).
pub struct Subdomain {
    /// Identifier (0 until numbered by the flow handler)
    id: usize,

    /// Member formations from the top to the bottom
    formations: Vec<FormationId>,

    /// Element grid of each member formation
    grids: Vec<FormationSubdomainElementGrid>,

    /// Formation-local k of each global-k
    global_k_to_layer_k: Vec<usize>,

    /// Formation grid index of each global-k
    global_k_to_formation_grid: Vec<usize>,

    /// Number of elements in depth if all members were active
    maximum_number_of_elements: usize,

    /// Number of active elements in depth
    number_of_elements: usize,

    /// Age of the last activity update
    current_age: Option<f64>,

    /// At least one member formation is active
    is_active: bool,

    /// At least one active member formation is a source rock
    source_rock_is_active: bool,

    /// Some member formation is a source rock containing sulphur
    contains_sulphur_source_rock: bool,

    /// Volume grids over the active elements
    element_grids: VolumeGridSet,

    /// Volume grids over the active nodes
    node_grids: VolumeGridSet,

    /// Representative node of each node
    dofs: DofNumbering,

    /// Largest number of collapsed segments over the whole domain
    stencil_width: usize,
}

impl Subdomain {
    /// Allocates a subdomain spanning the formations from `top` to `bottom` (inclusive)
    ///
    /// The formations must have been initialised over the same mesh.
    pub fn new(formations: &Formations, top: FormationId, bottom: FormationId, mesh: &Mesh) -> Result<Self, StrError> {
        if top > bottom || bottom.0 >= formations.len() {
            return Err("subdomain formation range is invalid");
        }
        let members: Vec<_> = (top.0..=bottom.0).map(FormationId).collect();
        let owned = *mesh.elements.owned();
        let ghosted = *mesh.elements.ghosted();
        let mut grids = Vec::with_capacity(members.len());
        for id in &members {
            let layer = &formations[*id];
            if !layer.is_initialised() {
                return Err("subdomain formations must be initialised");
            }
            grids.push(FormationSubdomainElementGrid::new(
                *id,
                layer.get_maximum_number_of_elements(),
                owned,
                ghosted,
            ));
        }
        let contains_sulphur_source_rock = members
            .iter()
            .any(|id| formations[*id].is_source_rock() && formations[*id].contains_sulphur());
        let mut subdomain = Subdomain {
            id: 0,
            formations: members,
            grids,
            global_k_to_layer_k: Vec::new(),
            global_k_to_formation_grid: Vec::new(),
            maximum_number_of_elements: 0,
            number_of_elements: 0,
            current_age: None,
            is_active: false,
            source_rock_is_active: false,
            contains_sulphur_source_rock,
            element_grids: VolumeGridSet::new(VolumeGridKind::Element, owned, ghosted, 0),
            node_grids: VolumeGridSet::new(VolumeGridKind::Nodal, *mesh.nodes.owned(), *mesh.nodes.ghosted(), 0),
            dofs: DofNumbering::new(*mesh.nodes.owned(), *mesh.nodes.ghosted(), 0),
            stencil_width: 0,
        };
        subdomain.initialise_global_k_to_layer_mapping();
        subdomain.number_elements(mesh);
        subdomain.link_subdomain_elements_vertically(&mesh.map);
        subdomain.dofs.resize(subdomain.maximum_number_of_nodes());
        subdomain.element_grids.allocate(1);
        subdomain.node_grids.allocate(1);
        Ok(subdomain)
    }

    /// Builds the global-k to (formation grid, local k) mapping
    pub fn initialise_global_k_to_layer_mapping(&mut self) {
        self.global_k_to_layer_k.clear();
        self.global_k_to_formation_grid.clear();
        for (index, grid) in self.grids.iter_mut().enumerate() {
            grid.set_first_global_k(self.global_k_to_layer_k.len());
            for k in 0..grid.len_k() {
                self.global_k_to_layer_k.push(k);
                self.global_k_to_formation_grid.push(index);
            }
        }
        self.maximum_number_of_elements = self.global_k_to_layer_k.len();
    }

    /// Assigns the global-k to every element within the stencil footprint
    pub fn number_elements(&mut self, mesh: &Mesh) {
        for grid in &mut self.grids {
            let first = grid.first_global_k();
            let ghosted = *grid.ghosted();
            for (i, j) in ghosted.iter() {
                let in_stencil = mesh.elements.is_part_of_stencil(i, j);
                for k in 0..grid.len_k() {
                    if let Some(e) = grid.element_mut(i, j, k) {
                        e.global_k = if in_stencil { Some(first + k) } else { None };
                    }
                }
            }
        }
    }

    /// Links the bottom element of each member grid to the top element of the grid below
    pub fn link_subdomain_elements_vertically(&mut self, map: &MapElementArray) {
        for index in 1..self.grids.len() {
            let (head, tail) = self.grids.split_at_mut(index);
            let above = &mut head[index - 1];
            let below = &mut tail[0];
            let n_above = above.len_k();
            if n_above == 0 || below.len_k() == 0 {
                continue;
            }
            for (i, j) in map.ghosted().iter() {
                if !map.is_valid(i, j) {
                    continue;
                }
                if let Some(e) = above.element_mut(i, j, n_above - 1) {
                    e.deep = Some(SubdomainElementRef { grid: index, i, j, k: 0 });
                }
                if let Some(e) = below.element_mut(i, j, 0) {
                    e.shallow = Some(SubdomainElementRef {
                        grid: index - 1,
                        i,
                        j,
                        k: n_above - 1,
                    });
                }
            }
        }
    }

    /// Updates the activity, the volume grids and the dof numbering at the given age
    ///
    /// Every rank must call this function for every subdomain, in the same order,
    /// because the dof numbering uses collective operations.
    pub fn set_activity(
        &mut self,
        formations: &Formations,
        mesh: &Mesh,
        collective: &Collective,
        age: f64,
    ) -> Result<(), StrError> {
        self.current_age = Some(age);
        self.number_of_elements = self
            .formations
            .iter()
            .filter(|id| formations[**id].is_active())
            .map(|id| formations[*id].get_maximum_number_of_elements())
            .sum();
        self.is_active = !self.formations.is_empty() && self.number_of_elements > 0;
        self.source_rock_is_active = self
            .formations
            .iter()
            .any(|id| formations[*id].is_active() && formations[*id].is_source_rock());
        let n_elements = self.number_of_elements();
        let n_nodes = self.number_of_nodes();
        if n_elements > 0 && n_nodes > 1 {
            if self.element_grids.resize(n_elements) {
                log::debug!("subdomain {}: element grids resized to {}", self.id, n_elements);
            }
            if self.node_grids.resize(n_nodes) {
                log::debug!("subdomain {}: node grids resized to {}", self.id, n_nodes);
            }
        }
        self.number_node_dofs(formations, mesh, collective, age)?;
        self.set_subdomain_boundary(formations, age);
        Ok(())
    }

    /// Maps every node onto its representative and computes the stencil width
    fn number_node_dofs(
        &mut self,
        formations: &Formations,
        mesh: &Mesh,
        collective: &Collective,
        age: f64,
    ) -> Result<(), StrError> {
        let first = self.first_active_k();
        let grids = &self.grids;
        let to_grid = &self.global_k_to_formation_grid;
        let to_layer_k = &self.global_k_to_layer_k;
        let owned = *mesh.nodes.owned();
        // inactive subdomains still join the collectives
        if self.is_active {
            for (i, j) in owned.iter() {
                if !mesh.node_is_valid(i, j) {
                    self.dofs.set_identity(i, j);
                    continue;
                }
                self.dofs.number_column(i, j, first, |segment| {
                    let layer = &formations[grids[to_grid[segment]].formation()];
                    layer.get_depositing_thickness(i, j, to_layer_k[segment], age) > DEPOSITING_THICKNESS_TOLERANCE
                });
            }
        }
        collective.ghost_exchange_3d(self.dofs.representatives_mut())?;
        let local = self.dofs.maximum_owned_run_length();
        self.stencil_width = collective.global_max(local)?;
        Ok(())
    }

    /// Assigns the node dofs of the owned elements
    ///
    /// Formations whose deposition has started take the representatives of the
    /// dof numbering; the others are anchored on the frontier.
    fn set_subdomain_boundary(&mut self, formations: &Formations, age: f64) {
        let first = self.first_active_k();
        self.dofs.clear_dirichlet_anchors();
        if !self.is_active {
            return;
        }
        for grid in &mut self.grids {
            let started = formations[grid.formation()].has_started(age);
            let owned = *grid.owned();
            let first_global_k = grid.first_global_k();
            for (i, j) in owned.iter() {
                let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
                for k in 0..grid.len_k() {
                    let global_k = first_global_k + k;
                    let mut node_dofs = [first; 8];
                    for (c, (ci, cj)) in corners.iter().enumerate() {
                        if started {
                            node_dofs[c] = self.dofs.representative(*ci, *cj, global_k).unwrap_or(first);
                            node_dofs[c + 4] = self.dofs.representative(*ci, *cj, global_k + 1).unwrap_or(first);
                        } else {
                            self.dofs.set_dirichlet_anchor(*ci, *cj, global_k);
                            self.dofs.set_dirichlet_anchor(*ci, *cj, global_k + 1);
                        }
                    }
                    if let Some(e) = grid.element_mut(i, j, k) {
                        e.node_dofs = node_dofs;
                    }
                }
            }
        }
    }

    /// Returns the identifier (0 until numbered)
    pub fn id(&self) -> usize {
        self.id
    }

    /// Sets the identifier
    pub fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    /// Returns the member formations (top to bottom)
    pub fn formations(&self) -> &[FormationId] {
        &self.formations
    }

    /// Returns the element grids of the member formations (top to bottom)
    pub fn grids(&self) -> &[FormationSubdomainElementGrid] {
        &self.grids
    }

    /// Returns the grid of a member formation or None if the formation is not a member
    pub fn get_grid(&self, formation: FormationId) -> Option<&FormationSubdomainElementGrid> {
        self.grids.iter().find(|g| g.formation() == formation)
    }

    /// Returns true if the formation is a member
    pub fn has_layer(&self, formation: FormationId) -> bool {
        self.formations.contains(&formation)
    }

    /// Returns true if the two subdomains share a formation
    pub fn overlaps(&self, other: &Subdomain) -> bool {
        self.formations.iter().any(|id| other.has_layer(*id))
    }

    /// Returns true if some member is a source rock containing sulphur
    pub fn contains_sulphur_source_rock(&self) -> bool {
        self.contains_sulphur_source_rock
    }

    /// Returns true if at least one member formation is active
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns true if at least one active member formation is a source rock
    pub fn source_rock_is_active(&self) -> bool {
        self.source_rock_is_active
    }

    /// Returns the age of the last activity update
    pub fn current_age(&self) -> Option<f64> {
        self.current_age
    }

    /// Returns the number of active elements in depth
    pub fn number_of_elements(&self) -> usize {
        self.number_of_elements
    }

    /// Returns the number of active nodes in depth
    pub fn number_of_nodes(&self) -> usize {
        self.number_of_elements + 1
    }

    /// Returns the number of elements in depth if all members were active
    pub fn maximum_number_of_elements(&self) -> usize {
        self.maximum_number_of_elements
    }

    /// Returns the number of nodes in depth if all members were active
    pub fn maximum_number_of_nodes(&self) -> usize {
        self.maximum_number_of_elements + 1
    }

    /// Returns the global-k of the first active element (and node)
    pub fn first_active_k(&self) -> usize {
        self.maximum_number_of_elements - self.number_of_elements
    }

    /// Returns the largest number of collapsed segments over the whole domain
    pub fn stencil_width(&self) -> usize {
        self.stencil_width
    }

    /// Returns the dof numbering of the nodes
    pub fn dof_numbering(&self) -> &DofNumbering {
        &self.dofs
    }

    /// Returns the element volume grid with the given number of dofs, if allocated
    pub fn element_grid(&self, number_of_dofs: usize) -> Option<&VolumeGrid> {
        self.element_grids.get(number_of_dofs)
    }

    /// Returns the nodal volume grid with the given number of dofs, if allocated
    pub fn node_grid(&self, number_of_dofs: usize) -> Option<&VolumeGrid> {
        self.node_grids.get(number_of_dofs)
    }

    /// Returns the element volume grid with the given number of dofs, allocating it if necessary
    pub fn allocate_element_grid(&mut self, number_of_dofs: usize) -> &VolumeGrid {
        self.element_grids.allocate(number_of_dofs)
    }

    /// Returns the number of times the element and nodal grids were reallocated
    pub fn grid_reallocation_counts(&self) -> (usize, usize) {
        (self.element_grids.reallocation_count(), self.node_grids.reallocation_count())
    }

    /// Returns the (formation, local k) of a global-k
    pub fn global_k_to_layer(&self, global_k: usize) -> Option<(FormationId, usize)> {
        let grid = self.global_k_to_formation_grid.get(global_k)?;
        Some((self.grids[*grid].formation(), self.global_k_to_layer_k[global_k]))
    }

    /// Returns the global-k of element k of a member formation
    pub fn layer_to_global_k(&self, formation: FormationId, k: usize) -> Option<usize> {
        let grid = self.get_grid(formation)?;
        if k < grid.len_k() {
            Some(grid.first_global_k() + k)
        } else {
            None
        }
    }

    /// Returns a table describing the member formations
    pub fn image(&self, formations: &Formations) -> String {
        let mut buffer = String::new();
        let title = format!("Subdomain {}", self.id);
        write!(&mut buffer, "{}\n{}\n", title, "=".repeat(title.len())).unwrap();
        write!(
            &mut buffer,
            "{:<20}{:>12}{:>13}{:>10}{:>16}\n",
            "formation", "depo age", "source rock", "segments", "first global k"
        )
        .unwrap();
        for grid in &self.grids {
            let layer = &formations[grid.formation()];
            write!(
                &mut buffer,
                "{:<20}{:>12}{:>13}{:>10}{:>16}\n",
                layer.name,
                layer.depo_age,
                layer.is_source_rock(),
                grid.len_k(),
                grid.first_global_k()
            )
            .unwrap();
        }
        write!(
            &mut buffer,
            "segments: {} (active: {}), stencil width: {}\n",
            self.maximum_number_of_elements, self.number_of_elements, self.stencil_width
        )
        .unwrap();
        buffer
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Subdomain;
    use crate::base::GridResolution;
    use crate::layer::{FormationId, Formations};
    use crate::parallel::Collective;
    use crate::simulator::{Mesh, SampleProjects};
    use crate::StrError;

    fn setup(formations: &mut Formations, mesh: &mut Mesh) -> Result<Collective, StrError> {
        let collective = Collective::serial();
        mesh.initialise_element_grid(&collective)?;
        formations.initialise(mesh)?;
        Ok(collective)
    }

    #[test]
    fn new_captures_errors() -> Result<(), StrError> {
        let project = SampleProjects::layer_cake(3, 3, 1);
        let mut mesh = Mesh::new(&project, GridResolution::Low, 0, 1, false)?;
        let mut formations = Formations::new(&project.formations);
        assert_eq!(
            Subdomain::new(&formations, FormationId(0), FormationId(1), &mesh).err(),
            Some("subdomain formations must be initialised")
        );
        setup(&mut formations, &mut mesh)?;
        assert_eq!(
            Subdomain::new(&formations, FormationId(2), FormationId(1), &mesh).err(),
            Some("subdomain formation range is invalid")
        );
        assert_eq!(
            Subdomain::new(&formations, FormationId(2), FormationId(5), &mesh).err(),
            Some("subdomain formation range is invalid")
        );
        Ok(())
    }

    #[test]
    fn global_k_mapping_works() -> Result<(), StrError> {
        let project = SampleProjects::layer_cake(3, 3, 1);
        let mut mesh = Mesh::new(&project, GridResolution::Low, 0, 1, false)?;
        let mut formations = Formations::new(&project.formations);
        setup(&mut formations, &mut mesh)?;
        let subdomain = Subdomain::new(&formations, FormationId(0), FormationId(2), &mesh)?;
        assert_eq!(subdomain.maximum_number_of_elements(), 7);
        assert_eq!(subdomain.maximum_number_of_nodes(), 8);
        assert_eq!(subdomain.global_k_to_layer(0), Some((FormationId(0), 0)));
        assert_eq!(subdomain.global_k_to_layer(2), Some((FormationId(1), 0)));
        assert_eq!(subdomain.global_k_to_layer(6), Some((FormationId(2), 1)));
        assert_eq!(subdomain.global_k_to_layer(7), None);
        for global_k in 0..7 {
            let (formation, k) = subdomain.global_k_to_layer(global_k).unwrap();
            assert_eq!(subdomain.layer_to_global_k(formation, k), Some(global_k));
        }
        assert_eq!(subdomain.layer_to_global_k(FormationId(3), 0), None);
        let e = subdomain.get_grid(FormationId(1)).unwrap().element(1, 1, 2).unwrap();
        assert_eq!(e.global_k, Some(4));
        assert!(subdomain.get_grid(FormationId(4)).is_none());
        Ok(())
    }

    #[test]
    fn vertical_links_work() -> Result<(), StrError> {
        let project = SampleProjects::layer_cake(3, 3, 1);
        let mut mesh = Mesh::new(&project, GridResolution::Low, 0, 1, false)?;
        let mut formations = Formations::new(&project.formations);
        setup(&mut formations, &mut mesh)?;
        let subdomain = Subdomain::new(&formations, FormationId(0), FormationId(1), &mesh)?;
        let bottom_of_shale = subdomain.grids()[0].element(0, 1, 1).unwrap();
        let deep = bottom_of_shale.deep.unwrap();
        assert_eq!((deep.grid, deep.i, deep.j, deep.k), (1, 0, 1, 0));
        let top_of_sand = subdomain.grids()[1].element(0, 1, 0).unwrap();
        let shallow = top_of_sand.shallow.unwrap();
        assert_eq!((shallow.grid, shallow.k), (0, 1));
        assert_eq!(subdomain.grids()[1].element(0, 1, 2).unwrap().deep, None);
        Ok(())
    }

    #[test]
    fn set_activity_works() -> Result<(), StrError> {
        let project = SampleProjects::layer_cake(3, 3, 1);
        let mut mesh = Mesh::new(&project, GridResolution::Low, 0, 1, false)?;
        let mut formations = Formations::new(&project.formations);
        let collective = setup(&mut formations, &mut mesh)?;
        let mut subdomain = Subdomain::new(&formations, FormationId(0), FormationId(2), &mesh)?;

        // before the deposition of Source
        formations.find_active_elements(70.0);
        subdomain.set_activity(&formations, &mesh, &collective, 70.0)?;
        assert!(!subdomain.is_active());
        assert!(!subdomain.source_rock_is_active());
        assert_eq!(subdomain.number_of_elements(), 0);
        assert_eq!(subdomain.first_active_k(), 7);
        assert_eq!(subdomain.grid_reallocation_counts(), (0, 0));
        // nothing is numbered nor anchored
        let identity: Vec<usize> = (0..8).collect();
        assert_eq!(subdomain.dof_numbering().column(1, 1), identity.as_slice());
        assert_eq!(subdomain.dof_numbering().number_of_dirichlet_anchors(), 0);
        assert_eq!(subdomain.stencil_width(), 0);

        // Source deposited, Sand half deposited, Shale not started
        formations.find_active_elements(30.0);
        subdomain.set_activity(&formations, &mesh, &collective, 30.0)?;
        assert!(subdomain.is_active());
        assert!(subdomain.source_rock_is_active());
        assert_eq!(subdomain.number_of_elements(), 5);
        assert_eq!(subdomain.number_of_nodes(), 6);
        assert_eq!(subdomain.first_active_k(), 2);
        assert_eq!(subdomain.current_age(), Some(30.0));
        assert_eq!(subdomain.element_grid(1).unwrap().len_k, 5);
        assert_eq!(subdomain.node_grid(1).unwrap().len_k, 6);
        // the top segment of Sand is empty at 30 Ma
        assert_eq!(subdomain.dof_numbering().column(1, 1), &[2, 2, 2, 2, 4, 5, 6, 7]);
        assert_eq!(subdomain.stencil_width(), 1);

        // Shale is anchored on the frontier
        let shale = subdomain.grids()[0].element(1, 1, 0).unwrap();
        assert_eq!(shale.node_dofs, [2; 8]);
        assert!(subdomain.dof_numbering().is_dirichlet_anchor(1, 1, 0));
        assert!(subdomain.dof_numbering().is_dirichlet_anchor(1, 1, 2));
        assert!(!subdomain.dof_numbering().is_dirichlet_anchor(1, 1, 3));
        let sand = subdomain.grids()[1].element(1, 1, 1).unwrap();
        assert_eq!(sand.node_dofs, [2, 2, 2, 2, 4, 4, 4, 4]);

        // same age again: nothing changes
        subdomain.set_activity(&formations, &mesh, &collective, 30.0)?;
        assert_eq!(subdomain.grid_reallocation_counts(), (1, 1));
        assert_eq!(subdomain.dof_numbering().column(1, 1), &[2, 2, 2, 2, 4, 5, 6, 7]);

        // grids allocated later take the current size
        assert!(subdomain.element_grid(3).is_none());
        assert_eq!(subdomain.allocate_element_grid(3).len_k, 5);
        assert_eq!(subdomain.grid_reallocation_counts(), (1, 1));
        Ok(())
    }

    #[test]
    fn overlaps_and_image_work() -> Result<(), StrError> {
        let project = SampleProjects::darcy_stack(3, 3);
        let mut mesh = Mesh::new(&project, GridResolution::Low, 0, 1, false)?;
        let mut formations = Formations::new(&project.formations);
        setup(&mut formations, &mut mesh)?;
        let a = Subdomain::new(&formations, FormationId(0), FormationId(1), &mesh)?;
        let b = Subdomain::new(&formations, FormationId(1), FormationId(2), &mesh)?;
        let c = Subdomain::new(&formations, FormationId(3), FormationId(3), &mesh)?;
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(a.has_layer(FormationId(1)));
        assert!(!a.has_layer(FormationId(2)));
        assert!(!a.contains_sulphur_source_rock());
        assert!(c.contains_sulphur_source_rock());
        let image = a.image(&formations);
        assert!(image.starts_with("Subdomain 0\n===========\n"));
        assert!(image.contains("segments: 4 (active: 0), stencil width: 0"));
        Ok(())
    }
}
