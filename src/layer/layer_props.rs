use super::{ElementRef, FlowVectors, FormationId, LayerElement, PropertyVectors};
use crate::base::{FormationKind, MapEdge, PolyFunction, VolumeFace, AGE_TOLERANCE, DEPOSITING_THICKNESS_TOLERANCE};
use crate::grid::{LocalArray3D, MapElementArray};
use crate::simulator::{FormationRecord, Mesh};
use crate::StrError;

/// Holds a stratigraphic formation: identity, thickness history, elements and fields
///
/// The formation has a fixed maximum number of elements in depth (the base
/// element count times the depth refinement factor). Element k = 0 is at the
/// top of the formation. Segment k (between nodes k and k+1) has a thickness
/// history per areal node:
///
/// ```text
///   node 0   ●───────────────●   top
///            │   segment 0   │
///   node 1   ●───────────────●
///            │   segment 1   │
///   node 2   ●───────────────●   bottom
/// ```
///
/// Segments are deposited from the bottom up in equal sub-intervals of
/// `[deposition_start_age, depo_age]` and an optional erosion event removes
/// thickness from the top.
pub struct LayerProps {
    /// Position in the formation registry
    pub id: FormationId,

    /// Formation name
    pub name: String,

    /// Formation kind
    pub kind: FormationKind,

    /// Age at which the deposition starts (Ma)
    pub deposition_start_age: f64,

    /// Age at which the deposition ends (Ma)
    pub depo_age: f64,

    /// Stratigraphic record used to build the thickness histories
    record: FormationRecord,

    /// Refinement of the elements in depth
    depth_refinement_factor: usize,

    /// Number of active elements at the current age
    number_of_active_elements: usize,

    /// Uses the solid thickness as depositing thickness
    geometric_loop: bool,

    /// Real thickness history of each (node i, node j, segment k)
    thickness: Option<LocalArray3D<PolyFunction>>,

    /// Volume elements over the ghosted areal elements
    elements: Option<LocalArray3D<LayerElement>>,

    /// Nodal properties (allocated on first activation)
    properties: Option<PropertyVectors>,

    /// Multi-component flow fields (allocated on first activation of Darcy formations)
    flow: Option<FlowVectors>,
}

impl LayerProps {
    /// Allocates a new formation from its record
    pub fn new(id: FormationId, record: &FormationRecord) -> Self {
        LayerProps {
            id,
            name: record.name.clone(),
            kind: record.kind,
            deposition_start_age: record.deposition_start_age,
            depo_age: record.depo_age,
            record: record.clone(),
            depth_refinement_factor: 1,
            number_of_active_elements: 0,
            geometric_loop: false,
            thickness: None,
            elements: None,
            properties: None,
            flow: None,
        }
    }

    /// Returns true for a source rock
    pub fn is_source_rock(&self) -> bool {
        self.kind.is_sediment() && self.record.source_rock
    }

    /// Returns true for a source rock containing sulphur
    pub fn contains_sulphur(&self) -> bool {
        self.is_source_rock() && self.record.sulphur
    }

    /// Returns true for the crust
    pub fn is_crust(&self) -> bool {
        self.kind == FormationKind::Crust
    }

    /// Returns true for the mantle
    pub fn is_mantle(&self) -> bool {
        self.kind == FormationKind::Mantle
    }

    /// Returns true for a sediment
    pub fn is_sediment(&self) -> bool {
        self.kind.is_sediment()
    }

    /// Returns true if the formation takes part in the multi-component flow
    pub fn include_in_darcy(&self) -> bool {
        self.kind.is_sediment() && self.record.include_in_darcy
    }

    /// Returns true for a mobile layer
    pub fn is_mobile(&self) -> bool {
        self.record.mobile
    }

    /// Returns the refinement of the elements in depth
    pub fn get_depth_refinement_factor(&self) -> usize {
        self.depth_refinement_factor
    }

    /// Sets the refinement of the elements in depth
    ///
    /// The factor cannot change after the formation has been initialised.
    pub fn set_depth_refinement_factor(&mut self, factor: usize) -> Result<(), StrError> {
        if factor < 1 {
            return Err("depth refinement factor must be ≥ 1");
        }
        if self.is_initialised() {
            return Err("cannot change the depth refinement factor of an initialised formation");
        }
        self.depth_refinement_factor = factor;
        Ok(())
    }

    /// Returns the maximum number of elements in depth
    pub fn get_maximum_number_of_elements(&self) -> usize {
        self.record.base_element_count * self.depth_refinement_factor
    }

    /// Returns the number of active elements in depth at the current age
    pub fn get_number_of_active_elements(&self) -> usize {
        self.number_of_active_elements
    }

    /// Sets the number of active elements in depth
    pub fn set_number_of_active_elements(&mut self, count: usize) -> Result<(), StrError> {
        if count > self.get_maximum_number_of_elements() {
            return Err("number of active elements must not exceed the maximum number of elements");
        }
        self.number_of_active_elements = count;
        Ok(())
    }

    /// Sets the number of active elements at the given age
    ///
    /// The crust and the mantle are always fully active; a sediment is fully
    /// active once its deposition has started and empty before.
    pub fn find_active_elements(&mut self, age: f64) {
        self.number_of_active_elements = if self.has_started(age) {
            self.get_maximum_number_of_elements()
        } else {
            0
        };
    }

    /// Returns true if the formation has active elements at the current age
    pub fn is_active(&self) -> bool {
        self.number_of_active_elements > 0
    }

    /// Returns true if the deposition has started before `age`
    ///
    /// The crust and the mantle exist from the beginning.
    pub fn has_started(&self, age: f64) -> bool {
        if !self.kind.is_sediment() {
            return true;
        }
        age < self.deposition_start_age - AGE_TOLERANCE * f64::abs(self.deposition_start_age)
    }

    /// Returns true if the thickness histories and the elements exist
    pub fn is_initialised(&self) -> bool {
        self.thickness.is_some()
    }

    /// Builds the thickness histories and the volume elements over the mesh of this rank
    pub fn initialise(&mut self, mesh: &Mesh) -> Result<(), StrError> {
        let n = self.get_maximum_number_of_elements();
        let owned = *mesh.nodes.owned();
        let ghosted = *mesh.nodes.ghosted();
        let mut thickness = LocalArray3D::new(owned, ghosted, n, PolyFunction::new());
        for (i, j) in ghosted.iter() {
            let (hi, hj) = mesh.high_res_node(i, j);
            let total = self.record.present_day_thickness.value(hi, hj, mesh.high_res_n_nodes_x);
            let segments = self.segment_thicknesses(total);
            let mut above = 0.0;
            for (k, t) in segments.iter().enumerate() {
                thickness[(i, j, k)] = self.thickness_history(k, *t, above)?;
                above += t;
            }
        }
        self.thickness = Some(thickness);
        self.geometric_loop = mesh.geometric_loop;
        self.set_element_invariants(&mesh.map);
        log::debug!("formation {} initialised with {} elements in depth", self.name, n);
        Ok(())
    }

    /// Splits a total thickness over the (refined) segments, top to bottom
    fn segment_thicknesses(&self, total: f64) -> Vec<f64> {
        let base = self.record.base_element_count;
        let factor = self.depth_refinement_factor;
        let weights = if self.record.segment_weights.is_empty() {
            vec![1.0; base]
        } else {
            self.record.segment_weights.clone()
        };
        let sum: f64 = weights.iter().sum();
        let mut segments = Vec::with_capacity(base * factor);
        for w in &weights {
            let t = if sum > 0.0 { total * w / sum / factor as f64 } else { 0.0 };
            segments.extend(std::iter::repeat(t).take(factor));
        }
        segments
    }

    /// Returns the real thickness history of segment k
    ///
    /// `above` is the present-day thickness of all segments above k.
    fn thickness_history(&self, k: usize, t: f64, above: f64) -> Result<PolyFunction, StrError> {
        let mut history = PolyFunction::new();
        if !self.kind.is_sediment() {
            history.add_point(0.0, t)?;
            return Ok(history);
        }
        let n = self.get_maximum_number_of_elements();
        let dt = (self.deposition_start_age - self.depo_age) / n as f64;
        let begin = self.deposition_start_age - (n - 1 - k) as f64 * dt;
        history.add_point(begin, 0.0)?.add_point(begin - dt, t)?;
        if let Some(erosion) = &self.record.erosion {
            if erosion.thickness > above && t > 0.0 {
                let span = erosion.start_age - erosion.end_age;
                let removed = f64::min(erosion.thickness - above, t);
                let start = erosion.start_age - span * above / erosion.thickness;
                let end = erosion.start_age - span * (above + removed) / erosion.thickness;
                history.add_point(start, t)?.add_point(end, t - removed)?;
            }
        }
        Ok(history)
    }

    /// Returns the real (compacted) thickness of segment k at node (i,j)
    ///
    /// Returns zero outside the ghosted nodes of this rank or before initialisation.
    pub fn get_real_thickness(&self, i: usize, j: usize, k: usize, age: f64) -> f64 {
        match &self.thickness {
            Some(thickness) => thickness.get(i, j, k).map(|h| h.evaluate(age)).unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// Returns the solid thickness of segment k at node (i,j)
    pub fn get_solid_thickness(&self, i: usize, j: usize, k: usize, age: f64) -> f64 {
        self.get_real_thickness(i, j, k, age) * self.record.solid_fraction
    }

    /// Returns the thickness deciding whether segment k at node (i,j) holds material
    ///
    /// This is the solid thickness in the geometric loop and the real thickness otherwise.
    pub fn get_depositing_thickness(&self, i: usize, j: usize, k: usize, age: f64) -> f64 {
        if self.geometric_loop {
            self.get_solid_thickness(i, j, k, age)
        } else {
            self.get_real_thickness(i, j, k, age)
        }
    }

    /// Returns the present-day real thickness of the whole column at node (i,j)
    pub fn get_present_day_thickness(&self, i: usize, j: usize) -> f64 {
        (0..self.get_maximum_number_of_elements())
            .map(|k| self.get_real_thickness(i, j, k, 0.0))
            .sum()
    }

    /// Builds the volume elements and their neighbours within the formation
    pub fn set_element_invariants(&mut self, map: &MapElementArray) {
        let n = self.get_maximum_number_of_elements();
        let owned = *map.owned();
        let ghosted = *map.ghosted();
        let id = self.id;
        let mut elements = LocalArray3D::new(owned, ghosted, n, LayerElement::new(id, 0, 0, 0));
        for (i, j) in ghosted.iter() {
            let (is_valid, is_on_processor) = match map.get(i, j) {
                Some(m) => (m.is_valid, m.is_on_processor),
                None => (false, false),
            };
            let lateral = [
                (Some(i), j.checked_sub(1)),
                (Some(i + 1), Some(j)),
                (Some(i), Some(j + 1)),
                (i.checked_sub(1), Some(j)),
            ];
            for k in 0..n {
                let mut element = LayerElement::new(id, i, j, k);
                element.is_valid = is_valid;
                element.is_on_processor = is_on_processor;
                if is_valid {
                    for edge in MapEdge::ALL {
                        if let (Some(ni), Some(nj)) = lateral[edge.index()] {
                            if map.is_valid(ni, nj) {
                                element.neighbours[VolumeFace::from_edge(edge).index()] = Some(ElementRef {
                                    formation: id,
                                    i: ni,
                                    j: nj,
                                    k,
                                });
                            }
                        }
                    }
                    if k > 0 {
                        element.neighbours[VolumeFace::Shallow.index()] = Some(ElementRef {
                            formation: id,
                            i,
                            j,
                            k: k - 1,
                        });
                    }
                    if k + 1 < n {
                        element.neighbours[VolumeFace::Deep.index()] = Some(ElementRef {
                            formation: id,
                            i,
                            j,
                            k: k + 1,
                        });
                    }
                }
                elements[(i, j, k)] = element;
            }
        }
        self.elements = Some(elements);
    }

    /// Sets the activity of every element and face at the given age
    ///
    /// An element holds material if the depositing thickness at any of its four
    /// corner nodes exceeds the tolerance. Ghost elements only resolve the face
    /// shared with the elements owned by this rank.
    pub fn set_layer_element_activity(&mut self, map: &MapElementArray, age: f64) {
        let mut elements = match self.elements.take() {
            Some(e) => e,
            None => return,
        };
        let formation_is_active = self.is_active();
        let owned = *map.owned();
        let ghosted = *elements.ghosted();
        let n = elements.len_k();
        let present = |i: usize, j: usize, k: usize| self.get_depositing_thickness(i, j, k, age) > DEPOSITING_THICKNESS_TOLERANCE;
        for (i, j) in ghosted.iter() {
            let map_element = match map.get(i, j) {
                Some(m) => m,
                None => continue,
            };
            for k in 0..n {
                let element = &mut elements[(i, j, k)];
                element.deactivate();
                if !formation_is_active || !map_element.is_valid {
                    continue;
                }
                if map_element.is_on_processor {
                    let s1 = present(i, j, k);
                    let s2 = present(i + 1, j, k);
                    let s3 = present(i + 1, j + 1, k);
                    let s4 = present(i, j + 1, k);
                    element.is_active = s1 || s2 || s3 || s4;
                    element.active_faces = [s1 || s2, s2 || s3, s3 || s4, s4 || s1, true, true];
                } else {
                    let (face, active) = if i > owned.last_i {
                        (VolumeFace::Left, present(i, j, k) || present(i, j + 1, k))
                    } else if i < owned.first_i {
                        (VolumeFace::Right, present(i + 1, j, k) || present(i + 1, j + 1, k))
                    } else if j > owned.last_j {
                        (VolumeFace::Front, present(i, j, k) || present(i + 1, j, k))
                    } else {
                        (VolumeFace::Back, present(i, j + 1, k) || present(i + 1, j + 1, k))
                    };
                    element.active_faces[face.index()] = active;
                    element.is_active = active;
                }
            }
        }
        self.elements = Some(elements);
    }

    /// Returns the volume element (i,j,k) of this rank
    pub fn element(&self, i: usize, j: usize, k: usize) -> Option<&LayerElement> {
        self.elements.as_ref().and_then(|e| e.get(i, j, k))
    }

    /// Returns the mutable volume element (i,j,k) of this rank
    pub fn element_mut(&mut self, i: usize, j: usize, k: usize) -> Option<&mut LayerElement> {
        self.elements.as_mut().and_then(|e| e.get_mut(i, j, k))
    }

    /// Returns the number of active owned volume elements
    pub fn count_active_owned_elements(&self) -> usize {
        match &self.elements {
            Some(elements) => elements
                .owned()
                .iter()
                .map(|(i, j)| elements.column(i, j).iter().filter(|e| e.is_active).count())
                .sum(),
            None => 0,
        }
    }

    /// Allocates the field vectors if the formation is active and they do not exist yet
    ///
    /// Returns true if any vector was allocated.
    pub fn allocate_new_vecs(&mut self, mesh: &Mesh, surface_temperature: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        let mut allocated = false;
        if self.properties.is_none() {
            let number_of_nodes = self.get_maximum_number_of_elements() + 1;
            self.properties = Some(PropertyVectors::new(
                *mesh.nodes.owned(),
                *mesh.nodes.ghosted(),
                number_of_nodes,
                surface_temperature,
            ));
            allocated = true;
        }
        if self.include_in_darcy() && self.flow.is_none() {
            self.flow = Some(FlowVectors::new(
                *mesh.elements.owned(),
                *mesh.elements.ghosted(),
                self.get_maximum_number_of_elements(),
            ));
            allocated = true;
        }
        if allocated {
            log::debug!("formation {}: field vectors allocated", self.name);
        }
        allocated
    }

    /// Resets the field vectors (if allocated) to their initial state
    pub fn re_initialise(&mut self, surface_temperature: f64) {
        if let Some(properties) = self.properties.as_mut() {
            properties.reset(surface_temperature);
        }
        if let Some(flow) = self.flow.as_mut() {
            flow.reset();
        }
    }

    /// Returns the nodal properties (if allocated)
    pub fn properties(&self) -> Option<&PropertyVectors> {
        self.properties.as_ref()
    }

    /// Returns the mutable nodal properties (if allocated)
    pub fn properties_mut(&mut self) -> Option<&mut PropertyVectors> {
        self.properties.as_mut()
    }

    /// Returns the flow fields (if allocated)
    pub fn flow_vectors(&self) -> Option<&FlowVectors> {
        self.flow.as_ref()
    }

    /// Returns the mutable flow fields (if allocated)
    pub fn flow_vectors_mut(&mut self) -> Option<&mut FlowVectors> {
        self.flow.as_mut()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
