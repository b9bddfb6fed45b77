use super::FormationId;
use crate::base::VolumeFace;

/// Identifies a volume element of a formation
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ElementRef {
    /// Formation holding the element
    pub formation: FormationId,

    /// Index along x
    pub i: usize,

    /// Index along y
    pub j: usize,

    /// Formation-local index in depth (0 at the top of the formation)
    pub k: usize,
}

/// Holds the state of the hexahedral volume element (i,j,k) of a formation
///
/// ```text
///            Shallow
///        ┌──────────────┐
///       ╱     Back     ╱│
///      ┌──────────────┐ │
///  Left│              │ │Right
///      │    Front     │╱
///      └──────────────┘
///             Deep
/// ```
///
/// Inactive elements keep their indices: the mesh topology never changes.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerElement {
    /// Index along x
    pub i: usize,

    /// Index along y
    pub j: usize,

    /// Formation-local index in depth (0 at the top of the formation)
    pub k: usize,

    /// Formation holding the element
    pub formation: FormationId,

    /// The areal element is valid (inside the modelled domain)
    pub is_valid: bool,

    /// Owned by this rank
    pub is_on_processor: bool,

    /// Holds material at the current age
    pub is_active: bool,

    /// Faces bordering material at the current age, indexed by [VolumeFace]
    pub active_faces: [bool; 6],

    /// Neighbouring elements, indexed by [VolumeFace]
    pub neighbours: [Option<ElementRef>; 6],
}

impl LayerElement {
    /// Allocates an inactive element without neighbours
    pub fn new(formation: FormationId, i: usize, j: usize, k: usize) -> Self {
        LayerElement {
            i,
            j,
            k,
            formation,
            is_valid: false,
            is_on_processor: false,
            is_active: false,
            active_faces: [false; 6],
            neighbours: [None; 6],
        }
    }

    /// Returns the reference to this element
    pub fn reference(&self) -> ElementRef {
        ElementRef {
            formation: self.formation,
            i: self.i,
            j: self.j,
            k: self.k,
        }
    }

    /// Returns true if the face borders material
    pub fn is_active_face(&self, face: VolumeFace) -> bool {
        self.active_faces[face.index()]
    }

    /// Returns the neighbour across a face
    pub fn neighbour(&self, face: VolumeFace) -> Option<ElementRef> {
        self.neighbours[face.index()]
    }

    /// Deactivates the element and all its faces
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.active_faces = [false; 6];
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
