use crate::grid::{IndexRange, LocalArray3D};
use crate::layer::FormationId;

/// Identifies an element of a subdomain: formation grid index and (i,j,k)
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SubdomainElementRef {
    /// Index of the formation grid in the subdomain (0 is the top formation)
    pub grid: usize,

    /// Index along x
    pub i: usize,

    /// Index along y
    pub j: usize,

    /// Formation-local index in depth
    pub k: usize,
}

/// Holds the subdomain view of a formation element
///
/// The node dofs are ordered as the top face nodes (i,j), (i+1,j), (i+1,j+1),
/// (i,j+1) followed by the bottom face nodes in the same order.
#[derive(Clone, Debug, PartialEq)]
pub struct SubdomainElement {
    /// Index along x
    pub i: usize,

    /// Index along y
    pub j: usize,

    /// Formation-local index in depth
    pub k: usize,

    /// Subdomain index in depth (None outside the stencil footprint)
    pub global_k: Option<usize>,

    /// Representative dof of each of the eight nodes
    pub node_dofs: [usize; 8],

    /// Element above across a formation interface
    pub shallow: Option<SubdomainElementRef>,

    /// Element below across a formation interface
    pub deep: Option<SubdomainElementRef>,
}

impl SubdomainElement {
    /// Allocates an unnumbered element
    pub fn new(i: usize, j: usize, k: usize) -> Self {
        SubdomainElement {
            i,
            j,
            k,
            global_k: None,
            node_dofs: [0; 8],
            shallow: None,
            deep: None,
        }
    }
}

/// Holds the elements of one member formation of a subdomain
#[derive(Clone, Debug, PartialEq)]
pub struct FormationSubdomainElementGrid {
    /// Formation of the grid
    formation: FormationId,

    /// Subdomain index in depth of the top element of the formation
    first_global_k: usize,

    /// Holds the elements over the ghosted areal range
    elements: LocalArray3D<SubdomainElement>,
}

impl FormationSubdomainElementGrid {
    /// Allocates the grid of a formation with `n_elements` elements in depth
    pub fn new(formation: FormationId, n_elements: usize, owned: IndexRange, ghosted: IndexRange) -> Self {
        let mut elements = LocalArray3D::new(owned, ghosted, n_elements, SubdomainElement::new(0, 0, 0));
        for (i, j) in ghosted.iter() {
            for (k, element) in elements.column_mut(i, j).iter_mut().enumerate() {
                *element = SubdomainElement::new(i, j, k);
            }
        }
        FormationSubdomainElementGrid {
            formation,
            first_global_k: 0,
            elements,
        }
    }

    /// Returns the formation of the grid
    pub fn formation(&self) -> FormationId {
        self.formation
    }

    /// Returns the number of elements in depth
    pub fn len_k(&self) -> usize {
        self.elements.len_k()
    }

    /// Returns the subdomain index in depth of the top element
    pub fn first_global_k(&self) -> usize {
        self.first_global_k
    }

    /// Sets the subdomain index in depth of the top element
    pub(crate) fn set_first_global_k(&mut self, value: usize) {
        self.first_global_k = value;
    }

    /// Returns the range of areal elements owned by this rank
    pub fn owned(&self) -> &IndexRange {
        self.elements.owned()
    }

    /// Returns the owned range plus the ghost layer
    pub fn ghosted(&self) -> &IndexRange {
        self.elements.ghosted()
    }

    /// Returns the element (i,j,k) or None if out of range
    pub fn element(&self, i: usize, j: usize, k: usize) -> Option<&SubdomainElement> {
        self.elements.get(i, j, k)
    }

    /// Returns the mutable element (i,j,k) or None if out of range
    pub fn element_mut(&mut self, i: usize, j: usize, k: usize) -> Option<&mut SubdomainElement> {
        self.elements.get_mut(i, j, k)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
