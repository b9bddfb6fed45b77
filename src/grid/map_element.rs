use super::{ElementGrid, IndexRange, LocalArray2D};
use crate::base::MapEdge;

/// Holds the areal (map) classification of element (i,j)
///
/// ```text
///   Left node (i,j+1)      Back node (i+1,j+1)
///          ●──────── Back ────────●
///          │                      │
///        Left                   Right
///          │                      │
///          ●──────── Front ───────●
///   Front node (i,j)      Right node (i+1,j)
/// ```
///
/// The node position of an edge is the first node of the edge in
/// counter-clockwise order.
#[derive(Clone, Debug, PartialEq)]
pub struct MapElement {
    /// Index along x
    pub i: usize,

    /// Index along y
    pub j: usize,

    /// Usable on this rank: all corner nodes are valid and the element is not a corner ghost
    pub is_valid: bool,

    /// Validity computed by the owner of the element (identical on all ranks)
    pub global_validity: bool,

    /// Owned by this rank
    pub is_on_processor: bool,

    /// Ghost element outside the owned range in both directions
    pub is_corner_ghost: bool,

    /// Node (i,j) positions indexed by [MapEdge]
    pub node_positions: [(usize, usize); 4],

    /// Edges lying on the boundary of the range owned by this rank
    pub on_processor_boundary: [bool; 4],

    /// Edges lying on the boundary of the valid domain
    pub on_domain_boundary: [bool; 4],
}

impl MapElement {
    /// Allocates an invalid element with its node positions set
    pub fn new(i: usize, j: usize) -> Self {
        MapElement {
            i,
            j,
            is_valid: false,
            global_validity: false,
            is_on_processor: false,
            is_corner_ghost: false,
            node_positions: [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)],
            on_processor_boundary: [false; 4],
            on_domain_boundary: [false; 4],
        }
    }

    /// Returns the node (i,j) at the start of an edge
    pub fn node_position(&self, edge: MapEdge) -> (usize, usize) {
        self.node_positions[edge.index()]
    }

    /// Returns true if the edge is on the boundary of the range owned by this rank
    pub fn is_on_processor_boundary(&self, edge: MapEdge) -> bool {
        self.on_processor_boundary[edge.index()]
    }

    /// Returns true if the edge is on the boundary of the valid domain
    pub fn is_on_domain_boundary(&self, edge: MapEdge) -> bool {
        self.on_domain_boundary[edge.index()]
    }

    /// Returns true if any edge is on the boundary of the valid domain
    pub fn is_on_any_domain_boundary(&self) -> bool {
        self.on_domain_boundary.iter().any(|b| *b)
    }

    /// Packs the owner's classification into bits (validity then the domain boundary flags)
    pub(crate) fn pack_classification(&self) -> u8 {
        let mut bits = self.global_validity as u8;
        for edge in MapEdge::ALL {
            if self.on_domain_boundary[edge.index()] {
                bits |= 1 << (edge.index() + 1);
            }
        }
        bits
    }

    /// Applies a classification packed by [MapElement::pack_classification]
    pub(crate) fn unpack_classification(&mut self, bits: u8) {
        self.global_validity = bits & 1 != 0;
        for edge in MapEdge::ALL {
            self.on_domain_boundary[edge.index()] = bits & (1 << (edge.index() + 1)) != 0;
        }
    }

    /// Returns the character of this element in the validity map
    pub fn validity_char(&self) -> char {
        if self.is_valid && self.is_on_any_domain_boundary() {
            return '#';
        }
        if !self.is_valid && self.is_on_processor {
            let f = self.is_on_processor_boundary(MapEdge::Front);
            let r = self.is_on_processor_boundary(MapEdge::Right);
            let b = self.is_on_processor_boundary(MapEdge::Back);
            let l = self.is_on_processor_boundary(MapEdge::Left);
            return match (f, r, b, l) {
                (true, false, false, false) | (false, false, true, false) => '-',
                (false, true, false, false) | (false, false, false, true) => '|',
                (true, true, false, false)
                | (false, true, true, false)
                | (false, false, true, true)
                | (true, false, false, true) => '+',
                _ => '.',
            };
        }
        match (self.is_valid, self.is_on_processor) {
            (true, true) => '*',
            (true, false) => 'x',
            _ => '.',
        }
    }
}

/// Holds the map elements over the owned-plus-ghost range of a rank
#[derive(Clone, Debug, PartialEq)]
pub struct MapElementArray {
    /// Holds the elements
    pub elements: LocalArray2D<MapElement>,

    /// Number of elements along i in the whole grid
    pub n_elements_x: usize,

    /// Number of elements along j in the whole grid
    pub n_elements_y: usize,
}

impl MapElementArray {
    /// Allocates an array of invalid elements matching the element grid
    pub fn new(grid: &ElementGrid) -> Self {
        let owned = *grid.owned();
        let ghosted = *grid.ghosted();
        let mut elements = LocalArray2D::new(owned, ghosted, MapElement::new(0, 0));
        for (i, j) in ghosted.iter() {
            elements[(i, j)] = MapElement::new(i, j);
        }
        MapElementArray {
            elements,
            n_elements_x: grid.n_elements_x(),
            n_elements_y: grid.n_elements_y(),
        }
    }

    /// Returns the element at (i,j) or None if (i,j) is not in the ghosted range
    pub fn get(&self, i: usize, j: usize) -> Option<&MapElement> {
        self.elements.get(i, j)
    }

    /// Returns the range owned by this rank
    pub fn owned(&self) -> &IndexRange {
        self.elements.owned()
    }

    /// Returns the owned range plus the ghost layer
    pub fn ghosted(&self) -> &IndexRange {
        self.elements.ghosted()
    }

    /// Returns true if (i,j) is valid on this rank (false outside the ghosted range)
    pub fn is_valid(&self, i: usize, j: usize) -> bool {
        self.elements.get(i, j).map(|e| e.is_valid).unwrap_or(false)
    }

    /// Returns the number of valid owned elements
    pub fn number_of_valid_owned(&self) -> usize {
        self.owned().iter().filter(|&(i, j)| self.elements[(i, j)].is_valid).count()
    }

    /// Returns the validity map of this rank, one line per j (the last j first)
    ///
    /// Elements outside the ghosted range are shown as '.'.
    pub fn image(&self) -> String {
        let mut buffer = String::new();
        for j in (0..self.n_elements_y).rev() {
            for i in 0..self.n_elements_x {
                let c = self.elements.get(i, j).map(|e| e.validity_char()).unwrap_or('.');
                buffer.push(c);
            }
            buffer.push('\n');
        }
        buffer
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{MapElement, MapElementArray};
    use crate::base::MapEdge;
    use crate::grid::{ElementGrid, GridDescription};
    use crate::parallel::Partition;
    use crate::StrError;

    #[test]
    fn new_sets_node_positions() {
        let e = MapElement::new(3, 5);
        assert_eq!(e.node_position(MapEdge::Front), (3, 5));
        assert_eq!(e.node_position(MapEdge::Right), (4, 5));
        assert_eq!(e.node_position(MapEdge::Back), (4, 6));
        assert_eq!(e.node_position(MapEdge::Left), (3, 6));
        assert!(!e.is_valid);
        assert!(!e.is_on_any_domain_boundary());
    }

    #[test]
    fn classification_packing_works() {
        let mut e = MapElement::new(0, 0);
        e.global_validity = true;
        e.on_domain_boundary = [true, false, false, true];
        let bits = e.pack_classification();
        let mut f = MapElement::new(0, 0);
        f.unpack_classification(bits);
        assert!(f.global_validity);
        assert_eq!(f.on_domain_boundary, [true, false, false, true]);
    }

    #[test]
    fn validity_char_works() {
        let mut e = MapElement::new(0, 0);
        e.is_on_processor = true;
        assert_eq!(e.validity_char(), '.');
        e.on_processor_boundary = [true, false, false, false];
        assert_eq!(e.validity_char(), '-');
        e.on_processor_boundary = [false, false, false, true];
        assert_eq!(e.validity_char(), '|');
        e.on_processor_boundary = [true, false, false, true];
        assert_eq!(e.validity_char(), '+');
        e.on_processor_boundary = [true, false, true, false];
        assert_eq!(e.validity_char(), '.');
        e.is_valid = true;
        assert_eq!(e.validity_char(), '*');
        e.on_domain_boundary[MapEdge::Right.index()] = true;
        assert_eq!(e.validity_char(), '#');
        e.on_domain_boundary = [false; 4];
        e.is_on_processor = false;
        assert_eq!(e.validity_char(), 'x');
    }

    #[test]
    fn array_works() -> Result<(), StrError> {
        let desc = GridDescription::new(4, 3);
        let partition = Partition::new(3, 2, 1)?;
        let grid = ElementGrid::new(&desc, &partition, 0)?;
        let mut map = MapElementArray::new(&grid);
        assert_eq!(map.get(2, 1).map(|e| (e.i, e.j)), Some((2, 1)));
        assert_eq!(map.number_of_valid_owned(), 0);
        map.elements[(1, 0)].is_valid = true;
        map.elements[(1, 0)].is_on_processor = true;
        assert!(map.is_valid(1, 0));
        assert!(!map.is_valid(9, 9));
        assert_eq!(map.number_of_valid_owned(), 1);
        assert_eq!(map.image(), "...\n.*.\n");
        Ok(())
    }
}
