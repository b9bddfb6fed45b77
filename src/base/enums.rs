use serde::{Deserialize, Serialize};

/// Defines the kind of a stratigraphic formation
///
/// The kind is resolved once when the formation is loaded; the capability
/// queries on [crate::layer::LayerProps] are derived from it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum FormationKind {
    /// Sedimentary formation deposited during the basin history
    Sediment,

    /// Continental (or oceanic) crust
    Crust,

    /// Lithospheric mantle
    Mantle,
}

impl FormationKind {
    /// Returns true for a sediment formation
    pub fn is_sediment(&self) -> bool {
        *self == FormationKind::Sediment
    }

    /// Returns true for crust or mantle
    pub fn is_basement(&self) -> bool {
        !self.is_sediment()
    }
}

/// Defines the four lateral edges of an areal (map) element
///
/// ```text
///   (i,j+1) ---- Back ---- (i+1,j+1)
///      |                      |
///    Left                   Right
///      |                      |
///    (i,j) ---- Front ---- (i+1,j)
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum MapEdge {
    Front = 0,
    Right = 1,
    Back = 2,
    Left = 3,
}

impl MapEdge {
    /// Holds all edges in counter-clockwise order starting at the front
    pub const ALL: [MapEdge; 4] = [MapEdge::Front, MapEdge::Right, MapEdge::Back, MapEdge::Left];

    /// Returns the index of the edge in arrays of length 4
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Defines the six faces of a hexahedral volume element
///
/// The lateral faces coincide with the [MapEdge] of the element footprint;
/// the shallow face is at the top (smaller k) and the deep face at the bottom.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum VolumeFace {
    Front = 0,
    Right = 1,
    Back = 2,
    Left = 3,
    Shallow = 4,
    Deep = 5,
}

impl VolumeFace {
    /// Holds all faces
    pub const ALL: [VolumeFace; 6] = [
        VolumeFace::Front,
        VolumeFace::Right,
        VolumeFace::Back,
        VolumeFace::Left,
        VolumeFace::Shallow,
        VolumeFace::Deep,
    ];

    /// Returns the index of the face in arrays of length 6
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Returns the lateral face over a map edge
    pub fn from_edge(edge: MapEdge) -> Self {
        match edge {
            MapEdge::Front => VolumeFace::Front,
            MapEdge::Right => VolumeFace::Right,
            MapEdge::Back => VolumeFace::Back,
            MapEdge::Left => VolumeFace::Left,
        }
    }

    /// Returns the face on the other side of the shared interface
    pub fn opposite(&self) -> Self {
        match self {
            VolumeFace::Front => VolumeFace::Back,
            VolumeFace::Right => VolumeFace::Left,
            VolumeFace::Back => VolumeFace::Front,
            VolumeFace::Left => VolumeFace::Right,
            VolumeFace::Shallow => VolumeFace::Deep,
            VolumeFace::Deep => VolumeFace::Shallow,
        }
    }
}

/// Defines the resolution of the areal grid used by an output activity
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum GridResolution {
    /// Sub-sampled grid used by most calculation modes
    Low,

    /// Full input grid
    High,
}

/// Defines the fluid phases of the Darcy solver
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum Phase {
    Water = 0,
    Liquid = 1,
    Vapour = 2,
}

impl Phase {
    /// Holds all phases
    pub const ALL: [Phase; 3] = [Phase::Water, Phase::Liquid, Phase::Vapour];

    /// Returns the saturation assigned before any hydrocarbon arrives
    pub fn initial_saturation(&self) -> f64 {
        match self {
            Phase::Water => 1.0,
            _ => 0.0,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{FormationKind, MapEdge, Phase, VolumeFace};

    #[test]
    fn formation_kind_works() {
        assert!(FormationKind::Sediment.is_sediment());
        assert!(FormationKind::Crust.is_basement());
        assert!(FormationKind::Mantle.is_basement());
    }

    #[test]
    fn faces_and_edges_agree() {
        for edge in MapEdge::ALL {
            assert_eq!(VolumeFace::from_edge(edge).index(), edge.index());
        }
        for face in VolumeFace::ALL {
            assert_eq!(face.opposite().opposite(), face);
        }
        assert_eq!(VolumeFace::Shallow.opposite(), VolumeFace::Deep);
        assert_eq!(VolumeFace::Left.opposite(), VolumeFace::Right);
    }

    #[test]
    fn initial_saturation_works() {
        let total: f64 = Phase::ALL.iter().map(|p| p.initial_saturation()).sum();
        assert_eq!(total, 1.0);
    }
}
