use super::{ElementRef, LayerProps};
use crate::base::VolumeFace;
use crate::grid::MapElementArray;
use crate::simulator::{FormationRecord, Mesh};
use crate::StrError;
use std::ops::{Index, IndexMut};

/// Identifies a formation by its position in the registry (0 is the top formation)
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FormationId(pub usize);

/// Holds all formations of the basin, from the top to the bottom of the stratigraphy
///
/// The registry is the sole owner of the formations; everything else refers to
/// them by [FormationId].
pub struct Formations {
    layers: Vec<LayerProps>,
}

impl Formations {
    /// Allocates the formations from their records (top to bottom)
    pub fn new(records: &[FormationRecord]) -> Self {
        Formations {
            layers: records
                .iter()
                .enumerate()
                .map(|(index, record)| LayerProps::new(FormationId(index), record))
                .collect(),
        }
    }

    /// Returns the number of formations
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if there are no formations
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the formation with the given id
    pub fn get(&self, id: FormationId) -> Option<&LayerProps> {
        self.layers.get(id.0)
    }

    /// Returns the mutable formation with the given id
    pub fn get_mut(&mut self, id: FormationId) -> Option<&mut LayerProps> {
        self.layers.get_mut(id.0)
    }

    /// Returns an iterator over the formations (top to bottom)
    pub fn iter(&self) -> impl Iterator<Item = &LayerProps> {
        self.layers.iter()
    }

    /// Returns a mutable iterator over the formations (top to bottom)
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut LayerProps> {
        self.layers.iter_mut()
    }

    /// Returns the id of the formation with the given name
    pub fn find(&self, name: &str) -> Option<FormationId> {
        self.layers.iter().find(|l| l.name == name).map(|l| l.id)
    }

    /// Returns the ids of the sediments (top to bottom)
    pub fn sediment_ids(&self) -> Vec<FormationId> {
        self.layers.iter().filter(|l| l.is_sediment()).map(|l| l.id).collect()
    }

    /// Returns true if the basement has both a crust and a mantle
    pub fn has_crust_and_mantle(&self) -> bool {
        self.layers.iter().any(|l| l.is_crust()) && self.layers.iter().any(|l| l.is_mantle())
    }

    /// Applies the element height refinement overrides
    ///
    /// The numbered overrides (formation index, factor) are applied first, then
    /// the named overrides (formation name, factor).
    pub fn set_depth_refinement_factors(&mut self, numbered: &[String], named: &[String]) -> Result<(), StrError> {
        if numbered.len() % 2 != 0 || named.len() % 2 != 0 {
            return Err("refinement arguments must come in (formation, factor) pairs");
        }
        for pair in numbered.chunks(2) {
            let index: usize = pair[0]
                .trim()
                .parse()
                .map_err(|_| "formation index in refinement arguments must be a non-negative integer")?;
            if index >= self.layers.len() {
                return Err("formation index in refinement arguments is out of range");
            }
            let factor = parse_factor(&pair[1])?;
            self.layers[index].set_depth_refinement_factor(factor)?;
        }
        for pair in named.chunks(2) {
            let id = self.find(pair[0].trim()).ok_or("unknown formation name in refinement arguments")?;
            let factor = parse_factor(&pair[1])?;
            self.layers[id.0].set_depth_refinement_factor(factor)?;
        }
        Ok(())
    }

    /// Sets the number of active elements of every formation at the given age
    pub fn find_active_elements(&mut self, age: f64) {
        for layer in &mut self.layers {
            layer.find_active_elements(age);
        }
    }

    /// Builds the thickness histories and the elements of every formation and connects them vertically
    pub fn initialise(&mut self, mesh: &Mesh) -> Result<(), StrError> {
        for layer in &mut self.layers {
            layer.initialise(mesh)?;
        }
        self.connect_elements(&mesh.map);
        Ok(())
    }

    /// Links the bottom element of each formation to the top element of the formation below
    pub fn connect_elements(&mut self, map: &MapElementArray) {
        for index in 1..self.layers.len() {
            let (head, tail) = self.layers.split_at_mut(index);
            let above = &mut head[index - 1];
            let below = &mut tail[0];
            let n_above = above.get_maximum_number_of_elements();
            if n_above == 0 || below.get_maximum_number_of_elements() == 0 {
                continue;
            }
            for (i, j) in map.ghosted().iter() {
                if !map.is_valid(i, j) {
                    continue;
                }
                let top_of_below = ElementRef {
                    formation: below.id,
                    i,
                    j,
                    k: 0,
                };
                let bottom_of_above = ElementRef {
                    formation: above.id,
                    i,
                    j,
                    k: n_above - 1,
                };
                if let Some(e) = above.element_mut(i, j, n_above - 1) {
                    e.neighbours[VolumeFace::Deep.index()] = Some(top_of_below);
                }
                if let Some(e) = below.element_mut(i, j, 0) {
                    e.neighbours[VolumeFace::Shallow.index()] = Some(bottom_of_above);
                }
            }
        }
    }

    /// Sets the element activity of every formation at the given age
    pub fn set_layer_element_activity(&mut self, map: &MapElementArray, age: f64) {
        for layer in &mut self.layers {
            layer.set_layer_element_activity(map, age);
        }
    }

    /// Allocates the field vectors of newly active formations and returns how many were allocated
    pub fn allocate_new_vecs(&mut self, mesh: &Mesh, surface_temperature: f64) -> usize {
        self.layers
            .iter_mut()
            .map(|l| l.allocate_new_vecs(mesh, surface_temperature))
            .filter(|allocated| *allocated)
            .count()
    }

    /// Resets the field vectors of all formations
    pub fn re_initialise(&mut self, surface_temperature: f64) {
        for layer in &mut self.layers {
            layer.re_initialise(surface_temperature);
        }
    }
}

impl Index<FormationId> for Formations {
    type Output = LayerProps;
    fn index(&self, id: FormationId) -> &Self::Output {
        &self.layers[id.0]
    }
}

impl IndexMut<FormationId> for Formations {
    fn index_mut(&mut self, id: FormationId) -> &mut Self::Output {
        &mut self.layers[id.0]
    }
}

fn parse_factor(text: &str) -> Result<usize, StrError> {
    match text.trim().parse::<usize>() {
        Ok(factor) if factor >= 1 => Ok(factor),
        _ => Err("refinement factor must be a positive integer"),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
