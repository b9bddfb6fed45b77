use crate::base::{Phase, NULL_VALUE, NUMBER_OF_PVT_COMPONENTS};
use crate::grid::{IndexRange, LocalArray3D};

/// Defines the nodal properties stored by every formation
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LayerProperty {
    Depth = 0,
    HydrostaticPressure,
    LithostaticPressure,
    PorePressure,
    Overpressure,
    Ves,
    MaxVes,
    Temperature,
    ChemicalCompaction,
    Porosity,
}

impl LayerProperty {
    /// Holds all properties
    pub const ALL: [LayerProperty; 10] = [
        LayerProperty::Depth,
        LayerProperty::HydrostaticPressure,
        LayerProperty::LithostaticPressure,
        LayerProperty::PorePressure,
        LayerProperty::Overpressure,
        LayerProperty::Ves,
        LayerProperty::MaxVes,
        LayerProperty::Temperature,
        LayerProperty::ChemicalCompaction,
        LayerProperty::Porosity,
    ];

    /// Returns the name used by the output layer
    pub fn name(&self) -> &'static str {
        match self {
            LayerProperty::Depth => "Depth",
            LayerProperty::HydrostaticPressure => "HydroStaticPressure",
            LayerProperty::LithostaticPressure => "LithoStaticPressure",
            LayerProperty::PorePressure => "Pressure",
            LayerProperty::Overpressure => "OverPressure",
            LayerProperty::Ves => "Ves",
            LayerProperty::MaxVes => "MaxVes",
            LayerProperty::Temperature => "Temperature",
            LayerProperty::ChemicalCompaction => "ChemicalCompaction",
            LayerProperty::Porosity => "Porosity",
        }
    }
}

/// Holds the current and previous nodal properties of a formation
///
/// Every vector has one column of `number_of_nodes` entries per ghosted areal node.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyVectors {
    /// Values at the current age, indexed by [LayerProperty]
    current: Vec<LocalArray3D<f64>>,

    /// Values at the previous age, indexed by [LayerProperty]
    previous: Vec<LocalArray3D<f64>>,
}

impl PropertyVectors {
    /// Allocates all vectors
    ///
    /// The temperature starts at `surface_temperature`; everything else starts at zero.
    pub fn new(owned: IndexRange, ghosted: IndexRange, number_of_nodes: usize, surface_temperature: f64) -> Self {
        let current: Vec<_> = LayerProperty::ALL
            .iter()
            .map(|p| LocalArray3D::new(owned, ghosted, number_of_nodes, initial_value(*p, surface_temperature)))
            .collect();
        let previous = current.clone();
        PropertyVectors { current, previous }
    }

    /// Returns the current values of a property
    pub fn current(&self, property: LayerProperty) -> &LocalArray3D<f64> {
        &self.current[property as usize]
    }

    /// Returns the mutable current values of a property
    pub fn current_mut(&mut self, property: LayerProperty) -> &mut LocalArray3D<f64> {
        &mut self.current[property as usize]
    }

    /// Returns the previous values of a property
    pub fn previous(&self, property: LayerProperty) -> &LocalArray3D<f64> {
        &self.previous[property as usize]
    }

    /// Copies the current values into the previous ones
    pub fn copy_current_to_previous(&mut self) {
        self.previous.clone_from(&self.current);
    }

    /// Resets all values (current and previous) to their initial state
    pub fn reset(&mut self, surface_temperature: f64) {
        for (p, vector) in LayerProperty::ALL.iter().zip(self.current.iter_mut()) {
            vector.fill(initial_value(*p, surface_temperature));
        }
        self.copy_current_to_previous();
    }
}

/// Holds the element-based fields of the multi-component flow
#[derive(Clone, Debug, PartialEq)]
pub struct FlowVectors {
    /// Saturation of each phase, indexed by [Phase]
    saturations: Vec<LocalArray3D<f64>>,

    /// Mass of each PVT component
    component_masses: Vec<LocalArray3D<f64>>,

    /// Age at which hydrocarbons first entered the element (NULL_VALUE if never)
    time_of_invasion: LocalArray3D<f64>,
}

impl FlowVectors {
    /// Allocates all vectors for `number_of_elements` elements per ghosted areal element
    pub fn new(owned: IndexRange, ghosted: IndexRange, number_of_elements: usize) -> Self {
        FlowVectors {
            saturations: Phase::ALL
                .iter()
                .map(|p| LocalArray3D::new(owned, ghosted, number_of_elements, p.initial_saturation()))
                .collect(),
            component_masses: (0..NUMBER_OF_PVT_COMPONENTS)
                .map(|_| LocalArray3D::new(owned, ghosted, number_of_elements, 0.0))
                .collect(),
            time_of_invasion: LocalArray3D::new(owned, ghosted, number_of_elements, NULL_VALUE),
        }
    }

    /// Returns the saturation of a phase
    pub fn saturation(&self, phase: Phase) -> &LocalArray3D<f64> {
        &self.saturations[phase as usize]
    }

    /// Returns the mutable saturation of a phase
    pub fn saturation_mut(&mut self, phase: Phase) -> &mut LocalArray3D<f64> {
        &mut self.saturations[phase as usize]
    }

    /// Returns the mass of a PVT component
    pub fn component_mass(&self, component: usize) -> Option<&LocalArray3D<f64>> {
        self.component_masses.get(component)
    }

    /// Returns the mutable mass of a PVT component
    pub fn component_mass_mut(&mut self, component: usize) -> Option<&mut LocalArray3D<f64>> {
        self.component_masses.get_mut(component)
    }

    /// Returns the age of first invasion
    pub fn time_of_invasion(&self) -> &LocalArray3D<f64> {
        &self.time_of_invasion
    }

    /// Returns the mutable age of first invasion
    pub fn time_of_invasion_mut(&mut self) -> &mut LocalArray3D<f64> {
        &mut self.time_of_invasion
    }

    /// Resets all values to the water-saturated state
    pub fn reset(&mut self) {
        for (p, vector) in Phase::ALL.iter().zip(self.saturations.iter_mut()) {
            vector.fill(p.initial_saturation());
        }
        self.component_masses.iter_mut().for_each(|m| m.fill(0.0));
        self.time_of_invasion.fill(NULL_VALUE);
    }
}

fn initial_value(property: LayerProperty, surface_temperature: f64) -> f64 {
    match property {
        LayerProperty::Temperature => surface_temperature,
        _ => 0.0,
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{FlowVectors, LayerProperty, PropertyVectors};
    use crate::base::{Phase, NULL_VALUE, NUMBER_OF_PVT_COMPONENTS};
    use crate::grid::IndexRange;

    #[test]
    fn property_vectors_work() {
        let owned = IndexRange::new(0, 1, 0, 0);
        let mut vectors = PropertyVectors::new(owned, owned, 3, 10.0);
        assert_eq!(vectors.current(LayerProperty::Temperature).column(1, 0), &[10.0, 10.0, 10.0]);
        assert_eq!(vectors.current(LayerProperty::Depth).len_k(), 3);
        vectors.current_mut(LayerProperty::Depth)[(0, 0, 2)] = 150.0;
        assert_eq!(vectors.previous(LayerProperty::Depth)[(0, 0, 2)], 0.0);
        vectors.copy_current_to_previous();
        assert_eq!(vectors.previous(LayerProperty::Depth)[(0, 0, 2)], 150.0);
        vectors.reset(4.0);
        assert_eq!(vectors.previous(LayerProperty::Depth)[(0, 0, 2)], 0.0);
        assert_eq!(vectors.current(LayerProperty::Temperature)[(0, 0, 0)], 4.0);
        assert_eq!(LayerProperty::Ves.name(), "Ves");
    }

    #[test]
    fn flow_vectors_work() {
        let owned = IndexRange::new(0, 0, 0, 0);
        let mut flow = FlowVectors::new(owned, owned, 2);
        assert_eq!(flow.saturation(Phase::Water).column(0, 0), &[1.0, 1.0]);
        assert_eq!(flow.saturation(Phase::Vapour).column(0, 0), &[0.0, 0.0]);
        assert!(flow.component_mass(NUMBER_OF_PVT_COMPONENTS - 1).is_some());
        assert!(flow.component_mass(NUMBER_OF_PVT_COMPONENTS).is_none());
        flow.saturation_mut(Phase::Liquid)[(0, 0, 1)] = 0.3;
        flow.time_of_invasion_mut()[(0, 0, 1)] = 12.0;
        if let Some(mass) = flow.component_mass_mut(0) {
            mass[(0, 0, 0)] = 5.0;
        }
        flow.reset();
        assert_eq!(flow.saturation(Phase::Liquid)[(0, 0, 1)], 0.0);
        assert_eq!(flow.time_of_invasion()[(0, 0, 1)], NULL_VALUE);
        assert_eq!(flow.component_mass(0).map(|m| m[(0, 0, 0)]), Some(0.0));
    }
}
