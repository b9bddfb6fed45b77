use crate::StrError;
use serde::{Deserialize, Serialize};

/// Implements a piecewise-linear function of geological age
///
/// The function is defined by a set of (age, value) points. Between points the
/// value is linearly interpolated; outside the range of the points the value of
/// the nearest point is returned. A function without points evaluates to zero.
///
/// ```text
///  value
///    ↑        ●━━━━━━●
///    │       ╱        ╲
///    ━━━━━━━●          ●━━━━━━━
///    └─────────────────────────→ age
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PolyFunction {
    /// Holds the (age, value) points sorted by increasing age
    points: Vec<(f64, f64)>,
}

impl PolyFunction {
    /// Allocates a new function without points
    pub fn new() -> Self {
        PolyFunction { points: Vec::new() }
    }

    /// Allocates a function with a constant value
    pub fn constant(value: f64) -> Self {
        PolyFunction {
            points: vec![(0.0, value)],
        }
    }

    /// Adds a point, replacing the value of an existing point at the same age
    pub fn add_point(&mut self, age: f64, value: f64) -> Result<&mut Self, StrError> {
        if !age.is_finite() || !value.is_finite() {
            return Err("age and value of a PolyFunction point must be finite");
        }
        match self.points.binary_search_by(|p| p.0.total_cmp(&age)) {
            Ok(pos) => self.points[pos].1 = value,
            Err(pos) => self.points.insert(pos, (age, value)),
        }
        Ok(self)
    }

    /// Evaluates the function at the given age
    pub fn evaluate(&self, age: f64) -> f64 {
        let n = self.points.len();
        if n == 0 {
            return 0.0;
        }
        if age <= self.points[0].0 {
            return self.points[0].1;
        }
        if age >= self.points[n - 1].0 {
            return self.points[n - 1].1;
        }
        let pos = self.points.partition_point(|p| p.0 <= age);
        let (a0, v0) = self.points[pos - 1];
        let (a1, v1) = self.points[pos];
        v0 + (v1 - v0) * (age - a0) / (a1 - a0)
    }

    /// Returns the largest value over all points (zero if there are no points)
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.1).fold(0.0, f64::max)
    }

    /// Returns a copy with all values multiplied by a factor
    pub fn scaled(&self, factor: f64) -> Self {
        PolyFunction {
            points: self.points.iter().map(|&(a, v)| (a, v * factor)).collect(),
        }
    }

    /// Returns the (age, value) points
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::PolyFunction;
    use crate::StrError;

    #[test]
    fn empty_and_constant_work() {
        let f = PolyFunction::new();
        assert_eq!(f.evaluate(10.0), 0.0);
        assert_eq!(f.max_value(), 0.0);
        let g = PolyFunction::constant(3.0);
        assert_eq!(g.evaluate(-1.0), 3.0);
        assert_eq!(g.evaluate(100.0), 3.0);
    }

    #[test]
    fn evaluate_works() -> Result<(), StrError> {
        let mut f = PolyFunction::new();
        f.add_point(100.0, 0.0)?.add_point(50.0, 10.0)?.add_point(20.0, 4.0)?;
        assert_eq!(f.points(), &[(20.0, 4.0), (50.0, 10.0), (100.0, 0.0)]);
        assert_eq!(f.evaluate(200.0), 0.0);
        assert_eq!(f.evaluate(100.0), 0.0);
        assert_eq!(f.evaluate(75.0), 5.0);
        assert_eq!(f.evaluate(50.0), 10.0);
        assert_eq!(f.evaluate(35.0), 7.0);
        assert_eq!(f.evaluate(0.0), 4.0);
        assert_eq!(f.max_value(), 10.0);
        assert_eq!(f.scaled(0.5).evaluate(75.0), 2.5);
        Ok(())
    }

    #[test]
    fn add_point_replaces_and_rejects() -> Result<(), StrError> {
        let mut f = PolyFunction::new();
        f.add_point(10.0, 1.0)?.add_point(10.0, 2.0)?;
        assert_eq!(f.points().len(), 1);
        assert_eq!(f.evaluate(10.0), 2.0);
        assert_eq!(
            f.add_point(f64::NAN, 1.0).err(),
            Some("age and value of a PolyFunction point must be finite")
        );
        Ok(())
    }
}
