use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    error::Error,
    grid::Grid,
};

/// Which absorbing boundary approximation to run at the grid edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbcOrder {
    First,
    Second,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// An edge treatment that rewrites `ez[0]` and `ez[size − 1]` each step.
///
/// Runs strictly after the electric update and source corrections; the
/// interior update never touches the edge cells.
pub trait BoundaryTreatment {
    fn apply(&mut self, ez: &mut [f64]);

    /// Drops accumulated edge history, for a simulation reset.
    fn reset(&mut self);
}

/// Local normalized wave admittance at a grid edge, `sqrt(cezh · chye)`.
///
/// Derived once from the medium at the boundary cell; a non-positive or
/// non-finite value means the medium there is malformed.
fn admittance(grid: &Grid, side: Side) -> Result<f64, Error> {
    let size = grid.size();
    let value = match side {
        Side::Left => (grid.cezh[0] * grid.chye[0]).sqrt(),
        Side::Right => (grid.cezh[size - 1] * grid.chye[size - 2]).sqrt(),
    };

    if value.is_finite() && value > 0.0 {
        Ok(value)
    }
    else {
        Err(Error::InvalidBoundaryMedium {
            side,
            admittance: value,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct FirstOrderSide {
    reflection: f64,
    old_adjacent: f64,
}

impl FirstOrderSide {
    fn new(admittance: f64) -> Self {
        Self {
            reflection: (admittance - 1.0) / (admittance + 1.0),
            old_adjacent: 0.0,
        }
    }
}

/// One-tap Engquist–Majda-style boundary: a single reflection coefficient
/// and a depth-1 history of the adjacent cell per side.
#[derive(Clone, Debug)]
pub struct FirstOrderAbc {
    left: FirstOrderSide,
    right: FirstOrderSide,
}

impl FirstOrderAbc {
    pub fn new(grid: &Grid) -> Result<Self, Error> {
        Ok(Self {
            left: FirstOrderSide::new(admittance(grid, Side::Left)?),
            right: FirstOrderSide::new(admittance(grid, Side::Right)?),
        })
    }
}

impl BoundaryTreatment for FirstOrderAbc {
    fn apply(&mut self, ez: &mut [f64]) {
        let last = ez.len() - 1;

        ez[0] = self.left.old_adjacent + self.left.reflection * (ez[1] - ez[0]);
        self.left.old_adjacent = ez[1];

        ez[last] = self.right.old_adjacent + self.right.reflection * (ez[last - 1] - ez[last]);
        self.right.old_adjacent = ez[last - 1];
    }

    fn reset(&mut self) {
        self.left.old_adjacent = 0.0;
        self.right.old_adjacent = 0.0;
    }
}

#[derive(Clone, Copy, Debug)]
struct SecondOrderSide {
    coefficients: [f64; 3],
    /// 3-cell edge window from the previous step (index 0 is the edge cell)
    prev: [f64; 3],
    /// the same window from two steps ago
    prev2: [f64; 3],
}

impl SecondOrderSide {
    fn new(admittance: f64) -> Self {
        let inverse = 1.0 / admittance;
        let denominator = inverse + 2.0 + admittance;
        Self {
            coefficients: [
                -(inverse - 2.0 + admittance) / denominator,
                -2.0 * (admittance - inverse) / denominator,
                4.0 * (admittance + inverse) / denominator,
            ],
            prev: [0.0; 3],
            prev2: [0.0; 3],
        }
    }

    /// New edge value from the current window and both history generations.
    fn next_value(&self, window: [f64; 3]) -> f64 {
        let [c0, c1, c2] = self.coefficients;
        c0 * (window[2] + self.prev2[0])
            + c1 * (self.prev[0] + self.prev[2] - window[1] - self.prev2[1])
            + c2 * self.prev[1]
            - self.prev2[2]
    }

    fn rotate(&mut self, window: [f64; 3]) {
        self.prev2 = self.prev;
        self.prev = window;
    }
}

/// Three-tap boundary: a sharper discretization of the one-way wave
/// operator, with two generations of a 3-cell window per side.
#[derive(Clone, Debug)]
pub struct SecondOrderAbc {
    left: SecondOrderSide,
    right: SecondOrderSide,
}

impl SecondOrderAbc {
    pub fn new(grid: &Grid) -> Result<Self, Error> {
        Ok(Self {
            left: SecondOrderSide::new(admittance(grid, Side::Left)?),
            right: SecondOrderSide::new(admittance(grid, Side::Right)?),
        })
    }
}

impl BoundaryTreatment for SecondOrderAbc {
    fn apply(&mut self, ez: &mut [f64]) {
        let last = ez.len() - 1;

        // both edge values are computed before either history rotates; the
        // update reads prev and prev2 simultaneously
        let left = self.left.next_value([ez[0], ez[1], ez[2]]);
        let right = self
            .right
            .next_value([ez[last], ez[last - 1], ez[last - 2]]);
        ez[0] = left;
        ez[last] = right;

        self.left.rotate([ez[0], ez[1], ez[2]]);
        self.right.rotate([ez[last], ez[last - 1], ez[last - 2]]);
    }

    fn reset(&mut self) {
        self.left.prev = [0.0; 3];
        self.left.prev2 = [0.0; 3];
        self.right.prev = [0.0; 3];
        self.right.prev2 = [0.0; 3];
    }
}

#[derive(Clone, Debug)]
pub enum AnyAbc {
    FirstOrder(FirstOrderAbc),
    SecondOrder(SecondOrderAbc),
}

impl AnyAbc {
    pub fn new(order: AbcOrder, grid: &Grid) -> Result<Self, Error> {
        match order {
            AbcOrder::First => Ok(FirstOrderAbc::new(grid)?.into()),
            AbcOrder::Second => Ok(SecondOrderAbc::new(grid)?.into()),
        }
    }
}

impl BoundaryTreatment for AnyAbc {
    fn apply(&mut self, ez: &mut [f64]) {
        match self {
            AnyAbc::FirstOrder(first_order_abc) => first_order_abc.apply(ez),
            AnyAbc::SecondOrder(second_order_abc) => second_order_abc.apply(ez),
        }
    }

    fn reset(&mut self) {
        match self {
            AnyAbc::FirstOrder(first_order_abc) => first_order_abc.reset(),
            AnyAbc::SecondOrder(second_order_abc) => second_order_abc.reset(),
        }
    }
}

impl From<FirstOrderAbc> for AnyAbc {
    fn from(value: FirstOrderAbc) -> Self {
        Self::FirstOrder(value)
    }
}

impl From<SecondOrderAbc> for AnyAbc {
    fn from(value: SecondOrderAbc) -> Self {
        Self::SecondOrder(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{
        Material,
        Region,
        fill_coefficients,
    };

    fn uniform_grid(size: usize, material: Material) -> Grid {
        let mut grid = Grid::new(size);
        fill_coefficients(&mut grid, &[Region { start: 0, material }]).unwrap();
        grid
    }

    #[test]
    fn it_matches_the_vacuum_admittance() {
        let grid = uniform_grid(8, Material::VACUUM);
        assert!((admittance(&grid, Side::Left).unwrap() - 1.0).abs() < 1e-12);
        assert!((admittance(&grid, Side::Right).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn it_rejects_a_malformed_boundary_medium() {
        // coefficients never filled, so the admittance is zero
        let grid = Grid::new(8);
        assert!(matches!(
            FirstOrderAbc::new(&grid),
            Err(Error::InvalidBoundaryMedium {
                side: Side::Left,
                ..
            })
        ));
        assert!(matches!(
            SecondOrderAbc::new(&grid),
            Err(Error::InvalidBoundaryMedium {
                side: Side::Left,
                ..
            })
        ));
    }

    #[test]
    fn it_has_zero_reflection_in_vacuum() {
        let grid = uniform_grid(8, Material::VACUUM);
        let abc = FirstOrderAbc::new(&grid).unwrap();
        assert!(abc.left.reflection.abs() < 1e-12);
        assert!(abc.right.reflection.abs() < 1e-12);
    }

    #[test]
    fn it_derives_the_dense_medium_reflection_coefficient() {
        // εr = 9 gives an admittance of 1/3 and Γ = −1/2
        let grid = uniform_grid(8, Material::lossless(9.0));
        let abc = FirstOrderAbc::new(&grid).unwrap();
        assert!((abc.left.reflection + 0.5).abs() < 1e-12);
    }

    #[test]
    fn it_delays_the_adjacent_cell_in_vacuum() {
        // with Γ = 0 the first-order update is ez[edge] ← ez[adjacent] from
        // the previous step, exact for an outgoing wave at Courant 1
        let grid = uniform_grid(6, Material::VACUUM);
        let mut abc = FirstOrderAbc::new(&grid).unwrap();

        let mut ez = [0.0, 0.5, 0.0, 0.0, 0.25, 0.0];
        abc.apply(&mut ez);
        assert_eq!(ez[0], 0.0);
        assert_eq!(ez[5], 0.0);

        let mut ez = [0.9, 0.1, 0.0, 0.0, 0.3, 0.7];
        abc.apply(&mut ez);
        assert_eq!(ez[0], 0.5);
        assert_eq!(ez[5], 0.25);
    }

    #[test]
    fn it_reduces_second_order_coefficients_in_vacuum() {
        let side = SecondOrderSide::new(1.0);
        assert!(side.coefficients[0].abs() < 1e-12);
        assert!(side.coefficients[1].abs() < 1e-12);
        assert!((side.coefficients[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn it_rotates_history_after_computing_both_edges() {
        let grid = uniform_grid(8, Material::lossless(4.0));
        let mut abc = SecondOrderAbc::new(&grid).unwrap();

        let mut ez = [0.0, 0.1, 0.2, 0.0, 0.0, 0.4, 0.3, 0.0];
        abc.apply(&mut ez);
        assert_eq!(abc.left.prev, [ez[0], 0.1, 0.2]);
        assert_eq!(abc.right.prev, [ez[7], 0.3, 0.4]);
        assert_eq!(abc.left.prev2, [0.0; 3]);

        let before = abc.left.prev;
        abc.apply(&mut ez);
        assert_eq!(abc.left.prev2, before);

        abc.reset();
        assert_eq!(abc.left.prev, [0.0; 3]);
        assert_eq!(abc.right.prev2, [0.0; 3]);
    }
}
