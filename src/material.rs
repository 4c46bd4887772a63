use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    error::RegionError,
    grid::Grid,
};

/// Impedance of free space in ohms, the grid's characteristic scale.
pub const FREE_SPACE_IMPEDANCE: f64 = 377.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Material {
    /// epsilon_r
    pub relative_permittivity: f64,
    /// dimensionless electric loss factor (sigma Δt / 2 epsilon)
    pub loss: f64,
}

impl Material {
    pub const VACUUM: Self = Self {
        relative_permittivity: 1.0,
        loss: 0.0,
    };

    pub fn lossless(relative_permittivity: f64) -> Self {
        Self {
            relative_permittivity,
            loss: 0.0,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::VACUUM
    }
}

/// A piecewise-constant medium segment.
///
/// A region extends from `start` up to the next region's start (or the end
/// of the grid). Region lists must be ordered, begin at cell 0, and cover
/// the grid without overlap.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Region {
    pub start: usize,
    pub material: Material,
}

fn validate(regions: &[Region], extent: usize) -> Result<(), RegionError> {
    let first = regions.first().ok_or(RegionError::Empty)?;
    if first.start != 0 {
        return Err(RegionError::DoesNotStartAtZero { start: first.start });
    }

    let mut previous = 0;
    for region in &regions[1..] {
        if region.start <= previous {
            return Err(RegionError::Overlapping {
                start: region.start,
                previous,
            });
        }
        if region.start >= extent {
            return Err(RegionError::StartBeyondGrid {
                start: region.start,
                extent,
            });
        }
        previous = region.start;
    }

    for region in regions {
        let Material {
            relative_permittivity,
            loss,
        } = region.material;
        // NaN fails both comparisons and is rejected here too
        if !(relative_permittivity >= 1.0) {
            return Err(RegionError::PermittivityBelowUnity {
                value: relative_permittivity,
            });
        }
        if !(loss >= 0.0) {
            return Err(RegionError::NegativeLoss { value: loss });
        }
    }

    Ok(())
}

/// Writes the update coefficients for the given medium into the grid.
///
/// For a cell with relative permittivity εr and loss factor L:
/// `ceze = (1 − L)/(1 + L)` and `cezh = Z0/εr/(1 + L)`; a lossless cell
/// reduces to `ceze = 1`, `cezh = Z0/εr`. Magnetic loss is not modelled, so
/// `chyh = 1` and `chye = 1/Z0` everywhere. Idempotent for a given region
/// list.
pub(crate) fn fill_coefficients(grid: &mut Grid, regions: &[Region]) -> Result<(), RegionError> {
    let extent = grid.size();
    validate(regions, extent)?;

    for (index, region) in regions.iter().enumerate() {
        let end = regions
            .get(index + 1)
            .map(|next| next.start)
            .unwrap_or(extent);
        let Material {
            relative_permittivity,
            loss,
        } = region.material;

        for i in region.start..end {
            grid.ceze[i] = (1.0 - loss) / (1.0 + loss);
            grid.cezh[i] = FREE_SPACE_IMPEDANCE / relative_permittivity / (1.0 + loss);
        }
    }

    grid.chyh.fill(1.0);
    grid.chye.fill(1.0 / FREE_SPACE_IMPEDANCE);

    Ok(())
}
