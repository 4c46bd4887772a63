use crate::error::{
    Error,
    FieldComponent,
};

/// Field and coefficient storage for a one-dimensional Yee grid.
///
/// `ez` lives at integer nodes, `hy` at half-integer nodes offset +½, so
/// `hy` is one cell shorter. The coefficient arrays are written once by the
/// medium initializer and read-only afterwards.
#[derive(Clone, Debug)]
pub struct Grid {
    pub(crate) ez: Box<[f64]>,
    pub(crate) hy: Box<[f64]>,

    pub(crate) ceze: Box<[f64]>,
    pub(crate) cezh: Box<[f64]>,
    pub(crate) chyh: Box<[f64]>,
    pub(crate) chye: Box<[f64]>,
}

impl Grid {
    /// Allocates a zeroed grid with `size` electric-field nodes.
    ///
    /// Coefficients start at zero; they are only meaningful once the medium
    /// initializer has filled them.
    pub(crate) fn new(size: usize) -> Self {
        Self {
            ez: vec![0.0; size].into_boxed_slice(),
            hy: vec![0.0; size - 1].into_boxed_slice(),
            ceze: vec![0.0; size].into_boxed_slice(),
            cezh: vec![0.0; size].into_boxed_slice(),
            chyh: vec![0.0; size - 1].into_boxed_slice(),
            chye: vec![0.0; size - 1].into_boxed_slice(),
        }
    }

    /// Number of electric-field nodes.
    pub fn size(&self) -> usize {
        self.ez.len()
    }

    pub fn ez(&self) -> &[f64] {
        &self.ez
    }

    pub fn hy(&self) -> &[f64] {
        &self.hy
    }

    pub fn ez_at(&self, index: usize) -> Result<f64, Error> {
        self.ez.get(index).copied().ok_or(Error::OutOfRange {
            index,
            extent: self.ez.len(),
        })
    }

    pub fn hy_at(&self, index: usize) -> Result<f64, Error> {
        self.hy.get(index).copied().ok_or(Error::OutOfRange {
            index,
            extent: self.hy.len(),
        })
    }

    pub(crate) fn clear_fields(&mut self) {
        self.ez.fill(0.0);
        self.hy.fill(0.0);
    }

    /// Magnetic-field half of the leapfrog.
    ///
    /// Reads `ez` from before this step's electric update; must run first
    /// within a step.
    pub(crate) fn update_h(&mut self) {
        let Self {
            ez,
            hy,
            chyh,
            chye,
            ..
        } = self;
        let ez: &[f64] = ez;
        let chyh: &[f64] = chyh;
        let chye: &[f64] = chye;

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            hy.par_iter_mut().enumerate().for_each(|(i, hy)| {
                *hy = chyh[i] * *hy + chye[i] * (ez[i + 1] - ez[i]);
            });
        }

        #[cfg(not(feature = "rayon"))]
        for (i, hy) in hy.iter_mut().enumerate() {
            *hy = chyh[i] * *hy + chye[i] * (ez[i + 1] - ez[i]);
        }
    }

    /// Electric-field half of the leapfrog.
    ///
    /// Uses the `hy` values just written by [`Self::update_h`]. The two edge
    /// cells are untouched; they belong to the absorbing boundary.
    pub(crate) fn update_e(&mut self) {
        let size = self.ez.len();
        let Self {
            ez,
            hy,
            ceze,
            cezh,
            ..
        } = self;
        let hy: &[f64] = hy;
        let ceze: &[f64] = ceze;
        let cezh: &[f64] = cezh;
        let interior = &mut ez[1..size - 1];

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            interior.par_iter_mut().enumerate().for_each(|(offset, ez)| {
                let i = offset + 1;
                *ez = ceze[i] * *ez + cezh[i] * (hy[i] - hy[i - 1]);
            });
        }

        #[cfg(not(feature = "rayon"))]
        for (offset, ez) in interior.iter_mut().enumerate() {
            let i = offset + 1;
            *ez = ceze[i] * *ez + cezh[i] * (hy[i] - hy[i - 1]);
        }
    }

    /// Scans both field arrays for NaN or infinity.
    pub(crate) fn find_non_finite(&self) -> Option<(FieldComponent, usize)> {
        let scan = |values: &[f64]| values.iter().position(|value| !value.is_finite());

        if let Some(index) = scan(&self.ez) {
            Some((FieldComponent::Ez, index))
        }
        else if let Some(index) = scan(&self.hy) {
            Some((FieldComponent::Hy, index))
        }
        else {
            None
        }
    }
}
