use crate::error::{FieldError, Result};

/// Box-filter extents, one per spatial axis.
///
/// Every extent is positive. Windows are centred with "SAME" semantics:
/// an extent `w` reaches `(w - 1) / 2` positions before the centre and
/// `w / 2` after it, so odd extents are symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec<const N: usize> {
    extents: [usize; N],
}

impl<const N: usize> WindowSpec<N> {
    /// Create a window from per-axis extents.
    pub fn new(extents: [usize; N]) -> Result<Self> {
        if N == 0 {
            return Err(FieldError::invalid_window("window needs at least one axis"));
        }
        if let Some(axis) = extents.iter().position(|&w| w == 0) {
            return Err(FieldError::invalid_window(format!(
                "extent along axis {} must be positive, got {:?}",
                axis, extents
            )));
        }
        Ok(Self { extents })
    }

    /// Cubic window with the same extent along every axis.
    pub fn cube(extent: usize) -> Result<Self> {
        Self::new([extent; N])
    }

    /// Create a window from a runtime slice, checking its rank.
    pub fn from_slice(extents: &[usize]) -> Result<Self> {
        let extents: [usize; N] = extents.try_into().map_err(|_| {
            FieldError::dimension_mismatch(format!(
                "window has {} extents but the field has {} spatial axes",
                extents.len(),
                N
            ))
        })?;
        Self::new(extents)
    }

    pub fn extents(&self) -> [usize; N] {
        self.extents
    }

    /// Number of positions covered by the window.
    pub fn volume(&self) -> usize {
        self.extents.iter().product()
    }

    /// Zero padding `(before, after)` that keeps the output size unchanged.
    pub fn same_padding(&self, axis: usize) -> (usize, usize) {
        let extent = self.extents[axis];
        let before = (extent - 1) / 2;
        (before, extent - 1 - before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume() {
        let window = WindowSpec::new([9, 9, 9]).unwrap();
        assert_eq!(window.volume(), 729);
    }

    #[test]
    fn test_zero_extent_rejected() {
        assert!(matches!(
            WindowSpec::new([3, 0]),
            Err(FieldError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_rank_mismatch_rejected() {
        let result = WindowSpec::<3>::from_slice(&[9, 9]);
        assert!(matches!(result, Err(FieldError::DimensionMismatch(_))));
        assert!(WindowSpec::<2>::from_slice(&[9, 9]).is_ok());
    }

    #[test]
    fn test_same_padding() {
        let window = WindowSpec::new([9, 4, 1]).unwrap();
        assert_eq!(window.same_padding(0), (4, 4));
        assert_eq!(window.same_padding(1), (1, 2));
        assert_eq!(window.same_padding(2), (0, 0));
    }
}
