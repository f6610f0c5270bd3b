//! Axis-aligned search box shared by the minimizers.

use nalgebra::SVector;
use rand::Rng;

/// Closed box `[lower, upper]` in `D` dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBox<const D: usize> {
    pub lower: SVector<f64, D>,
    pub upper: SVector<f64, D>,
}

impl<const D: usize> SearchBox<D> {
    pub fn new(lower: SVector<f64, D>, upper: SVector<f64, D>) -> Self {
        Self { lower, upper }
    }

    pub fn width(&self) -> SVector<f64, D> {
        self.upper - self.lower
    }

    pub fn contains(&self, x: &SVector<f64, D>) -> bool {
        (0..D).all(|i| x[i] >= self.lower[i] && x[i] <= self.upper[i])
    }

    /// Component-wise clamp into the box.
    pub fn clip(&self, x: &SVector<f64, D>) -> SVector<f64, D> {
        x.sup(&self.lower).inf(&self.upper)
    }

    /// Mirror coordinates that overshoot the upper face back inside, then clamp.
    pub fn reflect_into(&self, x: &SVector<f64, D>) -> SVector<f64, D> {
        let mirrored = SVector::<f64, D>::from_fn(|i, _| {
            if x[i] > self.upper[i] {
                2.0 * self.upper[i] - x[i]
            } else {
                x[i]
            }
        });
        self.clip(&mirrored)
    }

    /// Map a point of the unit cube onto the box.
    pub fn from_unit(&self, u: &SVector<f64, D>) -> SVector<f64, D> {
        self.lower + u.component_mul(&self.width())
    }

    /// Draw a point uniformly from the box, one coordinate at a time in index order.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SVector<f64, D> {
        let mut out = SVector::<f64, D>::zeros();
        for i in 0..D {
            out[i] = rng.gen_range(self.lower[i]..self.upper[i]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn unit_square() -> SearchBox<2> {
        SearchBox::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0))
    }

    #[test]
    fn clip_clamps_each_axis() {
        let b = unit_square();
        let p = b.clip(&Vector2::new(-0.5, 1.5));
        assert_eq!(p, Vector2::new(0.0, 1.0));
    }

    #[test]
    fn reflect_mirrors_upper_overshoot() {
        let b = unit_square();
        let p = b.reflect_into(&Vector2::new(1.25, 0.5));
        assert!((p[0] - 0.75).abs() < 1e-12);
        assert!((p[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn unit_cube_maps_onto_box() {
        let b = SearchBox::new(Vector2::new(-2.0, 10.0), Vector2::new(2.0, 20.0));
        assert_eq!(b.from_unit(&Vector2::new(0.0, 0.0)), Vector2::new(-2.0, 10.0));
        assert_eq!(b.from_unit(&Vector2::new(1.0, 1.0)), Vector2::new(2.0, 20.0));
        assert_eq!(b.from_unit(&Vector2::new(0.75, 0.5)), Vector2::new(1.0, 15.0));
    }

    #[test]
    fn samples_stay_inside() {
        let b = SearchBox::new(Vector2::new(-2.0, 10.0), Vector2::new(2.0, 20.0));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(b.contains(&b.sample(&mut rng)));
        }
    }
}
