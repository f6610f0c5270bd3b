//! Parameter validation and search-box helpers.

use crate::domain::{Bounds, CurveParams, ParamRange};
use crate::error::AppError;
use crate::math::SearchBox;

/// Open validation interval for `theta_deg`.
pub const THETA_LIMITS: ParamRange = ParamRange::new(0.0, 50.0);
/// Open validation interval for `M`.
pub const M_LIMITS: ParamRange = ParamRange::new(-0.05, 0.05);
/// Open validation interval for `X`.
pub const X_LIMITS: ParamRange = ParamRange::new(0.0, 100.0);

fn strictly_inside(range: ParamRange, value: f64) -> bool {
    value > range.min && value < range.max
}

/// `true` when every parameter lies strictly inside its validation limits.
pub fn validate(theta_deg: f64, m: f64, x: f64) -> bool {
    strictly_inside(THETA_LIMITS, theta_deg) && strictly_inside(M_LIMITS, m) && strictly_inside(X_LIMITS, x)
}

pub fn validate_params(params: &CurveParams) -> bool {
    validate(params.theta_deg, params.m, params.x)
}

impl Bounds {
    /// Reject non-finite or empty ranges.
    pub fn check(&self) -> Result<(), AppError> {
        for (name, range) in self.ranges() {
            if !(range.min.is_finite() && range.max.is_finite()) {
                return Err(AppError::new(
                    2,
                    format!("Bounds for {name} must be finite (got {}..{}).", range.min, range.max),
                ));
            }
            if range.min >= range.max {
                return Err(AppError::new(
                    2,
                    format!("Bounds for {name} are empty: min {} >= max {}.", range.min, range.max),
                ));
            }
        }
        Ok(())
    }

    pub fn contains(&self, params: &CurveParams) -> bool {
        self.theta_deg.contains(params.theta_deg) && self.m.contains(params.m) && self.x.contains(params.x)
    }

    /// Clamp each parameter into its range.
    pub fn clip(&self, params: &CurveParams) -> CurveParams {
        CurveParams::from_vector(&self.search_box().clip(&params.to_vector()))
    }

    pub fn search_box(&self) -> SearchBox<3> {
        SearchBox::new(self.lower(), self.upper())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_uses_open_intervals() {
        assert!(validate(25.0, 0.0, 50.0));
        assert!(validate(49.999, -0.0499, 99.9));
        assert!(!validate(0.0, 0.0, 50.0));
        assert!(!validate(50.0, 0.0, 50.0));
        assert!(!validate(25.0, 0.05, 50.0));
        assert!(!validate(25.0, -0.05, 50.0));
        assert!(!validate(25.0, 0.0, 0.0));
        assert!(!validate(25.0, 0.0, 100.0));
        assert!(!validate(f64::NAN, 0.0, 50.0));
    }

    #[test]
    fn default_bounds_sit_inside_validation_limits() {
        let bounds = Bounds::default();
        assert!(bounds.check().is_ok());
        assert!(validate(bounds.theta_deg.min, bounds.m.min, bounds.x.min));
        assert!(validate(bounds.theta_deg.max, bounds.m.max, bounds.x.max));
    }

    #[test]
    fn check_rejects_inverted_and_non_finite_ranges() {
        let mut bounds = Bounds::default();
        bounds.m = ParamRange::new(0.01, -0.01);
        let err = bounds.check().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains('M'));

        let mut bounds = Bounds::default();
        bounds.x = ParamRange::new(0.0, f64::INFINITY);
        assert_eq!(bounds.check().unwrap_err().exit_code(), 2);
    }

    #[test]
    fn clip_moves_outliers_onto_faces() {
        let bounds = Bounds::default();
        let clipped = bounds.clip(&CurveParams::new(80.0, -1.0, 50.0));
        assert_eq!(clipped, CurveParams::new(49.9, -0.049, 50.0));
        assert!(bounds.contains(&clipped));
        let inside = CurveParams::new(10.0, 0.0, 20.0);
        assert_eq!(bounds.clip(&inside), inside);
    }
}
