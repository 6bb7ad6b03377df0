use serde::Serialize;

use crate::forecaster::TargetVector;

/// Scale between a catch in kg and the model's catch output.
pub const CATCH_SCALE: f32 = 150.;
/// Scale between a sustainability score and the model's sustainability output.
pub const SUSTAINABILITY_SCALE: f32 = 100.;

/// Maps a raw model output back to human units, `(catch in kg, sustainability score)`.
pub fn denormalize(target: &TargetVector) -> (f32, f32) {
    let [catch, sustainability] = *target;
    (catch * CATCH_SCALE, sustainability * SUSTAINABILITY_SCALE)
}

/// A forecast as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub catch_kg: u32,
    pub sustainability: u8,
}

impl Prediction {
    /// Rounds a raw model output to a displayable prediction.
    ///
    /// The catch is floored at zero and the sustainability clamped to `[0, 100]`, a non-finite
    /// output maps to zero.
    pub fn from_scaled(target: &TargetVector) -> Self {
        let (catch, sustainability) = denormalize(target);

        Self {
            catch_kg: catch.round().max(0.) as u32,
            sustainability: sustainability.round().clamp(0., 100.) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denormalizes_the_unit_bounds() {
        assert_eq!(denormalize(&[1., 1.]), (150., 100.));
        assert_eq!(denormalize(&[0., 0.]), (0., 0.));

        assert_eq!(
            Prediction::from_scaled(&[1., 1.]),
            Prediction {
                catch_kg: 150,
                sustainability: 100
            }
        );
    }

    #[test]
    fn out_of_range_outputs_are_clamped() {
        let low = Prediction::from_scaled(&[-0.3, -0.2]);
        assert_eq!(low.catch_kg, 0);
        assert_eq!(low.sustainability, 0);

        let high = Prediction::from_scaled(&[2., 1.37]);
        assert_eq!(high.catch_kg, 300);
        assert_eq!(high.sustainability, 100);

        let nan = Prediction::from_scaled(&[f32::NAN, f32::NAN]);
        assert_eq!(nan.catch_kg, 0);
        assert_eq!(nan.sustainability, 0);
    }

    #[test]
    fn rounds_to_the_nearest_unit() {
        let prediction = Prediction::from_scaled(&[0.5, 0.504]);

        assert_eq!(prediction.catch_kg, 75);
        assert_eq!(prediction.sustainability, 50);
    }
}
