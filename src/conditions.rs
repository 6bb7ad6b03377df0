use serde::{Deserialize, Serialize};

use crate::forecaster::FeatureVector;

/// Nominal upper bound of the time of day, in hours.
pub const TIME_OF_DAY_MAX: f32 = 23.;
/// Nominal upper bound of the water temperature, in °C.
pub const WATER_TEMP_MAX: f32 = 35.;
/// Nominal upper bound of the tide height, in meters.
pub const TIDE_HEIGHT_MAX: f32 = 5.;
/// Nominal upper bound of the wind speed, in km/h.
pub const WIND_SPEED_MAX: f32 = 60.;
/// Nominal upper bound of the wave height, in meters.
pub const WAVE_HEIGHT_MAX: f32 = 5.;

/// The environmental conditions a forecast is requested for, in their raw units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    pub time_of_day: f32,
    pub water_temp: f32,
    pub tide_height: f32,
    pub wind_speed: f32,
    pub wave_height: f32,
}

impl Conditions {
    /// Scales every field by its nominal upper bound.
    ///
    /// Values beyond the bounds are not clamped, so the features may fall outside `[0, 1]`.
    pub fn normalize(&self) -> FeatureVector {
        [
            self.time_of_day / TIME_OF_DAY_MAX,
            self.water_temp / WATER_TEMP_MAX,
            self.tide_height / TIDE_HEIGHT_MAX,
            self.wind_speed / WIND_SPEED_MAX,
            self.wave_height / WAVE_HEIGHT_MAX,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(values: [f32; 5]) -> Conditions {
        let [time_of_day, water_temp, tide_height, wind_speed, wave_height] = values;

        Conditions {
            time_of_day,
            water_temp,
            tide_height,
            wind_speed,
            wave_height,
        }
    }

    #[test]
    fn normalizes_the_reference_conditions() {
        let features = conditions([12., 20., 2., 10., 1.]).normalize();
        let expected = [0.522, 0.571, 0.4, 0.167, 0.2];

        for (got, expected) in features.iter().zip(expected) {
            assert!((got - expected).abs() < 1e-3, "{got} != {expected}");
        }
    }

    #[test]
    fn bounds_map_to_the_unit_interval() {
        let upper = [
            TIME_OF_DAY_MAX,
            WATER_TEMP_MAX,
            TIDE_HEIGHT_MAX,
            WIND_SPEED_MAX,
            WAVE_HEIGHT_MAX,
        ];

        assert_eq!(conditions([0.; 5]).normalize(), [0.; 5]);
        assert_eq!(conditions(upper).normalize(), [1.; 5]);

        for step in 1..10 {
            let t = step as f32 / 10.;
            let features = conditions(upper.map(|max| max * t)).normalize();
            assert!(features.iter().all(|f| (0. ..=1.).contains(f)));
        }
    }

    #[test]
    fn out_of_bounds_inputs_are_not_clamped() {
        let features = conditions([23., 70., -5., 60., 5.]).normalize();

        assert_eq!(features[1], 2.);
        assert_eq!(features[2], -1.);
    }

    #[test]
    fn reads_the_camel_case_record() {
        let json = r#"{"timeOfDay":12,"waterTemp":20,"tideHeight":2,"windSpeed":10,"waveHeight":1}"#;
        let parsed: Conditions = serde_json::from_str(json).unwrap();

        assert_eq!(parsed, conditions([12., 20., 2., 10., 1.]));
    }
}
