//! All the variables that can be configured for the simulation

use snafu::ensure;

use crate::errors::{InvalidConfigSnafu, ParticleFieldError};

/// All the config for the simulation
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    /// How much viewport area each particle gets. Smaller means a denser field.
    pub area_per_particle: f32,
    /// The most particles the field will ever hold, however big the viewport.
    pub max_particles: usize,
    /// The smallest radius a particle can be given.
    pub min_size: f32,
    /// Particle radii are chosen from below this value.
    pub max_size: f32,
    /// The fastest a particle can drift along either axis, per frame.
    pub max_speed: f32,
    /// How close the pointer has to be to pull on a particle.
    pub attraction_radius: f32,
    /// The strength of the pull at zero distance.
    pub attraction_strength: f32,
    /// How much of the pull is applied to a particle's position each frame.
    pub attraction_step: f32,
    /// How much a pulled particle swells.
    pub attraction_growth: f32,
    /// How far particles shift away from the pointer, relative to their size.
    pub parallax_strength: f32,
    /// Particles closer than this are joined by a line.
    pub link_distance: f32,
    /// The opacity of a line between 2 particles that are touching.
    pub link_opacity: f32,
    /// Particles closer than this to the pointer are joined to it by a line.
    pub pointer_link_distance: f32,
    /// The opacity of a line to the pointer from a particle right underneath it.
    pub pointer_link_opacity: f32,
    /// The alpha of a particle's fill.
    pub fill_alpha: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            area_per_particle: 9000.0,
            max_particles: 120,
            min_size: 1.0,
            max_size: 3.0,
            max_speed: 0.4,
            attraction_radius: 200.0,
            attraction_strength: 0.5,
            attraction_step: 0.1,
            attraction_growth: 2.0,
            parallax_strength: 50.0,
            link_distance: 120.0,
            link_opacity: 0.2,
            pointer_link_distance: 150.0,
            pointer_link_opacity: 0.3,
            fill_alpha: 0.5,
        }
    }
}

impl Config {
    /// Make sure that none of the values would cause a division by zero, an empty random range,
    /// a particle smaller than its base size or an opacity outside of 0 to 1.
    pub fn validate(&self) -> Result<(), ParticleFieldError> {
        let thresholds = [
            ("area_per_particle", self.area_per_particle),
            ("attraction_radius", self.attraction_radius),
            ("link_distance", self.link_distance),
            ("pointer_link_distance", self.pointer_link_distance),
            ("max_size", self.max_size),
        ];
        for (field, value) in thresholds {
            ensure!(
                value > 0.0,
                InvalidConfigSnafu {
                    field,
                    reason: "must be greater than 0",
                    value,
                }
            );
        }

        ensure!(
            self.min_size >= 0.0 && self.min_size < self.max_size,
            InvalidConfigSnafu {
                field: "min_size",
                reason: "must be at least 0 and smaller than `max_size`",
                value: self.min_size,
            }
        );

        // Negative attraction would shrink particles below their base size.
        let non_negatives = [
            ("max_speed", self.max_speed),
            ("attraction_strength", self.attraction_strength),
            ("attraction_step", self.attraction_step),
            ("attraction_growth", self.attraction_growth),
        ];
        for (field, value) in non_negatives {
            ensure!(
                value >= 0.0,
                InvalidConfigSnafu {
                    field,
                    reason: "must not be negative",
                    value,
                }
            );
        }

        let opacities = [
            ("link_opacity", self.link_opacity),
            ("pointer_link_opacity", self.pointer_link_opacity),
            ("fill_alpha", self.fill_alpha),
        ];
        for (field, value) in opacities {
            ensure!(
                (0.0..=1.0).contains(&value),
                InvalidConfigSnafu {
                    field,
                    reason: "must be between 0 and 1",
                    value,
                }
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let config = Config {
            link_distance: 0.0,
            ..Config::default()
        };
        let error = config.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid particle config, `link_distance` must be greater than 0 (got 0)"
        );
    }

    #[test]
    fn negative_attraction_is_rejected() {
        for config in [
            Config {
                attraction_growth: -3.0,
                ..Config::default()
            },
            Config {
                attraction_strength: -0.5,
                ..Config::default()
            },
            Config {
                attraction_step: -0.1,
                ..Config::default()
            },
        ] {
            assert!(config.validate().is_err(), "{config:?} should be invalid");
        }

        let config = Config {
            attraction_growth: -3.0,
            ..Config::default()
        };
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Invalid particle config, `attraction_growth` must not be negative (got -3)"
        );
    }

    #[test]
    fn opacities_must_be_fractions() {
        for config in [
            Config {
                link_opacity: 1.5,
                ..Config::default()
            },
            Config {
                pointer_link_opacity: -0.1,
                ..Config::default()
            },
            Config {
                fill_alpha: 2.0,
                ..Config::default()
            },
        ] {
            assert!(config.validate().is_err(), "{config:?} should be invalid");
        }

        let edges = Config {
            link_opacity: 0.0,
            fill_alpha: 1.0,
            ..Config::default()
        };
        edges.validate().unwrap();
    }

    #[test]
    fn inverted_size_range_is_rejected() {
        let config = Config {
            min_size: 4.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
