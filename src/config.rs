use std::str::FromStr;

use rand::Rng;

use crate::error::{ParamError, RenderError, RenderResult};

pub const RADIUS_MIN: f64 = 0.0005;
pub const RADIUS_MAX: f64 = 1.0;

/// Upper bound on the supersampled pixel count of one render.
pub const MAX_PIXELS: usize = 1 << 26;

/// Everything one render needs. Built once per invocation or request and
/// never shared mutably.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub center_real: f64,
    pub center_imag: f64,
    pub radius: f64,
    pub x_resolution: u32,
    pub y_resolution: u32,
    pub antialias_factor: u32,
    pub max_iterations: u32,
    pub invert_colors: bool,
    pub palette_name: String,
    pub focus_commands: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            center_real: -0.75,
            center_imag: 0.0,
            radius: 3.0,
            x_resolution: 500,
            y_resolution: 500,
            antialias_factor: 1,
            max_iterations: 512,
            invert_colors: false,
            palette_name: "plan9".to_string(),
            focus_commands: String::new(),
        }
    }
}

/// A config derived from query parameters, plus whether the caller asked
/// for a random viewport.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedQuery {
    pub config: RenderConfig,
    pub randomize: bool,
}

impl RenderConfig {
    pub fn validate(&self) -> RenderResult<()> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(RenderError::invalid(format!(
                "radius must be positive and finite, got {}",
                self.radius
            )));
        }
        if !(self.center_real.is_finite() && self.center_imag.is_finite()) {
            return Err(RenderError::invalid("center must be finite"));
        }
        if self.x_resolution == 0 || self.y_resolution == 0 {
            return Err(RenderError::invalid(format!(
                "resolution must be positive, got {}x{}",
                self.x_resolution, self.y_resolution
            )));
        }
        if self.antialias_factor == 0 {
            return Err(RenderError::invalid("antialias factor must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(RenderError::invalid("max iterations must be at least 1"));
        }
        let (w, h) = self.supersampled_size()?;
        match (w as usize).checked_mul(h as usize) {
            Some(pixels) if pixels <= MAX_PIXELS => Ok(()),
            _ => Err(RenderError::invalid(format!(
                "supersampled grid {}x{} exceeds {} pixels",
                w, h, MAX_PIXELS
            ))),
        }
    }

    /// Pixel grid actually iterated: output resolution times the
    /// antialias factor on each axis.
    pub fn supersampled_size(&self) -> RenderResult<(u32, u32)> {
        let w = self.x_resolution.checked_mul(self.antialias_factor);
        let h = self.y_resolution.checked_mul(self.antialias_factor);
        match (w, h) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(RenderError::invalid("supersampled resolution overflows")),
        }
    }

    pub fn randomize_viewport<R: Rng>(&mut self, rng: &mut R) {
        self.radius = RADIUS_MIN + rng.gen::<f64>() * (RADIUS_MAX - RADIUS_MIN);
        self.center_real = rng.gen::<f64>();
        self.center_imag = rng.gen::<f64>();
    }

    /// Returns a copy of `self` with any recognized query parameters
    /// applied. Unknown keys are skipped; unparseable values are errors.
    ///
    /// The viewport is randomized unless `random` is false or one of `x`,
    /// `y` or `r` is given. Asking for both is an error.
    pub fn apply_params<I, K, V>(&self, params: I) -> Result<ParsedQuery, ParamError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = self.clone();
        let mut random: Option<(bool, String)> = None;
        let mut viewport_given = false;
        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "IT" => config.max_iterations = parse(key, value)?,
                "xres" => config.x_resolution = parse(key, value)?,
                "yres" => config.y_resolution = parse(key, value)?,
                "aa" => config.antialias_factor = parse(key, value)?,
                "x" => {
                    config.center_real = parse(key, value)?;
                    viewport_given = true;
                }
                "y" => {
                    config.center_imag = parse(key, value)?;
                    viewport_given = true;
                }
                "r" => {
                    config.radius = parse(key, value)?;
                    viewport_given = true;
                }
                "palette" => config.palette_name = value.to_string(),
                "focus" => config.focus_commands = value.to_string(),
                "invert" => config.invert_colors = parse_bool(key, value)?,
                "random" => random = Some((parse_bool(key, value)?, value.to_string())),
                _ => (),
            }
        }
        let randomize = match random {
            Some((true, value)) if viewport_given => {
                return Err(ParamError::new("random", &value));
            }
            Some((randomize, _)) => randomize,
            None => !viewport_given,
        };
        Ok(ParsedQuery { config, randomize })
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ParamError> {
    value.parse().map_err(|_| ParamError::new(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ParamError> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ParamError::new(key, value)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            RenderConfig {
                radius: 0.0,
                ..Default::default()
            },
            RenderConfig {
                radius: -1.0,
                ..Default::default()
            },
            RenderConfig {
                radius: f64::NAN,
                ..Default::default()
            },
            RenderConfig {
                center_imag: f64::INFINITY,
                ..Default::default()
            },
            RenderConfig {
                x_resolution: 0,
                ..Default::default()
            },
            RenderConfig {
                y_resolution: 0,
                ..Default::default()
            },
            RenderConfig {
                antialias_factor: 0,
                ..Default::default()
            },
            RenderConfig {
                max_iterations: 0,
                ..Default::default()
            },
            RenderConfig {
                x_resolution: u32::MAX,
                antialias_factor: 2,
                ..Default::default()
            },
            RenderConfig {
                x_resolution: 200_000,
                y_resolution: 200_000,
                ..Default::default()
            },
            RenderConfig {
                x_resolution: 4096,
                y_resolution: 4096,
                antialias_factor: 3,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(RenderError::InvalidConfig(_))),
                "{:?} should be invalid",
                config
            );
        }
    }

    #[test]
    fn test_pixel_limit_is_inclusive() {
        let config = RenderConfig {
            x_resolution: 8192,
            y_resolution: 8192,
            ..Default::default()
        };
        assert_eq!(8192 * 8192, MAX_PIXELS);
        assert!(config.validate().is_ok());
        let config = RenderConfig {
            y_resolution: 8193,
            ..config
        };
        assert!(matches!(
            config.validate(),
            Err(RenderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_supersampled_size() {
        let config = RenderConfig {
            x_resolution: 40,
            y_resolution: 30,
            antialias_factor: 3,
            ..Default::default()
        };
        assert_eq!(config.supersampled_size(), Ok((120, 90)));
    }

    #[test]
    fn test_randomize_viewport_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut config = RenderConfig::default();
        for _ in 0..1000 {
            config.randomize_viewport(&mut rng);
            assert!(config.radius >= RADIUS_MIN && config.radius < RADIUS_MAX);
            assert!((0.0..1.0).contains(&config.center_real));
            assert!((0.0..1.0).contains(&config.center_imag));
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_apply_params_overrides() {
        let base = RenderConfig::default();
        let parsed = base
            .apply_params([
                ("IT", "100"),
                ("xres", "64"),
                ("yres", "48"),
                ("aa", "2"),
                ("palette", "gray"),
                ("focus", "14z"),
                ("invert", "true"),
                ("random", "0"),
                ("r", "0.5"),
                ("unknown", "whatever"),
            ])
            .unwrap();
        assert!(!parsed.randomize);
        let c = parsed.config;
        assert_eq!(c.max_iterations, 100);
        assert_eq!((c.x_resolution, c.y_resolution), (64, 48));
        assert_eq!(c.antialias_factor, 2);
        assert_eq!(c.palette_name, "gray");
        assert_eq!(c.focus_commands, "14z");
        assert!(c.invert_colors);
        assert_eq!(c.radius, 0.5);
        assert_eq!(c.center_real, base.center_real);
        // the base is left untouched
        assert_eq!(base, RenderConfig::default());
    }

    #[test]
    fn test_apply_params_randomizes_by_default() {
        let parsed = RenderConfig::default()
            .apply_params(Vec::<(&str, &str)>::new())
            .unwrap();
        assert!(parsed.randomize);
        assert_eq!(parsed.config, RenderConfig::default());
    }

    #[test]
    fn test_apply_params_center_disables_randomizing() {
        let parsed = RenderConfig::default()
            .apply_params([("x", "-1.25"), ("y", "0.125")])
            .unwrap();
        assert!(!parsed.randomize);
        assert_eq!(parsed.config.center_real, -1.25);
        assert_eq!(parsed.config.center_imag, 0.125);
        assert_eq!(parsed.config.radius, 3.0);

        let parsed = RenderConfig::default()
            .apply_params([("r", "0.1")])
            .unwrap();
        assert!(!parsed.randomize);
        assert_eq!(parsed.config.radius, 0.1);
    }

    #[test]
    fn test_apply_params_random_conflicts_with_center() {
        let err = RenderConfig::default()
            .apply_params([("random", "1"), ("r", "0.1")])
            .unwrap_err();
        assert_eq!(err, ParamError::new("random", "1"));
        let parsed = RenderConfig::default()
            .apply_params([("x", "0.3"), ("random", "false")])
            .unwrap();
        assert!(!parsed.randomize);
    }

    #[test]
    fn test_apply_params_rejects_garbage() {
        let err = RenderConfig::default()
            .apply_params([("xres", "wide")])
            .unwrap_err();
        assert_eq!(err, ParamError::new("xres", "wide"));
        assert!(RenderConfig::default()
            .apply_params([("invert", "maybe")])
            .is_err());
        assert!(RenderConfig::default()
            .apply_params([("aa", "-1")])
            .is_err());
    }
}
