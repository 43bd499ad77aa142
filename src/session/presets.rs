/// A named example function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub label: &'static str,
    pub expression: &'static str,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        label: "Paraboloid",
        expression: "x^2 + y^2",
    },
    Preset {
        label: "Saddle",
        expression: "x^2 - y^2",
    },
    Preset {
        label: "Ripple",
        expression: "sin(sqrt(x^2 + y^2 + 1))",
    },
    Preset {
        label: "Monkey saddle",
        expression: "x^3 - 3*x*y^2",
    },
    Preset {
        label: "Gaussian bump",
        expression: "4*exp(-(x^2 + y^2)/4)",
    },
    Preset {
        label: "Product",
        expression: "x*y",
    },
    Preset {
        label: "Waves",
        expression: "sin(x)*cos(y)",
    },
];

pub fn find(label: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.label.eq_ignore_ascii_case(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::grid::SamplingConfig;
    use crate::plot::sampler::sample;
    use crate::session::state::EvaluationPoint;
    use crate::symbolic::Expression;

    #[test]
    fn test_every_preset_samples_cleanly() {
        for preset in PRESETS {
            let f = Expression::parse(preset.expression).unwrap();
            let result = sample(
                &f,
                &f.derivative("x"),
                &f.derivative("y"),
                EvaluationPoint::default(),
                &SamplingConfig::default(),
            );
            assert!(result.is_ok(), "{}: {:?}", preset.label, result.err());
        }
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("saddle").unwrap().expression, "x^2 - y^2");
        assert!(find("Torus").is_none());
    }
}
