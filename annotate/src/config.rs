use std::str::FromStr;

use crate::services::AnalysisLimits;

macro_rules! define_config {
    ($(($field:ident: $type:ty, $name:expr, $kind:expr, $default:expr)),* $(,)?) => {
        /// Runtime tunables of the HUD, settable by name like UCI options.
        #[derive(Debug, Clone)]
        pub struct HudConfig {
            $(pub $field: ConfigParam<$type>,)*
        }

        impl Default for HudConfig {
            fn default() -> Self {
                Self {
                    $($field: ConfigParam {
                        value: $default,
                        name: $name,
                        kind: $kind,
                    },)*
                }
            }
        }

        impl HudConfig {
            /// Option names are matched case-insensitively.
            pub fn update(&mut self, name: &str, value: &str) -> Result<(), String> {
                $(
                    if name.eq_ignore_ascii_case($name) {
                        return self.$field.update(value);
                    }
                )*
                Err(format!("Unknown parameter: {}", name))
            }

            /// One `option name ...` line per parameter, in declaration order.
            pub fn describe(&self) -> Vec<String> {
                vec![$(self.$field.describe(),)*]
            }
        }
    };
}

define_config!(
    // Quiet time after the last target change before a single-move evaluation is sent
    (debounce_ms: u64, "Debounce", ParamKind::Range { min: 0, max: 2000 }, 100),

    // Whole-position analysis
    (analysis_depth: u8, "Analysis Depth", ParamKind::Range { min: 1, max: 40 }, 10),
    (analysis_multipv: u8, "Analysis MultiPV", ParamKind::Range { min: 1, max: 64 }, 20),

    // Single-move evaluation, searched from the position after the move
    (move_eval_depth: u8, "Move Eval Depth", ParamKind::Range { min: 1, max: 40 }, 8),

    // Opponent
    (opponent_depth: u8, "Opponent Depth", ParamKind::Range { min: 1, max: 40 }, 12),
    (auto_opponent: bool, "Auto Opponent", ParamKind::Toggle, true),
);

impl HudConfig {
    pub fn analysis_limits(&self) -> AnalysisLimits {
        AnalysisLimits {
            depth: self.analysis_depth.value,
            multipv: self.analysis_multipv.value,
        }
    }
}

/// How a parameter's text value is checked and listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Integer within `min..=max`, listed as a UCI spin option.
    Range { min: i64, max: i64 },
    /// `true` or `false`, listed as a UCI check option.
    Toggle,
}

impl ParamKind {
    pub fn check(&self, value: &str) -> Result<(), String> {
        let value = value.trim();
        match *self {
            ParamKind::Range { min, max } => {
                let parsed: i64 = value
                    .parse()
                    .map_err(|_| format!("Expected an integer, got '{}'", value))?;
                if (min..=max).contains(&parsed) {
                    Ok(())
                } else {
                    Err(format!("{} is outside {}..={}", parsed, min, max))
                }
            }
            ParamKind::Toggle if value.eq_ignore_ascii_case("true") => Ok(()),
            ParamKind::Toggle if value.eq_ignore_ascii_case("false") => Ok(()),
            ParamKind::Toggle => Err(format!("Expected true or false, got '{}'", value)),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ParamKind::Range { .. } => "spin",
            ParamKind::Toggle => "check",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigParam<T> {
    pub value: T,
    pub name: &'static str,
    pub kind: ParamKind,
}

impl<T> ConfigParam<T>
where
    T: FromStr + ToString + Clone,
    T::Err: std::fmt::Display,
{
    pub fn update(&mut self, value: &str) -> Result<(), String> {
        self.kind.check(value)?;

        self.value = value
            .trim()
            .to_lowercase()
            .parse::<T>()
            .map_err(|e| format!("Parse error: {}", e))?;
        Ok(())
    }

    /// The parameter as an `option name ...` line carrying its current value.
    pub fn describe(&self) -> String {
        let mut line = format!(
            "option name {} type {} value {}",
            self.name,
            self.kind.type_name(),
            self.value.to_string()
        );
        if let ParamKind::Range { min, max } = self.kind {
            line.push_str(&format!(" min {} max {}", min, max));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HudConfig::default();
        assert_eq!(config.debounce_ms.value, 100);
        assert_eq!(config.analysis_depth.value, 10);
        assert_eq!(config.analysis_multipv.value, 20);
        assert_eq!(config.move_eval_depth.value, 8);
        assert_eq!(config.opponent_depth.value, 12);
        assert!(config.auto_opponent.value);
        assert_eq!(
            config.analysis_limits(),
            AnalysisLimits {
                depth: 10,
                multipv: 20
            }
        );
    }

    #[test]
    fn test_update_by_name() {
        let mut config = HudConfig::default();
        assert!(config.update("Debounce", "250").is_ok());
        assert_eq!(config.debounce_ms.value, 250);

        assert!(config.update("analysis multipv", "5").is_ok());
        assert_eq!(config.analysis_multipv.value, 5);

        assert!(config.update("Auto Opponent", "FALSE").is_ok());
        assert!(!config.auto_opponent.value);
    }

    #[test]
    fn test_update_rejects_bad_values() {
        let mut config = HudConfig::default();
        assert!(config.update("Debounce", "5000").is_err());
        assert!(config.update("Analysis Depth", "0").is_err());
        assert!(config.update("Hash", "16").is_err());
        assert_eq!(config.debounce_ms.value, 100);
    }

    #[test]
    fn test_param_kinds() {
        let range = ParamKind::Range { min: 0, max: 2000 };
        assert!(range.check("2000").is_ok());
        assert!(range.check(" 7 ").is_ok());
        assert!(range.check("2001").is_err());
        assert!(range.check("-1").is_err());
        assert!(range.check("fast").is_err());

        assert!(ParamKind::Toggle.check("TRUE").is_ok());
        assert!(ParamKind::Toggle.check("false").is_ok());
        assert!(ParamKind::Toggle.check("yes").is_err());
    }

    #[test]
    fn test_describe() {
        let lines = HudConfig::default().describe();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "option name Debounce type spin value 100 min 0 max 2000");
        assert_eq!(lines[5], "option name Auto Opponent type check value true");
    }
}
