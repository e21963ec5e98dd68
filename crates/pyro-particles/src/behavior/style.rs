//! Style identifiers and the strategy table

use super::burst::{Chrysanthemum, Classic, Pearls, Peony, Pistil, Stars};
use super::crossette::Crossette;
use super::sparkle::{Crackling, Fish, Glitter, Spinner, Strobe};
use super::trailing::{Brocade, Comet, Palm, Tail, Willow};
use super::Behavior;
use pyro_core::PyroError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A firework style. Adding one means adding a variant here and a strategy
/// object; nothing in the pool or effect changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Classic,
    Spinner,
    Willow,
    Crackling,
    Chrysanthemum,
    Brocade,
    Comet,
    Crossette,
    Palm,
    Peony,
    Pearls,
    Fish,
    Pistil,
    Stars,
    Tail,
    Strobe,
    Glitter,
}

impl Style {
    /// Fallback for unknown names
    pub const DEFAULT: Style = Style::Classic;

    pub const ALL: [Style; 17] = [
        Style::Classic,
        Style::Spinner,
        Style::Willow,
        Style::Crackling,
        Style::Chrysanthemum,
        Style::Brocade,
        Style::Comet,
        Style::Crossette,
        Style::Palm,
        Style::Peony,
        Style::Pearls,
        Style::Fish,
        Style::Pistil,
        Style::Stars,
        Style::Tail,
        Style::Strobe,
        Style::Glitter,
    ];

    /// Config/CLI name
    pub fn name(self) -> &'static str {
        match self {
            Style::Classic => "classic",
            Style::Spinner => "spinner",
            Style::Willow => "willow",
            Style::Crackling => "crackling",
            Style::Chrysanthemum => "chrysanthemum",
            Style::Brocade => "brocade",
            Style::Comet => "comet",
            Style::Crossette => "crossette",
            Style::Palm => "palm",
            Style::Peony => "peony",
            Style::Pearls => "pearls",
            Style::Fish => "fish",
            Style::Pistil => "pistil",
            Style::Stars => "stars",
            Style::Tail => "tail",
            Style::Strobe => "strobe",
            Style::Glitter => "glitter",
        }
    }

    /// The strategy object for this style
    pub fn behavior(self) -> &'static dyn Behavior {
        match self {
            Style::Classic => &Classic,
            Style::Spinner => &Spinner,
            Style::Willow => &Willow,
            Style::Crackling => &Crackling,
            Style::Chrysanthemum => &Chrysanthemum,
            Style::Brocade => &Brocade,
            Style::Comet => &Comet,
            Style::Crossette => &Crossette,
            Style::Palm => &Palm,
            Style::Peony => &Peony,
            Style::Pearls => &Pearls,
            Style::Fish => &Fish,
            Style::Pistil => &Pistil,
            Style::Stars => &Stars,
            Style::Tail => &Tail,
            Style::Strobe => &Strobe,
            Style::Glitter => &Glitter,
        }
    }

    /// Look up a style by name, falling back to [`Style::DEFAULT`]
    pub fn resolve(name: &str) -> Style {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!("unknown style '{name}', using '{}'", Style::DEFAULT);
            Style::DEFAULT
        })
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = PyroError;

    /// Case-insensitive; spaces, dashes and underscores are ignored so
    /// "Classic Burst" and "classic" both resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        let key = normalized
            .strip_suffix("burst")
            .filter(|k| !k.is_empty())
            .unwrap_or(normalized.as_str());
        Style::ALL
            .into_iter()
            .find(|style| style.name() == key)
            .ok_or_else(|| PyroError::UnknownStyle(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for style in Style::ALL {
            assert_eq!(style.name().parse::<Style>().unwrap(), style);
        }
    }

    #[test]
    fn parsing_is_forgiving() {
        assert_eq!("Classic Burst".parse::<Style>().unwrap(), Style::Classic);
        assert_eq!("WILLOW".parse::<Style>().unwrap(), Style::Willow);
        assert_eq!("cross-ette".parse::<Style>().unwrap(), Style::Crossette);
    }

    #[test]
    fn unknown_names_error_or_fall_back() {
        let err = "sparkler".parse::<Style>().unwrap_err();
        assert!(matches!(err, PyroError::UnknownStyle(_)));
        assert_eq!(Style::resolve("sparkler"), Style::DEFAULT);
        assert_eq!(Style::resolve("peony"), Style::Peony);
    }

    #[test]
    fn every_style_has_sane_defaults() {
        for style in Style::ALL {
            let d = style.behavior().defaults();
            assert!(d.lifespan_min > 0.0, "{style}");
            assert!(d.lifespan_max >= d.lifespan_min, "{style}");
            assert!(d.force > 0.0, "{style}");
            assert!(d.drag >= 0.0, "{style}");
            assert!(d.spread_angle > 0.0 && d.spread_angle <= 360.0, "{style}");
        }
    }

    #[test]
    fn only_crossette_splits() {
        for style in Style::ALL {
            assert_eq!(
                style.behavior().splitter().is_some(),
                style == Style::Crossette,
                "{style}"
            );
        }
    }
}
