//! The configuration keys the fireworks effect reads
//!
//! The effect itself ignores anything it does not recognise. Tooling uses
//! this table to point out typos and values of the wrong type.

use crate::behavior::Style;
use pyro_core::{ConfigSnapshot, PyroError};

/// Expected value type of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Int,
    Number,
    Bool,
    Text,
    Vec2,
}

const GLOBAL_KEYS: &[(&str, KeyKind)] = &[
    ("pool.capacity", KeyKind::Int),
    ("style", KeyKind::Text),
    ("size.min", KeyKind::Number),
    ("size.max", KeyKind::Number),
    ("burst.count", KeyKind::Int),
    ("secondary.enabled", KeyKind::Bool),
    ("secondary.delay", KeyKind::Number),
    ("secondary.count", KeyKind::Int),
    ("secondary.force", KeyKind::Number),
    ("launch.auto", KeyKind::Bool),
    ("launch.interval", KeyKind::Number),
    ("launch.speed", KeyKind::Number),
    ("viewport", KeyKind::Vec2),
    ("wave.enabled", KeyKind::Bool),
    ("wave.randomize", KeyKind::Bool),
    ("wave.duration", KeyKind::Number),
    ("wave.duration_min", KeyKind::Number),
    ("wave.duration_max", KeyKind::Number),
    ("wave.styles", KeyKind::Text),
];

/// Fields every style accepts as `<style>.<field>`
pub const STYLE_FIELDS: [&str; 6] = [
    "gravity",
    "drag",
    "lifespan_min",
    "lifespan_max",
    "spread_angle",
    "force",
];

pub fn kind_of(key: &str) -> Option<KeyKind> {
    if let Some((_, kind)) = GLOBAL_KEYS.iter().find(|(name, _)| *name == key) {
        return Some(*kind);
    }
    let (style, field) = key.split_once('.')?;
    let is_style = Style::ALL.iter().any(|s| s.name() == style);
    (is_style && STYLE_FIELDS.contains(&field)).then_some(KeyKind::Number)
}

pub fn is_known(key: &str) -> bool {
    kind_of(key).is_some()
}

/// Keys in `config` the effect will ignore
pub fn unknown_keys(config: &ConfigSnapshot) -> Vec<&str> {
    config.keys().filter(|key| !is_known(key)).collect()
}

/// Recognised keys whose values will be ignored or replaced: wrong types
/// and style names that do not resolve.
pub fn validate(config: &ConfigSnapshot) -> Vec<PyroError> {
    let mut problems = Vec::new();
    for key in config.keys() {
        let Some(kind) = kind_of(key) else {
            continue;
        };
        let checked = match kind {
            KeyKind::Int => config.try_i64(key).map(|_| ()),
            KeyKind::Number => config.try_f32(key).map(|_| ()),
            KeyKind::Bool => config.try_bool(key).map(|_| ()),
            KeyKind::Vec2 => config.try_vec2(key).map(|_| ()),
            KeyKind::Text => config.try_str(key).and_then(|text| check_style_names(key, text)),
        };
        if let Err(err) = checked {
            problems.push(err);
        }
    }
    problems
}

fn check_style_names(key: &str, text: Option<&str>) -> pyro_core::Result<()> {
    let Some(text) = text else {
        return Ok(());
    };
    let names: Vec<&str> = if key == "wave.styles" {
        text.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
    } else {
        vec![text]
    };
    for name in names {
        name.parse::<Style>()?;
    }
    Ok(())
}
