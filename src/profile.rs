//! Character profile: the raw input boundary and its normalized, render-ready form.

use std::sync::Arc;

use serde_json::Value;

use crate::{assets::portrait::Portrait, config::LevelMode};

pub const MIN_VALUE: f64 = 1.0;
pub const MAX_VALUE: f64 = 10.0;
/// Substituted for anything that does not parse as a number.
pub const DEFAULT_VALUE: f64 = 1.0;
pub const STAT_COUNT: usize = 7;
/// Whole steps on the `[1, 10]` scale: gauge wedges and sunburst rings.
pub const SCALE_STEPS: usize = 10;

pub const NAME_PLACEHOLDER: &str = "Unnamed Character";
pub const SPECIES_PLACEHOLDER: &str = "Unknown Species";
pub const ABILITY_PLACEHOLDER: &str = "Unknown Ability";
pub const LEVEL_PLACEHOLDER: &str = "Unknown Level";
pub const DANGER_PLACEHOLDER: &str = "Unknown Danger Level";

/// Map any real (NaN included) into `[1, 10]`.
pub fn normalize(x: f64) -> f64 {
    let x = if x.is_nan() { DEFAULT_VALUE } else { x };
    x.clamp(MIN_VALUE, MAX_VALUE)
}

/// Normalize a raw form value: numbers as-is, strings parsed like a lenient float field,
/// anything else falls back to the default.
pub fn normalize_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    };
    normalize(parsed.unwrap_or(DEFAULT_VALUE))
}

/// Longest numeric prefix of `s` after leading whitespace (`"7.5 pts"` is 7.5, `"abc"` is none).
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse::<f64>().ok();
    }

    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let int_end = digits_from(end);
    let mut mantissa_end = int_end;
    if int_end < bytes.len() && bytes[int_end] == b'.' {
        mantissa_end = digits_from(int_end + 1);
    }
    let has_digits = int_end > end || mantissa_end > int_end + 1;
    if !has_digits {
        return None;
    }
    end = mantissa_end;

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// The seven fixed attributes, in sector order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stat {
    Energy,
    Speed,
    Support,
    Power,
    Intelligence,
    Concentration,
    Perception,
}

impl Stat {
    pub const ALL: [Stat; STAT_COUNT] = [
        Stat::Energy,
        Stat::Speed,
        Stat::Support,
        Stat::Power,
        Stat::Intelligence,
        Stat::Concentration,
        Stat::Perception,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Stat::Energy => "Energy",
            Stat::Speed => "Speed",
            Stat::Support => "Support",
            Stat::Power => "Power",
            Stat::Intelligence => "Intelligence",
            Stat::Concentration => "Concentration",
            Stat::Perception => "Perception",
        }
    }
}

/// Seven attribute values, each in `[1, 10]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats([f64; STAT_COUNT]);

impl Stats {
    pub fn new(values: [f64; STAT_COUNT]) -> Self {
        Self(values.map(normalize))
    }

    pub fn get(&self, stat: Stat) -> f64 {
        self.0[stat.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        Stat::ALL.into_iter().zip(self.0.iter().copied())
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self([DEFAULT_VALUE; STAT_COUNT])
    }
}

/// Attribute fields as they arrive from a form: any JSON value per field.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RawStats {
    pub energy: Value,
    pub speed: Value,
    pub support: Value,
    pub power: Value,
    pub intelligence: Value,
    pub concentration: Value,
    pub perception: Value,
}

impl RawStats {
    pub fn from_numbers(values: [f64; STAT_COUNT]) -> Self {
        let [energy, speed, support, power, intelligence, concentration, perception] =
            values.map(Value::from);
        Self {
            energy,
            speed,
            support,
            power,
            intelligence,
            concentration,
            perception,
        }
    }

    pub fn normalize(&self) -> Stats {
        Stats([
            normalize_value(&self.energy),
            normalize_value(&self.speed),
            normalize_value(&self.support),
            normalize_value(&self.power),
            normalize_value(&self.intelligence),
            normalize_value(&self.concentration),
            normalize_value(&self.perception),
        ])
    }
}

/// Unvalidated profile record from the surrounding UI.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RawProfile {
    pub name: String,
    pub species: String,
    pub ability: String,
    pub level: String,
    pub danger_rating: String,
    pub overall: Value,
    pub stats: RawStats,
}

/// Normalized profile, rebuilt on every render request.
#[derive(Clone, Debug)]
pub struct CharacterProfile {
    pub name: String,
    pub species: String,
    pub ability: String,
    pub danger_rating: String,
    /// Level text as supplied; only shown under [`LevelMode::Provided`].
    pub level_text: String,
    pub level_mode: LevelMode,
    pub overall: f64,
    pub stats: Stats,
    pub portrait: Option<Arc<Portrait>>,
}

impl CharacterProfile {
    pub fn new(name: impl Into<String>, overall: f64, stats: Stats) -> Self {
        Self {
            name: name.into(),
            species: String::new(),
            ability: String::new(),
            danger_rating: String::new(),
            level_text: String::new(),
            level_mode: LevelMode::default(),
            overall: normalize(overall),
            stats,
            portrait: None,
        }
    }

    pub fn from_raw(raw: &RawProfile, level_mode: LevelMode) -> Self {
        Self {
            name: raw.name.clone(),
            species: raw.species.clone(),
            ability: raw.ability.clone(),
            danger_rating: raw.danger_rating.clone(),
            level_text: raw.level.clone(),
            level_mode,
            overall: normalize_value(&raw.overall),
            stats: raw.stats.normalize(),
            portrait: None,
        }
    }

    pub fn with_portrait(mut self, portrait: Option<Arc<Portrait>>) -> Self {
        self.portrait = portrait;
        self
    }

    /// `sum(stats) + overall * 3`.
    pub fn derived_level(&self) -> f64 {
        self.stats.sum() + self.overall * 3.0
    }

    /// Display strings with placeholders substituted for empty fields.
    pub fn display(&self) -> DisplayText {
        fn or(s: &str, placeholder: &str) -> String {
            if s.trim().is_empty() {
                placeholder.to_string()
            } else {
                s.to_string()
            }
        }

        let level = match self.level_mode {
            LevelMode::Derived => format_level(self.derived_level()),
            LevelMode::Provided => or(&self.level_text, LEVEL_PLACEHOLDER),
        };

        DisplayText {
            name: or(&self.name, NAME_PLACEHOLDER),
            species: or(&self.species, SPECIES_PLACEHOLDER),
            ability: or(&self.ability, ABILITY_PLACEHOLDER),
            level,
            danger: or(&self.danger_rating, DANGER_PLACEHOLDER),
            overall: format_score(self.overall),
        }
    }
}

/// Score label, one decimal place. Ties round up, the same way the gauge quantizes its partial wedge.
pub fn format_score(score: f64) -> String {
    let tenths = (score * 10.0).round() / 10.0;
    format!("{tenths:.1}")
}

fn format_level(level: f64) -> String {
    if level.fract() == 0.0 {
        format!("{level:.0}")
    } else {
        format!("{level:.1}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayText {
    pub name: String,
    pub species: String,
    pub ability: String,
    pub level: String,
    pub danger: String,
    pub overall: String,
}

impl DisplayText {
    /// Metadata lines of the export text block, in order.
    pub fn info_lines(&self) -> [String; 5] {
        [
            format!("Species: {}", self.species),
            format!("Ability: {}", self.ability),
            format!("Level: {}", self.level),
            format!("Danger Level: {}", self.danger),
            format!("Overall Rating: {}", self.overall),
        ]
    }

    /// Single-line summary shown under the name in the enlarged view.
    pub fn summary_line(&self) -> String {
        format!(
            "Species: {} | Ability: {} | Level: {} | Danger: {}",
            self.species, self.ability, self.level, self.danger
        )
    }
}
