use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::timefmt::{clock_to_seconds, derive_end_time, derive_pace, format_duration, parse_duration};

/// Where a run took place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Track,
    Road,
    Trail,
    Custom,
}

impl Location {
    pub const ALL: [Location; 4] = [
        Location::Track,
        Location::Road,
        Location::Trail,
        Location::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Track => "track",
            Location::Road => "road",
            Location::Trail => "trail",
            Location::Custom => "custom",
        }
    }

    /// Label shown in the location select
    pub fn label(&self) -> &'static str {
        match self {
            Location::Track => "Track",
            Location::Road => "Road",
            Location::Trail => "Trail",
            Location::Custom => "Custom",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "track" => Ok(Location::Track),
            "road" => Ok(Location::Road),
            "trail" => Ok(Location::Trail),
            "custom" => Ok(Location::Custom),
            other => Err(format!(
                "Invalid location '{}', expected track, road, trail or custom",
                other
            )),
        }
    }
}

/// A logged run as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: String,
    pub time_started: String,
    pub time_ended: String,
    pub total_time: String,
    #[serde(deserialize_with = "string_or_number")]
    pub distance: String,
    pub avg_pace: String,
    #[serde(deserialize_with = "string_or_number")]
    pub elevation_gain: String,
    pub location: Location,
    pub effort_level: i64,
}

impl Run {
    pub fn distance_miles(&self) -> Option<f64> {
        parse_decimal(&self.distance)
    }

    pub fn elevation_feet(&self) -> Option<f64> {
        parse_decimal(&self.elevation_gain)
    }
}

/// A fully derived run, ready for insertion (no id yet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRun {
    pub date: String,
    pub time_started: String,
    pub time_ended: String,
    pub total_time: String,
    pub distance: String,
    pub avg_pace: String,
    pub elevation_gain: String,
    pub location: Location,
    pub effort_level: i64,
}

impl NewRun {
    /// The stored row once the backend has assigned an id
    pub fn into_run(self, id: i64) -> Run {
        Run {
            id: Some(id),
            date: self.date,
            time_started: self.time_started,
            time_ended: self.time_ended,
            total_time: self.total_time,
            distance: self.distance,
            avg_pace: self.avg_pace,
            elevation_gain: self.elevation_gain,
            location: self.location,
            effort_level: self.effort_level,
        }
    }
}

/// The add-run form exactly as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunForm {
    pub date: String,
    pub time_started: String,
    pub total_time: String,
    #[serde(deserialize_with = "string_or_number")]
    pub distance: String,
    #[serde(deserialize_with = "string_or_number")]
    pub elevation_gain: String,
    pub location: String,
    #[serde(deserialize_with = "string_or_number")]
    pub effort_level: String,
}

impl Default for RunForm {
    fn default() -> Self {
        Self {
            date: String::new(),
            time_started: String::new(),
            total_time: String::new(),
            distance: String::new(),
            elevation_gain: String::new(),
            location: Location::Track.as_str().to_string(),
            effort_level: "1".to_string(),
        }
    }
}

impl RunForm {
    /// Validate the form and compute `time_ended` and `avg_pace`
    pub fn to_new_run(&self) -> Result<NewRun, String> {
        let required = [
            ("Date", &self.date),
            ("Start time", &self.time_started),
            ("Total time", &self.total_time),
            ("Distance", &self.distance),
            ("Elevation gain", &self.elevation_gain),
            ("Location", &self.location),
            ("Effort level", &self.effort_level),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(format!("{} is required", name));
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| format!("Invalid date '{}', expected yyyy-mm-dd", self.date))?;

        let time_started = self.time_started.trim().to_string();
        clock_to_seconds(&time_started)?;

        let total_seconds = parse_duration(&self.total_time)?;
        if total_seconds == 0 {
            return Err("Total time must be greater than zero".to_string());
        }

        let distance = parse_decimal(&self.distance)
            .ok_or_else(|| format!("Invalid distance '{}'", self.distance))?;
        let elevation = parse_decimal(&self.elevation_gain)
            .ok_or_else(|| format!("Invalid elevation gain '{}'", self.elevation_gain))?;
        if elevation < 0.0 {
            return Err("Elevation gain cannot be negative".to_string());
        }

        let location: Location = self.location.parse()?;

        let effort_level: i64 = self
            .effort_level
            .trim()
            .parse()
            .map_err(|_| format!("Invalid effort level '{}'", self.effort_level))?;
        if !(1..=10).contains(&effort_level) {
            return Err("Effort level must be between 1 and 10".to_string());
        }

        let time_ended = derive_end_time(&time_started, total_seconds)?;
        if time_ended.rolled_over_days > 0 {
            info!(
                "Run on {} starting {} ends {} day(s) later at {}",
                self.date.trim(),
                time_started,
                time_ended.rolled_over_days,
                time_ended.clock
            );
        }
        let avg_pace = derive_pace(total_seconds, distance)?;

        Ok(NewRun {
            date: date.format("%Y-%m-%d").to_string(),
            time_started,
            time_ended: time_ended.clock,
            total_time: format_duration(total_seconds),
            distance: self.distance.trim().to_string(),
            avg_pace,
            elevation_gain: self.elevation_gain.trim().to_string(),
            location,
            effort_level,
        })
    }
}

/// An authenticated account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Credentials for one signed-in browser, passed into every backend call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }
}

fn parse_decimal(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric columns may arrive as JSON numbers; keep them as strings
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
