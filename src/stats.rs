//! Aggregate statistics over a user's runs.

use log::warn;
use serde::Serialize;

use crate::models::Run;
use crate::timefmt::{format_duration, format_pace, parse_duration, parse_pace};

/// Totals and averages over the full fetched run set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub run_count: usize,
    pub total_distance: f64,
    pub total_elevation_gain: f64,
    pub total_time_seconds: u64,
    /// None for an empty run set
    pub average_pace_seconds: Option<f64>,
    pub average_run_time_seconds: Option<f64>,
    pub average_distance: Option<f64>,
}

impl RunStats {
    pub fn from_runs(runs: &[Run]) -> Self {
        let mut total_distance = 0.0;
        let mut total_elevation_gain = 0.0;
        let mut total_time_seconds = 0u64;
        let mut pace_sum = 0.0;
        let mut pace_count = 0usize;

        for run in runs {
            match run.distance_miles() {
                Some(d) => total_distance += d,
                None => warn!("Skipping unreadable distance '{}' for run {:?}", run.distance, run.id),
            }
            match run.elevation_feet() {
                Some(e) => total_elevation_gain += e,
                None => warn!(
                    "Skipping unreadable elevation '{}' for run {:?}",
                    run.elevation_gain, run.id
                ),
            }
            match parse_duration(&run.total_time) {
                Ok(secs) => match total_time_seconds.checked_add(secs) {
                    Some(total) => total_time_seconds = total,
                    None => warn!(
                        "Skipping total time '{}' for run {:?}: total out of range",
                        run.total_time, run.id
                    ),
                },
                Err(e) => warn!("Skipping total time for run {:?}: {}", run.id, e),
            }
            match parse_pace(&run.avg_pace) {
                Ok(secs) => {
                    pace_sum += secs as f64;
                    pace_count += 1;
                }
                Err(e) => warn!("Skipping pace for run {:?}: {}", run.id, e),
            }
        }

        let run_count = runs.len();
        let per_run = |total: f64| (run_count > 0).then(|| total / run_count as f64);

        Self {
            run_count,
            total_distance,
            total_elevation_gain,
            total_time_seconds,
            average_pace_seconds: (pace_count > 0).then(|| pace_sum / pace_count as f64),
            average_run_time_seconds: per_run(total_time_seconds as f64),
            average_distance: per_run(total_distance),
        }
    }

    pub fn total_distance_display(&self) -> String {
        format!("{:.2}", self.total_distance)
    }

    pub fn total_elevation_display(&self) -> String {
        format!("{:.2}", self.total_elevation_gain)
    }

    pub fn total_time_display(&self) -> String {
        format_duration(self.total_time_seconds)
    }

    pub fn average_pace_display(&self) -> String {
        format_pace(self.average_pace_seconds.unwrap_or(0.0))
    }

    pub fn average_run_time_display(&self) -> String {
        match self.average_run_time_seconds {
            Some(secs) if secs.is_finite() && secs > 0.0 => format_duration(secs.round() as u64),
            _ => "00:00:00".to_string(),
        }
    }

    pub fn average_distance_display(&self) -> String {
        format!("{:.2}", self.average_distance.unwrap_or(0.0))
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            run_count: self.run_count,
            total_distance: self.total_distance_display(),
            total_elevation_gain: self.total_elevation_display(),
            total_time: self.total_time_display(),
            average_pace: self.average_pace_display(),
            average_run_time: self.average_run_time_display(),
            average_distance: self.average_distance_display(),
        }
    }
}

/// Display-ready statistics, as rendered on the runs page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub run_count: usize,
    pub total_distance: String,
    pub total_elevation_gain: String,
    pub total_time: String,
    pub average_pace: String,
    pub average_run_time: String,
    pub average_distance: String,
}
