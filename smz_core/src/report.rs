//! Report emitter - per-vehicle table and one-line run summaries.
//!
//! The per-vehicle table has one line per id in ascending order:
//!
//! ```text
//! vehicle_id k d_bar anon_duration scheduled_group_exit_time region_exit_time last_x last_y group_id
//! ```
//!
//! Unset integer fields and an unknown last position are written as `-1`.

use crate::error::SmzError;
use crate::statistics::{AggregateSummary, KdaMeans};
use crate::vehicle::{VehicleState, VehicleTable};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Identifies one parameter combination in a summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLabel {
    pub dataset: String,
    pub bucket_duration: i64,
    pub radius: f64,
}

impl RunLabel {
    pub fn new(dataset: impl Into<String>, bucket_duration: i64, radius: f64) -> Self {
        Self {
            dataset: dataset.into(),
            bucket_duration,
            radius,
        }
    }
}

/// Writes per-vehicle rows to any output.
pub struct ReportEmitter<W: Write> {
    out: W,
}

impl<W: Write> ReportEmitter<W> {
    /// Wraps an output stream.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Writes one vehicle row.
    pub fn write_vehicle(&mut self, state: &VehicleState) -> std::io::Result<()> {
        let (last_x, last_y) = state
            .last_position
            .map_or((-1.0, -1.0), |p| (p.x(), p.y()));

        writeln!(
            self.out,
            "{} {} {} {} {} {} {} {} {}",
            state.id,
            state.reported_k(),
            state.d_bar,
            state.anon_duration,
            state.scheduled_group_exit_time.unwrap_or(-1),
            state.region_exit_time.unwrap_or(-1),
            last_x,
            last_y,
            state.group_id.unwrap_or(-1),
        )
    }

    /// Writes every vehicle of the table; returns the number of rows.
    pub fn write_table(&mut self, table: &VehicleTable) -> std::io::Result<usize> {
        for state in table.iter() {
            self.write_vehicle(state)?;
        }
        self.out.flush()?;
        Ok(table.len())
    }

    /// Returns the wrapped output.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Writes the per-vehicle table to a file.
pub fn write_table_file(path: impl AsRef<Path>, table: &VehicleTable) -> Result<usize, SmzError> {
    let file = File::create(path.as_ref())?;
    let mut emitter = ReportEmitter::new(BufWriter::new(file));
    Ok(emitter.write_table(table)?)
}

fn format_means(means: Result<KdaMeans, SmzError>) -> String {
    match means {
        Ok(m) => format!(
            "{:.4} {:.4} {:.4} {}",
            m.k, m.d_bar, m.anon_duration, m.count
        ),
        Err(_) => "no-data no-data no-data 0".to_string(),
    }
}

/// Formats the printed summary line for one run.
pub fn summary_line(label: &RunLabel, summary: &AggregateSummary) -> String {
    format!(
        "parms: {} {} {}  - tot-sys-kda: {}  - anon-only-kda: {} {}",
        label.dataset,
        label.bucket_duration,
        label.radius,
        format_means(summary.system_means()),
        format_means(summary.anonymized_means()),
        summary.residual_live
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::StatisticsAggregator;
    use geo::Point;
    use smz_env::VehicleId;

    #[test]
    fn test_row_for_exited_vehicle() {
        let mut state = VehicleState::new(VehicleId(7));
        state.k = Some(2);
        state.d_bar = 14.5;
        state.anon_duration = 3;
        state.scheduled_group_exit_time = Some(50);
        state.region_exit_time = Some(53);
        state.last_position = Some(Point::new(5.0, 100.25));
        state.group_id = Some(0);

        let mut emitter = ReportEmitter::new(Vec::new());
        emitter.write_vehicle(&state).unwrap();
        let text = String::from_utf8(emitter.into_inner()).unwrap();

        assert_eq!(text, "7 2 14.5 3 50 53 5 100.25 0\n");
    }

    #[test]
    fn test_row_for_unseen_vehicle() {
        let state = VehicleState::new(VehicleId(3));

        let mut emitter = ReportEmitter::new(Vec::new());
        emitter.write_vehicle(&state).unwrap();
        let text = String::from_utf8(emitter.into_inner()).unwrap();

        assert_eq!(text, "3 1 0 0 -1 -1 -1 -1 -1\n");
    }

    #[test]
    fn test_table_has_one_row_per_id() {
        let table = VehicleTable::with_id_range(VehicleId(2), VehicleId(5));

        let mut emitter = ReportEmitter::new(Vec::new());
        let rows = emitter.write_table(&table).unwrap();
        let text = String::from_utf8(emitter.into_inner()).unwrap();

        assert_eq!(rows, 4);
        let ids: Vec<&str> = text.lines().map(|l| l.split(' ').next().unwrap()).collect();
        assert_eq!(ids, vec!["2", "3", "4", "5"]);
    }

    #[test]
    fn test_summary_line() {
        let mut aggregator = StatisticsAggregator::new();
        let mut state = VehicleState::new(VehicleId(1));
        state.k = Some(2);
        state.d_bar = 10.0;
        aggregator.record(&state);
        aggregator.record(&VehicleState::new(VehicleId(2)));
        let summary = aggregator.finish(1, 0);

        let line = summary_line(&RunLabel::new("rural", 50, 100.0), &summary);

        assert_eq!(
            line,
            "parms: rural 50 100  - tot-sys-kda: 1.5000 5.0000 0.0000 2  - anon-only-kda: 2.0000 10.0000 0.0000 1 0"
        );
    }

    #[test]
    fn test_summary_line_without_data() {
        let summary = StatisticsAggregator::new().finish(0, 0);
        let line = summary_line(&RunLabel::new("empty", 25, 50.0), &summary);

        assert!(line.contains("tot-sys-kda: no-data no-data no-data 0"));
        assert!(line.ends_with("anon-only-kda: no-data no-data no-data 0 0"));
    }
}
