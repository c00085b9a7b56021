//! Trajectory interpolation - expands sparse movement records into a
//! fully enumerated, one-sample-per-tick trace.
//!
//! Input records come from GMSF/MMTS movement files, seven fields each:
//!
//! ```text
//! start_time vehicle_id x0 y0 x1 y1 elapsed
//! ```
//!
//! Times are rounded up to whole ticks. A record with `elapsed` ticks
//! becomes `elapsed + 1` samples stepping `(x1 - x0) / (elapsed + 1)` per
//! tick, so the last sample stops one step short of `(x1, y1)`.

use smz_env::{tick_in_range, Sample, Tick, VehicleId, MAX_TICK};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while interpolating a movement file.
#[derive(Debug, Error)]
pub enum InterpolateError {
    #[error("Cannot read movement file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Read error: {0}")]
    Read(#[from] std::io::Error),

    #[error("Line {line}: expected 7 fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("Line {line}: invalid {field} '{token}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        token: String,
    },

    #[error("Line {line}: elapsed time is zero for vehicle {vehicle}")]
    ZeroElapsed { line: usize, vehicle: VehicleId },
}

/// One straight-line movement of one vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementRecord {
    pub start: Tick,
    pub vehicle: VehicleId,
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub elapsed: Tick,
}

impl MovementRecord {
    /// Expands the movement into per-tick samples.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        let steps = (self.elapsed + 1) as f64;
        let dx = (self.to.0 - self.from.0) / steps;
        let dy = (self.to.1 - self.from.1) / steps;

        (0..=self.elapsed).map(move |i| Sample {
            time: self.start + i,
            vehicle: self.vehicle,
            x: self.from.0 + i as f64 * dx,
            y: self.from.1 + i as f64 * dy,
        })
    }
}

/// Longest single movement expanded, in ticks (one day).
pub const MAX_ELAPSED: Tick = 86_400;

/// Rounds a fractional timestamp up to the next whole tick.
///
/// Returns `None` when the result falls outside the valid tick range.
pub fn ceil_tick(stamp: f64) -> Option<Tick> {
    let ceiled = stamp.ceil();
    (ceiled.is_finite() && ceiled.abs() <= MAX_TICK as f64).then_some(ceiled as Tick)
}

fn tick_field(line: usize, name: &'static str, token: &str) -> Result<Tick, InterpolateError> {
    ceil_tick(coordinate(line, name, token)?).ok_or_else(|| InterpolateError::InvalidField {
        line,
        field: name,
        token: token.to_string(),
    })
}

fn field<T: std::str::FromStr>(line: usize, name: &'static str, token: &str) -> Result<T, InterpolateError> {
    token.parse().map_err(|_| InterpolateError::InvalidField {
        line,
        field: name,
        token: token.to_string(),
    })
}

fn coordinate(line: usize, name: &'static str, token: &str) -> Result<f64, InterpolateError> {
    let value: f64 = field(line, name, token)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InterpolateError::InvalidField {
            line,
            field: name,
            token: token.to_string(),
        })
    }
}

/// Parses one movement line; blank lines yield `None`.
pub fn parse_movement(line: usize, text: &str) -> Result<Option<MovementRecord>, InterpolateError> {
    let f: Vec<&str> = text.split_whitespace().collect();
    if f.is_empty() {
        return Ok(None);
    }
    if f.len() != 7 {
        return Err(InterpolateError::FieldCount { line, found: f.len() });
    }

    let vehicle: u64 = field(line, "vehicle_id", f[1])?;
    if vehicle == 0 {
        return Err(InterpolateError::InvalidField {
            line,
            field: "vehicle_id",
            token: f[1].to_string(),
        });
    }
    let vehicle = VehicleId(vehicle);

    let record = MovementRecord {
        start: tick_field(line, "start_time", f[0])?,
        vehicle,
        from: (coordinate(line, "x0", f[2])?, coordinate(line, "y0", f[3])?),
        to: (coordinate(line, "x1", f[4])?, coordinate(line, "y1", f[5])?),
        elapsed: tick_field(line, "elapsed", f[6])?,
    };

    if record.elapsed == 0 {
        return Err(InterpolateError::ZeroElapsed { line, vehicle });
    }
    let end = record.start + record.elapsed;
    if record.elapsed < 0 || record.elapsed > MAX_ELAPSED || !tick_in_range(end) {
        return Err(InterpolateError::InvalidField {
            line,
            field: "elapsed",
            token: f[6].to_string(),
        });
    }

    Ok(Some(record))
}

/// Parses a complete movement file from a reader.
pub fn parse_movements<R: BufRead>(reader: R) -> Result<Vec<MovementRecord>, InterpolateError> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        if let Some(record) = parse_movement(index + 1, &line?)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Loads a movement file from disk.
pub fn load_movements(path: impl AsRef<Path>) -> Result<Vec<MovementRecord>, InterpolateError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| InterpolateError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_movements(BufReader::new(file))
}

/// Expands all records; optionally sorts by `(time, vehicle_id)`.
///
/// Sorting is stable, so samples with equal keys keep record order.
pub fn interpolate(records: &[MovementRecord], sort: bool) -> Vec<Sample> {
    let mut samples: Vec<Sample> = records.iter().flat_map(|r| r.samples()).collect();
    if sort {
        samples.sort_by(|a, b| a.order_key_cmp(b));
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    #[test]
    fn test_ceil_tick() {
        assert_eq!(ceil_tick(0.0), Some(0));
        assert_eq!(ceil_tick(3.0), Some(3));
        assert_eq!(ceil_tick(3.2), Some(4));
        assert_eq!(ceil_tick(-1.5), Some(-1));
        assert_eq!(ceil_tick(1e300), None);
        assert_eq!(ceil_tick(-1e300), None);
    }

    #[test]
    fn test_huge_times_are_rejected() {
        let err = parse_movement(3, "1e300 1 0 0 10 10 5").unwrap_err();
        assert!(matches!(err, InterpolateError::InvalidField { line: 3, field: "start_time", .. }));

        let err = parse_movement(4, "0 1 0 0 10 10 1e18").unwrap_err();
        assert!(matches!(err, InterpolateError::InvalidField { field: "elapsed", .. }));

        let err = parse_movement(5, "0 1 0 0 10 10 86401").unwrap_err();
        assert!(matches!(err, InterpolateError::InvalidField { field: "elapsed", .. }));

        assert!(parse_movement(6, "0 1 0 0 10 10 86400").unwrap().is_some());
    }

    #[test]
    fn test_expand_movement() {
        let record = parse_movement(1, "10.4 3 0.0 0.0 40.0 -20.0 2.6").unwrap().unwrap();

        assert_eq!(record.start, 11);
        assert_eq!(record.elapsed, 3);

        let samples: Vec<Sample> = record.samples().collect();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].time, 11);
        assert_eq!(samples[3].time, 14);
        assert_relative_eq!(samples[1].x, 10.0);
        assert_relative_eq!(samples[3].x, 30.0);
        assert_relative_eq!(samples[3].y, -15.0);
    }

    #[test]
    fn test_zero_elapsed_is_fatal() {
        let err = parse_movement(5, "0 1 0 0 10 10 0").unwrap_err();
        assert!(matches!(err, InterpolateError::ZeroElapsed { line: 5, .. }));
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_movement(2, "0 1 0 0 10 10").unwrap_err();
        assert!(matches!(err, InterpolateError::FieldCount { found: 6, .. }));
    }

    #[test]
    fn test_interpolate_sorted() {
        let text = "0 2 0 0 3 0 2\n1 1 10 10 10 13 2\n";
        let records = parse_movements(Cursor::new(text)).unwrap();
        let samples = interpolate(&records, true);

        let keys: Vec<(Tick, u64)> = samples.iter().map(|s| (s.time, s.vehicle.get())).collect();
        assert_eq!(keys, vec![(0, 2), (1, 1), (1, 2), (2, 1), (2, 2), (3, 1)]);
        assert!(smz_env::check_ordering(&samples).is_ok());
    }

    #[test]
    fn test_interpolate_unsorted_keeps_record_order() {
        let text = "5 1 0 0 2 0 1\n0 2 0 0 2 0 1\n";
        let records = parse_movements(Cursor::new(text)).unwrap();
        let samples = interpolate(&records, false);

        assert_eq!(samples[0].vehicle, VehicleId(1));
        assert_eq!(samples[2].vehicle, VehicleId(2));
    }

    proptest::proptest! {
        #[test]
        fn prop_expansion_starts_at_origin(
            start in 0i64..1000,
            elapsed in 1i64..200,
            x0 in 0.0f64..3000.0,
            y0 in 0.0f64..3000.0,
            x1 in 0.0f64..3000.0,
            y1 in 0.0f64..3000.0,
        ) {
            let record = MovementRecord {
                start,
                vehicle: VehicleId(1),
                from: (x0, y0),
                to: (x1, y1),
                elapsed,
            };
            let samples: Vec<Sample> = record.samples().collect();

            proptest::prop_assert_eq!(samples.len() as i64, elapsed + 1);
            proptest::prop_assert_eq!(samples[0].x, x0);
            proptest::prop_assert_eq!(samples[0].y, y0);
            proptest::prop_assert_eq!(samples[samples.len() - 1].time, start + elapsed);
        }
    }
}
