//! Trace loader - strict parsing of fully enumerated trajectory files.

use crate::error::TraceError;
use crate::types::{tick_in_range, Sample, Tick, VehicleId};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Parses one trace line.
///
/// Returns `Ok(None)` for blank lines. `line` is the 1-based line number
/// used in error messages.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Sample>, TraceError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() != 4 {
        return Err(TraceError::FieldCount {
            line,
            found: fields.len(),
        });
    }

    let time: Tick = fields[0]
        .parse()
        .map_err(|_| TraceError::invalid(line, "time", fields[0]))?;
    if !tick_in_range(time) {
        return Err(TraceError::TickOutOfRange { line, time });
    }

    let id: i64 = fields[1]
        .parse()
        .map_err(|_| TraceError::invalid(line, "vehicle_id", fields[1]))?;
    if id <= 0 {
        return Err(TraceError::NonPositiveVehicleId { line, id });
    }

    let x = parse_coordinate(line, "x", fields[2])?;
    let y = parse_coordinate(line, "y", fields[3])?;

    Ok(Some(Sample {
        time,
        vehicle: VehicleId(id as u64),
        x,
        y,
    }))
}

fn parse_coordinate(line: usize, field: &'static str, token: &str) -> Result<f64, TraceError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TraceError::invalid(line, field, token)),
    }
}

/// Parses a complete trace from a buffered reader.
///
/// Stops at the first malformed line; no partial result is returned.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<Sample>, TraceError> {
    let mut samples = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(sample) = parse_line(index + 1, &line)? {
            samples.push(sample);
        }
    }

    Ok(samples)
}

/// Loads a trace file from disk.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<Sample>, TraceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| TraceError::open(path, e))?;
    parse_trace(BufReader::new(file))
}

/// Writes samples in the trace file format, one per line.
pub fn write_trace<W: Write>(mut out: W, samples: &[Sample]) -> std::io::Result<()> {
    for s in samples {
        writeln!(out, "{} {} {} {}", s.time, s.vehicle, s.x, s.y)?;
    }
    out.flush()
}

/// Verifies that samples are sorted by `(time, vehicle_id)`.
///
/// Equal keys are accepted. Reports the index of the first sample that
/// sorts before its predecessor.
pub fn check_ordering(samples: &[Sample]) -> Result<(), TraceError> {
    match samples
        .windows(2)
        .position(|pair| pair[1].order_key_cmp(&pair[0]).is_lt())
    {
        Some(index) => Err(TraceError::OutOfOrder { index: index + 1 }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_line() {
        let sample = parse_line(1, "0 1 1435.34 1539.1").unwrap().unwrap();

        assert_eq!(sample.time, 0);
        assert_eq!(sample.vehicle, VehicleId(1));
        assert_eq!(sample.x, 1435.34);
        assert_eq!(sample.y, 1539.1);
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(parse_line(3, "   ").unwrap().is_none());
    }

    #[test]
    fn test_parse_wrong_field_count() {
        let err = parse_line(7, "0 1 2.0").unwrap_err();
        assert!(matches!(err, TraceError::FieldCount { line: 7, found: 3 }));
    }

    #[test]
    fn test_parse_non_numeric_time() {
        let err = parse_line(2, "0.5 1 2.0 3.0").unwrap_err();
        assert!(matches!(err, TraceError::InvalidField { line: 2, field: "time", .. }));
    }

    #[test]
    fn test_parse_rejects_huge_tick() {
        let err = parse_line(4, &format!("{} 1 2.0 3.0", i64::MAX)).unwrap_err();
        assert!(matches!(err, TraceError::TickOutOfRange { line: 4, time: i64::MAX }));

        assert!(parse_line(4, &format!("{} 1 2.0 3.0", crate::MAX_TICK)).is_ok());
    }

    #[test]
    fn test_parse_rejects_zero_vehicle() {
        let err = parse_line(1, "0 0 2.0 3.0").unwrap_err();
        assert!(matches!(err, TraceError::NonPositiveVehicleId { id: 0, .. }));
    }

    #[test]
    fn test_parse_rejects_nan_coordinate() {
        let err = parse_line(1, "0 4 NaN 3.0").unwrap_err();
        assert!(matches!(err, TraceError::InvalidField { field: "x", .. }));
    }

    #[test]
    fn test_parse_trace_aborts_on_bad_line() {
        let text = "0 1 10.0 10.0\n0 2 abc 10.0\n1 1 11.0 10.0\n";
        let err = parse_trace(Cursor::new(text)).unwrap_err();

        assert!(matches!(err, TraceError::InvalidField { line: 2, .. }));
    }

    #[test]
    fn test_parse_trace_skips_blank_lines() {
        let text = "0 1 10.0 10.0\n\n0 2 20.0 10.0\n";
        let samples = parse_trace(Cursor::new(text)).unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].vehicle, VehicleId(2));
    }

    #[test]
    fn test_write_then_parse_preserves_samples() {
        let samples = vec![Sample::new(0, 1, 100.0, 100.0), Sample::new(0, 2, 110.5, 99.25)];
        let mut buf = Vec::new();
        write_trace(&mut buf, &samples).unwrap();

        let parsed = parse_trace(Cursor::new(buf)).unwrap();
        assert_eq!(parsed, samples);
    }

    #[test]
    fn test_check_ordering() {
        let sorted = vec![
            Sample::new(0, 1, 0.0, 0.0),
            Sample::new(0, 2, 0.0, 0.0),
            Sample::new(1, 1, 0.0, 0.0),
        ];
        assert!(check_ordering(&sorted).is_ok());

        let unsorted = vec![
            Sample::new(0, 2, 0.0, 0.0),
            Sample::new(0, 1, 0.0, 0.0),
        ];
        let err = check_ordering(&unsorted).unwrap_err();
        assert!(matches!(err, TraceError::OutOfOrder { index: 1 }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_trace("/definitely/not/here.srt").unwrap_err();
        assert!(matches!(err, TraceError::Open { .. }));
    }

    proptest::proptest! {
        #[test]
        fn prop_parse_line_never_panics(text in "\\PC{0,40}") {
            let _ = parse_line(1, &text);
        }

        #[test]
        fn prop_accepted_lines_have_positive_ids(
            t in -5i64..5000,
            id in -3i64..100,
            x in -10.0f64..3010.0,
            y in -10.0f64..3010.0,
        ) {
            let text = format!("{} {} {} {}", t, id, x, y);
            match parse_line(1, &text) {
                Ok(Some(sample)) => {
                    proptest::prop_assert!(sample.vehicle.get() > 0);
                    proptest::prop_assert_eq!(sample.time, t);
                }
                Ok(None) => proptest::prop_assert!(false, "non-blank line parsed as blank"),
                Err(_) => proptest::prop_assert!(id <= 0),
            }
        }
    }
}
