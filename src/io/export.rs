//! CSV export for demo telemetry rows and alert logs.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::panel::alert::AlertRecord;
use crate::runner::TelemetryRow;

/// Schema v1 column header for CSV telemetry export.
const TELEMETRY_HEADER: &str = "tick,voltage_v,current_a,power_w,power_factor,\
                                power_status,voltage_status,power_factor_status,\
                                threshold_w,commanded_w,headroom_w,auto_mode";

/// Column header for CSV alert export.
const ALERT_HEADER: &str = "seq,severity,message";

/// Exports telemetry rows to a CSV file at the given path.
///
/// Writes a header row followed by one data row per tick. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_telemetry_csv(rows: &[TelemetryRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_telemetry_csv(rows, buf)
}

/// Writes telemetry rows as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_telemetry_csv(rows: &[TelemetryRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(TELEMETRY_HEADER.split(',').map(str::trim))?;

    for r in rows {
        wtr.write_record(&[
            r.tick.to_string(),
            format!("{:.2}", r.voltage_v),
            format!("{:.4}", r.current_a),
            format!("{:.2}", r.power_w),
            format!("{:.4}", r.power_factor),
            r.power_status.to_string(),
            r.voltage_status.to_string(),
            r.power_factor_status.to_string(),
            r.threshold_w.to_string(),
            r.commanded_w.to_string(),
            r.headroom_w.to_string(),
            r.auto_mode.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports an alert log to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_alerts_csv(alerts: &[AlertRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_alerts_csv(alerts, buf)
}

/// Writes an alert log as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_alerts_csv(alerts: &[AlertRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(ALERT_HEADER.split(','))?;

    for a in alerts {
        wtr.write_record(&[
            a.seq.to_string(),
            a.severity.to_string(),
            a.message.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::alert::Severity;
    use crate::panel::status::{PowerFactorStatus, PowerStatus, VoltageStatus};

    fn make_row(tick: usize) -> TelemetryRow {
        TelemetryRow {
            tick,
            voltage_v: 230.4,
            current_a: 0.52,
            power_w: 119.6,
            power_factor: 0.93,
            power_status: PowerStatus::Warning,
            voltage_status: VoltageStatus::Normal,
            power_factor_status: PowerFactorStatus::Acceptable,
            threshold_w: 120,
            commanded_w: 120,
            headroom_w: 20,
            auto_mode: true,
        }
    }

    #[test]
    fn header_matches_schema_v1() {
        let rows = vec![make_row(0)];
        let mut buf = Vec::new();
        write_telemetry_csv(&rows, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "tick,voltage_v,current_a,power_w,power_factor,\
             power_status,voltage_status,power_factor_status,\
             threshold_w,commanded_w,headroom_w,auto_mode"
        );
    }

    #[test]
    fn row_count_matches_tick_count() {
        let rows: Vec<TelemetryRow> = (0..24).map(make_row).collect();
        let mut buf = Vec::new();
        write_telemetry_csv(&rows, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        // 1 header + 24 data rows
        assert_eq!(lines.len(), 25);
    }

    #[test]
    fn deterministic_output() {
        let rows: Vec<TelemetryRow> = (0..5).map(make_row).collect();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_telemetry_csv(&rows, &mut buf1).ok();
        write_telemetry_csv(&rows, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn telemetry_round_trip_parseable() {
        let rows: Vec<TelemetryRow> = (0..3).map(make_row).collect();
        let mut buf = Vec::new();
        write_telemetry_csv(&rows, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(12));

        let mut row_count = 0;
        for record in rdr.records() {
            let rec = record.ok();
            assert!(rec.is_some(), "every row should parse");
            let rec = rec.as_ref();
            // Numeric columns parse as f64
            for i in 1..5 {
                let val: Result<f64, _> = rec.unwrap()[i].parse();
                assert!(val.is_ok(), "column {i} should parse as f64");
            }
            // auto_mode parses as bool
            let auto_val: Result<bool, _> = rec.unwrap()[11].parse();
            assert!(auto_val.is_ok(), "auto_mode column should parse as bool");
            row_count += 1;
        }
        assert_eq!(row_count, 3);
    }

    #[test]
    fn alerts_csv_has_header_and_rows() {
        let alerts = vec![
            AlertRecord {
                seq: 0,
                severity: Severity::Info,
                message: "Power threshold set to 90 W".to_string(),
            },
            AlertRecord {
                seq: 1,
                severity: Severity::Critical,
                message: "deep shed band engaged".to_string(),
            },
        ];
        let mut buf = Vec::new();
        write_alerts_csv(&alerts, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        assert_eq!(lines.first().copied(), Some("seq,severity,message"));
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("1,critical,"));
    }
}
