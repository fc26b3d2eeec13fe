use crate::config::InputConfig;
use crate::data_models::{ColumnLayout, Sample, Series};
use crate::errors::ParseError;
use crate::utils::{parse_channel, parse_co2, parse_locale_float, parse_marker, parse_timestamp};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads a gas-exchange logger export from disk.
pub fn parse_logger_file(path: &Path, config: &InputConfig) -> Result<Series, ParseError> {
    let file = File::open(path).map_err(|e| ParseError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_logger_reader(file, path, config)
}

/// Parses logger rows from any reader. `path` is only used for error messages.
///
/// The first line is the column header and fixes the layout (6 or 7
/// columns). It is followed by `config.unit_rows` unit/description rows.
/// Every data row is read against the header layout, so an empty last cell
/// stays in its own column.
pub fn parse_logger_reader<R: Read>(
    source: R,
    path: &Path,
    config: &InputConfig,
) -> Result<Series, ParseError> {
    let delimiter = if config.delimiter.is_ascii() {
        config.delimiter as u8
    } else {
        warn!(
            "Non-ASCII delimiter {:?} configured, falling back to tab",
            config.delimiter
        );
        b'\t'
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let header = reader
        .headers()
        .map_err(|e| ParseError::RecordReadError {
            path: path.to_path_buf(),
            row: 1,
            source: e,
        })?
        .clone();
    if header.iter().all(|f| f.trim().is_empty()) {
        return Err(ParseError::Empty {
            path: path.to_path_buf(),
        });
    }
    let header_columns = without_trailing_delimiter(&header).len();
    let layout = ColumnLayout::from_column_count(header_columns).ok_or_else(|| {
        ParseError::ColumnCount {
            path: path.to_path_buf(),
            row: 1,
            found: header_columns,
        }
    })?;
    let expected = layout.column_count();

    let mut samples = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = index + 2; // 1-based file line, header is line 1
        let record = result.map_err(|e| ParseError::RecordReadError {
            path: path.to_path_buf(),
            row,
            source: e,
        })?;

        if index < config.unit_rows {
            debug!("Skipping unit row {} in {}", row, path.display());
            continue;
        }

        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let mut fields: Vec<&str> = record.iter().collect();
        if fields.len() == expected + 1 && fields[expected].trim().is_empty() {
            fields.truncate(expected);
        }
        if fields.len() != expected {
            return Err(ParseError::InconsistentLayout {
                path: path.to_path_buf(),
                row,
                expected,
                found: fields.len(),
            });
        }

        samples.push(sample_from_fields(&fields, layout, config));
    }

    if samples.is_empty() {
        return Err(ParseError::Empty {
            path: path.to_path_buf(),
        });
    }
    debug!(
        "Parsed {} samples ({:?}) from {}",
        samples.len(),
        layout,
        path.display()
    );
    Ok(Series::new(samples, layout))
}

/// Header fields without the empty cell a line-terminating delimiter leaves.
fn without_trailing_delimiter(record: &StringRecord) -> Vec<&str> {
    let mut fields: Vec<&str> = record.iter().collect();
    if fields.len() > 1 && fields.last().is_some_and(|f| f.trim().is_empty()) {
        fields.pop();
    }
    fields
}

fn sample_from_fields(fields: &[&str], layout: ColumnLayout, config: &InputConfig) -> Sample {
    let raw_timestamp = fields[0].trim().to_string();
    let timestamp = parse_timestamp(&raw_timestamp, &config.timestamp_formats);

    match layout {
        ColumnLayout::WithVoltage => Sample {
            timestamp,
            raw_timestamp,
            voltage: parse_locale_float(fields[1]).ok(),
            par: parse_channel(fields[2]),
            co2: parse_co2(fields[3]),
            temperature: parse_channel(fields[4]),
            marker: parse_marker(fields[5]),
            h2o: parse_channel(fields[6]),
        },
        ColumnLayout::WithoutVoltage => Sample {
            timestamp,
            raw_timestamp,
            voltage: None,
            co2: parse_co2(fields[1]),
            par: parse_channel(fields[2]),
            temperature: parse_channel(fields[3]),
            marker: parse_marker(fields[4]),
            h2o: parse_channel(fields[5]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEVEN_COLUMNS: &str = "Time\tVolt\tPAR\tCO2\tTemp\tLogger\tH2O\n\
        \tV\tumol\tppm\tC\t-\tmmol\n\
        \t\t\t\t\t\t\n\
        2019-06-14 10:00:00\t12,1\t850,5\t401,25\t21,3\t0\t12,5\n\
        2019-06-14 10:00:05\t12,1\t851\t399,75\t21,3\t5\t12,4\n";

    fn parse(text: &str) -> Result<Series, ParseError> {
        parse_logger_reader(text.as_bytes(), Path::new("test.txt"), &InputConfig::default())
    }

    #[test]
    fn test_seven_column_layout() {
        let series = parse(SEVEN_COLUMNS).unwrap();
        assert_eq!(series.layout, ColumnLayout::WithVoltage);
        assert_eq!(series.len(), 2);

        let first = &series.samples[0];
        assert_eq!(first.voltage, Some(12.1));
        assert_eq!(first.par, 850.5);
        assert_eq!(first.co2, 401.25);
        assert_eq!(first.marker, 0.0);
        assert!(first.timestamp.is_some());
        assert_eq!(series.samples[1].marker, 5.0);
    }

    #[test]
    fn test_six_column_layout() {
        let text = "Time\tCO2\tPAR\tTemp\tLogger\tH2O\n\
            u\tu\tu\tu\tu\tu\n\
            u\tu\tu\tu\tu\tu\n\
            2019-06-14 10:00:00\t405,5\t10\t20\t1\t11\n";
        let series = parse(text).unwrap();
        assert_eq!(series.layout, ColumnLayout::WithoutVoltage);
        let sample = &series.samples[0];
        assert_eq!(sample.co2, 405.5);
        assert_eq!(sample.par, 10.0);
        assert_eq!(sample.marker, 1.0);
        assert_eq!(sample.h2o, 11.0);
        assert_eq!(sample.voltage, None);
    }

    #[test]
    fn test_sentinels_for_bad_cells() {
        let text = "h\th\th\th\th\th\n\
            u\tu\tu\tu\tu\tu\n\
            u\tu\tu\tu\tu\tu\n\
            garbage\tERR\t10\t20\t??\t11\n";
        let series = parse(text).unwrap();
        let sample = &series.samples[0];
        assert_eq!(sample.co2, 0.0);
        assert!(sample.marker.is_nan());
        assert!(sample.timestamp.is_none());
        assert_eq!(sample.raw_timestamp, "garbage");
    }

    #[test]
    fn test_trailing_delimiter_is_ignored() {
        let text = "h\th\th\th\th\th\n\
            u\tu\tu\tu\tu\tu\n\
            u\tu\tu\tu\tu\tu\n\
            2019-06-14 10:00:00\t405\t10\t20\t1\t11\t\n";
        let series = parse(text).unwrap();
        assert_eq!(series.layout, ColumnLayout::WithoutVoltage);
    }

    #[test]
    fn test_unsupported_column_count() {
        let text = "h\th\th\n\
            u\tu\tu\n\
            u\tu\tu\n\
            2019-06-14 10:00:00\t405\t10\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ParseError::ColumnCount { found: 3, .. }));
    }

    #[test]
    fn test_layout_switch_is_rejected() {
        let text = format!(
            "{}2019-06-14 10:00:10\t405\t10\t20\t1\t11\n",
            SEVEN_COLUMNS
        );
        let err = parse(&text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InconsistentLayout {
                expected: 7,
                found: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let text = "h\th\th\th\th\th\nu\tu\tu\tu\tu\tu\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ParseError::Empty { .. }));
    }

    #[test]
    fn test_empty_last_cell_keeps_header_layout() {
        let text = format!(
            "{}2019-06-14 10:00:10\t12,1\t850\t401,25\t21,3\t5\t\n\
             2019-06-14 10:00:15\t12,1\t850\t402,5\t21,3\t5\t\t\n",
            SEVEN_COLUMNS
        );
        let series = parse(&text).unwrap();
        assert_eq!(series.layout, ColumnLayout::WithVoltage);
        assert_eq!(series.len(), 4);

        for sample in &series.samples[2..] {
            assert_eq!(sample.voltage, Some(12.1));
            assert_eq!(sample.par, 850.0);
            assert_eq!(sample.temperature, 21.3);
            assert_eq!(sample.marker, 5.0);
            assert!(sample.h2o.is_nan());
        }
        assert_eq!(series.samples[2].co2, 401.25);
        assert_eq!(series.samples[3].co2, 402.5);
    }

    #[test]
    fn test_header_with_trailing_delimiter() {
        let text = "h\th\th\th\th\th\th\t\n\
            u\tu\tu\tu\tu\tu\tu\n\
            u\tu\tu\tu\tu\tu\tu\n\
            2019-06-14 10:00:00\t12\t10\t405\t20\t1\t\n";
        let series = parse(text).unwrap();
        assert_eq!(series.layout, ColumnLayout::WithVoltage);
        assert_eq!(series.samples[0].co2, 405.0);
        assert_eq!(series.samples[0].marker, 1.0);
    }

    #[test]
    fn test_empty_input_is_empty() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, ParseError::Empty { .. }));
    }
}
