use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;

use crate::config::OutputConfig;
use crate::data_models::{AoiAnnotations, Sample, Series};
use crate::errors::PipelineError;
use crate::utils::format_float;

pub fn header(include_window_seconds: bool) -> Vec<&'static str> {
    let mut columns = vec!["date", "time", "PAR", "CO2", "temperature", "chamber", "Logger"];
    if include_window_seconds {
        columns.push("seconds");
    }
    columns.extend(["AoI", "quality", "H2O"]);
    columns
}

fn date_time(sample: &Sample) -> (String, String) {
    match sample.timestamp {
        Some(ts) => (
            ts.format("%Y-%m-%d").to_string(),
            ts.format("%H:%M:%S%.f").to_string(),
        ),
        None => (sample.raw_timestamp.clone(), String::new()),
    }
}

/// Writes the annotated table, one record per input sample.
pub fn write_table<W: Write>(
    sink: W,
    series: &Series,
    annotations: &AoiAnnotations,
    include_window_seconds: bool,
) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().from_writer(sink);
    writer.write_record(header(include_window_seconds))?;

    for (i, sample) in series.samples.iter().enumerate() {
        let (date, time) = date_time(sample);
        let mut record = vec![
            date,
            time,
            format_float(sample.par),
            format_float(sample.co2),
            format_float(sample.temperature),
            annotations.cover[i].map(|c| c.code().to_string()).unwrap_or_default(),
            format_float(sample.marker),
        ];
        if include_window_seconds {
            record.push(annotations.window_seconds[i].map(format_float).unwrap_or_default());
        }
        record.push(u8::from(annotations.aoi[i]).to_string());
        record.push(annotations.quality[i].code().to_string());
        record.push(format_float(sample.h2o));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_annotated_table(
    path: &Path,
    series: &Series,
    annotations: &AoiAnnotations,
    config: &OutputConfig,
) -> Result<(), PipelineError> {
    let file = std::fs::File::create(path).map_err(|e| PipelineError::Write {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    write_table(file, series, annotations, config.include_window_seconds).map_err(|e| {
        PipelineError::Write {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::{ColumnLayout, Cover, Quality};
    use chrono::NaiveDate;

    fn sample(marker: f64, co2: f64) -> Sample {
        Sample {
            raw_timestamp: "2019-06-14 10:00:00".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2019, 6, 14).and_then(|d| d.and_hms_opt(10, 0, 0)),
            voltage: None,
            par: 850.5,
            co2,
            temperature: 21.0,
            marker,
            h2o: f64::NAN,
        }
    }

    fn render(series: &Series, annotations: &AoiAnnotations, seconds: bool) -> String {
        let mut buffer = Vec::new();
        write_table(&mut buffer, series, annotations, seconds).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_rows_and_columns() {
        let series = Series::new(
            vec![sample(0.0, 400.5), sample(5.0, 399.0)],
            ColumnLayout::WithoutVoltage,
        );
        let mut annotations = AoiAnnotations::empty(2);
        annotations.aoi[1] = true;
        annotations.cover[1] = Some(Cover::Dark);
        annotations.quality[1] = Quality::Suspect;
        annotations.window_seconds[1] = Some(5.0);

        let text = render(&series, &annotations, true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,time,PAR,CO2,temperature,chamber,Logger,seconds,AoI,quality,H2O"
        );
        assert_eq!(lines[1], "2019-06-14,10:00:00,850.5,400.5,21,,0,,0,0,");
        assert_eq!(lines[2], "2019-06-14,10:00:00,850.5,399,21,d,5,5,1,2,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_seconds_column_optional() {
        let series = Series::new(vec![sample(0.0, 400.0)], ColumnLayout::WithoutVoltage);
        let text = render(&series, &AoiAnnotations::empty(1), false);
        assert!(text.starts_with("date,time,PAR,CO2,temperature,chamber,Logger,AoI,quality,H2O\n"));
    }

    #[test]
    fn test_unparsed_timestamp_kept_raw() {
        let mut s = sample(0.0, 400.0);
        s.timestamp = None;
        s.raw_timestamp = "14/06 10h".to_string();
        let series = Series::new(vec![s], ColumnLayout::WithoutVoltage);
        let text = render(&series, &AoiAnnotations::empty(1), false);
        assert!(text.lines().nth(1).unwrap().starts_with("14/06 10h,,"));
    }
}
