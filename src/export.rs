use crate::calendar::{CalendarDate, DateWindow};
use crate::model::{MetricList, SleepData};
use anyhow::Context;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// `sleep_data_<first>_to_<last>.csv`
pub(crate) fn file_name(window: &DateWindow) -> String {
    format!("sleep_data_{}_to_{}.csv", window.first(), window.last())
}

/// Writes one row per metric, labelled by its display name, with one column
/// per date of `window`.  Missing values are written as empty fields.
pub(crate) fn write_csv<W: io::Write>(
    writer: W,
    window: &DateWindow,
    metrics: &MetricList,
    sheet: &SleepData,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec![String::from("Metric")];
    header.extend(window.iter().map(CalendarDate::long_label));
    wtr.write_record(&header)?;
    for metric in metrics {
        let mut row = vec![metric.name.as_str()];
        row.extend(window.iter().map(|date| sheet.value(date, &metric.id)));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports the window into `dir` and returns the path written
pub(crate) fn export_to_dir(
    dir: &Path,
    window: &DateWindow,
    metrics: &MetricList,
    sheet: &SleepData,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(file_name(window));
    let fp = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(fp, window, metrics, sheet)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = metrics.len(), "exported CSV");
    Ok(path)
}
