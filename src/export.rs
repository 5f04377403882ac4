use anyhow::{Context, Result};
use gtfs_records::{write_archive, write_table, FeedFile, FEED_FILES};
use log::{debug, info};
use serde::Serialize;
use std::path::Path;

use crate::synthesis::FeedTables;

fn export_table<T: FeedFile + Serialize>(
    out_dir: &Path,
    rows: &[T],
    written: &mut Vec<&'static str>,
) -> Result<()> {
    if let Some(path) = write_table(out_dir, rows)
        .with_context(|| format!("impossible to write {}", T::FILE_NAME))?
    {
        info!("Wrote {} rows to {}", rows.len(), path.display());
        written.push(T::FILE_NAME);
    }
    Ok(())
}

impl FeedTables {
    /// Writes every non empty table in `out_dir` and bundles them in a new archive
    ///
    /// Feed files of `out_dir` that this run does not write are removed. Returns the names of the
    /// files that were written, in writing order.
    pub fn export(&self, out_dir: &Path, archive_path: &Path) -> Result<Vec<&'static str>> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("impossible to create {}", out_dir.display()))?;

        let mut written = vec![];
        export_table(out_dir, &self.agencies, &mut written)?;
        export_table(out_dir, &self.feed_info, &mut written)?;
        export_table(out_dir, &self.routes, &mut written)?;
        export_table(out_dir, &self.trips, &mut written)?;
        export_table(out_dir, &self.frequencies, &mut written)?;
        export_table(out_dir, &self.calendar, &mut written)?;
        export_table(out_dir, &self.calendar_dates, &mut written)?;
        export_table(out_dir, &self.stops, &mut written)?;
        export_table(out_dir, &self.stop_times, &mut written)?;
        export_table(out_dir, &self.shapes, &mut written)?;

        for stale in FEED_FILES.iter().filter(|f| !written.contains(*f)) {
            let path = out_dir.join(stale);
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("impossible to remove {}", path.display()))?;
                debug!("Removed {} left by a previous run", path.display());
            }
        }

        write_archive(archive_path, out_dir, &written)
            .with_context(|| format!("impossible to write {}", archive_path.display()))?;
        info!(
            "Archived {} files in {}",
            written.len(),
            archive_path.display()
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use crate::configuration::Configuration;
    use crate::route_model::fixtures::{red_line, route, stop};
    use crate::synthesis::{FeedSynthesizer, FeedTables};
    use chrono::NaiveDate;
    use gtfs_records::RawFeed;

    fn synthesize(irregular: bool) -> FeedTables {
        let configuration = Configuration::default();
        let mut synthesizer = FeedSynthesizer::new(
            configuration.agency.clone(),
            configuration.feed_info.clone(),
            configuration.default_speed_meter_per_second,
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
        )
        .unwrap();

        let mut red = red_line();
        red.frequencies = configuration.frequency_bands().unwrap();
        synthesizer.convert_route(&red).unwrap();

        let mut green = route(
            "Green Line",
            vec![
                stop("Central", -16.500, -68.150, 0.0),
                stop("University", -16.520, -68.120, 800.0),
            ],
        );
        green.runs_regularly = !irregular;
        synthesizer.convert_route(&green).unwrap();
        synthesizer.finish()
    }

    fn assert_same_rows(tables: &FeedTables, feed: &RawFeed) {
        assert_eq!(tables.agencies, feed.agencies);
        assert_eq!(Some(&tables.feed_info), feed.feed_info.as_ref());
        assert_eq!(tables.routes, feed.routes);
        assert_eq!(tables.trips, feed.trips);
        assert_eq!(Some(&tables.frequencies), feed.frequencies.as_ref());
        assert_eq!(Some(&tables.calendar), feed.calendar.as_ref());
        assert_eq!(tables.stops, feed.stops);
        assert_eq!(tables.stop_times, feed.stop_times);
        assert_eq!(Some(&tables.shapes), feed.shapes.as_ref());
    }

    #[test]
    fn written_feed_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let archive = dir.path().join("LaPazBus.zip");
        let tables = synthesize(false);

        let written = tables.export(&out_dir, &archive).unwrap();
        assert_eq!(
            vec![
                "agency.txt",
                "feed_info.txt",
                "routes.txt",
                "trips.txt",
                "frequencies.txt",
                "calendar.txt",
                "stops.txt",
                "stop_times.txt",
                "shapes.txt",
            ],
            written
        );

        let from_dir = RawFeed::from_path(&out_dir).unwrap();
        assert_same_rows(&tables, &from_dir);
        assert!(from_dir.calendar_dates.is_none());

        let from_zip = RawFeed::from_path(&archive).unwrap();
        assert_same_rows(&tables, &from_zip);
        assert!(from_zip.calendar_dates.is_none());
        assert!(!from_zip.files.iter().any(|f| f == "calendar_dates.txt"));
    }

    #[test]
    fn calendar_dates_only_when_needed() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("feed.zip");
        let tables = synthesize(true);

        let written = tables.export(dir.path(), &archive).unwrap();
        assert!(written.contains(&"calendar_dates.txt"));

        let feed = RawFeed::from_path(&archive).unwrap();
        assert_same_rows(&tables, &feed);
        assert_eq!(Some(tables.calendar_dates), feed.calendar_dates);
        assert!(feed.files.iter().any(|f| f == "calendar_dates.txt"));
    }

    #[test]
    fn export_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested").join("out");
        let archive = dir.path().join("feed.zip");
        let tables = synthesize(false);

        tables.export(&out_dir, &archive).unwrap();
        tables.export(&out_dir, &archive).unwrap();

        let feed = RawFeed::from_path(&archive).unwrap();
        assert_same_rows(&tables, &feed);
        assert!(!dir.path().join("feed.zip.part").exists());
    }

    #[test]
    fn previous_run_files_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let archive = dir.path().join("feed.zip");

        synthesize(true).export(&out_dir, &archive).unwrap();
        assert!(out_dir.join("calendar_dates.txt").exists());
        std::fs::write(out_dir.join("notes.md"), "kept").unwrap();

        let tables = synthesize(false);
        tables.export(&out_dir, &archive).unwrap();
        assert!(!out_dir.join("calendar_dates.txt").exists());
        assert!(out_dir.join("notes.md").exists());

        let feed = RawFeed::from_path(&out_dir).unwrap();
        assert!(feed.calendar_dates.is_none());
        assert_same_rows(&tables, &feed);
    }
}
