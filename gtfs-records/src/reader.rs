use crate::objects::*;
use crate::Error;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The tables of a feed as they are in the csv files
///
/// Used to check what a run actually wrote, from the output directory or from the zip archive
#[derive(Debug)]
pub struct RawFeed {
    /// All Agencies
    pub agencies: Vec<Agency>,
    /// Feed metadata, None if the file was absent
    pub feed_info: Option<Vec<FeedInfo>>,
    /// All Routes
    pub routes: Vec<Route>,
    /// All Trips
    pub trips: Vec<Trip>,
    /// All Frequencies, None if the file was absent
    pub frequencies: Option<Vec<Frequency>>,
    /// All Calendar, None if the file was absent
    pub calendar: Option<Vec<Calendar>>,
    /// All Calendar dates, None if the file was absent
    pub calendar_dates: Option<Vec<CalendarDate>>,
    /// All Stops
    pub stops: Vec<Stop>,
    /// All StopTimes
    pub stop_times: Vec<StopTime>,
    /// All shapes points, None if the file was absent
    pub shapes: Option<Vec<Shape>>,
    /// All files that are present in the feed
    pub files: Vec<String>,
}

/// Every file a feed can hold, in writing order
pub const FEED_FILES: [&str; 10] = [
    Agency::FILE_NAME,
    FeedInfo::FILE_NAME,
    Route::FILE_NAME,
    Trip::FILE_NAME,
    Frequency::FILE_NAME,
    Calendar::FILE_NAME,
    CalendarDate::FILE_NAME,
    Stop::FILE_NAME,
    StopTime::FILE_NAME,
    Shape::FILE_NAME,
];

impl RawFeed {
    /// Prints on stdout the number of rows of each table
    pub fn print_stats(&self) {
        println!("Feed data:");
        println!("  Agencies: {}", self.agencies.len());
        println!("  Feed info: {}", optional_file_summary(&self.feed_info));
        println!("  Routes: {}", self.routes.len());
        println!("  Trips: {}", self.trips.len());
        println!("  Frequencies: {}", optional_file_summary(&self.frequencies));
        println!("  Calendar: {}", optional_file_summary(&self.calendar));
        println!(
            "  Calendar dates: {}",
            optional_file_summary(&self.calendar_dates)
        );
        println!("  Stops: {}", self.stops.len());
        println!("  Stop times: {}", self.stop_times.len());
        println!("  Shapes: {}", optional_file_summary(&self.shapes));
    }

    /// Reads the feed from a zip archive or a directory
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let p = path.as_ref();
        if p.is_file() {
            let reader = File::open(p)?;
            Self::from_reader(reader)
        } else if p.is_dir() {
            Self::from_directory(p)
        } else {
            Err(Error::NotFileNorDirectory(format!("{}", p.display())))
        }
    }

    fn from_directory(p: &Path) -> Result<Self, Error> {
        let mut files: Vec<String> = std::fs::read_dir(p)?
            .filter_map(|d| {
                d.ok()
                    .and_then(|e| e.file_name().to_str().map(|s| s.to_owned()))
            })
            .filter(|f| FEED_FILES.contains(&f.as_str()))
            .collect();
        files.sort();

        Ok(RawFeed {
            agencies: read_objs_from_path(p, Agency::FILE_NAME)?,
            feed_info: read_objs_from_optional_path(p, FeedInfo::FILE_NAME).transpose()?,
            routes: read_objs_from_path(p, Route::FILE_NAME)?,
            trips: read_objs_from_path(p, Trip::FILE_NAME)?,
            frequencies: read_objs_from_optional_path(p, Frequency::FILE_NAME).transpose()?,
            calendar: read_objs_from_optional_path(p, Calendar::FILE_NAME).transpose()?,
            calendar_dates: read_objs_from_optional_path(p, CalendarDate::FILE_NAME)
                .transpose()?,
            stops: read_objs_from_path(p, Stop::FILE_NAME)?,
            stop_times: read_objs_from_path(p, StopTime::FILE_NAME)?,
            shapes: read_objs_from_optional_path(p, Shape::FILE_NAME).transpose()?,
            files,
        })
    }

    /// Reads the feed from any zip archive implementing [std::io::Read] and [std::io::Seek]
    pub fn from_reader<T: std::io::Read + std::io::Seek>(reader: T) -> Result<Self, Error> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut file_mapping = HashMap::new();
        let mut files = Vec::new();

        for i in 0..archive.len() {
            let archive_file = archive.by_index(i)?;
            files.push(archive_file.name().to_owned());

            for feed_file in FEED_FILES {
                let path = std::path::Path::new(archive_file.name());
                if path.file_name() == Some(std::ffi::OsStr::new(feed_file)) {
                    file_mapping.insert(feed_file, i);
                    break;
                }
            }
        }

        Ok(RawFeed {
            agencies: read_file(&file_mapping, &mut archive, Agency::FILE_NAME)?,
            feed_info: read_optional_file(&file_mapping, &mut archive, FeedInfo::FILE_NAME)
                .transpose()?,
            routes: read_file(&file_mapping, &mut archive, Route::FILE_NAME)?,
            trips: read_file(&file_mapping, &mut archive, Trip::FILE_NAME)?,
            frequencies: read_optional_file(&file_mapping, &mut archive, Frequency::FILE_NAME)
                .transpose()?,
            calendar: read_optional_file(&file_mapping, &mut archive, Calendar::FILE_NAME)
                .transpose()?,
            calendar_dates: read_optional_file(
                &file_mapping,
                &mut archive,
                CalendarDate::FILE_NAME,
            )
            .transpose()?,
            stops: read_file(&file_mapping, &mut archive, Stop::FILE_NAME)?,
            stop_times: read_file(&file_mapping, &mut archive, StopTime::FILE_NAME)?,
            shapes: read_optional_file(&file_mapping, &mut archive, Shape::FILE_NAME)
                .transpose()?,
            files,
        })
    }
}

fn optional_file_summary<T>(objs: &Option<Vec<T>>) -> String {
    match objs {
        Some(objs) => format!("{}", objs.len()),
        None => "File not present".to_string(),
    }
}

fn read_objs<T, O>(mut reader: T, file_name: &str) -> Result<Vec<O>, Error>
where
    for<'de> O: Deserialize<'de>,
    T: std::io::Read,
{
    let mut bom = [0; 3];
    reader
        .read_exact(&mut bom)
        .map_err(|e| Error::NamedFileIO {
            file_name: file_name.to_owned(),
            source: Box::new(e),
        })?;

    let chained = if bom != [0xefu8, 0xbbu8, 0xbfu8] {
        bom.chain(reader)
    } else {
        [].chain(reader)
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(chained);
    // We store the headers to be able to return them in case of errors
    let headers = reader
        .headers()
        .map_err(|e| Error::CSVError {
            file_name: file_name.to_owned(),
            source: e,
            line_in_error: None,
        })?
        .clone();

    let mut rec = csv::StringRecord::new();
    let mut objs = Vec::new();

    while reader.read_record(&mut rec).map_err(|e| Error::CSVError {
        file_name: file_name.to_owned(),
        source: e,
        line_in_error: None,
    })? {
        let obj = rec
            .deserialize(Some(&headers))
            .map_err(|e| Error::CSVError {
                file_name: file_name.to_owned(),
                source: e,
                line_in_error: Some(crate::error::LineError {
                    headers: headers.into_iter().map(String::from).collect(),
                    values: rec.into_iter().map(String::from).collect(),
                }),
            })?;
        objs.push(obj);
    }
    Ok(objs)
}

fn read_objs_from_path<O>(dir_path: &Path, file_name: &str) -> Result<Vec<O>, Error>
where
    for<'de> O: Deserialize<'de>,
{
    read_objs_from_optional_path(dir_path, file_name)
        .unwrap_or_else(|| Err(Error::MissingFile(file_name.to_owned())))
}

fn read_objs_from_optional_path<O>(
    dir_path: &Path,
    file_name: &str,
) -> Option<Result<Vec<O>, Error>>
where
    for<'de> O: Deserialize<'de>,
{
    File::open(dir_path.join(file_name))
        .ok()
        .map(|r| read_objs(r, file_name))
}

fn read_file<O, T>(
    file_mapping: &HashMap<&str, usize>,
    archive: &mut zip::ZipArchive<T>,
    file_name: &str,
) -> Result<Vec<O>, Error>
where
    for<'de> O: Deserialize<'de>,
    T: std::io::Read + std::io::Seek,
{
    read_optional_file(file_mapping, archive, file_name)
        .unwrap_or_else(|| Err(Error::MissingFile(file_name.to_owned())))
}

fn read_optional_file<O, T>(
    file_mapping: &HashMap<&str, usize>,
    archive: &mut zip::ZipArchive<T>,
    file_name: &str,
) -> Option<Result<Vec<O>, Error>>
where
    for<'de> O: Deserialize<'de>,
    T: std::io::Read + std::io::Seek,
{
    file_mapping.get(file_name).map(|i| {
        read_objs(
            archive.by_index(*i).map_err(|e| Error::NamedFileIO {
                file_name: file_name.to_owned(),
                source: Box::new(e),
            })?,
            file_name,
        )
    })
}
