use crate::objects::FeedFile;
use crate::Error;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes `rows` to `<dir>/<T::FILE_NAME>`, header first.
///
/// An empty table produces no file and `None` is returned. Records are comma separated, `\n`
/// terminated and UTF-8 encoded whatever the platform.
pub fn write_table<T>(dir: &Path, rows: &[T]) -> Result<Option<PathBuf>, Error>
where
    T: FeedFile + Serialize,
{
    if rows.is_empty() {
        return Ok(None);
    }
    let path = dir.join(T::FILE_NAME);
    let csv_error = |source| Error::CSVError {
        file_name: T::FILE_NAME.to_owned(),
        source,
        line_in_error: None,
    };

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(&path)
        .map_err(csv_error)?;
    wtr.write_record(T::COLUMNS).map_err(csv_error)?;
    for row in rows {
        wtr.serialize(row).map_err(csv_error)?;
    }
    wtr.flush().map_err(|e| Error::NamedFileIO {
        file_name: T::FILE_NAME.to_owned(),
        source: Box::new(e),
    })?;

    Ok(Some(path))
}

/// Bundles `files` of `dir` into a fresh zip archive at `archive_path`, each under its base name.
///
/// The archive is first built next to its destination with a `.part` suffix and only renamed into
/// place once complete, so a failure never leaves an archive that looks finished.
pub fn write_archive(archive_path: &Path, dir: &Path, files: &[&str]) -> Result<(), Error> {
    let mut part_name = archive_path.as_os_str().to_owned();
    part_name.push(".part");
    let part_path = PathBuf::from(part_name);

    let result = zip_files(&part_path, dir, files)
        .and_then(|_| std::fs::rename(&part_path, archive_path).map_err(Error::from));
    if result.is_err() && part_path.exists() {
        let _ = std::fs::remove_file(&part_path);
    }
    result
}

fn zip_files(part_path: &Path, dir: &Path, files: &[&str]) -> Result<(), Error> {
    let archive = File::create(part_path).map_err(|e| Error::NamedFileIO {
        file_name: part_path.display().to_string(),
        source: Box::new(e),
    })?;
    let mut zip = zip::ZipWriter::new(archive);
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for file_name in files {
        let content = std::fs::read(dir.join(file_name)).map_err(|e| Error::NamedFileIO {
            file_name: (*file_name).to_owned(),
            source: Box::new(e),
        })?;
        zip.start_file(*file_name, options)?;
        zip.write_all(&content)?;
    }
    zip.finish()?;
    Ok(())
}
