//! Module for the error management
use thiserror::Error;

/// Specific line from a CSV file that could not be read
#[derive(Debug)]
pub struct LineError {
    /// Headers of the CSV file
    pub headers: Vec<String>,
    /// Values of the line that could not be parsed
    pub values: Vec<String>,
}

/// An error that can occur when writing or reading back GTFS tables.
#[derive(Error, Debug)]
pub enum Error {
    /// A mandatory file is not present in the feed
    #[error("Could not find file {0}")]
    MissingFile(String),
    /// The given path to the feed is neither a file nor a directory
    #[error("Could not read feed: {0} is neither a file nor a directory")]
    NotFileNorDirectory(String),
    /// The time is not given in the HH:MM:SS format
    #[error("'{0}' is not a valid time; HH:MM:SS format is expected.")]
    InvalidTime(String),
    /// Generic Input/Output error
    #[error("impossible to access file")]
    IO(#[from] std::io::Error),
    /// Impossible to read or write a named file
    #[error("impossible to access '{file_name}'")]
    NamedFileIO {
        /// The file name that could not be accessed
        file_name: String,
        /// The initial error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Impossible to read or write a CSV file
    #[error("invalid csv in file '{file_name}'")]
    CSVError {
        /// File name that could not be handled as CSV
        file_name: String,
        /// The initial error by the csv library
        #[source]
        source: csv::Error,
        /// The line that could not be parsed by the csv library
        line_in_error: Option<LineError>,
    },
    /// Error while building or reading the zip archive
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}
