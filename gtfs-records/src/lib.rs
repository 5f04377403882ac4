/*! Records of the [General Transit Feed Specification](https://gtfs.org/) (GTFS) tables that a synthesized feed is made of.

This crate brings [serde](https://serde.rs) structures for the ten tables written by `shape2feed`,
a writer that turns them into csv files and a zip archive, and a reader that parses them back.

## Design decisions

### Column order

A GTFS file is a csv table with a header row. The order of the fields of each record is the column
order of its file, and every record implements [FeedFile] with the same order as a static list.
Nothing is discovered at runtime.

### Use of Enum

Many values are integers that are actually enumerations of certain values. We always use Rust enums,
like [PickupDropOffType], to represent them, and not the integer value.

### Renaming

We strip the object type from the field names (`route_short_name` is [Route::short_name]), the csv
column keeps its full name.

*/
#![warn(missing_docs)]

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate serde_derive;

mod enums;
pub mod error;
pub(crate) mod objects;
mod reader;
mod serde_helpers;
mod writer;


pub use error::Error;
pub use objects::*;
pub use reader::{RawFeed, FEED_FILES};
pub use serde_helpers::{format_time, parse_time};
pub use writer::{write_archive, write_table};
