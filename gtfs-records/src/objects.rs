pub use crate::enums::*;
use crate::serde_helpers::*;
use chrono::NaiveDate;

/// Objects that have an identifier implement this trait
///
/// Those identifier are technical and should not be shown to travellers
pub trait Id {
    /// Identifier of the object
    fn id(&self) -> &str;
}

/// A record that is one row of a GTFS file
///
/// [FeedFile::COLUMNS] is the header of the file. It lists the csv names of the fields in the order
/// they are declared, which is also the order serde writes them in.
pub trait FeedFile {
    /// Name of the file inside the feed, e.g. `stops.txt`
    const FILE_NAME: &'static str;
    /// Header of the file
    const COLUMNS: &'static [&'static str];
}

/// General informations about the agency running the network. See <https://gtfs.org/reference/static/#agencytxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Agency {
    /// Unique technical (not for the traveller) identifier for the Agency
    #[serde(rename = "agency_id")]
    pub id: String,
    ///Full name of the transit agency
    #[serde(rename = "agency_name")]
    pub name: String,
    /// URL of the transit agency
    #[serde(rename = "agency_url")]
    pub url: String,
    /// Timezone where the transit agency is located
    #[serde(rename = "agency_timezone")]
    pub timezone: String,
    /// Primary language used by this transit agency
    #[serde(rename = "agency_lang")]
    pub lang: String,
    /// Email address actively monitored by the agency’s customer service department
    #[serde(rename = "agency_email")]
    pub email: String,
}

impl FeedFile for Agency {
    const FILE_NAME: &'static str = "agency.txt";
    const COLUMNS: &'static [&'static str] = &[
        "agency_id",
        "agency_name",
        "agency_url",
        "agency_timezone",
        "agency_lang",
        "agency_email",
    ];
}

impl Id for Agency {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Metadata about the feed itself. See <https://gtfs.org/reference/static/#feed_infotxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct FeedInfo {
    /// Identifier of the feed
    pub feed_id: String,
    /// Full name of the organization that publishes the feed
    #[serde(rename = "feed_publisher_name")]
    pub name: String,
    /// URL of the feed publishing organization's website
    #[serde(rename = "feed_publisher_url")]
    pub url: String,
    /// Default language used for the text in this feed
    #[serde(rename = "feed_lang")]
    pub lang: String,
    /// String that indicates the current version of their GTFS feed
    #[serde(rename = "feed_version")]
    pub version: String,
}

impl FeedFile for FeedInfo {
    const FILE_NAME: &'static str = "feed_info.txt";
    const COLUMNS: &'static [&'static str] = &[
        "feed_id",
        "feed_publisher_name",
        "feed_publisher_url",
        "feed_lang",
        "feed_version",
    ];
}

/// A route is a commercial line. See <https://gtfs.org/reference/static/#routestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Route {
    /// Agency operating the route
    pub agency_id: String,
    /// Unique technical (not for the traveller) identifier for the route
    #[serde(rename = "route_id")]
    pub id: String,
    /// Full name of a route
    #[serde(rename = "route_long_name")]
    pub long_name: String,
    /// Indicates the type of transportation used on a route
    pub route_type: RouteType,
    /// URL of a web page about the particular route
    #[serde(rename = "route_url")]
    pub url: Option<String>,
    /// Short name of a route, often the number riders know it by
    #[serde(rename = "route_short_name")]
    pub short_name: String,
}

impl FeedFile for Route {
    const FILE_NAME: &'static str = "routes.txt";
    const COLUMNS: &'static [&'static str] = &[
        "agency_id",
        "route_id",
        "route_long_name",
        "route_type",
        "route_url",
        "route_short_name",
    ];
}

impl Id for Route {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A Trip is a vehicle that follows a sequence of [StopTime] on certain days. See <https://gtfs.org/reference/static/#tripstxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Trip {
    /// References along which [Route] this trip runs
    pub route_id: String,
    /// Unique technical identifier (not for the traveller) for the Trip
    #[serde(rename = "trip_id")]
    pub id: String,
    /// References the [Calendar] on which this trip runs
    pub service_id: String,
    /// Shape of the trip
    pub shape_id: String,
    /// Text that appears on signage identifying the trip's destination to riders
    #[serde(rename = "trip_headsign")]
    pub headsign: String,
    /// Indicates whether bikes are allowed
    pub bikes_allowed: BikesAllowedType,
}

impl FeedFile for Trip {
    const FILE_NAME: &'static str = "trips.txt";
    const COLUMNS: &'static [&'static str] = &[
        "route_id",
        "trip_id",
        "service_id",
        "shape_id",
        "trip_headsign",
        "bikes_allowed",
    ];
}

impl Id for Trip {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A physical stop. See <https://gtfs.org/reference/static/#stopstxt>
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Stop {
    /// Unique technical identifier (not for the traveller) of the stop
    #[serde(rename = "stop_id")]
    pub id: String,
    /// Latitude of the stop
    #[serde(rename = "stop_lat")]
    pub latitude: f64,
    /// Longitude of the stop
    #[serde(rename = "stop_lon")]
    pub longitude: f64,
    ///Name of the location. Use a name that people will understand in the local and tourist vernacular
    #[serde(rename = "stop_name")]
    pub name: String,
}

impl FeedFile for Stop {
    const FILE_NAME: &'static str = "stops.txt";
    const COLUMNS: &'static [&'static str] = &["stop_id", "stop_lat", "stop_lon", "stop_name"];
}

impl Id for Stop {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The moment where a vehicle, running on [Trip] stops at a [Stop]. See <https://gtfs.org/reference/static/#stop_timestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct StopTime {
    /// [Trip] to which this stop time belongs to
    pub trip_id: String,
    /// Arrival time, in seconds since the start of the service day
    #[serde(
        deserialize_with = "deserialize_time",
        serialize_with = "serialize_time"
    )]
    pub arrival_time: u32,
    /// Departure time, in seconds since the start of the service day
    #[serde(
        deserialize_with = "deserialize_time",
        serialize_with = "serialize_time"
    )]
    pub departure_time: u32,
    /// Identifier of the [Stop] where the vehicle stops
    pub stop_id: String,
    /// Order of stops for a particular trip, starting at 1
    pub stop_sequence: u32,
    /// Indicates pickup method
    #[serde(default)]
    pub pickup_type: PickupDropOffType,
    /// Indicates drop off method
    #[serde(default)]
    pub drop_off_type: PickupDropOffType,
    /// Indicates if arrival and departure times for a stop are strictly adhered to by the vehicle or if they are instead approximate and/or interpolated times
    #[serde(default)]
    pub timepoint: TimepointType,
}

impl FeedFile for StopTime {
    const FILE_NAME: &'static str = "stop_times.txt";
    const COLUMNS: &'static [&'static str] = &[
        "trip_id",
        "arrival_time",
        "departure_time",
        "stop_id",
        "stop_sequence",
        "pickup_type",
        "drop_off_type",
        "timepoint",
    ];
}

/// A calender describes on which days the vehicle runs. See <https://gtfs.org/reference/static/#calendartxt>
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Calendar {
    /// Unique technical identifier (not for the traveller) of this calendar
    #[serde(rename = "service_id")]
    pub id: String,
    /// Start service day for the service interval
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub start_date: NaiveDate,
    /// End service day for the service interval
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub end_date: NaiveDate,
    /// Does the service run on mondays
    #[serde(
        deserialize_with = "deserialize_bool",
        serialize_with = "serialize_bool"
    )]
    pub monday: bool,
    /// Does the service run on tuesdays
    #[serde(
        deserialize_with = "deserialize_bool",
        serialize_with = "serialize_bool"
    )]
    pub tuesday: bool,
    /// Does the service run on wednesdays
    #[serde(
        deserialize_with = "deserialize_bool",
        serialize_with = "serialize_bool"
    )]
    pub wednesday: bool,
    /// Does the service run on thursdays
    #[serde(
        deserialize_with = "deserialize_bool",
        serialize_with = "serialize_bool"
    )]
    pub thursday: bool,
    /// Does the service run on fridays
    #[serde(
        deserialize_with = "deserialize_bool",
        serialize_with = "serialize_bool"
    )]
    pub friday: bool,
    /// Does the service run on saturdays
    #[serde(
        deserialize_with = "deserialize_bool",
        serialize_with = "serialize_bool"
    )]
    pub saturday: bool,
    /// Does the service run on sundays
    #[serde(
        deserialize_with = "deserialize_bool",
        serialize_with = "serialize_bool"
    )]
    pub sunday: bool,
}

impl FeedFile for Calendar {
    const FILE_NAME: &'static str = "calendar.txt";
    const COLUMNS: &'static [&'static str] = &[
        "service_id",
        "start_date",
        "end_date",
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ];
}

impl Id for Calendar {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Calendar {
    /// Builds a calendar from weekday flags, Monday first
    pub fn from_weekdays(
        id: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        weekdays: [bool; 7],
    ) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = weekdays;
        Calendar {
            id,
            start_date,
            end_date,
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
        }
    }
}

/// Defines a specific date that can be added or removed from a [Calendar]. See <https://gtfs.org/reference/static/#calendar_datestxt>
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CalendarDate {
    /// Identifier of the service that is modified at this date
    pub service_id: String,
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    /// Date where the service will be added or deleted
    pub date: NaiveDate,
    /// Is the service added or deleted
    pub exception_type: Exception,
}

impl FeedFile for CalendarDate {
    const FILE_NAME: &'static str = "calendar_dates.txt";
    const COLUMNS: &'static [&'static str] = &["service_id", "date", "exception_type"];
}

/// Timetables can be defined by the frequency of their vehicles. See <https://gtfs.org/reference/static/#frequenciestxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Frequency {
    /// References the [Trip] that uses frequency
    pub trip_id: String,
    /// Time at which the first vehicle departs from the first stop of the trip
    #[serde(
        deserialize_with = "deserialize_time",
        serialize_with = "serialize_time"
    )]
    pub start_time: u32,
    /// Time at which service changes to a different headway (or ceases) at the first stop in the trip
    #[serde(
        deserialize_with = "deserialize_time",
        serialize_with = "serialize_time"
    )]
    pub end_time: u32,
    /// Time, in seconds, between departures from the same stop (headway) for the trip, during the time interval specified by start_time and end_time
    pub headway_secs: u32,
    /// Indicates the type of service for a trip
    pub exact_times: ExactTimes,
}

impl FeedFile for Frequency {
    const FILE_NAME: &'static str = "frequencies.txt";
    const COLUMNS: &'static [&'static str] = &[
        "trip_id",
        "start_time",
        "end_time",
        "headway_secs",
        "exact_times",
    ];
}

/// A single geographical point decribing the shape of a [Trip]. See <https://gtfs.org/reference/static/#shapestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Shape {
    /// Unique technical (not for the traveller) identifier for the Shape
    #[serde(rename = "shape_id")]
    pub id: String,
    #[serde(rename = "shape_pt_lat")]
    /// Latitude of a shape point
    pub latitude: f64,
    /// Longitude of a shape point
    #[serde(rename = "shape_pt_lon")]
    pub longitude: f64,
    /// Sequence in which the shape points connect to form the shape, starting at 1
    #[serde(rename = "shape_pt_sequence")]
    pub sequence: usize,
}

impl FeedFile for Shape {
    const FILE_NAME: &'static str = "shapes.txt";
    const COLUMNS: &'static [&'static str] = &[
        "shape_id",
        "shape_pt_lat",
        "shape_pt_lon",
        "shape_pt_sequence",
    ];
}

impl Id for Shape {
    fn id(&self) -> &str {
        &self.id
    }
}
