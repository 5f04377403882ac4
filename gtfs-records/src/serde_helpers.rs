use chrono::NaiveDate;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::Serializer;

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(serde::de::Error::custom)
}

pub fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.format("%Y%m%d").to_string())
}

pub fn parse_time_impl(h: &str, m: &str, s: &str) -> Result<u32, std::num::ParseIntError> {
    let hours: u32 = h.parse()?;
    let minutes: u32 = m.parse()?;
    let seconds: u32 = s.parse()?;
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Parses `HH:MM:SS` (or `HH:MM`) into seconds since the start of the service day.
///
/// Hours are not bounded by 24 since a trip can run past midnight.
pub fn parse_time(s: &str) -> Result<u32, crate::Error> {
    let invalid = || crate::Error::InvalidTime(s.to_owned());
    let parts: Vec<&str> = s.trim().split(':').collect();
    let (hour, min, sec) = match parts.as_slice() {
        [h, m] => (*h, *m, "0"),
        [h, m, sec] => (*h, *m, *sec),
        _ => return Err(invalid()),
    };
    if hour.is_empty() || min.len() != 2 || (parts.len() == 3 && sec.len() != 2) {
        return Err(invalid());
    }
    let minutes: u32 = min.parse().map_err(|_| invalid())?;
    let secs: u32 = sec.parse().map_err(|_| invalid())?;
    if minutes > 59 || secs > 59 {
        return Err(invalid());
    }
    let seconds = parse_time_impl(hour, min, sec).map_err(|_| invalid())?;
    Ok(seconds)
}

/// Formats seconds since the start of the service day as zero padded `HH:MM:SS`, without wrapping at 24 hours
pub fn format_time(time: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        time / 3600,
        time % 3600 / 60,
        time % 60
    )
}

pub fn deserialize_time<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    parse_time(s).map_err(de::Error::custom)
}

pub fn serialize_time<S>(time: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(format_time(*time).as_str())
}

pub fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        &_ => Err(serde::de::Error::custom(format!(
            "Invalid value `{}`, expected 0 or 1",
            s
        ))),
    }
}

pub fn serialize_bool<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

#[test]
fn test_serialize_time() {
    #[derive(Serialize, Deserialize)]
    struct Test {
        #[serde(
            deserialize_with = "deserialize_time",
            serialize_with = "serialize_time"
        )]
        time: u32,
    }
    let data_in = "time\n01:01:01\n";
    let parsed: Test = csv::Reader::from_reader(data_in.as_bytes())
        .deserialize()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(3600 + 60 + 1, parsed.time);

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.serialize(parsed).unwrap();
    let data_out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!(data_in, data_out);
}

#[test]
fn time_past_midnight_does_not_wrap() {
    assert_eq!("24:00:00", format_time(24 * 3600));
    assert_eq!("25:30:05", format_time(25 * 3600 + 30 * 60 + 5));
    assert_eq!(Ok(24 * 3600), parse_time("24:00").map_err(|e| e.to_string()));
    assert_eq!(Ok(6 * 3600 + 100), parse_time("6:01:40").map_err(|e| e.to_string()));
}

#[test]
fn invalid_times_are_rejected() {
    for s in ["", "06", "06:0", "06:00:0", "06:60", "06:00:61", "aa:00:00", "1:2:3:4"] {
        assert!(parse_time(s).is_err(), "{} should not parse", s);
    }
}
