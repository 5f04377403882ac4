use anyhow::{bail, Context, Result};
use chrono::NaiveTime;
use gtfs_records::{Agency, FeedInfo, RouteType};
use serde::Deserialize;
use std::path::Path;

use crate::route_model::FrequencyBand;

/// Time band as written in the configuration file, e.g. `{"start_time": "06:00", ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct FrequencyConfig {
    pub start_time: String,
    pub end_time: String,
    pub headway_secs: u32,
}

impl FrequencyConfig {
    fn new(start_time: &str, end_time: &str, headway_secs: u32) -> Self {
        Self {
            start_time: start_time.to_owned(),
            end_time: end_time.to_owned(),
            headway_secs,
        }
    }

    pub fn to_band(&self) -> Result<FrequencyBand> {
        let start_time = gtfs_records::parse_time(&self.start_time)?;
        let end_time = gtfs_records::parse_time(&self.end_time)?;
        if end_time <= start_time {
            bail!(
                "frequency band {}-{} ends before it starts",
                self.start_time,
                self.end_time
            );
        }
        if self.headway_secs == 0 {
            bail!(
                "frequency band {}-{} has a zero headway",
                self.start_time,
                self.end_time
            );
        }
        Ok(FrequencyBand {
            start_time,
            end_time,
            headway_secs: self.headway_secs,
        })
    }
}

/// Settings shared by every route of a run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub agency: Agency,
    pub feed_info: FeedInfo,
    pub default_speed_meter_per_second: f64,
    pub route_type: i32,
    pub start_time: String,
    pub weekdays: [bool; 7],
    pub runs_regularly: bool,
    pub frequencies: Vec<FrequencyConfig>,
    pub stops_prefix: String,
    pub output_dir: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            agency: Agency {
                id: "LaPazBus".to_owned(),
                name: "La Paz Bus".to_owned(),
                url: "http://www.lapazbus.bo/".to_owned(),
                timezone: "agency_timezone".to_owned(),
                lang: "agency_lang".to_owned(),
                email: "agency_email".to_owned(),
            },
            feed_info: FeedInfo {
                feed_id: "feed_id".to_owned(),
                name: "feed_publisher_name".to_owned(),
                url: "feed_publisher_url".to_owned(),
                lang: "feed_lang".to_owned(),
                version: "feed_version".to_owned(),
            },
            // 18 km/h
            default_speed_meter_per_second: 5.0,
            route_type: 700,
            start_time: "06:00:00".to_owned(),
            weekdays: [true; 7],
            runs_regularly: true,
            frequencies: vec![
                FrequencyConfig::new("00:00", "04:00", 30 * 60),
                FrequencyConfig::new("04:00", "11:00", 10 * 60),
                FrequencyConfig::new("11:00", "13:00", 5 * 60),
                FrequencyConfig::new("13:00", "17:00", 10 * 60),
                FrequencyConfig::new("17:00", "23:00", 5 * 60),
                FrequencyConfig::new("23:00", "24:00", 30 * 60),
            ],
            stops_prefix: "stops_".to_owned(),
            output_dir: "out".to_owned(),
        }
    }
}

impl Configuration {
    /// Reads a JSON configuration, missing keys keep their default value
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("impossible to read configuration {}", path.display()))?;
        let configuration: Configuration = serde_json::from_str(&content)
            .with_context(|| format!("invalid configuration {}", path.display()))?;
        configuration
            .validate()
            .with_context(|| format!("invalid configuration {}", path.display()))?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.default_speed_meter_per_second.is_finite()
            && self.default_speed_meter_per_second > 0.0)
        {
            bail!(
                "the default speed must be positive, got {}",
                self.default_speed_meter_per_second
            );
        }
        self.service_start_time()?;
        self.frequency_bands()?;
        Ok(())
    }

    pub fn service_start_time(&self) -> Result<NaiveTime> {
        let seconds = gtfs_records::parse_time(&self.start_time)?;
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .with_context(|| format!("start time {} is not within a day", self.start_time))
    }

    pub fn frequency_bands(&self) -> Result<Vec<FrequencyBand>> {
        self.frequencies.iter().map(FrequencyConfig::to_band).collect()
    }

    pub fn route_type(&self) -> RouteType {
        RouteType::from(self.route_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        let configuration = Configuration::default();
        configuration.validate().unwrap();
        assert_eq!(RouteType::Extended(700), configuration.route_type());
        assert_eq!(
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            configuration.service_start_time().unwrap()
        );
        let bands = configuration.frequency_bands().unwrap();
        assert_eq!(6, bands.len());
        assert_eq!(
            FrequencyBand {
                start_time: 23 * 3600,
                end_time: 24 * 3600,
                headway_secs: 1800,
            },
            bands[5]
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "agency": {{
                    "agency_id": "Metro",
                    "agency_name": "Metro",
                    "agency_url": "https://metro.example",
                    "agency_timezone": "Europe/Paris",
                    "agency_lang": "fr",
                    "agency_email": "contact@metro.example"
                }},
                "default_speed_meter_per_second": 8.5,
                "frequencies": [{{"start_time": "05:30", "end_time": "25:00", "headway_secs": 900}}]
            }}"#
        )
        .unwrap();

        let configuration = Configuration::load(file.path()).unwrap();
        assert_eq!("Metro", configuration.agency.id);
        assert_eq!(8.5, configuration.default_speed_meter_per_second);
        assert_eq!("stops_", configuration.stops_prefix);
        assert_eq!(
            vec![FrequencyBand {
                start_time: 5 * 3600 + 1800,
                end_time: 25 * 3600,
                headway_secs: 900,
            }],
            configuration.frequency_bands().unwrap()
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut configuration = Configuration::default();
        configuration.default_speed_meter_per_second = 0.0;
        assert!(configuration.validate().is_err());

        let mut configuration = Configuration::default();
        configuration.frequencies = vec![FrequencyConfig::new("23:00", "00:00", 1800)];
        assert!(configuration.validate().is_err());

        let mut configuration = Configuration::default();
        configuration.frequencies = vec![FrequencyConfig::new("06:00", "07:00", 0)];
        assert!(configuration.validate().is_err());

        let mut configuration = Configuration::default();
        configuration.start_time = "24:30:00".to_owned();
        assert!(configuration.validate().is_err());
    }
}
