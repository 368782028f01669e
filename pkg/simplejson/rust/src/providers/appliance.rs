// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! `machine_details` reader: scrapes a CSV export from an appliance web UI.
//!
//! A query `model,serial,parameter` first selects the parameter on the
//! appliance (the response only sets session cookies), then downloads the
//! selected window as CSV with the same session. Rows look like
//! `2019/11/20,04:05:00,174152` in the appliance's local offset.

use std::time::Duration;

use anyhow::{Context, bail};
use log::debug;
use reqwest::Url;
use time::format_description::well_known::Iso8601;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::config::ApplianceConfig;
use crate::model::{Point, ProviderResult, Series};
use crate::registry::Reader;
use crate::time_range::TimeRange;

pub const NAME: &str = "machine_details";

/// The three comma-separated parts of a `machine_details` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineQuery<'a> {
    pub model: &'a str,
    pub serial: &'a str,
    pub parameter: &'a str,
}

impl<'a> MachineQuery<'a> {
    pub fn parse(query: &'a str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = query.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [model, serial, parameter]
                if !model.is_empty() && !serial.is_empty() && !parameter.is_empty() =>
            {
                Ok(MachineQuery {
                    model: *model,
                    serial: *serial,
                    parameter: *parameter,
                })
            }
            _ => bail!("machine_details query must be <model>,<serial>,<parameter>, got {query:?}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApplianceReader {
    endpoint: Url,
    product_type: String,
    offset: UtcOffset,
    download_period: u32,
    request_timeout: Duration,
}

impl ApplianceReader {
    pub fn new(base_url: &str, config: &ApplianceConfig) -> anyhow::Result<Self> {
        let offset = UtcOffset::parse(
            &config.utc_offset,
            format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
        )
        .with_context(|| format!("invalid appliance utc_offset {:?}", config.utc_offset))?;
        let endpoint = Url::parse(&format!("{}/index.php", base_url.trim_end_matches('/')))
            .with_context(|| format!("invalid appliance base_url {base_url:?}"))?;

        Ok(ApplianceReader {
            endpoint,
            product_type: config.product_type.clone(),
            offset,
            download_period: config.download_period,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Query values are form-encoded, so reserved characters in the
    /// dashboard query cannot add or cut off parameters.
    fn machine_url(&self, query: &MachineQuery<'_>) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("meost", "")
            .append_pair("productType", &self.product_type)
            .append_pair("modelType", query.model)
            .append_pair("productSerial", query.serial);
        url
    }

    /// Selects the parameter to export; only the session cookies matter.
    pub fn session_url(&self, query: &MachineQuery<'_>) -> Url {
        let mut url = self.machine_url(query);
        url.query_pairs_mut()
            .append_pair("command", "config")
            .append_pair("action", "update")
            .append_pair(query.parameter, "on");
        url
    }

    /// Range bounds are rendered at hour resolution in the appliance offset.
    pub fn download_url(&self, query: &MachineQuery<'_>, range: &TimeRange) -> anyhow::Result<Url> {
        let day = format_description!("[year][month][day]");
        let hour = format_description!("[hour]");
        let start = range.from.to_offset(self.offset);
        let end = range.to.to_offset(self.offset);

        let mut url = self.machine_url(query);
        url.query_pairs_mut()
            .append_pair("command", "download")
            .append_pair("start", &start.format(day)?)
            .append_pair("startTime", &start.format(hour)?)
            .append_pair("end", &end.format(day)?)
            .append_pair("endTime", &end.format(hour)?)
            .append_pair("download_period", &self.download_period.to_string())
            .append_pair("csv", "Download CSV");
        Ok(url)
    }

    fn fetch_csv(&self, session_url: Url, download_url: Url) -> anyhow::Result<String> {
        // One client per call so concurrent reads never share cookies.
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .timeout(self.request_timeout)
            .build()
            .context("building HTTP client")?;

        debug!("Opening appliance session: {session_url}");
        client
            .get(session_url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("opening session at {session_url}"))?;

        debug!("Downloading appliance CSV: {download_url}");
        client
            .get(download_url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .with_context(|| format!("downloading {download_url}"))
    }
}

impl Reader for ApplianceReader {
    fn read(&self, query: &str, range: &TimeRange) -> anyhow::Result<ProviderResult> {
        let query = MachineQuery::parse(query)?;
        let session_url = self.session_url(&query);
        let download_url = self.download_url(&query, range)?;
        let body = self.fetch_csv(session_url, download_url)?;
        let points = parse_csv(&body, self.offset)?;
        debug!("Parsed {} samples for {}", points.len(), query.serial);
        Ok(Series::named("value", points).into())
    }

    /// Samples are already at the appliance's download period.
    fn resamples(&self) -> bool {
        false
    }
}

/// Keeps rows with a date, a time and a non-empty value; the header row
/// and rows that fail to parse are skipped.
pub fn parse_csv(body: &str, offset: UtcOffset) -> anyhow::Result<Vec<Point>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record.context("reading CSV record")?;
        let (Some(date), Some(clock), Some(value)) = (record.get(0), record.get(1), record.get(2))
        else {
            continue;
        };
        if date == "Date" || value.is_empty() {
            continue;
        }
        match parse_row(date, clock, value, offset) {
            Some(point) => points.push(point),
            None => debug!("Skipping unparseable CSV row: {record:?}"),
        }
    }
    Ok(points)
}

fn parse_row(date: &str, clock: &str, value: &str, offset: UtcOffset) -> Option<Point> {
    let stamp = format!("{}T{}", date.trim().replace('/', "-"), clock.trim());
    let local = PrimitiveDateTime::parse(&stamp, &Iso8601::DEFAULT).ok()?;
    let time: OffsetDateTime = local.assume_offset(offset);
    let value: f64 = value.trim().parse().ok()?;
    Some(Point::number(time, value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::indexing_slicing)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::{datetime, offset};

    fn reader() -> ApplianceReader {
        ApplianceReader::new("http://appliance.local/", &ApplianceConfig::default()).unwrap()
    }

    fn query() -> MachineQuery<'static> {
        MachineQuery::parse("DD609_Double,EEG283738,MCM216").unwrap()
    }

    #[test]
    fn test_query_needs_three_parts() {
        assert_eq!(query().parameter, "MCM216");
        assert!(MachineQuery::parse("DD609_Double,EEG283738").is_err());
        assert!(MachineQuery::parse("a,b,c,d").is_err());
        assert!(MachineQuery::parse("a,,c").is_err());
    }

    #[test]
    fn test_session_url() {
        assert_eq!(
            reader().session_url(&query()).as_str(),
            "http://appliance.local/index.php?meost=&productType=DishWashers&modelType=DD609_Double\
             &productSerial=EEG283738&command=config&action=update&MCM216=on"
        );
    }

    #[test]
    fn test_download_url_uses_appliance_offset() {
        let range = TimeRange::new(
            datetime!(2019-11-19 15:00:00 UTC),
            datetime!(2019-11-19 21:00:00 UTC),
        );
        assert_eq!(
            reader().download_url(&query(), &range).unwrap().as_str(),
            "http://appliance.local/index.php?meost=&productType=DishWashers&modelType=DD609_Double\
             &productSerial=EEG283738&command=download&start=20191120&startTime=04&end=20191120\
             &endTime=10&download_period=5&csv=Download+CSV"
        );
    }

    #[test]
    fn test_reserved_characters_stay_inside_their_value() {
        let query = MachineQuery::parse("DD609&command=erase,EEG#1,MCM 216").unwrap();
        let url = reader().session_url(&query);
        assert_eq!(
            url.as_str(),
            "http://appliance.local/index.php?meost=&productType=DishWashers\
             &modelType=DD609%26command%3Derase&productSerial=EEG%231\
             &command=config&action=update&MCM+216=on"
        );
        assert!(url.fragment().is_none());

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let commands: Vec<&str> = pairs
            .iter()
            .filter(|(k, _)| k == "command")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(commands, vec!["config"]);
        assert!(pairs.contains(&("modelType".to_string(), "DD609&command=erase".to_string())));
        assert!(pairs.contains(&("productSerial".to_string(), "EEG#1".to_string())));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(ApplianceReader::new("not a url", &ApplianceConfig::default()).is_err());
    }

    #[test]
    fn test_invalid_offset_is_rejected() {
        let config = ApplianceConfig {
            utc_offset: "NZDT".to_string(),
            ..ApplianceConfig::default()
        };
        assert!(ApplianceReader::new("http://appliance.local", &config).is_err());
    }

    #[test]
    fn test_parse_csv_filters_rows() {
        let body = "Date,Time,MCM216\n\
                    2019/11/20,04:05:00,174152\n\
                    2019/11/20,04:10:00,\n\
                    2019/11/20,04:15:00\n\
                    2019/11/20,04:20:00,174160.5,extra\n\
                    \n";
        let points = parse_csv(body, offset!(+13)).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].time, datetime!(2019-11-20 04:05:00 +13));
        assert_eq!(points[0].value, json!(174_152.0));
        assert_eq!(points[1].value, json!(174_160.5));
    }

    #[test]
    fn test_parse_csv_skips_garbage_values() {
        let body = "2019/11/20,04:05:00,n/a\n2019/11/20,not-a-time,1\n2019/11/20,04:10:00,2\n";
        let points = parse_csv(body, offset!(+13)).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].time, datetime!(2019-11-20 04:10:00 +13));
    }

    #[test]
    fn test_appliance_reader_opts_out_of_resampling() {
        assert!(!reader().resamples());
    }
}
