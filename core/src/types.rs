//! Request and response shapes for the processing-service endpoints.
//!
//! # Design
//! Application-side JSON is camelCase, so every type renames its fields with
//! `rename_all = "camelCase"`; the client's case transcoding turns them into
//! the service's snake_case on the way out and back on the way in. Optional
//! filters are `Option`s that serialize to `null` and are dropped from query
//! strings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesParams {
    pub path: String,
    pub glob: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FilesResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FontsResponse {
    pub names: Vec<String>,
}

/// Payload for merging raw CSV observations into one parquet file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggBody {
    pub files: Vec<String>,
    pub filename: String,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AggResponse {
    pub output: String,
}

/// Payload for cutting a butterfly diagram down to a latitude/date window.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimBody {
    pub input_name: String,
    pub output_name: String,
    pub overwrite: bool,
    pub lat_min: Option<i32>,
    pub lat_max: Option<i32>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrimResponse {
    pub output_data: String,
    pub output_info: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarParams {
    pub filename: String,
    pub year: i32,
    pub month: u32,
    /// First weekday of the calendar grid, 0 = Monday.
    pub first: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ObservationDay {
    pub date: String,
    pub obs: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CalendarResponse {
    pub calendar: Vec<Vec<ObservationDay>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawParams {
    pub filename: String,
    pub config_name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DrawResponse {
    /// Base64-encoded PNG.
    pub img: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBody {
    pub input: String,
    pub format: String,
    pub config: String,
    pub dpi: u32,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RenderResponse {
    pub output: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatRangeParams {
    pub input: String,
    pub threshold: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatRangeResponse {
    pub date: Vec<String>,
    pub no: Vec<i64>,
    pub lat_min: Vec<i32>,
    pub lat_max: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case;
    use serde_json::json;

    #[test]
    fn trim_body_serializes_camel_case() {
        let body = TrimBody {
            input_name: "in".into(),
            output_name: "out".into(),
            lat_min: Some(-40),
            ..Default::default()
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputName"], "in");
        assert_eq!(json["latMin"], -40);
        assert!(json["dateEnd"].is_null());
    }

    #[test]
    fn lat_range_response_reads_decoded_keys() {
        let wire = json!({ "date": ["2020-01-01"], "no": [1], "lat_min": [-10], "lat_max": [12] });
        let parsed: LatRangeResponse = serde_json::from_value(case::decode(&wire)).unwrap();
        assert_eq!(parsed.lat_min, vec![-10]);
        assert_eq!(parsed.lat_max, vec![12]);
    }
}
