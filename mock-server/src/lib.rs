use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

/// In-memory stand-in for the processing service's file system.
#[derive(Debug, Default)]
pub struct Store {
    /// Files the service can read.
    pub inputs: HashSet<String>,
    /// Files the service has written.
    pub outputs: HashSet<String>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error reply in the service's `{"detail": ...}` shape.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    detail: String,
}

impl Failure {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<JsonRejection> for Failure {
    fn from(rejection: JsonRejection) -> Self {
        Failure::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    }
}

impl From<QueryRejection> for Failure {
    fn from(rejection: QueryRejection) -> Self {
        Failure::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    }
}

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    pub path: String,
    pub glob: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilesRes {
    pub files: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FontsRes {
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AggMain {
    pub files: Vec<String>,
    pub filename: String,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AggMainRes {
    pub output: String,
}

#[derive(Debug, Deserialize)]
pub struct ButterflyTrim {
    pub input_name: String,
    pub output_name: String,
    #[serde(default)]
    pub overwrite: bool,
    pub lat_min: Option<i32>,
    pub lat_max: Option<i32>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ButterflyTrimRes {
    pub output_data: String,
    pub output_info: String,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub filename: String,
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub first: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObsDay {
    pub date: String,
    pub obs: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarRes {
    pub calendar: Vec<Vec<ObsDay>>,
}

#[derive(Debug, Deserialize)]
pub struct LatRangeQuery {
    pub input: String,
    pub threshold: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LatRangeRes {
    pub date: Vec<String>,
    pub no: Vec<i64>,
    pub lat_min: Vec<i32>,
    pub lat_max: Vec<i32>,
}

pub const FONTS: &[&str] = &["DejaVu Sans", "Noto Serif", "Source Code Pro"];

/// App seeded with a few readable input files.
pub fn app() -> Router {
    let store = Store {
        inputs: [
            "data/raw/2020-01.csv",
            "data/raw/2020-02.csv",
            "data/raw/notes.txt",
            "data/butterfly/base.parquet",
            "data/butterfly/base.json",
            "data/observations.parquet",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        outputs: HashSet::new(),
    };
    app_with(store)
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/utils/files", get(files))
        .route("/api/utils/fonts", get(fonts))
        .route("/api/agg", post(agg))
        .route("/api/butterfly/trim", post(butterfly_trim))
        .route("/api/observations/calendar", get(calendar))
        .route("/api/check/data/lat_range", get(lat_range))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn files(
    State(db): State<Db>,
    query: Result<Query<FilesQuery>, QueryRejection>,
) -> Result<Json<FilesRes>, Failure> {
    let Query(query) = query?;
    let dir = format!("{}/", query.path.trim_end_matches('/'));
    let store = db.read().await;
    let mut files: Vec<String> = store
        .inputs
        .iter()
        .filter(|f| f.strip_prefix(&dir).is_some_and(|name| glob_match(&query.glob, name)))
        .cloned()
        .collect();
    files.sort();
    Ok(Json(FilesRes { files }))
}

async fn fonts() -> Json<FontsRes> {
    Json(FontsRes {
        names: FONTS.iter().map(|s| s.to_string()).collect(),
    })
}

async fn agg(
    State(db): State<Db>,
    body: Result<Json<AggMain>, JsonRejection>,
) -> Result<Json<AggMainRes>, Failure> {
    let Json(body) = body?;
    let mut store = db.write().await;
    if let Some(missing) = body.files.iter().find(|f| !store.inputs.contains(*f)) {
        return Err(Failure::new(StatusCode::NOT_FOUND, format!("file {missing} not found")));
    }
    let output = format!("out/{}.parquet", body.filename);
    if !body.overwrite && store.outputs.contains(&output) {
        return Err(Failure::new(StatusCode::BAD_REQUEST, format!("file {output} already exists")));
    }
    store.outputs.insert(output.clone());
    tracing::info!(%output, inputs = body.files.len(), "aggregated");
    Ok(Json(AggMainRes { output }))
}

async fn butterfly_trim(
    State(db): State<Db>,
    body: Result<Json<ButterflyTrim>, JsonRejection>,
) -> Result<Json<ButterflyTrimRes>, Failure> {
    let Json(body) = body?;
    let mut store = db.write().await;
    for ext in ["parquet", "json"] {
        let input = format!("{}.{ext}", body.input_name);
        if !store.inputs.contains(&input) {
            return Err(Failure::new(StatusCode::NOT_FOUND, format!("file {input} not found")));
        }
    }
    if let (Some(min), Some(max)) = (body.lat_min, body.lat_max) {
        if min > max {
            return Err(Failure::new(StatusCode::BAD_REQUEST, "lat_min must not exceed lat_max"));
        }
    }
    if let (Some(start), Some(end)) = (&body.date_start, &body.date_end) {
        if start > end {
            return Err(Failure::new(StatusCode::BAD_REQUEST, "date_start must not be after date_end"));
        }
    }
    let output_data = format!("out/butterfly/{}.parquet", body.output_name);
    let output_info = format!("out/butterfly/{}.json", body.output_name);
    for path in [&output_data, &output_info] {
        if !body.overwrite && store.outputs.contains(path) {
            return Err(Failure::new(StatusCode::BAD_REQUEST, format!("file {path} already exists")));
        }
    }
    store.outputs.insert(output_data.clone());
    store.outputs.insert(output_info.clone());
    Ok(Json(ButterflyTrimRes {
        output_data,
        output_info,
    }))
}

async fn calendar(
    State(db): State<Db>,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Result<Json<CalendarRes>, Failure> {
    let Query(query) = query?;
    if !db.read().await.inputs.contains(&query.filename) {
        return Err(Failure::new(
            StatusCode::NOT_FOUND,
            format!("file {} not found", query.filename),
        ));
    }
    let first = u8::try_from(query.first)
        .ok()
        .and_then(|first| Weekday::try_from(first).ok())
        .ok_or_else(|| Failure::new(StatusCode::BAD_REQUEST, "first must be a weekday index 0-6"))?;
    let calendar = month_calendar(query.year, query.month, first).ok_or_else(|| {
        Failure::new(
            StatusCode::BAD_REQUEST,
            format!("invalid month {}-{:02}", query.year, query.month),
        )
    })?;
    Ok(Json(CalendarRes { calendar }))
}

async fn lat_range(
    State(db): State<Db>,
    query: Result<Query<LatRangeQuery>, QueryRejection>,
) -> Result<Json<LatRangeRes>, Failure> {
    let Query(query) = query?;
    if !db.read().await.inputs.contains(&query.input) {
        return Err(Failure::new(StatusCode::NOT_FOUND, format!("file {} not found", query.input)));
    }
    let threshold = i32::try_from(query.threshold).map_err(|_| {
        Failure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("threshold {} is out of range", query.threshold),
        )
    })?;
    Ok(Json(LatRangeRes {
        date: vec!["2020-01-01".into(), "2020-01-02".into()],
        no: vec![1, 2],
        lat_min: vec![-threshold, (-threshold).saturating_sub(5)],
        lat_max: vec![threshold, threshold.saturating_add(5)],
    }))
}

/// `*` matches any run of characters; everything else is literal.
fn glob_match(pattern: &str, name: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == name,
        Some((head, tail)) => {
            let Some(rest) = name.strip_prefix(head) else {
                return false;
            };
            if tail.is_empty() {
                return true;
            }
            (0..=rest.len())
                .filter(|&i| rest.is_char_boundary(i))
                .any(|i| glob_match(tail, &rest[i..]))
        }
    }
}

/// Whole weeks covering `month`, starting on weekday `first`.
/// Days are observed unless their day-of-month is a multiple of 3.
///
/// `None` when `year`/`month` do not name a representable month.
fn month_calendar(year: i32, month: u32, first: Weekday) -> Option<Vec<Vec<ObsDay>>> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?;

    let offset = (start.weekday().num_days_from_monday() + 7 - first.num_days_from_monday()) % 7;
    let mut day = start.checked_sub_days(Days::new(u64::from(offset)))?;
    let mut weeks = Vec::new();
    while day < end {
        let mut week = Vec::with_capacity(7);
        for _ in 0..7 {
            week.push(ObsDay {
                date: day.format("%Y-%m-%d").to_string(),
                obs: day.day() % 3 != 0,
            });
            day = day.succ_opt()?;
        }
        weeks.push(week);
    }
    Some(weeks)
}
