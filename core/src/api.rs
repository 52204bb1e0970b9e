//! Per-endpoint wrappers over `ApiClient::get` and `ApiClient::post`.
//!
//! Each wrapper fixes a path and the request/response types, and unwraps
//! single-field envelopes (`{"files": [...]}`) to their payload.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{
    AggBody, AggResponse, CalendarParams, CalendarResponse, DrawParams, DrawResponse, FilesParams,
    FilesResponse, FontsResponse, LatRangeParams, LatRangeResponse, ObservationDay, RenderBody,
    RenderResponse, TrimBody, TrimResponse,
};

pub const FILES_PATH: &str = "/api/utils/files";
pub const FONTS_PATH: &str = "/api/utils/fonts";
pub const AGG_PATH: &str = "/api/agg";
pub const BUTTERFLY_TRIM_PATH: &str = "/api/butterfly/trim";
pub const CALENDAR_PATH: &str = "/api/observations/calendar";
pub const LAT_RANGE_PATH: &str = "/api/check/data/lat_range";

impl<T: Transport> ApiClient<T> {
    /// List files under `path` matching `glob` on the service host.
    pub async fn files(&self, path: &str, glob: &str) -> Result<Vec<String>, ApiError> {
        let params = FilesParams {
            path: path.to_string(),
            glob: glob.to_string(),
        };
        let res: FilesResponse = self.get(FILES_PATH, &params).await?;
        Ok(res.files)
    }

    pub async fn fonts(&self) -> Result<Vec<String>, ApiError> {
        let res: FontsResponse = self.get(FONTS_PATH, &()).await?;
        Ok(res.names)
    }

    /// Aggregate CSV files into a parquet file; returns the output path.
    pub async fn agg(&self, body: &AggBody) -> Result<String, ApiError> {
        let res: AggResponse = self.post(AGG_PATH, body).await?;
        Ok(res.output)
    }

    pub async fn butterfly_trim(&self, body: &TrimBody) -> Result<TrimResponse, ApiError> {
        self.post(BUTTERFLY_TRIM_PATH, body).await
    }

    /// Observation calendar for one month, as weeks of days.
    pub async fn observations_calendar(
        &self,
        params: &CalendarParams,
    ) -> Result<Vec<Vec<ObservationDay>>, ApiError> {
        let res: CalendarResponse = self.get(CALENDAR_PATH, params).await?;
        Ok(res.calendar)
    }

    pub async fn check_lat_range(&self, params: &LatRangeParams) -> Result<LatRangeResponse, ApiError> {
        self.get(LAT_RANGE_PATH, params).await
    }

    /// Preview a diagram from a dataset's draw endpoint; returns base64 PNG.
    pub async fn draw(&self, path: &str, params: &DrawParams) -> Result<String, ApiError> {
        let res: DrawResponse = self.get(path, params).await?;
        Ok(res.img)
    }

    /// Render a diagram to a file; returns the output path.
    pub async fn render(&self, path: &str, body: &RenderBody) -> Result<String, ApiError> {
        let res: RenderResponse = self.post(path, body).await?;
        Ok(res.output)
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Mutex;

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportError};

    /// Answers every request with one canned body and remembers the request.
    struct Canned {
        body: &'static str,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn client(body: &'static str) -> ApiClient<Canned> {
            ApiClient::new(
                "http://svc",
                Canned {
                    body,
                    seen: Mutex::new(Vec::new()),
                },
            )
        }
    }

    impl Transport for Canned {
        fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
            self.seen.lock().unwrap().push(request);
            let body = self.body.to_string();
            async move {
                Ok(HttpResponse {
                    status: 200,
                    headers: Vec::new(),
                    body,
                })
            }
        }
    }

    fn last_request(client: &ApiClient<Canned>) -> HttpRequest {
        client.transport().seen.lock().unwrap().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn draw_sends_snake_case_query() {
        let client = Canned::client(r#"{"img": "iVBORw0KGgo="}"#);
        let params = DrawParams {
            filename: "out/merged.parquet".into(),
            config_name: "default".into(),
        };
        let img = client.draw("/api/butterfly/draw", &params).await.unwrap();
        assert_eq!(img, "iVBORw0KGgo=");

        let req = last_request(&client);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.path,
            "http://svc/api/butterfly/draw?filename=out%2Fmerged.parquet&config_name=default"
        );
    }

    #[tokio::test]
    async fn render_posts_snake_case_body() {
        let client = Canned::client(r#"{"output": "out/plot.png"}"#);
        let body = RenderBody {
            input: "out/merged.parquet".into(),
            format: "png".into(),
            config: "default".into(),
            dpi: 300,
            overwrite: true,
        };
        let output = client.render("/api/butterfly/draw", &body).await.unwrap();
        assert_eq!(output, "out/plot.png");

        let req = last_request(&client);
        assert_eq!(req.method, HttpMethod::Post);
        let sent: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["dpi"], 300);
        assert_eq!(sent["overwrite"], true);
    }

    #[tokio::test]
    async fn fonts_unwraps_names() {
        let client = Canned::client(r#"{"names": ["DejaVu Sans"]}"#);
        assert_eq!(client.fonts().await.unwrap(), vec!["DejaVu Sans"]);
        assert_eq!(last_request(&client).path, "http://svc/api/utils/fonts");
    }
}
