//! Stateless descriptive endpoint, also served on its own by `droidhost-info`.

use axum::{Json, http::Uri};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

const BANNER: &str = "Android Emulator Web API";
const FRONTEND_ONLY_NOTE: &str = "This deployment only serves the front-end. \
     For emulator control, connect to a droidhost-control server with access to a container runtime.";

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub platform: String,
    pub version: &'static str,
}

pub fn platform() -> String {
    format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)
}

pub fn info_payload(path: &str, now: DateTime<Utc>) -> InfoResponse {
    let message = match path {
        "/api" | "/api/" | "/api/info" => FRONTEND_ONLY_NOTE,
        _ => BANNER,
    };
    InfoResponse {
        status: "ok",
        message,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        platform: platform(),
        version: env!("CARGO_PKG_VERSION"),
    }
}

pub async fn info(uri: Uri) -> Json<InfoResponse> {
    Json(info_payload(uri.path(), Utc::now()))
}
