use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Serialize;

use crate::state::AppState;

const MSG_ALREADY_RUNNING: &str = "already running";
const MSG_STARTING: &str = "starting, wait 1-2 minutes";
const MSG_STOPPED: &str = "stopped";

/// Body shared by every `/api` endpoint. Failures are reported here with
/// `status: "error"` and an HTTP 200, never as a 5xx.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emulator_info: Option<String>,
}

impl StatusResponse {
    fn ok() -> Self {
        Self {
            status: "ok",
            ..Default::default()
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let running = state.session.is_running();
    let mut resp = StatusResponse {
        running: Some(running),
        ..StatusResponse::ok()
    };
    if running {
        resp.vnc_url = Some(state.config.display_url());
        resp.emulator_info = Some(state.config.emulator_info.clone());
    }
    Json(resp)
}

pub async fn check_docker(State(state): State<AppState>) -> Json<StatusResponse> {
    match state.runtime.version().await {
        Ok(version) => Json(StatusResponse {
            message: Some(version),
            ..StatusResponse::ok()
        }),
        Err(err) => {
            tracing::warn!(%err, runtime = state.runtime.binary(), "container runtime probe failed");
            Json(StatusResponse::error(format!(
                "container runtime `{}` not found, install Docker first",
                state.runtime.binary()
            )))
        }
    }
}

pub async fn start(State(state): State<AppState>) -> Json<StatusResponse> {
    let vnc_url = state.config.display_url();

    if state.session.is_running() {
        return Json(StatusResponse {
            running: Some(true),
            message: Some(MSG_ALREADY_RUNNING.to_string()),
            vnc_url: Some(vnc_url),
            ..StatusResponse::ok()
        });
    }

    // The session lock is not held from here on: the runtime calls below can
    // take minutes while the image is pulled.
    let name = state.config.container_name.as_str();
    state.runtime.discard(name).await;

    tracing::info!(container = name, image = %state.config.image, "starting emulator container");
    let handle = match state.runtime.run_detached(&state.config.container_spec()).await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::warn!(%err, container = name, "emulator container failed to start");
            return Json(StatusResponse::error(format!("failed to start: {err}")));
        }
    };

    tracing::info!(container = name, handle = handle.trim(), "emulator container started");
    state.session.mark_started(handle);

    Json(StatusResponse {
        running: Some(true),
        message: Some(MSG_STARTING.to_string()),
        vnc_url: Some(vnc_url),
        ..StatusResponse::ok()
    })
}

/// Always reports success: cleanup failures are swallowed and the session is
/// marked stopped whatever the runtime says.
pub async fn stop(State(state): State<AppState>) -> Json<StatusResponse> {
    let name = state.config.container_name.as_str();
    state.runtime.discard(name).await;

    let (_, handle) = state.session.snapshot();
    state.session.mark_stopped();
    tracing::info!(container = name, handle = handle.trim(), "emulator session stopped");

    Json(StatusResponse {
        running: Some(false),
        message: Some(MSG_STOPPED.to_string()),
        ..StatusResponse::ok()
    })
}

/// Unconditional; does not check whether a session is running.
pub async fn vnc_redirect(State(state): State<AppState>) -> impl IntoResponse {
    Redirect::temporary(&state.config.display_url())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{ScriptedRunner, state_with};

    #[tokio::test]
    async fn status_before_start_omits_display_fields() {
        let (state, runner) = state_with(ScriptedRunner::default());

        let Json(resp) = status(State(state)).await;
        let body = serde_json::to_value(&resp).unwrap();
        assert_eq!(body, serde_json::json!({"status": "ok", "running": false}));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn start_then_status_reports_display_url() {
        let (state, runner) = state_with(ScriptedRunner::default());

        let Json(resp) = start(State(state.clone())).await;
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.running, Some(true));
        assert_eq!(resp.message.as_deref(), Some(MSG_STARTING));
        assert_eq!(resp.vnc_url.as_deref(), Some("http://localhost:6080"));

        assert_eq!(
            runner.calls(),
            vec![
                "stop android-web".to_string(),
                "rm android-web".to_string(),
                state.config.container_spec().run_args().join(" "),
            ]
        );
        assert_eq!(state.session.snapshot(), (true, "c0ffee\n".to_string()));

        let Json(resp) = status(State(state)).await;
        assert_eq!(resp.running, Some(true));
        assert_eq!(resp.vnc_url.as_deref(), Some("http://localhost:6080"));
        assert_eq!(resp.emulator_info.as_deref(), Some("Android 11 (Docker)"));
    }

    #[tokio::test]
    async fn repeated_start_is_idempotent() {
        let (state, runner) = state_with(ScriptedRunner::default());

        start(State(state.clone())).await;
        for _ in 0..3 {
            let Json(resp) = start(State(state.clone())).await;
            assert_eq!(resp.status, "ok");
            assert_eq!(resp.running, Some(true));
            assert_eq!(resp.message.as_deref(), Some(MSG_ALREADY_RUNNING));
            assert_eq!(resp.vnc_url.as_deref(), Some("http://localhost:6080"));
        }
        assert_eq!(runner.run_count(), 1);
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn failed_run_leaves_session_stopped() {
        let (state, _) = state_with(ScriptedRunner {
            run_exit: 125,
            ..Default::default()
        });

        let Json(resp) = start(State(state.clone())).await;
        assert_eq!(resp.status, "error");
        assert_eq!(resp.running, None);
        let msg = resp.message.unwrap();
        assert!(msg.starts_with("failed to start: exit status 125"), "{msg}");

        let Json(resp) = status(State(state)).await;
        assert_eq!(resp.running, Some(false));
        assert_eq!(resp.vnc_url, None);
    }

    #[tokio::test]
    async fn start_without_runtime_reports_spawn_error() {
        let (state, _) = state_with(ScriptedRunner {
            spawn_fails: true,
            ..Default::default()
        });

        let Json(resp) = start(State(state.clone())).await;
        assert_eq!(resp.status, "error");
        assert!(resp.message.unwrap().starts_with("failed to start: exec `docker`"));
        assert!(!state.session.is_running());
    }

    #[tokio::test]
    async fn stop_clears_state_even_when_runtime_fails() {
        let (state, runner) = state_with(ScriptedRunner {
            cleanup_exit: 1,
            ..Default::default()
        });
        state.session.mark_started("c0ffee\n");

        let Json(resp) = stop(State(state.clone())).await;
        assert_eq!(
            resp,
            StatusResponse {
                status: "ok",
                running: Some(false),
                message: Some(MSG_STOPPED.to_string()),
                ..Default::default()
            }
        );
        assert_eq!(state.session.snapshot(), (false, String::new()));
        assert_eq!(runner.calls(), vec!["stop android-web", "rm android-web"]);
    }

    #[tokio::test]
    async fn stop_succeeds_when_runtime_is_missing() {
        let (state, _) = state_with(ScriptedRunner {
            spawn_fails: true,
            ..Default::default()
        });
        state.session.mark_started("c0ffee\n");

        let Json(resp) = stop(State(state.clone())).await;
        assert_eq!(resp.status, "ok");
        assert!(!state.session.is_running());
    }

    #[tokio::test]
    async fn check_docker_returns_raw_version() {
        let (state, runner) = state_with(ScriptedRunner::default());

        let Json(resp) = check_docker(State(state.clone())).await;
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.message.as_deref(), Some("Docker version 27.1.1, build 6312585\n"));
        assert_eq!(resp.running, None);
        assert_eq!(runner.calls(), vec!["--version"]);
        assert!(!state.session.is_running());
    }

    #[tokio::test]
    async fn check_docker_failure_is_an_error_body() {
        for runner in [
            ScriptedRunner {
                version_exit: 127,
                ..Default::default()
            },
            ScriptedRunner {
                spawn_fails: true,
                ..Default::default()
            },
        ] {
            let (state, _) = state_with(runner);
            let Json(resp) = check_docker(State(state)).await;
            assert_eq!(resp.status, "error");
            assert!(!resp.message.unwrap_or_default().is_empty());
        }
    }

    #[tokio::test]
    async fn concurrent_starts_end_running() {
        let (state, runner) = state_with(ScriptedRunner {
            run_delay_ms: 20,
            ..Default::default()
        });

        let a = tokio::spawn(start(State(state.clone())));
        let b = tokio::spawn(start(State(state.clone())));
        let (Json(ra), Json(rb)) = (a.await.unwrap(), b.await.unwrap());

        assert_eq!(ra.status, "ok");
        assert_eq!(rb.status, "ok");
        assert!(state.session.is_running());
        assert!((1..=2).contains(&runner.run_count()));
    }

    #[tokio::test]
    async fn concurrent_starts_with_one_failure_end_running() {
        let runner = Arc::new(ScriptedRunner {
            run_delay_ms: 20,
            fail_first_run: true,
            ..Default::default()
        });
        let (state, runner) = state_with(runner);

        let a = tokio::spawn(start(State(state.clone())));
        let b = tokio::spawn(start(State(state.clone())));
        let (Json(ra), Json(rb)) = (a.await.unwrap(), b.await.unwrap());

        let statuses = [ra.status, rb.status];
        assert!(statuses.contains(&"ok"));
        assert!(state.session.is_running());
        assert_eq!(runner.run_count(), 2);
    }
}
