//! HTTP routes
//!
//! Every API route lives under `/api`; `/health` and `/` sit at the root.
//! Failures reply with `{"detail": "..."}` and a 4xx status.

use std::convert::Infallible;
use std::sync::Arc;

use genie_api::wire::*;
use genie_api::{DeviceId, Validate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::automation::API_USER;
use crate::error::BackendError;
use crate::moods::MoodEngine;
use crate::scenes::SCENE_NAMES;
use crate::state::BackendState;

/// State handle passed to every handler
pub type SharedState = Arc<Mutex<BackendState>>;

/// Name reported by `/health`
pub const SERVICE_NAME: &str = "genie-ai-backend";

/// Every route, with CORS and error replies applied
pub fn routes(
    state: SharedState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    warp::path("api")
        .and(api(state))
        .or(health())
        .unify()
        .or(root())
        .unify()
        .with(cors)
        .with(warp::trace::request())
        .recover(handle_rejection)
}

fn api(state: SharedState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let devices = warp::path!("devices")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(list_devices);

    let update = warp::path!("device" / "update")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body::<DeviceUpdateRequest>())
        .and_then(update_device);

    let scene = warp::path!("device" / "scene")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body::<SceneRequest>())
        .and_then(apply_scene);

    let device = warp::path!("device" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(get_device);

    let scenes = warp::path!("scenes").and(warp::get()).and_then(list_scenes);

    let moods = warp::path!("moods")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(list_moods);

    let current_mood = warp::path!("mood" / "current")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(current_mood);

    let set_mood = warp::path!("mood" / "set")
        .or(warp::path!("mood" / "apply"))
        .unify()
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body::<MoodRequest>())
        .and_then(set_mood);

    let preview = warp::path!("mood" / "preview" / String)
        .and(warp::get())
        .and_then(preview_mood);

    let talk = warp::path!("talk")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body::<TalkRequest>())
        .and_then(talk);

    let log_action = warp::path!("automation" / "log-action")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body::<UserAction>())
        .and_then(log_action);

    let patterns = warp::path!("automation" / "patterns")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(action_patterns);

    let insights = warp::path!("automation" / "insights")
        .and(warp::get())
        .and(with_state(state))
        .and_then(insights);

    devices
        .or(update)
        .unify()
        .or(scene)
        .unify()
        .or(device)
        .unify()
        .or(scenes)
        .unify()
        .or(moods)
        .unify()
        .or(current_mood)
        .unify()
        .or(set_mood)
        .unify()
        .or(preview)
        .unify()
        .or(talk)
        .unify()
        .or(log_action)
        .unify()
        .or(patterns)
        .unify()
        .or(insights)
        .unify()
}

fn health() -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("health").and(warp::get()).map(|| {
        warp::reply::json(&HealthResponse {
            status: "healthy".to_string(),
            service: Some(SERVICE_NAME.to_string()),
        })
        .into_response()
    })
}

fn root() -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path::end().and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({
            "message": "Genie smart home backend running",
            "version": env!("CARGO_PKG_VERSION"),
        }))
        .into_response()
    })
}

fn with_state(state: SharedState) -> impl Filter<Extract = (SharedState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::json()
}

fn decode(segment: &str) -> Result<String, BackendError> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|e| BackendError::BadRequest(e.to_string()))
}

fn respond<T: Serialize>(result: Result<T, BackendError>) -> Result<Response, Infallible> {
    Ok(match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(e) => {
            tracing::warn!("Request failed: {}", e);
            let body = ErrorResponse {
                detail: e.to_string(),
            };
            warp::reply::with_status(warp::reply::json(&body), e.status()).into_response()
        }
    })
}

fn success() -> Option<String> {
    Some(STATUS_SUCCESS.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_devices(state: SharedState) -> Result<Response, Infallible> {
    let state = state.lock().await;
    respond(Ok(DevicesResponse {
        devices: state.simulator.devices().clone(),
        status: success(),
    }))
}

async fn get_device(device_id: String, state: SharedState) -> Result<Response, Infallible> {
    let result = match decode(&device_id) {
        Ok(device_id) => {
            let device_id = DeviceId::from(device_id);
            let state = state.lock().await;
            state.simulator.get(&device_id).map(|device| DeviceStateResponse {
                device_id: Some(device_id.clone()),
                state: device.clone(),
                status: success(),
            })
        }
        Err(e) => Err(e),
    };
    respond(result)
}

async fn update_device(
    state: SharedState,
    request: DeviceUpdateRequest,
) -> Result<Response, Infallible> {
    let mut state = state.lock().await;
    respond(
        state
            .update_device(API_USER, &request.device_id, &request.updates)
            .map(|device| DeviceStateResponse {
                device_id: Some(request.device_id),
                state: device,
                status: success(),
            }),
    )
}

async fn apply_scene(state: SharedState, request: SceneRequest) -> Result<Response, Infallible> {
    let mut state = state.lock().await;
    respond(
        state
            .apply_scene(API_USER, &request.scene_name)
            .map(|devices| SceneResponse {
                scene_name: Some(request.scene_name),
                devices,
                status: success(),
            }),
    )
}

async fn list_scenes() -> Result<Response, Infallible> {
    respond(Ok(ScenesResponse {
        scenes: SCENE_NAMES.iter().map(|s| s.to_string()).collect(),
        status: success(),
    }))
}

async fn list_moods(state: SharedState) -> Result<Response, Infallible> {
    let state = state.lock().await;
    respond(Ok(MoodsResponse {
        moods: MoodEngine::available(),
        current_mood: state.moods.current().to_string(),
        status: success(),
    }))
}

async fn current_mood(state: SharedState) -> Result<Response, Infallible> {
    let state = state.lock().await;
    let current = state.moods.current().to_string();
    respond(MoodEngine::preview(&current).map(|theme_vars| CurrentMoodResponse {
        current_mood: Some(current),
        theme_vars,
        status: success(),
    }))
}

async fn set_mood(state: SharedState, request: MoodRequest) -> Result<Response, Infallible> {
    let mut state = state.lock().await;
    respond(
        state
            .set_mood(&request.mood_name)
            .map(|(theme_vars, device_states)| MoodSetResponse {
                mood_name: Some(request.mood_name),
                theme_vars,
                device_states,
                status: success(),
            }),
    )
}

async fn preview_mood(mood_name: String) -> Result<Response, Infallible> {
    let result = decode(&mood_name).and_then(|mood_name| {
        MoodEngine::preview(&mood_name).map(|theme_vars| MoodPreviewResponse {
            mood_name,
            theme_vars,
            status: success(),
        })
    });
    respond(result)
}

async fn talk(state: SharedState, request: TalkRequest) -> Result<Response, Infallible> {
    let mut state = state.lock().await;
    respond(state.talk(&request.message))
}

async fn log_action(state: SharedState, action: UserAction) -> Result<Response, Infallible> {
    if let Err(e) = action.validate() {
        return respond::<ActionLoggedResponse>(Err(e.into()));
    }
    let mut state = state.lock().await;
    state.actions.record(action);
    respond(Ok(ActionLoggedResponse {
        message: "User action logged successfully".to_string(),
        status: success(),
    }))
}

async fn action_patterns(state: SharedState) -> Result<Response, Infallible> {
    let state = state.lock().await;
    let patterns = state.actions.patterns();
    respond(Ok(PatternsResponse {
        total_patterns: patterns.len(),
        patterns,
        status: success(),
    }))
}

async fn insights(state: SharedState) -> Result<Response, Infallible> {
    let state = state.lock().await;
    respond(Ok(InsightsResponse {
        insights: state.actions.insights(),
        status: success(),
    }))
}

// ============================================================================
// Rejections
// ============================================================================

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (code, detail) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected a JSON body".to_string())
    } else if err.find::<warp::filters::cors::CorsForbidden>().is_some() {
        (StatusCode::FORBIDDEN, "Origin not allowed".to_string())
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(warp::reply::with_status(warp::reply::json(&ErrorResponse { detail }), code).into_response())
}
