use std::time::Duration;

use http_client::HttpClient;

use crate::endpoint::{
    ActionPatterns, ApplyScene, AutomationInsights, CurrentMood, Endpoint, GetDevice, GetDevices,
    ListMoods, ListScenes, LogAction, Method, NoParams, PreviewMood, SetMood, Talk, UpdateDevice,
};
use crate::error::Result;
use crate::model::{DeviceId, DeviceUpdate};
use crate::validation::Validate;
use crate::wire::*;

/// Default API root of a locally running backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// A client for the genie-home backend
///
/// Every call is blocking. Requests are validated before anything is sent,
/// so an out-of-range update never leaves the process.
///
/// ```rust,no_run
/// use genie_api::{DeviceUpdate, GenieClient};
///
/// let client = GenieClient::new("http://localhost:8000/api");
/// let reply = client.update_device(&"light_kitchen".into(), &DeviceUpdate::new().on(true))?;
/// println!("{:?}", reply.state);
/// # Ok::<(), genie_api::ApiError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GenieClient {
    http: HttpClient,
}

impl GenieClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(base_url),
        }
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        Self {
            http: HttpClient::with_timeouts(base_url, connect_timeout, read_timeout),
        }
    }

    /// Wrap an already configured transport
    pub fn with_http_client(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Execute any endpoint
    ///
    /// The request is validated first; a validation failure is returned as
    /// [`ApiError::InvalidParameter`](crate::ApiError::InvalidParameter)
    /// without touching the network.
    pub fn execute<E: Endpoint>(&self, request: &E::Request) -> Result<E::Response> {
        request.validate()?;
        let path = E::path(request);
        let response = match E::METHOD {
            Method::Get => self.http.get_json(&path)?,
            Method::Post => self.http.post_json(&path, request)?,
        };
        Ok(response)
    }

    pub fn devices(&self) -> Result<DevicesResponse> {
        self.execute::<GetDevices>(&NoParams)
    }

    pub fn device(&self, device_id: &DeviceId) -> Result<DeviceStateResponse> {
        self.execute::<GetDevice>(&DeviceRequest {
            device_id: device_id.clone(),
        })
    }

    pub fn update_device(
        &self,
        device_id: &DeviceId,
        updates: &DeviceUpdate,
    ) -> Result<DeviceStateResponse> {
        tracing::debug!("Updating device {} with {:?}", device_id, updates);
        self.execute::<UpdateDevice>(&DeviceUpdateRequest {
            device_id: device_id.clone(),
            updates: updates.clone(),
        })
    }

    pub fn apply_scene(&self, scene_name: &str) -> Result<SceneResponse> {
        self.execute::<ApplyScene>(&SceneRequest {
            scene_name: scene_name.to_string(),
        })
    }

    pub fn scenes(&self) -> Result<ScenesResponse> {
        self.execute::<ListScenes>(&NoParams)
    }

    pub fn moods(&self) -> Result<MoodsResponse> {
        self.execute::<ListMoods>(&NoParams)
    }

    pub fn current_mood(&self) -> Result<CurrentMoodResponse> {
        self.execute::<CurrentMood>(&NoParams)
    }

    pub fn set_mood(&self, mood_name: &str) -> Result<MoodSetResponse> {
        self.execute::<SetMood>(&MoodRequest {
            mood_name: mood_name.to_string(),
        })
    }

    pub fn preview_mood(&self, mood_name: &str) -> Result<MoodPreviewResponse> {
        self.execute::<PreviewMood>(&MoodRequest {
            mood_name: mood_name.to_string(),
        })
    }

    pub fn talk(&self, message: &str) -> Result<TalkResponse> {
        self.execute::<Talk>(&TalkRequest {
            message: message.to_string(),
        })
    }

    pub fn log_action(&self, action: &UserAction) -> Result<ActionLoggedResponse> {
        self.execute::<LogAction>(action)
    }

    pub fn action_patterns(&self) -> Result<PatternsResponse> {
        self.execute::<ActionPatterns>(&NoParams)
    }

    pub fn insights(&self) -> Result<InsightsResponse> {
        self.execute::<AutomationInsights>(&NoParams)
    }

    /// `GET /health` on the server root, outside the API base
    pub fn health(&self) -> Result<HealthResponse> {
        Ok(self.http.get_json_at(&health_url(self.http.base_url()))?)
    }
}

impl Default for GenieClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn health_url(base_url: &str) -> String {
    let root = base_url.strip_suffix("/api").unwrap_or(base_url);
    format!("{}/health", root)
}
