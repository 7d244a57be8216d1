//! Endpoint definitions
//!
//! Each backend route is a zero-sized type implementing [`Endpoint`]. The
//! associated types tie a route to its request and response bodies, so
//! [`GenieClient::execute`](crate::GenieClient::execute) cannot send the wrong
//! body or decode the wrong reply.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::validation::{Validate, ValidationError};
use crate::wire::*;

/// HTTP method of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A route of the backend API, relative to the `/api` base
pub trait Endpoint {
    /// Request data; the JSON body for POST, path parameters for GET
    type Request: Serialize + Validate;

    /// The decoded response body
    type Response: DeserializeOwned;

    const METHOD: Method;

    /// Path relative to the API base, with any parameters filled in
    fn path(request: &Self::Request) -> String;
}

/// Request type for endpoints that take nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoParams;

impl Validate for NoParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Validate for DeviceRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.device_id.as_str().is_empty() {
            return Err(ValidationError::invalid_value("device_id", "", "device id cannot be empty"));
        }
        Ok(())
    }
}

impl Validate for SceneRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("scene_name", &self.scene_name)
    }
}

impl Validate for MoodRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("mood_name", &self.mood_name)
    }
}

fn non_empty(parameter: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::invalid_value(parameter, value, "name cannot be empty"))
    } else {
        Ok(())
    }
}

macro_rules! endpoint {
    ($(#[$meta:meta])* $name:ident, $method:ident, $request:ty => $response:ty, |$req:ident| $path:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Endpoint for $name {
            type Request = $request;
            type Response = $response;
            const METHOD: Method = Method::$method;

            #[allow(unused_variables)]
            fn path($req: &Self::Request) -> String {
                $path
            }
        }
    };
}

endpoint!(
    /// `GET /devices`: full device snapshot
    GetDevices, Get, NoParams => DevicesResponse, |req| "/devices".to_string()
);

endpoint!(
    /// `GET /device/{id}`: one device
    GetDevice, Get, DeviceRequest => DeviceStateResponse,
    |req| format!("/device/{}", urlencoding::encode(req.device_id.as_str()))
);

endpoint!(
    /// `POST /device/update`: partial update, replies with the full device
    UpdateDevice, Post, DeviceUpdateRequest => DeviceStateResponse, |req| "/device/update".to_string()
);

endpoint!(
    /// `POST /device/scene`: apply a scene, replies with the full table
    ApplyScene, Post, SceneRequest => SceneResponse, |req| "/device/scene".to_string()
);

endpoint!(
    /// `GET /scenes`
    ListScenes, Get, NoParams => ScenesResponse, |req| "/scenes".to_string()
);

endpoint!(
    /// `GET /moods`: available moods and the current one
    ListMoods, Get, NoParams => MoodsResponse, |req| "/moods".to_string()
);

endpoint!(
    /// `GET /mood/current`
    CurrentMood, Get, NoParams => CurrentMoodResponse, |req| "/mood/current".to_string()
);

endpoint!(
    /// `POST /mood/set`: persist a mood, replies with its theme and the scene's table
    SetMood, Post, MoodRequest => MoodSetResponse, |req| "/mood/set".to_string()
);

endpoint!(
    /// `GET /mood/preview/{name}`: theme only, nothing is applied
    PreviewMood, Get, MoodRequest => MoodPreviewResponse,
    |req| format!("/mood/preview/{}", urlencoding::encode(&req.mood_name))
);

endpoint!(
    /// `POST /talk`: chat message, replies with text and any side effects
    Talk, Post, TalkRequest => TalkResponse, |req| "/talk".to_string()
);

endpoint!(
    /// `POST /automation/log-action`: record a user action
    LogAction, Post, UserAction => ActionLoggedResponse, |req| "/automation/log-action".to_string()
);

endpoint!(
    /// `GET /automation/patterns`: recent actions, newest first
    ActionPatterns, Get, NoParams => PatternsResponse, |req| "/automation/patterns".to_string()
);

endpoint!(
    /// `GET /automation/insights`: busiest devices and hours
    AutomationInsights, Get, NoParams => InsightsResponse, |req| "/automation/insights".to_string()
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parameters_are_encoded() {
        let request = MoodRequest {
            mood_name: "Movie Mode".to_string(),
        };
        assert_eq!(PreviewMood::path(&request), "/mood/preview/Movie%20Mode");
        assert_eq!(
            GetDevice::path(&DeviceRequest {
                device_id: "ac_main".into()
            }),
            "/device/ac_main"
        );
    }

    #[test]
    fn test_methods() {
        assert_eq!(GetDevices::METHOD, Method::Get);
        assert_eq!(UpdateDevice::METHOD, Method::Post);
        assert_eq!(Talk::METHOD, Method::Post);
    }
}
