//! Shared Overpass HTTP transport used by `region` (place lookup) and
//! `graph` (road-way fetch). Both send a form-encoded `data` query and
//! parse a JSON body; this module owns the client construction and the
//! one error conversion point they share.

use crate::error::{RoutingError, RoutingResult};

const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

pub async fn query_json(query: &str) -> RoutingResult<serde_json::Value> {
    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent("depot-router/0.1")
        .build()
        .map_err(|e| RoutingError::RegionLookupFailed(e.to_string()))?;

    let response = client
        .post(OVERPASS_URL)
        .form(&[("data", query)])
        .send()
        .await
        .map_err(|e| RoutingError::RegionLookupFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(RoutingError::RegionLookupFailed(format!(
            "overpass returned status {}",
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| RoutingError::RegionLookupFailed(e.to_string()))
}
