//! Google Geocoding API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{instrument, warn};

use configs::GeocodingConfig;

use crate::errors::{ensure_success, IntegrationError};
use crate::Geocoder;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocoder {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(cfg: &GeocodingConfig) -> Result<Self, IntegrationError> {
        if cfg.api_key.trim().is_empty() {
            return Err(IntegrationError::Config("geocoding.api_key is empty".into()));
        }
        let http = common::http::client_with_timeout(Duration::from_secs(cfg.request_timeout_secs))?;
        Ok(Self { http, api_key: cfg.api_key.clone(), base_url: cfg.base_url.clone() })
    }
}

/// First result's location; `ZERO_RESULTS` is a miss, other non-OK statuses are errors.
fn first_location(resp: GeocodeResponse) -> Result<Option<(f64, f64)>, IntegrationError> {
    match resp.status.as_str() {
        "OK" => Ok(resp.results.into_iter().next().map(|r| (r.geometry.location.lat, r.geometry.location.lng))),
        "ZERO_RESULTS" => Ok(None),
        other => Err(IntegrationError::Status {
            status: 200,
            body: format!("{other}: {}", resp.error_message.unwrap_or_default()),
        }),
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Option<(f64, f64)>, IntegrationError> {
        if address.trim().is_empty() {
            return Ok(None);
        }
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("address", address), ("key", self.api_key.as_str()), ("language", "uk")])
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let parsed: GeocodeResponse = common::http::read_json(resp).await?;
        let location = first_location(parsed);
        if let Ok(None) = location {
            warn!(%address, "address did not geocode");
        }
        location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn parse(v: serde_json::Value) -> GeocodeResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn ok_status_takes_first_result() {
        let resp = parse(json!({
            "status": "OK",
            "results": [
                {"geometry": {"location": {"lat": 52.0, "lng": 32.0}}},
                {"geometry": {"location": {"lat": 1.0, "lng": 1.0}}}
            ]
        }));
        assert_eq!(first_location(resp).unwrap(), Some((52.0, 32.0)));
    }

    #[test]
    fn zero_results_is_a_miss() {
        assert_eq!(first_location(parse(json!({"status": "ZERO_RESULTS"}))).unwrap(), None);
    }

    #[test]
    fn denied_is_an_error() {
        let resp = parse(json!({"status": "REQUEST_DENIED", "error_message": "bad key"}));
        assert!(matches!(first_location(resp), Err(IntegrationError::Status { .. })));
    }

    #[tokio::test]
    async fn geocode_sends_address_and_key() -> anyhow::Result<()> {
        let router = Router::new().route(
            "/geocode",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("key").map(String::as_str), Some("k"));
                if q.get("address").map(String::as_str) == Some("Сновськ, вул. Миру 1") {
                    Json(json!({"status": "OK", "results": [{"geometry": {"location": {"lat": 51.82, "lng": 31.95}}}]}))
                } else {
                    Json(json!({"status": "ZERO_RESULTS", "results": []}))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let geo = GoogleGeocoder::new(&GeocodingConfig {
            api_key: "k".into(),
            base_url: format!("http://{}/geocode", addr),
            ..Default::default()
        })?;
        assert_eq!(geo.geocode("Сновськ, вул. Миру 1").await?, Some((51.82, 31.95)));
        assert_eq!(geo.geocode("нікуди").await?, None);
        assert_eq!(geo.geocode("   ").await?, None);
        Ok(())
    }
}
