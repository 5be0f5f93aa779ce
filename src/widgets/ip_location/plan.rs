use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::reactive::{
    AttrValue, FetchError, FetchParams, FetchPlan, HttpSource, StoreUpdates,
};

/// Fetch plan that resolves the caller's public IP, then geolocates it.
///
/// The IP lookup is a prerequisite: its result becomes part of the main
/// request URL, and its failure fails the whole run the same way the main
/// request would.
pub struct GeoIpPlan {
    geoip_endpoint: Url,
    ip_endpoint: Url,
}

impl GeoIpPlan {
    pub const fn new(geoip_endpoint: Url, ip_endpoint: Url) -> Self {
        Self {
            geoip_endpoint,
            ip_endpoint,
        }
    }
}

#[async_trait]
impl FetchPlan for GeoIpPlan {
    async fn prerequisite(&self, http: &dyn HttpSource) -> Result<Option<String>, FetchError> {
        let response = http.request(self.ip_endpoint.as_str()).await?;
        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }
        let payload: Value = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::Parse(e.to_string()))?;
        let ip = payload
            .get("ip")
            .and_then(Value::as_str)
            .ok_or_else(|| FetchError::Parse("missing `ip`".to_string()))?;
        Ok(Some(ip.to_string()))
    }

    fn build_url(&self, _params: &FetchParams, prerequisite: Option<&str>) -> String {
        match prerequisite.and_then(|ip| self.geoip_endpoint.join(ip).ok()) {
            Some(url) => url.to_string(),
            None => self.geoip_endpoint.to_string(),
        }
    }

    fn map_payload(&self, payload: &Value) -> Result<StoreUpdates, FetchError> {
        let lat = payload
            .get("latitude")
            .and_then(Value::as_f64)
            .ok_or_else(|| FetchError::Parse("missing `latitude`".to_string()))?;
        let long = payload
            .get("longitude")
            .and_then(Value::as_f64)
            .ok_or_else(|| FetchError::Parse("missing `longitude`".to_string()))?;
        let city = payload.get("city").and_then(Value::as_str).unwrap_or_default();
        let region = payload
            .get("region_name")
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(vec![
            ("lat".to_string(), AttrValue::Number(lat)),
            ("long".to_string(), AttrValue::Number(long)),
            ("city".to_string(), AttrValue::text(city)),
            ("region".to_string(), AttrValue::text(region)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::pipeline::tests::ScriptedSource;

    fn plan() -> GeoIpPlan {
        GeoIpPlan::new(
            Url::parse("https://freegeoip.app/json/").unwrap(),
            Url::parse("https://api.ipify.org/?format=json").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_prerequisite_resolves_public_ip() {
        let source = ScriptedSource::new(vec![ScriptedSource::ok(r#"{"ip": "93.184.216.34"}"#)]);
        let ip = plan().prerequisite(&source).await.unwrap();
        assert_eq!(ip.as_deref(), Some("93.184.216.34"));
        assert_eq!(
            *source.requested.lock().unwrap(),
            vec!["https://api.ipify.org/?format=json".to_string()]
        );
    }

    #[tokio::test]
    async fn test_prerequisite_checks_status_before_parsing() {
        let source = ScriptedSource::new(vec![ScriptedSource::status(503)]);
        let err = plan().prerequisite(&source).await.unwrap_err();
        assert_eq!(err, FetchError::Status(503));
    }

    #[test]
    fn test_build_url_appends_resolved_ip() {
        let url = plan().build_url(&FetchParams::new(), Some("93.184.216.34"));
        assert_eq!(url, "https://freegeoip.app/json/93.184.216.34");
    }

    #[test]
    fn test_map_payload_requires_coordinates() {
        let complete = serde_json::json!({
            "latitude": 47.37,
            "longitude": 8.54,
            "city": "Zurich",
            "region_name": "Zurich"
        });
        let updates = plan().map_payload(&complete).unwrap();
        assert!(updates.contains(&("lat".to_string(), AttrValue::Number(47.37))));
        assert!(updates.contains(&("city".to_string(), AttrValue::text("Zurich"))));

        let missing = serde_json::json!({"latitude": 47.37});
        let err = plan().map_payload(&missing).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}
