use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::reactive::{AttrValue, FetchError, FetchParams, FetchPlan, Record, StoreUpdates};

/// Fetch plan for the NASA image library search API.
pub struct NasaSearchPlan {
    endpoint: Url,
}

impl NasaSearchPlan {
    pub const fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl FetchPlan for NasaSearchPlan {
    fn build_url(&self, params: &FetchParams, _prerequisite: Option<&str>) -> String {
        let query = params
            .get("query")
            .and_then(AttrValue::as_text)
            .unwrap_or_default();
        let media_type = params
            .get("media_type")
            .and_then(AttrValue::as_text)
            .unwrap_or("image");
        let page = params
            .get("page")
            .and_then(AttrValue::as_number)
            .unwrap_or(1.0)
            .max(1.0);

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("media_type", media_type)
            .append_pair("page", &page.to_string());
        url.to_string()
    }

    fn map_payload(&self, payload: &Value) -> Result<StoreUpdates, FetchError> {
        let items = payload
            .pointer("/collection/items")
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::Parse("missing `collection.items`".to_string()))?;

        let mut records = Vec::with_capacity(items.len());
        let mut skipped = 0usize;
        for item in items {
            match map_item(item) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(skipped, "skipped search items without image link or title");
        }
        Ok(vec![(
            "images".to_string(),
            AttrValue::Records(records),
        )])
    }
}

/// Project one raw search item into a card record. Items without an image
/// link or title metadata are unusable and skipped.
fn map_item(item: &Value) -> Option<Record> {
    let image = item.pointer("/links/0/href")?.as_str()?;
    let data = item.pointer("/data/0")?;
    let title = data.get("title")?.as_str()?;
    let description = data
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let creator = data
        .get("secondary_creator")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(
        Record::new()
            .with("image", AttrValue::text(image))
            .with("title", AttrValue::text(title))
            .with("description", AttrValue::text(description))
            .with("creator", AttrValue::text(creator)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> NasaSearchPlan {
        NasaSearchPlan::new(Url::parse("https://images-api.nasa.gov/search").unwrap())
    }

    fn params(query: &str, page: f64) -> FetchParams {
        FetchParams::from([
            ("query".to_string(), AttrValue::text(query)),
            ("media_type".to_string(), AttrValue::text("image")),
            ("page".to_string(), AttrValue::Number(page)),
        ])
    }

    #[test]
    fn test_build_url_encodes_query() {
        let url = plan().build_url(&params("moon land", 2.0), None);
        assert_eq!(
            url,
            "https://images-api.nasa.gov/search?q=moon+land&media_type=image&page=2"
        );
    }

    #[test]
    fn test_build_url_clamps_page_to_one() {
        let url = plan().build_url(&params("moon", 0.0), None);
        assert!(url.ends_with("page=1"));
    }

    #[test]
    fn test_map_payload_projects_cards() {
        let payload = serde_json::json!({
            "collection": {
                "items": [{
                    "links": [{"href": "https://images-assets.nasa.gov/a~thumb.jpg"}],
                    "data": [{
                        "title": "Apollo 11",
                        "description": "Buzz Aldrin on the lunar surface",
                        "secondary_creator": "NASA/JSC"
                    }]
                }]
            }
        });

        let updates = plan().map_payload(&payload).unwrap();
        let (name, value) = &updates[0];
        assert_eq!(name, "images");
        let records = value.as_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("title"), Some("Apollo 11"));
        assert_eq!(
            records[0].text("image"),
            Some("https://images-assets.nasa.gov/a~thumb.jpg")
        );
        assert_eq!(records[0].text("creator"), Some("NASA/JSC"));
    }

    #[test]
    fn test_items_missing_required_fields_are_skipped() {
        let payload = serde_json::json!({
            "collection": {
                "items": [
                    {"links": [{"href": "https://i/1.jpg"}], "data": [{"title": "One"}]},
                    {"data": [{"title": "No link"}]},
                    {"links": [{"href": "https://i/3.jpg"}], "data": []}
                ]
            }
        });

        let updates = plan().map_payload(&payload).unwrap();
        let records = updates[0].1.as_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("title"), Some("One"));
        assert_eq!(records[0].text("description"), Some(""));
    }

    #[test]
    fn test_missing_envelope_is_parse_error() {
        let err = plan()
            .map_payload(&serde_json::json!({"reason": "nope"}))
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}
