use crate::reactive::{AttrValue, StateStore, StoreError};

/// Geolocation values currently held in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub lat: f64,
    pub long: f64,
    pub city: String,
    pub region: String,
}

impl GeoLocation {
    /// # Errors
    /// [`StoreError`] if a location attribute is undeclared, which would
    /// be a schema defect.
    pub fn from_store(store: &StateStore) -> Result<Self, StoreError> {
        Ok(Self {
            lat: store.get("lat")?.as_number().unwrap_or_default(),
            long: store.get("long")?.as_number().unwrap_or_default(),
            city: text(store.get("city")?),
            region: text(store.get("region")?),
        })
    }

    /// Google Maps link centered on the located coordinates.
    pub fn map_link(&self) -> String {
        format!("https://www.google.com/maps/@{},{},14z", self.lat, self.long)
    }
}

fn text(value: &AttrValue) -> String {
    value.as_text().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_link_format() {
        let location = GeoLocation {
            lat: 47.37,
            long: 8.54,
            city: "Zurich".to_string(),
            region: "Zurich".to_string(),
        };
        assert_eq!(
            location.map_link(),
            "https://www.google.com/maps/@47.37,8.54,14z"
        );
    }
}
