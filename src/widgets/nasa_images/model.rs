use crate::reactive::{Record, StateStore};

/// One search result projected for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCard {
    pub title: String,
    pub image: String,
    pub description: String,
    pub creator: String,
}

impl ImageCard {
    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            title: record.text("title")?.to_string(),
            image: record.text("image")?.to_string(),
            description: record.text("description").unwrap_or_default().to_string(),
            creator: record.text("creator").unwrap_or_default().to_string(),
        })
    }

    /// All cards currently held in the `images` attribute.
    pub fn from_store(store: &StateStore) -> Vec<Self> {
        store
            .get("images")
            .ok()
            .and_then(crate::reactive::AttrValue::as_records)
            .map(|records| records.iter().filter_map(Self::from_record).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::AttrValue;

    #[test]
    fn test_from_record_requires_title_and_image() {
        let complete = Record::new()
            .with("title", AttrValue::text("X"))
            .with("image", AttrValue::text("https://i/1.jpg"));
        let card = ImageCard::from_record(&complete).unwrap();
        assert_eq!(card.title, "X");
        assert_eq!(card.description, "");

        let missing = Record::new().with("title", AttrValue::text("X"));
        assert!(ImageCard::from_record(&missing).is_none());
    }
}
