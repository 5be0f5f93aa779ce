//! NASA image library search widget.
//!
//! Searches <https://images-api.nasa.gov> and shows the results as a list
//! of cards. Changing the query or the page re-fetches; a new query always
//! lands back on page one.

mod model;
mod plan;
mod screen;

pub use model::ImageCard;
pub use plan::NasaSearchPlan;
pub use screen::NasaImages;

use crate::core::widget::Widget;
use crate::registry::{WidgetEnv, WidgetProvider};

pub struct NasaImagesProvider;

impl WidgetProvider for NasaImagesProvider {
    fn widget_key(&self) -> &'static str {
        "nasa-images"
    }

    fn display_name(&self) -> &'static str {
        "NASA Image Search"
    }

    fn description(&self) -> &'static str {
        "Search the NASA image and video library"
    }

    fn create_widget(&self, env: &WidgetEnv) -> Box<dyn Widget> {
        Box::new(NasaImages::new(env))
    }
}
