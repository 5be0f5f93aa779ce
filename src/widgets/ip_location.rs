//! Location-from-IP widget.
//!
//! Resolves the caller's public IP address first, then geolocates it. Has
//! no trigger attributes: it fetches once on mount and again only on the
//! reload key.

mod model;
mod plan;
mod screen;

pub use model::GeoLocation;
pub use plan::GeoIpPlan;
pub use screen::IpLocation;

use crate::core::widget::Widget;
use crate::registry::{WidgetEnv, WidgetProvider};

pub struct IpLocationProvider;

impl WidgetProvider for IpLocationProvider {
    fn widget_key(&self) -> &'static str {
        "ip-location"
    }

    fn display_name(&self) -> &'static str {
        "Location from IP"
    }

    fn description(&self) -> &'static str {
        "Geolocate this machine's public IP address"
    }

    fn create_widget(&self, env: &WidgetEnv) -> Box<dyn Widget> {
        Box::new(IpLocation::new(env))
    }
}
