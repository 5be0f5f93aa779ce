//! Registry of available widgets.
//!
//! Widgets register a [`WidgetProvider`]; the selector screen lists them
//! and the App asks the registry to construct the chosen widget.

use std::sync::Arc;

use crate::config::Endpoints;
use crate::core::command::CommandEnv;
use crate::core::widget::Widget;
use crate::reactive::FetchPipeline;

/// Everything a widget needs at construction time.
///
/// Explicitly threaded through instead of ambient globals: endpoints come
/// from config, the pipeline carries the shared HTTP client and timeout.
#[derive(Clone)]
pub struct WidgetEnv {
    pub endpoints: Endpoints,
    pub pipeline: FetchPipeline,
    pub cmd_env: CommandEnv,
    pub default_query: String,
    pub default_page: u32,
}

/// Factory for one widget type.
pub trait WidgetProvider: Send + Sync {
    /// Unique widget key (e.g. "nasa-images").
    fn widget_key(&self) -> &'static str;

    /// Human-readable display name.
    fn display_name(&self) -> &'static str;

    /// Short description of what the widget shows.
    fn description(&self) -> &'static str {
        ""
    }

    /// Create a new widget instance.
    fn create_widget(&self, env: &WidgetEnv) -> Box<dyn Widget>;
}

/// Ordered collection of registered widget providers.
pub struct WidgetRegistry {
    providers: Vec<Arc<dyn WidgetProvider>>,
}

impl WidgetRegistry {
    pub const fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register a provider. A provider with the same key replaces the
    /// existing one, keeping its position.
    pub fn register<P: WidgetProvider + 'static>(&mut self, provider: P) {
        let provider: Arc<dyn WidgetProvider> = Arc::new(provider);
        if let Some(existing) = self
            .providers
            .iter_mut()
            .find(|p| p.widget_key() == provider.widget_key())
        {
            *existing = provider;
        } else {
            self.providers.push(provider);
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn WidgetProvider>> {
        self.providers
            .iter()
            .find(|p| p.widget_key() == key)
            .cloned()
    }

    /// All providers in registration order.
    pub fn all(&self) -> &[Arc<dyn WidgetProvider>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use ratatui::Frame;
    use ratatui::layout::Rect;

    use super::*;
    use crate::Theme;
    use crate::core::event::Event;
    use crate::core::widget::UpdateResult;

    struct MockProvider;

    impl WidgetProvider for MockProvider {
        fn widget_key(&self) -> &'static str {
            "mock-widget"
        }

        fn display_name(&self) -> &'static str {
            "Mock Widget"
        }

        fn create_widget(&self, _env: &WidgetEnv) -> Box<dyn Widget> {
            Box::new(MockWidget)
        }
    }

    struct MockWidget;

    impl Widget for MockWidget {
        fn handle_input(&mut self, _event: &Event) -> bool {
            false
        }

        fn update(&mut self) -> color_eyre::Result<UpdateResult> {
            Ok(UpdateResult::Idle)
        }

        fn view(&mut self, _frame: &mut Frame, _area: Rect, _theme: &Theme) {}

        fn breadcrumbs(&self) -> Vec<String> {
            vec!["Mock".to_string()]
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = WidgetRegistry::new();
        registry.register(MockProvider);

        assert!(registry.get("mock-widget").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reregistering_same_key_replaces() {
        let mut registry = WidgetRegistry::new();
        registry.register(MockProvider);
        registry.register(MockProvider);
        assert_eq!(registry.len(), 1);
    }
}
