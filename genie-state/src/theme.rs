//! Current theme and the style targets that render it
//!
//! [`ThemeStore`] holds exactly one current [`Theme`] and has a single setter.
//! Rendering contexts register a [`StyleTarget`]; every `set` writes each
//! theme variable to every target as a CSS custom property.

use std::collections::HashMap;
use std::sync::Arc;

use genie_api::Theme;
use parking_lot::RwLock;

/// Something that accepts CSS custom properties, e.g. a document root
pub trait StyleTarget: Send + Sync {
    fn set_property(&self, name: &str, value: &str);
}

/// In-memory style target standing in for a document root
///
/// Properties are only ever overwritten, never cleared. Cloning shares the
/// same property map.
#[derive(Debug, Clone, Default)]
pub struct RootStyle {
    properties: Arc<RwLock<HashMap<String, String>>>,
}

impl RootStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a custom property, e.g. `get("--accentColor")`
    pub fn get(&self, name: &str) -> Option<String> {
        self.properties.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }
}

impl StyleTarget for RootStyle {
    fn set_property(&self, name: &str, value: &str) {
        self.properties
            .write()
            .insert(name.to_string(), value.to_string());
    }
}

/// Process-wide current theme with last-writer-wins semantics
///
/// Cloning yields another handle onto the same store.
#[derive(Clone, Default)]
pub struct ThemeStore {
    current: Arc<RwLock<Arc<Theme>>>,
    targets: Arc<RwLock<Vec<Arc<dyn StyleTarget>>>>,
}

impl ThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target; it immediately receives the current theme
    pub fn attach(&self, target: Arc<dyn StyleTarget>) {
        let theme = self.current();
        write_theme(target.as_ref(), &theme);
        self.targets.write().push(target);
    }

    /// Replace the current theme wholesale and render it to every target
    pub fn set(&self, theme: Theme) {
        let theme = Arc::new(theme);
        *self.current.write() = Arc::clone(&theme);

        let targets = self.targets.read();
        for target in targets.iter() {
            write_theme(target.as_ref(), &theme);
        }
        tracing::debug!(
            "Applied theme with {} variables to {} targets",
            theme.len(),
            targets.len()
        );
    }

    pub fn current(&self) -> Arc<Theme> {
        Arc::clone(&self.current.read())
    }

    /// Look up one variable of the current theme
    pub fn var(&self, name: &str) -> Option<String> {
        self.current.read().get(name).map(str::to_string)
    }
}

impl std::fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore")
            .field("current", &self.current.read())
            .field("targets", &self.targets.read().len())
            .finish()
    }
}

fn write_theme(target: &dyn StyleTarget, theme: &Theme) {
    for (name, value) in theme.css_properties() {
        target.set_property(&name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relax() -> Theme {
        Theme::from_pairs([("accentColor", "#00E5FF"), ("glowColor", "#00E5FF")])
    }

    fn sleep() -> Theme {
        Theme::from_pairs([("accentColor", "#483D8B"), ("glowColor", "#483D8B")])
    }

    #[test]
    fn test_set_renders_to_attached_targets() {
        let store = ThemeStore::new();
        let root = RootStyle::new();
        store.attach(Arc::new(root.clone()));

        store.set(relax());
        assert_eq!(root.get("--accentColor").as_deref(), Some("#00E5FF"));

        store.set(sleep());
        assert_eq!(root.get("--accentColor").as_deref(), Some("#483D8B"));
        assert_eq!(store.var("glowColor").as_deref(), Some("#483D8B"));
    }

    #[test]
    fn test_attach_receives_current_theme() {
        let store = ThemeStore::new();
        store.set(relax());

        let root = RootStyle::new();
        store.attach(Arc::new(root.clone()));
        assert_eq!(root.len(), 2);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let store = ThemeStore::new();
        store.set(relax());
        store.set(Theme::from_pairs([("textColorPrimary", "#E6E6FA")]));

        let current = store.current();
        assert_eq!(current.len(), 1);
        assert_eq!(current.get("accentColor"), None);
    }

    #[test]
    fn test_clones_share_state() {
        let store = ThemeStore::new();
        let other = store.clone();
        other.set(sleep());
        assert_eq!(store.var("accentColor").as_deref(), Some("#483D8B"));
    }
}
