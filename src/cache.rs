use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::action::View;
use crate::query::Location;

/// XDG-compatible cache directory: ~/.cache/wsite-console/ (Linux) or
/// ~/Library/Caches/wsite-console/ (macOS)
fn cache_dir() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("wsite-console");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

fn locations_path() -> Option<PathBuf> {
    Some(cache_dir()?.join("locations.json"))
}

/// Log file of the current session. The terminal belongs to the UI while
/// the console runs, so log lines never go to stderr.
pub fn log_path() -> Option<PathBuf> {
    Some(cache_dir()?.join("wsc.log"))
}

/// Last href of each view, keyed by view path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RememberedLocations {
    hrefs: BTreeMap<String, String>,
}

impl RememberedLocations {
    /// Read the remembered locations. Missing or corrupt data is empty.
    pub fn load() -> Self {
        let Some(path) = locations_path() else {
            return Self::default();
        };
        std::fs::read_to_string(path)
            .ok()
            .map(|data| Self::from_json(&data))
            .unwrap_or_default()
    }

    fn from_json(data: &str) -> Self {
        Self {
            hrefs: serde_json::from_str(data).unwrap_or_default(),
        }
    }

    /// Remembered location of `view`, if its href still decodes to it.
    pub fn get(&self, view: View) -> Option<Location> {
        let href = self.hrefs.get(view.path())?;
        Location::parse(href).filter(|loc| loc.view == view)
    }

    pub fn remember(&mut self, location: &Location) {
        self.hrefs
            .insert(location.view.path().to_string(), location.href());
    }

    /// Write to disk. Silently ignores errors.
    pub fn save(&self) {
        if let Some(path) = locations_path() {
            if let Ok(data) = serde_json::to_string(&self.hrefs) {
                if let Err(e) = std::fs::write(path, data) {
                    tracing::debug!("could not remember locations: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ListQuery, QueryDefaults};

    #[test]
    fn remembered_location_comes_back() {
        let mut remembered = RememberedLocations::default();
        let query = ListQuery::new(&QueryDefaults::for_view(View::Pages)).with_page(3);
        let location = Location::new(View::Pages, query);
        remembered.remember(&location);

        let json = serde_json::to_string(&remembered.hrefs).unwrap();
        let restored = RememberedLocations::from_json(&json);
        assert_eq!(restored.get(View::Pages), Some(location));
        assert_eq!(restored.get(View::Users), None);
    }

    #[test]
    fn corrupt_data_is_empty() {
        assert_eq!(
            RememberedLocations::from_json("{not json"),
            RememberedLocations::default()
        );
    }

    #[test]
    fn mismatched_entry_is_ignored() {
        let restored = RememberedLocations::from_json(
            r#"{"/control/listUsers": "/control/listPages?page=2"}"#,
        );
        assert_eq!(restored.get(View::Users), None);
    }
}
