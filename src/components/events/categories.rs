use crate::components::storage::{keys, StorageActorHandle};
use crate::error::{AppResult, Error, ValidationIssues};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Category name length bounds, counted in characters after trimming
pub const NAME_MIN_CHARS: usize = 1;
pub const NAME_MAX_CHARS: usize = 40;

/// A named grouping events can be tagged with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    /// Display color as a #rrggbb hex string
    pub color: String,
}

fn default_categories() -> Vec<CategoryRecord> {
    let seed = [
        ("birthday", "Birthday", "#e06666"),
        ("work", "Work", "#6fa8dc"),
        ("holiday", "Holiday", "#93c47d"),
        ("other", "Other", "#b4a7d6"),
    ];
    seed.iter()
        .map(|(id, name, color)| CategoryRecord {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect()
}

/// Lowercase id derived from a category name
fn slugify(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    slug.trim_matches('-').to_string()
}

/// Category collection, mirrored to the key-value store like events
pub struct CategoryStore {
    categories: Vec<CategoryRecord>,
    storage: StorageActorHandle,
}

impl CategoryStore {
    /// Load stored categories, seeding the defaults on first use
    pub async fn load(storage: StorageActorHandle) -> Self {
        let mut store = CategoryStore {
            categories: Vec::new(),
            storage,
        };
        match store.storage.get(keys::CATEGORIES).await {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<CategoryRecord>>(&payload) {
                Ok(records) => {
                    store.categories = records
                        .into_iter()
                        .filter(|c| !c.id.is_empty() && !c.name.is_empty())
                        .collect();
                }
                Err(e) => {
                    warn!("Stored categories are malformed, using defaults: {}", e);
                    store.categories = default_categories();
                }
            },
            Ok(None) => {
                debug!("No stored categories, seeding defaults");
                store.categories = default_categories();
                store.persist().await;
            }
            Err(e) => {
                warn!("Could not read stored categories, using defaults: {}", e);
                store.categories = default_categories();
            }
        }
        store
    }

    pub fn list(&self) -> &[CategoryRecord] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&CategoryRecord> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Add a category, deriving its id from the name
    pub async fn add(&mut self, name: &str, color: Option<String>) -> AppResult<CategoryRecord> {
        let mut issues = ValidationIssues::new();

        let name = name.trim().to_string();
        let length = name.chars().count();
        if length < NAME_MIN_CHARS {
            issues.push("name", "must not be empty");
        } else if length > NAME_MAX_CHARS {
            issues.push(
                "name",
                format!("must be at most {} characters", NAME_MAX_CHARS),
            );
        }

        let id = slugify(&name);
        if id.is_empty() && !name.is_empty() {
            issues.push("name", "must contain a letter or digit");
        } else if self.get(&id).is_some() {
            issues.push("name", format!("category '{}' already exists", id));
        }

        let color = color.unwrap_or_else(|| "#999999".to_string());
        if !is_hex_color(&color) {
            issues.push("color", "must be a #rrggbb hex color");
        }

        if !issues.is_empty() {
            return Err(Error::Validation(issues));
        }

        let record = CategoryRecord { id, name, color };
        self.categories.push(record.clone());
        self.persist().await;
        Ok(record)
    }

    /// Remove a category by id; returns whether anything was removed
    pub async fn remove(&mut self, id: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        let removed = self.categories.len() < before;
        if removed {
            self.persist().await;
        }
        removed
    }

    async fn persist(&self) -> bool {
        let payload = match serde_json::to_string(&self.categories) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Could not serialize categories for storage: {}", e);
                return false;
            }
        };
        match self.storage.set(keys::CATEGORIES, &payload).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not persist categories: {}", e);
                false
            }
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
