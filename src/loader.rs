use std::collections::HashSet;

use tracing::debug;

use crate::error::ClassMapError;
use crate::traits::Normalize;
use crate::types::ClassMap;

/// Read desired class-maps from their JSON form.
///
/// The result is normalized and its names are unique; anything else is an
/// `InvalidFormat` error.
///
/// Example:
/// ```rust
/// use classmap_core::load_config;
/// let config = load_config(r#"[
///     {"name": "voice", "match_type": "match-any", "matches": [{"cos": [5, 3, 5]}]}
/// ]"#).unwrap();
/// assert_eq!(config[0].matches[0].criterion, classmap_core::Criterion::Cos(vec![3, 5]));
/// ```
pub fn load_config(json: &str) -> Result<Vec<ClassMap>, ClassMapError> {
    let config: Vec<ClassMap> = serde_json::from_str(json)?;
    prepare(config)
}

/// Normalize declared class-maps and reject duplicate names.
pub(crate) fn prepare(config: Vec<ClassMap>) -> Result<Vec<ClassMap>, ClassMapError> {
    let mut seen = HashSet::new();
    let mut prepared = Vec::with_capacity(config.len());
    for class_map in config {
        if class_map.name.trim().is_empty() {
            return Err(ClassMapError::InvalidFormat(
                "class-map name must not be empty".to_string(),
            ));
        }
        if !seen.insert(class_map.name.clone()) {
            return Err(ClassMapError::InvalidFormat(format!(
                "duplicate class-map name '{}'",
                class_map.name
            )));
        }
        prepared.push(class_map.normalized());
    }
    debug!(event = "Load", phase = "Prepared", class_maps = prepared.len());
    Ok(prepared)
}
