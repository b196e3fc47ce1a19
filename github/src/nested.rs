use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NestedMapError {
    /// The key was absent, or the value at that point was not an object.
    #[error("'{0}'")]
    KeyError(String),
}

/// Follow `path` through nested JSON objects.
///
/// An empty path returns `map` itself.
pub fn access_nested_map<'a>(map: &'a Value, path: &[&str]) -> Result<&'a Value, NestedMapError> {
    path.iter().try_fold(map, |current, key| {
        current
            .as_object()
            .and_then(|object| object.get(*key))
            .ok_or_else(|| NestedMapError::KeyError((*key).to_string()))
    })
}
