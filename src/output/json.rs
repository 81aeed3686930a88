use serde::Serialize;

/// Serialise `items` as a JSON array of their text forms.
pub fn to_json<T: Serialize>(items: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}
