//! Minimal shape of a `wp/v2/media` record.

use serde::Deserialize;
use serde_json::Value;

/// The two fields the audit needs from a media record. Everything else the
/// API sends is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct MediaRecord {
    #[serde(default)]
    pub source_url: Option<String>,
    /// Id of the post the upload is attached to; `0`, `null` or missing for
    /// unattached uploads.
    #[serde(default)]
    pub post: Value,
}

impl MediaRecord {
    /// `source_url` if the record is attached to published content.
    pub fn attached_source_url(&self) -> Option<&str> {
        let url = self.source_url.as_deref().filter(|u| !u.is_empty())?;
        is_truthy(&self.post).then_some(url)
    }
}

/// Parse a page body into records. Array elements that are not objects are
/// skipped; a body that is not an array at all is an error.
pub fn parse_media_page(body: &[u8]) -> Result<Vec<MediaRecord>, serde_json::Error> {
    let items: Vec<Value> = serde_json::from_slice(body)?;
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Loose truthiness: null, false, 0, "" and empty containers are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
