use serde::Serialize;
use serde_json::{Map, Value};

use crate::app::errors::ApiError;

// -------------------------
// Response envelope
// -------------------------

/// Uniform wrapper around every response body.
///
/// Clients look at `success` first; keys that do not apply are left out.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            count: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl Envelope<()> {
    /// Success without a payload (e.g. delete).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
            count: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            count: None,
        }
    }
}

// -------------------------
// Request DTOs
// -------------------------

/// Query string of the list endpoint. Values are kept raw; interpretation
/// lives in `InventoryFilter::from_query`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub category: Option<String>,
    pub low_stock: Option<String>,
}

impl ListQuery {
    /// The first occurrence of a repeated key wins; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "category" => &mut query.category,
                "low_stock" => &mut query.low_stock,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Decode a request body that must be a JSON object.
///
/// Bodies are taken raw so malformed JSON still gets an envelope response
/// instead of the extractor's plain-text rejection.
pub fn json_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::validation("Request body must be a JSON object")),
        Err(e) => Err(ApiError::validation(format!("Malformed JSON body: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_envelope_has_data_and_count_only() {
        let v = serde_json::to_value(Envelope::data(vec![1, 2]).with_count(2)).unwrap();
        assert_eq!(v, json!({ "success": true, "data": [1, 2], "count": 2 }));
    }

    #[test]
    fn error_envelope_has_no_data() {
        let v = serde_json::to_value(Envelope::error("Item not found")).unwrap();
        assert_eq!(v, json!({ "success": false, "error": "Item not found" }));
    }

    #[test]
    fn message_envelope() {
        let v = serde_json::to_value(Envelope::message("Inventory item deleted successfully")).unwrap();
        assert_eq!(
            v,
            json!({ "success": true, "message": "Inventory item deleted successfully" })
        );
    }

    #[test]
    fn list_query_keeps_first_of_repeated_keys() {
        let pairs = vec![
            ("category".to_string(), "Grains".to_string()),
            ("page".to_string(), "2".to_string()),
            ("category".to_string(), "Dairy".to_string()),
            ("low_stock".to_string(), "true".to_string()),
            ("low_stock".to_string(), "false".to_string()),
        ];
        assert_eq!(
            ListQuery::from_pairs(pairs),
            ListQuery {
                category: Some("Grains".to_string()),
                low_stock: Some("true".to_string()),
            }
        );
        assert_eq!(ListQuery::from_pairs(Vec::new()), ListQuery::default());
    }

    #[test]
    fn json_object_rejects_non_objects() {
        assert!(json_object(br#"{"a":1}"#).is_ok());
        assert!(matches!(json_object(b"[1,2]"), Err(ApiError::Validation(_))));
        assert!(matches!(json_object(b"{not json"), Err(ApiError::Validation(_))));
        assert!(matches!(json_object(b""), Err(ApiError::Validation(_))));
    }
}
