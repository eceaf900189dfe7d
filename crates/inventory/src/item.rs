use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pantrykeeper_core::{DomainError, DomainResult, ItemId};

/// Keys that must be present in a create request, in reporting order.
pub const REQUIRED_FIELDS: [&str; 4] = ["item_name", "category", "quantity", "unit"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A donated-food inventory record as stored and returned to clients.
///
/// Optional fields serialize as `null` rather than being skipped; clients rely
/// on every key being present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub item_name: String,
    pub category: String,
    pub quantity: i32,
    pub unit: String,
    pub expiry_date: Option<NaiveDate>,
    pub donor_name: Option<String>,
    /// Set once by the store at creation time (UTC, no offset).
    pub date_received: NaiveDateTime,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Validated input for creating a record.
///
/// `id` and `date_received` are deliberately absent: the store assigns both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInventoryItem {
    pub item_name: String,
    pub category: String,
    pub quantity: i32,
    pub unit: String,
    pub expiry_date: Option<NaiveDate>,
    pub donor_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl NewInventoryItem {
    /// Interpret a create request body.
    ///
    /// Missing required keys are reported together in one message. A
    /// malformed `expiry_date` is only looked at once everything else is valid
    /// and yields [`DomainError::InvalidDate`].
    pub fn from_json(body: &Map<String, Value>) -> DomainResult<Self> {
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !body.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let item_name = required_text(body, "item_name")?;
        let category = required_text(body, "category")?;
        let quantity = quantity_from(&body["quantity"])?;
        let unit = required_text(body, "unit")?;
        let donor_name = optional_text(body, "donor_name")?.flatten();
        let location = optional_text(body, "location")?.flatten();
        let notes = optional_text(body, "notes")?.flatten();
        let expiry_date = optional_date(body, "expiry_date")?.flatten();

        Ok(Self {
            item_name,
            category,
            quantity,
            unit,
            expiry_date,
            donor_name,
            location,
            notes,
        })
    }

    /// Materialize the record once the store has assigned its identity.
    pub fn into_item(self, id: ItemId, date_received: NaiveDateTime) -> InventoryItem {
        InventoryItem {
            id,
            item_name: self.item_name,
            category: self.category,
            quantity: self.quantity,
            unit: self.unit,
            expiry_date: self.expiry_date,
            donor_name: self.donor_name,
            date_received,
            location: self.location,
            notes: self.notes,
        }
    }
}

/// A partial update.
///
/// `None` means "key absent, leave the field alone". For clearable fields the
/// inner option distinguishes an explicit clear (`Some(None)`) from a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub item_name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub expiry_date: Option<Option<NaiveDate>>,
    pub donor_name: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl ItemPatch {
    /// Interpret an update request body by key presence.
    ///
    /// Unknown keys, `id` and `date_received` are ignored. `expiry_date` set to
    /// `null` or `""` clears the date.
    pub fn from_json(body: &Map<String, Value>) -> DomainResult<Self> {
        let item_name = present(body, "item_name")
            .map(|_| required_text(body, "item_name"))
            .transpose()?;
        let category = present(body, "category")
            .map(|_| required_text(body, "category"))
            .transpose()?;
        let quantity = present(body, "quantity").map(quantity_from).transpose()?;
        let unit = present(body, "unit")
            .map(|_| required_text(body, "unit"))
            .transpose()?;
        let donor_name = optional_text(body, "donor_name")?;
        let location = optional_text(body, "location")?;
        let notes = optional_text(body, "notes")?;
        let expiry_date = optional_date(body, "expiry_date")?;

        Ok(Self {
            item_name,
            category,
            quantity,
            unit,
            expiry_date,
            donor_name,
            location,
            notes,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite exactly the fields this patch carries.
    pub fn apply_to(&self, item: &mut InventoryItem) {
        if let Some(v) = &self.item_name {
            item.item_name = v.clone();
        }
        if let Some(v) = &self.category {
            item.category = v.clone();
        }
        if let Some(v) = self.quantity {
            item.quantity = v;
        }
        if let Some(v) = &self.unit {
            item.unit = v.clone();
        }
        if let Some(v) = self.expiry_date {
            item.expiry_date = v;
        }
        if let Some(v) = &self.donor_name {
            item.donor_name = v.clone();
        }
        if let Some(v) = &self.location {
            item.location = v.clone();
        }
        if let Some(v) = &self.notes {
            item.notes = v.clone();
        }
    }
}

fn present<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    body.get(key)
}

fn required_text(body: &Map<String, Value>, key: &str) -> DomainResult<String> {
    match body.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(DomainError::validation(format!("{key} must be a non-empty string"))),
    }
}

fn quantity_from(value: &Value) -> DomainResult<i32> {
    value
        .as_i64()
        .and_then(|q| i32::try_from(q).ok())
        .ok_or_else(|| DomainError::validation("quantity must be a whole number"))
}

fn optional_text(body: &Map<String, Value>, key: &str) -> DomainResult<Option<Option<String>>> {
    match body.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(DomainError::validation(format!("{key} must be a string or null"))),
    }
}

fn optional_date(body: &Map<String, Value>, key: &str) -> DomainResult<Option<Option<NaiveDate>>> {
    match body.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) if s.is_empty() => Ok(Some(None)),
        Some(Value::String(s)) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(|d| Some(Some(d)))
            .map_err(|e| {
                DomainError::invalid_date(format!(
                    "{key} '{s}' does not match format YYYY-MM-DD: {e}"
                ))
            }),
        Some(other) => Err(DomainError::invalid_date(format!(
            "{key} must be a date string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    fn received() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_micro_opt(10, 11, 12, 123_456)
            .unwrap()
    }

    fn rice() -> InventoryItem {
        InventoryItem {
            id: ItemId::new(1),
            item_name: "Rice".to_string(),
            category: "Grains".to_string(),
            quantity: 50,
            unit: "kg".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 12, 31),
            donor_name: Some("John Doe".to_string()),
            date_received: received(),
            location: Some("Warehouse A".to_string()),
            notes: Some("Organic rice".to_string()),
        }
    }

    #[test]
    fn create_with_required_fields_only() {
        let body = obj(json!({
            "item_name": "Rice",
            "category": "Grains",
            "quantity": 50,
            "unit": "kg"
        }));
        let new = NewInventoryItem::from_json(&body).unwrap();
        assert_eq!(new.item_name, "Rice");
        assert_eq!(new.quantity, 50);
        assert_eq!(new.expiry_date, None);
        assert_eq!(new.donor_name, None);
        assert_eq!(new.location, None);
        assert_eq!(new.notes, None);
    }

    #[test]
    fn create_reports_every_missing_field_in_order() {
        let body = obj(json!({ "category": "Grains" }));
        let err = NewInventoryItem::from_json(&body).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("Missing required fields: item_name, quantity, unit")
        );
    }

    #[test]
    fn create_rejects_wrong_typed_required_values() {
        let body = obj(json!({
            "item_name": "Rice",
            "category": "Grains",
            "quantity": "lots",
            "unit": "kg"
        }));
        assert!(matches!(
            NewInventoryItem::from_json(&body),
            Err(DomainError::Validation(_))
        ));

        let body = obj(json!({
            "item_name": "  ",
            "category": "Grains",
            "quantity": 1,
            "unit": "kg"
        }));
        assert!(matches!(
            NewInventoryItem::from_json(&body),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn create_accepts_negative_quantity() {
        let body = obj(json!({
            "item_name": "Beans",
            "category": "Canned",
            "quantity": -3,
            "unit": "pieces"
        }));
        assert_eq!(NewInventoryItem::from_json(&body).unwrap().quantity, -3);
    }

    #[test]
    fn create_rejects_quantity_outside_i32() {
        let body = obj(json!({
            "item_name": "Beans",
            "category": "Canned",
            "quantity": 5_000_000_000_i64,
            "unit": "pieces"
        }));
        assert!(matches!(
            NewInventoryItem::from_json(&body),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn malformed_expiry_date_is_a_date_error() {
        let body = obj(json!({
            "item_name": "Milk",
            "category": "Dairy",
            "quantity": 4,
            "unit": "liters",
            "expiry_date": "31/12/2025"
        }));
        assert!(matches!(
            NewInventoryItem::from_json(&body),
            Err(DomainError::InvalidDate(_))
        ));
    }

    #[test]
    fn validation_wins_over_date_error() {
        let body = obj(json!({
            "item_name": "Milk",
            "category": "Dairy",
            "quantity": null,
            "unit": "liters",
            "expiry_date": "not-a-date"
        }));
        assert!(matches!(
            NewInventoryItem::from_json(&body),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn empty_expiry_date_on_create_means_none() {
        let body = obj(json!({
            "item_name": "Milk",
            "category": "Dairy",
            "quantity": 4,
            "unit": "liters",
            "expiry_date": ""
        }));
        assert_eq!(NewInventoryItem::from_json(&body).unwrap().expiry_date, None);
    }

    #[test]
    fn patch_tracks_absent_null_and_value() {
        let patch = ItemPatch::from_json(&obj(json!({
            "quantity": 45,
            "donor_name": null,
            "notes": "Updated stock",
            "expiry_date": ""
        })))
        .unwrap();

        assert_eq!(patch.item_name, None);
        assert_eq!(patch.quantity, Some(45));
        assert_eq!(patch.donor_name, Some(None));
        assert_eq!(patch.notes, Some(Some("Updated stock".to_string())));
        assert_eq!(patch.expiry_date, Some(None));
        assert_eq!(patch.location, None);
    }

    #[test]
    fn patch_ignores_immutable_keys() {
        let patch = ItemPatch::from_json(&obj(json!({
            "id": 99,
            "date_received": "2000-01-01T00:00:00"
        })))
        .unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn patch_rejects_null_for_required_fields() {
        let err = ItemPatch::from_json(&obj(json!({ "unit": null }))).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn applying_quantity_only_leaves_other_fields() {
        let before = rice();
        let mut after = before.clone();
        ItemPatch {
            quantity: Some(45),
            ..ItemPatch::default()
        }
        .apply_to(&mut after);

        assert_eq!(after.quantity, 45);
        assert_eq!(InventoryItem { quantity: 50, ..after }, before);
    }

    #[test]
    fn applying_clear_removes_expiry() {
        let mut item = rice();
        ItemPatch {
            expiry_date: Some(None),
            ..ItemPatch::default()
        }
        .apply_to(&mut item);
        assert_eq!(item.expiry_date, None);

        ItemPatch {
            quantity: Some(1),
            ..ItemPatch::default()
        }
        .apply_to(&mut item);
        assert_eq!(item.expiry_date, None);
    }

    #[test]
    fn item_serializes_nulls_and_iso_dates() {
        let item = NewInventoryItem {
            item_name: "Rice".to_string(),
            category: "Grains".to_string(),
            quantity: 50,
            unit: "kg".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 12, 31),
            donor_name: None,
            location: None,
            notes: None,
        }
        .into_item(ItemId::new(3), received());

        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["id"], 3);
        assert_eq!(v["expiry_date"], "2025-12-31");
        assert_eq!(v["date_received"], "2025-01-02T10:11:12.123456");
        assert!(v["donor_name"].is_null());
        assert!(v.as_object().unwrap().contains_key("notes"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a patch never touches fields it does not carry.
            #[test]
            fn patch_only_changes_carried_fields(
                quantity in proptest::option::of(any::<i32>()),
                notes in proptest::option::of(proptest::option::of("[a-z ]{0,20}")),
            ) {
                let before = rice();
                let mut after = before.clone();
                let patch = ItemPatch { quantity, notes: notes.clone(), ..ItemPatch::default() };
                patch.apply_to(&mut after);

                prop_assert_eq!(after.quantity, quantity.unwrap_or(before.quantity));
                prop_assert_eq!(&after.notes, &notes.unwrap_or(before.notes.clone()));
                prop_assert_eq!(&after.item_name, &before.item_name);
                prop_assert_eq!(&after.category, &before.category);
                prop_assert_eq!(&after.unit, &before.unit);
                prop_assert_eq!(after.expiry_date, before.expiry_date);
                prop_assert_eq!(&after.donor_name, &before.donor_name);
                prop_assert_eq!(&after.location, &before.location);
                prop_assert_eq!(after.date_received, before.date_received);
                prop_assert_eq!(after.id, before.id);
            }
        }
    }
}
