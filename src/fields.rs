//! Field adjusters
//!
//! Pure `Record -> Record` transformations applied to operation payloads
//! before they are sent, composed per resource.

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record, StringMap};

/// A payload transformation
pub type Adjuster = fn(Record) -> Record;

/// Location sub-objects that carry nested `address_fields`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// `Address`
    Address,
    /// `Billing_Address`
    BillingAddress,
    /// `Mailing_Address`
    MailingAddress,
    /// `Shipping_Address`
    ShippingAddress,
    /// `Other_Address`
    OtherAddress,
}

impl LocationKind {
    /// Key of the location object in a payload
    pub fn key(self) -> &'static str {
        match self {
            Self::Address => "Address",
            Self::BillingAddress => "Billing_Address",
            Self::MailingAddress => "Mailing_Address",
            Self::ShippingAddress => "Shipping_Address",
            Self::OtherAddress => "Other_Address",
        }
    }
}

/// Replace `kind: { address_fields: {...} }` by the contents of
/// `address_fields` at the top level. No-op when the key is absent or has no
/// `address_fields`.
pub fn adjust_location_fields(kind: LocationKind, mut fields: Record) -> Record {
    let has_address_fields = fields
        .get(kind.key())
        .and_then(JsonValue::as_object)
        .is_some_and(|location| location.contains_key("address_fields"));
    if !has_address_fields {
        return fields;
    }

    let location = fields.remove(kind.key());
    if let Some(JsonValue::Object(address)) = location
        .and_then(|mut location| location.get_mut("address_fields").map(JsonValue::take))
    {
        fields.extend(address);
    }
    fields
}

/// Apply adjusters left to right
pub fn pipeline(adjusters: &[Adjuster], fields: Record) -> Record {
    adjusters.iter().fold(fields, |acc, adjust| adjust(acc))
}

/// Flatten `Address`
pub fn adjust_address(fields: Record) -> Record {
    adjust_location_fields(LocationKind::Address, fields)
}

/// Flatten `Billing_Address`
pub fn adjust_billing_address(fields: Record) -> Record {
    adjust_location_fields(LocationKind::BillingAddress, fields)
}

/// Flatten `Mailing_Address`
pub fn adjust_mailing_address(fields: Record) -> Record {
    adjust_location_fields(LocationKind::MailingAddress, fields)
}

/// Flatten `Shipping_Address`
pub fn adjust_shipping_address(fields: Record) -> Record {
    adjust_location_fields(LocationKind::ShippingAddress, fields)
}

/// Flatten `Other_Address`
pub fn adjust_other_address(fields: Record) -> Record {
    adjust_location_fields(LocationKind::OtherAddress, fields)
}

/// Billing then shipping address (accounts and order-like records)
pub const BILLING_AND_SHIPPING: &[Adjuster] = &[adjust_billing_address, adjust_shipping_address];

/// Mailing then other address (contacts)
pub const MAILING_AND_OTHER: &[Adjuster] = &[adjust_mailing_address, adjust_other_address];

/// Single address (leads)
pub const ADDRESS: &[Adjuster] = &[adjust_address];

/// Drop a key whose value is an empty object (or null)
pub fn drop_if_empty(key: &str, mut fields: Record) -> Record {
    let empty = match fields.get(key) {
        Some(JsonValue::Object(map)) => map.is_empty(),
        Some(JsonValue::Null) => true,
        _ => false,
    };
    if empty {
        fields.remove(key);
    }
    fields
}

/// Merge `extra` into `fields`, later keys winning
pub fn merge(mut fields: Record, extra: Record) -> Record {
    fields.extend(extra);
    fields
}

/// Render a record as query parameters. Scalars are stringified, arrays are
/// joined with commas, nulls are skipped and nested objects are rejected.
pub fn to_query(fields: &Record) -> Result<StringMap> {
    let mut query = StringMap::new();

    for (key, value) in fields {
        let rendered = match value {
            JsonValue::Null => continue,
            JsonValue::Array(items) => items
                .iter()
                .map(|item| scalar_to_string(key, item))
                .collect::<Result<Vec<_>>>()?
                .join(","),
            other => scalar_to_string(key, other)?,
        };
        query.insert(key.clone(), rendered);
    }

    Ok(query)
}

fn scalar_to_string(key: &str, value: &JsonValue) -> Result<String> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Null => Ok(String::new()),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(Error::invalid_parameter(
            key,
            "nested values cannot be sent as query parameters",
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn record(value: JsonValue) -> Record {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_adjust_location_flattens_address_fields() {
        let input = record(json!({
            "Account_Name": "Acme",
            "Billing_Address": {
                "address_fields": {"Billing_City": "Berlin", "Billing_Code": "10115"}
            }
        }));

        let output = adjust_billing_address(input);

        assert_eq!(
            JsonValue::Object(output),
            json!({
                "Account_Name": "Acme",
                "Billing_City": "Berlin",
                "Billing_Code": "10115"
            })
        );
    }

    #[test_case(json!({"Account_Name": "Acme"}); "key absent")]
    #[test_case(json!({"Billing_Address": {"Billing_City": "Berlin"}}); "no address_fields")]
    #[test_case(json!({"Billing_Address": "Main St 1"}); "not an object")]
    fn test_adjust_location_is_noop(input: JsonValue) {
        let output = adjust_billing_address(record(input.clone()));
        assert_eq!(JsonValue::Object(output), input);
    }

    #[test]
    fn test_adjust_location_non_object_address_fields_drops_key() {
        let output = adjust_address(record(json!({
            "Company": "Acme",
            "Address": {"address_fields": "oops"}
        })));
        assert_eq!(JsonValue::Object(output), json!({"Company": "Acme"}));
    }

    #[test]
    fn test_billing_and_shipping_pipeline() {
        let input = record(json!({
            "Subject": "Order",
            "Billing_Address": {"address_fields": {"Billing_Street": "A"}},
            "Shipping_Address": {"address_fields": {"Shipping_Street": "B"}}
        }));

        let output = pipeline(BILLING_AND_SHIPPING, input);

        assert_eq!(
            JsonValue::Object(output),
            json!({"Subject": "Order", "Billing_Street": "A", "Shipping_Street": "B"})
        );
    }

    #[test]
    fn test_mailing_and_other_pipeline() {
        let input = record(json!({
            "Last_Name": "Doe",
            "Mailing_Address": {"address_fields": {"Mailing_City": "Paris"}},
            "Other_Address": {"address_fields": {"Other_City": "Lyon"}}
        }));

        let output = pipeline(MAILING_AND_OTHER, input);

        assert_eq!(
            JsonValue::Object(output),
            json!({"Last_Name": "Doe", "Mailing_City": "Paris", "Other_City": "Lyon"})
        );
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let input = record(json!({"Deal_Name": "Big", "Stage": "Won"}));
        assert_eq!(pipeline(&[], input.clone()), input);
    }

    #[test_case(json!({"registration": {}}), json!({}); "empty object dropped")]
    #[test_case(json!({"registration": null}), json!({}); "null dropped")]
    #[test_case(json!({"registration": {"a": 1}}), json!({"registration": {"a": 1}}); "non-empty kept")]
    fn test_drop_if_empty(input: JsonValue, expected: JsonValue) {
        let output = drop_if_empty("registration", record(input));
        assert_eq!(JsonValue::Object(output), expected);
    }

    #[test]
    fn test_merge_later_wins() {
        let output = merge(
            record(json!({"title": "a", "agenda": "x"})),
            record(json!({"title": "b"})),
        );
        assert_eq!(JsonValue::Object(output), json!({"title": "b", "agenda": "x"}));
    }

    #[test]
    fn test_to_query() {
        let query = to_query(&record(json!({
            "roomId": "r1",
            "max": 50,
            "sendEmail": true,
            "ids": ["a", "b"],
            "skip": null
        })))
        .unwrap();

        assert_eq!(query.get("roomId"), Some(&"r1".to_string()));
        assert_eq!(query.get("max"), Some(&"50".to_string()));
        assert_eq!(query.get("sendEmail"), Some(&"true".to_string()));
        assert_eq!(query.get("ids"), Some(&"a,b".to_string()));
        assert!(!query.contains_key("skip"));
    }

    #[test]
    fn test_to_query_rejects_nested_objects() {
        let err = to_query(&record(json!({"filter": {"a": 1}}))).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "filter"));
    }
}
