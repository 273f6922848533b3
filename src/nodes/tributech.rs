//! Tributech data API node: stream values and request status

use super::types::{
    parse_params, require, IntegrationNode, NodeContext, NodeDescription, OperationDescription,
    ResourceDescription,
};
use crate::credentials::tributech as credential;
use crate::error::{Error, Result};
use crate::http::RequestConfig;
use crate::timezone::convert_opt;
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Node name
pub const NODE_NAME: &str = "tributech";

// ============================================================================
// Operations
// ============================================================================

/// Encoding of stored values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Base64-encoded bytes (write only)
    Base64,
    /// Raw bytes
    Byte,
    /// Floating point numbers
    Double,
    /// Strings (read only)
    String,
}

impl ValueKind {
    /// Path segment under `/values`
    pub fn segment(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Byte => "byte",
            Self::Double => "double",
            Self::String => "string",
        }
    }
}

/// Resolved Tributech operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TributechOperation {
    /// Status of a request
    RequestStatus,
    /// Status of one stream within a request
    StreamStatus,
    /// Status of a subscription
    SubscriptionStatus,
    /// Read values of a stream
    GetValues(ValueKind),
    /// Append values to streams
    AddValues(ValueKind),
}

/// The Tributech node
#[derive(Debug, Clone, Copy, Default)]
pub struct TributechNode;

impl TributechNode {
    /// Create the node
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IntegrationNode for TributechNode {
    type Operation = TributechOperation;

    fn description(&self) -> NodeDescription {
        NodeDescription {
            name: NODE_NAME,
            display_name: "Tributech",
            credential: credential::NAME,
            resources: vec![
                ResourceDescription::new(
                    "status",
                    "Status",
                    vec![
                        OperationDescription::new("getRequestStatus", "Get the status of a request"),
                        OperationDescription::new("getStreamStatus", "Get the status of a stream"),
                        OperationDescription::new(
                            "getSubscriptionStatus",
                            "Get the status of a subscription",
                        ),
                    ],
                ),
                ResourceDescription::new(
                    "value",
                    "Value",
                    vec![
                        OperationDescription::new("getValuesAsByte", "Get values as bytes"),
                        OperationDescription::new("getValuesAsDouble", "Get values as doubles"),
                        OperationDescription::new("getValuesAsString", "Get values as strings"),
                        OperationDescription::new("addValuesAsBase64", "Add base64 values"),
                        OperationDescription::new("addValuesAsByte", "Add byte values"),
                        OperationDescription::new("addValuesAsDouble", "Add double values"),
                    ],
                ),
            ],
        }
    }

    fn resolve(&self, resource: &str, operation: &str) -> Result<TributechOperation> {
        use TributechOperation as Op;

        let resolved = match (resource, operation) {
            ("status", "getRequestStatus") => Op::RequestStatus,
            ("status", "getStreamStatus") => Op::StreamStatus,
            ("status", "getSubscriptionStatus") => Op::SubscriptionStatus,
            ("value", "getValuesAsByte") => Op::GetValues(ValueKind::Byte),
            ("value", "getValuesAsDouble") => Op::GetValues(ValueKind::Double),
            ("value", "getValuesAsString") => Op::GetValues(ValueKind::String),
            ("value", "addValuesAsBase64") => Op::AddValues(ValueKind::Base64),
            ("value", "addValuesAsByte") => Op::AddValues(ValueKind::Byte),
            ("value", "addValuesAsDouble") => Op::AddValues(ValueKind::Double),
            _ => return Err(Error::unknown_operation(NODE_NAME, resource, operation)),
        };
        Ok(resolved)
    }

    async fn execute(
        &self,
        ctx: &NodeContext,
        operation: TributechOperation,
        params: JsonValue,
    ) -> Result<JsonValue> {
        use TributechOperation as Op;

        match operation {
            Op::RequestStatus => {
                let params: StatusParams = parse_params(params)?;
                let request_id = require(params.request_id, "requestId")?;
                get(ctx, &format!("/status/request/{request_id}"), RequestConfig::new()).await
            }
            Op::StreamStatus => {
                let params: StatusParams = parse_params(params)?;
                let request_id = require(params.request_id, "requestId")?;
                let metadata_id = require(params.value_metadata_id, "valueMetadataId")?;
                get(
                    ctx,
                    &format!("/status/stream/{request_id}/{metadata_id}"),
                    RequestConfig::new(),
                )
                .await
            }
            Op::SubscriptionStatus => {
                let params: StatusParams = parse_params(params)?;
                let request_id = require(params.request_id, "requestId")?;
                get(ctx, &format!("/status/subscription/{request_id}"), RequestConfig::new()).await
            }
            Op::GetValues(kind) => get_values(ctx, kind, parse_params(params)?).await,
            Op::AddValues(kind) => add_values(ctx, kind, parse_params(params)?).await,
        }
    }
}

// ============================================================================
// Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusParams {
    request_id: Option<String>,
    value_metadata_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetValuesParams {
    value_metadata_id: Option<String>,
    #[serde(default)]
    additional_fields: ValueQuery,
}

/// Sort order of returned values, by timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OrderBy {
    #[default]
    Asc,
    Desc,
}

impl OrderBy {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueQuery {
    #[serde(default = "default_page_number")]
    page_number: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default)]
    order_by: OrderBy,
    from: Option<String>,
    to: Option<String>,
}

impl Default for ValueQuery {
    fn default() -> Self {
        Self {
            page_number: default_page_number(),
            page_size: default_page_size(),
            order_by: OrderBy::default(),
            from: None,
            to: None,
        }
    }
}

fn default_page_number() -> u32 {
    1
}

fn default_page_size() -> u32 {
    100
}

/// Values to append, either a plain list or wrapped as `{ "value": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValueEntries {
    Wrapped { value: Vec<ValueEntry> },
    List(Vec<ValueEntry>),
}

impl ValueEntries {
    fn into_vec(self) -> Vec<ValueEntry> {
        match self {
            Self::Wrapped { value } | Self::List(value) => value,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddValuesParams {
    values: ValueEntries,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueEntry {
    value_metadata_id: String,
    timestamp: String,
    /// Array of values, or a JSON string holding one
    values: JsonValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValuePayload {
    value_metadata_id: String,
    timestamp: String,
    values: Vec<JsonValue>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn get(ctx: &NodeContext, endpoint: &str, config: RequestConfig) -> Result<JsonValue> {
    ctx.client.send_json(Method::GET, endpoint, config).await
}

async fn get_values(ctx: &NodeContext, kind: ValueKind, params: GetValuesParams) -> Result<JsonValue> {
    let metadata_id = require(params.value_metadata_id, "valueMetadataId")?;
    let query = params.additional_fields;

    if query.page_number < 1 {
        return Err(Error::invalid_parameter("pageNumber", "must be at least 1"));
    }
    if query.page_size < 1 {
        return Err(Error::invalid_parameter("pageSize", "must be at least 1"));
    }

    let mut config = RequestConfig::new()
        .query("pageNumber", query.page_number.to_string())
        .query("pageSize", query.page_size.to_string())
        .query("orderBy", query.order_by.as_str());
    if let Some(from) = convert_opt(query.from.as_deref(), ctx.timezone)? {
        config = config.query("from", from);
    }
    if let Some(to) = convert_opt(query.to.as_deref(), ctx.timezone)? {
        config = config.query("to", to);
    }

    get(ctx, &format!("/values/{}/{metadata_id}", kind.segment()), config).await
}

async fn add_values(ctx: &NodeContext, kind: ValueKind, params: AddValuesParams) -> Result<JsonValue> {
    if kind == ValueKind::String {
        return Err(Error::invalid_parameter("operation", "string values cannot be added"));
    }

    let payload = params
        .values
        .into_vec()
        .into_iter()
        .map(|entry| -> Result<ValuePayload> {
            Ok(ValuePayload {
                values: encode_values(kind, parse_values(entry.values)?)?,
                timestamp: entry.timestamp,
                value_metadata_id: entry.value_metadata_id,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ctx.client
        .send_json(
            Method::POST,
            &format!("/values/{}", kind.segment()),
            RequestConfig::new().json(serde_json::to_value(payload)?),
        )
        .await
}

/// Read a values field: an array, or a string holding a JSON array
fn parse_values(values: JsonValue) -> Result<Vec<JsonValue>> {
    match values {
        JsonValue::Array(items) => Ok(items),
        JsonValue::String(raw) => match serde_json::from_str(&raw) {
            Ok(JsonValue::Array(items)) => Ok(items),
            _ => Err(Error::invalid_parameter("values", format!("'{raw}' is not a JSON array"))),
        },
        other => Err(Error::invalid_parameter(
            "values",
            format!("expected an array, got {other}"),
        )),
    }
}

/// Shape values for the target encoding. For bytes, a flat array of
/// integers is one byte value; otherwise each element is its own value.
fn encode_values(kind: ValueKind, values: Vec<JsonValue>) -> Result<Vec<JsonValue>> {
    let engine = &base64::engine::general_purpose::STANDARD;

    match kind {
        ValueKind::Base64 if is_byte_array(&values) => {
            Ok(vec![json!(engine.encode(to_bytes(&JsonValue::Array(values))?))])
        }
        ValueKind::Base64 => values
            .into_iter()
            .map(|value| match value {
                JsonValue::String(_) => Ok(value),
                JsonValue::Array(_) => Ok(json!(engine.encode(to_bytes(&value)?))),
                other => Err(Error::invalid_parameter(
                    "values",
                    format!("expected a base64 string or byte array, got {other}"),
                )),
            })
            .collect(),
        ValueKind::Byte if is_byte_array(&values) => {
            Ok(vec![json!(to_bytes(&JsonValue::Array(values))?)])
        }
        ValueKind::Byte => values
            .into_iter()
            .map(|value| Ok(json!(to_bytes(&value)?)))
            .collect(),
        ValueKind::Double => values
            .into_iter()
            .map(|value| {
                if value.is_number() {
                    Ok(value)
                } else {
                    Err(Error::invalid_parameter(
                        "values",
                        format!("expected a number, got {value}"),
                    ))
                }
            })
            .collect(),
        ValueKind::String => Ok(values),
    }
}

/// Whether `values` is a non-empty flat array of integers
fn is_byte_array(values: &[JsonValue]) -> bool {
    !values.is_empty() && values.iter().all(|v| v.is_u64() || v.is_i64())
}

fn to_bytes(value: &JsonValue) -> Result<Vec<u8>> {
    serde_json::from_value(value.clone())
        .map_err(|_| Error::invalid_parameter("values", format!("expected a byte array, got {value}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpClient, HttpClientConfig};
    use test_case::test_case;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(server: &MockServer) -> NodeContext {
        let config = HttpClientConfig::builder()
            .base_url(server.uri())
            .max_retries(0)
            .no_rate_limit()
            .build();
        NodeContext::new(
            HttpClient::with_config(config).unwrap(),
            chrono_tz::Europe::Berlin,
        )
    }

    #[test_case("status", "getStreamStatus" => TributechOperation::StreamStatus; "stream status")]
    #[test_case("value", "getValuesAsString" => TributechOperation::GetValues(ValueKind::String); "get string")]
    #[test_case("value", "addValuesAsBase64" => TributechOperation::AddValues(ValueKind::Base64); "add base64")]
    fn test_resolve(resource: &str, operation: &str) -> TributechOperation {
        TributechNode::new().resolve(resource, operation).unwrap()
    }

    #[test]
    fn test_resolve_unknown() {
        assert!(TributechNode::new().resolve("value", "addValuesAsString").is_err());
        assert!(TributechNode::new().resolve("stream", "getRequestStatus").is_err());
    }

    #[test_case(json!([1, 2]) => json!(["AQI="]); "byte array encoded")]
    #[test_case(json!(["AQI="]) => json!(["AQI="]); "string kept")]
    #[test_case(json!("[[104, 105]]") => json!(["aGk="]); "json string parsed")]
    #[test_case(json!("[104, 105]") => json!(["aGk="]); "flat json string parsed")]
    #[test_case(json!([[1, 2], "aGk="]) => json!(["AQI=", "aGk="]); "mixed values")]
    fn test_base64_values(values: JsonValue) -> JsonValue {
        let values = parse_values(values).unwrap();
        JsonValue::Array(encode_values(ValueKind::Base64, values).unwrap())
    }

    #[test]
    fn test_double_values_must_be_numbers() {
        let err = encode_values(ValueKind::Double, vec![json!(1.5), json!("x")]).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "values"));
    }

    #[test]
    fn test_byte_values_reject_out_of_range() {
        assert!(encode_values(ValueKind::Byte, vec![json!([1, 300])]).is_err());
        assert!(encode_values(ValueKind::Byte, vec![json!(1), json!(300)]).is_err());
        assert!(encode_values(ValueKind::Base64, vec![json!(-1)]).is_err());
    }

    #[test_case(json!([1, 2]) => json!([[1, 2]]); "flat array is one value")]
    #[test_case(json!([[1, 2], [3]]) => json!([[1, 2], [3]]); "nested arrays kept")]
    fn test_byte_values(values: JsonValue) -> JsonValue {
        let values = parse_values(values).unwrap();
        JsonValue::Array(encode_values(ValueKind::Byte, values).unwrap())
    }

    #[tokio::test]
    async fn test_get_request_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status/request/r-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "done"})))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        let output = TributechNode::new()
            .execute(
                &ctx,
                TributechOperation::RequestStatus,
                json!({"requestId": "r-1"}),
            )
            .await
            .unwrap();

        assert_eq!(output, json!({"status": "done"}));
    }

    #[tokio::test]
    async fn test_stream_status_requires_metadata_id() {
        let server = MockServer::start().await;
        let ctx = context(&server);

        let err = TributechNode::new()
            .execute(
                &ctx,
                TributechOperation::StreamStatus,
                json!({"requestId": "r-1"}),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingParameter { ref name } if name == "valueMetadataId"));
    }

    #[tokio::test]
    async fn test_get_values_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/values/double/m-1"))
            .and(query_param("pageNumber", "2"))
            .and(query_param("pageSize", "100"))
            .and(query_param("orderBy", "desc"))
            .and(query_param("from", "2021-03-01T10:00:00+01:00"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"values": [1.0]}])))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        TributechNode::new()
            .execute(
                &ctx,
                TributechOperation::GetValues(ValueKind::Double),
                json!({
                    "valueMetadataId": "m-1",
                    "additionalFields": {
                        "pageNumber": 2,
                        "orderBy": "desc",
                        "from": "2021-03-01T10:00:00"
                    }
                }),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_values_rejects_page_zero() {
        let server = MockServer::start().await;
        let ctx = context(&server);

        let err = TributechNode::new()
            .execute(
                &ctx,
                TributechOperation::GetValues(ValueKind::Byte),
                json!({"valueMetadataId": "m-1", "additionalFields": {"pageSize": 0}}),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "pageSize"));
    }

    #[tokio::test]
    async fn test_add_base64_values() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/values/base64"))
            .and(body_json(json!([{
                "valueMetadataId": "m-1",
                "timestamp": "2021-03-01T10:00:00Z",
                "values": ["AQI="]
            }])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        let output = TributechNode::new()
            .execute(
                &ctx,
                TributechOperation::AddValues(ValueKind::Base64),
                json!({
                    "values": {"value": [{
                        "valueMetadataId": "m-1",
                        "timestamp": "2021-03-01T10:00:00Z",
                        "values": [1, 2]
                    }]}
                }),
            )
            .await
            .unwrap();

        assert_eq!(output, json!(true));
    }

    #[tokio::test]
    async fn test_add_byte_values() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/values/byte"))
            .and(body_json(json!([
                {
                    "valueMetadataId": "m-1",
                    "timestamp": "2021-03-01T10:00:00Z",
                    "values": [[104, 105]]
                },
                {
                    "valueMetadataId": "m-2",
                    "timestamp": "2021-03-01T10:00:01Z",
                    "values": [[1], [2, 3]]
                }
            ])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        let output = TributechNode::new()
            .execute(
                &ctx,
                TributechOperation::AddValues(ValueKind::Byte),
                json!({
                    "values": [
                        {
                            "valueMetadataId": "m-1",
                            "timestamp": "2021-03-01T10:00:00Z",
                            "values": "[104, 105]"
                        },
                        {
                            "valueMetadataId": "m-2",
                            "timestamp": "2021-03-01T10:00:01Z",
                            "values": [[1], [2, 3]]
                        }
                    ]
                }),
            )
            .await
            .unwrap();

        assert_eq!(output, json!(true));
    }
}
