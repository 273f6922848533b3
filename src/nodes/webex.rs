//! Cisco Webex node: messages and meetings

use super::types::{
    default_limit, parse_params, require, IntegrationNode, NodeContext, NodeDescription,
    OperationDescription, OptionValue, ResourceDescription,
};
use crate::credentials::webex as credential;
use crate::error::{Error, Result};
use crate::fields::{drop_if_empty, merge, to_query};
use crate::http::RequestConfig;
use crate::pagination::{CursorKind, HttpPageFetcher, Limit, ListingRequest};
use crate::timezone::{convert_fields, to_zoned_iso};
use crate::types::{JsonObject, JsonValue, Method, StringMap};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Node name
pub const NODE_NAME: &str = "ciscoWebex";

/// Records requested per page
const PAGE_SIZE: u32 = 100;

/// Content type of adaptive card attachments
pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

// ============================================================================
// Operations
// ============================================================================

/// Resolved Webex operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebexOperation {
    /// Post a message
    MessageCreate,
    /// Delete a message
    MessageDelete,
    /// Get a message
    MessageGet,
    /// List messages in a room
    MessageGetAll,
    /// Edit a message
    MessageUpdate,
    /// Schedule a meeting
    MeetingCreate,
    /// Delete a meeting
    MeetingDelete,
    /// Get a meeting
    MeetingGet,
    /// List meetings
    MeetingGetAll,
    /// Update a meeting
    MeetingUpdate,
}

/// The Webex node
#[derive(Debug, Clone, Copy, Default)]
pub struct WebexNode;

impl WebexNode {
    /// Create the node
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IntegrationNode for WebexNode {
    type Operation = WebexOperation;

    fn description(&self) -> NodeDescription {
        NodeDescription {
            name: NODE_NAME,
            display_name: "Webex by Cisco",
            credential: credential::NAME,
            resources: vec![
                ResourceDescription::new(
                    "message",
                    "Message",
                    vec![
                        OperationDescription::new("create", "Create a message"),
                        OperationDescription::new("delete", "Delete a message"),
                        OperationDescription::new("get", "Get a message"),
                        OperationDescription::new("getAll", "Get all messages"),
                        OperationDescription::new("update", "Update a message"),
                    ],
                ),
                ResourceDescription::new(
                    "meeting",
                    "Meeting",
                    vec![
                        OperationDescription::new("create", "Create a meeting"),
                        OperationDescription::new("delete", "Delete a meeting"),
                        OperationDescription::new("get", "Get a meeting"),
                        OperationDescription::new("getAll", "Get all meetings"),
                        OperationDescription::new("update", "Update a meeting"),
                    ],
                ),
            ],
        }
    }

    fn resolve(&self, resource: &str, operation: &str) -> Result<WebexOperation> {
        use WebexOperation as Op;

        Ok(match (resource, operation) {
            ("message", "create") => Op::MessageCreate,
            ("message", "delete") => Op::MessageDelete,
            ("message", "get") => Op::MessageGet,
            ("message", "getAll") => Op::MessageGetAll,
            ("message", "update") => Op::MessageUpdate,
            ("meeting", "create") => Op::MeetingCreate,
            ("meeting", "delete") => Op::MeetingDelete,
            ("meeting", "get") => Op::MeetingGet,
            ("meeting", "getAll") => Op::MeetingGetAll,
            ("meeting", "update") => Op::MeetingUpdate,
            _ => return Err(Error::unknown_operation(NODE_NAME, resource, operation)),
        })
    }

    async fn execute(
        &self,
        ctx: &NodeContext,
        operation: WebexOperation,
        params: JsonValue,
    ) -> Result<JsonValue> {
        match operation {
            WebexOperation::MessageCreate => create_message(ctx, parse_params(params)?).await,
            WebexOperation::MessageDelete => delete_message(ctx, parse_params(params)?).await,
            WebexOperation::MessageGet => get_message(ctx, parse_params(params)?).await,
            WebexOperation::MessageGetAll => list_messages(ctx, parse_params(params)?).await,
            WebexOperation::MessageUpdate => update_message(ctx, parse_params(params)?).await,
            WebexOperation::MeetingCreate => create_meeting(ctx, parse_params(params)?).await,
            WebexOperation::MeetingDelete => delete_meeting(ctx, parse_params(params)?).await,
            WebexOperation::MeetingGet => get_meeting(ctx, parse_params(params)?).await,
            WebexOperation::MeetingGetAll => list_meetings(ctx, parse_params(params)?).await,
            WebexOperation::MeetingUpdate => update_meeting(ctx, parse_params(params)?).await,
        }
    }

    async fn load_options(&self, ctx: &NodeContext, method: &str) -> Result<Vec<OptionValue>> {
        match method {
            "rooms" => list_rooms(ctx).await,
            "sites" => list_sites(ctx).await,
            other => Err(Error::invalid_parameter(
                "method",
                format!("node '{NODE_NAME}' has no options method '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Who a new message goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Destination {
    Room,
    PersonId,
    PersonEmail,
}

/// Plain text or markdown body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageContent {
    #[serde(default)]
    markdown: bool,
    text: Option<String>,
    markdown_text: Option<String>,
}

impl MessageContent {
    fn apply(self, body: &mut JsonObject) -> Result<()> {
        if self.markdown {
            let markdown = require(self.markdown_text, "markdownText")?;
            body.insert("markdown".to_string(), json!(markdown));
        } else {
            let text = require(self.text, "text")?;
            body.insert("text".to_string(), json!(text));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageAdditionalFields {
    /// Adaptive card contents
    #[serde(default)]
    attachments: Vec<JsonObject>,
    /// Publicly reachable file URL
    file_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMessageParams {
    destination: Destination,
    room_id: Option<String>,
    to_person_id: Option<String>,
    to_person_email: Option<String>,
    #[serde(flatten)]
    content: MessageContent,
    #[serde(default)]
    additional_fields: MessageAdditionalFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageIdParams {
    message_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMessageParams {
    message_id: String,
    #[serde(flatten)]
    content: MessageContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMessagesParams {
    room_id: String,
    #[serde(default)]
    filters: JsonObject,
    #[serde(default)]
    return_all: bool,
    #[serde(default = "default_limit")]
    limit: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMeetingParams {
    title: String,
    start: String,
    end: String,
    #[serde(default)]
    invitees: Vec<JsonValue>,
    #[serde(default)]
    additional_fields: JsonObject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeetingIdParams {
    meeting_id: String,
    #[serde(default)]
    options: JsonObject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMeetingsParams {
    #[serde(default)]
    filters: JsonObject,
    #[serde(default)]
    options: JsonObject,
    #[serde(default)]
    return_all: bool,
    #[serde(default = "default_limit")]
    limit: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMeetingParams {
    meeting_id: String,
    #[serde(default)]
    invitees: Vec<JsonValue>,
    #[serde(default)]
    update_fields: JsonObject,
}

// ============================================================================
// Messages
// ============================================================================

async fn create_message(ctx: &NodeContext, params: CreateMessageParams) -> Result<JsonValue> {
    let mut body = JsonObject::new();

    let (key, value, name) = match params.destination {
        Destination::Room => ("roomId", params.room_id, "roomId"),
        Destination::PersonId => ("toPersonId", params.to_person_id, "toPersonId"),
        Destination::PersonEmail => ("toPersonEmail", params.to_person_email, "toPersonEmail"),
    };
    body.insert(key.to_string(), json!(require(value, name)?));

    params.content.apply(&mut body)?;

    let extra = params.additional_fields;
    if !extra.attachments.is_empty() {
        let cards: Vec<JsonValue> = extra.attachments.into_iter().map(adaptive_card).collect();
        body.insert("attachments".to_string(), JsonValue::Array(cards));
    }
    if let Some(url) = extra.file_url.filter(|u| !u.is_empty()) {
        body.insert("files".to_string(), json!([url]));
    }

    ctx.client
        .send_json(
            Method::POST,
            "/messages",
            RequestConfig::new().json(JsonValue::Object(body)),
        )
        .await
}

/// Wrap card content as a Webex attachment
pub fn adaptive_card(mut content: JsonObject) -> JsonValue {
    content
        .entry("type")
        .or_insert_with(|| json!("AdaptiveCard"));
    content.entry("version").or_insert_with(|| json!("1.2"));
    content.entry("$schema").or_insert_with(|| {
        json!("http://adaptivecards.io/schemas/adaptive-card.json")
    });

    json!({
        "contentType": ADAPTIVE_CARD_CONTENT_TYPE,
        "content": content,
    })
}

async fn delete_message(ctx: &NodeContext, params: MessageIdParams) -> Result<JsonValue> {
    let endpoint = format!("/messages/{}", params.message_id);
    ctx.client
        .send(Method::DELETE, &endpoint, RequestConfig::new())
        .await?;
    Ok(json!({ "success": true }))
}

async fn get_message(ctx: &NodeContext, params: MessageIdParams) -> Result<JsonValue> {
    let endpoint = format!("/messages/{}", params.message_id);
    ctx.client
        .send_json(Method::GET, &endpoint, RequestConfig::new())
        .await
}

async fn list_messages(ctx: &NodeContext, params: ListMessagesParams) -> Result<JsonValue> {
    let mut query = to_query(&params.filters)?;
    query.insert("roomId".to_string(), params.room_id);

    let limit = Limit::from_flags(params.return_all, params.limit);
    list(ctx, "/messages", query, StringMap::new(), limit).await
}

async fn update_message(ctx: &NodeContext, params: UpdateMessageParams) -> Result<JsonValue> {
    let endpoint = format!("/messages/{}", params.message_id);

    // Editing requires the room the message was posted in
    let existing = ctx
        .client
        .send_json(Method::GET, &endpoint, RequestConfig::new())
        .await?;
    let room_id = existing
        .get("roomId")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::malformed(format!("message '{}' has no roomId", params.message_id)))?;

    let mut body = JsonObject::new();
    body.insert("roomId".to_string(), json!(room_id));
    params.content.apply(&mut body)?;

    ctx.client
        .send_json(
            Method::PUT,
            &endpoint,
            RequestConfig::new().json(JsonValue::Object(body)),
        )
        .await
}

// ============================================================================
// Meetings
// ============================================================================

async fn create_meeting(ctx: &NodeContext, params: CreateMeetingParams) -> Result<JsonValue> {
    let mut body = JsonObject::new();
    body.insert("title".to_string(), json!(params.title));
    body.insert(
        "start".to_string(),
        json!(to_zoned_iso(&params.start, ctx.timezone)?),
    );
    body.insert(
        "end".to_string(),
        json!(to_zoned_iso(&params.end, ctx.timezone)?),
    );

    let mut body = merge(body, params.additional_fields);
    if !params.invitees.is_empty() {
        body.insert("invitees".to_string(), JsonValue::Array(params.invitees));
    }
    let body = drop_if_empty("registration", body);

    ctx.client
        .send_json(
            Method::POST,
            "/meetings",
            RequestConfig::new().json(JsonValue::Object(body)),
        )
        .await
}

async fn delete_meeting(ctx: &NodeContext, params: MeetingIdParams) -> Result<JsonValue> {
    let endpoint = format!("/meetings/{}", params.meeting_id);
    let config = RequestConfig::new().queries(to_query(&params.options)?);
    ctx.client.send_json(Method::DELETE, &endpoint, config).await
}

async fn get_meeting(ctx: &NodeContext, params: MeetingIdParams) -> Result<JsonValue> {
    let endpoint = format!("/meetings/{}", params.meeting_id);
    let config = RequestConfig::new()
        .queries(to_query(&params.options)?)
        .headers(password_header(&params.options));
    ctx.client.send_json(Method::GET, &endpoint, config).await
}

async fn list_meetings(ctx: &NodeContext, params: ListMeetingsParams) -> Result<JsonValue> {
    let mut filters = params.filters;
    convert_fields(&mut filters, &["from", "to"], ctx.timezone)?;

    let query = to_query(&filters)?;
    let headers = password_header(&params.options);
    let limit = Limit::from_flags(params.return_all, params.limit);
    list(ctx, "/meetings", query, headers, limit).await
}

async fn update_meeting(ctx: &NodeContext, params: UpdateMeetingParams) -> Result<JsonValue> {
    let mut body = params.update_fields;
    if !params.invitees.is_empty() {
        body.insert("invitees".to_string(), JsonValue::Array(params.invitees));
    }
    let mut body = drop_if_empty("registration", body);
    convert_fields(&mut body, &["start", "end", "from", "to"], ctx.timezone)?;

    let endpoint = format!("/meetings/{}", params.meeting_id);
    ctx.client
        .send_json(
            Method::PUT,
            &endpoint,
            RequestConfig::new().json(JsonValue::Object(body)),
        )
        .await
}

/// Meeting password travels as a header
fn password_header(options: &JsonObject) -> StringMap {
    options
        .get("password")
        .and_then(JsonValue::as_str)
        .filter(|p| !p.is_empty())
        .map(|password| StringMap::from([("password".to_string(), password.to_string())]))
        .unwrap_or_default()
}

// ============================================================================
// Listing
// ============================================================================

async fn list(
    ctx: &NodeContext,
    endpoint: &str,
    query: StringMap,
    headers: StringMap,
    limit: Limit,
) -> Result<JsonValue> {
    let request = ListingRequest::get(endpoint)
        .with_query(query)
        .with_headers(headers)
        .with_page_size("max", PAGE_SIZE)
        .with_records_path("items")
        .with_limit(limit);

    let records = HttpPageFetcher::new(&ctx.client, &request, CursorKind::link_header())
        .fetch_all()
        .await?;

    Ok(JsonValue::Array(
        records.into_iter().map(JsonValue::Object).collect(),
    ))
}

/// Rooms the user belongs to, as (title, id)
pub async fn list_rooms(ctx: &NodeContext) -> Result<Vec<OptionValue>> {
    let request = ListingRequest::get("/rooms")
        .with_page_size("max", PAGE_SIZE)
        .with_records_path("items");

    let rooms = HttpPageFetcher::new(&ctx.client, &request, CursorKind::link_header())
        .fetch_all()
        .await?;

    Ok(rooms
        .iter()
        .filter_map(|room| {
            Some(OptionValue {
                name: room.get("title")?.as_str()?.to_string(),
                value: room.get("id")?.as_str()?.to_string(),
            })
        })
        .collect())
}

/// Meeting sites available to the user, across every page
pub async fn list_sites(ctx: &NodeContext) -> Result<Vec<OptionValue>> {
    let request = ListingRequest::get("/meetingPreferences/sites")
        .with_page_size("max", PAGE_SIZE)
        .with_records_path("sites");

    let sites = HttpPageFetcher::new(&ctx.client, &request, CursorKind::link_header())
        .fetch_all()
        .await?;
    debug!(count = sites.len(), "Loaded meeting sites");

    Ok(sites
        .iter()
        .filter_map(|site| site.get("siteUrl").and_then(JsonValue::as_str))
        .map(|url| OptionValue {
            name: url.to_string(),
            value: url.to_string(),
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
