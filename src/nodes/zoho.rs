//! Zoho CRM node: records across eight modules

use super::types::{
    default_limit, parse_params, IntegrationNode, NodeContext, NodeDescription,
    OperationDescription, ResourceDescription,
};
use crate::credentials::zoho as credential;
use crate::error::{Error, Result};
use crate::fields::{pipeline, to_query, Adjuster, ADDRESS, BILLING_AND_SHIPPING, MAILING_AND_OTHER};
use crate::http::RequestConfig;
use crate::pagination::{CursorKind, HttpPageFetcher, Limit, ListingRequest};
use crate::types::{JsonObject, JsonValue, Method, Record};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Node name
pub const NODE_NAME: &str = "zoho";

/// Records per page, the API maximum
const PAGE_SIZE: u32 = 200;

// ============================================================================
// Operations
// ============================================================================

/// CRM module a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZohoResource {
    /// Accounts
    Account,
    /// Contacts
    Contact,
    /// Deals
    Deal,
    /// Invoices
    Invoice,
    /// Leads
    Lead,
    /// Purchase orders
    PurchaseOrder,
    /// Quotes
    Quote,
    /// Sales orders
    SalesOrder,
}

impl ZohoResource {
    /// Every resource, in description order
    pub const ALL: [Self; 8] = [
        Self::Account,
        Self::Contact,
        Self::Deal,
        Self::Invoice,
        Self::Lead,
        Self::PurchaseOrder,
        Self::Quote,
        Self::SalesOrder,
    ];

    /// Parameter value naming the resource
    pub fn name(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Contact => "contact",
            Self::Deal => "deal",
            Self::Invoice => "invoice",
            Self::Lead => "lead",
            Self::PurchaseOrder => "purchaseOrder",
            Self::Quote => "quote",
            Self::SalesOrder => "salesOrder",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Contact => "Contact",
            Self::Deal => "Deal",
            Self::Invoice => "Invoice",
            Self::Lead => "Lead",
            Self::PurchaseOrder => "Purchase Order",
            Self::Quote => "Quote",
            Self::SalesOrder => "Sales Order",
        }
    }

    /// Parse a resource name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Collection endpoint
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Account => "/accounts",
            Self::Contact => "/contacts",
            Self::Deal => "/deals",
            Self::Invoice => "/invoices",
            Self::Lead => "/leads",
            Self::PurchaseOrder => "/purchaseorders",
            Self::Quote => "/quotes",
            Self::SalesOrder => "/salesorders",
        }
    }

    /// Fields a new record must carry
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Account => &["Account_Name"],
            Self::Contact => &["Last_Name"],
            Self::Deal => &["Deal_Name", "Stage"],
            Self::Invoice | Self::Quote => &["Subject", "Product_Details"],
            Self::Lead => &["Company", "Last_Name"],
            Self::PurchaseOrder => &["Subject", "Vendor_Name"],
            Self::SalesOrder => &["Subject", "Account_Name"],
        }
    }

    /// Address flattening applied to additional and update fields
    pub fn adjusters(self) -> &'static [Adjuster] {
        match self {
            Self::Account
            | Self::Invoice
            | Self::PurchaseOrder
            | Self::Quote
            | Self::SalesOrder => BILLING_AND_SHIPPING,
            Self::Contact => MAILING_AND_OTHER,
            Self::Lead => ADDRESS,
            Self::Deal => &[],
        }
    }

    /// Adjust a payload for this resource
    pub fn adjust(self, fields: Record) -> Record {
        pipeline(self.adjusters(), fields)
    }
}

/// Action on a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    /// Create a record
    Create,
    /// Delete a record
    Delete,
    /// Get a record
    Get,
    /// List records
    GetAll,
    /// Update a record
    Update,
}

impl RecordAction {
    const ALL: [Self; 5] = [
        Self::Create,
        Self::Delete,
        Self::Get,
        Self::GetAll,
        Self::Update,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Get => "get",
            Self::GetAll => "getAll",
            Self::Update => "update",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Self::Create => "Create a record",
            Self::Delete => "Delete a record",
            Self::Get => "Get a record",
            Self::GetAll => "Get all records",
            Self::Update => "Update a record",
        }
    }
}

/// Resolved Zoho operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZohoOperation {
    /// CRM module
    pub resource: ZohoResource,
    /// Action
    pub action: RecordAction,
}

/// The Zoho CRM node
#[derive(Debug, Clone, Copy, Default)]
pub struct ZohoNode;

impl ZohoNode {
    /// Create the node
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IntegrationNode for ZohoNode {
    type Operation = ZohoOperation;

    fn description(&self) -> NodeDescription {
        NodeDescription {
            name: NODE_NAME,
            display_name: "Zoho CRM",
            credential: credential::NAME,
            resources: ZohoResource::ALL
                .into_iter()
                .map(|resource| {
                    ResourceDescription::new(
                        resource.name(),
                        resource.display_name(),
                        RecordAction::ALL
                            .into_iter()
                            .map(|a| OperationDescription::new(a.name(), a.description()))
                            .collect(),
                    )
                })
                .collect(),
        }
    }

    fn resolve(&self, resource: &str, operation: &str) -> Result<ZohoOperation> {
        match (ZohoResource::parse(resource), RecordAction::parse(operation)) {
            (Some(resource), Some(action)) => Ok(ZohoOperation { resource, action }),
            _ => Err(Error::unknown_operation(NODE_NAME, resource, operation)),
        }
    }

    async fn execute(
        &self,
        ctx: &NodeContext,
        operation: ZohoOperation,
        params: JsonValue,
    ) -> Result<JsonValue> {
        let resource = operation.resource;
        match operation.action {
            RecordAction::Create => create(ctx, resource, parse_params(params)?).await,
            RecordAction::Delete => delete(ctx, resource, parse_params(params)?).await,
            RecordAction::Get => get(ctx, resource, parse_params(params)?).await,
            RecordAction::GetAll => get_all(ctx, resource, parse_params(params)?).await,
            RecordAction::Update => update(ctx, resource, parse_params(params)?).await,
        }
    }
}

// ============================================================================
// Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateParams {
    #[serde(default)]
    additional_fields: Record,
    /// Required fields, by their CRM names
    #[serde(flatten)]
    fields: Record,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordIdParams {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParams {
    id: String,
    #[serde(default)]
    update_fields: Record,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    #[serde(default)]
    return_all: bool,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    filters: JsonObject,
}

// ============================================================================
// Handlers
// ============================================================================

async fn create(ctx: &NodeContext, resource: ZohoResource, params: CreateParams) -> Result<JsonValue> {
    let mut body = Record::new();
    for field in resource.required_fields() {
        match params.fields.get(*field) {
            Some(JsonValue::Null) | None => return Err(Error::missing_parameter(*field)),
            Some(JsonValue::String(s)) if s.is_empty() => {
                return Err(Error::missing_parameter(*field))
            }
            Some(value) => {
                body.insert((*field).to_string(), value.clone());
            }
        }
    }

    body.extend(resource.adjust(params.additional_fields));
    request(ctx, Method::POST, resource.endpoint(), body).await
}

async fn delete(ctx: &NodeContext, resource: ZohoResource, params: RecordIdParams) -> Result<JsonValue> {
    let endpoint = format!("{}/{}", resource.endpoint(), params.id);
    request(ctx, Method::DELETE, &endpoint, Record::new()).await
}

async fn get(ctx: &NodeContext, resource: ZohoResource, params: RecordIdParams) -> Result<JsonValue> {
    let endpoint = format!("{}/{}", resource.endpoint(), params.id);
    request(ctx, Method::GET, &endpoint, Record::new()).await
}

async fn update(ctx: &NodeContext, resource: ZohoResource, params: UpdateParams) -> Result<JsonValue> {
    let endpoint = format!("{}/{}", resource.endpoint(), params.id);
    let body = resource.adjust(params.update_fields);
    request(ctx, Method::PUT, &endpoint, body).await
}

async fn get_all(ctx: &NodeContext, resource: ZohoResource, params: ListParams) -> Result<JsonValue> {
    let listing = ListingRequest::get(resource.endpoint())
        .with_query(to_query(&params.filters)?)
        .with_page_size("per_page", PAGE_SIZE)
        .with_records_path("data")
        .with_limit(Limit::from_flags(params.return_all, params.limit));

    let records = HttpPageFetcher::new(
        &ctx.client,
        &listing,
        CursorKind::page_flag("page", 0, "info.more_records"),
    )
    .fetch_all()
    .await?;

    Ok(JsonValue::Array(
        records.into_iter().map(JsonValue::Object).collect(),
    ))
}

/// Send a single-record request. A non-empty body is wrapped as
/// `{"data": [body]}`; the response's `data` field is returned.
async fn request(
    ctx: &NodeContext,
    method: Method,
    endpoint: &str,
    body: Record,
) -> Result<JsonValue> {
    let mut config = RequestConfig::new();
    if !body.is_empty() {
        config = config.json(json!({ "data": [body] }));
    }

    let mut response = ctx.client.send_json(method, endpoint, config).await?;
    Ok(response
        .get_mut("data")
        .map(JsonValue::take)
        .unwrap_or(JsonValue::Null))
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
        NodeContext::new(HttpClient::with_config(config).unwrap(), chrono_tz::UTC)
    }

    fn op(resource: ZohoResource, action: RecordAction) -> ZohoOperation {
        ZohoOperation { resource, action }
    }

    #[test_case("account", "create" => ZohoResource::Account; "account")]
    #[test_case("purchaseOrder", "getAll" => ZohoResource::PurchaseOrder; "purchase order")]
    #[test_case("salesOrder", "update" => ZohoResource::SalesOrder; "sales order")]
    fn test_resolve(resource: &str, operation: &str) -> ZohoResource {
        ZohoNode::new().resolve(resource, operation).unwrap().resource
    }

    #[test]
    fn test_resolve_unknown() {
        let err = ZohoNode::new().resolve("vendor", "create").unwrap_err();
        assert!(matches!(err, Error::UnknownOperation { ref resource, .. } if resource == "vendor"));
        assert!(ZohoNode::new().resolve("deal", "upsert").is_err());
    }

    #[test]
    fn test_description_covers_all_resources() {
        let description = ZohoNode::new().description();
        assert_eq!(description.resources.len(), 8);
        assert!(description.supports("quote", "getAll"));
        assert!(!description.supports("quote", "upsert"));
    }

    #[test_case(ZohoResource::Account => "/accounts")]
    #[test_case(ZohoResource::PurchaseOrder => "/purchaseorders")]
    #[test_case(ZohoResource::SalesOrder => "/salesorders")]
    fn test_endpoint(resource: ZohoResource) -> &'static str {
        resource.endpoint()
    }

    #[test]
    fn test_deal_adjust_is_identity() {
        let fields = json!({"Stage": "Won", "Billing_Address": {"address_fields": {"x": 1}}})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(ZohoResource::Deal.adjust(fields.clone()), fields);
    }

    #[tokio::test]
    async fn test_create_account_wraps_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts"))
            .and(body_json(json!({
                "data": [{
                    "Account_Name": "Acme",
                    "Phone": "123",
                    "Billing_City": "Berlin"
                }]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": [{"code": "SUCCESS", "details": {"id": "42"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        let output = ZohoNode::new()
            .execute(
                &ctx,
                op(ZohoResource::Account, RecordAction::Create),
                json!({
                    "Account_Name": "Acme",
                    "additionalFields": {
                        "Phone": "123",
                        "Billing_Address": {"address_fields": {"Billing_City": "Berlin"}}
                    }
                }),
            )
            .await
            .unwrap();

        assert_eq!(output, json!([{"code": "SUCCESS", "details": {"id": "42"}}]));
    }

    #[tokio::test]
    async fn test_create_deal_requires_stage() {
        let server = MockServer::start().await;
        let ctx = context(&server);

        let err = ZohoNode::new()
            .execute(
                &ctx,
                op(ZohoResource::Deal, RecordAction::Create),
                json!({"Deal_Name": "Big"}),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingParameter { ref name } if name == "Stage"));
    }

    #[tokio::test]
    async fn test_get_returns_data() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/leads/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "7", "Company": "Acme"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        let output = ZohoNode::new()
            .execute(
                &ctx,
                op(ZohoResource::Lead, RecordAction::Get),
                json!({"id": "7"}),
            )
            .await
            .unwrap();

        assert_eq!(output, json!([{"id": "7", "Company": "Acme"}]));
    }

    #[tokio::test]
    async fn test_update_contact_flattens_addresses() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/contacts/3"))
            .and(body_json(json!({
                "data": [{"Email": "a@b.c", "Mailing_City": "Paris"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"code": "SUCCESS"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        ZohoNode::new()
            .execute(
                &ctx,
                op(ZohoResource::Contact, RecordAction::Update),
                json!({
                    "id": "3",
                    "updateFields": {
                        "Email": "a@b.c",
                        "Mailing_Address": {"address_fields": {"Mailing_City": "Paris"}}
                    }
                }),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_all_with_limit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/deals"))
            .and(query_param("page", "0"))
            .and(query_param("per_page", "3"))
            .and(query_param("sort_order", "asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "1"}, {"id": "2"}, {"id": "3"}],
                "info": {"more_records": true}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        let output = ZohoNode::new()
            .execute(
                &ctx,
                op(ZohoResource::Deal, RecordAction::GetAll),
                json!({"limit": 3, "filters": {"sort_order": "asc"}}),
            )
            .await
            .unwrap();

        assert_eq!(output.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_returns_data() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/quotes/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"code": "SUCCESS", "details": {"id": "9"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server);
        let output = ZohoNode::new()
            .execute(
                &ctx,
                op(ZohoResource::Quote, RecordAction::Delete),
                json!({"id": "9"}),
            )
            .await
            .unwrap();

        assert_eq!(output[0]["details"]["id"], "9");
    }
}
