//! Webex Connector implementation
//!
//! Implements the framework capability traits against the Webex REST API.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, Method, Response};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use xavyo_connector::config::ConnectorConfig;
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::interpreter::interpret_error;
use xavyo_connector::operation::{
    DeleteParams, DeleteResult, ReadParams, ReadResult, ReadResultRow, WriteParams, WriteResult,
};
use xavyo_connector::registry::{EndpointRegistry, ModuleId, Operation};
use xavyo_connector::schema::{ListObjectMetadataResult, ObjectMetadata};
use xavyo_connector::traits::{
    Connector, DeleteConnector, MetadataConnector, ReadConnector, WriteConnector,
};
use xavyo_connector::types::ConnectorType;

use crate::config::WebexConfig;
use crate::errors::ERROR_FORMATS;
use crate::objects::{
    display_name, next_records_url, object_path, record_path, supported_operations,
    OBJECT_NAME_PEOPLE, RESULTS_KEY,
};

/// One page of a list call: the records and the next page URL.
struct Page {
    records: Vec<Map<String, Value>>,
    next_page: Option<String>,
}

/// Webex Connector for reading and provisioning people.
pub struct WebexConnector {
    /// Configuration.
    config: WebexConfig,

    /// Display name for this connector instance.
    display_name: String,

    /// HTTP client.
    client: Arc<Client>,

    /// Objects and the operations they allow.
    registry: EndpointRegistry,

    /// Module all requests are checked against.
    module: ModuleId,
}

impl std::fmt::Debug for WebexConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebexConnector")
            .field("config", &self.config.redacted())
            .field("display_name", &self.display_name)
            .field("module", &self.module)
            .finish()
    }
}

impl WebexConnector {
    /// Create a new Webex connector with the given configuration.
    pub fn new(config: WebexConfig) -> ConnectorResult<Self> {
        config.validate()?;

        let display_name = format!("Webex: {}", config.base_url);
        let client = Self::build_client(&config)?;
        let registry = EndpointRegistry::new(supported_operations(config.variant));

        debug!(
            base_url = %config.base_url,
            variant = %config.variant,
            endpoints = registry.len(),
            "Webex connector created"
        );

        Ok(Self {
            config,
            display_name,
            client: Arc::new(client),
            registry,
            module: ModuleId::Root,
        })
    }

    /// Build the reqwest client with configuration.
    fn build_client(config: &WebexConfig) -> ConnectorResult<Client> {
        Client::builder()
            .timeout(config.connection.read_timeout())
            .connect_timeout(config.connection.connection_timeout())
            .build()
            .map_err(|e| ConnectorError::InvalidConfiguration {
                message: format!("Failed to build HTTP client: {e}"),
            })
    }

    /// The configuration this connector was built with.
    pub fn config(&self) -> &WebexConfig {
        &self.config
    }

    /// The capability registry in effect.
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Reject operations the capability table does not list.
    fn check_supported(&self, object: &str, operation: Operation) -> ConnectorResult<()> {
        self.registry.check(&self.module, object, operation)
    }

    /// URL of the first page of a list call.
    fn first_page_url(&self, object: &str, page_size: Option<u32>) -> ConnectorResult<String> {
        let mut url = url::Url::parse(&self.config.url(&object_path(object))).map_err(|e| {
            ConnectorError::InvalidConfiguration {
                message: format!("invalid list URL: {e}"),
            }
        })?;

        if let Some(size) = page_size {
            url.query_pairs_mut().append_pair("max", &size.to_string());
        }

        Ok(url.into())
    }

    /// Build a request with all configured headers.
    fn build_request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");

        for (name, value) in &self.config.default_headers {
            builder = builder.header(name, value);
        }

        if let Some(auth_value) = self.config.auth.authorization_header() {
            builder = builder.header(header::AUTHORIZATION, auth_value);
        }

        builder
    }

    /// Send a request and hand back the raw response.
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> ConnectorResult<Response> {
        let mut request = self.build_request(method.clone(), url);
        if let Some(json_body) = body {
            request = request.json(json_body);
        }

        debug!(url = %url, method = %method, "Sending Webex request");

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                ConnectorError::InvalidData {
                    message: format!("invalid request URL '{url}': {e}"),
                }
            } else {
                ConnectorError::connection_failed_with_source(format!("Request failed: {url}"), e)
            }
        })?;

        debug!(url = %url, status = %response.status(), "Received Webex response");

        Ok(response)
    }

    /// Turn an unsuccessful response into a classified error.
    async fn error_from_response(response: Response, identifier: &str) -> ConnectorError {
        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();

        warn!(status = %status, identifier = %identifier, "Webex request failed");

        interpret_error(status, &body, &ERROR_FORMATS, identifier)
    }

    /// Parse a JSON body; an empty body parses as `null`.
    async fn json_body(response: Response) -> ConnectorResult<Value> {
        let bytes = response.bytes().await.map_err(|e| {
            ConnectorError::connection_failed_with_source("Failed to read response body", e)
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch one page of `object`, from `next_page` if given.
    async fn fetch_page(
        &self,
        object: &str,
        next_page: Option<&str>,
        page_size: Option<u32>,
    ) -> ConnectorResult<Page> {
        let url = match next_page {
            Some(url) => url.to_string(),
            None => self.first_page_url(object, page_size)?,
        };

        let response = self.send(Method::GET, &url, None).await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response, object).await);
        }

        let headers: HeaderMap = response.headers().clone();
        let body = Self::json_body(response).await?;

        let records = match body.get(RESULTS_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record.clone()),
                    other => {
                        warn!(item = %other, "Skipping non-object list item");
                        None
                    }
                })
                .collect(),
            None | Some(Value::Null) => {
                warn!(url = %url, key = RESULTS_KEY, "List response has no results");
                Vec::new()
            }
            Some(other) => {
                return Err(ConnectorError::InvalidData {
                    message: format!("expected '{RESULTS_KEY}' to be an array, got {other}"),
                });
            }
        };

        let next_page = next_records_url(&headers)(&body)?;

        Ok(Page { records, next_page })
    }
}

#[async_trait]
impl Connector for WebexConnector {
    fn connector_type(&self) -> ConnectorType {
        ConnectorType::Webex
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> ConnectorResult<()> {
        self.fetch_page(OBJECT_NAME_PEOPLE, None, Some(1)).await?;

        info!(
            base_url = %self.config.base_url,
            "Webex connection test successful"
        );

        Ok(())
    }

    fn supports(&self, object: &str, operation: Operation) -> bool {
        self.registry.supports(&self.module, object, operation)
    }
}

#[async_trait]
impl ReadConnector for WebexConnector {
    #[instrument(skip(self, params), fields(object = %params.object_name))]
    async fn read(&self, params: ReadParams) -> ConnectorResult<ReadResult> {
        params.validate()?;
        self.check_supported(&params.object_name, Operation::Read)?;

        let page_size = params.page_size.or(self.config.page_size);
        let page = self
            .fetch_page(&params.object_name, params.continuation(), page_size)
            .await?;

        let data: Vec<ReadResultRow> = page
            .records
            .into_iter()
            .map(|record| ReadResultRow::from_record(record, &params.fields))
            .collect();

        info!(
            rows = data.len(),
            has_more = page.next_page.is_some(),
            "Webex page read"
        );

        Ok(ReadResult::new(data, page.next_page))
    }
}

#[async_trait]
impl WriteConnector for WebexConnector {
    #[instrument(skip(self, params), fields(object = %params.object_name, id = ?params.record_id))]
    async fn write(&self, params: WriteParams) -> ConnectorResult<WriteResult> {
        params.validate()?;
        self.check_supported(&params.object_name, Operation::Write)?;

        let record_data = match &params.record_data {
            Some(data @ Value::Object(_)) => data,
            _ => {
                return Err(ConnectorError::InvalidData {
                    message: "record data must be a JSON object".to_string(),
                });
            }
        };

        let (method, url, identifier) = match params.record_id.as_deref() {
            Some(id) if params.is_update() => (
                Method::PUT,
                self.config.url(&record_path(&params.object_name, id)),
                id,
            ),
            _ => (
                Method::POST,
                self.config.url(&object_path(&params.object_name)),
                params.object_name.as_str(),
            ),
        };

        let response = self.send(method, &url, Some(record_data)).await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response, identifier).await);
        }

        let data = match Self::json_body(response).await? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ConnectorError::InvalidData {
                    message: format!("expected a record in write response, got {other}"),
                });
            }
        };

        let record_id = match data.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                warn!("Write response did not contain an id");
                params.record_id.clone().unwrap_or_default()
            }
        };

        info!(id = %record_id, update = params.is_update(), "Webex record written");

        Ok(WriteResult {
            success: true,
            record_id,
            errors: Vec::new(),
            data,
        })
    }
}

#[async_trait]
impl DeleteConnector for WebexConnector {
    #[instrument(skip(self, params), fields(object = %params.object_name, id = %params.record_id))]
    async fn delete(&self, params: DeleteParams) -> ConnectorResult<DeleteResult> {
        params.validate()?;
        self.check_supported(&params.object_name, Operation::Delete)?;

        let url = self
            .config
            .url(&record_path(&params.object_name, &params.record_id));

        let response = self.send(Method::DELETE, &url, None).await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response, &params.record_id).await);
        }

        info!("Webex record deleted");

        Ok(DeleteResult { success: true })
    }
}

#[async_trait]
impl MetadataConnector for WebexConnector {
    #[instrument(skip(self))]
    async fn list_object_metadata(
        &self,
        objects: &[String],
    ) -> ConnectorResult<ListObjectMetadataResult> {
        if objects.is_empty() {
            return Err(ConnectorError::MissingObjects);
        }

        let mut result = ListObjectMetadataResult::new();

        for object in objects {
            if let Err(e) = self.check_supported(object, Operation::Read) {
                result.add_error(object.clone(), e);
                continue;
            }

            match self.fetch_page(object, None, self.config.page_size).await {
                Ok(page) => {
                    let metadata = ObjectMetadata::infer(display_name(object), &page.records);
                    debug!(
                        object = %object,
                        sampled = page.records.len(),
                        fields = metadata.fields.len(),
                        "Inferred object metadata"
                    );
                    result.add_metadata(object.clone(), metadata);
                }
                Err(e) => {
                    warn!(object = %object, error = %e, "Failed to describe object");
                    result.add_error(object.clone(), e);
                }
            }
        }

        Ok(result)
    }
}
