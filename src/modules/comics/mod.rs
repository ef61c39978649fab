//! Comic-book inventory: validation, listing queries, storage and routes,
//! mounted under `/api/book`.

pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod repository;
pub mod response;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use longbox_kernel::{settings::InventorySettings, InitCtx, Module};
use serde_json::json;

use handlers::ComicsState;
use repository::ComicRepository;

/// Module owning the `/api/book` routes
pub struct ComicsModule {
    state: ComicsState,
}

impl ComicsModule {
    pub fn new(repository: Arc<dyn ComicRepository>, inventory: InventorySettings) -> Self {
        Self {
            state: ComicsState {
                repository,
                inventory,
            },
        }
    }
}

#[async_trait]
impl Module for ComicsModule {
    fn name(&self) -> &'static str {
        "book"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "comics module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        // Static segments win over `{comic_id}`, so `/inventory` is never read
        // as an identifier.
        Router::new()
            .route(
                "/create",
                post(handlers::create_comic).fallback(handlers::unsupported_method),
            )
            .route(
                "/inventory",
                get(handlers::list_inventory).fallback(handlers::unsupported_method),
            )
            .route(
                "/{comic_id}",
                get(handlers::get_comic)
                    .put(handlers::edit_comic)
                    .delete(handlers::delete_comic)
                    .fallback(handlers::unsupported_method),
            )
            .route(
                "/",
                get(handlers::missing_identifier)
                    .put(handlers::missing_identifier)
                    .delete(handlers::missing_identifier)
                    .fallback(handlers::unsupported_method),
            )
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.state
            .repository
            .ensure_indexes()
            .await
            .map_err(|e| anyhow::anyhow!("failed to prepare inventory indexes: {}", e))?;
        tracing::info!(module = self.name(), "comics module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "comics module stopped");
        Ok(())
    }
}

/// Create a new instance of the comics module
pub fn create_module(
    repository: Arc<dyn ComicRepository>,
    inventory: InventorySettings,
) -> Arc<dyn Module> {
    Arc::new(ComicsModule::new(repository, inventory))
}

fn error_responses(codes: &[&str]) -> serde_json::Value {
    let descriptions = |code: &str| match code {
        "400" => "Invalid input or missing identifier",
        "404" => "Comic book not found",
        _ => "Internal server error",
    };

    let mut responses = serde_json::Map::new();
    for code in codes {
        responses.insert(
            code.to_string(),
            json!({
                "description": descriptions(code),
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            }),
        );
    }
    serde_json::Value::Object(responses)
}

fn with_success(
    status: &str,
    description: &str,
    schema: serde_json::Value,
    errors: &[&str],
) -> serde_json::Value {
    let mut responses = error_responses(errors);
    responses[status] = json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    });
    responses
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = json!({
        "name": "comic_id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    });
    let comic_envelope = json!({
        "type": "object",
        "properties": {
            "message": { "type": "string" },
            "data": { "$ref": "#/components/schemas/ComicBook" }
        },
        "required": ["message", "data"]
    });
    let message_only = json!({
        "type": "object",
        "properties": { "message": { "type": "string" } },
        "required": ["message"]
    });
    let query_param = |name: &str, kind: &str| {
        json!({ "name": name, "in": "query", "required": false, "schema": { "type": kind } })
    };

    json!({
        "paths": {
            "/create": {
                "post": {
                    "summary": "Create a comic book",
                    "tags": ["Comics"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/CreateComicBook" }
                            }
                        }
                    },
                    "responses": with_success("201", "Comic book created", comic_envelope.clone(), &["400", "500"])
                }
            },
            "/inventory": {
                "get": {
                    "summary": "List the inventory with filters, sorting and pagination",
                    "tags": ["Comics"],
                    "parameters": [
                        query_param("page", "integer"),
                        query_param("limit", "integer"),
                        query_param("sortBy", "string"),
                        query_param("order", "string"),
                        query_param("author", "string"),
                        query_param("yearOfPublication", "integer"),
                        query_param("price", "number"),
                        query_param("condition", "string")
                    ],
                    "responses": with_success(
                        "200",
                        "One page of the inventory",
                        json!({
                            "type": "object",
                            "properties": {
                                "message": { "type": "string" },
                                "data": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/ComicBook" }
                                },
                                "total": { "type": "integer" },
                                "page": { "type": "integer" },
                                "pages": { "type": "integer" }
                            },
                            "required": ["message", "data", "total", "page", "pages"]
                        }),
                        &["400", "500"]
                    )
                }
            },
            "/{comic_id}": {
                "get": {
                    "summary": "Get a comic book",
                    "tags": ["Comics"],
                    "parameters": [id_param.clone()],
                    "responses": with_success("200", "Comic book details", comic_envelope.clone(), &["400", "404", "500"])
                },
                "put": {
                    "summary": "Update some fields of a comic book",
                    "tags": ["Comics"],
                    "parameters": [id_param.clone()],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/EditComicBook" }
                            }
                        }
                    },
                    "responses": with_success("200", "Updated comic book", comic_envelope, &["400", "404", "500"])
                },
                "delete": {
                    "summary": "Delete a comic book",
                    "tags": ["Comics"],
                    "parameters": [id_param],
                    "responses": with_success("200", "Comic book deleted", message_only, &["400", "404", "500"])
                }
            }
        },
        "components": {
            "schemas": {
                "ComicBook": {
                    "type": "object",
                    "properties": {
                        "_id": { "type": "string" },
                        "name": { "type": "string" },
                        "author": { "type": "string" },
                        "yearOfPublication": { "type": "integer", "minimum": validation::MIN_YEAR },
                        "price": { "type": "number", "exclusiveMinimum": 0 },
                        "discount": { "type": "number", "minimum": 0 },
                        "numberOfPages": { "type": "integer", "exclusiveMinimum": 0 },
                        "condition": { "type": "string", "enum": models::Condition::VALUES },
                        "description": { "type": "string" },
                        "createdAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": [
                        "_id", "name", "author", "yearOfPublication", "price", "discount",
                        "numberOfPages", "condition", "description", "createdAt", "updatedAt"
                    ]
                },
                "CreateComicBook": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": comic_input_properties(),
                    "required": ["name", "author", "yearOfPublication", "price", "numberOfPages", "condition"]
                },
                "EditComicBook": {
                    "type": "object",
                    "additionalProperties": false,
                    "minProperties": 1,
                    "properties": comic_input_properties()
                }
            }
        }
    })
}

fn comic_input_properties() -> serde_json::Value {
    json!({
        "name": { "type": "string", "minLength": 1 },
        "author": { "type": "string", "minLength": 1 },
        "yearOfPublication": { "type": "integer", "minimum": validation::MIN_YEAR },
        "price": { "type": "number", "exclusiveMinimum": 0 },
        "discount": { "type": "number", "minimum": 0 },
        "numberOfPages": { "type": "integer", "exclusiveMinimum": 0 },
        "condition": { "type": "string", "enum": models::Condition::VALUES },
        "description": { "type": "string" }
    })
}
