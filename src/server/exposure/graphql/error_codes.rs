//! Stable error codes for requests rejected before any resolver runs
//!
//! Resolver errors already carry `extensions.code`. Parse and validation
//! failures come from async-graphql itself, so this extension tags them:
//! - parse failures get `GRAPHQL_PARSE_FAILED`
//! - validation failures (unknown input fields, bad enum values, depth
//!   limit) get `INVALID_ARGUMENT`

use async_graphql::extensions::{
    Extension, ExtensionContext, ExtensionFactory, NextParseQuery, NextValidation,
};
use async_graphql::parser::types::ExecutableDocument;
use async_graphql::{ServerError, ServerResult, ValidationResult, Variables};
use std::sync::Arc;

pub const PARSE_FAILED: &str = "GRAPHQL_PARSE_FAILED";
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";

/// Schema extension adding a `code` to request-level errors
pub struct RequestErrorCodes;

impl ExtensionFactory for RequestErrorCodes {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(RequestErrorCodesExtension)
    }
}

struct RequestErrorCodesExtension;

#[async_trait::async_trait]
impl Extension for RequestErrorCodesExtension {
    async fn parse_query(
        &self,
        ctx: &ExtensionContext<'_>,
        query: &str,
        variables: &Variables,
        next: NextParseQuery<'_>,
    ) -> ServerResult<ExecutableDocument> {
        next.run(ctx, query, variables)
            .await
            .map_err(|err| with_code(err, PARSE_FAILED))
    }

    async fn validation(
        &self,
        ctx: &ExtensionContext<'_>,
        next: NextValidation<'_>,
    ) -> Result<ValidationResult, Vec<ServerError>> {
        next.run(ctx).await.map_err(|errors| {
            tracing::debug!(errors = errors.len(), "request failed validation");
            errors
                .into_iter()
                .map(|err| with_code(err, INVALID_ARGUMENT))
                .collect()
        })
    }
}

/// Set `extensions.code` unless the error already has one
fn with_code(mut err: ServerError, code: &str) -> ServerError {
    let extensions = err.extensions.get_or_insert_with(Default::default);
    if extensions.get("code").is_none() {
        extensions.set("code", code);
    }
    err
}
