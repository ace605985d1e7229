use crate::routes::{admin, health, v1, webhooks};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "portfolio-server",
    description = "Portfolio chat, push notification and user sync API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(v1::api_docs());
    root.merge(admin::api_docs());
    root.merge(webhooks::WebhooksApi::openapi());
    root
}
