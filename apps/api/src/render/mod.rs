//! Document rendering: a resolved version's content in, a byte stream out.
//! The trait is the whole contract; callers never see the template internals.

pub mod classic;
pub mod handlers;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::errors::AppError;
use crate::render::classic::ClassicRenderer;

/// Turns an immutable content document into a rendered byte stream.
#[async_trait]
pub trait TemplateRenderer: Send + Sync {
    async fn render(&self, content: &Value) -> Result<Bytes, AppError>;
}

/// Template switch keyed by name. Only the classic renderer is registered
/// today; unknown names fall back to it.
pub fn renderer_for(_template: Option<&str>) -> Arc<dyn TemplateRenderer> {
    Arc::new(ClassicRenderer)
}
