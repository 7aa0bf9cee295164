//! The model extension point.

use async_trait::async_trait;

use crate::error::ModelError;
use crate::http::RequestContext;
use crate::mvc::descriptor::ResponseDescriptor;

/// Business logic behind a route.
///
/// The default implementation returns empty data with no redirect, status or
/// session data; implementors override `run`.
#[async_trait]
pub trait Model: Send + Sync {
    async fn run(&self, _ctx: &RequestContext) -> Result<ResponseDescriptor, ModelError> {
        Ok(ResponseDescriptor::default())
    }
}

/// A model that keeps the default behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyModel;

impl Model for EmptyModel {}

/// Adapts a synchronous closure into a [`Model`].
pub struct FnModel<F> {
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(&RequestContext) -> Result<ResponseDescriptor, ModelError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Model for FnModel<F>
where
    F: Fn(&RequestContext) -> Result<ResponseDescriptor, ModelError> + Send + Sync,
{
    async fn run(&self, ctx: &RequestContext) -> Result<ResponseDescriptor, ModelError> {
        (self.f)(ctx)
    }
}
