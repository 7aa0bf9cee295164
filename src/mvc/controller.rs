//! Controllers: one model, one view, one request at a time.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::config::LeiConfig;
use crate::error::{LeiError, Result};
use crate::http::{redirect, RequestContext};
use crate::mvc::model::{EmptyModel, Model};
use crate::mvc::view::View;
use crate::observability::metrics;

/// Session key set on every redirect.
pub const INITIALISED_KEY: &str = "initialised";

/// Binds a [`View`] to a [`Model`].
pub struct Controller {
    view: View,
    model: Arc<dyn Model>,
    redirect_status: Option<StatusCode>,
}

impl Controller {
    pub fn new(view: View, model: impl Model + 'static) -> Self {
        Self::from_arc(view, Arc::new(model))
    }

    /// Build a controller around a model shared with other controllers.
    pub fn from_arc(view: View, model: Arc<dyn Model>) -> Self {
        Self {
            view,
            model,
            redirect_status: None,
        }
    }

    /// Status for redirects whose model sets none, instead of the engine default.
    pub fn with_redirect_status(mut self, status: StatusCode) -> Self {
        self.redirect_status = Some(status);
        self
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    /// Fill in settings the controller did not choose itself.
    pub(crate) fn apply_defaults(&mut self, config: &LeiConfig) {
        self.view.inherit_policy(config.views.template_policy);
        if self.redirect_status.is_none() {
            self.redirect_status = StatusCode::from_u16(config.redirect.default_status).ok();
        }
    }

    /// Handle one request.
    ///
    /// Runs the model, then either redirects (data as query parameters,
    /// session data written to the session) or renders the view with the
    /// model's data overlaid by its session data. The render path leaves the
    /// session untouched.
    pub async fn run(&self, ctx: RequestContext) -> Result<Response> {
        let descriptor = self.model.run(&ctx).await.map_err(LeiError::Model)?;
        let status = descriptor
            .status
            .map(|code| {
                StatusCode::from_u16(code)
                    .ok()
                    .filter(|_| (100..=599).contains(&code))
                    .ok_or(LeiError::InvalidStatus(code))
            })
            .transpose()?;

        if let Some(target) = descriptor.redirect_target() {
            let location = redirect::resolve(&ctx, target, &descriptor.data)?;

            let session = ctx.session();
            session.insert(INITIALISED_KEY, true);
            if let Some(session_data) = &descriptor.session_data {
                for (key, value) in session_data {
                    session.insert(key.clone(), value.clone());
                }
            }

            let status = status
                .or(self.redirect_status)
                .unwrap_or(StatusCode::OK);
            tracing::debug!(location = %location, status = %status, "Redirecting");
            metrics::record_redirect();
            return Ok(redirect::respond(status, &location));
        }

        let body = self.view.render(&descriptor.render_vars()).await?;
        Ok((status.unwrap_or(StatusCode::OK), Html(body)).into_response())
    }
}

/// An empty view over the default model.
impl Default for Controller {
    fn default() -> Self {
        Self::new(View::empty(), EmptyModel)
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("view", &self.view)
            .field("redirect_status", &self.redirect_status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvc::{FnModel, ResponseDescriptor, TemplatePolicy};
    use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
    use serde_json::json;

    fn ctx() -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:8080"));
        RequestContext::new(Method::GET, Uri::from_static("/"), headers)
    }

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn template(dir: &tempfile::TempDir, body: &str) -> View {
        let path = dir.path().join("index.hbs");
        std::fs::write(&path, body).unwrap();
        View::new(path)
    }

    #[tokio::test]
    async fn test_render_path() {
        let dir = tempfile::tempdir().unwrap();
        let controller = Controller::new(
            template(&dir, "Hello {{name}}"),
            FnModel::new(|_| Ok(ResponseDescriptor::new().data("name", "Ada"))),
        );

        let response = controller.run(ctx()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, "Hello Ada");
    }

    #[tokio::test]
    async fn test_render_merges_session_data_and_leaves_session_alone() {
        let dir = tempfile::tempdir().unwrap();
        let controller = Controller::new(
            template(&dir, "{{ name }} is {{ role }}"),
            FnModel::new(|_| {
                Ok(ResponseDescriptor::new()
                    .data("name", "Ada")
                    .data("role", "guest")
                    .session("role", "admin")
                    .status(201))
            }),
        );

        let ctx = ctx();
        let session = ctx.session().clone();
        let response = controller.run(ctx).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_of(response).await, "Ada is admin");
        assert!(!session.is_modified());
        assert!(!session.contains(INITIALISED_KEY));
    }

    #[tokio::test]
    async fn test_redirect_path() {
        let controller = Controller::new(
            View::empty(),
            FnModel::new(|_| {
                Ok(ResponseDescriptor::new()
                    .data("ref", "x")
                    .redirect("/done")
                    .session("userId", 7))
            }),
        );

        let ctx = ctx();
        let session = ctx.session().clone();
        let response = controller.run(ctx).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "http://localhost:8080/done?ref=x"
        );
        assert_eq!(session.get(INITIALISED_KEY), Some(json!(true)));
        assert_eq!(session.get("userId"), Some(json!(7)));
    }

    #[tokio::test]
    async fn test_redirect_status_precedence() {
        let model = Arc::new(FnModel::new(|_| Ok(ResponseDescriptor::new().redirect("/a"))));
        let mut config = LeiConfig::default();
        config.redirect.default_status = 302;

        let mut controller = Controller::from_arc(View::empty(), model.clone());
        controller.apply_defaults(&config);
        assert_eq!(controller.run(ctx()).await.unwrap().status(), StatusCode::FOUND);

        let mut controller = Controller::from_arc(View::empty(), model)
            .with_redirect_status(StatusCode::SEE_OTHER);
        controller.apply_defaults(&config);
        assert_eq!(controller.run(ctx()).await.unwrap().status(), StatusCode::SEE_OTHER);

        let explicit = Controller::new(
            View::empty(),
            FnModel::new(|_| Ok(ResponseDescriptor::new().redirect("/a").status(307))),
        );
        assert_eq!(
            explicit.run(ctx()).await.unwrap().status(),
            StatusCode::TEMPORARY_REDIRECT
        );
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let controller = Controller::new(View::empty(), FnModel::new(|_| Err("boom".into())));
        assert!(matches!(controller.run(ctx()).await, Err(LeiError::Model(_))));
    }

    #[tokio::test]
    async fn test_invalid_status_is_an_error() {
        let controller = Controller::new(
            View::empty(),
            FnModel::new(|_| Ok(ResponseDescriptor::new().status(42))),
        );
        assert!(matches!(
            controller.run(ctx()).await,
            Err(LeiError::InvalidStatus(42))
        ));

        let controller = Controller::new(
            View::empty(),
            FnModel::new(|_| Ok(ResponseDescriptor::new().status(600))),
        );
        assert!(matches!(
            controller.run(ctx()).await,
            Err(LeiError::InvalidStatus(600))
        ));
    }

    #[tokio::test]
    async fn test_missing_template_propagates() {
        let controller = Controller::new(
            View::new("/no/such/file.html"),
            FnModel::new(|_| Ok(ResponseDescriptor::new())),
        );
        assert!(matches!(
            controller.run(ctx()).await,
            Err(LeiError::TemplateRead { .. })
        ));
    }

    #[tokio::test]
    async fn test_policy_inherited_from_config() {
        let mut config = LeiConfig::default();
        config.views.template_policy = TemplatePolicy::Strict;

        let mut controller = Controller::new(View::empty(), FnModel::new(|_| Ok(ResponseDescriptor::new())));
        controller.apply_defaults(&config);
        assert!(matches!(controller.run(ctx()).await, Err(LeiError::TemplateNotSet)));
    }
}
