//! Template-backed views.
//!
//! Templates use minijinja syntax (`{{ name }}`, filters, `{% if %}` blocks).
//! Output is HTML-escaped unless the template file is plain text (`.txt`,
//! `.text`), so `.hbs` and extension-less templates escape like `.html`.

use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment};
use serde::{Deserialize, Serialize};

use crate::error::{LeiError, Result};
use crate::mvc::descriptor::Data;

/// What to do when a view is rendered without a template file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplatePolicy {
    /// Fail with [`LeiError::TemplateNotSet`].
    Strict,
    /// Render an empty string.
    #[default]
    Lenient,
}

/// A template file plus a variable bag.
#[derive(Debug, Clone, Default)]
pub struct View {
    template: Option<PathBuf>,
    vars: Data,
    policy: Option<TemplatePolicy>,
}

impl View {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }

    pub fn with_vars(template: impl Into<PathBuf>, vars: Data) -> Self {
        Self {
            template: Some(template.into()),
            vars,
            policy: None,
        }
    }

    /// A view with no template file.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fix the template policy for this view instead of inheriting the engine's.
    pub fn with_policy(mut self, policy: TemplatePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Replace the variable bag. Previous variables are dropped, not merged.
    pub fn set_vars(&mut self, vars: Data) {
        self.vars = vars;
    }

    /// Replace the template file. Existence is only checked when rendering.
    pub fn set_view_file(&mut self, template: impl Into<PathBuf>) {
        self.template = Some(template.into());
    }

    pub fn vars(&self) -> &Data {
        &self.vars
    }

    pub fn template_path(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    pub fn policy(&self) -> TemplatePolicy {
        self.policy.unwrap_or_default()
    }

    pub(crate) fn inherit_policy(&mut self, policy: TemplatePolicy) {
        self.policy.get_or_insert(policy);
    }

    /// Render the template with the stored variable bag.
    pub async fn compile(&self) -> Result<String> {
        self.render(&self.vars).await
    }

    /// Render the template with the given variables, leaving the stored bag untouched.
    pub async fn render(&self, vars: &Data) -> Result<String> {
        let path = match self
            .template
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
        {
            Some(path) => path,
            None => {
                return match self.policy() {
                    TemplatePolicy::Lenient => Ok(String::new()),
                    TemplatePolicy::Strict => Err(LeiError::TemplateNotSet),
                }
            }
        };

        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LeiError::TemplateRead {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::trace!(template = %path.display(), vars = vars.len(), "Rendering template");
        render_source(&path.to_string_lossy(), &source, vars)
    }
}

fn render_source(name: &str, source: &str, vars: &Data) -> Result<String> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(auto_escape);
    let template = env.template_from_named_str(name, source)?;
    Ok(template.render(vars)?)
}

fn auto_escape(name: &str) -> AutoEscape {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("txt" | "text") => AutoEscape::None,
        _ => AutoEscape::Html,
    }
}
