//! The value a model hands back to its controller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// String-keyed bag of JSON values used for model data, template variables and sessions.
pub type Data = serde_json::Map<String, Value>;

/// What a model wants the controller to do with the current request.
///
/// With `redirect` set, `data` becomes query parameters on the redirect target
/// and `session_data` is written into the session. Otherwise `data` and
/// `session_data` are merged and rendered by the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    #[serde(default)]
    pub data: Data,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_data: Option<Data>,
}

impl ResponseDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor carrying the given data and nothing else.
    pub fn with_data(data: Data) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Insert one data entry.
    pub fn data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Insert one session entry.
    pub fn session(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.session_data
            .get_or_insert_with(Data::new)
            .insert(key.into(), value.into());
        self
    }

    /// Redirect target, if any. An empty target counts as no redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect.as_deref().filter(|target| !target.is_empty())
    }

    /// Template variables: `data` overlaid with `session_data`.
    pub fn render_vars(&self) -> Data {
        let mut vars = self.data.clone();
        if let Some(session_data) = &self.session_data {
            for (key, value) in session_data {
                vars.insert(key.clone(), value.clone());
            }
        }
        vars
    }
}
