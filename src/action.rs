//! Request building and dispatch for `/action/<Module>/<name>` endpoints.

use reqwest::Url;
use thiserror::Error;
use tracing::{debug, warn};

use crate::transport::Transport;

/// Every server action this client knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddAlias,
    RemoveAlias,
    UseAliasAsName,
    AddMetadata,
    RemoveMetadata,
    AddNote,
    AddEmailAddress,
    RemoveAuthor,
    RemovePhoto,
    RemoveCanonicalPhoto,
    MakeCanonicalPhoto,
    ShowExcluded,
    LookForPictures,
    LookForEmailAddress,
    UploadDocument,
}

impl Action {
    pub fn module(&self) -> &'static str {
        match self {
            Action::UploadDocument => "UploadDocument",
            _ => "Person",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::AddAlias => "add_alias",
            Action::RemoveAlias => "remove_alias",
            Action::UseAliasAsName => "use_alias_as_name",
            Action::AddMetadata => "add_metadata",
            Action::RemoveMetadata => "remove_metadata",
            Action::AddNote => "add_note",
            Action::AddEmailAddress => "add_email_address",
            Action::RemoveAuthor => "remove_author",
            Action::RemovePhoto => "remove_photo",
            Action::RemoveCanonicalPhoto => "remove_canonical_photo",
            Action::MakeCanonicalPhoto => "make_canonical_photo",
            Action::ShowExcluded => "show_excluded",
            Action::LookForPictures => "look_for_pictures",
            Action::LookForEmailAddress => "look_for_email_address",
            Action::UploadDocument => "add",
        }
    }

    pub fn path(&self) -> String {
        format!("/action/{}/{}", self.module(), self.name())
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("server returned status {status}: {body}")]
    Server { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ActionError {
    /// Text to show the user: the server's body when there is one
    pub fn body(&self) -> &str {
        match self {
            ActionError::Server { body, .. } => body,
            ActionError::Transport(message) | ActionError::InvalidBaseUrl(message) => message,
        }
    }
}

/// One GET against an action, with its query parameters in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    action: Action,
    params: Vec<(String, String)>,
}

impl ActionRequest {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Full URL under `base`. Every value is form-urlencoded, ids included.
    pub fn url(&self, base: &Url) -> Result<Url, ActionError> {
        if base.cannot_be_a_base() {
            return Err(ActionError::InvalidBaseUrl(base.to_string()));
        }

        let mut url = base.clone();
        let path = format!(
            "{}{}",
            base.path().trim_end_matches('/'),
            self.action.path()
        );
        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);

        if !self.params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

/// Dispatches action requests over a [`Transport`].
pub struct ActionInvoker<T> {
    base_url: Url,
    transport: T,
}

impl<T: Transport> ActionInvoker<T> {
    pub fn new(base_url: Url, transport: T) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue the request once. A 2xx status yields the body text.
    pub async fn invoke(&self, request: &ActionRequest) -> Result<String, ActionError> {
        let url = request.url(&self.base_url)?;
        debug!(action = request.action.name(), %url, "invoking action");

        let response = match self.transport.get(&url).await {
            Ok(response) => response,
            Err(err) => {
                warn!(action = request.action.name(), error = %err, "action request failed");
                return Err(err);
            }
        };

        if (200..300).contains(&response.status) {
            Ok(response.body)
        } else {
            warn!(
                action = request.action.name(),
                status = response.status,
                "action returned an error status"
            );
            Err(ActionError::Server {
                status: response.status,
                body: response.body,
            })
        }
    }
}
