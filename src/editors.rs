//! Per-field editors for a Person page.
//!
//! Each editor issues one action and then either applies its [`OnSuccess`]
//! continuation or alerts the user. Nothing is cached locally; the server is
//! the source of truth and a reload shows the new state.

use std::str::FromStr;

use thiserror::Error;
use tracing::info;

use crate::action::{Action, ActionError, ActionInvoker, ActionRequest};
use crate::ids::{DocId, ExcludedKind, PersonId};
use crate::page::Page;
use crate::transport::Transport;

pub const METADATA_FORMAT_HINT: &str = "format of metadata values must be NAME : VALUE";

/// What to do with the page once an action succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnSuccess {
    Reload,
    Navigate(String),
    Stay,
}

impl From<bool> for OnSuccess {
    fn from(reload: bool) -> Self {
        if reload {
            OnSuccess::Reload
        } else {
            OnSuccess::Stay
        }
    }
}

impl OnSuccess {
    pub fn apply<P: Page + ?Sized>(&self, page: &P) {
        match self {
            OnSuccess::Reload => page.reload(),
            OnSuccess::Navigate(target) => page.navigate(target),
            OnSuccess::Stay => {}
        }
    }
}

/// Key that triggered an input handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

impl Key {
    pub fn from_code(code: u32) -> Self {
        if code == 13 {
            Key::Enter
        } else {
            Key::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPair {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MetadataFormatError {
    #[error("metadata input is empty")]
    Empty,
    #[error("metadata input has no ':' separator")]
    MissingColon,
    #[error("metadata name is empty")]
    MissingName,
    #[error("metadata value is empty")]
    MissingValue,
}

/// Split `NAME:VALUE` on the first colon and trim both sides.
pub fn parse_metadata(input: &str) -> Result<MetadataPair, MetadataFormatError> {
    if input.is_empty() {
        return Err(MetadataFormatError::Empty);
    }
    let idx = input.find(':').ok_or(MetadataFormatError::MissingColon)?;
    if idx == 0 {
        return Err(MetadataFormatError::MissingName);
    }

    let name = input[..idx].trim();
    let value = input[idx + 1..].trim();
    if name.is_empty() {
        return Err(MetadataFormatError::MissingName);
    }
    if value.is_empty() {
        return Err(MetadataFormatError::MissingValue);
    }

    Ok(MetadataPair {
        name: name.to_string(),
        value: value.to_string(),
    })
}

impl FromStr for MetadataPair {
    type Err = MetadataFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_metadata(s)
    }
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("{message}")]
    Action {
        message: String,
        #[source]
        source: ActionError,
    },
    #[error(transparent)]
    Metadata(#[from] MetadataFormatError),
}

/// Field editors bound to one invoker and one page.
pub struct FieldEditors<'a, T, P: ?Sized> {
    invoker: &'a ActionInvoker<T>,
    page: &'a P,
}

impl<'a, T, P: ?Sized> Clone for FieldEditors<'a, T, P> {
    fn clone(&self) -> Self {
        Self {
            invoker: self.invoker,
            page: self.page,
        }
    }
}

impl<'a, T: Transport, P: Page + ?Sized> FieldEditors<'a, T, P> {
    pub fn new(invoker: &'a ActionInvoker<T>, page: &'a P) -> Self {
        Self { invoker, page }
    }

    pub fn invoker(&self) -> &'a ActionInvoker<T> {
        self.invoker
    }

    pub fn page(&self) -> &'a P {
        self.page
    }

    pub async fn add_alias(
        &self,
        person: &PersonId,
        alias: &str,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::AddAlias)
            .param("person", person.as_str())
            .param("alias", alias);
        self.run(
            request,
            on_success.into(),
            format!("failed to add '{alias}' as alias for {person}"),
        )
        .await
    }

    /// Submit the alias typed into an input, but only on Enter.
    ///
    /// Returns whether a request was sent.
    pub async fn add_alias_on_key(
        &self,
        person: &PersonId,
        input: &str,
        key: Key,
        on_success: impl Into<OnSuccess>,
    ) -> Result<bool, EditError> {
        if key != Key::Enter {
            return Ok(false);
        }
        self.add_alias(person, input, on_success).await?;
        Ok(true)
    }

    pub async fn remove_alias(
        &self,
        person: &PersonId,
        alias: &str,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::RemoveAlias)
            .param("person", person.as_str())
            .param("alias", alias);
        self.run(
            request,
            on_success.into(),
            format!("failed to remove '{alias}' as alias for {person}"),
        )
        .await
    }

    pub async fn use_alias_as_name(
        &self,
        person: &PersonId,
        alias: &str,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::UseAliasAsName)
            .param("person", person.as_str())
            .param("alias", alias);
        self.run(
            request,
            on_success.into(),
            format!("failed to set '{alias}' as name for {person}"),
        )
        .await
    }

    pub async fn add_metadata(
        &self,
        person: &PersonId,
        pair: &MetadataPair,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::AddMetadata)
            .param("person", person.as_str())
            .param("name", pair.name.as_str())
            .param("value", pair.value.as_str());
        self.run(
            request,
            on_success.into(),
            format!(
                "failed to add '{}: {}' as metadata for {person}",
                pair.name, pair.value
            ),
        )
        .await
    }

    /// Parse and submit `NAME:VALUE` input on Enter. Malformed input is
    /// reported to the user and nothing is sent.
    pub async fn add_metadata_on_key(
        &self,
        person: &PersonId,
        input: &str,
        key: Key,
        on_success: impl Into<OnSuccess>,
    ) -> Result<bool, EditError> {
        if key != Key::Enter {
            return Ok(false);
        }
        let pair = match parse_metadata(input) {
            Ok(pair) => pair,
            Err(err) => {
                self.page.alert(METADATA_FORMAT_HINT);
                return Err(err.into());
            }
        };
        self.add_metadata(person, &pair, on_success).await?;
        Ok(true)
    }

    pub async fn remove_metadata(
        &self,
        person: &PersonId,
        name: &str,
        value: &str,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::RemoveMetadata)
            .param("person", person.as_str())
            .param("name", name)
            .param("value", value);
        self.run(
            request,
            on_success.into(),
            format!("failed to remove '{name}: {value}' as metadata for {person}"),
        )
        .await
    }

    pub async fn add_note(
        &self,
        person: &PersonId,
        note: &str,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::AddNote)
            .param("person", person.as_str())
            .param("note", note);
        let on_success = on_success.into();
        match self.invoker.invoke(&request).await {
            Ok(_) => {
                on_success.apply(self.page);
                Ok(())
            }
            Err(source) => {
                // Notes also show the server's explanation
                let message = format!(
                    "failed to add '{note}' as note for {person}:\n{}",
                    source.body()
                );
                Err(self.fail(message, source))
            }
        }
    }

    pub async fn add_email_address(
        &self,
        person: &PersonId,
        address: &str,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::AddEmailAddress)
            .param("person", person.as_str())
            .param("address", address);
        self.run(
            request,
            on_success.into(),
            format!("failed to add '{address}' as email address for {person}"),
        )
        .await
    }

    /// Detach `person` from the author list of `doc`.
    pub async fn remove_author(
        &self,
        doc: &DocId,
        person: &PersonId,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::RemoveAuthor)
            .param("person", person.as_str())
            .param("doc_id", doc.as_str());
        self.run(
            request,
            on_success.into(),
            format!("failed to remove '{person}' as author of {doc}"),
        )
        .await
    }

    pub async fn remove_photo(
        &self,
        person: &PersonId,
        photo: &DocId,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::RemovePhoto)
            .param("person", person.as_str())
            .param("doc_id", photo.as_str());
        self.run(
            request,
            on_success.into(),
            format!("failed to remove '{photo}' as picture of {person}"),
        )
        .await
    }

    pub async fn remove_canonical_photo(
        &self,
        person: &PersonId,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request =
            ActionRequest::new(Action::RemoveCanonicalPhoto).param("person", person.as_str());
        self.run(
            request,
            on_success.into(),
            format!("failed to remove the photo of {person}"),
        )
        .await
    }

    pub async fn make_canonical_photo(
        &self,
        person: &PersonId,
        photo: &DocId,
        on_success: impl Into<OnSuccess>,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::MakeCanonicalPhoto)
            .param("person", person.as_str())
            .param("doc_id", photo.as_str());
        self.run(
            request,
            on_success.into(),
            format!("failed to make '{photo}' the photo for {person}"),
        )
        .await
    }

    /// Clear an exclusion list; the page always reloads on success.
    pub async fn show_excluded(
        &self,
        person: &PersonId,
        kind: ExcludedKind,
    ) -> Result<(), EditError> {
        let request = ActionRequest::new(Action::ShowExcluded)
            .param("person", person.as_str())
            .param("etype", kind.as_str());
        self.run(
            request,
            OnSuccess::Reload,
            format!("failed to show excluded {kind} for {person}"),
        )
        .await
    }

    async fn run(
        &self,
        request: ActionRequest,
        on_success: OnSuccess,
        failure: String,
    ) -> Result<(), EditError> {
        match self.invoker.invoke(&request).await {
            Ok(_) => {
                info!(action = request.action().name(), "action succeeded");
                on_success.apply(self.page);
                Ok(())
            }
            Err(source) => Err(self.fail(failure, source)),
        }
    }

    fn fail(&self, message: String, source: ActionError) -> EditError {
        self.page.alert(&message);
        EditError::Action { message, source }
    }
}
