//! Email address discovery for documents authored by a person.
//!
//! Each document row has a list element and a toggle button. Showing always
//! asks the server again; nothing is cached between toggles.

use tracing::debug;

use crate::action::{Action, ActionRequest};
use crate::editors::{EditError, FieldEditors, OnSuccess};
use crate::ids::{DocId, PersonId};
use crate::page::{ElementId, Page};
use crate::render;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailToggle {
    Show,
    Hide,
}

/// Split the server's newline-separated (HTML-escaped) address list.
pub fn parse_addresses(body: &str) -> Vec<String> {
    body.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(render::decode_entities)
        .collect()
}

pub struct EmailDiscovery<'a, T, P: ?Sized> {
    editors: FieldEditors<'a, T, P>,
}

impl<'a, T: Transport, P: Page + ?Sized> EmailDiscovery<'a, T, P> {
    pub fn new(editors: FieldEditors<'a, T, P>) -> Self {
        Self { editors }
    }

    pub async fn toggle(
        &self,
        doc: &DocId,
        person: &PersonId,
        mode: EmailToggle,
    ) -> Result<Vec<String>, EditError> {
        match mode {
            EmailToggle::Show => self.show(doc, person).await,
            EmailToggle::Hide => {
                self.hide(doc, person);
                Ok(Vec::new())
            }
        }
    }

    /// Search `doc` for addresses and list them with an add control each.
    pub async fn show(&self, doc: &DocId, person: &PersonId) -> Result<Vec<String>, EditError> {
        let page = self.editors.page();
        let request = ActionRequest::new(Action::LookForEmailAddress)
            .param("person", person.as_str())
            .param("doc_id", doc.as_str());

        let body = match self.editors.invoker().invoke(&request).await {
            Ok(body) => body,
            Err(source) => {
                let message = format!(
                    "failed to find email addresses in '{doc}' for {person}:\n{}",
                    source.body()
                );
                page.alert(&message);
                return Err(EditError::Action { message, source });
            }
        };

        let addresses = parse_addresses(&body);
        debug!(%doc, count = addresses.len(), "email addresses discovered");

        if addresses.is_empty() {
            page.set_content(&ElementId::email_list(doc), render::no_email_addresses());
            page.set_content(&ElementId::email_button(doc), String::new());
        } else {
            page.set_content(
                &ElementId::email_list(doc),
                render::email_list(person, &addresses),
            );
            page.set_content(
                &ElementId::email_button(doc),
                render::email_hide_button(doc, person),
            );
        }
        Ok(addresses)
    }

    pub fn hide(&self, doc: &DocId, person: &PersonId) {
        let page = self.editors.page();
        page.set_content(&ElementId::email_list(doc), String::new());
        page.set_content(
            &ElementId::email_button(doc),
            render::email_show_button(doc, person),
        );
    }

    /// The "Add this email address" control: add and reload.
    pub async fn add(&self, person: &PersonId, address: &str) -> Result<(), EditError> {
        self.editors
            .add_email_address(person, address, OnSuccess::Reload)
            .await
    }
}
