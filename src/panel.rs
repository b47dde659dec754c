//! Floating picture search panel for a Person page.
//!
//! One [`PictureSearchPanel`] is one session of the panel: it owns the
//! visibility state and the reload-on-hide flag, so nothing leaks between
//! panels. State lives in `Cell`s; a `hide` may run while a `reveal` is
//! still waiting on its search.

use std::cell::Cell;

use sha1::{Digest, Sha1};
use thiserror::Error;
use tracing::{debug, warn};

use crate::action::{Action, ActionError, ActionRequest};
use crate::editors::{EditError, FieldEditors, OnSuccess};
use crate::ids::{DocId, PersonId};
use crate::page::{ElementId, Page};
use crate::render;
use crate::transport::Transport;
use crate::viewport::{page_size, panel_bounds, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Hidden,
    Visible,
}

/// Result of a completed search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Displayed,
    /// The panel was hidden or reopened before the search finished
    Discarded,
}

/// An image found by the search, as offered to the user.
#[derive(Debug, Clone)]
pub struct PictureCandidate {
    pub person: PersonId,
    pub title: String,
    pub photo_url: String,
    /// Usually the search engine's thumbnail of the same image
    pub backup_url: String,
    pub category: Option<String>,
    /// Control that shows progress for this candidate
    pub control: ElementId,
    pub make_canonical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PictureAdded {
    Canonical(DocId),
    Attached(DocId),
}

#[derive(Debug, Error)]
pub enum PictureError {
    #[error("picture search failed for {person}")]
    Search {
        person: PersonId,
        #[source]
        source: ActionError,
    },
    #[error("couldn't add picture to repository: {}", .source.body())]
    Upload {
        #[source]
        source: ActionError,
    },
    #[error(transparent)]
    Canonical(#[from] EditError),
}

/// Stable control id for a search result: sha1 of the image URL plus `suffix`.
pub fn control_id(photo_url: &str, suffix: &str) -> ElementId {
    let mut hasher = Sha1::new();
    hasher.update(photo_url.as_bytes());
    ElementId::new(format!("{:x}-{suffix}", hasher.finalize()))
}

pub struct PictureSearchPanel<'a, T, P: ?Sized> {
    editors: FieldEditors<'a, T, P>,
    panel: ElementId,
    reference: ElementId,
    visible: Cell<bool>,
    reload_on_hide: Cell<bool>,
    generation: Cell<u64>,
}

impl<'a, T: Transport, P: Page + ?Sized> PictureSearchPanel<'a, T, P> {
    pub fn new(editors: FieldEditors<'a, T, P>) -> Self {
        Self::with_elements(
            editors,
            ElementId::picture_panel(),
            ElementId::layout_reference(),
        )
    }

    pub fn with_elements(
        editors: FieldEditors<'a, T, P>,
        panel: ElementId,
        reference: ElementId,
    ) -> Self {
        Self {
            editors,
            panel,
            reference,
            visible: Cell::new(false),
            reload_on_hide: Cell::new(false),
            generation: Cell::new(0),
        }
    }

    pub fn state(&self) -> PanelState {
        if self.visible.get() {
            PanelState::Visible
        } else {
            PanelState::Hidden
        }
    }

    pub fn reload_on_hide(&self) -> bool {
        self.reload_on_hide.get()
    }

    pub fn panel(&self) -> &ElementId {
        &self.panel
    }

    /// Show the panel over the reference element and run the search.
    pub async fn reveal(&self, person: &PersonId) -> Result<SearchOutcome, PictureError> {
        let page = self.editors.page();
        let size = page_size(&page.layout());
        let reference = page.element_bounds(&self.reference).unwrap_or(Rect {
            left: 0,
            top: 0,
            width: size.window_width,
            height: size.window_height,
        });

        page.set_content(&self.panel, render::loading_indicator());
        page.set_bounds(&self.panel, panel_bounds(reference, &size));
        page.set_visible(&self.panel, true);
        self.visible.set(true);
        self.reload_on_hide.set(false);

        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let request = ActionRequest::new(Action::LookForPictures)
            .param("headless", "true")
            .param("person", person.as_str());
        let result = self.editors.invoker().invoke(&request).await;

        if !self.visible.get() || self.generation.get() != generation {
            debug!(%person, "discarding stale picture search result");
            return Ok(SearchOutcome::Discarded);
        }

        match result {
            Ok(body) => {
                page.set_content(&self.panel, render::picture_panel(&body));
                Ok(SearchOutcome::Displayed)
            }
            Err(source) => {
                page.alert(&format!("Couldn't run the picture search for {person}"));
                self.hide();
                Err(PictureError::Search {
                    person: person.clone(),
                    source,
                })
            }
        }
    }

    /// Clear and hide the panel. Reloads if a picture was attached while it
    /// was open.
    pub fn hide(&self) {
        let page = self.editors.page();
        page.set_content(&self.panel, String::new());
        page.set_visible(&self.panel, false);
        self.visible.set(false);

        if self.reload_on_hide.replace(false) {
            page.reload();
        }
    }

    /// Upload a found image as a new document, falling back once to the
    /// backup URL, then optionally make it the canonical photo.
    pub async fn add_as_picture(
        &self,
        candidate: &PictureCandidate,
    ) -> Result<PictureAdded, PictureError> {
        let page = self.editors.page();
        page.set_content(&candidate.control, render::saving());

        let doc = match self.upload(candidate, &candidate.photo_url).await {
            Ok(doc) => doc,
            Err(err) => {
                warn!(url = %candidate.photo_url, error = %err, "primary picture upload failed");
                page.set_content(
                    &candidate.control,
                    render::primary_upload_failed(&candidate.photo_url),
                );
                match self.upload(candidate, &candidate.backup_url).await {
                    Ok(doc) => doc,
                    Err(source) => {
                        page.set_content(&candidate.control, render::upload_failed(source.body()));
                        return Err(PictureError::Upload { source });
                    }
                }
            }
        };

        page.set_content(&candidate.control, render::saved());

        if candidate.make_canonical {
            self.editors
                .make_canonical_photo(&candidate.person, &doc, OnSuccess::Reload)
                .await?;
            Ok(PictureAdded::Canonical(doc))
        } else {
            self.reload_on_hide.set(true);
            Ok(PictureAdded::Attached(doc))
        }
    }

    async fn upload(&self, candidate: &PictureCandidate, url: &str) -> Result<DocId, ActionError> {
        let mut request = ActionRequest::new(Action::UploadDocument)
            .param("wait", "true")
            .param("no-redirect", "true")
            .param("URL", url);
        if let Some(category) = candidate.category.as_deref().filter(|c| !c.is_empty()) {
            request = request.param("md-categories", category);
        }
        request = request.param("md-title", candidate.title.as_str());

        let body = self.editors.invoker().invoke(&request).await?;
        let doc_id = body.trim();
        if doc_id.is_empty() {
            return Err(ActionError::Server {
                status: 200,
                body: "upload returned no document id".to_string(),
            });
        }
        Ok(DocId::new(doc_id))
    }
}
