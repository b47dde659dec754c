//! The host surface editors write to.
//!
//! In a browser this is the DOM; the CLI and the tests use [`MemoryPage`],
//! which keeps element state in memory and records navigation and alerts.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::ids::DocId;
use crate::viewport::{LayoutMetrics, Rect};

/// Identifier of an element supplied by the surrounding page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Floating picture search panel
    pub fn picture_panel() -> Self {
        Self::new("PicturesSearchPanel")
    }

    /// Element the picture panel is positioned against
    pub fn layout_reference() -> Self {
        Self::new("topleveltable")
    }

    pub fn email_list(doc: &DocId) -> Self {
        Self::new(format!("{doc}-authoredemailaddresses"))
    }

    pub fn email_button(doc: &DocId) -> Self {
        Self::new(format!("{doc}-emailbutton"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// DOM-like collaborator. All methods take `&self`: the page is a shared
/// handle touched only from the UI thread.
pub trait Page {
    fn reload(&self);
    fn navigate(&self, target: &str);
    /// Blocking user-visible error
    fn alert(&self, message: &str);
    fn set_content(&self, element: &ElementId, html: String);
    fn set_visible(&self, element: &ElementId, visible: bool);
    fn set_bounds(&self, element: &ElementId, bounds: Rect);
    fn layout(&self) -> LayoutMetrics;
    fn element_bounds(&self, element: &ElementId) -> Option<Rect>;
}

/// Navigation and alert history of a [`MemoryPage`], in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PageEvent {
    Reload,
    Navigate { target: String },
    Alert { message: String },
}

#[derive(Debug, Default)]
struct PageState {
    events: Vec<PageEvent>,
    contents: BTreeMap<ElementId, String>,
    visible: BTreeMap<ElementId, bool>,
    bounds: BTreeMap<ElementId, Rect>,
}

/// In-memory page.
#[derive(Debug, Default)]
pub struct MemoryPage {
    layout: LayoutMetrics,
    elements: BTreeMap<ElementId, Rect>,
    state: RefCell<PageState>,
}

impl MemoryPage {
    pub fn new(layout: LayoutMetrics) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Register a pre-existing element with its layout bounds.
    pub fn with_element(mut self, element: ElementId, bounds: Rect) -> Self {
        self.elements.insert(element, bounds);
        self
    }

    pub fn events(&self) -> Vec<PageEvent> {
        self.state.borrow().events.clone()
    }

    pub fn reload_count(&self) -> usize {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|event| matches!(event, PageEvent::Reload))
            .count()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                PageEvent::Alert { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn content(&self, element: &ElementId) -> Option<String> {
        self.state.borrow().contents.get(element).cloned()
    }

    /// Elements with non-empty content, in id order
    pub fn contents(&self) -> Vec<(ElementId, String)> {
        self.state
            .borrow()
            .contents
            .iter()
            .filter(|(_, html)| !html.is_empty())
            .map(|(id, html)| (id.clone(), html.clone()))
            .collect()
    }

    pub fn is_visible(&self, element: &ElementId) -> bool {
        self.state
            .borrow()
            .visible
            .get(element)
            .copied()
            .unwrap_or(false)
    }

    pub fn bounds(&self, element: &ElementId) -> Option<Rect> {
        self.state.borrow().bounds.get(element).copied()
    }
}

impl Page for MemoryPage {
    fn reload(&self) {
        self.state.borrow_mut().events.push(PageEvent::Reload);
    }

    fn navigate(&self, target: &str) {
        self.state.borrow_mut().events.push(PageEvent::Navigate {
            target: target.to_string(),
        });
    }

    fn alert(&self, message: &str) {
        self.state.borrow_mut().events.push(PageEvent::Alert {
            message: message.to_string(),
        });
    }

    fn set_content(&self, element: &ElementId, html: String) {
        self.state.borrow_mut().contents.insert(element.clone(), html);
    }

    fn set_visible(&self, element: &ElementId, visible: bool) {
        self.state.borrow_mut().visible.insert(element.clone(), visible);
    }

    fn set_bounds(&self, element: &ElementId, bounds: Rect) {
        self.state.borrow_mut().bounds.insert(element.clone(), bounds);
    }

    fn layout(&self) -> LayoutMetrics {
        self.layout
    }

    fn element_bounds(&self, element: &ElementId) -> Option<Rect> {
        self.elements.get(element).copied()
    }
}
