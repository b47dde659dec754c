//! Page and window measurement.
//!
//! Hosts report whatever layout properties they have in a [`LayoutMetrics`]
//! snapshot; [`page_size`] picks the best available source for each value.

use serde::{Deserialize, Serialize};

/// Raw layout measurements. Any of them may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    pub inner_width: Option<u32>,
    pub inner_height: Option<u32>,
    pub scroll_max_x: Option<u32>,
    pub scroll_max_y: Option<u32>,
    pub body_scroll_width: Option<u32>,
    pub body_scroll_height: Option<u32>,
    pub body_offset_width: Option<u32>,
    pub body_offset_height: Option<u32>,
    pub doc_client_width: Option<u32>,
    pub doc_client_height: Option<u32>,
    pub body_client_width: Option<u32>,
    pub body_client_height: Option<u32>,
}

impl LayoutMetrics {
    /// Snapshot of a page that exactly fills a `width` x `height` window.
    pub fn fixed(width: u32, height: u32) -> Self {
        Self {
            inner_width: Some(width),
            inner_height: Some(height),
            doc_client_width: Some(width),
            doc_client_height: Some(height),
            body_offset_width: Some(width),
            body_offset_height: Some(height),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSize {
    pub page_width: u32,
    pub page_height: u32,
    pub window_width: u32,
    pub window_height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Scrollable content size and visible viewport size.
///
/// Page dimensions are never smaller than the window on either axis.
pub fn page_size(m: &LayoutMetrics) -> PageSize {
    let (scroll_width, scroll_height) = scroll_extent(m);
    let (window_width, window_height) = window_extent(m);

    PageSize {
        page_width: scroll_width.max(window_width),
        page_height: scroll_height.max(window_height),
        window_width,
        window_height,
    }
}

fn scroll_extent(m: &LayoutMetrics) -> (u32, u32) {
    let v = |x: Option<u32>| x.unwrap_or(0);

    if let (Some(inner_height), Some(max_y)) = (m.inner_height, m.scroll_max_y) {
        if inner_height > 0 && max_y > 0 {
            return (
                v(m.inner_width).saturating_add(v(m.scroll_max_x)),
                inner_height.saturating_add(max_y),
            );
        }
    }

    if v(m.body_scroll_height) > v(m.body_offset_height) {
        return (v(m.body_scroll_width), v(m.body_scroll_height));
    }

    (v(m.body_offset_width), v(m.body_offset_height))
}

fn window_extent(m: &LayoutMetrics) -> (u32, u32) {
    if let Some(inner_height) = m.inner_height.filter(|h| *h > 0) {
        let width = m
            .doc_client_width
            .filter(|w| *w > 0)
            .or(m.inner_width)
            .unwrap_or(0);
        return (width, inner_height);
    }

    if let Some(client_height) = m.doc_client_height.filter(|h| *h > 0) {
        return (m.doc_client_width.unwrap_or(0), client_height);
    }

    (
        m.body_client_width.unwrap_or(0),
        m.body_client_height.unwrap_or(0),
    )
}

/// Floating panel placement: aligned with `reference`, full page height.
pub fn panel_bounds(reference: Rect, size: &PageSize) -> Rect {
    Rect {
        left: reference.left,
        top: reference.top,
        width: reference.width,
        height: size.page_height,
    }
}
