//! Core layout data: elements and the canvas that holds them

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::geometry::Rect;

/// One placed rectangular object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Identity, unique within a layout
    pub id: String,
    /// Scene-defined type tag (e.g. `wall`, `driving_lane`)
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees, clockwise positive
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            rotation: 0.0,
            label: None,
            sub_type: None,
            meta: Map::new(),
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Check the element's type tag
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

/// A canvas plus the elements placed on it.
///
/// Transforms never mutate a layout in place; they build a new one with
/// [`Layout::with_elements`] so callers can keep earlier versions around.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    elements: Vec<Element>,
}

impl Layout {
    /// Create an empty layout
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Create a layout from a list of elements.
    ///
    /// A later element with an already-seen identity replaces the earlier
    /// one in place, so identities stay unique.
    pub fn from_elements(width: f64, height: f64, elements: Vec<Element>) -> Self {
        let mut layout = Self::new(width, height);
        for element in elements {
            layout.upsert(element);
        }
        layout
    }

    /// Add an element, replacing any existing element with the same identity
    pub fn with_element(mut self, element: Element) -> Self {
        self.upsert(element);
        self
    }

    /// Same canvas, new element set
    pub fn with_elements(&self, elements: Vec<Element>) -> Self {
        Self::from_elements(self.width, self.height, elements)
    }

    /// Same canvas, only the elements matching `keep`
    pub fn retain(&self, mut keep: impl FnMut(&Element) -> bool) -> Self {
        Self {
            width: self.width,
            height: self.height,
            elements: self.elements.iter().filter(|e| keep(e)).cloned().collect(),
        }
    }

    /// Same canvas, every element passed through `f`
    pub fn map(&self, f: impl FnMut(&Element) -> Element) -> Self {
        self.with_elements(self.elements.iter().map(f).collect())
    }

    fn upsert(&mut self, element: Element) {
        match self.elements.iter_mut().find(|e| e.id == element.id) {
            Some(existing) => *existing = element,
            None => self.elements.push(element),
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get an element by identity
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    /// All identities currently in use
    pub fn ids(&self) -> HashSet<String> {
        self.elements.iter().map(|e| e.id.clone()).collect()
    }

    /// Elements of one type, in layout order
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |e| e.kind == kind)
    }

    /// Bounds of one type, in layout order
    pub fn bounds_of(&self, kind: &str) -> Vec<Rect> {
        self.of_kind(kind).map(Element::bounds).collect()
    }

    /// The canvas rectangle `[0, width] x [0, height]`
    pub fn canvas(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Copy with every element's position and size rounded to whole units
    pub fn rounded(&self) -> Self {
        self.map(|e| {
            let r = e.bounds().rounded();
            Element {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                ..e.clone()
            }
        })
    }
}
