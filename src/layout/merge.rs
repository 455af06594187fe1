//! Identity-keyed merge of partial element updates into a layout

use serde_json::{Map, Value};

use crate::scene::CanvasDefaults;

use super::geometry::Rect;
use super::ids::IdGenerator;
use super::types::{Element, Layout};

/// A partial element: every field is optional and only present fields are
/// applied when overlaying an existing element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub label: Option<String>,
    pub sub_type: Option<String>,
    pub meta: Option<Map<String, Value>>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Full patch describing an existing element
    pub fn from_element(element: &Element) -> Self {
        Self {
            id: Some(element.id.clone()),
            kind: Some(element.kind.clone()),
            x: Some(element.x),
            y: Some(element.y),
            width: Some(element.width),
            height: Some(element.height),
            rotation: Some(element.rotation),
            label: element.label.clone(),
            sub_type: element.sub_type.clone(),
            meta: (!element.meta.is_empty()).then(|| element.meta.clone()),
        }
    }

    /// Overlay the present fields onto `element`; the identity never changes
    pub fn apply_to(&self, element: &Element) -> Element {
        let mut out = element.clone();
        if let Some(kind) = &self.kind {
            out.kind = kind.clone();
        }
        if let Some(x) = self.x {
            out.x = x;
        }
        if let Some(y) = self.y {
            out.y = y;
        }
        if let Some(width) = self.width {
            out.width = width;
        }
        if let Some(height) = self.height {
            out.height = height;
        }
        if let Some(rotation) = self.rotation {
            out.rotation = rotation;
        }
        if let Some(label) = &self.label {
            out.label = Some(label.clone());
        }
        if let Some(sub_type) = &self.sub_type {
            out.sub_type = Some(sub_type.clone());
        }
        if let Some(meta) = &self.meta {
            out.meta = meta.clone();
        }
        out
    }

    /// Build a new element under `id`, filling gaps from the canvas defaults.
    /// Returns `None` when the patch has no type tag.
    pub fn into_element(self, id: String, defaults: &CanvasDefaults) -> Option<Element> {
        let kind = self.kind?;
        let bounds = Rect::new(
            self.x.unwrap_or(0.0),
            self.y.unwrap_or(0.0),
            self.width.unwrap_or(defaults.element_width),
            self.height.unwrap_or(defaults.element_height),
        );
        let mut element = Element::new(id, kind, bounds).with_rotation(self.rotation.unwrap_or(0.0));
        element.label = self.label;
        element.sub_type = self.sub_type;
        element.meta = self.meta.unwrap_or_default();
        Some(element)
    }
}

/// Fold `updates` into `original` by identity.
///
/// Updates are applied in order. A patch whose id names an element already
/// in the working set overlays it field by field; any other patch becomes a
/// new element, keeping its id when it has one and receiving a fresh one
/// otherwise. Elements no update touches are kept as they were.
pub fn merge(
    original: &Layout,
    updates: Vec<ElementPatch>,
    ids: &mut IdGenerator,
    defaults: &CanvasDefaults,
) -> Layout {
    let mut elements: Vec<Element> = original.elements().to_vec();
    let mut taken = original.ids();

    for patch in updates {
        let existing = patch
            .id
            .as_deref()
            .and_then(|id| elements.iter().position(|e| e.id == id));

        if let Some(index) = existing {
            elements[index] = patch.apply_to(&elements[index]);
            continue;
        }

        let id = match patch.id.clone() {
            Some(id) if !id.is_empty() => id,
            _ => ids.fresh(&taken),
        };
        match patch.into_element(id.clone(), defaults) {
            Some(element) => {
                taken.insert(id);
                elements.push(element);
            }
            None => log::warn!("Dropping new element \"{}\" with no type", id),
        }
    }

    original.with_elements(elements)
}
