//! Layout serialization exchanged with the generative collaborators
//!
//! Responses are decoded leniently: prose and markdown fences around the
//! JSON body are stripped, trailing commas and cut-off endings are repaired,
//! short keys (`t`, `w`, `h`, `r`, `l`) and long keys
//! are both accepted, numbers may arrive as strings, and missing fields fall
//! back to scene defaults. Requests use the compact short-key form with
//! geometry rounded to whole units.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::layout::{ElementPatch, IdGenerator, Layout};
use crate::scene::Scene;

/// A decoded collaborator response, before it is applied to anything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub elements: Vec<ElementPatch>,
    /// Free-text plan attached to generation and refinement responses
    pub reasoning_plan: Option<String>,
    /// Step list attached to correction responses
    pub fix_strategy: Vec<String>,
}

impl Payload {
    /// Build a complete layout: canvas and element gaps are filled from the
    /// scene defaults and elements without an id receive a fresh one.
    /// Elements without a type tag are dropped.
    pub fn into_layout(self, scene: &Scene, ids: &mut IdGenerator) -> Layout {
        let width = self.width.filter(|w| *w > 0.0).unwrap_or(scene.canvas.width);
        let height = self.height.filter(|h| *h > 0.0).unwrap_or(scene.canvas.height);

        let mut layout = Layout::new(width, height);
        for patch in self.elements {
            let id = match patch.id.clone() {
                Some(id) if !id.is_empty() => id,
                _ => ids.fresh(&layout.ids()),
            };
            match patch.into_element(id.clone(), &scene.canvas) {
                Some(element) => layout = layout.with_element(element),
                None => log::warn!("Dropping element \"{}\" with no type", id),
            }
        }
        layout
    }
}

/// Remove markdown code fences and any prose around the outermost `{...}`
pub fn strip_fences(text: &str) -> String {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => cleaned[start..=end].to_string(),
        _ => cleaned.to_string(),
    }
}

/// Upper bound on how many trailing fragments a truncated response may lose
const MAX_REPAIR_CUTS: usize = 16;

/// Parse the stripped body, falling back to a lenient JSON5 reading with
/// unterminated strings and brackets closed. A body that was cut off is
/// shortened to its last complete entry.
fn parse_body(body: &str) -> Result<Value, DecodeError> {
    let strict = match serde_json::from_str(body) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let mut candidate = body;
    for _ in 0..MAX_REPAIR_CUTS {
        if let Ok(value) = json5::from_str::<Value>(&close_open(candidate)) {
            log::warn!("Repaired malformed response JSON ({})", strict);
            return Ok(value);
        }
        match candidate.rfind(',') {
            Some(cut) => candidate = &candidate[..cut],
            None => break,
        }
    }
    Err(strict.into())
}

/// Terminate an open string and close every bracket still open at the end
fn close_open(text: &str) -> String {
    let mut closers = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                closers.pop();
            }
            _ => {}
        }
    }

    let mut repaired = text.to_string();
    if let Some(q) = quote {
        if escaped {
            repaired.pop();
        }
        repaired.push(q);
    }
    repaired.extend(closers.iter().rev());
    repaired
}

/// Decode a raw collaborator response.
pub fn decode(text: &str) -> Result<Payload, DecodeError> {
    let value = parse_body(&strip_fences(text))?;
    let object = match value {
        Value::Object(object) => object,
        _ => return Err(DecodeError::NotAnObject),
    };

    let elements = match object.get("elements") {
        Some(Value::Array(items)) => items.iter().filter_map(decode_element).collect(),
        _ => Vec::new(),
    };

    Ok(Payload {
        width: number(object.get("width")),
        height: number(object.get("height")),
        elements,
        reasoning_plan: text_value(object.get("reasoning_plan")),
        fix_strategy: string_list(object.get("fix_strategy")),
    })
}

/// Decode a full layout response (generation flow)
pub fn decode_layout(text: &str, scene: &Scene, ids: &mut IdGenerator) -> Result<Layout, DecodeError> {
    Ok(decode(text)?.into_layout(scene, ids))
}

fn decode_element(value: &Value) -> Option<ElementPatch> {
    let Value::Object(object) = value else {
        log::warn!("Skipping non-object element entry: {}", value);
        return None;
    };

    Some(ElementPatch {
        id: text_value(object.get("id")).filter(|id| !id.is_empty()),
        kind: text_value(first(object, &["t", "type"])),
        x: number(object.get("x")),
        y: number(object.get("y")),
        width: number(first(object, &["w", "width"])),
        height: number(first(object, &["h", "height"])),
        rotation: number(first(object, &["r", "rotation"])),
        label: text_value(first(object, &["l", "label"])),
        sub_type: text_value(object.get("subType")),
        meta: match object.get("meta") {
            Some(Value::Object(meta)) => Some(meta.clone()),
            _ => None,
        },
    })
}

/// First present, non-null value among `keys`
fn first<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// Numbers and numeric strings; anything else is treated as absent
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn text_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| text_value(Some(v))).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

// ── Encoding ──────────────────────────────────────────────────────

/// Compact element form sent to collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireElement {
    pub id: String,
    pub t: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub r: f64,
}

/// Compact layout form sent to collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireLayout {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<WireElement>,
}

/// Simplify a layout for a collaborator request
pub fn encode(layout: &Layout) -> WireLayout {
    WireLayout {
        width: layout.width,
        height: layout.height,
        elements: layout
            .elements()
            .iter()
            .map(|e| {
                let r = e.bounds().rounded();
                WireElement {
                    id: e.id.clone(),
                    t: e.kind.clone(),
                    x: r.x,
                    y: r.y,
                    w: r.width,
                    h: r.height,
                    r: e.rotation,
                }
            })
            .collect(),
    }
}
