//! Note model: sticky notes, their drawing overlay, and remote record I/O.
//!
//! This module defines the data that describes what is on the wall (`Note`,
//! `DrawingData`), a typed accessor over raw remote records (`Record`) that
//! applies per-field defaults, and the record shapes written back to the
//! remote collaborator.
//!
//! Data flows into this layer from the snapshot feed (raw JSON records keyed
//! by note id) and from local edits. Every field is defaulted independently,
//! so a record missing all optional fields is still renderable.

#[cfg(test)]
#[path = "note_test.rs"]
mod note_test;

use std::fmt;

use rand::Rng;
use serde::Serialize;
use serde_json::{Value, json};

use crate::camera::Point;
use crate::consts::{
    DEFAULT_BACKGROUND, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_FONT_STYLE, DEFAULT_FONT_WEIGHT,
    DEFAULT_TEXT_COLOR, DEFAULT_TEXT_DECORATION, NEW_NOTE_BACKGROUND, NOTE_DEFAULT_HEIGHT, NOTE_DEFAULT_WIDTH,
    NOTE_SPAWN_MIN, NOTE_SPAWN_SPAN, NOTE_VISUAL_SCALE,
};

/// Opaque, never-reassigned note identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raster drawing overlay captured from the note editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingData {
    /// Encoded image snapshot (a data URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// Pixel width of the surface the snapshot was taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Pixel height of the surface the snapshot was taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Destination rectangle for drawing a scaled overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawingData {
    /// Whether there is an image to paint.
    #[must_use]
    pub fn has_strokes(&self) -> bool {
        self.image_data.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Source dimensions, falling back to `fallback` for any missing side.
    #[must_use]
    pub fn source_size(&self, fallback: (f64, f64)) -> (f64, f64) {
        (self.width.unwrap_or(fallback.0), self.height.unwrap_or(fallback.1))
    }

    /// Fit the drawing into a `dest_w` × `dest_h` surface, preserving aspect
    /// ratio and centring along the slack axis.
    ///
    /// `fallback` supplies the source size when the record did not carry one.
    #[must_use]
    pub fn fit_into(&self, dest_w: f64, dest_h: f64, fallback: (f64, f64)) -> DrawRect {
        let (src_w, src_h) = self.source_size(fallback);
        if src_w <= 0.0 || src_h <= 0.0 || dest_w <= 0.0 || dest_h <= 0.0 {
            return DrawRect { x: 0.0, y: 0.0, width: dest_w.max(0.0), height: dest_h.max(0.0) };
        }
        let src_aspect = src_w / src_h;
        let dest_aspect = dest_w / dest_h;
        if src_aspect > dest_aspect {
            let height = dest_w / src_aspect;
            DrawRect { x: 0.0, y: (dest_h - height) / 2.0, width: dest_w, height }
        } else {
            let width = dest_h * src_aspect;
            DrawRect { x: (dest_w - width) / 2.0, y: 0.0, width, height: dest_h }
        }
    }
}

/// A sticky note as held in the local collection.
///
/// Timestamps are milliseconds since the Unix epoch. The serialized form is
/// the wire record; a missing drawing is written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Left edge in world coordinates.
    pub x: f64,
    /// Top edge in world coordinates.
    pub y: f64,
    /// Nominal width; geometry and hit-testing use this, not the painted size.
    pub width: f64,
    /// Nominal height.
    pub height: f64,
    pub background_color: String,
    /// Rich text markup fragment; may be empty.
    pub text: String,
    pub text_color: String,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub font_style: String,
    pub text_decoration: String,
    pub drawing_data: Option<DrawingData>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    /// A blank note as produced by the wall's "new note" button.
    ///
    /// The position is a pseudo-random point inside the spawn region.
    pub fn new_local<R: Rng>(id: NoteId, stamp: i64, rng: &mut R) -> Self {
        let origin = spawn_point(rng);
        Self {
            id,
            x: origin.x,
            y: origin.y,
            width: NOTE_DEFAULT_WIDTH,
            height: NOTE_DEFAULT_HEIGHT,
            background_color: NEW_NOTE_BACKGROUND.into(),
            text: String::new(),
            text_color: DEFAULT_TEXT_COLOR.into(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.into(),
            font_weight: DEFAULT_FONT_WEIGHT.into(),
            font_style: DEFAULT_FONT_STYLE.into(),
            text_decoration: DEFAULT_TEXT_DECORATION.into(),
            drawing_data: None,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    /// Build a note from a raw remote record, defaulting every missing or
    /// malformed field independently.
    ///
    /// The id always comes from the record's key, never from its body.
    pub fn from_record<R: Rng>(id: &str, record: &Value, now: i64, rng: &mut R) -> Self {
        let rec = Record::new(record);
        let spawn = spawn_point(rng);
        Self {
            id: NoteId::new(id),
            x: rec.number("x").unwrap_or(spawn.x),
            y: rec.number("y").unwrap_or(spawn.y),
            width: rec.number("width").unwrap_or(NOTE_DEFAULT_WIDTH),
            height: rec.number("height").unwrap_or(NOTE_DEFAULT_HEIGHT),
            background_color: rec.string("backgroundColor").unwrap_or(DEFAULT_BACKGROUND).into(),
            text: rec.string("text").unwrap_or("").into(),
            text_color: rec.string("textColor").unwrap_or(DEFAULT_TEXT_COLOR).into(),
            font_size: rec.number("fontSize").unwrap_or(DEFAULT_FONT_SIZE),
            font_family: rec.string("fontFamily").unwrap_or(DEFAULT_FONT_FAMILY).into(),
            font_weight: rec.string("fontWeight").unwrap_or(DEFAULT_FONT_WEIGHT).into(),
            font_style: rec.string("fontStyle").unwrap_or(DEFAULT_FONT_STYLE).into(),
            text_decoration: rec.string("textDecoration").unwrap_or(DEFAULT_TEXT_DECORATION).into(),
            drawing_data: rec.drawing(),
            created_at: rec.timestamp("createdAt").unwrap_or(now),
            updated_at: rec.timestamp("updatedAt").unwrap_or(now),
        }
    }

    /// The full record written to `notes/{id}`.
    #[must_use]
    pub fn to_record(&self) -> Value {
        // String keys and plain fields only; non-finite numbers become null.
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Painted size; notes render larger than their nominal box.
    #[must_use]
    pub fn visual_size(&self) -> (f64, f64) {
        (self.width * NOTE_VISUAL_SCALE, self.height * NOTE_VISUAL_SCALE)
    }

    /// Top-left corner in world coordinates.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether `world` falls inside the nominal box.
    #[must_use]
    pub fn contains(&self, world: Point) -> bool {
        world.x >= self.x && world.x <= self.x + self.width && world.y >= self.y && world.y <= self.y + self.height
    }

    /// Source size to assume for the drawing overlay.
    #[must_use]
    pub fn drawing_source_size(&self) -> Option<(f64, f64)> {
        let drawing = self.drawing_data.as_ref().filter(|d| d.has_strokes())?;
        Some(drawing.source_size((self.width, self.height)))
    }
}

/// Position-only patch merged into `notes/{id}` after a move.
#[must_use]
pub fn position_patch(x: f64, y: f64, stamp: i64) -> Value {
    json!({ "x": x, "y": y, "updatedAt": stamp })
}

fn spawn_point<R: Rng>(rng: &mut R) -> Point {
    Point::new(
        NOTE_SPAWN_MIN + rng.random::<f64>() * NOTE_SPAWN_SPAN,
        NOTE_SPAWN_MIN + rng.random::<f64>() * NOTE_SPAWN_SPAN,
    )
}

/// Typed access to fields of a raw remote note record.
pub struct Record<'a> {
    value: &'a Value,
}

impl<'a> Record<'a> {
    /// Wrap a raw record for typed access.
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// A finite number, also accepting numeric strings.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        let field = self.value.get(key)?;
        let n = match field {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(n) => Some(n),
                Err(_) => None,
            },
            _ => None,
        }?;
        n.is_finite().then_some(n)
    }

    /// A string field.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<&'a str> {
        self.value.get(key).and_then(Value::as_str)
    }

    /// A millisecond timestamp.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn timestamp(&self, key: &str) -> Option<i64> {
        let field = self.value.get(key)?;
        if let Some(ms) = field.as_i64() {
            return Some(ms);
        }
        self.number(key).map(|ms| ms as i64)
    }

    /// The drawing overlay, `None` for null or non-object values.
    #[must_use]
    pub fn drawing(&self) -> Option<DrawingData> {
        let raw = self.value.get("drawingData").filter(|v| v.is_object())?;
        let inner = Record::new(raw);
        Some(DrawingData {
            image_data: inner.string("imageData").map(str::to_owned),
            width: inner.number("width"),
            height: inner.number("height"),
        })
    }
}
