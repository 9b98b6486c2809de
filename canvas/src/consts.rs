//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest permitted zoom factor.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest permitted zoom factor.
pub const ZOOM_MAX: f64 = 3.0;

/// Multiplier applied per wheel event when zooming out (`deltaY > 0`).
pub const WHEEL_ZOOM_OUT: f64 = 0.95;

/// Multiplier applied per wheel event when zooming in.
pub const WHEEL_ZOOM_IN: f64 = 1.05;

/// Damping applied to wheel/trackpad deltas when panning.
pub const WHEEL_PAN_DAMPING: f64 = 0.5;

/// Step used by the toolbar zoom buttons.
pub const TOOLBAR_ZOOM_STEP: f64 = 1.2;

/// Side length of the square world canvas, in world units.
pub const CANVAS_SIZE: f64 = 5000.0;

/// Viewport width assumed until the host reports one, in CSS pixels.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;

/// Viewport height assumed until the host reports one, in CSS pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

/// Background dot grid pitch at zoom 1, in CSS pixels.
pub const GRID_SPACING_PX: f64 = 20.0;

// ── Notes ───────────────────────────────────────────────────────

/// Nominal width of a new note.
pub const NOTE_DEFAULT_WIDTH: f64 = 200.0;

/// Nominal height of a new note.
pub const NOTE_DEFAULT_HEIGHT: f64 = 200.0;

/// Notes are painted this much larger than their nominal size.
pub const NOTE_VISUAL_SCALE: f64 = 1.25;

/// Lower bound of the region where position-less notes are placed.
pub const NOTE_SPAWN_MIN: f64 = 100.0;

/// Side length of the region where position-less notes are placed.
pub const NOTE_SPAWN_SPAN: f64 = 400.0;

/// Background of a record that does not carry one.
pub const DEFAULT_BACKGROUND: &str = "#FFE066";

/// Background of a note made with the wall's "new note" button.
pub const NEW_NOTE_BACKGROUND: &str = "#87CEEB";

/// Text color when the record has none.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Font size in pixels when the record has none.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Font family when the record has none.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// CSS `font-weight` when the record has none.
pub const DEFAULT_FONT_WEIGHT: &str = "normal";

/// CSS `font-style` when the record has none.
pub const DEFAULT_FONT_STYLE: &str = "normal";

/// CSS `text-decoration` when the record has none.
pub const DEFAULT_TEXT_DECORATION: &str = "none";

/// Font families offered by the note editor.
pub const FONT_FAMILIES: [&str; 5] = ["Arial", "Helvetica", "Georgia", "Verdana", "Comic Sans MS"];

/// Pixel sizes behind the editor's 1-based `<font size>` steps.
pub const FONT_SIZES: [f64; 8] = [12.0, 14.0, 16.0, 18.0, 20.0, 24.0, 28.0, 32.0];

/// Size used when a `<font size>` step is out of range.
pub const FONT_SIZE_FALLBACK: f64 = 16.0;

/// Background colors offered to anonymous submitters.
pub const SUBMIT_PALETTE: [&str; 10] = [
    "#FFE066", "#FFB6C1", "#87CEEB", "#98FB98", "#FFD166", "#A685E2", "#FFFFFF", "#F0E68C", "#FFA07A", "#20B2AA",
];

// ── Timers ──────────────────────────────────────────────────────

/// How long a single click waits for a possible second click, in milliseconds.
pub const CLICK_DELAY_MS: u64 = 200;

/// Grace period during which a bulk delete can be undone, in milliseconds.
pub const UNDO_GRACE_MS: u64 = 3000;

/// Title typed by the wall's header animation.
pub const TYPING_TEXT: &str = "DigiWall";

/// Delay before each typed character, in milliseconds.
pub const TYPING_CHAR_MS: u64 = 80;

/// Pause with the full title shown, in milliseconds.
pub const TYPING_HOLD_MS: u64 = 1200;

/// Delay before each erased character, in milliseconds.
pub const TYPING_DELETE_MS: u64 = 40;

/// Pause with the title fully erased, in milliseconds.
pub const TYPING_RESTART_MS: u64 = 800;

/// Remote collection path holding every note.
pub const NOTES_PATH: &str = "notes";
