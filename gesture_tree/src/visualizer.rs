//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                          ✦                                 │
//! │        [img]            ▲▲▲         [img]                  │
//! │                        ▲▲▲▲▲     particles, ornaments,     │
//! │           [IMG]       ▲▲▲▲▲▲▲    lights, star, image ring  │
//! │                        ▌▌                                  │
//! │  status bar                                                │
//! │  key legend                                                │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Images are drawn as placeholder cards labelled with their file name;
//! the zoom overlay is the same card, centred and enlarged.

use std::time::Duration;

use glam::Vec3;
use minifb::{Key, KeyRepeat, MouseButton, Window, WindowOptions};
use thiserror::Error;
use tree_morph::{spin_y, ConfigError, Rgb, SceneEvent, SceneFrame};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("cannot open window: {0}")]
    Window(#[from] minifb::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 960;
pub const WIN_H:       usize = 720;
const STATUS_Y:        usize = WIN_H - 36;
const BG_COLOR:        u32   = 0xFF0B1026;
const STATUS_BG:       u32   = 0xFF16213E;
const STAR_COLOR:      u32   = 0xFFFFE066;
const SELECT_COLOR:    u32   = 0xFFFFD700;
const CARD_TEXT:       u32   = 0xFF101010;
const CARD_COLORS:     [u32; 4] = [0xFFE8D5B7, 0xFFB7D5E8, 0xFFD5E8B7, 0xFFE8B7C8];

/// One-shot key bindings.  `Z` is handled separately (press and release).
const KEY_BINDINGS: [(Key, SceneEvent); 6] = [
    (Key::T,      SceneEvent::Converge),
    (Key::E,      SceneEvent::Explode),
    (Key::Space,  SceneEvent::Explode),
    (Key::Left,   SceneEvent::SelectPrevious),
    (Key::Right,  SceneEvent::SelectNext),
    (Key::Escape, SceneEvent::CloseOverlay),
];

const LEGEND: &str =
    "T=tree  E/Space=explode  Left/Right=select  hold Z=zoom  Esc/click=close  Q=quit";

// ════════════════════════════════════════════════════════════════════════════
// Camera: fixed perspective looking down -z
// ════════════════════════════════════════════════════════════════════════════

/// Screen position of a projected point plus pixels per world unit there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x:     f32,
    pub y:     f32,
    pub scale: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// Camera z; the scene origin is this far in front of it.
    pub distance: f32,
    pub focal:    f32,
    pub center_x: f32,
    pub center_y: f32,
}

impl Camera {
    const NEAR: f32 = 0.5;

    pub fn for_viewport(width: usize, height: usize) -> Self {
        Camera {
            distance: 32.0,
            focal:    height as f32 * 1.1,
            center_x: width as f32 / 2.0,
            center_y: height as f32 / 2.0,
        }
    }

    /// `None` when `p` is behind the near plane.
    pub fn project(&self, p: Vec3) -> Option<Projected> {
        let depth = self.distance - p.z;
        if depth < Self::NEAR {
            return None;
        }
        let scale = self.focal / depth;
        Some(Projected {
            x: self.center_x + p.x * scale,
            y: self.center_y - p.y * scale,
            scale,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    canvas:     Canvas,
    camera:     Camera,
    mouse_down: bool,
}

impl Visualizer {
    pub fn new() -> Result<Self, ViewerError> {
        let mut window = Window::new(
            "Gesture Tree",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(WIN_W, WIN_H),
            camera: Camera::for_viewport(WIN_W, STATUS_Y),
            mouse_down: false,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Translate this frame's keys and clicks into scene events.  Returns
    /// false on quit.
    pub fn poll_input(&mut self, events: &mut Vec<SceneEvent>) -> bool {
        if !self.window.is_open() { return false; }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No) {
            return false;
        }
        for (key, event) in KEY_BINDINGS {
            if self.window.is_key_pressed(key, KeyRepeat::No) {
                events.push(event);
            }
        }

        // Zoom while held
        if self.window.is_key_pressed(Key::Z, KeyRepeat::No) {
            events.push(SceneEvent::Zoom);
        }
        if self.window.is_key_released(Key::Z) {
            events.push(SceneEvent::Release);
        }

        // Click anywhere closes the overlay; fire on the press edge only.
        let down = self.window.get_mouse_down(MouseButton::Left);
        if down && !self.mouse_down {
            events.push(SceneEvent::CloseOverlay);
        }
        self.mouse_down = down;

        true
    }

    /// Render one frame.
    pub fn render(&mut self, frame: &SceneFrame<'_>, status: &str) -> Result<(), ViewerError> {
        draw_scene(&mut self.canvas, &self.camera, frame, status);
        self.window.update_with_buffer(&self.canvas.buf, WIN_W, WIN_H)?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene drawing (window-independent)
// ════════════════════════════════════════════════════════════════════════════

fn draw_scene(c: &mut Canvas, cam: &Camera, frame: &SceneFrame<'_>, status: &str) {
    c.buf.fill(BG_COLOR);

    // ── Particle field ────────────────────────────────────────────────────
    let positions = frame.particle_positions.chunks_exact(3);
    let colors = frame.particle_colors.chunks_exact(3);
    for ((pos, rgb), &size) in positions.zip(colors).zip(frame.particle_sizes) {
        let p = spin_y(Vec3::from_slice(pos), frame.particle_rotation);
        if let Some(s) = cam.project(p) {
            let color = Rgb { r: rgb[0], g: rgb[1], b: rgb[2] }.to_argb();
            c.disc(s.x, s.y, size * s.scale * 0.5, color, 1.0);
        }
    }

    // ── Ornaments and lights ──────────────────────────────────────────────
    for (pose, color) in frame.ornaments.iter().zip(frame.ornament_colors) {
        if let Some(s) = cam.project(pose.position) {
            c.disc(s.x, s.y, pose.scale * s.scale, color.to_argb(), pose.opacity);
        }
    }
    for (pose, color) in frame.lights.iter().zip(frame.light_colors) {
        if let Some(s) = cam.project(pose.position) {
            c.disc(s.x, s.y, pose.scale * s.scale, color.to_argb(), pose.opacity);
        }
    }

    // ── Star ──────────────────────────────────────────────────────────────
    if let Some(s) = cam.project(frame.star.position) {
        c.diamond(s.x, s.y, frame.star.scale * s.scale, STAR_COLOR);
    }

    // ── Image ring, far to near ───────────────────────────────────────────
    let mut order: Vec<usize> = (0..frame.images.len()).collect();
    order.sort_by(|&a, &b| frame.images[a].position.z.total_cmp(&frame.images[b].position.z));
    for i in order {
        let slot = &frame.images[i];
        if slot.opacity < 0.01 { continue; }
        if let Some(s) = cam.project(slot.position) {
            let w = slot.scale * s.scale;
            let name = image_label(frame.image_names, i);
            c.card(s.x, s.y, w, w * 0.75, CARD_COLORS[i % CARD_COLORS.len()], slot.opacity, &name, 1);
            if slot.is_selected {
                c.border_centered(s.x, s.y, w + 4.0, w * 0.75 + 4.0, SELECT_COLOR);
            }
        }
    }

    // ── Zoom overlay ──────────────────────────────────────────────────────
    if let Some(i) = frame.zoomed {
        c.dim(0.65);
        let w = WIN_W as f32 * 0.6;
        let (cx, cy) = (WIN_W as f32 / 2.0, STATUS_Y as f32 / 2.0);
        let name = image_label(frame.image_names, i);
        c.card(cx, cy, w, w * 0.75, CARD_COLORS[i % CARD_COLORS.len()], 1.0, &name, 3);
        c.border_centered(cx, cy, w + 6.0, w * 0.75 + 6.0, SELECT_COLOR);
        c.text("click or Esc to close", cx as usize - 42, (cy + w * 0.375) as usize + 12, 0xFFCCCCCC, 1);
    }

    // ── Status bar and legend ─────────────────────────────────────────────
    c.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, STATUS_BG);
    let line = format!("{}  |  {}  {:>3}%", status, frame.state, (frame.progress * 100.0).round());
    c.text(&line, 10, STATUS_Y + 8, 0xFFEEEEEE, 1);
    c.text(LEGEND, 10, WIN_H - 14, 0xFF888888, 1);
}

/// File name without directories, or `#n` when the list is short.
fn image_label(names: &[String], index: usize) -> String {
    names
        .get(index)
        .map(|n| n.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(n).to_string())
        .unwrap_or_else(|| format!("#{}", index + 1))
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas: ARGB framebuffer with a few primitives
// ════════════════════════════════════════════════════════════════════════════

struct Canvas {
    buf: Vec<u32>,
    w:   usize,
    h:   usize,
}

impl Canvas {
    fn new(w: usize, h: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; w * h], w, h }
    }

    fn plot(&mut self, x: isize, y: isize, color: u32, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return;
        }
        let i = y as usize * self.w + x as usize;
        self.buf[i] = if alpha >= 1.0 { color } else { blend(self.buf[i], color, alpha) };
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    /// Filled disc; anything under a pixel is drawn as a single dot.
    fn disc(&mut self, cx: f32, cy: f32, r: f32, color: u32, alpha: f32) {
        if r < 1.0 {
            self.plot(cx as isize, cy as isize, color, alpha);
            return;
        }
        let ri = r.ceil() as isize;
        let (x0, y0) = (cx as isize, cy as isize);
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if ((dx * dx + dy * dy) as f32) <= r * r {
                    self.plot(x0 + dx, y0 + dy, color, alpha);
                }
            }
        }
    }

    fn diamond(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let ri = r.max(2.0) as isize;
        let (x0, y0) = (cx as isize, cy as isize);
        for dy in -ri..=ri {
            let span = ri - dy.abs();
            for dx in -span..=span {
                self.plot(x0 + dx, y0 + dy, color, 1.0);
            }
        }
    }

    /// Placeholder image card centred on (cx, cy) with its name inside.
    #[allow(clippy::too_many_arguments)]
    fn card(&mut self, cx: f32, cy: f32, w: f32, h: f32, color: u32, alpha: f32, name: &str, text_scale: usize) {
        let (x0, y0) = ((cx - w / 2.0) as isize, (cy - h / 2.0) as isize);
        for y in y0..y0 + h as isize {
            for x in x0..x0 + w as isize {
                self.plot(x, y, color, alpha);
            }
        }
        let advance = 4 * text_scale;
        let fits = (w as usize).saturating_sub(4) / advance;
        if fits == 0 || alpha < 0.3 { return; }
        let label: String = name.chars().take(fits).collect();
        let tx = cx - (label.chars().count() * advance) as f32 / 2.0;
        let ty = cy - (5 * text_scale) as f32 / 2.0;
        if tx >= 0.0 && ty >= 0.0 {
            self.text(&label, tx as usize, ty as usize, CARD_TEXT, text_scale);
        }
    }

    fn border_centered(&mut self, cx: f32, cy: f32, w: f32, h: f32, color: u32) {
        let (x0, y0) = ((cx - w / 2.0) as isize, (cy - h / 2.0) as isize);
        let (x1, y1) = (x0 + w as isize, y0 + h as isize);
        for x in x0..=x1 {
            self.plot(x, y0, color, 1.0);
            self.plot(x, y1, color, 1.0);
        }
        for y in y0..=y1 {
            self.plot(x0, y, color, 1.0);
            self.plot(x1, y, color, 1.0);
        }
    }

    /// Darken everything drawn so far.
    fn dim(&mut self, amount: f32) {
        for px in &mut self.buf {
            *px = blend(*px, 0xFF000000, amount);
        }
    }

    /// 3×5 bitmap text, `scale` pixels per font pixel.
    fn text(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let bits = glyph(ch);
            for row in 0..5 {
                let row_bits = (bits >> (3 * (4 - row))) & 0o7;
                for col in 0..3 {
                    if row_bits & (0b100 >> col) == 0 { continue; }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            let px = cx + col * scale + sx;
                            let py = y + row * scale + sy;
                            self.plot(px as isize, py as isize, color, 1.0);
                        }
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > self.w { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font: one octal digit per row, top row first
// ────────────────────────────────────────────────────────────────────────────

const GLYPHS: &[(char, u16)] = &[
    ('0', 0o75557), ('1', 0o26227), ('2', 0o71747), ('3', 0o71717), ('4', 0o55711),
    ('5', 0o74717), ('6', 0o74757), ('7', 0o71111), ('8', 0o75757), ('9', 0o75717),
    ('A', 0o75755), ('B', 0o65656), ('C', 0o74447), ('D', 0o65556), ('E', 0o74747),
    ('F', 0o74744), ('G', 0o74557), ('H', 0o55755), ('I', 0o72227), ('J', 0o11157),
    ('K', 0o55655), ('L', 0o44447), ('M', 0o57555), ('N', 0o75555), ('O', 0o75557),
    ('P', 0o75744), ('Q', 0o75563), ('R', 0o65655), ('S', 0o74717), ('T', 0o72222),
    ('U', 0o55557), ('V', 0o55522), ('W', 0o55575), ('X', 0o55255), ('Y', 0o55722),
    ('Z', 0o71247),
    ('/', 0o11244), ('-', 0o00700), ('_', 0o00007), ('.', 0o00002), (',', 0o00024),
    (':', 0o02020), ('=', 0o07070), ('+', 0o02720), ('#', 0o57575), ('%', 0o51245),
    ('(', 0o24442), (')', 0o21112), ('[', 0o64446), (']', 0o31113), ('<', 0o12421),
    ('>', 0o42124), ('!', 0o22202), ('?', 0o71302), ('|', 0o22222), ('\'', 0o22000),
    (' ', 0o00000),
];

/// Unknown characters render as a centre dot.
fn glyph(c: char) -> u16 {
    let c = c.to_ascii_uppercase();
    GLYPHS
        .iter()
        .find(|(g, _)| *g == c)
        .map_or(0o00200, |&(_, bits)| bits)
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |shift: u32| {
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        ((ca * (1.0 - t) + cb * t).round() as u32) << shift
    };
    0xFF00_0000 | mix(16) | mix(8) | mix(0)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
