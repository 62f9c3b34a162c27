//! Terminal renderer.
//!
//! Draws into an RGB pixel grid at two pixels per terminal row (the lower
//! one via the `▀` half-block glyph), then flushes with crossterm,
//! batching color changes into runs. The scene functions read simulation
//! state strictly read-only and map the virtual 400x600 playfield onto
//! whatever grid the terminal provides.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use crate::config::GameConfig;
use crate::sim::{RoundState, Simulation};
use crate::theme::{Rgb, Theme};

pub struct PixelBuf {
    w: usize,
    /// Pixel height, terminal rows * 2.
    h: usize,
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![Rgb(0, 0, 0); w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, Rgb(0, 0, 0));
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    pub fn dim_all(&mut self) {
        for c in &mut self.px {
            *c = c.dimmed();
        }
    }

    /// Write the buffer to the terminal, two pixel rows per cell row.
    pub fn flush(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    // Uniform cell: a plain space on the background color.
                    if bg != Some(top) {
                        queue!(out, style::SetBackgroundColor(ccolor(top)))?;
                        bg = Some(top);
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if fg != Some(top) {
                        queue!(out, style::SetForegroundColor(ccolor(top)))?;
                        fg = Some(top);
                    }
                    if bg != Some(bot) {
                        queue!(out, style::SetBackgroundColor(ccolor(bot)))?;
                        bg = Some(bot);
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                fg = None;
                bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn ccolor(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

/// Maps virtual playfield coordinates onto buffer pixels.
struct View {
    sx: f64,
    sy: f64,
}

impl View {
    fn new(cfg: &GameConfig, buf: &PixelBuf) -> Self {
        Self {
            sx: buf.width() as f64 / cfg.screen_w,
            sy: buf.height() as f64 / cfg.screen_h,
        }
    }

    fn x(&self, vx: f64) -> i32 {
        (vx * self.sx).round() as i32
    }

    fn y(&self, vy: f64) -> i32 {
        (vy * self.sy).round() as i32
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

const SHADOW: Rgb = Rgb(30, 30, 30);
const WHITE: Rgb = Rgb(255, 255, 255);

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, fg: Rgb) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

/// Draw `n` centered on `cx`, 3px digits with 1px spacing.
pub fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    let s = n.to_string();
    let total_w = s.len() as i32 * 4 - 1;
    let start_x = cx - total_w / 2;
    for (i, ch) in s.chars().enumerate() {
        let d = ch as u8 - b'0';
        draw_digit(buf, start_x + i as i32 * 4, y, d, fg);
    }
}

// ── Scene ──────────────────────────────────────────────────────────────────

/// Draw one complete frame of the scene. `frame` drives display-only
/// animation (idle bob, wing flap, ground scroll); the simulation itself
/// is untouched.
pub fn draw_scene(buf: &mut PixelBuf, sim: &Simulation, theme: &Theme, best: u32, frame: u64) {
    let view = View::new(sim.config(), buf);
    draw_sky(buf, theme);
    draw_pipes(buf, sim, theme, &view);
    draw_ground(buf, theme, frame);
    draw_bird(buf, sim, theme, &view, frame);
    draw_hud(buf, sim);

    match sim.state() {
        RoundState::Ready => draw_ready_banner(buf, theme),
        RoundState::GameOver => draw_game_over(buf, theme, sim.score(), best),
        RoundState::Playing => {}
    }
}

fn draw_sky(buf: &mut PixelBuf, theme: &Theme) {
    let h = buf.height();
    for y in 0..h {
        let t = (y * 256 / h.max(1)) as u16;
        let c = Rgb::lerp(theme.sky_top, theme.sky_bottom, t);
        for x in 0..buf.width() {
            buf.set(x as i32, y as i32, c);
        }
    }
}

fn draw_ground(buf: &mut PixelBuf, theme: &Theme, frame: u64) {
    // Decorative strip along the floor edge; the floor itself is the
    // bottom of the playfield.
    let h = buf.height() as i32;
    let strip = (h / 48).clamp(2, 6);
    let scroll = frame as i32;
    for y in (h - strip)..h {
        for x in 0..buf.width() as i32 {
            let stripe = ((x + scroll) / 3) % 2 == 0;
            let c = if stripe { theme.ground } else { theme.ground_dark };
            buf.set(x, y, c);
        }
    }
}

fn draw_pipes(buf: &mut PixelBuf, sim: &Simulation, theme: &Theme, view: &View) {
    // Lip proportions from the classic look: a slightly wider cap at each
    // gap edge.
    const LIP_H: f64 = 25.0;
    const LIP_INSET: f64 = 4.0;

    let cfg = sim.config();
    let floor = buf.height() as i32;

    for pipe in sim.pipes() {
        let x0 = view.x(pipe.x);
        let x1 = view.x(pipe.x + cfg.pipe_width);
        let w = (x1 - x0).max(1);
        let gap_top = view.y(pipe.gap_y);
        let gap_bot = view.y(pipe.gap_y + pipe.gap);
        let lip_h = view.y(LIP_H).max(1);
        let lip_inset = view.x(LIP_INSET).max(1);

        // Bodies, shaded left-to-right for a rounded look.
        for dx in 0..w {
            let c = pipe_shade(theme, dx, w);
            for y in 0..(gap_top - lip_h) {
                buf.set(x0 + dx, y, c);
            }
            for y in (gap_bot + lip_h)..floor {
                buf.set(x0 + dx, y, c);
            }
        }
        // Lips, a touch wider than the body.
        for dx in -lip_inset..(w + lip_inset) {
            let c = pipe_shade(theme, dx + lip_inset, w + lip_inset * 2);
            for y in (gap_top - lip_h)..gap_top {
                buf.set(x0 + dx, y, c);
            }
            for y in gap_bot..(gap_bot + lip_h) {
                buf.set(x0 + dx, y, c);
            }
            buf.set(x0 + dx, gap_top - 1, theme.pipe_lip);
            buf.set(x0 + dx, gap_bot, theme.pipe_lip);
        }
    }
}

fn pipe_shade(theme: &Theme, x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return theme.pipe_body;
    }
    // Darker at the edges, brightest just left of center.
    let t = (x * 256 / (total_w - 1)).clamp(0, 256) as u16;
    if t < 96 {
        Rgb::lerp(theme.pipe_lip, theme.pipe_body, (t * 8 / 3).min(256))
    } else {
        Rgb::lerp(theme.pipe_body, theme.pipe_lip, ((t - 96) * 8 / 5).min(256))
    }
}

fn draw_bird(buf: &mut PixelBuf, sim: &Simulation, theme: &Theme, view: &View, frame: u64) {
    let cfg = sim.config();
    let bird = sim.bird();

    // Idle bob on the ready screen; the simulation holds the bird still.
    let bob = if sim.state() == RoundState::Ready {
        (frame as f64 * 0.08).sin() * 6.0
    } else {
        0.0
    };

    let cx = view.x(cfg.bird_x + cfg.bird_size / 2.0);
    let cy = view.y(bird.y + bob + cfg.bird_size / 2.0);
    let hw = (view.x(cfg.bird_size) - view.x(0.0)) / 2;
    let hh = (view.y(cfg.bird_size) - view.y(0.0)) / 2;
    let hw = hw.max(2);
    let hh = hh.max(2);

    // Pixel-shift tilt derived from the display-only rotation.
    let tilt = (bird.rotation_deg() / 30.0).clamp(-1.0, 1.0).round() as i32;

    // Body.
    buf.fill_rect(cx - hw, cy - hh, hw * 2, hh * 2, theme.bird_body);

    // Wing, flapping on a short cycle.
    let wing_off = if frame % 8 < 4 { -1 } else { 1 };
    let wing_w = (hw).max(1);
    let wing_h = (hh / 2).max(1);
    buf.fill_rect(
        cx - hw + 1,
        cy + wing_off + tilt - wing_h / 2,
        wing_w,
        wing_h,
        theme.bird_accent,
    );

    // Eye.
    let ex = cx + hw - hw / 3 - 1;
    let ey = cy - hh / 2;
    buf.fill_rect(ex, ey, 2, 2, WHITE);
    buf.set(ex + 1, ey + 1, SHADOW);

    // Beak.
    let beak_w = (hw / 2 + 1).max(2);
    let beak_h = (hh / 2).max(1);
    buf.fill_rect(cx + hw, cy - beak_h / 2 + tilt, beak_w, beak_h, theme.bird_beak);

    // Tail.
    buf.fill_rect(cx - hw - 2, cy - 1 + tilt, 2, 2, theme.bird_accent);
}

fn draw_hud(buf: &mut PixelBuf, sim: &Simulation) {
    let w = buf.width() as i32;
    draw_number(buf, w / 2, 4, sim.score(), WHITE);
    // Difficulty level in the corner once it starts climbing.
    if sim.level() > 0 {
        draw_number(buf, w - 8, 4, sim.level(), Rgb(255, 220, 120));
    }
}

fn draw_ready_banner(buf: &mut PixelBuf, theme: &Theme) {
    let cx = buf.width() as i32 / 2;
    let cy = buf.height() as i32 / 4;
    let w = (buf.width() as i32 / 3).max(20);
    let h = (buf.height() as i32 / 12).max(6);

    buf.fill_rect(cx - w / 2 + 1, cy + 1, w, h, SHADOW);
    buf.fill_rect(cx - w / 2, cy, w, h, theme.bird_body);
    buf.fill_rect(cx - w / 2, cy, w, 1, WHITE);

    // Tap-hint dots under the banner.
    let hint_y = cy + h + 3;
    for i in 0..3 {
        buf.fill_rect(cx - 8 + i * 6, hint_y, 3, 3, WHITE);
    }
}

fn draw_game_over(buf: &mut PixelBuf, theme: &Theme, score: u32, best: u32) {
    buf.dim_all();

    let cx = buf.width() as i32 / 2;
    let cy = buf.height() as i32 / 2;
    let w = (buf.width() as i32 / 3).max(26);
    let h = (buf.height() as i32 / 4).max(18);
    let x = cx - w / 2;
    let y = cy - h / 2;

    buf.fill_rect(x - 1, y - 1, w + 2, h + 2, SHADOW);
    buf.fill_rect(x, y, w, h, theme.ground);
    buf.fill_rect(x + 1, y + 1, w - 2, h - 2, theme.sky_bottom);

    // Final score on top, best below it.
    draw_number(buf, cx, y + 3, score, WHITE);
    draw_number(buf, cx, y + 11, best, theme.bird_body);
}
