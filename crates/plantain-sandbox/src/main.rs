//! Sandbox: a ball bouncing in an arena, with a live minimap.
//!
//! Arrow keys / WASD push the ball, Space drops a marker at its position,
//! left click moves it to the cursor, Escape quits.

use plantain_engine::coords::Vec2;
use plantain_engine::input::{Key, MouseButton};
use plantain_engine::logging::{init_logging, LoggingConfig};
use plantain_engine::paint::Color;
use plantain_engine::render::{Canvas, Framebuffer, TextOptions, TextureOptions};
use plantain_engine::shapes::{Circle, Polygon, Rect, Segment};
use plantain_engine::texture::{Rgba, RgbaImage, TextureHandle};
use plantain_engine::{Engine, EngineConfig, FrameCtx, Game, UpdateCtx};

const FONT: &[u8] = include_bytes!("../../plantain-engine/tests/fixtures/DejaVuSansMono.ttf");

const BALL_RADIUS: f32 = 14.0;
const PUSH: f32 = 900.0;
const DRAG: f32 = 0.6;
const MINIMAP_SCALE: u32 = 5;
const MAX_MARKERS: usize = 32;

struct Sandbox {
    pos: Vec2,
    vel: Vec2,
    prev_pos: Vec2,
    arena: (f32, f32),
    markers: Vec<Vec2>,
    floor: Option<TextureHandle>,
    minimap: Option<Framebuffer>,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            pos: Vec2::new(200.0, 150.0),
            vel: Vec2::new(240.0, 180.0),
            prev_pos: Vec2::new(200.0, 150.0),
            arena: (800.0, 600.0),
            markers: Vec::new(),
            floor: None,
            minimap: None,
        }
    }

    fn draw_world(&self, canvas: &mut Canvas, scale: f32, ball: Vec2) {
        let (w, h) = self.arena;
        canvas.render(Rect::new(0.0, 0.0, w * scale, h * scale, Color::rgba(0.08, 0.09, 0.12, 0.6)).with_radius(6.0));

        for m in &self.markers {
            let m = Vec2::new(m.x * scale, m.y * scale);
            let r = 6.0 * scale.max(0.5);
            canvas.render(Polygon::triangle(
                Vec2::new(m.x, m.y - r),
                Vec2::new(m.x - r, m.y + r),
                Vec2::new(m.x + r, m.y + r),
                Color::rgb(0.95, 0.75, 0.2),
            ));
        }

        let center = Vec2::new(ball.x * scale, ball.y * scale);
        let tail = Vec2::new(center.x - self.vel.x * 0.05 * scale, center.y - self.vel.y * 0.05 * scale);
        canvas.render(Segment::new(tail, center, 3.0 * scale.max(0.5), Color::rgba(0.4, 0.8, 1.0, 0.5)));
        canvas.render(Circle::new(center, BALL_RADIUS * scale, Color::rgb(0.4, 0.8, 1.0)));
    }
}

impl Game for Sandbox {
    fn init(&mut self, canvas: &mut Canvas) -> anyhow::Result<()> {
        canvas.load_font(FONT)?;

        let checker = RgbaImage::from_fn(64, 64, |x, y| {
            let v = if ((x / 8) + (y / 8)) % 2 == 0 { 48 } else { 32 };
            Rgba([v, v, v + 8, 255])
        });
        self.floor = Some(canvas.upload_texture(&checker)?);

        let vp = canvas.viewport();
        self.arena = (vp.width, vp.height);
        let map = canvas.add_framebuffer(
            (vp.width as u32 / MINIMAP_SCALE).max(1),
            (vp.height as u32 / MINIMAP_SCALE).max(1),
        )?;
        log::info!("minimap {} is {}x{}", map.id(), map.width(), map.height());
        self.minimap = Some(map);
        Ok(())
    }

    fn update(&mut self, ctx: &mut UpdateCtx<'_>) {
        let input = ctx.input;
        if input.key_just_pressed(Key::Escape) {
            ctx.exit();
            return;
        }

        let dt = ctx.dt_secs();
        let mut push = Vec2::zero();
        if input.key_down(Key::ArrowLeft) || input.key_down(Key::A) {
            push.x -= PUSH;
        }
        if input.key_down(Key::ArrowRight) || input.key_down(Key::D) {
            push.x += PUSH;
        }
        if input.key_down(Key::ArrowUp) || input.key_down(Key::W) {
            push.y -= PUSH;
        }
        if input.key_down(Key::ArrowDown) || input.key_down(Key::S) {
            push.y += PUSH;
        }

        if input.button_just_pressed(MouseButton::Left) {
            let (x, y) = input.cursor_position();
            self.pos = Vec2::new(x, y);
        }
        if input.key_just_pressed(Key::Space) {
            if self.markers.len() == MAX_MARKERS {
                self.markers.remove(0);
            }
            self.markers.push(self.pos);
        }

        self.prev_pos = self.pos;
        let drag = 1.0 - DRAG * dt;
        self.vel = Vec2::new((self.vel.x + push.x * dt) * drag, (self.vel.y + push.y * dt) * drag);
        self.pos = Vec2::new(self.pos.x + self.vel.x * dt, self.pos.y + self.vel.y * dt);

        let (w, h) = self.arena;
        if self.pos.x < BALL_RADIUS || self.pos.x > w - BALL_RADIUS {
            self.vel.x = -self.vel.x;
            self.pos.x = self.pos.x.clamp(BALL_RADIUS, (w - BALL_RADIUS).max(BALL_RADIUS));
        }
        if self.pos.y < BALL_RADIUS || self.pos.y > h - BALL_RADIUS {
            self.vel.y = -self.vel.y;
            self.pos.y = self.pos.y.clamp(BALL_RADIUS, (h - BALL_RADIUS).max(BALL_RADIUS));
        }
    }

    fn render(&mut self, ctx: &mut FrameCtx<'_>) {
        let vp = ctx.canvas.viewport();
        self.arena = (vp.width, vp.height);

        let ball = Vec2::new(
            self.prev_pos.x + (self.pos.x - self.prev_pos.x) * ctx.alpha,
            self.prev_pos.y + (self.pos.y - self.prev_pos.y) * ctx.alpha,
        );

        if let Some(floor) = self.floor {
            ctx.canvas.render_texture(floor, &TextureOptions::at(0.0, 0.0).sized(vp.width, vp.height));
        }
        self.draw_world(ctx.canvas, 1.0, ball);

        if let Some(map) = self.minimap.take() {
            if ctx.canvas.bind_framebuffer(&map) {
                ctx.canvas.clear(Color::rgba(0.0, 0.0, 0.0, 0.6));
                self.draw_world(ctx.canvas, 1.0 / MINIMAP_SCALE as f32, ball);
                ctx.canvas.unbind_framebuffer();
            }
            let (mw, mh) = (map.width() as f32, map.height() as f32);
            let x = vp.width - mw - 12.0;
            ctx.canvas.render(Rect::new(x - 2.0, 10.0, mw + 4.0, mh + 4.0, Color::WHITE.with_alpha(0.5)));
            map.draw(ctx.canvas, x, 12.0, mw, mh);
            self.minimap = Some(map);
        }

        let hud = format!(
            "pos {:>4.0},{:<4.0}  speed {:>4.0}  markers {}",
            self.pos.x,
            self.pos.y,
            self.vel.length(),
            self.markers.len(),
        );
        ctx.canvas.render_text(&hud, &TextOptions::new(12.0, 24.0, 16.0).with_color(Color::WHITE));
        ctx.canvas.render_text(
            "arrows/WASD push  space mark  click teleport  esc quit",
            &TextOptions::new(12.0, vp.height - 12.0, 12.0).with_color(Color::rgb(0.7, 0.7, 0.7)),
        );

        if ctx.input.key_just_pressed(Key::F1) {
            let (w, h) = ctx.window.size();
            ctx.window.set_title(&format!("plantain sandbox ({w}x{h})"));
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = EngineConfig {
        show_fps: true,
        clear_color: Color::rgb(0.02, 0.02, 0.03),
        ..EngineConfig::new("plantain sandbox", 800, 600)
    };
    Engine::run(config, Sandbox::new())
}
