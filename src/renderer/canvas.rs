//! HTML canvas 2D surface

use std::collections::HashMap;

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::Surface;

const BACKGROUND: &str = "pictures/background.jpg";

/// Draws onto a 2D canvas context, scaling from playfield units to pixels
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
    scale_x: f64,
    scale_y: f64,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            images: HashMap::new(),
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Image element for a path, created (and starts loading) on first use
    fn image(&mut self, src: &str) -> Option<&HtmlImageElement> {
        if !self.images.contains_key(src) {
            let img = HtmlImageElement::new().ok()?;
            img.set_src(src);
            self.images.insert(src.to_string(), img);
        }
        self.images.get(src)
    }

    fn canvas_size(&self) -> (f64, f64) {
        self.ctx
            .canvas()
            .map(|c| (c.width() as f64, c.height() as f64))
            .unwrap_or((0.0, 0.0))
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f32, height: f32) {
        let (w, h) = self.canvas_size();
        self.scale_x = w / width as f64;
        self.scale_y = h / height as f64;

        self.ctx.clear_rect(0.0, 0.0, w, h);
        let ctx = self.ctx.clone();
        match self.image(BACKGROUND) {
            Some(bg) if bg.complete() => {
                let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(bg, 0.0, 0.0, w, h);
            }
            _ => {
                ctx.set_fill_style_str("#70c5ce");
                ctx.fill_rect(0.0, 0.0, w, h);
            }
        }
    }

    fn draw_avatar(&mut self, x: f32, y: f32, w: f32, h: f32, image: &str) {
        let (sx, sy) = (self.scale_x, self.scale_y);
        let ctx = self.ctx.clone();
        let (x, y, w, h) = (x as f64 * sx, y as f64 * sy, w as f64 * sx, h as f64 * sy);
        match self.image(image) {
            Some(img) if img.complete() => {
                let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h);
            }
            _ => {
                ctx.set_fill_style_str("#f5c842");
                ctx.fill_rect(x, y, w, h);
            }
        }
    }

    fn draw_obstacle(&mut self, x: f32, width: f32, top: f32, bottom: f32, height: f32) {
        let (sx, sy) = (self.scale_x, self.scale_y);
        let gradient = self.ctx.create_linear_gradient(0.0, 0.0, 0.0, height as f64 * sy);
        let _ = gradient.add_color_stop(0.0, "#66ff66");
        let _ = gradient.add_color_stop(1.0, "#1eb141");
        self.ctx.set_fill_style_canvas_gradient(&gradient);

        let (x, w) = (x as f64 * sx, width as f64 * sx);
        self.ctx.fill_rect(x, 0.0, w, top as f64 * sy);
        self.ctx
            .fill_rect(x, bottom as f64 * sy, w, (height - bottom) as f64 * sy);
    }

    fn draw_coin(&mut self, x: f32, y: f32, radius: f32) {
        let r = radius as f64 * self.scale_x.min(self.scale_y);
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            x as f64 * self.scale_x,
            y as f64 * self.scale_y,
            r,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.set_fill_style_str("yellow");
        self.ctx.fill();
        self.ctx.set_line_width(2.0);
        self.ctx.set_stroke_style_str("orange");
        self.ctx.stroke();
    }

    fn draw_particle(&mut self, x: f32, y: f32) {
        self.ctx.set_fill_style_str("orange");
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            x as f64 * self.scale_x,
            y as f64 * self.scale_y,
            3.0,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn draw_hud(&mut self, text: &str) {
        let (w, _) = self.canvas_size();
        self.ctx.set_fill_style_str("black");
        self.ctx.set_font("24px Arial");
        let text_width = self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0);
        let _ = self.ctx.fill_text(text, (w - text_width) / 2.0, 30.0);
    }
}
