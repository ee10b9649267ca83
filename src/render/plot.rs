use crate::audio::features::Detection;

use super::text::TextOverlay;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const AXIS: [u8; 4] = [40, 40, 40, 255];
const GRID: [u8; 4] = [225, 225, 225, 255];
const FLUX: [u8; 4] = [31, 119, 180, 255];
const THRESHOLD: [u8; 4] = [214, 39, 40, 255];
const CHANGE: [u8; 4] = [44, 160, 44, 255];

/// RGBA8 raster, row-major, origin at the top-left.
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(px)
    }

    fn put(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&color);
    }

    /// Bresenham line, endpoints included.
    fn line(&mut self, (x0, y0): (i32, i32), (x1, y1): (i32, i32), color: [u8; 4]) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        loop {
            self.put(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn dashed_hline(&mut self, x0: i32, x1: i32, y: i32, color: [u8; 4]) {
        for x in x0..=x1 {
            if (x - x0) % 10 < 6 {
                self.put(x, y, color);
            }
        }
    }
}

/// Plot area inside the canvas margins.
#[derive(Clone, Copy, Debug)]
struct Frame {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl Frame {
    fn x_for(&self, index: usize, count: usize) -> i32 {
        let span = (self.right - self.left) as f64;
        let t = if count > 1 {
            index as f64 / (count - 1) as f64
        } else {
            0.0
        };
        self.left + (t * span).round() as i32
    }

    fn y_for(&self, value: f64, y_max: f64) -> i32 {
        let span = (self.bottom - self.top) as f64;
        let t = (value / y_max).clamp(0.0, 1.0);
        self.bottom - (t * span).round() as i32
    }
}

/// Draw the smoothed flux as a line chart with the detection threshold and,
/// when present, a vertical marker at the change point.
pub fn render_flux_chart(
    flux: &[f64],
    detection: &Detection,
    width: u32,
    height: u32,
    labels: Option<&TextOverlay>,
) -> Canvas {
    let mut canvas = Canvas::new(width, height, BACKGROUND);

    let margin_x = (width as i32 / 12).max(8);
    let margin_y = (height as i32 / 8).max(8);
    let frame = Frame {
        left: margin_x,
        top: margin_y,
        right: (width as i32 - margin_x / 2).max(margin_x + 1),
        bottom: (height as i32 - margin_y).max(margin_y + 1),
    };

    let peak = flux
        .iter()
        .copied()
        .fold(detection.threshold, f64::max);
    let y_max = if peak > 0.0 { peak * 1.05 } else { 1.0 };

    for step in 1..4 {
        let y = frame.y_for(y_max * step as f64 / 4.0, y_max);
        canvas.dashed_hline(frame.left, frame.right, y, GRID);
    }

    canvas.line((frame.left, frame.top), (frame.left, frame.bottom), AXIS);
    canvas.line((frame.left, frame.bottom), (frame.right, frame.bottom), AXIS);

    let threshold_y = frame.y_for(detection.threshold, y_max);
    canvas.dashed_hline(frame.left, frame.right, threshold_y, THRESHOLD);

    if let Some(change) = detection.change {
        let x = frame.x_for(change.frame, flux.len());
        canvas.line((x, frame.top), (x, frame.bottom), CHANGE);
    }

    let points: Vec<(i32, i32)> = flux
        .iter()
        .enumerate()
        .map(|(i, &v)| (frame.x_for(i, flux.len()), frame.y_for(v, y_max)))
        .collect();
    match points.as_slice() {
        [] => {}
        [single] => canvas.put(single.0, single.1, FLUX),
        _ => {
            for pair in points.windows(2) {
                canvas.line(pair[0], pair[1], FLUX);
            }
        }
    }

    if let Some(text) = labels {
        draw_labels(&mut canvas, text, frame, flux.len(), y_max);
    }

    canvas
}

fn draw_labels(canvas: &mut Canvas, text: &TextOverlay, frame: Frame, count: usize, y_max: f64) {
    let (w, h) = (canvas.width, canvas.height);
    let line = text.line_height() as i32;

    let title = "Spectral Flux Over Time";
    let title_x = (w as i32 - text.measure_width(title) as i32) / 2;
    text.composite(&mut canvas.pixels, w, h, title, title_x, (frame.top - line) / 2, AXIS);

    let x_label = "Time Frame";
    let x_label_x = (frame.left + frame.right - text.measure_width(x_label) as i32) / 2;
    text.composite(&mut canvas.pixels, w, h, x_label, x_label_x, frame.bottom + line, AXIS);

    text.composite(&mut canvas.pixels, w, h, "Flux", 4, frame.top - line, AXIS);

    let last = count.saturating_sub(1).to_string();
    text.composite(&mut canvas.pixels, w, h, "0", frame.left, frame.bottom + 4, AXIS);
    let last_x = frame.right - text.measure_width(&last) as i32;
    text.composite(&mut canvas.pixels, w, h, &last, last_x, frame.bottom + 4, AXIS);

    let top_value = format!("{:.1}", y_max);
    text.composite(&mut canvas.pixels, w, h, &top_value, 4, frame.top, AXIS);

    let legend = "Spectral Flux";
    let legend_x = frame.right - text.measure_width(legend) as i32 - 4;
    let legend_y = frame.top + 4;
    canvas.line((legend_x - 28, legend_y + line / 2), (legend_x - 6, legend_y + line / 2), FLUX);
    text.composite(&mut canvas.pixels, w, h, legend, legend_x, legend_y, AXIS);
}
