use image::{Rgb, RgbImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use tracing::debug;

use crate::font::FontResource;
use crate::format::format_timestamp;
use crate::metadata::CaptureTimestamp;

/// Top-left corner of the stamp, in pixels, whatever the image size.
pub const STAMP_ORIGIN: (f32, f32) = (20.0, 20.0);
pub const FILL_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not lay out overlay text")]
    Layout(#[from] usvg::Error),

    #[error("font '{0}' produced no glyphs for the overlay text")]
    NoGlyphs(String),

    #[error("could not allocate a {0}x{1} overlay canvas")]
    Canvas(u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub fill: Rgb<u8>,
    pub outline: Rgb<u8>,
    pub outline_width: u32,
    pub origin: (f32, f32),
}

impl OverlayStyle {
    /// Yellow text outlined in black, `font_size / 20` pixels wide.
    /// Sizes below 20 therefore get no outline at all.
    pub fn for_font_size(font_size: u32) -> Self {
        Self {
            fill: FILL_COLOR,
            outline: OUTLINE_COLOR,
            outline_width: font_size / 20,
            origin: STAMP_ORIGIN,
        }
    }
}

/// The stamp text for one file together with how it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOverlay {
    pub text: String,
    pub family: String,
    pub font_size: u32,
    pub style: OverlayStyle,
}

impl RenderedOverlay {
    pub fn new(timestamp: &CaptureTimestamp, font: &FontResource) -> Self {
        Self::with_text(format_timestamp(timestamp), font)
    }

    pub fn with_text(text: impl Into<String>, font: &FontResource) -> Self {
        Self {
            text: text.into(),
            family: font.family().to_string(),
            font_size: font.size(),
            style: OverlayStyle::for_font_size(font.size()),
        }
    }

    fn to_svg(&self, width: u32, height: u32) -> String {
        let style = &self.style;
        let stroke = if style.outline_width > 0 {
            format!(
                r#" stroke="{}" stroke-width="{}""#,
                hex(style.outline),
                style.outline_width
            )
        } else {
            String::new()
        };

        // xml:space keeps the double space between date and time.
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><text x="{x}" y="{y}" font-family="'{family}'" font-size="{size}" dominant-baseline="text-before-edge" fill="{fill}"{stroke} xml:space="preserve">{text}</text></svg>"#,
            x = style.origin.0,
            y = style.origin.1,
            family = escape_xml(&self.family.replace('\'', "")),
            size = self.font_size,
            fill = hex(style.fill),
            text = escape_xml(&self.text),
        )
    }
}

/// Draw the overlay onto `image` in place. Only pixels under the glyphs change;
/// text running past the edges is clipped.
pub fn render_overlay(
    image: &mut RgbImage,
    overlay: &RenderedOverlay,
    font: &FontResource,
) -> Result<(), RenderError> {
    let (width, height) = image.dimensions();

    let options = usvg::Options {
        fontdb: font.database(),
        font_family: overlay.family.clone(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(&overlay.to_svg(width, height), &options)?;

    if !overlay.text.trim().is_empty() && !tree.root().has_children() {
        return Err(RenderError::NoGlyphs(overlay.family.clone()));
    }

    let bbox = tree.root().abs_stroke_bounding_box();
    let Some((x0, y0, w, h)) = clip_to_image(
        (bbox.left(), bbox.top(), bbox.right(), bbox.bottom()),
        width,
        height,
    ) else {
        debug!(width, height, "overlay falls outside the image");
        return Ok(());
    };

    let mut pixmap = Pixmap::new(w, h).ok_or(RenderError::Canvas(w, h))?;
    resvg::render(
        &tree,
        Transform::from_translate(-(x0 as f32), -(y0 as f32)),
        &mut pixmap.as_mut(),
    );
    composite(image, &pixmap, x0, y0);
    Ok(())
}

/// Pixel region covered by `bounds` (plus one pixel of antialiasing), clipped to the image.
fn clip_to_image(
    (left, top, right, bottom): (f32, f32, f32, f32),
    width: u32,
    height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let x0 = (left.floor() - 1.0).max(0.0);
    let y0 = (top.floor() - 1.0).max(0.0);
    let x1 = (right.ceil() + 1.0).min(width as f32);
    let y1 = (bottom.ceil() + 1.0).min(height as f32);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// Source-over blend of a premultiplied RGBA pixmap onto an opaque RGB image.
fn composite(image: &mut RgbImage, pixmap: &Pixmap, x0: u32, y0: u32) {
    let w = pixmap.width();
    for (i, px) in pixmap.pixels().iter().enumerate() {
        let alpha = px.alpha();
        if alpha == 0 {
            continue;
        }
        let i = i as u32;
        let dst = image.get_pixel_mut(x0 + i % w, y0 + i / w);
        let inv = 255 - u16::from(alpha);
        let src = [px.red(), px.green(), px.blue()];
        for (d, s) in dst.0.iter_mut().zip(src) {
            let blended = u16::from(s) + (u16::from(*d) * inv + 127) / 255;
            *d = blended.min(255) as u8;
        }
    }
}

fn hex(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
