// compose.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Disposal-aware compositing of graphics onto a canvas
use crate::block::{
    ColorTable, DisposalMethod, Document, GraphicControl, GraphicKind, Image,
};
use pix::{Raster, rgb::SRgba8};

/// Result of compositing one image
pub struct Composite {
    /// Canvas with the image drawn
    pub frame: Raster<SRgba8>,
    /// Canvas which the next graphic is drawn over
    pub next_base: Raster<SRgba8>,
}

/// Get the visible region of an image on a canvas.
///
/// Returns left, top, width and height, clipped to the canvas.
fn clip(raster: &Raster<SRgba8>, image: &Image) -> (u32, u32, u32, u32) {
    let left = u32::from(image.left());
    let top = u32::from(image.top());
    let width = raster.width().saturating_sub(left);
    let height = raster.height().saturating_sub(top);
    let width = u32::from(image.width()).min(width);
    let height = u32::from(image.height()).min(height);
    (left, top, width, height)
}

/// Draw an image onto a raster, skipping the transparent color
fn draw(
    raster: &mut Raster<SRgba8>,
    image: &Image,
    table: &ColorTable,
    transparent: Option<u8>,
) {
    let (left, top, width, height) = clip(raster, image);
    let stride = usize::from(image.width());
    for y in 0..height {
        let row = y as usize * stride;
        for x in 0..width {
            let idx = image.pixels()[row + x as usize];
            if Some(idx) == transparent {
                continue;
            }
            // out of range indices are left undrawn
            if let Some([r, g, b]) = table.get(idx) {
                let (px, py) = ((left + x) as i32, (top + y) as i32);
                *raster.pixel_mut(px, py) = SRgba8::new(r, g, b, 255);
            }
        }
    }
}

/// Fill the image rectangle with a color
fn fill(raster: &mut Raster<SRgba8>, image: &Image, clr: SRgba8) {
    let (left, top, width, height) = clip(raster, image);
    for y in top..top + height {
        for x in left..left + width {
            *raster.pixel_mut(x as i32, y as i32) = clr;
        }
    }
}

/// Get the color used to restore the background.
///
/// This is the global color at the background index, or transparent when
/// there is no such color or the index is the transparent color.
pub fn background(
    doc: &Document,
    control: Option<&GraphicControl>,
) -> SRgba8 {
    let screen = doc.screen();
    let idx = screen.background_color_idx();
    if control.and_then(|c| c.transparent_color()) == Some(idx) {
        return SRgba8::default();
    }
    match screen.global_color_table().and_then(|t| t.get(idx)) {
        Some([r, g, b]) => SRgba8::new(r, g, b, 255),
        None => SRgba8::default(),
    }
}

/// Composite an image over a base canvas.
///
/// * `base` Canvas before the image is drawn.
/// * `image` Image to draw, clipped to the canvas.
/// * `table` Color table in effect; without one, nothing is drawn.
/// * `control` Graphic control for transparency and disposal.
/// * `bg` Color filling the image rectangle on `RestoreBackground`.
pub fn compose(
    base: &Raster<SRgba8>,
    image: &Image,
    table: Option<&ColorTable>,
    control: Option<&GraphicControl>,
    bg: SRgba8,
) -> Composite {
    let mut frame = Raster::with_raster(base);
    if let Some(table) = table {
        let transparent = control.and_then(|c| c.transparent_color());
        draw(&mut frame, image, table, transparent);
    }
    let disposal = control.map(|c| c.disposal_method()).unwrap_or_default();
    let next_base = match disposal {
        DisposalMethod::RestoreBackground => {
            let mut next = Raster::with_raster(&frame);
            fill(&mut next, image, bg);
            next
        }
        DisposalMethod::RestorePrevious => Raster::with_raster(base),
        DisposalMethod::None
        | DisposalMethod::DoNotDispose
        | DisposalMethod::Undefined => Raster::with_raster(&frame),
    };
    Composite { frame, next_base }
}

/// Render every graphic of a document to a full canvas.
///
/// Canvases have the logical screen size, starting from transparent.
/// Plain text graphics leave the canvas unchanged.
pub fn render(doc: &Document) -> Vec<Raster<SRgba8>> {
    let screen = doc.screen();
    let width = u32::from(screen.screen_width());
    let height = u32::from(screen.screen_height());
    let mut base = Raster::with_clear(width, height);
    let mut frames = Vec::with_capacity(doc.graphics().len());
    for graphic in doc.graphics() {
        match &graphic.kind {
            GraphicKind::Image(image) => {
                let table = doc.effective_color_table(image);
                let control = graphic.control();
                let bg = background(doc, control);
                let comp = compose(&base, image, table, control, bg);
                frames.push(comp.frame);
                base = comp.next_base;
            }
            GraphicKind::PlainText(_) => {
                frames.push(Raster::with_raster(&base));
            }
        }
    }
    frames
}
