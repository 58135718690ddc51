//! PDF output for prescriptions.

use std::fs;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::*;
use thiserror::Error;
use tracing::{debug, warn};

use super::layout::{layout_prescription, FontFace, ImageSlot, PAGE_HEIGHT, PAGE_WIDTH};
use crate::models::{ClinicSettings, PatientRecord};

/// Rendering errors.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

const MM_PER_PT: f32 = 25.4 / 72.0;

fn pt(v: f32) -> Mm {
    Mm(v * MM_PER_PT)
}

/// Document file name offered for download.
pub fn prescription_file_name(patient_name: &str) -> String {
    format!("Rx_{}.pdf", patient_name)
}

/// Read the stored signature image, if there is a usable one.
pub fn load_signature(path: &Path) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no signature image");
            None
        }
    }
}

/// Render a prescription to PDF bytes.
///
/// A signature that fails to decode is left out; the rest of the
/// document is still produced.
pub fn render_prescription(
    settings: &ClinicSettings,
    record: &PatientRecord,
    signature: Option<&[u8]>,
) -> RenderResult<Vec<u8>> {
    let layout = layout_prescription(settings, record);
    let page_w = pt(PAGE_WIDTH);
    let page_h = pt(PAGE_HEIGHT);

    let (doc, page1, layer1) = PdfDocument::new(&layout.title, page_w, page_h, "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Font(e.to_string()))?;

    let mut layers = vec![doc.get_page(page1).get_layer(layer1)];
    for _ in 1..layout.pages.len() {
        let (page, layer) = doc.add_page(page_w, page_h, "Layer 1");
        layers.push(doc.get_page(page).get_layer(layer));
    }

    for (page, layer) in layout.pages.iter().zip(&layers) {
        for item in &page.texts {
            let font = match item.face {
                FontFace::Regular => &regular,
                FontFace::Bold => &bold,
            };
            layer.use_text(item.text.clone(), item.size, pt(item.left_x()), pt(item.y), font);
        }

        for rule in &page.rules {
            layer.set_outline_thickness(rule.thickness);
            layer.add_line(Line {
                points: vec![
                    (Point::new(pt(rule.x1), pt(rule.y)), false),
                    (Point::new(pt(rule.x2), pt(rule.y)), false),
                ],
                is_closed: false,
            });
        }

        if let (Some(slot), Some(bytes)) = (page.signature, signature) {
            if let Err(e) = draw_signature(layer, &slot, bytes) {
                warn!(error = %e, "skipping unreadable signature image");
            }
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| RenderError::Save(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| RenderError::Save(e.to_string()))
}

fn draw_signature(layer: &PdfLayerReference, slot: &ImageSlot, bytes: &[u8]) -> Result<(), String> {
    let decoder = PngDecoder::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let image = Image::try_from(decoder).map_err(|e| e.to_string())?;

    let width = image.image.width.0 as f32;
    let height = image.image.height.0 as f32;
    if width == 0.0 || height == 0.0 {
        return Err("image has no pixels".into());
    }

    // At 72 dpi one pixel is one point, so the slot scale applies directly.
    let (x, y, scale) = slot.fit(width, height);
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(pt(x)),
            translate_y: Some(pt(y)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(72.0),
            ..Default::default()
        },
    );
    Ok(())
}
