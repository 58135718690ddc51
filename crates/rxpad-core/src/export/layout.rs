//! Prescription page layout.
//!
//! Coordinates are PDF points on an A4 page with the origin at the bottom
//! left. The layout is computed up front as a page plan and drawn later,
//! so pagination does not depend on the PDF backend.

use tracing::debug;

use super::metrics::text_width;
use crate::models::{ClinicSettings, PatientRecord};

pub const PAGE_WIDTH: f32 = 595.2756;
pub const PAGE_HEIGHT: f32 = 841.8898;

const MARGIN: f32 = 50.0;
const RX_INDENT: f32 = 60.0;
const MEDICINE_LINE_HEIGHT: f32 = 25.0;
/// A new page starts once the cursor drops below this height.
const BOTTOM_LIMIT: f32 = 150.0;
const SIGNATURE_Y: f32 = 100.0;

/// Date format printed on the prescription.
pub const DOCUMENT_DATE_FORMAT: &str = "%d-%b-%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
}

/// Horizontal anchoring of a text item relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A single line of text on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    /// Anchor point; meaning depends on `align`
    pub x: f32,
    /// Baseline
    pub y: f32,
    pub size: f32,
    pub face: FontFace,
    pub align: Align,
}

impl TextItem {
    /// X coordinate where drawing starts.
    pub fn left_x(&self) -> f32 {
        let width = text_width(&self.text, self.face, self.size);
        match self.align {
            Align::Left => self.x,
            Align::Center => self.x - width / 2.0,
            Align::Right => self.x - width,
        }
    }
}

/// Horizontal rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub thickness: f32,
}

/// Bounding box an image is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSlot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ImageSlot {
    /// Fit an image of the given natural size, keeping its aspect ratio and
    /// centering it in the slot. Returns `(x, y, scale)`.
    pub fn fit(&self, image_width: f32, image_height: f32) -> (f32, f32, f32) {
        let scale = (self.width / image_width).min(self.height / image_height);
        let x = self.x + (self.width - image_width * scale) / 2.0;
        let y = self.y + (self.height - image_height * scale) / 2.0;
        (x, y, scale)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub texts: Vec<TextItem>,
    pub rules: Vec<Rule>,
    /// Where the signature goes, if on this page
    pub signature: Option<ImageSlot>,
}

impl PageLayout {
    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, face: FontFace, align: Align) {
        self.texts.push(TextItem {
            text: text.into(),
            x,
            y,
            size,
            face,
            align,
        });
    }

    fn rule(&mut self, y: f32) {
        self.rules.push(Rule {
            x1: MARGIN,
            x2: PAGE_WIDTH - MARGIN,
            y,
            thickness: 1.0,
        });
    }
}

/// Full document plan.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Number the non-blank medicine lines from 1.
pub fn numbered_medicines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line))
        .collect()
}

/// Lay out a prescription for `record` under the clinic header.
pub fn layout_prescription(settings: &ClinicSettings, record: &PatientRecord) -> DocumentLayout {
    use Align::*;
    use FontFace::*;

    let top = PAGE_HEIGHT;
    let right = PAGE_WIDTH - MARGIN;
    let mut page = PageLayout::default();

    // Header
    page.text(settings.clinic_name.to_uppercase(), PAGE_WIDTH / 2.0, top - 50.0, 18.0, Bold, Center);
    page.text(&settings.doctor_name, MARGIN, top - 80.0, 13.0, Bold, Left);
    page.text(&settings.degrees, MARGIN, top - 95.0, 10.0, Regular, Left);
    page.text(&settings.registration, MARGIN, top - 110.0, 10.0, Regular, Left);
    page.text(&settings.address, right, top - 80.0, 10.0, Regular, Right);
    page.text(&settings.contact, right, top - 95.0, 10.0, Regular, Right);
    page.rule(top - 120.0);

    // Patient
    page.text(format!("Patient: {}", record.name), MARGIN, top - 150.0, 11.0, Bold, Left);
    page.text(
        format!("Date: {}", record.date.format(DOCUMENT_DATE_FORMAT)),
        right,
        top - 150.0,
        11.0,
        Bold,
        Right,
    );
    page.text(
        format!("Age: {}y   Sex: {}   Mob: {}", record.age, record.sex, record.mobile),
        MARGIN,
        top - 170.0,
        11.0,
        Bold,
        Left,
    );
    page.text(format!("Diagnosis: {}", record.diagnosis), MARGIN, top - 190.0, 11.0, Bold, Left);
    page.rule(top - 200.0);

    // Rx
    page.text("Rx", MARGIN, top - 230.0, 16.0, Bold, Left);

    let mut pages = Vec::new();
    let mut y = top - 260.0;
    for line in numbered_medicines(&record.medicines) {
        page.text(line, RX_INDENT, y, 12.0, Regular, Left);
        y -= MEDICINE_LINE_HEIGHT;
        if y < BOTTOM_LIMIT {
            pages.push(std::mem::take(&mut page));
            y = top - MARGIN;
            debug!(page = pages.len() + 1, "medicine list continues on new page");
        }
    }

    // Signature block on the last page
    page.signature = Some(ImageSlot {
        x: PAGE_WIDTH - 180.0,
        y: SIGNATURE_Y,
        width: 100.0,
        height: 45.0,
    });
    page.text(&settings.doctor_name, right, SIGNATURE_Y - 15.0, 11.0, Bold, Right);
    page.text(&settings.degrees, right, SIGNATURE_Y - 30.0, 9.0, Regular, Right);
    pages.push(page);

    DocumentLayout {
        title: format!("Rx {}", record.name),
        pages,
    }
}
