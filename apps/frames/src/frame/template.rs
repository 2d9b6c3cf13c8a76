//! Frame template: one explicit style per calendar field.
//!
//! The defaults describe a 1440×2560 portrait frame: a large day number top
//! left, month/weekday/lunar headers top right, the auto-fit quote in the
//! middle and a centered footer. A JSON template may override any field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::FrameError;
use crate::fonts::FontRole;
use crate::frame::row::is_primarily_cjk;
use crate::layout::measure::DEFAULT_STYLE;
use crate::layout::{Align, FitRequest, LayoutBox, Px};

// ────────────────────────────────────────────────────────────────────────────
// Field identity and font choice
// ────────────────────────────────────────────────────────────────────────────

/// The fields of a calendar frame, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameField {
    DayBig,
    MonthCn,
    MonthEn,
    Weekday,
    Lunar,
    MainText,
    Footer,
}

impl FrameField {
    pub const ALL: [FrameField; 7] = [
        FrameField::DayBig,
        FrameField::MonthCn,
        FrameField::MonthEn,
        FrameField::Weekday,
        FrameField::Lunar,
        FrameField::MainText,
        FrameField::Footer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FrameField::DayBig => "day_big",
            FrameField::MonthCn => "month_cn",
            FrameField::MonthEn => "month_en",
            FrameField::Weekday => "weekday",
            FrameField::Lunar => "lunar",
            FrameField::MainText => "main_text",
            FrameField::Footer => "footer",
        }
    }
}

/// Which face a field uses. `Auto` picks by the dominant script of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    Cn,
    En,
    Auto,
}

impl FontChoice {
    pub fn resolve(self, text: &str) -> FontRole {
        match self {
            FontChoice::Cn => FontRole::Cn,
            FontChoice::En => FontRole::En,
            FontChoice::Auto if is_primarily_cjk(text) => FontRole::Cn,
            FontChoice::Auto => FontRole::En,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field style
// ────────────────────────────────────────────────────────────────────────────

/// Auto-fit range below a field's starting size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min_size: u32,
    #[serde(default = "default_size_step")]
    pub size_step: u32,
}

fn default_size_step() -> u32 {
    2
}

/// Fully resolved style for one field.
///
/// Without `fit` the value is drawn as one unwrapped line at `size`; with it,
/// `size` is the starting size of the auto-fit search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStyle {
    pub region: LayoutBox,
    pub font: FontChoice,
    pub size: u32,
    #[serde(default)]
    pub fit: Option<SizeRange>,
    #[serde(default)]
    pub align: Align,
    #[serde(default = "default_line_spacing")]
    pub line_spacing: Px,
    #[serde(default)]
    pub vertical_centering: bool,
}

fn default_line_spacing() -> Px {
    10
}

impl FieldStyle {
    fn fixed(region: LayoutBox, font: FontChoice, size: u32, align: Align) -> Self {
        Self {
            region,
            font,
            size,
            fit: None,
            align,
            line_spacing: default_line_spacing(),
            vertical_centering: false,
        }
    }

    fn with_line_spacing(mut self, line_spacing: Px) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    /// Builds the auto-fit request for `text`, if this field auto-fits.
    pub fn fit_request(&self, text: &str, role: FontRole) -> Option<FitRequest> {
        let range = self.fit?;
        Some(FitRequest {
            text: text.to_string(),
            font_family_ref: role.font_ref(),
            style: DEFAULT_STYLE.to_string(),
            start_size: self.size,
            min_size: range.min_size,
            size_step: range.size_step,
            box_width: self.region.width,
            box_height: self.region.height,
            line_spacing: self.line_spacing,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Frame template
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameTemplate {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub day_big: FieldStyle,
    pub month_cn: FieldStyle,
    pub month_en: FieldStyle,
    pub weekday: FieldStyle,
    pub lunar: FieldStyle,
    pub main_text: FieldStyle,
    pub footer: FieldStyle,
}

impl Default for FrameTemplate {
    fn default() -> Self {
        Self {
            canvas_width: 1440,
            canvas_height: 2560,
            day_big: FieldStyle::fixed(
                LayoutBox::new(120, 120, 500, 500),
                FontChoice::En,
                400,
                Align::Center,
            )
            .with_line_spacing(0),
            month_cn: FieldStyle::fixed(
                LayoutBox::new(800, 120, 520, 80),
                FontChoice::Cn,
                56,
                Align::Right,
            ),
            month_en: FieldStyle::fixed(
                LayoutBox::new(800, 200, 520, 80),
                FontChoice::En,
                48,
                Align::Right,
            ),
            weekday: FieldStyle::fixed(
                LayoutBox::new(800, 280, 520, 70),
                FontChoice::Cn,
                40,
                Align::Right,
            ),
            lunar: FieldStyle::fixed(
                LayoutBox::new(800, 350, 520, 70),
                FontChoice::Cn,
                40,
                Align::Right,
            ),
            main_text: FieldStyle {
                region: LayoutBox::new(120, 600, 1200, 1400),
                font: FontChoice::Auto,
                size: 72,
                fit: Some(SizeRange {
                    min_size: 42,
                    size_step: 2,
                }),
                align: Align::Left,
                line_spacing: 40,
                vertical_centering: false,
            },
            footer: FieldStyle::fixed(
                LayoutBox::new(120, 2300, 1200, 200),
                FontChoice::Cn,
                40,
                Align::Center,
            ),
        }
    }
}

impl FrameTemplate {
    pub fn style(&self, field: FrameField) -> &FieldStyle {
        match field {
            FrameField::DayBig => &self.day_big,
            FrameField::MonthCn => &self.month_cn,
            FrameField::MonthEn => &self.month_en,
            FrameField::Weekday => &self.weekday,
            FrameField::Lunar => &self.lunar,
            FrameField::MainText => &self.main_text,
            FrameField::Footer => &self.footer,
        }
    }

    /// Rejects zero sizes and malformed auto-fit ranges.
    pub fn validate(&self) -> Result<(), FrameError> {
        for field in FrameField::ALL {
            let style = self.style(field);
            if style.size == 0 {
                return Err(FrameError::Validation(format!(
                    "Field '{}' has zero font size",
                    field.name()
                )));
            }
            if let Some(request) = style.fit_request("", FontRole::En) {
                request.validate().map_err(|e| {
                    FrameError::Validation(format!("Field '{}': {e}", field.name()))
                })?;
            }
        }
        Ok(())
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, FrameError> {
        let template: Self = serde_json::from_slice(bytes)?;
        template.validate()?;
        Ok(template)
    }

    pub async fn load(path: &Path) -> Result<Self, FrameError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_json(&bytes)
    }
}
