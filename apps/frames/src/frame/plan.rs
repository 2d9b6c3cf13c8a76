//! Frame planning: one calendar row in, placed lines per field out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::FrameError;
use crate::fonts::FontRole;
use crate::frame::row::CalendarRow;
use crate::frame::template::{FieldStyle, FrameField, FrameTemplate};
use crate::layout::{fit, place, FontMetrics, FontSpec, Line, PlacedLine, WidthOracle};

/// Layout of one field, ready for a rasterizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPlan {
    #[serde(rename = "name")]
    pub field: FrameField,
    pub font_role: FontRole,
    pub size: u32,
    pub truncated: bool,
    pub lines: Vec<PlacedLine>,
}

/// Layout of a whole frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePlan {
    pub date: NaiveDate,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub fields: Vec<FieldPlan>,
}

impl FramePlan {
    /// Output file name from the validated date, always zero-padded: a row
    /// dated `2025-3-5` is written as `2025-03-05.json`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.date.format("%Y-%m-%d"))
    }

    #[cfg(test)]
    pub(crate) fn field(&self, field: FrameField) -> Option<&FieldPlan> {
        self.fields.iter().find(|plan| plan.field == field)
    }

    pub fn truncated_count(&self) -> usize {
        self.fields.iter().filter(|plan| plan.truncated).count()
    }
}

/// Plans every non-empty field of `row`. `index` is the 1-based row number.
pub fn plan_row<P>(
    row: &CalendarRow,
    index: usize,
    template: &FrameTemplate,
    fonts: &P,
) -> Result<FramePlan, FrameError>
where
    P: WidthOracle + FontMetrics + ?Sized,
{
    let date = row.validated_date(index)?;

    let fields = row
        .field_values()
        .into_iter()
        .map(|(field, value)| plan_field(field, &value, template.style(field), fonts))
        .collect::<Result<Vec<_>, _>>()?;

    let plan = FramePlan {
        date,
        canvas_width: template.canvas_width,
        canvas_height: template.canvas_height,
        fields,
    };

    if plan.truncated_count() > 0 {
        warn!(
            row = index,
            date = %plan.date,
            truncated = plan.truncated_count(),
            "Frame plan: text truncated to fit its box"
        );
    }
    Ok(plan)
}

/// Lays out one field value according to its style.
///
/// Auto-fit fields go through the sizer; fixed fields are one unwrapped line at
/// the configured size, dropped by the placer if it overflows vertically.
pub fn plan_field<P>(
    field: FrameField,
    value: &str,
    style: &FieldStyle,
    fonts: &P,
) -> Result<FieldPlan, FrameError>
where
    P: WidthOracle + FontMetrics + ?Sized,
{
    let role = style.font.resolve(value);

    let (size, lines, truncated) = match style.fit_request(value, role) {
        Some(request) => {
            let result = fit(&request, fonts, fonts)?;
            (result.chosen_size, result.lines, result.truncated)
        }
        None => {
            let font = FontSpec::new(role.font_ref(), style.size);
            let line = Line {
                text: value.to_string(),
                width: fonts.measure(value, &font),
            };
            (style.size, vec![line], false)
        }
    };

    let font = FontSpec::new(role.font_ref(), size);
    let placed = place(
        &lines,
        style.region,
        &font,
        fonts,
        style.align,
        style.line_spacing,
        style.vertical_centering,
    );

    if placed.len() < lines.len() {
        debug!(
            field = field.name(),
            kept = placed.len(),
            total = lines.len(),
            "Frame plan: lines dropped below the box"
        );
    }

    Ok(FieldPlan {
        field,
        font_role: role,
        size,
        truncated,
        lines: placed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontLibrary;
    use crate::frame::template::{FontChoice, SizeRange};
    use crate::layout::{Align, LayoutBox, ELLIPSIS};

    fn make_row(main_text: &str) -> CalendarRow {
        CalendarRow {
            date: "2025-03-20".to_string(),
            day: "20".to_string(),
            month_cn: "三月".to_string(),
            month_en: "March".to_string(),
            weekday_en: "Thursday".to_string(),
            weekday_cn: "星期四".to_string(),
            lunar: "二月廿一".to_string(),
            solar_term: "春分".to_string(),
            main_text: main_text.to_string(),
            footer: "晨读 · Morning Reading".to_string(),
        }
    }

    fn plan(row: &CalendarRow) -> FramePlan {
        plan_row(row, 1, &FrameTemplate::default(), &FontLibrary::approximate()).unwrap()
    }

    #[test]
    fn test_full_row_plans_every_field() {
        let plan = plan(&make_row("春分者，阴阳相半也，故昼夜均而寒暑平。"));
        let fields: Vec<FrameField> = plan.fields.iter().map(|f| f.field).collect();
        assert_eq!(fields, FrameField::ALL.to_vec());
        assert_eq!(plan.file_name(), "2025-03-20.json");
        assert_eq!(plan.truncated_count(), 0);
    }

    #[test]
    fn test_chinese_quote_uses_cn_face_at_start_size() {
        let plan = plan(&make_row("春分者，阴阳相半也，故昼夜均而寒暑平。"));
        let main = plan.field(FrameField::MainText).unwrap();
        assert_eq!(main.font_role, FontRole::Cn);
        assert_eq!(main.size, 72);
        assert_eq!(main.lines[0].x, 120);
        assert_eq!(main.lines[0].y, 600);
    }

    #[test]
    fn test_english_quote_uses_en_face() {
        let plan = plan(&make_row("Spring is nature's way of saying, let's party."));
        assert_eq!(plan.field(FrameField::MainText).unwrap().font_role, FontRole::En);
    }

    #[test]
    fn test_right_aligned_header_ends_at_box_edge() {
        let plan = plan(&make_row("quote"));
        let month = plan.field(FrameField::MonthEn).unwrap();
        let line = &month.lines[0];
        assert_eq!(line.text, "March");
        assert_eq!(line.x + line.width, 800 + 520);
        assert_eq!(line.y, 200);
    }

    #[test]
    fn test_day_number_is_centered() {
        let plan = plan(&make_row("quote"));
        let day = plan.field(FrameField::DayBig).unwrap();
        let line = &day.lines[0];
        assert_eq!(day.size, 400);
        let left_gap = line.x - 120;
        let right_gap = 120 + 500 - (line.x + line.width);
        assert!((left_gap - right_gap).abs() <= 1, "{left_gap} vs {right_gap}");
    }

    #[test]
    fn test_long_quote_shrinks_then_truncates() {
        let long: String = "长".repeat(2000);
        let plan = plan(&make_row(&long));
        let main = plan.field(FrameField::MainText).unwrap();
        assert!(main.truncated);
        assert_eq!(main.size, 42);
        let last = main.lines.last().unwrap();
        assert!(last.text.ends_with(ELLIPSIS), "last line {:?}", last.text);
        let bottom = main.lines.len() as i32 * (37 + 5 + 40);
        assert!(bottom <= 1400);
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let row = CalendarRow {
            date: "2025-03-20".to_string(),
            main_text: "Only a quote".to_string(),
            ..CalendarRow::default()
        };
        let plan = plan(&row);
        assert_eq!(plan.fields.len(), 1);
        assert_eq!(plan.fields[0].field, FrameField::MainText);
    }

    #[test]
    fn test_missing_date_fails_the_row() {
        let row = CalendarRow {
            date: String::new(),
            ..make_row("quote")
        };
        let err = plan_row(&row, 7, &FrameTemplate::default(), &FontLibrary::approximate())
            .unwrap_err();
        assert!(err.to_string().contains("Row 7 missing 'date'"));
    }

    #[test]
    fn test_fixed_field_overflowing_vertically_is_dropped() {
        let style = FieldStyle {
            region: LayoutBox::new(0, 0, 400, 20),
            ..FrameTemplate::default().weekday
        };
        let plan = plan_field(FrameField::Weekday, "星期五", &style, &FontLibrary::approximate())
            .unwrap();
        assert!(plan.lines.is_empty());
        assert!(!plan.truncated);
    }

    #[test]
    fn test_vertical_centering_override() {
        let style = FieldStyle {
            vertical_centering: true,
            ..FrameTemplate::default().footer
        };
        let plan = plan_field(FrameField::Footer, "页脚", &style, &FontLibrary::approximate())
            .unwrap();
        // cn 40px: 35 + 5 + 10 = 50px line in a 200px box → 75px offset.
        assert_eq!(plan.lines[0].y, 2300 + 75);
    }

    #[test]
    fn test_unpadded_date_names_file_canonically() {
        let row = CalendarRow {
            date: "2025-3-5".to_string(),
            ..make_row("quote")
        };
        let plan = plan(&row);
        assert_eq!(plan.file_name(), "2025-03-05.json");
    }

    #[test]
    fn test_centering_uses_lines_kept_after_truncation() {
        // cn 40px: line height 35 + 5 + 10 = 50. Ten 40px ideographs per
        // 400px line gives 10 lines; a 230px box keeps 4 of them.
        let style = FieldStyle {
            region: LayoutBox::new(0, 0, 400, 230),
            font: FontChoice::Cn,
            size: 40,
            fit: Some(SizeRange {
                min_size: 40,
                size_step: 2,
            }),
            align: Align::Left,
            line_spacing: 10,
            vertical_centering: true,
        };
        let text = "长".repeat(100);
        let plan = plan_field(FrameField::MainText, &text, &style, &FontLibrary::approximate())
            .unwrap();

        assert!(plan.truncated);
        assert_eq!(plan.lines.len(), 4);
        // Kept block is 4 × 50 = 200px, so (230 - 200) / 2 = 15px from the top.
        // The pre-truncation block (500px) would not be centered at all.
        let ys: Vec<i32> = plan.lines.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![15, 65, 115, 165]);
        assert!(plan.lines[3].text.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_plan_serializes_field_names() {
        let plan = plan(&make_row("quote"));
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["date"], "2025-03-20");
        assert_eq!(json["fields"][0]["name"], "day_big");
        assert_eq!(json["fields"][0]["font_role"], "en");
    }
}
