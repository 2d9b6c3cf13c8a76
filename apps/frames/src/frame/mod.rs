// Calendar frames: input rows, the field template, and per-row layout plans.

pub mod plan;
pub mod row;
pub mod template;

pub use plan::{plan_field, plan_row, FieldPlan, FramePlan};
pub use row::{is_primarily_cjk, CalendarRow};
pub use template::{FieldStyle, FontChoice, FrameField, FrameTemplate, SizeRange};
