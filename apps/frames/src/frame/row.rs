use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::FrameError;
use crate::frame::template::FrameField;
use crate::layout::{classify, ScriptClass};

/// Share of CJK codepoints above which text counts as Chinese.
const CJK_SHARE_THRESHOLD: f64 = 0.3;

/// One calendar day as supplied by the input rows.
///
/// Missing and `null` columns read as empty; numbers are accepted as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub day: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub month_cn: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub month_en: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub weekday_en: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub weekday_cn: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lunar: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub solar_term: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub main_text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub footer: String,
}

impl CalendarRow {
    /// Parses the row's `date` (`YYYY-MM-DD`; single-digit month and day are
    /// accepted). `index` is 1-based, for messages.
    pub fn validated_date(&self, index: usize) -> Result<NaiveDate, FrameError> {
        let date = self.date.trim();
        if date.is_empty() {
            return Err(FrameError::Validation(format!("Row {index} missing 'date'")));
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
            FrameError::Validation(format!("Row {index} has invalid date '{date}': {e}"))
        })
    }

    /// Chinese weekday when present, else the English one.
    pub fn weekday_line(&self) -> String {
        let cn = self.weekday_cn.trim();
        if cn.is_empty() {
            self.weekday_en.trim().to_string()
        } else {
            cn.to_string()
        }
    }

    /// `农历 {lunar} · {solar_term}`, with either half omitted when empty.
    pub fn lunar_line(&self) -> String {
        let lunar = self.lunar.trim();
        let solar = self.solar_term.trim();
        match (lunar.is_empty(), solar.is_empty()) {
            (false, false) => format!("农历 {lunar} · {solar}"),
            (false, true) => format!("农历 {lunar}"),
            (true, false) => solar.to_string(),
            (true, true) => String::new(),
        }
    }

    /// Trimmed, non-empty field values in drawing order.
    pub fn field_values(&self) -> Vec<(FrameField, String)> {
        FrameField::ALL
            .into_iter()
            .map(|field| (field, self.value(field)))
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }

    fn value(&self, field: FrameField) -> String {
        match field {
            FrameField::DayBig => self.day.trim().to_string(),
            FrameField::MonthCn => self.month_cn.trim().to_string(),
            FrameField::MonthEn => self.month_en.trim().to_string(),
            FrameField::Weekday => self.weekday_line(),
            FrameField::Lunar => self.lunar_line(),
            FrameField::MainText => self.main_text.trim().to_string(),
            FrameField::Footer => self.footer.trim().to_string(),
        }
    }
}

/// True when CJK ideographs make up more than 30% of the codepoints.
pub fn is_primarily_cjk(text: &str) -> bool {
    let total = text.chars().count();
    let cjk = text
        .chars()
        .filter(|c| classify(*c) == ScriptClass::Cjk)
        .count();
    cjk as f64 > total as f64 * CJK_SHARE_THRESHOLD
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, got {other}"
        ))),
    }
}
