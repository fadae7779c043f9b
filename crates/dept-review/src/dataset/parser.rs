use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
pub(crate) struct DepartmentRow {
    pub(crate) id: i64,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) category: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SectionScoreRow {
    pub(crate) department_id: i64,
    pub(crate) academic_year: String,
    pub(crate) section: String,
    #[serde(default)]
    pub(crate) criterion: String,
    pub(crate) points: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExpertRow {
    pub(crate) expert_id: String,
    #[serde(default)]
    pub(crate) name: String,
    pub(crate) category: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExpertReviewRow {
    pub(crate) expert_id: String,
    pub(crate) department: String,
    pub(crate) academic_year: String,
    #[serde(default, deserialize_with = "empty_string_as_none_f64")]
    pub(crate) total_score: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) remarks: Option<String>,
}

pub(crate) fn parse_rows<R, T>(reader: R) -> Result<Vec<T>, csv::Error>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<T>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn empty_string_as_none_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = empty_string_as_none(deserializer)? else {
        return Ok(None);
    };
    raw.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(serde::de::Error::custom)
}
