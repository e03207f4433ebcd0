use crate::domain::model::TestingSite;
use crate::utils::error::{Result, SiteError};
use serde_json::{Map, Value};

pub use crate::domain::model::InvalidRecordPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub sites: Vec<TestingSite>,
    pub dropped: Vec<DroppedRecord>,
    /// Elements never inspected because `Stop` ended the batch early.
    pub skipped_after_stop: usize,
}

impl ParseReport {
    pub fn total_discarded(&self) -> usize {
        self.dropped.len() + self.skipped_after_stop
    }
}

/// 將資料源的 JSON 陣列轉成 `TestingSite`
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteRecordParser {
    policy: InvalidRecordPolicy,
}

impl SiteRecordParser {
    pub fn new(policy: InvalidRecordPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> InvalidRecordPolicy {
        self.policy
    }

    pub fn parse(&self, raw: &[u8]) -> Result<Vec<TestingSite>> {
        self.parse_report(raw).map(|report| report.sites)
    }

    pub fn parse_report(&self, raw: &[u8]) -> Result<ParseReport> {
        let items = Self::top_level_objects(raw)?;
        let total = items.len();
        let mut report = ParseReport::default();

        for (index, obj) in items.into_iter().enumerate() {
            match extract_site(obj) {
                Ok(site) => report.sites.push(site),
                Err(reason) => {
                    tracing::warn!("⚠️ Dropping site record #{}: {}", index, reason);
                    report.dropped.push(DroppedRecord { index, reason });

                    if self.policy == InvalidRecordPolicy::Stop {
                        report.skipped_after_stop = total - index - 1;
                        tracing::warn!(
                            "🛑 Stop policy: ignoring the remaining {} records",
                            report.skipped_after_stop
                        );
                        break;
                    }
                }
            }
        }

        tracing::debug!(
            "Parsed {} of {} site records ({} dropped)",
            report.sites.len(),
            total,
            report.total_discarded()
        );
        Ok(report)
    }

    /// 頂層必須是物件陣列，否則整批失敗
    fn top_level_objects(raw: &[u8]) -> Result<Vec<Map<String, Value>>> {
        let json: Value = serde_json::from_slice(raw).map_err(|e| SiteError::ParseError {
            message: format!("invalid JSON: {}", e),
        })?;

        let items = match json {
            Value::Array(items) => items,
            other => {
                return Err(SiteError::ParseError {
                    message: format!("expected a JSON array, found {}", kind_of(&other)),
                })
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(obj) => Ok(obj),
                other => Err(SiteError::ParseError {
                    message: format!(
                        "element #{} is {}, expected an object",
                        index,
                        kind_of(&other)
                    ),
                }),
            })
            .collect()
    }
}

fn extract_site(obj: Map<String, Value>) -> std::result::Result<TestingSite, String> {
    let name = required_str(&obj, "name")?;
    let description = required_str(&obj, "description")?;

    let phone = first_object(&obj, "phones")?;
    let number = required_str(phone, "number").map_err(|e| format!("phones[0]: {}", e))?;

    let address = first_object(&obj, "physical_address")?;
    let street_address =
        required_str(address, "address_1").map_err(|e| format!("physical_address[0]: {}", e))?;
    let city = required_str(address, "city").map_err(|e| format!("physical_address[0]: {}", e))?;
    let postal_code =
        required_str(address, "postal_code").map_err(|e| format!("physical_address[0]: {}", e))?;

    Ok(TestingSite {
        name,
        phone: number,
        street_address,
        city,
        postal_code,
        description,
    })
}

fn required_str(obj: &Map<String, Value>, key: &str) -> std::result::Result<String, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(format!("missing field '{}'", key)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(format!("field '{}' is empty", key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("field '{}' is {}, expected a string", key, kind_of(other))),
    }
}

fn first_object<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> std::result::Result<&'a Map<String, Value>, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(format!("missing field '{}'", key)),
        Some(Value::Array(items)) => match items.first() {
            None => Err(format!("field '{}' is an empty array", key)),
            Some(Value::Object(first)) => Ok(first),
            Some(other) => Err(format!("{}[0] is {}, expected an object", key, kind_of(other))),
        },
        Some(other) => Err(format!("field '{}' is {}, expected an array", key, kind_of(other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
