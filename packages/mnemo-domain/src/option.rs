use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Struct key recording which candidate produced an option.
pub const CANDIDATE_INDEX_KEY: &str = "__query_index";

const VALUE_KEY: &str = "value";
const LABEL_KEY: &str = "label";

/// The uniform option projection returned to the invoking layer.
///
/// `value` is never null; `struct`, when present, carries the record fields
/// beyond `value`/`label` plus the originating candidate's index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRecord {
	pub value: Value,
	pub label: Value,
	#[serde(rename = "struct", default, skip_serializing_if = "Option::is_none")]
	pub extra: Option<Map<String, Value>>,
}

/// Projects raw backend records into option records.
///
/// Each record is tried independently against two shapes: (a) the record
/// already carries `value`/`label` keys (a caller-authored final projection),
/// in which case the remaining fields fold into `struct`; (b) the record
/// carries the caller-named `value_key`/`label_key` fields. Records matching
/// neither shape cannot be rendered as options and are dropped. No
/// deduplication happens here; duplicate values pass through unchanged.
pub fn map_records(
	records: &[Value],
	value_key: Option<&str>,
	label_key: Option<&str>,
	candidate_index: usize,
) -> Vec<OptionRecord> {
	records
		.iter()
		.filter_map(|record| map_record(record, value_key, label_key, candidate_index))
		.collect()
}

fn map_record(
	record: &Value,
	value_key: Option<&str>,
	label_key: Option<&str>,
	candidate_index: usize,
) -> Option<OptionRecord> {
	let fields = record.as_object()?;

	if let (Some(value), Some(label)) = (fields.get(VALUE_KEY), fields.get(LABEL_KEY)) {
		if value.is_null() {
			return None;
		}

		let mut extra: Map<String, Value> = fields
			.iter()
			.filter(|(key, _)| key.as_str() != VALUE_KEY && key.as_str() != LABEL_KEY)
			.map(|(key, field)| (key.clone(), field.clone()))
			.collect();

		extra.insert(CANDIDATE_INDEX_KEY.to_string(), Value::from(candidate_index));

		return Some(OptionRecord { value: value.clone(), label: label.clone(), extra: Some(extra) });
	}

	let value = fields.get(value_key?)?;
	let label = fields.get(label_key?)?;

	if value.is_null() {
		return None;
	}

	Some(OptionRecord { value: value.clone(), label: label.clone(), extra: None })
}
