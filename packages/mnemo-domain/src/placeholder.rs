use serde_json::{Map, Value};

/// Marker prefix identifying a placeholder leaf inside a stored pipeline.
pub const PLACEHOLDER_SENTINEL: &str = "$$";

const FORMULA_KEYS: [&str; 2] = ["formula", "__formula"];

/// Caller-supplied placeholder bindings, normalized once at construction.
///
/// A binding value may arrive wrapped in a `{formula: string}` envelope (the
/// formula itself is evaluated upstream); the envelope is unwrapped here so
/// that resolution never has to re-inspect it per occurrence.
#[derive(Debug, Clone, Default)]
pub struct Bindings(Map<String, Value>);
impl Bindings {
	pub fn new(raw: Map<String, Value>) -> Self {
		let normalized = raw
			.into_iter()
			.map(|(name, value)| {
				let value = match unwrap_formula(&value) {
					Some(formula) => Value::String(formula.to_string()),
					None => value,
				};

				(name, value)
			})
			.collect();

		Self(normalized)
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Rewrites `value`, substituting every `$$name` string leaf with its binding.
///
/// Pure structural recursion: mappings and sequences are rebuilt with resolved
/// children, other scalars pass through untouched. A marker without a binding
/// is left as the literal string, so partial binding sets are valid input.
pub fn resolve(value: &Value, bindings: &Bindings) -> Value {
	match value {
		Value::Object(map) => Value::Object(
			map.iter().map(|(key, child)| (key.clone(), resolve(child, bindings))).collect(),
		),
		Value::Array(items) => Value::Array(items.iter().map(|v| resolve(v, bindings)).collect()),
		Value::String(text) => match text.strip_prefix(PLACEHOLDER_SENTINEL) {
			Some(name) => bindings.get(name).cloned().unwrap_or_else(|| value.clone()),
			None => value.clone(),
		},
		other => other.clone(),
	}
}

fn unwrap_formula(value: &Value) -> Option<&str> {
	let map = value.as_object()?;

	FORMULA_KEYS.iter().find_map(|key| map.get(*key).and_then(Value::as_str))
}
