use serde::{Deserialize, Serialize};

/// A non-fatal message accumulated across candidate attempts.
///
/// The platform contract names the fields `type`/`id`/`content`; earlier
/// entries are never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
	#[serde(rename = "type")]
	pub severity: Severity,
	#[serde(rename = "id")]
	pub scope: String,
	pub content: String,
}
impl DiagnosticMessage {
	pub fn info(scope: impl Into<String>, content: impl Into<String>) -> Self {
		Self { severity: Severity::Info, scope: scope.into(), content: content.into() }
	}

	pub fn warning(scope: impl Into<String>, content: impl Into<String>) -> Self {
		Self { severity: Severity::Warning, scope: scope.into(), content: content.into() }
	}

	pub fn error(scope: impl Into<String>, content: impl Into<String>) -> Self {
		Self { severity: Severity::Error, scope: scope.into(), content: content.into() }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Info,
	Warning,
	Error,
}
