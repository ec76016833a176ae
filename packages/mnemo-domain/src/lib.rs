pub mod candidate;
pub mod diagnostic;
pub mod filter;
pub mod option;
pub mod placeholder;

pub use candidate::QueryCandidate;
pub use diagnostic::{DiagnosticMessage, Severity};
pub use filter::{FilterOperator, FilterSpec, SortSpec};
pub use option::OptionRecord;
pub use placeholder::Bindings;
