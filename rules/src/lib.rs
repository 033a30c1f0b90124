//! Card analysis, field state, and move validation.

mod analyzer;
mod field;
mod validator;

pub use analyzer::{Analysis, AnalysisError, CardAnalyzer, PlayType};
pub use field::Field;
pub use validator::{validate_exchange, Decision, MoveValidator};
