//! Rule definitions: variables, patterns and the rules that group them.
//!
//! Everything in here is built once from configuration and is immutable
//! afterwards. Construction is where all validation happens:
//!
//! - `validate.rs`: key-set and shape checks shared by rules and variables.
//! - `capture.rs`: full-match patterns and the capture merge algorithm.
//! - `variable.rs`: constant or path-query variables (`Variable::extract`).
//! - `rule.rs`: a named conjunction of variables plus routing metadata
//!   (`Rule::evaluate`).

#[path = "rules/capture.rs"]
mod capture;
#[path = "rules/rule.rs"]
mod rule;
#[path = "rules/validate.rs"]
mod validate;
#[path = "rules/variable.rs"]
mod variable;

pub use capture::Pattern;
pub use rule::{RULE_KEYS, Rule};
pub use variable::{DEFAULT_INCLUDE, Variable};
