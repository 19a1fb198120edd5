//! Rule-based JSON event routing.
//!
//! A rule set describes which records are interesting and where to send them:
//!
//! ```text
//! RecordBatch { Records: [..] }
//!        │
//!        ▼
//! MatchEngine ── for each rule, for each record ──▶ Rule::evaluate
//!        │                                             │
//!        │                      Variable::extract ◀────┘
//!        │                        path query → excludes → first include
//!        │                        → capture merge
//!        ▼
//! MatchedRule { name, routers, vars, template } ──▶ registered routers
//! ```
//!
//! # Example
//!
//! ```
//! use jsonrouter::{MatchEngine, RecordBatch, RouterRegistry, RulesConfig};
//! use std::sync::{Arc, Mutex};
//!
//! let config = RulesConfig::from_yaml_str(r#"
//! rules:
//! - name: scaling
//!   template: This {type} just came in
//!   vars:
//!   - name: type
//!     jsonpath: $.Type
//!   routers:
//!   - name: inbox
//! "#)?;
//!
//! let inbox = Arc::new(Mutex::new(Vec::new()));
//! let sink = inbox.clone();
//! let routers = RouterRegistry::new().with("inbox", move |m| sink.lock().unwrap().push(m.render()));
//!
//! let engine = MatchEngine::new(&config, routers)?;
//! let batch = RecordBatch::from_json_str(r#"{ "Records": [ { "Type": "scale-up" } ] }"#)?;
//! engine.route_matches(&batch)?;
//!
//! assert_eq!(*inbox.lock().unwrap(), vec!["This scale-up just came in"]);
//! # Ok::<(), jsonrouter::Error>(())
//! ```

#[macro_use]
mod macros;
mod api;
mod config;
mod engine;
mod error;
mod path;
mod preprocess;
mod rules;

pub use api::{MatchedRule, RecordBatch, RouterTarget, VarMap};
pub use config::RulesConfig;
pub use engine::{CompiledRules, DispatchMetrics, DispatchRun, MatchEngine, Router, RouterRegistry};
pub use error::{Error, PathError, Result, SchemaError};
pub use path::{PathQuery, evaluate as evaluate_path, render_value};
pub use preprocess::{SNS_MESSAGE_POINTER, decode_nested_json, decode_sns_messages};
pub use rules::{DEFAULT_INCLUDE, Pattern, RULE_KEYS, Rule, Variable};
