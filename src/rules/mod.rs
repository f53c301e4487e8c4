//! Rule Configuration
//!
//! TOML-defined validation rules: schema, compilation and discovery.

pub mod configuration;
pub mod loader;
pub mod schema;

pub use configuration::{
    CharacterRule, FilenameConstraint, FilenameRules, PipelineRule, RuleConfiguration, SampleIdRule,
};
pub use loader::{RulesSource, builtin_rules, load_rules, parse_rules, resolve_rules};
pub use schema::{PipelineKind, RulesFile};
