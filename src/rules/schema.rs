//! Rules File Schema
//!
//! Serde types mirroring the TOML rules document. These are decoded as-is and
//! compiled into a [`RuleConfiguration`](super::RuleConfiguration) before use.

use indexmap::IndexMap;
use serde::Deserialize;

/// Root rules file structure (matches TOML)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RulesFile {
    #[serde(default)]
    pub required_filenames: FilenameRulesDef,
    #[serde(default)]
    pub required_sections: Vec<String>,
    #[serde(default)]
    pub required_fields: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub allowed_characters: IndexMap<String, CharacterRuleDef>,
    #[serde(default)]
    pub pipelines: Vec<PipelineDef>,
}

/// Constraints on the uploaded file name
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FilenameRulesDef {
    /// Substrings that must appear in the name (case-insensitive)
    #[serde(default = "default_contains")]
    pub contains: Vec<String>,
    /// Substrings that must not appear in the name (case-insensitive)
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,
    /// Accepted file extensions, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for FilenameRulesDef {
    fn default() -> Self {
        Self {
            contains: default_contains(),
            excludes: default_excludes(),
            extensions: default_extensions(),
        }
    }
}

fn default_contains() -> Vec<String> {
    vec!["samplesheet".to_string()]
}

fn default_excludes() -> Vec<String> {
    vec!["_original".to_string()]
}

fn default_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

/// Allowed character set for one Data column
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CharacterRuleDef {
    /// Body of a regex character class, e.g. `-A-Za-z0-9_`
    pub pattern: String,
    #[serde(default = "default_character_description")]
    pub description: String,
}

fn default_character_description() -> String {
    "allowed characters".to_string()
}

/// How a pipeline is recognised
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Recognised from Description keywords only
    #[default]
    Keyword,
    /// Also recognised from a Sample_ID matching `sample_id_regex`
    Regex,
}

/// Pipeline definition
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PipelineDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: PipelineKind,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description_check: bool,
    #[serde(default)]
    pub sample_id_patterns: Vec<String>,
    #[serde(default)]
    pub sample_id_display_patterns: Vec<String>,
    pub sample_id_regex: Option<String>,
    pub required_filename: Option<String>,
    #[serde(default)]
    pub required_settings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_file_uses_filename_defaults() {
        let file: RulesFile = toml::from_str("required_sections = [\"Header\"]").unwrap();
        assert_eq!(file.required_sections, vec!["Header"]);
        assert_eq!(file.required_filenames, FilenameRulesDef::default());
        assert!(file.pipelines.is_empty());
    }

    #[test]
    fn test_decode_pipeline() {
        let content = r#"
[[pipelines]]
name = "COVID"
type = "regex"
keywords = ["covid"]
description_check = true
sample_id_regex = '^D[A-Z]2[0-4]\d{6}$'
"#;
        let file: RulesFile = toml::from_str(content).unwrap();
        let pipeline = &file.pipelines[0];
        assert_eq!(pipeline.name, "COVID");
        assert_eq!(pipeline.kind, PipelineKind::Regex);
        assert!(pipeline.description_check);
        assert_eq!(pipeline.sample_id_regex.as_deref(), Some(r"^D[A-Z]2[0-4]\d{6}$"));
        assert!(pipeline.required_settings.is_empty());
    }

    #[test]
    fn test_unknown_pipeline_type_is_rejected() {
        let content = r#"
[[pipelines]]
name = "X"
type = "magic"
"#;
        assert!(toml::from_str::<RulesFile>(content).is_err());
    }
}
