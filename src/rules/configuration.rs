//! Compiled Rule Configuration
//!
//! Immutable, lookup-ready form of a [`RulesFile`]. Regexes are compiled and
//! keywords lower-cased once, so a single configuration can back any number
//! of validation runs.

use indexmap::IndexMap;
use regex::Regex;

use super::schema::{CharacterRuleDef, FilenameRulesDef, PipelineDef, PipelineKind, RulesFile};
use crate::error::RulesError;

/// Rule set consumed by every validator
#[derive(Debug, Clone)]
pub struct RuleConfiguration {
    pub filename_rules: FilenameRules,
    pub required_sections: Vec<String>,
    pub required_fields: IndexMap<String, Vec<String>>,
    pub allowed_characters: IndexMap<String, CharacterRule>,
    pub pipelines: Vec<PipelineRule>,
}

/// Case-insensitive filename constraints
#[derive(Debug, Clone, PartialEq)]
pub struct FilenameRules {
    pub contains: Vec<String>,
    pub excludes: Vec<String>,
    pub extensions: Vec<String>,
}

/// Allowed characters for one field
#[derive(Debug, Clone)]
pub struct CharacterRule {
    pub description: String,
    invalid: Regex,
}

/// A downstream pipeline and its structural requirements
#[derive(Debug, Clone)]
pub struct PipelineRule {
    pub name: String,
    pub kind: PipelineKind,
    /// Lower-cased keywords
    pub keywords: Vec<String>,
    pub description_check: bool,
    pub sample_id: Option<SampleIdRule>,
    pub filename_constraint: Option<FilenameConstraint>,
}

/// Accepted Sample_ID/Sample_Name shapes for a pipeline
#[derive(Debug, Clone)]
pub struct SampleIdRule {
    patterns: Vec<Regex>,
    display: Vec<String>,
}

/// Exact-name and Settings requirements (GMS-Myeloid style pipelines)
#[derive(Debug, Clone, PartialEq)]
pub struct FilenameConstraint {
    pub required_filename: Option<String>,
    pub required_settings: Vec<String>,
}

impl TryFrom<RulesFile> for RuleConfiguration {
    type Error = RulesError;

    fn try_from(file: RulesFile) -> Result<Self, Self::Error> {
        let allowed_characters = file
            .allowed_characters
            .into_iter()
            .map(|(field, def)| CharacterRule::compile(&field, def).map(|rule| (field, rule)))
            .collect::<Result<IndexMap<_, _>, _>>()?;

        let mut pipelines: Vec<PipelineRule> = Vec::with_capacity(file.pipelines.len());
        for def in file.pipelines {
            if pipelines.iter().any(|p| p.name == def.name) {
                return Err(RulesError::Config(format!(
                    "pipeline '{}' is defined more than once",
                    def.name
                )));
            }
            pipelines.push(PipelineRule::compile(def)?);
        }

        Ok(Self {
            filename_rules: FilenameRules::from(file.required_filenames),
            required_sections: file.required_sections,
            required_fields: file.required_fields,
            allowed_characters,
            pipelines,
        })
    }
}

impl RuleConfiguration {
    /// Look up a pipeline by name
    pub fn pipeline(&self, name: &str) -> Option<&PipelineRule> {
        self.pipelines.iter().find(|p| p.name == name)
    }
}

impl From<FilenameRulesDef> for FilenameRules {
    fn from(def: FilenameRulesDef) -> Self {
        let lower = |values: Vec<String>| values.into_iter().map(|v| v.to_lowercase()).collect();
        Self {
            contains: lower(def.contains),
            excludes: lower(def.excludes),
            extensions: def
                .extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }
}

impl CharacterRule {
    fn compile(field: &str, def: CharacterRuleDef) -> Result<Self, RulesError> {
        let invalid = Regex::new(&format!("[^{}]", def.pattern)).map_err(|source| {
            RulesError::Pattern {
                owner: format!("allowed characters of '{}'", field),
                pattern: def.pattern.clone(),
                source,
            }
        })?;

        Ok(Self {
            description: def.description,
            invalid,
        })
    }

    /// Distinct characters of `value` outside the allowed set, in order of appearance
    pub fn invalid_characters(&self, value: &str) -> Vec<char> {
        let mut found: Vec<char> = Vec::new();
        for m in self.invalid.find_iter(value) {
            for ch in m.as_str().chars() {
                if !found.contains(&ch) {
                    found.push(ch);
                }
            }
        }
        found
    }

    /// True when every character of `value` is allowed
    pub fn is_match(&self, value: &str) -> bool {
        !self.invalid.is_match(value)
    }
}

impl PipelineRule {
    fn compile(def: PipelineDef) -> Result<Self, RulesError> {
        let keywords: Vec<String> = def
            .keywords
            .iter()
            .map(|kw| kw.trim().to_lowercase())
            .collect();
        if keywords.iter().any(String::is_empty) {
            return Err(RulesError::Config(format!(
                "pipeline '{}' has an empty keyword",
                def.name
            )));
        }

        let owner = format!("pipeline '{}'", def.name);
        let sample_id = match (&def.sample_id_regex, def.sample_id_patterns.is_empty()) {
            // An explicit regex overrides the pattern list
            (Some(regex), _) => Some(SampleIdRule::compile(
                &owner,
                std::slice::from_ref(regex),
                def.sample_id_display_patterns.clone(),
            )?),
            (None, false) => Some(SampleIdRule::compile(
                &owner,
                &def.sample_id_patterns,
                def.sample_id_display_patterns.clone(),
            )?),
            (None, true) => None,
        };

        if def.kind == PipelineKind::Regex && def.sample_id_regex.is_none() {
            return Err(RulesError::Config(format!(
                "pipeline '{}' has type 'regex' but no sample_id_regex",
                def.name
            )));
        }
        if keywords.is_empty() && def.kind == PipelineKind::Keyword {
            return Err(RulesError::Config(format!(
                "keyword pipeline '{}' has no keywords",
                def.name
            )));
        }

        let filename_constraint =
            if def.required_filename.is_some() || !def.required_settings.is_empty() {
                Some(FilenameConstraint {
                    required_filename: def.required_filename,
                    required_settings: def.required_settings,
                })
            } else {
                None
            };

        Ok(Self {
            name: def.name,
            kind: def.kind,
            keywords,
            description_check: def.description_check,
            sample_id,
            filename_constraint,
        })
    }
}

impl SampleIdRule {
    fn compile(owner: &str, sources: &[String], display: Vec<String>) -> Result<Self, RulesError> {
        let patterns = sources
            .iter()
            .map(|source| {
                Regex::new(&format!("^(?:{})$", source)).map_err(|err| RulesError::Pattern {
                    owner: owner.to_string(),
                    pattern: source.clone(),
                    source: err,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let display = if display.is_empty() {
            sources.to_vec()
        } else {
            display
        };

        Ok(Self { patterns, display })
    }

    /// Full-match `value` against any accepted pattern
    pub fn is_match(&self, value: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(value))
    }

    /// Human-readable accepted formats
    pub fn display(&self) -> &[String] {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline_def(name: &str) -> PipelineDef {
        PipelineDef {
            name: name.to_string(),
            kind: PipelineKind::Keyword,
            keywords: vec!["NPM1".to_string()],
            description_check: false,
            sample_id_patterns: vec![],
            sample_id_display_patterns: vec![],
            sample_id_regex: None,
            required_filename: None,
            required_settings: vec![],
        }
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let rule = PipelineRule::compile(pipeline_def("NPM1")).unwrap();
        assert_eq!(rule.keywords, vec!["npm1"]);
        assert!(rule.sample_id.is_none());
        assert!(rule.filename_constraint.is_none());
    }

    #[test]
    fn test_sample_id_regex_overrides_patterns() {
        let mut def = pipeline_def("COVID");
        def.sample_id_patterns = vec!["^X+$".to_string()];
        def.sample_id_regex = Some(r"^D[A-Z]2[0-4]\d{6}$".to_string());
        let rule = PipelineRule::compile(def).unwrap();
        let ids = rule.sample_id.unwrap();
        assert!(ids.is_match("DA23123456"));
        assert!(!ids.is_match("XXX"));
        assert_eq!(ids.display(), [r"^D[A-Z]2[0-4]\d{6}$".to_string()]);
    }

    #[test]
    fn test_patterns_are_full_match() {
        let mut def = pipeline_def("NPM1");
        def.sample_id_patterns = vec![r"PosDK-\d{6}-NPM1".to_string()];
        def.sample_id_display_patterns = vec!["PosDK-<DATE>-NPM1".to_string()];
        let ids = PipelineRule::compile(def).unwrap().sample_id.unwrap();
        assert!(ids.is_match("PosDK-240501-NPM1"));
        assert!(!ids.is_match("xPosDK-240501-NPM1x"));
        assert_eq!(ids.display(), ["PosDK-<DATE>-NPM1".to_string()]);
    }

    #[test]
    fn test_regex_pipeline_requires_regex() {
        let mut def = pipeline_def("COVID");
        def.kind = PipelineKind::Regex;
        assert!(matches!(
            PipelineRule::compile(def),
            Err(RulesError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let mut def = pipeline_def("BAD");
        def.sample_id_patterns = vec!["([".to_string()];
        assert!(matches!(
            PipelineRule::compile(def),
            Err(RulesError::Pattern { .. })
        ));
    }

    #[test]
    fn test_invalid_characters_are_distinct_and_ordered() {
        let rule = CharacterRule::compile(
            "Sample_ID",
            CharacterRuleDef {
                pattern: "-A-Za-z0-9".to_string(),
                description: "letters, digits and hyphens".to_string(),
            },
        )
        .unwrap();
        assert_eq!(rule.invalid_characters("AB_C D_E"), vec!['_', ' ']);
        assert!(rule.is_match("AB-12"));
        assert!(!rule.is_match("AB.12"));
    }

    #[test]
    fn test_filename_extensions_are_normalised() {
        let rules = FilenameRules::from(FilenameRulesDef {
            contains: vec!["SampleSheet".to_string()],
            excludes: vec![],
            extensions: vec![".CSV".to_string()],
        });
        assert_eq!(rules.contains, vec!["samplesheet"]);
        assert_eq!(rules.extensions, vec!["csv"]);
    }
}
