//! Configuration loading: one YAML file per configuration in a directory.
//!
//! The configuration name is the file stem; non-YAML files are skipped and a
//! file with an unknown pipeline kind is rejected. At least one valid
//! configuration must load.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::PipelineError;

pub const LOOKUP_MODE_DEFAULT: &str = "str";
pub const LOOKUP_MODE_CODE: &str = "code";

pub const DEFAULT_CLINICAL_PIPELINE: &str = "default_clinical";
pub const SMOKING_STATUS_PIPELINE: &str = "smoking_status";

pub const FEATURE_LAB: &str = "lab";
pub const FEATURE_DRUG: &str = "drug";
pub const FEATURE_POLARITY: &str = "polarity";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestParams {
    #[serde(default)]
    pub lookup_mode: String,
}

impl RequestParams {
    pub fn lookup_mode(&self) -> &str {
        if self.lookup_mode.is_empty() {
            LOOKUP_MODE_DEFAULT
        } else {
            &self.lookup_mode
        }
    }
}

/// The fast-dictionary-lookup parameter block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FdlConfig {
    #[serde(default)]
    pub term_dictionary: String,
    #[serde(default)]
    pub term_scheme: String,
    #[serde(default)]
    pub concept_dictionary: String,
    #[serde(default)]
    pub concept_scheme: String,
    #[serde(default, rename = "concept_params_ignore")]
    pub concept_ignored_params: Vec<String>,
    #[serde(default = "default_exclusion_tags")]
    pub exclusion_tags: Vec<String>,
    #[serde(default)]
    pub precision_mode: bool,
}

fn default_exclusion_tags() -> Vec<String> {
    vec!["VB".to_string()]
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamsConfig {
    #[serde(default, rename = "FDL")]
    pub fdl: FdlConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    #[serde(skip)]
    pub name: String,
    #[serde(skip)]
    pub file_path: PathBuf,
    #[serde(default)]
    pub request_params: RequestParams,
    #[serde(default)]
    pub params: ParamsConfig,
    pub pipeline: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Configuration {
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|have| have == feature)
    }

    pub fn is_default_clinical(&self) -> bool {
        self.pipeline == DEFAULT_CLINICAL_PIPELINE
    }

    pub fn is_smoking_status(&self) -> bool {
        self.pipeline == SMOKING_STATUS_PIPELINE
    }
}

/// Load every `*.yaml` configuration in `dir`.
pub fn load_configurations(dir: &Path) -> Result<Vec<Configuration>, PipelineError> {
    let entries = std::fs::read_dir(dir).map_err(|source| PipelineError::ConfigIo {
        path: dir.display().to_string(),
        source,
    })?;

    let mut configurations = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PipelineError::ConfigIo {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() || path.extension().map(|ext| ext != "yaml").unwrap_or(true) {
            continue;
        }

        let buf = std::fs::read_to_string(&path).map_err(|source| PipelineError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let mut configuration: Configuration =
            serde_yaml::from_str(&buf).map_err(|source| PipelineError::ConfigParse {
                path: path.display().to_string(),
                source,
            })?;
        configuration.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        configuration.file_path = path.clone();

        if !configuration.is_default_clinical() && !configuration.is_smoking_status() {
            warn!(
                config = %configuration.name,
                pipeline = %configuration.pipeline,
                "skipping configuration with unknown pipeline kind"
            );
            continue;
        }
        configurations.push(configuration);
    }

    if configurations.is_empty() {
        return Err(PipelineError::NoConfigurations(dir.display().to_string()));
    }
    configurations.sort_by(|a, b| a.name.cmp(&b.name));
    info!(count = configurations.len(), "loaded configurations");
    Ok(configurations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).expect("write config");
    }

    #[test]
    fn loads_yaml_files_with_stem_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(
            dir.path(),
            "default.yaml",
            "pipeline: default_clinical\nfeatures: [lab, drug, polarity]\nparams:\n  FDL:\n    term_dictionary: terms.bsv\n    term_scheme: \"CUI|STR\"\n    concept_dictionary: concepts.bsv\n    concept_scheme: \"CUI|TUI|SAB|CODE|PREF|TTY\"\n    precision_mode: true\n",
        );
        write_config(dir.path(), "smoking.yaml", "pipeline: smoking_status\n");
        write_config(dir.path(), "notes.txt", "not a configuration\n");

        let configurations = load_configurations(dir.path()).expect("load");
        assert_eq!(configurations.len(), 2);
        assert_eq!(configurations[0].name, "default");
        assert!(configurations[0].is_default_clinical());
        assert!(configurations[0].has_feature(FEATURE_LAB));
        assert!(configurations[0].params.fdl.precision_mode);
        assert_eq!(configurations[0].params.fdl.exclusion_tags, vec!["VB"]);
        assert_eq!(configurations[1].name, "smoking");
        assert!(configurations[1].is_smoking_status());
    }

    #[test]
    fn unknown_pipeline_kind_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(dir.path(), "bad.yaml", "pipeline: something_else\n");
        write_config(dir.path(), "good.yaml", "pipeline: smoking_status\n");
        let configurations = load_configurations(dir.path()).expect("load");
        assert_eq!(configurations.len(), 1);
        assert_eq!(configurations[0].name, "good");
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_configurations(dir.path()).is_err());
    }

    #[test]
    fn lookup_mode_defaults_to_str() {
        let params = RequestParams::default();
        assert_eq!(params.lookup_mode(), LOOKUP_MODE_DEFAULT);
        let params = RequestParams {
            lookup_mode: LOOKUP_MODE_CODE.to_string(),
        };
        assert_eq!(params.lookup_mode(), LOOKUP_MODE_CODE);
    }
}
