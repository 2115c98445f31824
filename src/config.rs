//! Configuration surface consumed by the engine. Highlight styles are opaque
//! strings passed through to the host unchanged.

use serde::Deserialize;

use crate::stats::MinimumCoverage;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glob for report files offered for selection and watched for changes.
    pub report_pattern: String,
    /// Threshold below which a warning diagnostic is emitted.
    pub minimum_coverage: MinimumCoverage,
    /// Host-interpreted style for covered lines.
    pub hit_style: String,
    /// Host-interpreted style for uncovered lines.
    pub miss_style: String,
    /// Language ids the report's classes are expected to describe; views
    /// with any other language are never touched.
    pub languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_pattern: "**/cobertura.xml".to_string(),
            minimum_coverage: MinimumCoverage::default(),
            hit_style: "rgba(64,128,64,0.35)".to_string(),
            miss_style: "rgba(128,64,64,0.35)".to_string(),
            languages: vec!["cpp".to_string(), "c".to_string()],
        }
    }
}

impl Config {
    /// Parse a JSON settings blob, falling back to defaults for absent keys.
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.report_pattern, "**/cobertura.xml");
        assert_eq!(config.minimum_coverage.value(), 80.0);
        assert_eq!(config.languages, vec!["cpp", "c"]);
    }

    #[test]
    fn test_from_json_partial() {
        let config = Config::from_json(r#"{ "minimum_coverage": 92.5 }"#).unwrap();
        assert_eq!(config.minimum_coverage.value(), 92.5);
        assert_eq!(config.report_pattern, "**/cobertura.xml");
    }

    #[test]
    fn test_from_json_rejects_out_of_range_threshold() {
        assert!(Config::from_json(r#"{ "minimum_coverage": 120.0 }"#).is_err());
    }
}
