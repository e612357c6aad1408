//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "KNOWMESH_CONFIG_DIR";

/// Knowmesh configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub builder: BuilderConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

/// Defaults for graph construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub include_relationships: bool,
    pub min_relationship_strength: f64,
    pub detect_implicit_relationships: bool,
    pub similarity_threshold: f64,
    pub max_implicit_relationships: usize,
}

/// Defaults for graph analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub top_k: usize,
    pub min_strength: f64,
    pub detect_communities: bool,
    pub analyze_knowledge_flow: bool,
    pub generate_insights: bool,
    /// Fixed seed for community detection; entropy when unset
    pub seed: Option<u64>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            include_relationships: true,
            min_relationship_strength: 0.1,
            detect_implicit_relationships: true,
            similarity_threshold: 0.5,
            max_implicit_relationships: 100,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_strength: 0.3,
            detect_communities: true,
            analyze_knowledge_flow: true,
            generate_insights: true,
            seed: None,
        }
    }
}

const KEYS: [&str; 11] = [
    "builder.include_relationships",
    "builder.min_relationship_strength",
    "builder.detect_implicit_relationships",
    "builder.similarity_threshold",
    "builder.max_implicit_relationships",
    "analyzer.top_k",
    "analyzer.min_strength",
    "analyzer.detect_communities",
    "analyzer.analyze_knowledge_flow",
    "analyzer.generate_insights",
    "analyzer.seed",
];

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("knowmesh")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a file, or defaults if it doesn't exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            // Return default config without creating file
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        unit_range("builder.min_relationship_strength", self.builder.min_relationship_strength)?;
        unit_range("builder.similarity_threshold", self.builder.similarity_threshold)?;
        unit_range("analyzer.min_strength", self.analyzer.min_strength)?;
        at_least_one("analyzer.top_k", self.analyzer.top_k)?;
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            // Builder settings
            "builder.include_relationships" => Ok(self.builder.include_relationships.to_string()),
            "builder.min_relationship_strength" => {
                Ok(self.builder.min_relationship_strength.to_string())
            }
            "builder.detect_implicit_relationships" => {
                Ok(self.builder.detect_implicit_relationships.to_string())
            }
            "builder.similarity_threshold" => Ok(self.builder.similarity_threshold.to_string()),
            "builder.max_implicit_relationships" => {
                Ok(self.builder.max_implicit_relationships.to_string())
            }

            // Analyzer settings
            "analyzer.top_k" => Ok(self.analyzer.top_k.to_string()),
            "analyzer.min_strength" => Ok(self.analyzer.min_strength.to_string()),
            "analyzer.detect_communities" => Ok(self.analyzer.detect_communities.to_string()),
            "analyzer.analyze_knowledge_flow" => {
                Ok(self.analyzer.analyze_knowledge_flow.to_string())
            }
            "analyzer.generate_insights" => Ok(self.analyzer.generate_insights.to_string()),
            "analyzer.seed" => Ok(self
                .analyzer
                .seed
                .map(|seed| seed.to_string())
                .unwrap_or_else(|| "(not set)".to_string())),

            _ => Err(unknown_key(key)),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            // Builder settings
            "builder.include_relationships" => {
                self.builder.include_relationships = parse_bool(key, value)?;
            }
            "builder.min_relationship_strength" => {
                let strength = parse_float(key, value)?;
                unit_range(key, strength)?;
                self.builder.min_relationship_strength = strength;
            }
            "builder.detect_implicit_relationships" => {
                self.builder.detect_implicit_relationships = parse_bool(key, value)?;
            }
            "builder.similarity_threshold" => {
                let threshold = parse_float(key, value)?;
                unit_range(key, threshold)?;
                self.builder.similarity_threshold = threshold;
            }
            "builder.max_implicit_relationships" => {
                self.builder.max_implicit_relationships = value
                    .parse()
                    .with_context(|| {
                        format!("Invalid max_implicit_relationships value: {}", value)
                    })?;
            }

            // Analyzer settings
            "analyzer.top_k" => {
                let top_k = value
                    .parse()
                    .with_context(|| format!("Invalid top_k value: {}", value))?;
                at_least_one(key, top_k)?;
                self.analyzer.top_k = top_k;
            }
            "analyzer.min_strength" => {
                let strength = parse_float(key, value)?;
                unit_range(key, strength)?;
                self.analyzer.min_strength = strength;
            }
            "analyzer.detect_communities" => {
                self.analyzer.detect_communities = parse_bool(key, value)?;
            }
            "analyzer.analyze_knowledge_flow" => {
                self.analyzer.analyze_knowledge_flow = parse_bool(key, value)?;
            }
            "analyzer.generate_insights" => {
                self.analyzer.generate_insights = parse_bool(key, value)?;
            }
            "analyzer.seed" => {
                self.analyzer.seed = match value.trim() {
                    "" | "none" => None,
                    seed => Some(
                        seed.parse()
                            .with_context(|| format!("Invalid seed value: {}", value))?,
                    ),
                };
            }

            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        KEYS.iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults by removing the file
    pub fn reset() -> anyhow::Result<()> {
        Self::reset_at(&Self::config_path()?)
    }

    /// Remove a config file if present
    pub fn reset_at(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow!(
        "Unknown configuration key: {}. Use `knowmesh config list` to see available keys.",
        key
    )
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} value: {} (expected true or false)", key, value))
}

fn parse_float(key: &str, value: &str) -> anyhow::Result<f64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} value: {}", key, value))
}

fn unit_range(key: &str, value: f64) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(anyhow!("{} must be between 0.0 and 1.0", key));
    }
    Ok(())
}

fn at_least_one(key: &str, value: usize) -> anyhow::Result<()> {
    if value == 0 {
        return Err(anyhow!("{} must be at least 1", key));
    }
    Ok(())
}
