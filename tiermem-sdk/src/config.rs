//! Memory Configuration
//!
//! Configuration for the core tier and for provider selection through the
//! registries. Configs are plain serde structs; [`MemoryConfig`] can be read
//! from TOML.
//!
//! ```toml
//! [memory]
//! provider = "composite"
//!
//! [memory.options]
//! persona_limit = 500
//! self_editable = false
//!
//! [vector_store]
//! provider = "inmemory"
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default character limit for each core memory block
pub const DEFAULT_BLOCK_LIMIT: usize = 2000;

/// Core memory tier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Maximum persona block length in characters (default: 2000)
    pub persona_limit: usize,

    /// Maximum human block length in characters (default: 2000)
    pub human_limit: usize,

    /// Whether the agent may edit its own core memory (default: true).
    /// Advisory only; CoreMemory does not enforce it.
    pub self_editable: bool,

    /// Initial persona text
    pub persona: String,

    /// Initial human text
    pub human: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            persona_limit: DEFAULT_BLOCK_LIMIT,
            human_limit: DEFAULT_BLOCK_LIMIT,
            self_editable: true,
            persona: String::new(),
            human: String::new(),
        }
    }
}

impl CoreConfig {
    /// Set the persona limit
    pub fn with_persona_limit(mut self, limit: usize) -> Self {
        self.persona_limit = limit;
        self
    }

    /// Set the human limit
    pub fn with_human_limit(mut self, limit: usize) -> Self {
        self.human_limit = limit;
        self
    }

    pub fn with_self_editable(mut self, self_editable: bool) -> Self {
        self.self_editable = self_editable;
        self
    }

    /// Seed the persona block
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Seed the human block
    pub fn with_human(mut self, human: impl Into<String>) -> Self {
        self.human = human.into();
        self
    }

    /// Build a core config from provider options, starting from defaults.
    /// Recognized keys: `persona_limit`, `human_limit`, `self_editable`,
    /// `persona`, `human`.
    pub fn from_provider(config: &ProviderConfig) -> Result<Self, ConfigValidationError> {
        let mut core = Self::default();
        if let Some(limit) = config.option("persona_limit")? {
            core.persona_limit = limit;
        }
        if let Some(limit) = config.option("human_limit")? {
            core.human_limit = limit;
        }
        if let Some(editable) = config.option("self_editable")? {
            core.self_editable = editable;
        }
        if let Some(persona) = config.option("persona")? {
            core.persona = persona;
        }
        if let Some(human) = config.option("human")? {
            core.human = human;
        }
        Ok(core)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.persona_limit == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "persona_limit".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.human_limit == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "human_limit".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.persona.chars().count() > self.persona_limit {
            return Err(ConfigValidationError::InvalidValue {
                field: "persona".into(),
                message: format!("exceeds persona_limit of {}", self.persona_limit),
            });
        }

        if self.human.chars().count() > self.human_limit {
            return Err(ConfigValidationError::InvalidValue {
                field: "human".into(),
                message: format!("exceeds human_limit of {}", self.human_limit),
            });
        }

        Ok(())
    }
}

/// Provider selection: a registry name plus free-form options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Registered provider name
    pub provider: String,

    /// Provider-specific options
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub options: HashMap<String, serde_json::Value>,
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            options: HashMap::new(),
        }
    }

    /// Set an option value
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Decode an option into `T`. Missing keys yield `Ok(None)`.
    pub fn option<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigValidationError> {
        match self.options.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                ConfigValidationError::InvalidValue {
                    field: format!("{}.{}", self.provider, key),
                    message: e.to_string(),
                }
            }),
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigValidationError> {
        if self.provider.trim().is_empty() {
            return Err(ConfigValidationError::MissingProvider {
                field: field.to_string(),
            });
        }
        Ok(())
    }
}

/// Top-level memory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Memory provider (default: "composite")
    pub memory: ProviderConfig,

    /// Vector store provider (default: "inmemory")
    pub vector_store: ProviderConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            memory: ProviderConfig::new("composite"),
            vector_store: ProviderConfig::new("inmemory"),
        }
    }
}

impl MemoryConfig {
    /// Set the memory provider
    pub fn with_memory(mut self, memory: ProviderConfig) -> Self {
        self.memory = memory;
        self
    }

    /// Set the vector store provider
    pub fn with_vector_store(mut self, vector_store: ProviderConfig) -> Self {
        self.vector_store = vector_store;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigValidationError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigValidationError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.memory.validate("memory.provider")?;
        self.vector_store.validate("vector_store.provider")?;

        if matches!(self.memory.provider.as_str(), "composite" | "core") {
            CoreConfig::from_provider(&self.memory)?.validate()?;
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("{field} is required")]
    MissingProvider { field: String },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("failed to parse config: {message}")]
    Parse { message: String },
}
