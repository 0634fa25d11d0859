use std::path::Path;

use secrecy::ExposeSecret;

use crate::{AnyOrList, Config};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, placeholder expansion
    /// fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml_str(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the backend key is missing, the model table
    /// references a model without capabilities, a timeout is zero, or CORS
    /// combines credentials with wildcards
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_backend()?;
        self.validate_models()?;
        self.validate_compat()?;
        self.validate_cors()?;
        Ok(())
    }

    fn validate_backend(&self) -> anyhow::Result<()> {
        let has_key = self
            .backend
            .api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty());

        if !has_key {
            anyhow::bail!("backend.api_key is required");
        }

        let timeouts = [
            ("request_timeout", self.backend.request_timeout),
            ("connect_timeout", self.backend.connect_timeout),
            ("header_timeout", self.backend.header_timeout),
        ];
        for (name, value) in timeouts {
            if value.is_zero() {
                anyhow::bail!("backend.{name} must be greater than zero");
            }
        }

        Ok(())
    }

    fn validate_models(&self) -> anyhow::Result<()> {
        let models = &self.models;

        if !models.capabilities.contains_key(&models.default_model) {
            anyhow::bail!(
                "models.default_model '{}' has no entry in models.capabilities",
                models.default_model
            );
        }

        for (front, back) in &models.mapping {
            if !models.capabilities.contains_key(back) {
                anyhow::bail!("model '{front}' maps to '{back}', which has no entry in models.capabilities");
            }
        }

        Ok(())
    }

    fn validate_compat(&self) -> anyhow::Result<()> {
        let Some(ref compat) = self.server.compat else {
            return Ok(());
        };

        if compat.max_tokens_cap == 0 {
            anyhow::bail!("server.compat.max_tokens_cap must be greater than zero");
        }

        if compat.user_agents.is_empty() {
            tracing::warn!("server.compat has no user_agents and will never match a client");
        }

        // A cap above the threshold raises limits instead of lowering them
        if compat.max_tokens_cap > compat.max_tokens_threshold {
            tracing::warn!(
                cap = compat.max_tokens_cap,
                threshold = compat.max_tokens_threshold,
                "server.compat.max_tokens_cap exceeds max_tokens_threshold"
            );
        }

        Ok(())
    }

    fn validate_cors(&self) -> anyhow::Result<()> {
        let Some(ref cors) = self.server.cors else {
            return Ok(());
        };

        // Browsers refuse credentialed responses with wildcard allow lists
        if cors.credentials && [&cors.origins, &cors.methods, &cors.headers].contains(&&AnyOrList::Any) {
            anyhow::bail!("server.cors.credentials requires explicit origins, methods and headers");
        }

        Ok(())
    }
}
