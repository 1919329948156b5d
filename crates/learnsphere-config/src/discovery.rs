use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use learnsphere_utils::error::ConfigError;

use super::{CliArgs, Config, ConfigSource, Defaults, GeminiConfig, LlmConfig};

/// Environment variable overriding `[llm] provider`
pub const ENV_LLM_PROVIDER: &str = "LEARNSPHERE_LLM_PROVIDER";

/// Environment variable overriding `[defaults] model`
pub const ENV_MODEL: &str = "LEARNSPHERE_MODEL";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    defaults: Option<FileDefaults>,
    llm: Option<LlmConfig>,
}

/// `[defaults]` as written in the file: every key optional, no built-in values
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct FileDefaults {
    model: Option<String>,
    temperature: Option<f32>,
    request_timeout: Option<u64>,
    verbose: Option<bool>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > env > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover configuration starting from a specific directory, reading the
    /// process environment.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        Self::discover_with_env(start_dir, cli_args, |key| std::env::var(key).ok())
    }

    /// Path- and environment-driven discovery.
    ///
    /// Tests pass their own `env` lookup so they never mutate process-global state.
    pub fn discover_with_env<F>(start_dir: &Path, cli_args: &CliArgs, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut source_attribution = HashMap::new();

        let mut defaults = Defaults::default();
        let mut llm = LlmConfig::default();

        for key in ["model", "temperature", "request_timeout", "verbose", "llm_provider"] {
            source_attribution.insert(key.to_string(), ConfigSource::Defaults);
        }

        let config_path = match &cli_args.config_path {
            Some(explicit_path) => {
                if !explicit_path.exists() {
                    return Err(ConfigError::NotFound {
                        path: explicit_path.display().to_string(),
                    }
                    .into());
                }
                Some(explicit_path.clone())
            }
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;

            let config_source = ConfigSource::ConfigFile(path.clone());

            if let Some(file_defaults) = file_config.defaults {
                if file_defaults.model.is_some() {
                    defaults.model = file_defaults.model;
                    source_attribution.insert("model".to_string(), config_source.clone());
                }
                if file_defaults.temperature.is_some() {
                    defaults.temperature = file_defaults.temperature;
                    source_attribution.insert("temperature".to_string(), config_source.clone());
                }
                if file_defaults.request_timeout.is_some() {
                    defaults.request_timeout = file_defaults.request_timeout;
                    source_attribution
                        .insert("request_timeout".to_string(), config_source.clone());
                }
                if file_defaults.verbose.is_some() {
                    defaults.verbose = file_defaults.verbose;
                    source_attribution.insert("verbose".to_string(), config_source.clone());
                }
            }

            if let Some(file_llm) = file_config.llm {
                if file_llm.provider.is_some() {
                    llm.provider = file_llm.provider;
                    source_attribution.insert("llm_provider".to_string(), config_source.clone());
                }
                if let Some(file_gemini) = file_llm.gemini {
                    llm.gemini = Some(file_gemini);
                    source_attribution.insert("llm_gemini".to_string(), config_source);
                }
            }
        }

        if let Some(env_model) = env(ENV_MODEL)
            && !env_model.is_empty()
        {
            defaults.model = Some(env_model);
            source_attribution.insert("model".to_string(), ConfigSource::Env);
        }
        if let Some(env_provider) = env(ENV_LLM_PROVIDER)
            && !env_provider.is_empty()
        {
            llm.provider = Some(env_provider);
            source_attribution.insert("llm_provider".to_string(), ConfigSource::Env);
        }

        if let Some(model) = &cli_args.model {
            defaults.model = Some(model.clone());
            source_attribution.insert("model".to_string(), ConfigSource::Cli);
        }
        if let Some(temperature) = cli_args.temperature {
            defaults.temperature = Some(temperature);
            source_attribution.insert("temperature".to_string(), ConfigSource::Cli);
        }
        if let Some(request_timeout) = cli_args.request_timeout {
            defaults.request_timeout = Some(request_timeout);
            source_attribution.insert("request_timeout".to_string(), ConfigSource::Cli);
        }
        if let Some(verbose) = cli_args.verbose {
            defaults.verbose = Some(verbose);
            source_attribution.insert("verbose".to_string(), ConfigSource::Cli);
        }
        if let Some(provider) = &cli_args.llm_provider {
            llm.provider = Some(provider.clone());
            source_attribution.insert("llm_provider".to_string(), ConfigSource::Cli);
        }

        if llm.provider.is_none() {
            llm.provider = Some(super::DEFAULT_PROVIDER.to_string());
        }
        if llm.gemini.is_none() {
            llm.gemini = Some(GeminiConfig::default());
        }

        let config = Self {
            defaults,
            llm,
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Search upward from `start_dir` for `.learnsphere/config.toml`.
    ///
    /// Stops at repository root markers (.git, .hg, .svn) or the filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = start_dir.to_path_buf();

        loop {
            let config_path = current_dir.join(".learnsphere").join("config.toml");
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config file: {}", path.display())),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn create_test_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_dir = dir.join(".learnsphere");
        fs::create_dir_all(&config_dir).unwrap();
        let config_path = config_dir.join("config.toml");
        fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    fn test_defaults_without_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();

        let config =
            Config::discover_with_env(temp_dir.path(), &CliArgs::default(), no_env).unwrap();

        assert_eq!(config.model(), "gemini-2.5-flash");
        assert!((config.temperature() - 0.75).abs() < f32::EPSILON);
        assert_eq!(config.provider(), "gemini");
        assert_eq!(config.gemini_api_key_env(), "API_KEY");
        assert_eq!(
            config.source_attribution.get("model"),
            Some(&ConfigSource::Defaults)
        );
    }

    #[test]
    fn test_discovers_file_in_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        let config_path = create_test_config_file(
            temp_dir.path(),
            r#"
[defaults]
model = "gemini-2.5-pro"
request_timeout = 120

[llm.gemini]
api_key_env = "GEMINI_API_KEY"
"#,
        );
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::discover_with_env(&nested, &CliArgs::default(), no_env).unwrap();

        assert_eq!(config.model(), "gemini-2.5-pro");
        assert_eq!(config.request_timeout().as_secs(), 120);
        assert_eq!(config.gemini_api_key_env(), "GEMINI_API_KEY");
        assert_eq!(
            config.source_attribution.get("model"),
            Some(&ConfigSource::ConfigFile(config_path))
        );
    }

    #[test]
    fn test_search_stops_at_repository_root() {
        let temp_dir = TempDir::new().unwrap();
        create_test_config_file(temp_dir.path(), "[defaults]\nmodel = \"outer\"\n");
        let repo = temp_dir.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        let found = Config::discover_config_file_from(&repo).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        create_test_config_file(
            temp_dir.path(),
            "[defaults]\nmodel = \"from-file\"\ntemperature = 0.2\n",
        );

        let env = |key: &str| match key {
            ENV_MODEL => Some("from-env".to_string()),
            _ => None,
        };
        let config =
            Config::discover_with_env(temp_dir.path(), &CliArgs::default(), env).unwrap();
        assert_eq!(config.model(), "from-env");
        assert_eq!(
            config.source_attribution.get("model"),
            Some(&ConfigSource::Env)
        );
        assert!((config.temperature() - 0.2).abs() < f32::EPSILON);

        let cli_args = CliArgs {
            model: Some("from-cli".to_string()),
            ..CliArgs::default()
        };
        let config = Config::discover_with_env(temp_dir.path(), &cli_args, env).unwrap();
        assert_eq!(config.model(), "from-cli");
        assert_eq!(
            config.source_attribution.get("model"),
            Some(&ConfigSource::Cli)
        );
    }

    #[test]
    fn test_env_provider_override() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        let env = |key: &str| (key == ENV_LLM_PROVIDER).then(|| "other".to_string());

        let config =
            Config::discover_with_env(temp_dir.path(), &CliArgs::default(), env).unwrap();
        assert_eq!(config.provider(), "other");
    }

    #[test]
    fn test_explicit_missing_path_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.toml");
        let cli_args = CliArgs {
            config_path: Some(missing.clone()),
            ..CliArgs::default()
        };

        let err = Config::discover_with_env(temp_dir.path(), &cli_args, no_env).unwrap_err();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::NotFound { path }) => {
                assert_eq!(path, &missing.display().to_string());
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        create_test_config_file(temp_dir.path(), "[defaults\nmodel = ");

        let err =
            Config::discover_with_env(temp_dir.path(), &CliArgs::default(), no_env).unwrap_err();
        assert!(err.to_string().contains("Failed to load config file"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        create_test_config_file(temp_dir.path(), "[defaults]\nmax_turns = 3\n");

        assert!(Config::discover_with_env(temp_dir.path(), &CliArgs::default(), no_env).is_err());
    }

    #[test]
    fn test_out_of_range_temperature_fails_validation() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        let cli_args = CliArgs {
            temperature: Some(3.5),
            ..CliArgs::default()
        };

        let err = Config::discover_with_env(temp_dir.path(), &cli_args, no_env).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }
}
