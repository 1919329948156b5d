//! Command implementations

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::args::Emit;
use crate::llm::GenerationClient;
use crate::orchestrator::{EditOutcome, StateObserver};
use crate::pipeline::{Pipeline, PipelineSettings};
use crate::utils::error::ConfigError;
use crate::{ActivationKey, Config, ContentOrchestrator, LearnSphereError, RunState, Seed, StateSnapshot};

/// Printed between the spec and the document for `--emit both`
const BOTH_SEPARATOR: &str = "\n----- code -----\n";

/// Arguments of `learnsphere generate`
#[derive(Debug, Clone)]
pub(crate) struct GenerateOptions {
    pub url: String,
    pub reload_token: u64,
    pub seed_spec: Option<PathBuf>,
    pub seed_code: Option<PathBuf>,
    pub edit_spec: Option<PathBuf>,
    pub edit_code: Option<PathBuf>,
    pub emit: Emit,
    pub json: bool,
}

/// Logs each applied transition
struct ProgressLogger;

impl StateObserver for ProgressLogger {
    fn on_transition(&self, snapshot: &StateSnapshot) {
        tracing::info!(
            generation = snapshot.generation,
            state = %snapshot.run_state,
            "Content state changed"
        );
    }
}

pub(crate) async fn execute_generate_command(
    options: &GenerateOptions,
    config: &Config,
) -> Result<()> {
    let orchestrator = ContentOrchestrator::from_config(config).map_err(LearnSphereError::from)?;
    orchestrator.add_observer(Arc::new(ProgressLogger));

    let seed = match (&options.seed_spec, &options.seed_code) {
        (Some(spec_path), Some(code_path)) => Seed::new(
            read_input(spec_path, "--seed-spec")?,
            read_input(code_path, "--seed-code")?,
        ),
        _ => Seed::none(),
    };
    if options.seed_spec.is_some() && seed.complete().is_none() {
        tracing::warn!("Seed spec or code is empty; generating from scratch");
    }

    let session = orchestrator.activate(
        ActivationKey::new(options.url.as_str(), options.reload_token),
        &seed,
    );
    session.run().await.map_err(LearnSphereError::from)?;

    if let Some(path) = &options.edit_spec {
        let text = read_input(path, "--edit-spec")?;
        match session
            .commit_spec_edit(&text)
            .await
            .map_err(LearnSphereError::from)?
        {
            EditOutcome::Unchanged => {
                tracing::info!("Edited spec matches the current spec; code not regenerated");
            }
            EditOutcome::Regenerated(state) => {
                tracing::info!(state = %state, "Regenerated code from edited spec");
            }
        }
    }

    if let Some(path) = &options.edit_code {
        let text = read_input(path, "--edit-code")?;
        session.edit_code(&text).map_err(LearnSphereError::from)?;
    }

    let snapshot = session.snapshot();
    if options.json {
        let json =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize state snapshot")?;
        println!("{json}");
    } else {
        print_artifacts(&snapshot, options.emit);
    }

    match (snapshot.run_state, snapshot.error) {
        (RunState::Error, Some(error)) => Err(LearnSphereError::RunFailed {
            basis: snapshot.basis,
            stage: error.stage,
            category: error.category,
            detail: error.message,
        }
        .into()),
        _ => Ok(()),
    }
}

pub(crate) async fn execute_code_command(spec_file: &Path, config: &Config) -> Result<()> {
    let spec = read_input(spec_file, "SPEC_FILE")?;
    let client: Arc<dyn GenerationClient> = Arc::from(
        crate::llm::from_config(config).map_err(LearnSphereError::from)?,
    );
    let pipeline = Pipeline::new(client, PipelineSettings::from_config(config));

    let code = pipeline
        .code_from_spec(spec.trim())
        .await
        .map_err(LearnSphereError::from)?;
    println!("{code}");
    Ok(())
}

pub(crate) fn execute_config_command(json: bool, config: &Config) -> Result<()> {
    let effective: BTreeMap<String, (String, String)> =
        config.effective_config().into_iter().collect();

    if json {
        let values: BTreeMap<&str, serde_json::Value> = effective
            .iter()
            .map(|(key, (value, source))| {
                (
                    key.as_str(),
                    serde_json::json!({ "value": value, "source": source }),
                )
            })
            .collect();
        let output =
            serde_json::to_string_pretty(&values).context("Failed to serialize configuration")?;
        println!("{output}");
        return Ok(());
    }

    println!("Effective configuration:");
    for (key, (value, source)) in &effective {
        println!("  {key} = {value} ({source})");
    }
    Ok(())
}

fn print_artifacts(snapshot: &StateSnapshot, emit: Emit) {
    match emit {
        Emit::Spec => {
            if let Some(spec) = &snapshot.spec {
                println!("{spec}");
            }
        }
        Emit::Code => {
            if let Some(code) = &snapshot.code {
                println!("{code}");
            }
        }
        Emit::Both => {
            if let Some(spec) = &snapshot.spec {
                println!("{spec}");
            }
            if let Some(code) = &snapshot.code {
                println!("{BOTH_SEPARATOR}");
                println!("{code}");
            }
        }
        Emit::Status => println!("{}", snapshot.run_state),
    }
}

fn read_input(path: &Path, flag: &str) -> Result<String, LearnSphereError> {
    std::fs::read_to_string(path).map_err(|e| {
        LearnSphereError::Config(ConfigError::InvalidValue {
            key: flag.to_string(),
            value: format!("cannot read {}: {e}", path.display()),
        })
    })
}
