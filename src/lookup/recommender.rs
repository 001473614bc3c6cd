use super::{Recommender, coordinate, path_component, run_captured};
use crate::types::RecommenderParams;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

/// Command line for one recommender run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommenderRequest {
    pub args: Vec<String>,
    pub work_dir: PathBuf,
}

impl RecommenderRequest {
    /// Translate `/v1` query parameters into recommender flags.
    ///
    /// Optional parameters are left off entirely so the script falls back to
    /// its own defaults.
    pub fn from_params(params: &RecommenderParams, work_root: &Path) -> Result<Self> {
        let dataset_altname = path_component("datasetAltname", &params.dataset_altname)?;
        coordinate("start", params.start)?;
        coordinate("end", params.end)?;
        if params.chromosome.is_empty() {
            return Err(Error::InvalidInput("missing chromosome".to_string()));
        }

        let mut args = Vec::new();
        let mut push = |flag: &str, value: Option<&str>| {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.to_string());
            }
        };

        push("--dataset", Some(params.dataset_encoded.as_str()));
        push("--dataset-altname", Some(dataset_altname));
        push("--assembly", Some(params.assembly.as_str()));
        push("--state-model", Some(params.state_model.as_str()));
        push("--group", Some(params.group_encoded.as_str()));
        push("--group-altname", params.group_altname.as_deref());
        push("--saliency-level", Some(params.saliency_level.as_str()));
        push("--saliency-level-altname", params.saliency_level_altname.as_deref());
        push("--chromosome", Some(params.chromosome.as_str()));
        push("--start", Some(params.start.to_string().as_str()));
        push("--end", Some(params.end.to_string().as_str()));
        push("--tabix-source", params.tabix_source.as_deref());
        push("--tabix-url", params.tabix_url_encoded.as_deref());
        push("--database-url", params.database_url_encoded.as_deref());
        push("--output-destination", params.output_destination.as_deref());
        push("--output-format", Some(params.output_format.as_str()));

        Ok(Self {
            args,
            work_dir: work_root.join("recommender").join("v1").join(dataset_altname),
        })
    }
}

/// Runs the recommender script as a subprocess
pub struct RecommenderScript {
    script: PathBuf,
    byte_limit: usize,
}

impl RecommenderScript {
    pub fn new(script: &Path, byte_limit: usize) -> Result<Self> {
        Ok(Self {
            script: super::program_path(script)?,
            byte_limit,
        })
    }
}

#[async_trait]
impl Recommender for RecommenderScript {
    async fn recommend(&self, request: &RecommenderRequest) -> Result<String> {
        fs::create_dir_all(&request.work_dir).await?;

        let mut command = Command::new(&self.script);
        command.args(&request.args).current_dir(&request.work_dir);

        let output = run_captured(command, self.byte_limit).await?;
        if !output.status.success() {
            tracing::error!(
                "{} exited with {}: {}",
                self.script.display(),
                output.status,
                output.stderr.trim()
            );
            return Err(Error::Upstream(format!(
                "recommender exited with {}",
                output.status
            )));
        }

        Ok(output.stdout)
    }
}
