use super::{RegionLookup, coordinate, path_component, required_component, run_captured};
use crate::types::{RegionQuery, TabixParams};
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

/// Dataset whose files are laid out without state model or saliency level
pub const DHS_INDEX: &str = "dhsIndex";

/// Name of the bgzipped, tabix-indexed file at the end of every lookup path
pub const INDEX_FILE_NAME: &str = "recommendations.bed.gz";

/// Everything needed to run one tabix lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabixRequest {
    /// Location of the indexed file, URL or local path
    pub path: String,
    /// `chrom:start-end`
    pub region: String,
    /// Working directory; tabix stores the downloaded `.tbi` here
    pub work_dir: PathBuf,
}

impl TabixRequest {
    /// Resolve the lookup path and working directory for a `/v2` query.
    ///
    /// The working directory repeats the dataset layout under `work_root` so
    /// that two datasets sharing an assembly and state model never share a
    /// cached index.
    pub fn from_params(params: &TabixParams, work_root: &Path) -> Result<Self> {
        let dataset = path_component("datasetAltname", &params.dataset_altname)?;
        let assembly = path_component("assembly", &params.assembly)?;
        let group = path_component("groupEncoded", &params.group_encoded)?;
        let scale_level = params.scale_level.to_string();
        let window_size = params.window_size.to_string();

        let segments: Vec<&str> = if dataset == DHS_INDEX {
            vec![dataset, assembly, group, scale_level.as_str(), window_size.as_str()]
        } else {
            let state_model = required_component("stateModel", params.state_model.as_deref())?;
            let saliency_level =
                required_component("saliencyLevel", params.saliency_level.as_deref())?;
            vec![
                "recommender",
                "v2",
                dataset,
                assembly,
                state_model,
                group,
                saliency_level,
                scale_level.as_str(),
                window_size.as_str(),
            ]
        };

        let base = check_tabix_url(&params.tabix_url_encoded)?;
        if params.chromosome.is_empty() {
            return Err(Error::InvalidInput("missing chromosome".to_string()));
        }

        Ok(Self {
            path: format!("{}/{}/{}", base, segments.join("/"), INDEX_FILE_NAME),
            region: format!("{}:{}-{}", params.chromosome, params.start, params.end),
            work_dir: segments
                .iter()
                .fold(work_root.to_path_buf(), |dir, segment| dir.join(segment)),
        })
    }

    /// The processor's view of this lookup
    pub fn region_query(&self, params: &TabixParams) -> Result<RegionQuery> {
        RegionQuery::new(
            params.chromosome.clone(),
            coordinate("start", params.start)?,
            coordinate("end", params.end)?,
            coordinate("windowSize", params.window_size)?,
            self.path.clone(),
        )
    }
}

/// Accept remote locations tabix can stream from, or anything else as a local path.
fn check_tabix_url(value: &str) -> Result<&str> {
    if value.is_empty() {
        return Err(Error::InvalidInput("missing tabixUrlEncoded".to_string()));
    }
    if !value.contains("://") {
        return Ok(value);
    }

    let url = url::Url::parse(value)
        .map_err(|e| Error::InvalidInput(format!("invalid tabix URL {}: {}", value, e)))?;
    match url.scheme() {
        "http" | "https" | "ftp" | "file" => Ok(value),
        other => Err(Error::InvalidInput(format!(
            "unsupported tabix URL scheme: {}",
            other
        ))),
    }
}

/// Runs the `tabix` command line tool
pub struct TabixCli {
    binary: PathBuf,
    byte_limit: usize,
}

impl TabixCli {
    pub fn new(binary: &Path, byte_limit: usize) -> Result<Self> {
        Ok(Self {
            binary: super::program_path(binary)?,
            byte_limit,
        })
    }
}

#[async_trait]
impl RegionLookup for TabixCli {
    async fn query(&self, request: &TabixRequest) -> Result<String> {
        fs::create_dir_all(&request.work_dir).await?;

        let mut command = Command::new(&self.binary);
        command
            .arg(&request.path)
            .arg(&request.region)
            .current_dir(&request.work_dir);

        tracing::debug!("tabix {} {}", request.path, request.region);
        let output = run_captured(command, self.byte_limit).await?;

        // tabix exits non-zero for unknown sequences or unreachable files;
        // whatever it printed is still handed on and yields an empty result
        if !output.status.success() {
            tracing::warn!(
                "tabix exited with {} for {} {}: {}",
                output.status,
                request.path,
                request.region,
                output.stderr.trim()
            );
        }

        Ok(output.stdout)
    }
}
