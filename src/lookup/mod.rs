//! External collaborators that produce region data.
//!
//! Both the tabix lookup and the recommender script are run as
//! subprocesses. They sit behind traits so the HTTP layer can be exercised
//! without either tool installed.
//!
//! # Implementations
//!
//! - [`TabixCli`] - runs the `tabix` binary against a remote or local
//!   `recommendations.bed.gz`
//! - [`RecommenderScript`] - runs the recommender script with the query as
//!   command line flags

mod command;
mod recommender;
mod tabix;

pub use command::{CommandOutput, program_path, run_captured};
pub use recommender::{RecommenderRequest, RecommenderScript};
pub use tabix::{DHS_INDEX, INDEX_FILE_NAME, TabixCli, TabixRequest};

use crate::{Error, Result};
use async_trait::async_trait;

/// Positional lookup over an indexed interval file
#[async_trait]
pub trait RegionLookup: Send + Sync {
    /// Run the lookup and return its complete stdout
    async fn query(&self, request: &TabixRequest) -> Result<String>;
}

/// Similar-region recommender
#[async_trait]
pub trait Recommender: Send + Sync {
    /// Run the recommender and return its complete stdout
    async fn recommend(&self, request: &RecommenderRequest) -> Result<String>;
}

/// Validate a query value that becomes a single directory name.
fn path_component<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0'])
    {
        return Err(Error::InvalidInput(format!(
            "{} is not a valid path component: {:?}",
            name, value
        )));
    }
    Ok(value)
}

fn required_component<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
    let value = value.ok_or_else(|| Error::InvalidInput(format!("missing parameter {}", name)))?;
    path_component(name, value)
}

fn coordinate(name: &str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::InvalidInput(format!("{} is out of range", name)))
}
