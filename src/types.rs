use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output formats a client can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Raw tab-delimited lookup output, passed through untouched
    Bed,
    /// Normalized envelope built by the interval processor
    Json,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Bed => "text/plain",
            OutputFormat::Json => "application/json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Bed => "BED",
            OutputFormat::Json => "JSON",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BED" => Ok(OutputFormat::Bed),
            "JSON" => Ok(OutputFormat::Json),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A region query as seen by the interval processor.
///
/// Coordinates are half-open. `window_size` is in kilobases and only feeds the
/// echoed size labels and `hitPadding`.
#[derive(Debug, Clone)]
pub struct RegionQuery {
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    pub window_size: i64,
    pub tabix_path: String,
}

impl RegionQuery {
    /// Build a query from client coordinates, rejecting inverted windows and
    /// window sizes whose derived fields do not fit in an `i64`.
    pub fn new(
        chromosome: String,
        start: i64,
        end: i64,
        window_size: i64,
        tabix_path: String,
    ) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "start {} is past end {}",
                start, end
            )));
        }

        let query = Self {
            chromosome,
            start,
            end,
            window_size,
            tabix_path,
        };
        query.midpoint()?;
        query.hit_padding()?;
        Ok(query)
    }

    pub fn midpoint(&self) -> Result<i64, Error> {
        let half = self.span()?.div_euclid(2).abs();
        self.start
            .checked_add(half)
            .ok_or_else(|| self.overflow("midpoint"))
    }

    pub fn size_key(&self) -> Result<String, Error> {
        Ok(format!("{}k", self.span()? / 1000))
    }

    pub fn window_size_key(&self) -> String {
        format!("{}k", self.window_size)
    }

    pub fn hit_padding(&self) -> Result<i64, Error> {
        let window_bases = self
            .window_size
            .checked_mul(1000)
            .ok_or_else(|| self.overflow("window size"))?;
        self.span()?
            .checked_sub(window_bases)
            .map(|padding| padding / 2)
            .ok_or_else(|| self.overflow("hit padding"))
    }

    fn span(&self) -> Result<i64, Error> {
        self.end
            .checked_sub(self.start)
            .ok_or_else(|| self.overflow("region length"))
    }

    fn overflow(&self, what: &str) -> Error {
        Error::InvalidInput(format!(
            "{} overflows for {}:{}-{} (window {}k)",
            what, self.chromosome, self.start, self.end, self.window_size
        ))
    }
}

/// JSON response body for the tabix lookup path
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    pub query: QueryEcho,
    pub hits: Vec<String>,
}

/// Query echo block. Field order is part of the wire contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEcho {
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    pub midpoint: i64,
    pub size_key: String,
    pub window_size: String,
    pub tabix_path: String,
    pub hit_padding: i64,
    pub hit_count: usize,
    pub hit_distance: i64,
    pub hit_first_interval: Vec<String>,
    pub hit_first_start_diff: i64,
    pub hit_first_end_diff: i64,
}

impl QueryEcho {
    /// Echo of `query` with every hit field at its unset sentinel
    pub fn new(query: &RegionQuery) -> Result<Self, Error> {
        Ok(Self {
            chromosome: query.chromosome.clone(),
            start: query.start,
            end: query.end,
            midpoint: query.midpoint()?,
            size_key: query.size_key()?,
            window_size: query.window_size_key(),
            tabix_path: query.tabix_path.clone(),
            hit_padding: query.hit_padding()?,
            hit_count: 0,
            hit_distance: -1,
            hit_first_interval: Vec::new(),
            hit_first_start_diff: -1,
            hit_first_end_diff: -1,
        })
    }
}

/// Query parameters for the tabix lookup (`GET /v2`)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabixParams {
    pub dataset_altname: String,
    pub assembly: String,
    pub state_model: Option<String>,
    pub group_encoded: String,
    pub saliency_level: Option<String>,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub tabix_url_encoded: String,
    pub scale_level: u64,
    pub window_size: u64,
    pub output_format: String,
}

/// Query parameters for the recommender script (`GET /v1`)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommenderParams {
    pub dataset_encoded: String,
    pub dataset_altname: String,
    pub assembly: String,
    pub state_model: String,
    pub group_encoded: String,
    pub group_altname: Option<String>,
    pub saliency_level: String,
    pub saliency_level_altname: Option<String>,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub tabix_source: Option<String>,
    pub tabix_url_encoded: Option<String>,
    pub database_url_encoded: Option<String>,
    pub output_destination: Option<String>,
    pub output_format: String,
}
