//! Post-processing of tabix lookup output.
//!
//! The lookup returns one tab-separated record per line:
//!
//! ```text
//! chrom  start  end  ["chrom:start:end", "chrom:subStart:subEnd", ...]
//! ```
//!
//! In BED mode the text is handed back untouched. In JSON mode the record
//! closest to the query midpoint is picked, the offsets between that record
//! and the query window are computed, and the packed sub-hits are shifted by
//! those offsets before being returned as a tab-delimited block inside a
//! [`ResponseEnvelope`].

mod packed;
mod select;

pub use packed::{parse_packed_field, remap_sub_hit, render_hits, repair_packed_field};
pub use select::{Selection, interval_midpoint, nearest_line};

use crate::types::{OutputFormat, QueryEcho, RegionQuery, ResponseEnvelope};
use crate::{Error, Result};

/// Response body plus the content type it should be served with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedResponse {
    pub body: String,
    pub content_type: &'static str,
}

/// Turn buffered lookup output into a response body.
pub fn process(raw: &str, query: &RegionQuery, format: OutputFormat) -> Result<ProcessedResponse> {
    let body = match format {
        OutputFormat::Bed => raw.to_string(),
        OutputFormat::Json => {
            let envelope = build_envelope(raw, query)?;
            serde_json::to_string(&envelope)
                .map_err(|e| Error::Internal(format!("failed to serialize envelope: {}", e)))?
        }
    };

    Ok(ProcessedResponse {
        body,
        content_type: format.content_type(),
    })
}

/// Build the JSON envelope for `raw` lookup output.
///
/// The lookup terminates its output with a newline, so the number of hits is
/// one less than the number of `\n`-separated pieces.
pub fn build_envelope(raw: &str, query: &RegionQuery) -> Result<ResponseEnvelope> {
    let mut echo = QueryEcho::new(query)?;
    let mut hits = Vec::new();

    let mut lines: Vec<&str> = raw.split('\n').collect();
    echo.hit_count = lines.len() - 1;

    if echo.hit_count > 1 {
        match nearest_line(&lines, echo.midpoint) {
            Some(selection) => {
                tracing::debug!(
                    "selected line {} of {} at distance {}",
                    selection.index,
                    echo.hit_count,
                    selection.distance
                );
                lines = vec![lines[selection.index]];
                echo.hit_count = 1;
                echo.hit_distance = selection.distance;
            }
            None => {
                lines.clear();
                echo.hit_count = 0;
            }
        }
    }

    if echo.hit_count == 1 {
        if let Some(line) = lines.first().filter(|line| !line.is_empty()) {
            hits.push(apply_hit(&mut echo, line, query)?);
        }
    }

    Ok(ResponseEnvelope { query: echo, hits })
}

/// Record the matched interval on `echo` and render its remapped sub-hits.
fn apply_hit(echo: &mut QueryEcho, line: &str, query: &RegionQuery) -> Result<String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 3 {
        return Err(Error::UpstreamParse(format!(
            "lookup record has fewer than three columns: {}",
            line
        )));
    }

    let start = parse_column(fields[1], "start", line)?;
    let end = parse_column(fields[2], "end", line)?;

    let start_diff = start.checked_sub(query.start).ok_or_else(|| out_of_range(line))?;
    let end_diff = query.end.checked_sub(end).ok_or_else(|| out_of_range(line))?;
    echo.hit_first_interval = fields[..3].iter().map(|f| f.to_string()).collect();
    echo.hit_first_start_diff = start_diff;
    echo.hit_first_end_diff = end_diff;

    let packed = fields.get(3).ok_or_else(|| {
        Error::UpstreamParse(format!("lookup record has no packed hit column: {}", line))
    })?;
    let entries = parse_packed_field(packed)?;

    render_hits(&entries, start_diff, end_diff)
}

fn out_of_range(line: &str) -> Error {
    Error::UpstreamParse(format!("lookup record lies out of range of the query: {}", line))
}

fn parse_column(value: &str, name: &str, line: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| {
        Error::UpstreamParse(format!("non-integer {} column in lookup record: {}", name, line))
    })
}
