use crate::{Error, Result};

/// Decode the packed sub-hit column of a lookup record.
///
/// Well-formed columns are a JSON array of strings. Some datasets were
/// written with the whole array wrapped in an extra pair of quotes and every
/// inner quote doubled (`"[""chr1:100:200""]"`), so a failed direct parse is
/// retried once on a repaired copy of the column.
pub fn parse_packed_field(field: &str) -> Result<Vec<String>> {
    match serde_json::from_str::<Vec<String>>(field) {
        Ok(entries) => Ok(entries),
        Err(direct) => {
            tracing::debug!("packed field needs repair: {}", direct);
            serde_json::from_str::<Vec<String>>(&repair_packed_field(field)).map_err(|repaired| {
                Error::UpstreamParse(format!(
                    "packed field is not a JSON string array ({}; after repair: {})",
                    direct, repaired
                ))
            })
        }
    }
}

/// Undo the quoting of a mis-encoded packed column: unwrap the first `"[`
/// and the first `]"`, then collapse every doubled quote.
pub fn repair_packed_field(field: &str) -> String {
    field
        .replacen("\"[", "[", 1)
        .replacen("]\"", "]", 1)
        .replace("\"\"", "\"")
}

/// Shift a `label:start:end[:extra...]` sub-hit by the offsets between the
/// matched interval and the query window. Extra fields are kept verbatim.
pub fn remap_sub_hit(entry: &str, start_diff: i64, end_diff: i64) -> Result<String> {
    let mut elements: Vec<String> = entry.split(':').map(str::to_string).collect();
    if elements.len() < 3 {
        return Err(Error::UpstreamParse(format!(
            "sub-hit has fewer than three fields: {}",
            entry
        )));
    }

    let start = parse_coordinate(&elements[1], entry)?;
    let end = parse_coordinate(&elements[2], entry)?;
    let start = start.checked_sub(start_diff).ok_or_else(|| out_of_range(entry))?;
    let end = end.checked_add(end_diff).ok_or_else(|| out_of_range(entry))?;
    elements[1] = start.to_string();
    elements[2] = end.to_string();

    Ok(elements.join(":"))
}

/// Render the decoded entries as a single tab-delimited block, one sub-hit
/// per line.
///
/// The leading entry describes the matched record itself and is not part
/// of the hit list.
pub fn render_hits(entries: &[String], start_diff: i64, end_diff: i64) -> Result<String> {
    let Some((_, sub_hits)) = entries.split_first() else {
        return Err(Error::UpstreamParse("packed field has no entries".to_string()));
    };

    let remapped = sub_hits
        .iter()
        .map(|entry| remap_sub_hit(entry, start_diff, end_diff))
        .collect::<Result<Vec<_>>>()?;

    Ok(remapped.join("\n").replace(':', "\t"))
}

fn out_of_range(entry: &str) -> Error {
    Error::UpstreamParse(format!("remapped sub-hit does not fit in 64 bits: {}", entry))
}

fn parse_coordinate(value: &str, entry: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::UpstreamParse(format!("non-integer coordinate in sub-hit: {}", entry)))
}
