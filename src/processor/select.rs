/// Line picked out of a multi-hit lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Index into the line slice handed to [`nearest_line`]
    pub index: usize,
    /// Absolute distance between the line's midpoint and the query midpoint
    pub distance: i64,
}

/// Midpoint of a lookup interval, truncating toward zero. `None` when the
/// bounds are too far apart to represent.
pub fn interval_midpoint(start: i64, end: i64) -> Option<i64> {
    start.checked_add(end.checked_sub(start)? / 2)
}

/// Find the record whose midpoint lies closest to `midpoint`.
///
/// Only lines whose start column parses to a non-zero integer are
/// candidates; blank trailing lines and records starting at 0 are skipped,
/// as are records whose distance does not fit in an `i64`.
/// Ties go to the earliest line.
pub fn nearest_line(lines: &[&str], midpoint: i64) -> Option<Selection> {
    let mut best: Option<Selection> = None;

    for (index, line) in lines.iter().enumerate() {
        let Some((start, end)) = interval_bounds(line) else {
            continue;
        };
        if start == 0 {
            continue;
        }

        let Some(distance) = distance_to(start, end, midpoint) else {
            tracing::debug!("skipping out-of-range record: {}", line);
            continue;
        };
        match best {
            Some(current) if current.distance <= distance => {}
            _ => best = Some(Selection { index, distance }),
        }
    }

    best
}

fn distance_to(start: i64, end: i64, midpoint: i64) -> Option<i64> {
    interval_midpoint(start, end)?
        .checked_sub(midpoint)?
        .checked_abs()
}

fn interval_bounds(line: &str) -> Option<(i64, i64)> {
    let mut fields = line.split('\t').skip(1);
    let start = fields.next()?.trim().parse().ok()?;
    let end = fields.next()?.trim().parse().ok()?;
    Some((start, end))
}
