//! Reconstructs the year → monthly-token delinquency timeline from segmented
//! account text. Each source format lays the grid out differently, so each
//! gets its own builder; both emit the same `DpdHistory` shape.

use tracing::warn;

use crate::extract::patterns::{DPD_TOKEN_RE, MONTH_TOKEN_RE, YEAR_LINE_RE};
use crate::report::DpdHistory;

/// Markup grid layout: a line that is exactly a 4-digit year, followed by up
/// to 12 monthly token lines (one report year covers at most 12 months).
pub fn history_from_block(block: &str) -> DpdHistory {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut history = DpdHistory::new();
    for (i, line) in lines.iter().enumerate() {
        if !YEAR_LINE_RE.is_match(line) {
            continue;
        }
        let mut tokens = Vec::new();
        for token_line in lines.iter().skip(i + 1).take(12) {
            tokens.extend(
                DPD_TOKEN_RE
                    .find_iter(token_line)
                    .map(|m| m.as_str().to_string()),
            );
        }
        if !tokens.is_empty() {
            history.insert(line.to_string(), tokens);
        }
    }
    history
}

/// Page-text grid layout: DPD tokens and mm-yy month stamps are matched as
/// two independent flat streams over the account's text run and paired by
/// position — token\[i\] belongs to the year of month\[i\]. Tokens past the
/// last stamp cannot be attributed and land under the "UNKNOWN" year. The
/// pairing is positional by contract, so a misaligned source silently
/// mis-buckets tokens; a stream-length mismatch is surfaced as a warning.
pub fn history_from_run(run: &str) -> DpdHistory {
    let tokens: Vec<&str> = DPD_TOKEN_RE.find_iter(run).map(|m| m.as_str()).collect();
    if tokens.is_empty() {
        return DpdHistory::new();
    }
    let months: Vec<&str> = MONTH_TOKEN_RE.find_iter(run).map(|m| m.as_str()).collect();
    if !months.is_empty() && months.len() != tokens.len() {
        warn!(
            tokens = tokens.len(),
            months = months.len(),
            "dpd token and month-stamp streams misaligned"
        );
    }

    let mut history = DpdHistory::new();
    for (i, token) in tokens.iter().enumerate() {
        let year = match months.get(i).and_then(|stamp| stamp.split('-').nth(1)) {
            Some(yy) => format!("20{yy}"),
            None => "UNKNOWN".to_string(),
        };
        history.entry(year).or_default().push((*token).to_string());
    }
    history
}
