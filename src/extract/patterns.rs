//! Shared extraction rules, compiled once and read-only for the process
//! lifetime. A rule may carry several alternative capture groups so one
//! pattern can cover multiple report layout variants; `first_match` resolves
//! the match as the first non-empty group, left to right.

use std::sync::LazyLock;

use regex::Regex;

// ── Identity / document-level rules ──

pub static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)CONSUMER(?: NAME)?\s*:\s*([A-Z][A-Z\s.]+?)(?:\s+DATE\s*:|\n|$)").unwrap()
});
pub static PAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:PAN[:\s]+|INCOME TAX ID NUMBER \(PAN\)\s*)([A-Z]{5}\d{4}[A-Z])").unwrap()
});
pub static CKYC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CKYC[:\s]*(\d{12,15})").unwrap());
pub static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)CREDITVISION[®\s]*SCORE[:\s]*(-?\d{1,3})|SCORE[:\s]*(-?\d{1,3})").unwrap()
});
pub static FALLBACK_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(?:CREDIT|SCORE).*?(\d{3})\b").unwrap());
pub static REPORT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)DATE[:\s]*(\d{2}-\d{2}-\d{4})|REPORT\s+DATE\s*&?\s*TIME\s*:\s*(\d{2}/\d{2}/\d{4})|(\d{2}/\d{2}/\d{4},\s*\d{2}:\d{2})",
    )
    .unwrap()
});
pub static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([789]\d{9})\b").unwrap());
pub static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.%+-]+@[\w.-]+\.[a-zA-Z]{2,}").unwrap());

// ── Delinquency grid rules ──

/// The full DPD token vocabulary. Every downstream delinquency computation
/// depends on this set and nothing else being recognized as a token.
pub static DPD_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:000|XXX|STD|-|\d{3})\b").unwrap());
pub static DPD_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DAYS\s+PAST\s+DUE/ASSET\s+CLASSIFICATION").unwrap());
/// Two-digit month-year stamp ("mm-yy") from the page-text grid.
pub static MONTH_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2}-\d{2})\b").unwrap());
/// A line that is exactly a 4-digit year (markup grid layout).
pub static YEAR_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

// ── Section / segmentation rules ──

pub static ACCOUNT_SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CONSUMER ACCOUNT DETAILS").unwrap());
/// Disjunctive account-block delimiter for the markup path: a dd-mm-yyyy date
/// (split point lands before it, the date stays with its block) or one of the
/// field-label headings (consumed by the split).
pub static ACCOUNT_DELIM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d{2}-\d{2}-\d{4}|MEMBER NAME|ACCOUNT TYPE|DATE OPENED").unwrap()
});
pub static ENQUIRY_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)CONSUMER ENQUIRY DETAILS\s*Enquiries").unwrap());
pub static ENQUIRY_SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)ENQUIRIES:\s*(.*)$").unwrap());
pub static ENQUIRY_LINE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}[/-]\d{1,2}[/-]\d{4})").unwrap());
pub static STRICT_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2}-\d{2}-\d{4})\b").unwrap());
pub static AMOUNT_DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d,]+").unwrap());
pub static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
pub static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());

// ── Account summary (document totals) rules ──

pub static SUMMARY_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)CONSUMER\s+ACCOUNT\s+SUMMARY(.*?)(?:CONSUMER\s+ACCOUNT\s+DETAILS|CONSUMER\s+ENQUIRY\s+DETAILS|CONSUMER\s+DETAILS|$)",
    )
    .unwrap()
});
pub static SUMMARY_OVERDUE_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bOverdue\s*:\s*(\d+)\b").unwrap());
pub static SUMMARY_CURRENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bCurrent\s*:\s*₹?\s*([\d,]+)\b").unwrap());
pub static SUMMARY_OVERDUE_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bOverdue\s*:\s*₹\s*([\d,]+)\b").unwrap());
pub static SUMMARY_OVERDUE_AMOUNT_LOOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Overdue\s*[:\s]*₹?\s*([\d,]+)").unwrap());
pub static OVERDUE_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)OVERDUE[:\s]*(\d+)").unwrap());
pub static OVERDUE_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)OVERDUE[:\s]*([\d,]+)").unwrap());
pub static CURRENT_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)CURRENT[:\s]*([\d,]+)").unwrap());

// ── Markup-path account field rules ──

pub static HTML_DATE_OPENED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DATE OPENED[:\s]*([^\n|:]+)").unwrap());
pub static HTML_DATE_CLOSED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DATE CLOSED[:\s]*([^\n|:]+)").unwrap());
pub static HTML_DATE_REPORTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DATE REPORTED[^:\n]*[:\s]*([^\n|:]+)").unwrap());
pub static HTML_STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(inactive|active|STD|NA|STANDARD)\b").unwrap());
pub static HTML_ACCOUNT_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ACCOUNT TYPE\s*:\s*([^\n:]+)").unwrap());
pub static HTML_MEMBER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)MEMBER NAME\s*:\s*([^\n:]+)").unwrap());
pub static HTML_SANCTIONED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SANCTIONED AMOUNT\s*:\s*₹?\s*([^\n:]+)").unwrap());
pub static HTML_CURRENT_BALANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CURRENT BALANCE\s*:\s*₹?\s*([^\n:]+)").unwrap());

// ── Page-text-path account field rules ──

pub static PDF_MEMBER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)MEMBER NAME[:\s]*([^\n]+)").unwrap());
pub static PDF_DATE_OPENED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)OPENED[:\s]*(\d{2}-\d{2}-\d{4})").unwrap());
pub static PDF_DATE_CLOSED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CLOSED[:\s]*(\d{2}-\d{2}-\d{4})").unwrap());
pub static PDF_DATE_REPORTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)REPORTED AND CERTIFIED[:\s]*(\d{2}-\d{2}-\d{4})").unwrap());
pub static PDF_ACCOUNT_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)TYPE[:\s]*([^\n]+)").unwrap());
pub static PDF_SANCTIONED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SANCTIONED[:\s]*₹?\s*([\d,]+)").unwrap());
pub static PDF_CURRENT_BALANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CURRENT BALANCE[:\s]*₹?\s*([\d,]+)").unwrap());
pub static PDF_OVERDUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)OVERDUE[:\s]*₹?\s*([\d,]+)").unwrap());

/// Score rules for page-text layouts where the score sits next to scoring
/// factors rather than a labelled field. Tried in order; a hit must land in
/// the plausible 300-900 band to be accepted.
pub static PDF_SCORE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?is)(\d{3})\s*1\.\s*PRESENCE\s+OF\s+DELINQUENCY.*?CREDITVISION").unwrap(),
        Regex::new(r"(?is)SCORE\s+NAME\s+SCORE.*?(\d{3})").unwrap(),
        Regex::new(r"(?is)SCORING FACTORS\s*\n\s*(\d{3})").unwrap(),
        Regex::new(r"(?is)CREDITVISION.*?(\d{3})\s*\d").unwrap(),
    ]
});

/// First non-empty capture group, left to right, trimmed. `None` when the
/// rule does not match or every group is empty after trimming.
pub fn first_match(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().trim().to_string())
        .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_prefers_leftmost_group() {
        let got = first_match(&SCORE_RE, "CREDITVISION SCORE: 742");
        assert_eq!(got.as_deref(), Some("742"));
    }

    #[test]
    fn first_match_falls_through_empty_groups() {
        // Second SCORE_RE alternative captures into the second group.
        let got = first_match(&SCORE_RE, "SCORE: 699");
        assert_eq!(got.as_deref(), Some("699"));
    }

    #[test]
    fn first_match_none_when_unmatched() {
        assert!(first_match(&CKYC_RE, "no kyc here").is_none());
    }

    #[test]
    fn name_stops_at_date_label() {
        let got = first_match(&NAME_RE, "CONSUMER NAME: RAVI KUMAR DATE: 24-12-2025");
        assert_eq!(got.as_deref(), Some("RAVI KUMAR"));
    }

    #[test]
    fn pan_matches_both_label_variants() {
        assert_eq!(
            first_match(&PAN_RE, "PAN: ABCDE1234F").as_deref(),
            Some("ABCDE1234F")
        );
        assert_eq!(
            first_match(&PAN_RE, "INCOME TAX ID NUMBER (PAN) ABCDE1234F").as_deref(),
            Some("ABCDE1234F")
        );
    }

    #[test]
    fn dpd_vocabulary_is_exact() {
        let tokens: Vec<&str> = DPD_TOKEN_RE
            .find_iter("000 XXX STD 015 932")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(tokens, vec!["000", "XXX", "STD", "015", "932"]);
        // 4-digit runs are years, not tokens.
        assert!(DPD_TOKEN_RE.find_iter("2023 0000").next().is_none());
        // Arbitrary words never qualify.
        assert!(DPD_TOKEN_RE.find_iter("OVERDUE ACTIVE").next().is_none());
    }

    #[test]
    fn report_date_covers_three_layouts() {
        assert_eq!(
            first_match(&REPORT_DATE_RE, "DATE: 24-12-2025").as_deref(),
            Some("24-12-2025")
        );
        assert_eq!(
            first_match(&REPORT_DATE_RE, "REPORT DATE & TIME : 24/12/2025").as_deref(),
            Some("24/12/2025")
        );
        assert_eq!(
            first_match(&REPORT_DATE_RE, "generated 24/12/2025, 11:59").as_deref(),
            Some("24/12/2025, 11:59")
        );
    }

    #[test]
    fn mobile_requires_indian_prefix() {
        assert!(MOBILE_RE.is_match("9876543210"));
        assert!(!MOBILE_RE.is_match("1234567890"));
    }
}
