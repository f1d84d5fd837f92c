use std::collections::BTreeMap;

use serde::Serialize;

/// Per-account delinquency timeline: year label ("2023", or "UNKNOWN" when no
/// year can be attributed) mapped to the chronological DPD token sequence for
/// that year. BTreeMap keeps years in ascending order, with "UNKNOWN" sorting
/// after all 4-digit years.
pub type DpdHistory = BTreeMap<String, Vec<String>>;

/// Unified output schema, identical for both source formats.
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedReport {
    pub basic_info: BasicInfo,
    pub enquiries: EnquirySection,
    pub accounts: AccountSection,
    pub overdue_summary: OverdueSummary,
    pub metadata: Metadata,
}

/// Borrower identity snapshot, extracted once per document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BasicInfo {
    pub name: Option<String>,
    pub pan_card: Option<String>,
    pub ckyc: Option<String>,
    /// Raw report date/time substring as it appeared in the document.
    pub report_date: Option<String>,
    pub score: Option<i64>,
    pub mobile_numbers: Vec<String>,
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnquirySection {
    pub latest_month_enquiries: Vec<Enquiry>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Enquiry {
    pub date: String,
    /// Canonical YYYY-MM-DD form of `date`.
    pub parsed_date: String,
    pub member: Option<String>,
    pub purpose: Option<String>,
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountSection {
    pub accounts_list: Vec<Account>,
    pub total_accounts_extracted: usize,
    pub final_dpd_average: Option<f64>,
    pub final_default_month_average: Option<f64>,
}

/// One credit account. Every field is independently optional except the
/// amount strings, which default to "0" so downstream totals never see null.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub account_index: usize,
    pub member_name: Option<String>,
    pub account_type: Option<String>,
    pub status: Option<String>,
    pub date_opened: Option<String>,
    pub date_closed: Option<String>,
    pub date_reported: Option<String>,
    pub sanctioned_amount: String,
    pub current_balance: String,
    /// Recoverable from the page-text format only; null on the markup path.
    pub overdue_amount: Option<String>,
    pub dpd_history: DpdHistory,
    pub deterioration_reasoning: String,
    pub default_month_number: Option<f64>,
    pub dpd_summary: DpdSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct DpdSummary {
    pub yearly_averages: Vec<YearlyAverage>,
    pub account_dpd_average: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearlyAverage {
    pub year: String,
    pub average_dpd: f64,
}

/// Document-level totals. Null means "not present in the document",
/// distinct from "present and zero".
#[derive(Debug, Clone, Default, Serialize)]
pub struct OverdueSummary {
    pub total_overdue_accounts: Option<i64>,
    pub total_overdue_amount: Option<i64>,
    pub total_current_amount: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub format_type: String,
    pub extraction_timestamp: String,
}
