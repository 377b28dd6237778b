//! Aggregates the complaint table into the counts behind the admin
//! dashboard. Everything here is computed over the full row set in
//! memory; rendering charts from these numbers is the frontend's job.

use crate::models::{ComplaintModel, ComplaintStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

const TOP_N: usize = 10;
const STALE_PENDING_DAYS: i64 = 5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.in_progress + self.resolved
    }

    fn bump(&mut self, status: ComplaintStatus) {
        match status {
            ComplaintStatus::Pending => self.pending += 1,
            ComplaintStatus::InProgress => self.in_progress += 1,
            ComplaintStatus::Resolved => self.resolved += 1,
        }
    }
}

/// One labelled count, for the top-N lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CountEntry {
    pub label: String,
    pub count: u64,
}

/// A Pending complaint that has sat untouched for too long.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaleComplaint {
    pub id: i32,
    pub district: String,
    pub department: String,
    pub complaint: String,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_department: BTreeMap<String, u64>,
    pub top_pincodes: Vec<CountEntry>,
    pub top_districts: Vec<CountEntry>,
    pub department_status: BTreeMap<String, StatusCounts>,
    pub district_status: BTreeMap<String, StatusCounts>,
    pub over_time: BTreeMap<NaiveDate, u64>,
    pub stale_pending: Vec<StaleComplaint>,
}

pub fn compute_stats(rows: &[ComplaintModel], now: chrono::NaiveDateTime) -> DashboardStats {
    DashboardStats {
        total: rows.len() as u64,
        by_status: count_by_status(rows),
        by_department: count_by_department(rows),
        top_pincodes: top_n(count_by(rows, |c| or_unknown(&c.pincode)), TOP_N),
        top_districts: top_n(count_by(rows, |c| or_unknown(&c.district)), TOP_N),
        department_status: department_by_status(rows),
        district_status: district_by_status(rows),
        over_time: counts_over_time(rows),
        stale_pending: stale_pending(rows, now),
    }
}

/// Counts by raw status value; blank statuses fall back to the column
/// default, Pending.
pub fn count_by_status(rows: &[ComplaintModel]) -> BTreeMap<String, u64> {
    count_by(rows, |c| {
        let trimmed = c.status.trim();
        if trimmed.is_empty() {
            ComplaintStatus::Pending.as_str().to_string()
        } else {
            trimmed.to_string()
        }
    })
}

/// Counts by department; blank departments bucketed under "Unknown".
pub fn count_by_department(rows: &[ComplaintModel]) -> BTreeMap<String, u64> {
    count_by(rows, |c| or_unknown(&c.department))
}

/// Department (blank bucketed under "Unknown") crossed with status.
pub fn department_by_status(rows: &[ComplaintModel]) -> BTreeMap<String, StatusCounts> {
    status_cross(rows, |c| or_unknown(&c.department))
}

/// District (normalized: lowercased, trimmed) crossed with status.
pub fn district_by_status(rows: &[ComplaintModel]) -> BTreeMap<String, StatusCounts> {
    status_cross(rows, |c| normalize_district(&c.district))
}

/// Status breakdown per key; unknown status strings are silently
/// excluded.
fn status_cross<F>(rows: &[ComplaintModel], key: F) -> BTreeMap<String, StatusCounts>
where
    F: Fn(&ComplaintModel) -> String,
{
    let mut out: BTreeMap<String, StatusCounts> = BTreeMap::new();
    for row in rows {
        let Some(status) = ComplaintStatus::parse(&row.status) else {
            continue;
        };
        out.entry(key(row)).or_default().bump(status);
    }
    out
}

/// Complaint counts grouped by the date portion of updated_at; rows
/// without a timestamp are excluded.
pub fn counts_over_time(rows: &[ComplaintModel]) -> BTreeMap<NaiveDate, u64> {
    let mut out = BTreeMap::new();
    for row in rows {
        if let Some(ts) = row.updated_at {
            *out.entry(ts.date()).or_insert(0) += 1;
        }
    }
    out
}

/// Pending complaints whose updated_at is more than five days old.
pub fn stale_pending(rows: &[ComplaintModel], now: chrono::NaiveDateTime) -> Vec<StaleComplaint> {
    let cutoff = now - chrono::Duration::days(STALE_PENDING_DAYS);
    rows.iter()
        .filter(|c| c.is_pending())
        .filter(|c| matches!(c.updated_at, Some(ts) if ts <= cutoff))
        .map(|c| StaleComplaint {
            id: c.id,
            district: c.district.clone(),
            department: c.department.clone(),
            complaint: c.complaint.clone(),
            updated_at: c.updated_at,
        })
        .collect()
}

pub fn normalize_district(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn or_unknown(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "Unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

fn count_by<F>(rows: &[ComplaintModel], key: F) -> BTreeMap<String, u64>
where
    F: Fn(&ComplaintModel) -> String,
{
    let mut out = BTreeMap::new();
    for row in rows {
        *out.entry(key(row)).or_insert(0) += 1;
    }
    out
}

/// Highest counts first; ties broken by label for a stable order.
fn top_n(counts: BTreeMap<String, u64>, n: usize) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(label, count)| CountEntry { label, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComplaintModel;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn row(district: &str, department: &str, status: &str, updated: Option<&str>) -> ComplaintModel {
        ComplaintModel {
            id: 0,
            user_phone: "9000000001".into(),
            name: "Test".into(),
            phone: "9000000001".into(),
            district: district.into(),
            block: "Block".into(),
            gp: "Gp".into(),
            village: "Village".into(),
            landmark: "Landmark".into(),
            pincode: "752001".into(),
            department: department.into(),
            complaint: "text".into(),
            proof: None,
            voice_proof: None,
            status: status.into(),
            admin_proof: None,
            updated_at: updated.map(ts),
        }
    }

    #[test]
    fn department_counts_sum_to_total_with_unknown_bucket() {
        let rows = vec![
            row("Puri", "Water Supply", "Pending", None),
            row("Puri", "Water Supply", "Resolved", None),
            row("Cuttack", "", "Pending", None),
            row("Cuttack", "  ", "In Progress", None),
        ];
        let counts = count_by_department(&rows);
        assert_eq!(counts.get("Water Supply"), Some(&2));
        assert_eq!(counts.get("Unknown"), Some(&2));
        assert_eq!(counts.values().sum::<u64>(), rows.len() as u64);
    }

    #[test]
    fn blank_status_counts_as_pending() {
        let rows = vec![
            row("Puri", "Water Supply", "", None),
            row("Puri", "Water Supply", "Pending", None),
        ];
        let counts = count_by_status(&rows);
        assert_eq!(counts.get("Pending"), Some(&2));
    }

    #[test]
    fn district_status_excludes_unknown_statuses() {
        let rows = vec![
            row(" Puri ", "Water Supply", "Pending", None),
            row("puri", "Water Supply", "inprogress", None),
            row("PURI", "Water Supply", "Resolved", None),
            row("Puri", "Water Supply", "closed", None),
        ];
        let stats = district_by_status(&rows);
        let puri = stats.get("puri").unwrap();
        assert_eq!(puri.pending, 1);
        assert_eq!(puri.in_progress, 1);
        assert_eq!(puri.resolved, 1);
        assert_eq!(puri.total(), 3);
    }

    #[test]
    fn department_status_buckets_blanks_under_unknown() {
        let rows = vec![
            row("Puri", "Water Supply", "Pending", None),
            row("Puri", "Water Supply", "Resolved", None),
            row("Cuttack", "", "In Progress", None),
            row("Cuttack", "  ", "closed", None),
        ];
        let cross = department_by_status(&rows);
        let water = cross.get("Water Supply").unwrap();
        assert_eq!(water.pending, 1);
        assert_eq!(water.resolved, 1);
        let unknown = cross.get("Unknown").unwrap();
        assert_eq!(unknown.in_progress, 1);
        // "closed" is not a recognized status and is dropped
        assert_eq!(unknown.total(), 1);
    }

    #[test]
    fn over_time_skips_missing_timestamps() {
        let rows = vec![
            row("Puri", "Water Supply", "Pending", Some("2025-08-01 10:00:00")),
            row("Puri", "Water Supply", "Pending", Some("2025-08-01 18:00:00")),
            row("Puri", "Water Supply", "Pending", Some("2025-08-02 09:00:00")),
            row("Puri", "Water Supply", "Pending", None),
        ];
        let series = counts_over_time(&rows);
        assert_eq!(series.len(), 2);
        assert_eq!(
            series
                .get(&NaiveDate::from_ymd_opt(2025, 8, 1).unwrap())
                .copied(),
            Some(2)
        );
    }

    #[test]
    fn stale_pending_respects_cutoff_and_status() {
        let now = ts("2025-08-10 00:00:00");
        let rows = vec![
            row("Puri", "Water Supply", "Pending", Some("2025-08-01 00:00:00")),
            row("Puri", "Water Supply", "Pending", Some("2025-08-09 00:00:00")),
            row("Puri", "Water Supply", "Resolved", Some("2025-08-01 00:00:00")),
            row("Puri", "Water Supply", "Pending", None),
        ];
        let alerts = stale_pending(&rows, now);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn top_n_orders_by_count_then_key() {
        let rows = vec![
            row("Puri", "a", "Pending", None),
            row("Puri", "a", "Pending", None),
            row("Cuttack", "a", "Pending", None),
            row("Angul", "a", "Pending", None),
        ];
        let stats = compute_stats(&rows, ts("2025-08-10 00:00:00"));
        assert_eq!(stats.top_districts[0].label, "Puri");
        assert_eq!(stats.top_districts[0].count, 2);
        // tie between Angul and Cuttack broken alphabetically
        assert_eq!(stats.top_districts[1].label, "Angul");
        assert_eq!(stats.total, 4);
    }
}
