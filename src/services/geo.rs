//! Maps district names as stored in complaints onto the official Odisha
//! boundary names used by the map layer, and builds the per-district
//! heatmap rows the frontend joins against its boundary data.

use crate::models::ComplaintModel;
use crate::services::dashboard::{district_by_status, normalize_district};
use serde::Serialize;
use utoipa::ToSchema;

/// Stored spelling (lowercased) to boundary-dataset spelling. A handful
/// of districts are spelled differently in the boundary data than in
/// common usage (e.g. Keonjhar is Kendujhar there).
pub const DISTRICT_MAP: &[(&str, &str)] = &[
    ("angul", "Angul"),
    ("balangir", "Balangir"),
    ("balasore", "Baleshwar"),
    ("bargarh", "Bargarh"),
    ("bhadrak", "Bhadrak"),
    ("boudh", "Bauda"),
    ("cuttack", "Cuttack"),
    ("deogarh", "Debagarh"),
    ("dhenkanal", "Dhenkanal"),
    ("gajapati", "Gajapati"),
    ("ganjam", "Ganjam"),
    ("jagatsinghpur", "Jagatsinghpur"),
    ("jajpur", "Jajapur"),
    ("jharsuguda", "Jharsuguda"),
    ("kalahandi", "Kalahandi"),
    ("kandhamal", "Kandhamal"),
    ("kendrapara", "Kendrapara"),
    ("keonjhar", "Kendujhar"),
    ("khordha", "Khordha"),
    ("koraput", "Koraput"),
    ("malkangiri", "Malkangiri"),
    ("mayurbhanj", "Mayurbhanj"),
    ("nabarangpur", "Nabarangapur"),
    ("nayagarh", "Nayagarh"),
    ("nuapada", "Nuapada"),
    ("puri", "Puri"),
    ("rayagada", "Rayagada"),
    ("sambalpur", "Sambalpur"),
    ("subarnapur", "Sonapur"),
    ("sundargarh", "Sundargarh"),
];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DistrictHeatmap {
    /// District name as the boundary dataset spells it.
    pub district: String,
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub total: u64,
}

/// One row per known district, in map order, zero-filled where no
/// complaints exist. Districts outside the map are dropped rather than
/// guessed at.
pub fn district_heatmap(rows: &[ComplaintModel]) -> Vec<DistrictHeatmap> {
    let by_district = district_by_status(rows);
    DISTRICT_MAP
        .iter()
        .map(|(db_key, boundary_name)| {
            let counts = by_district.get(*db_key).copied().unwrap_or_default();
            DistrictHeatmap {
                district: boundary_name.to_string(),
                pending: counts.pending,
                in_progress: counts.in_progress,
                resolved: counts.resolved,
                total: counts.total(),
            }
        })
        .collect()
}

/// Boundary spelling for a stored district name, if it is one we know.
pub fn boundary_name(district: &str) -> Option<&'static str> {
    let key = normalize_district(district);
    DISTRICT_MAP
        .iter()
        .find(|(db_key, _)| *db_key == key)
        .map(|(_, name)| *name)
}
