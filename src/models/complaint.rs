use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "complaints")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Phone of the account that filed the complaint (ownership key).
    pub user_phone: String,
    pub name: String,
    /// Contact phone given on the form (may differ from user_phone).
    pub phone: String,
    pub district: String,
    pub block: String,
    pub gp: String,
    pub village: String,
    pub landmark: String,
    pub pincode: String,
    pub department: String,
    #[sea_orm(column_type = "Text")]
    pub complaint: String,
    pub proof: Option<String>,
    pub voice_proof: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub status: String,
    pub admin_proof: Option<String>,
    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Complaint lifecycle status. Stored as text; parsing tolerates the
/// case/spacing variants seen in the source data ("inprogress",
/// "In Progress"). Anything else is treated as unknown and skipped by
/// status-keyed aggregations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in progress" | "inprogress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }
}

impl Model {
    /// Treats a missing status as Pending, matching the column default.
    pub fn is_pending(&self) -> bool {
        self.status.trim().is_empty()
            || ComplaintStatus::parse(&self.status) == Some(ComplaintStatus::Pending)
    }
}
