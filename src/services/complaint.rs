use crate::{
    error::{AppError, AppResult},
    models::{complaint, Complaint, ComplaintModel, ComplaintStatus},
};
use sea_orm::{
    sea_query::{Expr, Func, SimpleExpr},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

/// Fields a citizen supplies when filing a complaint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewComplaint {
    pub name: String,
    pub phone: String,
    pub district: String,
    pub block: String,
    pub gp: String,
    pub village: String,
    pub landmark: String,
    pub pincode: String,
    pub department: String,
    pub complaint: String,
    pub proof: Option<String>,
    pub voice_proof: Option<String>,
}

pub struct ComplaintService {
    db: DatabaseConnection,
}

impl ComplaintService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a new complaint for `user_phone` with status Pending and a
    /// fresh updated_at. Used by both the manual form and the chatbot.
    pub async fn create(&self, user_phone: &str, input: NewComplaint) -> AppResult<ComplaintModel> {
        let now = chrono::Utc::now().naive_utc();
        let model = complaint::ActiveModel {
            user_phone: sea_orm::ActiveValue::Set(user_phone.to_string()),
            name: sea_orm::ActiveValue::Set(input.name),
            phone: sea_orm::ActiveValue::Set(input.phone),
            district: sea_orm::ActiveValue::Set(input.district),
            block: sea_orm::ActiveValue::Set(input.block),
            gp: sea_orm::ActiveValue::Set(input.gp),
            village: sea_orm::ActiveValue::Set(input.village),
            landmark: sea_orm::ActiveValue::Set(input.landmark),
            pincode: sea_orm::ActiveValue::Set(input.pincode),
            department: sea_orm::ActiveValue::Set(input.department),
            complaint: sea_orm::ActiveValue::Set(input.complaint),
            proof: sea_orm::ActiveValue::Set(input.proof),
            voice_proof: sea_orm::ActiveValue::Set(input.voice_proof),
            status: sea_orm::ActiveValue::Set(ComplaintStatus::Pending.as_str().to_string()),
            admin_proof: sea_orm::ActiveValue::Set(None),
            updated_at: sea_orm::ActiveValue::Set(Some(now)),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        Ok(saved)
    }

    pub async fn get(&self, id: i32) -> AppResult<ComplaintModel> {
        Complaint::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// All complaints filed by one account, newest first.
    pub async fn list_for_user(&self, user_phone: &str) -> AppResult<Vec<ComplaintModel>> {
        let rows = Complaint::find()
            .filter(complaint::Column::UserPhone.eq(user_phone))
            .order_by_desc(complaint::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Admin listing with the search-box filter: case-insensitive
    /// substring match over owner phone, contact phone, department,
    /// pincode, district, village and complaint text.
    pub async fn search(
        &self,
        q: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ComplaintModel>, u64)> {
        let mut query = Complaint::find();

        if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", q.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(contains_ci(complaint::Column::UserPhone, &pattern))
                    .add(contains_ci(complaint::Column::Phone, &pattern))
                    .add(contains_ci(complaint::Column::Department, &pattern))
                    .add(contains_ci(complaint::Column::Pincode, &pattern))
                    .add(contains_ci(complaint::Column::District, &pattern))
                    .add(contains_ci(complaint::Column::Village, &pattern))
                    .add(contains_ci(complaint::Column::Complaint, &pattern)),
            );
        }

        let paginator = query
            .order_by_desc(complaint::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    pub async fn list_all(&self) -> AppResult<Vec<ComplaintModel>> {
        let rows = Complaint::find()
            .order_by_desc(complaint::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Citizen edit: replaces every editable field. Only the owner may
    /// edit, and only while the complaint is Pending.
    pub async fn update_details(
        &self,
        id: i32,
        requester_phone: &str,
        input: NewComplaint,
    ) -> AppResult<ComplaintModel> {
        let existing = self.get(id).await?;

        if existing.user_phone != requester_phone {
            return Err(AppError::Forbidden);
        }
        if !existing.is_pending() {
            return Err(AppError::InvalidState(
                "Only pending complaints can be edited".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: complaint::ActiveModel = existing.into();
        active.name = sea_orm::ActiveValue::Set(input.name);
        active.phone = sea_orm::ActiveValue::Set(input.phone);
        active.district = sea_orm::ActiveValue::Set(input.district);
        active.block = sea_orm::ActiveValue::Set(input.block);
        active.gp = sea_orm::ActiveValue::Set(input.gp);
        active.village = sea_orm::ActiveValue::Set(input.village);
        active.landmark = sea_orm::ActiveValue::Set(input.landmark);
        active.pincode = sea_orm::ActiveValue::Set(input.pincode);
        active.department = sea_orm::ActiveValue::Set(input.department);
        active.complaint = sea_orm::ActiveValue::Set(input.complaint);
        active.updated_at = sea_orm::ActiveValue::Set(Some(now));

        self.apply_update(active).await
    }

    /// Admin status change. Marking a complaint Resolved requires a proof
    /// reference in the same call; the check runs before any mutation.
    pub async fn update_status(
        &self,
        id: i32,
        new_status: &str,
        admin_proof: Option<String>,
    ) -> AppResult<ComplaintModel> {
        let status = ComplaintStatus::parse(new_status).ok_or_else(|| {
            AppError::Validation(format!("Unknown status '{}'", new_status.trim()))
        })?;

        if status == ComplaintStatus::Resolved && admin_proof.is_none() {
            return Err(AppError::InvalidState(
                "Please attach proof when marking resolved".to_string(),
            ));
        }

        let existing = self.get(id).await?;
        let now = chrono::Utc::now().naive_utc();

        let mut active: complaint::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set(status.as_str().to_string());
        if let Some(proof) = admin_proof {
            active.admin_proof = sea_orm::ActiveValue::Set(Some(proof));
        }
        active.updated_at = sea_orm::ActiveValue::Set(Some(now));

        self.apply_update(active).await
    }

    /// Citizen delete: owner-only, Pending-only, hard delete.
    pub async fn delete(&self, id: i32, requester_phone: &str) -> AppResult<()> {
        let existing = self.get(id).await?;

        if existing.user_phone != requester_phone {
            return Err(AppError::Forbidden);
        }
        if !existing.is_pending() {
            return Err(AppError::InvalidState(
                "Only pending complaints can be deleted".to_string(),
            ));
        }

        existing.delete(&self.db).await?;
        Ok(())
    }

    /// Post-hoc citizen proof attach. Owner-only, allowed in any status.
    /// Does not refresh updated_at; only edits and status changes do.
    pub async fn attach_proof(
        &self,
        id: i32,
        requester_phone: &str,
        proof: String,
    ) -> AppResult<ComplaintModel> {
        let existing = self.get(id).await?;

        if existing.user_phone != requester_phone {
            return Err(AppError::Forbidden);
        }

        let mut active: complaint::ActiveModel = existing.into();
        active.proof = sea_orm::ActiveValue::Set(Some(proof));

        self.apply_update(active).await
    }

    /// A delete racing an update makes the row vanish between the read
    /// and the write; the late writer gets NotFound instead of silently
    /// resurrecting the row.
    async fn apply_update(&self, active: complaint::ActiveModel) -> AppResult<ComplaintModel> {
        match active.update(&self.db).await {
            Ok(model) => Ok(model),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

fn contains_ci(col: complaint::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}
