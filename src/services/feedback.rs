use crate::{
    error::{AppError, AppResult},
    models::{feedback, Feedback, FeedbackModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Sort orders offered by the community page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackSort {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
}

impl FeedbackSort {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "oldest" => Self::Oldest,
            "highest" => Self::Highest,
            "lowest" => Self::Lowest,
            _ => Self::Newest,
        }
    }
}

pub struct FeedbackService {
    db: DatabaseConnection,
}

impl FeedbackService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Anonymous feedback create. Rows are never mutated or deleted.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        category: &str,
        rating: i32,
        message: &str,
    ) -> AppResult<FeedbackModel> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let model = feedback::ActiveModel {
            name: sea_orm::ActiveValue::Set(name.to_string()),
            email: sea_orm::ActiveValue::Set(email.to_string()),
            category: sea_orm::ActiveValue::Set(category.to_string()),
            rating: sea_orm::ActiveValue::Set(rating),
            message: sea_orm::ActiveValue::Set(message.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        Ok(saved)
    }

    /// Community listing with optional category and minimum-rating
    /// filters.
    pub async fn list(
        &self,
        category: Option<&str>,
        min_rating: Option<i32>,
        sort: FeedbackSort,
    ) -> AppResult<Vec<FeedbackModel>> {
        let mut query = Feedback::find();

        if let Some(category) = category.filter(|c| !c.is_empty() && *c != "all") {
            query = query.filter(feedback::Column::Category.eq(category));
        }
        if let Some(min) = min_rating {
            query = query.filter(feedback::Column::Rating.gte(min));
        }

        query = match sort {
            FeedbackSort::Newest => query.order_by_desc(feedback::Column::Id),
            FeedbackSort::Oldest => query.order_by_asc(feedback::Column::Id),
            FeedbackSort::Highest => query.order_by_desc(feedback::Column::Rating),
            FeedbackSort::Lowest => query.order_by_asc(feedback::Column::Rating),
        };

        let rows = query.all(&self.db).await?;
        Ok(rows)
    }
}
