use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "candidates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub job_posting_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub stage: Stage,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job_postings::Entity",
        from = "Column::JobPostingId",
        to = "super::job_postings::Column::Id",
        on_delete = "Cascade"
    )]
    JobPosting,
}

impl Related<super::job_postings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobPosting.def()
    }
}

#[derive(
    Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    #[sea_orm(string_value = "APPLIED")]
    Applied,
    #[sea_orm(string_value = "SCREENING")]
    Screening,
    #[sea_orm(string_value = "INTERVIEW")]
    Interview,
    #[sea_orm(string_value = "OFFER")]
    Offer,
    #[sea_orm(string_value = "HIRED")]
    Hired,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Hired | Stage::Rejected)
    }
}

impl ActiveModelBehavior for ActiveModel {}
