use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[serde(rename_all = "snake_case")]
pub enum FineStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// At most one fine per borrow record (unique index).
    #[sea_orm(unique)]
    pub borrow_record_id: i32,
    pub amount: f64,
    pub status: FineStatus,
    /// Set iff `status` is `Paid`.
    pub paid_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::borrow_record::Entity",
        from = "Column::BorrowRecordId",
        to = "super::borrow_record::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    BorrowRecord,
}

impl Related<super::borrow_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BorrowRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FineDto {
    pub id: i32,
    pub borrow_record_id: i32,
    pub amount: f64,
    pub status: FineStatus,
    pub paid_date: Option<DateTimeUtc>,
}

impl From<Model> for FineDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            borrow_record_id: model.borrow_record_id,
            amount: model.amount,
            status: model.status,
            paid_date: model.paid_date,
        }
    }
}
