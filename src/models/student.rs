use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Identity issued by the external auth provider, if the student can log in.
    #[sea_orm(unique)]
    pub user_id: Option<i32>,
    #[sea_orm(unique)]
    pub student_id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::borrow_record::Entity")]
    BorrowRecords,
}

impl Related<super::borrow_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BorrowRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StudentDto {
    pub id: i32,
    pub user_id: Option<i32>,
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<Model> for StudentDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            student_id: model.student_id,
            name: model.name,
            email: model.email,
            phone: model.phone,
        }
    }
}
