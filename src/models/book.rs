use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub category: String,
    pub description: Option<String>,
    pub total_copies: i32,
    /// Copies currently on the shelf.
    /// Always within `0..=total_copies`; only borrow and verified returns move it.
    pub available_copies: i32,
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

impl Model {
    /// Number of copies currently out with borrowers.
    pub fn copies_on_loan(&self) -> i32 {
        self.total_copies - self.available_copies
    }
}

// DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BookDto {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub category: String,
    pub description: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl From<Model> for BookDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            isbn: model.isbn,
            title: model.title,
            author: model.author,
            publisher: model.publisher,
            category: model.category,
            description: model.description,
            total_copies: model.total_copies,
            available_copies: model.available_copies,
        }
    }
}
