//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set, TransactionTrait,
};

use crate::domain::errors::unique_violation;
use crate::domain::{BookRepository, CirculationError, CreateBookInput, UpdateBookInput};
use crate::models::book::{ActiveModel, BookDto, Column, Entity as BookEntity};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn generate_isbn() -> String {
    format!("BK{}", rand::thread_rng().gen_range(100_000..=999_999))
}

fn map_write_error(e: DbErr) -> CirculationError {
    match unique_violation(&e) {
        Some(_) => CirculationError::DuplicateKey("isbn"),
        None => e.into(),
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self) -> Result<Vec<BookDto>, CirculationError> {
        let books = BookEntity::find()
            .order_by_asc(Column::Title)
            .all(&self.db)
            .await?;

        Ok(books.into_iter().map(BookDto::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<BookDto>, CirculationError> {
        let book = BookEntity::find_by_id(id).one(&self.db).await?;
        Ok(book.map(BookDto::from))
    }

    async fn create(&self, input: CreateBookInput) -> Result<BookDto, CirculationError> {
        let total_copies = input.total_copies.unwrap_or(1);
        if total_copies < 0 {
            return Err(CirculationError::Validation(
                "Total copies cannot be negative".to_string(),
            ));
        }
        if input.title.trim().is_empty() {
            return Err(CirculationError::Validation("Title is required".to_string()));
        }

        let isbn = match input.isbn {
            Some(isbn) if !isbn.trim().is_empty() => isbn.trim().to_string(),
            _ => generate_isbn(),
        };

        let new_book = ActiveModel {
            isbn: Set(isbn),
            title: Set(input.title),
            author: Set(input.author),
            publisher: Set(input.publisher),
            category: Set(input.category),
            description: Set(input.description),
            total_copies: Set(total_copies),
            available_copies: Set(total_copies),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let result = new_book.insert(&self.db).await.map_err(map_write_error)?;
        tracing::info!("Added book {} ({})", result.id, result.isbn);

        Ok(result.into())
    }

    async fn update(&self, id: i32, input: UpdateBookInput) -> Result<BookDto, CirculationError> {
        let txn = self.db.begin().await?;

        let existing = BookEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(CirculationError::NotFound("Book"))?;

        let mut active: ActiveModel = existing.clone().into();

        if let Some(total) = input.total_copies {
            // Copies on loan stay on loan; only the shelf count moves
            let available = total - existing.copies_on_loan();
            if total < 0 || available < 0 {
                return Err(CirculationError::Validation(format!(
                    "Total copies cannot be less than the {} copies on loan",
                    existing.copies_on_loan()
                )));
            }
            active.total_copies = Set(total);
            active.available_copies = Set(available);
        }
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(author) = input.author {
            active.author = Set(author);
        }
        if let Some(publisher) = input.publisher {
            active.publisher = Set(publisher);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }

        if !active.is_changed() {
            return Ok(existing.into());
        }

        let result = active.update(&txn).await.map_err(map_write_error)?;
        txn.commit().await?;

        Ok(result.into())
    }

    async fn delete(&self, id: i32) -> Result<(), CirculationError> {
        let result = BookEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(CirculationError::NotFound("Book"));
        }

        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}
