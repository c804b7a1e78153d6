use crate::models::{book, student};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

/// Insert a small demo catalogue and two students linked to identities 1 and 2.
/// Rows that already exist are left untouched.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now();

    // 1. Books
    let books = [
        ("BK100001", "The Hobbit", "J.R.R. Tolkien", "Allen & Unwin", "Fantasy", 3),
        ("BK100002", "Foundation", "Isaac Asimov", "Gnome Press", "Science Fiction", 2),
        ("BK100003", "Dune", "Frank Herbert", "Chilton Books", "Science Fiction", 1),
        ("BK100004", "The Pragmatic Programmer", "Andrew Hunt", "Addison-Wesley", "Computing", 2),
    ];

    for (isbn, title, author, publisher, category, copies) in books {
        let model = book::ActiveModel {
            isbn: Set(isbn.to_owned()),
            title: Set(title.to_owned()),
            author: Set(author.to_owned()),
            publisher: Set(publisher.to_owned()),
            category: Set(category.to_owned()),
            description: Set(None),
            total_copies: Set(copies),
            available_copies: Set(copies),
            created_at: Set(now),
            ..Default::default()
        };

        book::Entity::insert(model)
            .on_conflict(
                OnConflict::column(book::Column::Isbn)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    // 2. Students
    let students = [
        (1, "S2024001", "Ada Student", "ada@example.edu"),
        (2, "S2024002", "Brian Student", "brian@example.edu"),
    ];

    for (user_id, student_id, name, email) in students {
        let model = student::ActiveModel {
            user_id: Set(Some(user_id)),
            student_id: Set(student_id.to_owned()),
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            phone: Set(String::new()),
            created_at: Set(now),
            ..Default::default()
        };

        student::Entity::insert(model)
            .on_conflict(
                OnConflict::column(student::Column::StudentId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    Ok(())
}
