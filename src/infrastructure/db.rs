use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_owned(),
    ))
    .await?;

    // Create books table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            isbn TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            publisher TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            description TEXT,
            total_copies INTEGER NOT NULL DEFAULT 1,
            available_copies INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            CHECK (total_copies >= 0),
            CHECK (available_copies >= 0 AND available_copies <= total_copies)
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create students table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER UNIQUE,
            student_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create borrow_records table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS borrow_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL,
            book_id INTEGER NOT NULL,
            borrow_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            borrow_duration_days INTEGER NOT NULL DEFAULT 14,
            return_date TEXT,
            return_requested_date TEXT,
            status TEXT NOT NULL DEFAULT 'borrowed',
            notes TEXT,
            FOREIGN KEY (student_id) REFERENCES students(id) ON DELETE CASCADE,
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
        )
        "#
        .to_owned(),
    ))
    .await?;

    // One unreturned record per (student, book)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_borrow_records_active
        ON borrow_records (student_id, book_id)
        WHERE status != 'returned'
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE INDEX IF NOT EXISTS idx_borrow_records_status_due ON borrow_records (status, due_date)"
            .to_owned(),
    ))
    .await?;

    // Create fines table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS fines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            borrow_record_id INTEGER NOT NULL UNIQUE,
            amount REAL NOT NULL CHECK (amount >= 0),
            status TEXT NOT NULL DEFAULT 'pending',
            paid_date TEXT,
            FOREIGN KEY (borrow_record_id) REFERENCES borrow_records(id) ON DELETE CASCADE
        )
        "#
        .to_owned(),
    ))
    .await?;

    Ok(())
}
