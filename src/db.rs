use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    run_migrations(&db).await?;

    Ok(db)
}

async fn exec(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_owned()))
        .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    exec(db, "PRAGMA foreign_keys = ON").await?;

    exec(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS buildings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            address TEXT NOT NULL,
            total_floors INTEGER NOT NULL,
            description TEXT,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            deleted_at TEXT,
            is_deleted BOOLEAN NOT NULL DEFAULT 0
        )
        "#,
    )
    .await?;

    exec(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS floors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            floor_number INTEGER NOT NULL,
            building_id INTEGER NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            deleted_at TEXT,
            is_deleted BOOLEAN NOT NULL DEFAULT 0,
            FOREIGN KEY(building_id) REFERENCES buildings(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    exec(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            room_number TEXT NOT NULL,
            floor_id INTEGER NOT NULL,
            capacity INTEGER NOT NULL,
            rent_price REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'Available',
            room_type TEXT NOT NULL DEFAULT 'Single',
            has_air_conditioner BOOLEAN NOT NULL DEFAULT 0,
            has_water_heater BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            deleted_at TEXT,
            is_deleted BOOLEAN NOT NULL DEFAULT 0,
            FOREIGN KEY(floor_id) REFERENCES floors(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    exec(
        db,
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_rooms_floor_number ON rooms(floor_id, room_number)",
    )
    .await?;

    exec(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_code TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone_number TEXT,
            date_of_birth TEXT,
            id_card_number TEXT,
            address TEXT,
            guardian TEXT,
            guardian_phone TEXT,
            profile_image TEXT,
            status TEXT NOT NULL DEFAULT 'Active',
            created_at TEXT NOT NULL,
            updated_at TEXT,
            deleted_at TEXT,
            is_deleted BOOLEAN NOT NULL DEFAULT 0
        )
        "#,
    )
    .await?;

    exec(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS contracts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contract_number TEXT NOT NULL UNIQUE,
            room_id INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            deposit_amount REAL NOT NULL DEFAULT 0,
            monthly_rent REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'Active',
            created_at TEXT NOT NULL,
            updated_at TEXT,
            deleted_at TEXT,
            is_deleted BOOLEAN NOT NULL DEFAULT 0,
            FOREIGN KEY(room_id) REFERENCES rooms(id) ON DELETE RESTRICT
        )
        "#,
    )
    .await?;

    exec(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS contract_students (
            contract_id INTEGER NOT NULL,
            student_id INTEGER NOT NULL,
            joined_at TEXT NOT NULL,
            PRIMARY KEY (contract_id, student_id),
            FOREIGN KEY(contract_id) REFERENCES contracts(id) ON DELETE CASCADE,
            FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE RESTRICT
        )
        "#,
    )
    .await?;

    exec(
        db,
        "CREATE INDEX IF NOT EXISTS idx_contract_students_student ON contract_students(student_id)",
    )
    .await?;

    exec(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS invoices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            invoice_number TEXT NOT NULL UNIQUE,
            contract_id INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            rent_amount REAL NOT NULL,
            service_amount REAL NOT NULL DEFAULT 0,
            total_amount REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'Unpaid',
            due_date TEXT NOT NULL,
            payment_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            deleted_at TEXT,
            is_deleted BOOLEAN NOT NULL DEFAULT 0,
            FOREIGN KEY(contract_id) REFERENCES contracts(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    // One live invoice per billing period; deleted ones do not count.
    exec(
        db,
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_invoices_period
        ON invoices(contract_id, month, year) WHERE is_deleted = 0
        "#,
    )
    .await?;

    exec(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            full_name TEXT NOT NULL,
            phone_number TEXT,
            profile_image TEXT,
            role TEXT NOT NULL DEFAULT 'Student',
            is_active BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            deleted_at TEXT,
            is_deleted BOOLEAN NOT NULL DEFAULT 0
        )
        "#,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = init_db("sqlite::memory:").await.unwrap();
        run_migrations(&db).await.unwrap();
    }
}
