use sqlx::postgres::PgPool;

const CREATE_TABLES: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vehicles (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL,
        "name" TEXT NOT NULL,
        model_year TEXT NOT NULL,
        reg_number TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS services (
        id SERIAL PRIMARY KEY,
        vehicle_id INTEGER NOT NULL,
        service_type TEXT NOT NULL,
        last_service_date DATE NOT NULL,
        next_due_date DATE NOT NULL
    )
    "#,
];

/// Creates the users, vehicles and services tables when they are missing.
pub async fn ensure_schema(db: &PgPool) -> Result<(), sqlx::Error> {
    for statement in CREATE_TABLES {
        sqlx::query(statement).execute(db).await?;
    }
    Ok(())
}
