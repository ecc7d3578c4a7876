use anyhow::Result;
use shared::{Business, NewBusiness, NewReview, Review};
use sqlx::{migrate::MigrateDatabase, sqlite::SqliteRow, Row, Sqlite, SqlitePool};
use std::sync::Arc;

/// DbConnection wraps the SQLite pool and owns every SQL statement the
/// service runs. No business rules live here.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Connect to the database at `url`, creating it and its schema when
    /// they do not exist yet.
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Bootstrap DDL. The FK clause documents intent; the cascade itself is
    /// performed explicitly in [`DbConnection::delete_business`].
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS business (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                street_address TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                zip_code TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS review (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                business_id INTEGER NOT NULL REFERENCES business(id) ON DELETE CASCADE,
                stars INTEGER NOT NULL,
                review_text TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Insert a business and return its generated id.
    pub async fn insert_business(&self, new: &NewBusiness) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO business (owner_id, name, street_address, city, state, zip_code)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.owner_id)
        .bind(&new.name)
        .bind(&new.street_address)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.zip_code)
        .execute(&*self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_business(&self, id: i64) -> Result<Option<Business>> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, street_address, city, state, zip_code FROM business WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| row_to_business(&r)))
    }

    /// One page of businesses. Ordered by id so pagination stays stable
    /// across pages.
    pub async fn list_businesses(&self, limit: i64, offset: i64) -> Result<Vec<Business>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, name, street_address, city, state, zip_code
            FROM business
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.iter().map(row_to_business).collect())
    }

    pub async fn count_businesses(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM business")
            .fetch_one(&*self.pool)
            .await?;

        let total: i64 = row.get("total");
        Ok(total)
    }

    /// Full replace of every mutable field. The id never changes.
    pub async fn update_business(&self, id: i64, fields: &NewBusiness) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE business
            SET owner_id = ?, name = ?, street_address = ?, city = ?, state = ?, zip_code = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.owner_id)
        .bind(&fields.name)
        .bind(&fields.street_address)
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(&fields.zip_code)
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    /// Delete a business and everything that references it. Reviews go
    /// first, then the business row, as two explicit statements.
    pub async fn delete_business(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM review WHERE business_id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;

        sqlx::query("DELETE FROM business WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;

        Ok(())
    }

    /// All businesses for one owner, unpaginated.
    pub async fn businesses_for_owner(&self, owner_id: i64) -> Result<Vec<Business>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, name, street_address, city, state, zip_code
            FROM business
            WHERE owner_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.iter().map(row_to_business).collect())
    }

    /// Insert a review and return its generated id.
    pub async fn insert_review(&self, new: &NewReview) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO review (user_id, business_id, stars, review_text)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.business_id)
        .bind(new.stars)
        .bind(&new.review_text)
        .execute(&*self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_review(&self, id: i64) -> Result<Option<Review>> {
        let row = sqlx::query(
            "SELECT id, user_id, business_id, stars, review_text FROM review WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| row_to_review(&r)))
    }

    /// Lookup used to enforce one review per (user, business) pair before
    /// insert.
    pub async fn find_review_by_user_and_business(
        &self,
        user_id: i64,
        business_id: i64,
    ) -> Result<Option<Review>> {
        let row = sqlx::query(
            "SELECT id, user_id, business_id, stars, review_text FROM review WHERE user_id = ? AND business_id = ?",
        )
        .bind(user_id)
        .bind(business_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| row_to_review(&r)))
    }

    /// Partial update: a None field keeps the stored value.
    pub async fn update_review(
        &self,
        id: i64,
        stars: Option<i64>,
        review_text: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE review
            SET stars = COALESCE(?, stars), review_text = COALESCE(?, review_text)
            WHERE id = ?
            "#,
        )
        .bind(stars)
        .bind(review_text)
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_review(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM review WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;

        Ok(())
    }

    /// All reviews written by one user, unpaginated.
    pub async fn reviews_for_user(&self, user_id: i64) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, business_id, stars, review_text
            FROM review
            WHERE user_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.iter().map(row_to_review).collect())
    }
}

fn row_to_business(row: &SqliteRow) -> Business {
    Business {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        street_address: row.get("street_address"),
        city: row.get("city"),
        state: row.get("state"),
        zip_code: row.get("zip_code"),
    }
}

fn row_to_review(row: &SqliteRow) -> Review {
    Review {
        id: row.get("id"),
        user_id: row.get("user_id"),
        business_id: row.get("business_id"),
        stars: row.get("stars"),
        review_text: row.get("review_text"),
    }
}
