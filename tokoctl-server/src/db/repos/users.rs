//! User repository
//!
//! Inserts (single, batch, upsert by email), filtered queries, full and
//! partial updates, and soft delete. Address fields live in `addr_`-prefixed
//! columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use tokoctl_core::models::{Address, NewUser, Timestamps, User, UserPatch};

use super::DbError;

const USER_COLUMNS: &str = "id, name, email, password, addr_street, addr_city, addr_state, \
                            addr_zip_code, phone_number, created_at, updated_at, deleted_at";

const INSERT_COLUMNS: &str = "INSERT INTO users \
    (name, email, password, addr_street, addr_city, addr_state, addr_zip_code, phone_number) ";

/// User record from database
#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
    addr_street: String,
    addr_city: String,
    addr_state: String,
    addr_zip_code: String,
    phone_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            address: Address {
                street: row.addr_street,
                city: row.addr_city,
                state: row.addr_state,
                zip_code: row.addr_zip_code,
            },
            phone_number: row.phone_number,
            timestamps: Timestamps {
                created_at: row.created_at,
                updated_at: row.updated_at,
                deleted_at: row.deleted_at,
            },
        }
    }
}

/// Name and email only, for list views that must not load the rest
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
}

/// One side of an OR condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserField {
    Name(String),
    Email(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Name,
    #[default]
    CreatedAt,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserSort {
    pub field: SortField,
    pub descending: bool,
}

impl UserSort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// Filters for [`UserRepo::find`]
///
/// `name` and `email` must all match; `any_of` matches when at least one of
/// its entries does; `name_not` excludes a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub any_of: Vec<UserField>,
    pub name_not: Option<String>,
    pub sort: Option<UserSort>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl UserQuery {
    /// `SELECT <columns> FROM users` with every filter bound as a parameter.
    fn build_select(&self, columns: &str) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM users", columns));
        qb.push(" WHERE deleted_at IS NULL");

        if let Some(name) = &self.name {
            qb.push(" AND name = ").push_bind(name.clone());
        }
        if let Some(email) = &self.email {
            qb.push(" AND email = ").push_bind(email.clone());
        }
        if !self.any_of.is_empty() {
            qb.push(" AND (");
            {
                let mut any = qb.separated(" OR ");
                for field in &self.any_of {
                    match field {
                        UserField::Name(v) => any.push("name = ").push_bind_unseparated(v.clone()),
                        UserField::Email(v) => any.push("email = ").push_bind_unseparated(v.clone()),
                    };
                }
            }
            qb.push(")");
        }
        if let Some(name) = &self.name_not {
            qb.push(" AND name <> ").push_bind(name.clone());
        }
        if let Some(sort) = self.sort {
            qb.push(" ORDER BY ")
                .push(sort.field.column())
                .push(if sort.descending { " DESC" } else { " ASC" });
        }
        if let Some(limit) = self.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = self.offset {
            qb.push(" OFFSET ").push_bind(offset);
        }
        qb
    }
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert one user. A taken email is a [`DbError::Conflict`].
    pub async fn create(&self, user: &NewUser) -> Result<User, DbError> {
        let mut created = self.create_batch(std::slice::from_ref(user)).await?;
        created
            .pop()
            .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))
    }

    /// Insert many users in a single statement; all or none are stored.
    pub async fn create_batch(&self, users: &[NewUser]) -> Result<Vec<User>, DbError> {
        if users.is_empty() {
            return Ok(Vec::new());
        }
        for user in users {
            user.validate()?;
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(INSERT_COLUMNS);
        qb.push_values(users, |mut row, user| {
            row.push_bind(user.name.clone())
                .push_bind(user.email.clone())
                .push_bind(user.password.clone())
                .push_bind(user.address.street.clone())
                .push_bind(user.address.city.clone())
                .push_bind(user.address.state.clone())
                .push_bind(user.address.zip_code.clone())
                .push_bind(user.phone_number.clone());
        });
        qb.push(" RETURNING ").push(USER_COLUMNS);

        let rows: Vec<UserRow> = qb
            .build_query_as()
            .fetch_all(self.pool)
            .await
            .map_err(|e| DbError::from_write(e, "user with this email"))?;

        tracing::debug!(count = rows.len(), "users created");
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Insert, or when the email is taken update name and password (and
    /// revive the row if it was soft-deleted).
    pub async fn upsert_by_email(&self, user: &NewUser) -> Result<User, DbError> {
        user.validate()?;

        let sql = format!(
            r#"
            {}
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                password = EXCLUDED.password,
                updated_at = NOW(),
                deleted_at = NULL
            RETURNING {}
            "#,
            INSERT_COLUMNS, USER_COLUMNS
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.address.street)
            .bind(&user.address.city)
            .bind(&user.address.state)
            .bind(&user.address.zip_code)
            .bind(&user.phone_number)
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    /// Get a single user by id.
    pub async fn get(&self, id: i64) -> Result<User, DbError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))?;
        Ok(row.into())
    }

    /// Users matching `query`.
    pub async fn find(&self, query: &UserQuery) -> Result<Vec<User>, DbError> {
        let rows: Vec<UserRow> = query
            .build_select(USER_COLUMNS)
            .build_query_as()
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Name/email projection of the users matching `query`.
    pub async fn find_summaries(&self, query: &UserQuery) -> Result<Vec<UserSummary>, DbError> {
        let rows = query
            .build_select("name, email")
            .build_query_as()
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Lowest id.
    pub async fn first(&self) -> Result<User, DbError> {
        self.find_one(Some(UserSort::asc(SortField::Id))).await
    }

    /// Highest id.
    pub async fn last(&self) -> Result<User, DbError> {
        self.find_one(Some(UserSort::desc(SortField::Id))).await
    }

    /// Any one user, no ordering.
    pub async fn take(&self) -> Result<User, DbError> {
        self.find_one(None).await
    }

    async fn find_one(&self, sort: Option<UserSort>) -> Result<User, DbError> {
        let query = UserQuery {
            sort,
            limit: Some(1),
            ..Default::default()
        };
        self.find(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", "any"))
    }

    /// Write every column of `user` back to its row.
    pub async fn save(&self, user: &User) -> Result<User, DbError> {
        let check = UserPatch {
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            password: Some(user.password.clone()),
            address: None,
            phone_number: user.phone_number.clone(),
        };
        check.validate()?;

        let sql = format!(
            r#"
            UPDATE users SET
                name = $2, email = $3, password = $4,
                addr_street = $5, addr_city = $6, addr_state = $7, addr_zip_code = $8,
                phone_number = $9, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.address.street)
            .bind(&user.address.city)
            .bind(&user.address.state)
            .bind(&user.address.zip_code)
            .bind(&user.phone_number)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DbError::from_write(e, "user with this email"))?
            .ok_or_else(|| DbError::not_found("user", user.id))?;
        Ok(row.into())
    }

    /// Rename the user with `email`. Returns the number of rows changed.
    pub async fn update_name(&self, email: &str, name: &str) -> Result<u64, DbError> {
        UserPatch {
            name: Some(name.to_owned()),
            ..Default::default()
        }
        .validate()?;

        let result = sqlx::query(
            "UPDATE users SET name = $2, updated_at = NOW() WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .bind(name)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Write only the `Some` fields of `patch`.
    pub async fn update_fields(&self, id: i64, patch: &UserPatch) -> Result<User, DbError> {
        patch.validate()?;
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut qb = patch_statement(id, patch);
        let row: UserRow = qb
            .build_query_as()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DbError::from_write(e, "user with this email"))?
            .ok_or_else(|| DbError::not_found("user", id))?;
        Ok(row.into())
    }

    /// Mark a user deleted. Reads skip it afterwards.
    pub async fn soft_delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }
        tracing::info!(user_id = id, "user soft-deleted");
        Ok(())
    }
}

/// `UPDATE users SET ... RETURNING` for the non-empty fields of `patch`.
fn patch_statement(id: i64, patch: &UserPatch) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE users SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(name) = &patch.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(email) = &patch.email {
            set.push("email = ").push_bind_unseparated(email.clone());
        }
        if let Some(password) = &patch.password {
            set.push("password = ").push_bind_unseparated(password.clone());
        }
        if let Some(address) = &patch.address {
            set.push("addr_street = ").push_bind_unseparated(address.street.clone());
            set.push("addr_city = ").push_bind_unseparated(address.city.clone());
            set.push("addr_state = ").push_bind_unseparated(address.state.clone());
            set.push("addr_zip_code = ").push_bind_unseparated(address.zip_code.clone());
        }
        if let Some(phone) = &patch.phone_number {
            set.push("phone_number = ").push_bind_unseparated(phone.clone());
        }
        set.push("updated_at = NOW()");
    }
    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND deleted_at IS NULL RETURNING ")
        .push(USER_COLUMNS);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_only_hides_deleted() {
        let qb = UserQuery::default().build_select("id");
        assert_eq!(qb.sql(), "SELECT id FROM users WHERE deleted_at IS NULL");
    }

    #[test]
    fn full_query_binds_every_value() {
        let query = UserQuery {
            name: Some("Budi Santoso".into()),
            email: None,
            any_of: vec![
                UserField::Name("Budi Santoso".into()),
                UserField::Email("budi.santoso@example.com".into()),
            ],
            name_not: Some("Siti Rahmawati".into()),
            sort: Some(UserSort::desc(SortField::CreatedAt)),
            limit: Some(5),
            offset: Some(0),
        };
        let qb = query.build_select("name, email");
        assert_eq!(
            qb.sql(),
            "SELECT name, email FROM users WHERE deleted_at IS NULL AND name = $1 \
             AND (name = $2 OR email = $3) AND name <> $4 \
             ORDER BY created_at DESC LIMIT $5 OFFSET $6"
        );
    }

    #[test]
    fn patch_sets_only_present_fields() {
        let patch = UserPatch {
            name: Some("Budi Santoso Baru".into()),
            email: Some("budi.baru@gmail.com".into()),
            ..Default::default()
        };
        let qb = patch_statement(1, &patch);
        let sql = qb.sql();
        assert!(sql.starts_with(
            "UPDATE users SET name = $1, email = $2, updated_at = NOW() WHERE id = $3"
        ));
        assert!(!sql.contains("password ="));
    }

    #[test]
    fn patch_address_sets_all_address_columns() {
        let patch = UserPatch {
            address: Some(Address::default()),
            ..Default::default()
        };
        let qb = patch_statement(1, &patch);
        for column in ["addr_street", "addr_city", "addr_state", "addr_zip_code"] {
            assert!(qb.sql().contains(&format!("{} = ", column)));
        }
    }

    #[test]
    fn sort_field_parses_snake_case() {
        let field: SortField = serde_json::from_str("\"created_at\"").unwrap();
        assert_eq!(field, SortField::CreatedAt);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn upsert_updates_existing_email() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();
        let repo = UserRepo::new(&pool);

        let email = format!("upsert-{}@example.com", chrono::Utc::now().timestamp_nanos_opt().unwrap());
        let first = repo
            .upsert_by_email(&NewUser::new("Siti Nurhaliza", &email, "password"))
            .await
            .unwrap();
        let second = repo
            .upsert_by_email(&NewUser::new("Siti Nurhaliza Baru", &email, "rahasia"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Siti Nurhaliza Baru");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_email_is_conflict() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();
        let repo = UserRepo::new(&pool);

        let email = format!("dup-{}@example.com", chrono::Utc::now().timestamp_nanos_opt().unwrap());
        repo.create(&NewUser::new("Agus Salim", &email, "password"))
            .await
            .unwrap();
        let err = repo
            .create(&NewUser::new("Agus Salim", &email, "password"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }
}
