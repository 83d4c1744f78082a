//! `PostgreSQL` repository implementations for users and access tokens.

use super::{
    models::{NewAccessTokenRow, NewUserRow, UserRow},
    schema::{access_tokens, users},
};
use crate::identity::{
    domain::{
        AccessTokenRecord, EmailAddress, PasswordHash, PersistedUserData, Role, TokenDigest,
        User, UserId, UserName,
    },
    ports::{AccessTokenRepository, UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by identity adapters.
pub type IdentityPgPool = Pool<ConnectionManager<PgConnection>>;

async fn run_blocking<F, T>(shared: &IdentityPgPool, f: F) -> UserRepositoryResult<T>
where
    F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = shared.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(UserRepositoryError::persistence)?;
        f(&mut connection)
    })
    .await
    .map_err(UserRepositoryError::persistence)?
}

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: IdentityPgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: IdentityPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let user_id = user.id();
        let email = user.email().clone();
        let new_row = to_new_row(user);

        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(users::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_email_unique_violation(info.as_ref()) =>
                    {
                        UserRepositoryError::DuplicateEmail(email.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        UserRepositoryError::DuplicateUser(user_id)
                    }
                    _ => UserRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        run_blocking(&self.pool, move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>> {
        let lookup_email = email.as_str().to_owned();
        run_blocking(&self.pool, move |connection| {
            let row = users::table
                .filter(users::email.eq(lookup_email))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_many(&self, ids: &[UserId]) -> UserRepositoryResult<Vec<User>> {
        let lookup_ids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        run_blocking(&self.pool, move |connection| {
            users::table
                .filter(users::id.eq_any(lookup_ids))
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(UserRepositoryError::persistence)?
                .into_iter()
                .map(row_to_user)
                .collect()
        })
        .await
    }
}

/// `PostgreSQL`-backed access token repository.
#[derive(Debug, Clone)]
pub struct PostgresAccessTokenRepository {
    pool: IdentityPgPool,
}

impl PostgresAccessTokenRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: IdentityPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessTokenRepository for PostgresAccessTokenRepository {
    async fn store(&self, record: &AccessTokenRecord) -> UserRepositoryResult<()> {
        let new_row = NewAccessTokenRow {
            digest: record.digest().as_str().to_owned(),
            user_id: record.user_id().into_inner(),
            created_at: record.created_at(),
        };
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(access_tokens::table)
                .values(&new_row)
                .execute(connection)
                .map_err(UserRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_user_id(&self, digest: &TokenDigest) -> UserRepositoryResult<Option<UserId>> {
        let lookup_digest = digest.as_str().to_owned();
        run_blocking(&self.pool, move |connection| {
            let user_id = access_tokens::table
                .filter(access_tokens::digest.eq(lookup_digest))
                .select(access_tokens::user_id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            Ok(user_id.map(UserId::from_uuid))
        })
        .await
    }

    async fn revoke(&self, digest: &TokenDigest) -> UserRepositoryResult<()> {
        let revoked_digest = digest.as_str().to_owned();
        run_blocking(&self.pool, move |connection| {
            diesel::delete(access_tokens::table.filter(access_tokens::digest.eq(revoked_digest)))
                .execute(connection)
                .map_err(UserRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }
}

fn to_new_row(user: &User) -> NewUserRow {
    NewUserRow {
        id: user.id().into_inner(),
        name: user.name().as_str().to_owned(),
        email: user.email().as_str().to_owned(),
        password_hash: user.password_hash().as_str().to_owned(),
        role: Some(user.role().as_str().to_owned()),
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    }
}

fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let UserRow {
        id,
        name,
        email,
        password_hash,
        role,
        created_at,
        updated_at,
    } = row;

    let data = PersistedUserData {
        id: UserId::from_uuid(id),
        name: UserName::new(name).map_err(UserRepositoryError::persistence)?,
        email: EmailAddress::new(email).map_err(UserRepositoryError::persistence)?,
        role: Role::from_persisted(role.as_deref()).map_err(UserRepositoryError::persistence)?,
        password_hash: PasswordHash::from_persisted(password_hash)
            .map_err(UserRepositoryError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(User::from_persisted(data))
}

fn is_email_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_users_email_unique")
}
