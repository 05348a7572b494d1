//! Repository operations over the `user` table. Each function issues one
//! parameterized statement (create may add an id read-back on the same
//! connection); no transactions, no retries.

use sqlx::FromRow;
use tracing::{debug, info};

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::user::User;

/// Inserts a user. The identifier is assigned by the database and read back
/// on the same connection when the driver does not report it.
pub async fn create_user(
    db: &Database,
    name: &str,
    password: &str,
) -> Result<Option<String>, RepositoryError> {
    let mut conn = db.pool().acquire().await?;

    let result = sqlx::query("INSERT INTO user (Name, Password) VALUES (?, ?)")
        .bind(name)
        .bind(password)
        .execute(&mut *conn)
        .await?;

    let user_id = match result.last_insert_id() {
        Some(id) => Some(id.to_string()),
        None => sqlx::query_scalar::<_, Option<String>>(db.backend().last_insert_id_query())
            .fetch_one(&mut *conn)
            .await?,
    };
    info!("Inserted user {name} (id: {user_id:?})");
    Ok(user_id)
}

/// Row shape as selected: `isActive` comes back hex-encoded so every backend
/// hands it over as text, whatever the column's binary type.
#[derive(FromRow)]
struct UserRow {
    #[sqlx(rename = "UserId")]
    user_id: String,
    #[sqlx(rename = "Name")]
    name: String,
    #[sqlx(rename = "Password")]
    password: String,
    #[sqlx(rename = "isActive")]
    is_active_hex: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let is_active = row
            .is_active_hex
            .map(|digits| decode_hex_bytes(&digits))
            .transpose()
            .map_err(|e| RepositoryError::Internal(sqlx::Error::Decode(Box::new(e))))?;

        Ok(User {
            user_id: row.user_id,
            name: row.name,
            password: row.password,
            is_active,
        })
    }
}

/// MySQL renders `BIT` values as a number, so `HEX` can yield an odd digit count.
fn decode_hex_bytes(digits: &str) -> Result<Vec<u8>, hex::FromHexError> {
    if digits.len() % 2 == 0 {
        hex::decode(digits)
    } else {
        hex::decode(format!("0{digits}"))
    }
}

/// Fetches a user by identifier. Zero rows yields `RepositoryError::NotFound`.
pub async fn get_user(db: &Database, user_id: &str) -> Result<User, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT CAST(UserId AS CHAR) AS UserId, Name, Password,
               CASE WHEN isActive IS NULL THEN NULL ELSE HEX(isActive) END AS isActive
        FROM user
        WHERE UserId = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(db.pool())
    .await?;

    User::try_from(row)
}

/// Sets name and password on the matching row. Succeeds even when nothing
/// matched; returns rows affected.
pub async fn update_user(
    db: &Database,
    user_id: &str,
    name: &str,
    password: &str,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query("UPDATE user SET Name = ?, Password = ? WHERE UserId = ?")
        .bind(name)
        .bind(password)
        .bind(user_id)
        .execute(db.pool())
        .await?;

    debug!("Updated {} row(s) for user {user_id}", result.rows_affected());
    Ok(result.rows_affected())
}

/// Deletes the row with the given identifier. Succeeds on zero matches.
pub async fn delete_user(db: &Database, user_id: &str) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM user WHERE UserId = ?")
        .bind(user_id)
        .execute(db.pool())
        .await?;

    debug!("Deleted {} row(s) for user {user_id}", result.rows_affected());
    Ok(result.rows_affected())
}

/// Bulk delete: removes every row whose name matches, which can be more than
/// one. Succeeds on zero matches.
pub async fn delete_users_by_name(db: &Database, name: &str) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM user WHERE Name = ?")
        .bind(name)
        .execute(db.pool())
        .await?;

    debug!("Deleted {} row(s) named {name}", result.rows_affected());
    Ok(result.rows_affected())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::{open_database, SqliteConnector};

    /// Opens a fresh in-memory database with the `user` table in place.
    pub(crate) async fn test_db() -> Database {
        let connector = SqliteConnector {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let db = open_database(&connector).await.unwrap();
        sqlx::query(
            r#"
            CREATE TABLE user (
                UserId INTEGER PRIMARY KEY AUTOINCREMENT,
                Name TEXT NOT NULL,
                Password TEXT NOT NULL,
                isActive BLOB
            )
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let db = test_db().await;
        let id = create_user(&db, "alice", "p1").await.unwrap().unwrap();
        assert_eq!(id, "1");

        let user = get_user(&db, &id).await.unwrap();
        assert_eq!(user.user_id, "1");
        assert_eq!(user.name, "alice");
        assert_eq!(user.password, "p1");
        assert_eq!(user.is_active, None);
    }

    #[tokio::test]
    async fn test_create_reports_each_assigned_id() {
        let db = test_db().await;
        let first = create_user(&db, "alice", "p1").await.unwrap();
        let second = create_user(&db, "bob", "p2").await.unwrap();
        assert_eq!(first.as_deref(), Some("1"));
        assert_eq!(second.as_deref(), Some("2"));

        let user = get_user(&db, "2").await.unwrap();
        assert_eq!(user.name, "bob");
    }

    #[test]
    fn test_decode_hex_bytes_pads_odd_digit_counts() {
        assert_eq!(decode_hex_bytes("1").unwrap(), vec![0x01]);
        assert_eq!(decode_hex_bytes("0F01").unwrap(), vec![0x0f, 0x01]);
        assert_eq!(decode_hex_bytes("").unwrap(), Vec::<u8>::new());
        assert!(decode_hex_bytes("zz").is_err());
    }

    #[tokio::test]
    async fn test_read_returns_multi_byte_activity_flag() {
        let db = test_db().await;
        sqlx::query("INSERT INTO user (Name, Password, isActive) VALUES (?, ?, ?)")
            .bind("frank")
            .bind("pw")
            .bind(vec![0x00u8, 0xff, 0x10])
            .execute(db.pool())
            .await
            .unwrap();

        let user = get_user(&db, "1").await.unwrap();
        assert_eq!(user.is_active, Some(vec![0x00, 0xff, 0x10]));
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let db = test_db().await;
        let err = get_user(&db, "999").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_read_returns_opaque_activity_bytes() {
        let db = test_db().await;
        sqlx::query("INSERT INTO user (Name, Password, isActive) VALUES (?, ?, ?)")
            .bind("erin")
            .bind("pw")
            .bind(vec![1u8])
            .execute(db.pool())
            .await
            .unwrap();

        let user = get_user(&db, "1").await.unwrap();
        assert_eq!(user.is_active, Some(vec![1u8]));
    }

    #[tokio::test]
    async fn test_update_then_read() {
        let db = test_db().await;
        let id = create_user(&db, "alice", "p1").await.unwrap().unwrap();

        let affected = update_user(&db, &id, "alice2", "p2").await.unwrap();
        assert_eq!(affected, 1);

        let user = get_user(&db, &id).await.unwrap();
        assert_eq!(user.name, "alice2");
        assert_eq!(user.password, "p2");
    }

    #[tokio::test]
    async fn test_update_missing_is_noop() {
        let db = test_db().await;
        let id = create_user(&db, "alice", "p1").await.unwrap().unwrap();

        assert_eq!(update_user(&db, "42", "ghost", "x").await.unwrap(), 0);

        let user = get_user(&db, &id).await.unwrap();
        assert_eq!(user.name, "alice");
    }

    #[tokio::test]
    async fn test_delete_by_name_removes_all_matches() {
        let db = test_db().await;
        let first = create_user(&db, "dup", "a").await.unwrap().unwrap();
        let second = create_user(&db, "dup", "b").await.unwrap().unwrap();
        let other = create_user(&db, "keep", "c").await.unwrap().unwrap();

        assert_eq!(delete_users_by_name(&db, "dup").await.unwrap(), 2);

        assert!(matches!(
            get_user(&db, &first).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            get_user(&db, &second).await,
            Err(RepositoryError::NotFound)
        ));
        assert_eq!(get_user(&db, &other).await.unwrap().name, "keep");
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let db = test_db().await;
        create_user(&db, "alice", "p1").await.unwrap();

        assert_eq!(delete_users_by_name(&db, "nobody").await.unwrap(), 0);
        assert_eq!(delete_user(&db, "77").await.unwrap(), 0);
        assert!(get_user(&db, "1").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_by_id_leaves_namesakes() {
        let db = test_db().await;
        let first = create_user(&db, "twin", "a").await.unwrap().unwrap();
        let second = create_user(&db, "twin", "b").await.unwrap().unwrap();

        assert_eq!(delete_user(&db, &first).await.unwrap(), 1);

        assert!(matches!(
            get_user(&db, &first).await,
            Err(RepositoryError::NotFound)
        ));
        assert_eq!(get_user(&db, &second).await.unwrap().password, "b");
    }

    #[tokio::test]
    async fn test_missing_table_is_internal() {
        let connector = SqliteConnector {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let db = open_database(&connector).await.unwrap();
        let err = create_user(&db, "alice", "p1").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Internal(_)));
    }
}
