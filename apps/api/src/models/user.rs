use serde::{Deserialize, Serialize};

/// A row of the `user` table. Field names on the wire match the column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "UserId")]
    pub user_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Password")]
    pub password: String,
    /// Opaque activity flag; width and meaning are owned by the table schema.
    #[serde(rename = "isActive")]
    pub is_active: Option<Vec<u8>>,
}

/// Request body for create and update. Identifier and activity flag are not
/// client-settable; unknown keys such as `UserId` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Password", alias = "password")]
    pub password: String,
}
