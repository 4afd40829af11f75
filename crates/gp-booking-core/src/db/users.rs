//! User database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Role, User};

impl Database {
    /// Insert a new user (patient or GP).
    pub fn insert_user(&self, user: &User) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO users (id, first_name, last_name, role, rating)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                user.id,
                user.first_name,
                user.last_name,
                role_to_string(&user.role),
                user.rating,
            ],
        )?;
        Ok(())
    }

    /// Get a user by ID.
    pub fn get_user(&self, id: &str) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, first_name, last_name, role, rating FROM users WHERE id = ?",
                [id],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        role: row.get(3)?,
                        rating: row.get(4)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List all GPs, ordered by rating (best first).
    pub fn list_gps(&self) -> DbResult<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, role, rating FROM users \
             WHERE role = 'gp' ORDER BY rating DESC, last_name",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                role: row.get(3)?,
                rating: row.get(4)?,
            })
        })?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?.try_into()?);
        }
        Ok(users)
    }
}

/// Intermediate row struct for database mapping.
struct UserRow {
    id: String,
    first_name: String,
    last_name: String,
    role: String,
    rating: f64,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            role: string_to_role(&row.role)?,
            rating: row.rating,
        })
    }
}

fn role_to_string(role: &Role) -> &'static str {
    match role {
        Role::Gp => "gp",
        Role::Patient => "patient",
    }
}

fn string_to_role(s: &str) -> Result<Role, DbError> {
    match s {
        "gp" => Ok(Role::Gp),
        "patient" => Ok(Role::Patient),
        _ => Err(DbError::Constraint(format!("Unknown role: {}", s))),
    }
}
