//! User account administration
//!
//! Admins manage every account. ITSD staff only see and manage technician
//! accounts, and can only hand out the technician role.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::services::security::Role;

/// Account fields accepted on registration
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub year: Option<String>,
}

/// Partial account update. `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct UserEdit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub year: Option<String>,
}

impl UserEdit {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none() && self.year.is_none()
    }
}

/// How a delete request names its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(String),
    Email(String),
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// ITSD may only act on technician accounts
fn check_manages(acting: Role, target: Role, verb: &str) -> Result<()> {
    if acting == Role::Itsd && target != Role::Technician {
        return Err(AppError::Forbidden(format!(
            "ITSD can only {} technician accounts",
            verb
        )));
    }
    Ok(())
}

fn check_assigns(acting: Role, role: Role) -> Result<()> {
    if acting == Role::Itsd && role != Role::Technician {
        return Err(AppError::Forbidden(
            "ITSD can only assign technician role".to_string(),
        ));
    }
    Ok(())
}

async fn email_in_use<C: ConnectionTrait>(
    db: &C,
    email: &str,
    except_id: Option<&str>,
) -> Result<bool> {
    let mut query = User::find().filter(user::Column::Email.eq(email));
    if let Some(id) = except_id {
        query = query.filter(user::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

async fn find_user<C: ConnectionTrait>(db: &C, lookup: &UserLookup) -> Result<user::Model> {
    let query = match lookup {
        UserLookup::Id(id) => User::find_by_id(id.as_str()),
        UserLookup::Email(email) => User::find().filter(user::Column::Email.eq(email.as_str())),
    };
    query
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    acting: Role,
    new: NewUser,
) -> Result<user::Model> {
    check_assigns(acting, new.role)?;

    let name = required(&new.name, "Name")?;
    let email = required(&new.email, "Email")?;
    if email_in_use(db, &email, None).await? {
        return Err(AppError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let user = user::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name),
        email: Set(email),
        role: Set(new.role),
        year: Set(new.year.filter(|y| !y.trim().is_empty())),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        "User registered: {}",
        user.email
    );
    Ok(user)
}

pub async fn get_user<C: ConnectionTrait>(db: &C, id: &str) -> Result<user::Model> {
    find_user(db, &UserLookup::Id(id.to_string())).await
}

/// Accounts visible to `viewer`, ordered by name
pub async fn list_users<C: ConnectionTrait>(db: &C, viewer: Role) -> Result<Vec<user::Model>> {
    let mut query = User::find();
    if viewer == Role::Itsd {
        query = query.filter(user::Column::Role.eq(Role::Technician));
    }
    Ok(query
        .order_by_asc(user::Column::Name)
        .order_by_asc(user::Column::Email)
        .all(db)
        .await?)
}

pub async fn update_user<C: ConnectionTrait>(
    db: &C,
    acting: Role,
    id: &str,
    edit: UserEdit,
) -> Result<user::Model> {
    let current = get_user(db, id).await?;
    check_manages(acting, current.role, "update")?;
    if let Some(role) = edit.role {
        check_assigns(acting, role)?;
    }
    if edit.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }

    let mut active: user::ActiveModel = current.into();
    if let Some(name) = &edit.name {
        active.name = Set(required(name, "Name")?);
    }
    if let Some(email) = &edit.email {
        let email = required(email, "Email")?;
        if email_in_use(db, &email, Some(id)).await? {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
        active.email = Set(email);
    }
    if let Some(role) = edit.role {
        active.role = Set(role);
    }
    if let Some(year) = edit.year {
        active.year = Set(Some(year));
    }

    let user = active.update(db).await?;
    tracing::info!(user_id = %user.id, "User updated");
    Ok(user)
}

pub async fn delete_user<C: ConnectionTrait>(
    db: &C,
    acting: Role,
    lookup: UserLookup,
) -> Result<user::Model> {
    let user = find_user(db, &lookup).await?;
    check_manages(acting, user.role, "delete")?;

    User::delete_by_id(user.id.as_str()).exec(db).await?;
    tracing::info!(user_id = %user.id, "User deleted: {}", user.email);
    Ok(user)
}
