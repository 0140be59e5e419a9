//! Role gating with type-safe authorization extractors
//!
//! Usage in handlers:
//! ```ignore
//! use crate::middleware::{Authorized, roles::*};
//!
//! async fn delete_computer(
//!     Authorized(user, _): Authorized<Curators>,
//!     Path(id): Path<String>,
//! ) -> Result<Json<Value>> {
//!     // Role already verified
//! }
//! ```

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::security::Role;

/// A named set of roles allowed through an [`Authorized`] extractor
pub trait RoleSet: Send + Sync + 'static {
    const NAME: &'static str;
    const ALLOWED: &'static [Role];

    fn allows(role: Role) -> bool {
        Self::ALLOWED.contains(&role)
    }
}

/// Creates zero-sized marker types that implement `RoleSet`
macro_rules! define_roles {
    ($($(#[$meta:meta])* $name:ident => [$($role:ident),+ $(,)?]),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl RoleSet for $name {
                const NAME: &'static str = stringify!($name);
                const ALLOWED: &'static [Role] = &[$(Role::$role),+];
            }
        )*
    };
}

define_roles! {
    /// Register computers, change part status, manage labs
    Editors => [Admin, Technician, Itsd],
    /// Delete computers and labs
    Curators => [Admin, Itsd],
    /// Delete reports
    ReportManagers => [Admin, Technician],
    /// Read reports with computer and lab context
    ReportReaders => [Admin, Dean, Itsd],
    /// Submit resolutions
    Technicians => [Technician, Admin],
    /// Send summary emails
    Mailers => [Admin, Technician, Itsd],
    /// Administer user accounts (ITSD limited to technicians)
    AccountManagers => [Admin, Itsd],
    /// Add and edit lab accessories
    Stockkeepers => [Admin, Technician],
    /// Admin-only actions
    Admins => [Admin],
}

/// Extractor that requires the caller's role to be in `R`
///
/// Returns 401 without an authenticated caller and 403 when the role is
/// not allowed.
#[derive(Debug, Clone)]
pub struct Authorized<R: RoleSet>(pub CurrentUser, pub PhantomData<R>);

impl<R: RoleSet> Authorized<R> {
    pub fn user(&self) -> &CurrentUser {
        &self.0
    }
}

impl<S, R> FromRequestParts<S> for Authorized<R>
where
    S: Send + Sync,
    R: RoleSet,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        if !R::allows(user.role) {
            return Err(AppError::Forbidden(format!(
                "Role '{}' is not allowed here ({} required)",
                user.role,
                R::NAME
            )));
        }

        Ok(Authorized(user.clone(), PhantomData))
    }
}

/// Extractor for any authenticated caller
#[derive(Debug, Clone)]
pub struct Authenticated(pub CurrentUser);

impl Authenticated {
    pub fn user(&self) -> &CurrentUser {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        Ok(Authenticated(user.clone()))
    }
}
