//! Bearer-token authentication
//!
//! Extracts the authenticated user (and its access group) from the
//! Authorization header. Handlers opt in by taking a [`CurrentUser`]
//! argument; group checks stay explicit at the handler boundary.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::AppState;
use cinescope_common::auth::extract_bearer_token;
use cinescope_common::db::models::{User, UserGroupName};
use cinescope_common::db::Repository;
use cinescope_common::errors::AppError;

/// The authenticated caller, loaded fresh from the database per request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub group: UserGroupName,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Missing Authorization header".to_string(),
            })?;

        let token = extract_bearer_token(header).ok_or_else(|| AppError::Unauthorized {
            message: "Invalid token".to_string(),
        })?;

        let claims = state.jwt.decode_token(token)?;
        let user_id = claims.user_id.ok_or_else(|| AppError::Unauthorized {
            message: "Invalid token".to_string(),
        })?;

        let repo = Repository::new(state.db.clone());
        let (user, group) = repo
            .find_user_with_group(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        Ok(CurrentUser {
            user,
            group: group.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinescope_common::auth::JwtManager;
    use cinescope_common::config::{AppConfig, AuthConfig};
    use cinescope_common::db::models::UserGroup;
    use cinescope_common::db::DbPool;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn state_with(db: MockDatabase) -> AppState {
        let auth = AuthConfig {
            jwt_secret: Some("extractor-test-secret".to_string()),
            ..Default::default()
        };
        AppState {
            config: Arc::new(AppConfig::default()),
            db: DbPool {
                primary: db.into_connection(),
                replica: None,
            },
            jwt: Arc::new(JwtManager::from_config(&auth).unwrap()),
        }
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/theater/notifications/");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = state_with(MockDatabase::new(DatabaseBackend::Postgres));
        let mut parts = parts_with_auth(None);

        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let state = state_with(MockDatabase::new(DatabaseBackend::Postgres));
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwdw=="));

        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn valid_token_loads_user_and_group() {
        let user = User {
            id: 7,
            email: "viewer@example.com".to_string(),
            hashed_password: "argon2id$stub".to_string(),
            group_id: 1,
        };
        let group = UserGroup {
            id: 1,
            name: UserGroupName::User,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(user.clone(), group)]]);
        let state = state_with(db);

        let token = state.jwt.generate_token(7).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));

        let current = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(current.user.email, user.email);
        assert_eq!(current.group, UserGroupName::User);
    }

    #[tokio::test]
    async fn unknown_user_id_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<(User, UserGroup)>::new()]);
        let state = state_with(db);

        let token = state.jwt.generate_token(999).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));

        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }
}
