//! HTTP handler functions for the election map API.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use election_map_auth::AuthError;
use election_map_editorial::EditorialError;
use election_map_editorial::models::{Identity, Role};
use election_map_region::document::to_feature_collection;
use election_map_server_models::{
    ApiArticle, ApiHealth, ApiSessionUser, ApiUser, ArticleListParams, ArticleRequest,
    CredentialsRequest, LoginResponse, TransitionRequest,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/regions`
///
/// Returns every region as one GeoJSON `FeatureCollection`.
pub async fn regions(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(to_feature_collection(&state.regions))
}

/// `POST /api/auth/register`
///
/// Self-registration always creates a writer account. Editors and admins
/// are provisioned with the CLI.
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> HttpResponse {
    match state
        .identity
        .register(&body.username, &body.password, Role::Writer)
        .await
    {
        Ok(user) => HttpResponse::Created().json(ApiUser::from(user)),
        Err(e) => auth_error_response(&e, "Failed to register"),
    }
}

/// `POST /api/auth/login`
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> HttpResponse {
    match state.identity.login(&body.username, &body.password).await {
        Ok(session) => HttpResponse::Ok().json(LoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            user: ApiSessionUser {
                id: session.identity.user_id,
                username: session.identity.username,
                role: session.identity.role,
            },
        }),
        Err(e) => auth_error_response(&e, "Failed to log in"),
    }
}

/// `GET /api/articles`
///
/// Lists articles oldest first, optionally filtered by `?status=`.
pub async fn list_articles(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<ArticleListParams>,
) -> HttpResponse {
    let caller = match authenticate(&req, &state).await {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state.articles.list(&caller, params.status).await {
        Ok(rows) => {
            let articles: Vec<ApiArticle> = rows.into_iter().map(ApiArticle::from).collect();
            HttpResponse::Ok().json(articles)
        }
        Err(e) => editorial_error_response(&e, "Failed to list articles"),
    }
}

/// `POST /api/articles`
pub async fn create_article(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ArticleRequest>,
) -> HttpResponse {
    let caller = match authenticate(&req, &state).await {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state
        .articles
        .create(&caller, &body.title, &body.body)
        .await
    {
        Ok(article) => HttpResponse::Created().json(ApiArticle::from(article)),
        Err(e) => editorial_error_response(&e, "Failed to create article"),
    }
}

/// `PUT /api/articles/{id}`
pub async fn update_article(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ArticleRequest>,
) -> HttpResponse {
    let caller = match authenticate(&req, &state).await {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state
        .articles
        .edit(&caller, &path, &body.title, &body.body)
        .await
    {
        Ok(article) => HttpResponse::Ok().json(ApiArticle::from(article)),
        Err(e) => editorial_error_response(&e, "Failed to update article"),
    }
}

/// `POST /api/articles/{id}/transition`
pub async fn transition_article(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<TransitionRequest>,
) -> HttpResponse {
    let caller = match authenticate(&req, &state).await {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state
        .articles
        .transition(&caller, &path, body.status)
        .await
    {
        Ok(article) => HttpResponse::Ok().json(ApiArticle::from(article)),
        Err(e) => editorial_error_response(&e, "Failed to change article status"),
    }
}

/// Resolves the `Authorization: Bearer <token>` header to a caller.
async fn authenticate(req: &HttpRequest, state: &AppState) -> Result<Identity, HttpResponse> {
    let Some(token) = bearer_token(req) else {
        return Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Missing bearer token"
        })));
    };

    state
        .identity
        .authenticate(token)
        .await
        .map_err(|e| auth_error_response(&e, "Failed to authenticate"))
}

/// Extracts the token from an `Authorization: Bearer` header.
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn editorial_error_response(e: &EditorialError, context: &str) -> HttpResponse {
    match e {
        EditorialError::Validation { message } => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
        }
        EditorialError::Forbidden { .. } => {
            HttpResponse::Forbidden().json(serde_json::json!({ "error": e.to_string() }))
        }
        EditorialError::NotFound { .. } => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": e.to_string() }))
        }
        EditorialError::IllegalTransition { current, requested } => {
            HttpResponse::Conflict().json(serde_json::json!({
                "error": e.to_string(),
                "current": current,
                "requested": requested,
            }))
        }
        EditorialError::Store(_) => {
            log::error!("{context}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": context }))
        }
    }
}

fn auth_error_response(e: &AuthError, context: &str) -> HttpResponse {
    match e {
        AuthError::InvalidCredentials | AuthError::InvalidToken => {
            HttpResponse::Unauthorized().json(serde_json::json!({ "error": e.to_string() }))
        }
        AuthError::UsernameTaken { .. } => {
            HttpResponse::Conflict().json(serde_json::json!({ "error": e.to_string() }))
        }
        AuthError::Validation { message } => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
        }
        AuthError::Hash(_) | AuthError::Store(_) => {
            log::error!("{context}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": context }))
        }
    }
}
