//! OAuth code exchange.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::ExchangeCodeRequest;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ReportsError};
use crate::identity::OAuthUser;

/// `POST /identity/{provider}/exchange` — Exchange an OAuth code for a user.
///
/// # Errors
///
/// Returns [`ReportsError::UnknownProvider`] for an unsupported or
/// unconfigured provider, [`ReportsError::InvalidRequest`] for a blank code
/// and [`ReportsError::IdentityProviderError`] if the provider rejects it.
#[utoipa::path(
    post,
    path = "/api/v1/identity/{provider}/exchange",
    tag = "Identity",
    summary = "Exchange OAuth code",
    description = "Exchanges an authorization code with the named provider and returns the provider-neutral user profile.",
    params(
        ("provider" = String, Path, description = "`github` or `facebook`"),
    ),
    request_body = ExchangeCodeRequest,
    responses(
        (status = 200, description = "Signed-in user", body = OAuthUser),
        (status = 400, description = "Unknown provider or blank code", body = ErrorResponse),
        (status = 502, description = "Provider rejected the code", body = ErrorResponse),
    )
)]
pub async fn exchange_code(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(req): Json<ExchangeCodeRequest>,
) -> Result<impl IntoResponse, ReportsError> {
    let provider = state.identity.resolve(&provider)?;
    if req.code.trim().is_empty() {
        return Err(ReportsError::InvalidRequest(
            "authorization code must not be blank".to_string(),
        ));
    }

    let profile = provider.exchange_code(&req.code).await?;
    let user = profile.into_user();
    tracing::info!(provider = %user.provider, provider_id = %user.provider_id, "oauth user signed in");
    Ok(Json(user))
}

/// Identity routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/identity/{provider}/exchange", post(exchange_code))
}
