use axum::extract::{Path, State};
use notifications_axum::response::EncapsulatedJson;
use notifications_core::model::{Audience, Response, VcapRequest};
use snafu::OptionExt;

use crate::{
    web::{
        controller::{
            error::{self, Result},
            params::NotifyParams,
        },
        extractor::{CallingClient, RequestMetadata, ValidatedJson},
        middleware::{
            AuthClient, CRITICAL_NOTIFICATIONS_WRITE_SCOPE, EMAILS_WRITE_SCOPE,
            NOTIFICATIONS_WRITE_SCOPE,
        },
    },
    ServiceState,
};

pub(super) fn ensure_scope(client: &AuthClient, scope: &'static str) -> Result<()> {
    if client.has_scope(scope) {
        Ok(())
    } else {
        error::MissingScopeSnafu { client_id: client.client_id.clone(), scope }.fail()
    }
}

#[tracing::instrument(
    skip_all,
    fields(
        audience = %audience,
        client_id = %client.client_id,
        vcap_request_id = %vcap_request.id
    )
)]
async fn notify(
    state: &ServiceState,
    audience: Audience,
    guid: String,
    client: AuthClient,
    vcap_request: VcapRequest,
    params: NotifyParams,
) -> Result<EncapsulatedJson<Vec<Response>>> {
    let required_scope =
        if audience == Audience::Email { EMAILS_WRITE_SCOPE } else { NOTIFICATIONS_WRITE_SCOPE };
    ensure_scope(&client, required_scope)?;

    let dispatch = params
        .into_dispatch(audience, guid, &client, state.registry.as_ref(), vcap_request)
        .await?;
    if dispatch.kind.critical {
        ensure_scope(&client, CRITICAL_NOTIFICATIONS_WRITE_SCOPE)?;
    }

    let strategy = state
        .strategies
        .get(audience)
        .context(error::UnknownAudienceSnafu { audience: audience.as_str() })?;
    let responses = strategy.dispatch(&state.database, dispatch).await?;
    tracing::info!("Queued {} notifications", responses.len());

    Ok(EncapsulatedJson::ok(responses))
}

/// Notify a single user
#[utoipa::path(
    post,
    operation_id = "notify_user",
    path = "/users/{user_id}",
    params(("user_id" = String, Path, description = "UAA user GUID")),
    request_body = NotifyParams,
    responses(
        (status = 200, body = Vec<Response>),
        (status = 403, description = "Missing `notifications.write` scope"),
        (status = 422, description = "Invalid notify params")
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn notify_user(
    State(state): State<ServiceState>,
    Path(user_id): Path<String>,
    CallingClient(client): CallingClient,
    RequestMetadata(vcap_request): RequestMetadata,
    ValidatedJson(params): ValidatedJson<NotifyParams>,
) -> Result<EncapsulatedJson<Vec<Response>>> {
    notify(&state, Audience::User, user_id, client, vcap_request, params).await
}

/// Notify every member of a space
#[utoipa::path(
    post,
    operation_id = "notify_space",
    path = "/spaces/{space_id}",
    params(("space_id" = String, Path, description = "Cloud Controller space GUID")),
    request_body = NotifyParams,
    responses(
        (status = 200, body = Vec<Response>),
        (status = 404, description = "Space could not be found"),
        (status = 422, description = "Invalid notify params"),
        (status = 502, description = "Cloud Controller or UAA is unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn notify_space(
    State(state): State<ServiceState>,
    Path(space_id): Path<String>,
    CallingClient(client): CallingClient,
    RequestMetadata(vcap_request): RequestMetadata,
    ValidatedJson(params): ValidatedJson<NotifyParams>,
) -> Result<EncapsulatedJson<Vec<Response>>> {
    notify(&state, Audience::Space, space_id, client, vcap_request, params).await
}

/// Notify the members of an organization, optionally only one role
#[utoipa::path(
    post,
    operation_id = "notify_organization",
    path = "/organizations/{org_id}",
    params(("org_id" = String, Path, description = "Cloud Controller organization GUID")),
    request_body = NotifyParams,
    responses(
        (status = 200, body = Vec<Response>),
        (status = 404, description = "Organization could not be found"),
        (status = 422, description = "Invalid notify params"),
        (status = 502, description = "Cloud Controller or UAA is unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn notify_organization(
    State(state): State<ServiceState>,
    Path(org_id): Path<String>,
    CallingClient(client): CallingClient,
    RequestMetadata(vcap_request): RequestMetadata,
    ValidatedJson(params): ValidatedJson<NotifyParams>,
) -> Result<EncapsulatedJson<Vec<Response>>> {
    notify(&state, Audience::Organization, org_id, client, vcap_request, params).await
}

/// Notify every user of the platform
#[utoipa::path(
    post,
    operation_id = "notify_everyone",
    path = "/everyone",
    request_body = NotifyParams,
    responses(
        (status = 200, body = Vec<Response>),
        (status = 422, description = "Invalid notify params"),
        (status = 502, description = "UAA is unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn notify_everyone(
    State(state): State<ServiceState>,
    CallingClient(client): CallingClient,
    RequestMetadata(vcap_request): RequestMetadata,
    ValidatedJson(params): ValidatedJson<NotifyParams>,
) -> Result<EncapsulatedJson<Vec<Response>>> {
    notify(&state, Audience::Everyone, String::new(), client, vcap_request, params).await
}

/// Notify every holder of a UAA scope
#[utoipa::path(
    post,
    operation_id = "notify_uaa_scope",
    path = "/uaa_scopes/{scope}",
    params(("scope" = String, Path, description = "UAA scope")),
    request_body = NotifyParams,
    responses(
        (status = 200, body = Vec<Response>),
        (status = 422, description = "Invalid notify params or default scope"),
        (status = 502, description = "UAA is unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn notify_uaa_scope(
    State(state): State<ServiceState>,
    Path(scope): Path<String>,
    CallingClient(client): CallingClient,
    RequestMetadata(vcap_request): RequestMetadata,
    ValidatedJson(params): ValidatedJson<NotifyParams>,
) -> Result<EncapsulatedJson<Vec<Response>>> {
    notify(&state, Audience::UaaScope, scope, client, vcap_request, params).await
}

/// Send to a bare email address
#[utoipa::path(
    post,
    operation_id = "notify_email",
    path = "/emails",
    request_body = NotifyParams,
    responses(
        (status = 200, body = Vec<Response>),
        (status = 403, description = "Missing `emails.write` scope"),
        (status = 422, description = "Invalid notify params or email address")
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn notify_email(
    State(state): State<ServiceState>,
    CallingClient(client): CallingClient,
    RequestMetadata(vcap_request): RequestMetadata,
    ValidatedJson(params): ValidatedJson<NotifyParams>,
) -> Result<EncapsulatedJson<Vec<Response>>> {
    notify(&state, Audience::Email, String::new(), client, vcap_request, params).await
}
