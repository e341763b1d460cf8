use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::rest::health::health_check,
        crate::rest::auth::callback,
        crate::rest::auth::logout,
        crate::rest::auth::session,
        crate::rest::family::create_family,
        crate::rest::family::get_family,
        crate::rest::family::list_members,
        crate::rest::family::update_member,
        crate::rest::family::remove_member,
        crate::rest::invitations::list_invitations,
        crate::rest::invitations::create_invitation,
        crate::rest::invitations::claim_invitation,
        crate::rest::invitations::revoke_invitation,
        crate::rest::chores::list_chores,
        crate::rest::chores::create_chores,
        crate::rest::chores::update_chore,
        crate::rest::chores::submit_chore,
        crate::rest::chores::review_chore,
        crate::rest::chores::delete_chore,
        crate::rest::chores::suggestions,
        crate::rest::cosmetics::catalog,
        crate::rest::cosmetics::purchase,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::rest::OkResponse,
            crate::rest::health::HealthResponse,
            crate::rest::auth::CallbackRequest,
            crate::rest::auth::SessionResponse,
            crate::rest::family::CreatedFamily,
            chorely_chores::types::CreateFamilyRequest,
            chorely_chores::types::UpdateMemberRequest,
            chorely_chores::types::InviteRequest,
            chorely_chores::types::ClaimInvitationRequest,
            chorely_chores::types::CreateChoresRequest,
            chorely_chores::types::UpdateChoreRequest,
            chorely_chores::types::SubmitChoreRequest,
            chorely_chores::types::ReviewDecision,
            chorely_chores::types::ReviewChoreRequest,
            chorely_chores::types::PurchaseRequest,
            chorely_chores::types::ChoreCounts,
            chorely_chores::types::FamilySummary,
            chorely_chores::types::SignInOutcome,
            chorely_chores::types::PurchaseOutcome,
            chorely_chores::Family,
            chorely_chores::Member,
            chorely_chores::MemberRole,
            chorely_chores::MemberStatus,
            chorely_chores::PendingInvitation,
            chorely_chores::Chore,
            chorely_chores::ChoreStatus,
            chorely_chores::ChoreSuggestion,
            chorely_chores::CosmeticItem,
            chorely_chores::CosmeticKind,
            chorely_chores::UserProfile,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Auth", description = "Session cookie lifecycle"),
        (name = "Family", description = "Families and members"),
        (name = "Invitations", description = "Inviting and joining families"),
        (name = "Chores", description = "Chore lifecycle and suggestions"),
        (name = "Cosmetics", description = "Spending coins"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
