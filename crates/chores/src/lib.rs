//! # Chorely Chores Crate
//!
//! Business logic for the family chore tracker: families, memberships and
//! invitations, the chore lifecycle, usage-based suggestions and the
//! cosmetics shop. All state lives in Firestore and is reached through a
//! request-scoped [`Db`] that refreshes the caller's ID token when needed.
//!
//! ## Architecture
//!
//! - **Entities**: document models (Family, Member, Chore, ...)
//! - **Services**: business logic, one per concern
//! - **Types**: errors, request payloads and composite results
//! - **Utils**: validation, permissions and document paths

pub mod db;
pub mod entities;
pub mod services;
pub mod types;
pub mod utils;

pub use db::Db;
pub use entities::{
    Chore, ChoreStatus, ChoreSuggestion, CosmeticItem, CosmeticKind, Family, Member, MemberRole,
    MemberStatus, PendingInvitation, UserProfile,
};
pub use services::{
    AccountService, ChoreService, FamilyService, InviteService, MemberService, ShopService,
    SuggestionService,
};
pub use types::{Actor, ChoreError, ChoreResult};
