//! Domain entities stored as Firestore documents.

pub mod chore;
pub mod cosmetic;
pub mod family;
pub mod invitation;
pub mod member;
pub mod user;

pub use chore::{Chore, ChoreStatus, ChoreSuggestion, ChoreUsage};
pub use cosmetic::{CosmeticItem, CosmeticKind};
pub use family::Family;
pub use invitation::{InvitationIndex, PendingInvitation};
pub use member::{Member, MemberRole, MemberStatus};
pub use user::UserProfile;
