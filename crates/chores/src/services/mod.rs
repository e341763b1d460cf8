//! Business logic layer. Each service borrows a request-scoped [`Db`].
//!
//! [`Db`]: crate::db::Db

pub mod account_service;
pub mod chore_service;
pub mod family_service;
pub mod invite_service;
pub mod member_service;
pub mod shop_service;
pub mod suggestion_service;

pub use account_service::AccountService;
pub use chore_service::ChoreService;
pub use family_service::FamilyService;
pub use invite_service::InviteService;
pub use member_service::MemberService;
pub use shop_service::ShopService;
pub use suggestion_service::{SuggestionService, DEFAULT_SUGGESTION_LIMIT, MAX_SUGGESTION_LIMIT};
