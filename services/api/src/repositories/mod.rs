//! Repositories for database operations

pub mod analytics;
pub mod billing;
pub mod catalog;
pub mod check_in;
pub mod membership;
pub mod notification;
pub mod punch_card;
pub mod user;

pub use analytics::AnalyticsRepository;
pub use billing::{PaymentMethodRepository, PaymentRepository};
pub use catalog::{PlanRepository, TemplateRepository};
pub use check_in::CheckInRepository;
pub use membership::MembershipRepository;
pub use notification::NotificationRepository;
pub use punch_card::{ConsumeError, PunchCardRepository};
pub use user::UserRepository;
