//! Data models and API payloads

pub mod billing;
pub mod check_in;
pub mod membership;
pub mod notification;
pub mod punch_card;
pub mod user;

pub use billing::{NewPayment, Payment, PaymentMethod, PaymentPurpose, PaymentStatus};
pub use check_in::{CheckIn, CheckInMethod, NewCheckIn};
pub use membership::{Membership, MembershipPlan, MembershipStatus, PlanType};
pub use notification::Notification;
pub use punch_card::{NewPunchCard, PunchCard, PunchCardStatus, PunchCardTemplate};
pub use user::{NewUser, User, UserResponse, UserRole};
