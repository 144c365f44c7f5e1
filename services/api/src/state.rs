//! Application state shared across handlers

use sqlx::PgPool;

use crate::billing::BillingClient;
use crate::checkin::{CheckInResolver, PgCheckInStore};
use crate::repositories::{
    AnalyticsRepository, CheckInRepository, MembershipRepository, NotificationRepository,
    PaymentMethodRepository, PaymentRepository, PlanRepository, PunchCardRepository,
    TemplateRepository, UserRepository,
};
use crate::session::SessionManager;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: UserRepository,
    pub membership_repository: MembershipRepository,
    pub punch_card_repository: PunchCardRepository,
    pub check_in_repository: CheckInRepository,
    pub plan_repository: PlanRepository,
    pub template_repository: TemplateRepository,
    pub payment_repository: PaymentRepository,
    pub payment_method_repository: PaymentMethodRepository,
    pub notification_repository: NotificationRepository,
    pub analytics_repository: AnalyticsRepository,
    pub check_in_resolver: CheckInResolver<PgCheckInStore>,
    pub session_manager: SessionManager,
    pub billing_client: BillingClient,
}

impl AppState {
    pub fn new(pool: PgPool, session_manager: SessionManager, billing_client: BillingClient) -> Self {
        let membership_repository = MembershipRepository::new(pool.clone());
        let punch_card_repository = PunchCardRepository::new(pool.clone());
        let check_in_repository = CheckInRepository::new(pool.clone());

        let check_in_resolver = CheckInResolver::new(PgCheckInStore::new(
            membership_repository.clone(),
            punch_card_repository.clone(),
            check_in_repository.clone(),
        ));

        AppState {
            user_repository: UserRepository::new(pool.clone()),
            membership_repository,
            punch_card_repository,
            check_in_repository,
            plan_repository: PlanRepository::new(pool.clone()),
            template_repository: TemplateRepository::new(pool.clone()),
            payment_repository: PaymentRepository::new(pool.clone()),
            payment_method_repository: PaymentMethodRepository::new(pool.clone()),
            notification_repository: NotificationRepository::new(pool.clone()),
            analytics_repository: AnalyticsRepository::new(pool),
            check_in_resolver,
            session_manager,
            billing_client,
        }
    }
}
