//! Check-in resolution
//!
//! A check-in must be funded by exactly one entitlement: a punch card
//! visit or an active membership. Day passes are consumed before the
//! membership because they are a finite, already-paid-for resource; with
//! multiple usable cards the oldest purchase is drained first (FIFO).
//!
//! The decision rule lives in `resolve_funding`, a pure function, and
//! the side effects go through the `CheckInStore` port so the whole
//! sequence is testable without a database.

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{CheckIn, CheckInMethod, Membership, NewCheckIn, PunchCard};
use crate::repositories::{
    CheckInRepository, ConsumeError, MembershipRepository, PunchCardRepository,
};

/// Errors surfaced by check-in resolution and the punch card ledger
#[derive(Error, Debug)]
pub enum CheckInError {
    /// Neither an active membership nor a usable punch card
    #[error("no active membership or usable day pass")]
    NoActiveEntitlement,

    /// The punch card exists but its balance is zero
    #[error("no remaining punches")]
    NoRemainingPunches,

    /// The referenced punch card does not exist
    #[error("punch card not found")]
    NotFound,

    /// Concrete store errors (connectivity, query failures)
    #[error("store error: {0:?}")]
    Store(anyhow::Error),
}

impl From<ConsumeError> for CheckInError {
    fn from(err: ConsumeError) -> Self {
        match err {
            ConsumeError::NotFound => CheckInError::NotFound,
            ConsumeError::NoRemainingPunches => CheckInError::NoRemainingPunches,
            ConsumeError::Database(e) => CheckInError::Store(e.into()),
        }
    }
}

/// The entitlement selected to fund a check-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingSource {
    /// Fund from the user's membership
    Membership(Uuid),
    /// Consume one visit from this punch card
    DayPass { card_id: Uuid, name: String },
}

/// Pick the funding source for a check-in.
///
/// Precedence: usable day passes before the membership, oldest purchase
/// first with a stable tie-break on id. Fails when neither an active
/// membership nor a usable card exists.
pub fn resolve_funding(
    membership: Option<&Membership>,
    punch_cards: &[PunchCard],
) -> Result<FundingSource, CheckInError> {
    let oldest_usable = punch_cards
        .iter()
        .filter(|card| card.is_usable())
        .min_by(|a, b| {
            a.purchased_at
                .cmp(&b.purchased_at)
                .then_with(|| a.id.cmp(&b.id))
        });

    if let Some(card) = oldest_usable {
        return Ok(FundingSource::DayPass {
            card_id: card.id,
            name: card.name.clone(),
        });
    }

    match membership {
        Some(m) if m.is_active() => Ok(FundingSource::Membership(m.id)),
        _ => Err(CheckInError::NoActiveEntitlement),
    }
}

/// Storage port for check-in resolution
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CheckInStore: Send + Sync {
    async fn membership_for(&self, user_id: Uuid) -> Result<Option<Membership>, CheckInError>;
    async fn punch_cards_for(&self, user_id: Uuid) -> Result<Vec<PunchCard>, CheckInError>;
    async fn consume_punch(&self, card_id: Uuid) -> Result<PunchCard, CheckInError>;
    async fn record_check_in(&self, new_check_in: NewCheckIn) -> Result<CheckIn, CheckInError>;
}

/// Outcome of a successful check-in
#[derive(Debug, Clone)]
pub enum CheckInOutcome {
    /// A punch card visit was consumed
    DayPassUsed {
        check_in: CheckIn,
        remaining_visits: i32,
        package_name: String,
    },
    /// An active membership covered the visit
    MembershipUsed { check_in: CheckIn },
}

/// Resolves and records check-ins against a `CheckInStore`
#[derive(Clone)]
pub struct CheckInResolver<S> {
    store: S,
}

impl<S: CheckInStore> CheckInResolver<S> {
    /// Bound on re-resolution after losing a consume race. Each lost
    /// race means another request drained the chosen card, so the set
    /// of usable cards shrinks every iteration.
    const MAX_ATTEMPTS: u32 = 3;

    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve the funding source for a check-in and record it.
    ///
    /// On failure nothing is written: a user without entitlements can
    /// repeat the request forever without creating check-in rows.
    pub async fn check_in(
        &self,
        user_id: Uuid,
        location: Option<String>,
        method: CheckInMethod,
    ) -> Result<CheckInOutcome, CheckInError> {
        let mut last_race = CheckInError::NoRemainingPunches;

        for _ in 0..Self::MAX_ATTEMPTS {
            let membership = self.store.membership_for(user_id).await?;
            let punch_cards = self.store.punch_cards_for(user_id).await?;

            match resolve_funding(membership.as_ref(), &punch_cards)? {
                FundingSource::DayPass { card_id, name } => {
                    match self.store.consume_punch(card_id).await {
                        Ok(card) => {
                            // The record points at the real membership
                            // when the user has one; the synthetic card
                            // ref is reserved for pass-only members.
                            let membership_ref = membership
                                .as_ref()
                                .map(|m| m.id.to_string())
                                .unwrap_or_else(|| NewCheckIn::day_pass_ref(card_id));

                            let check_in = self
                                .store
                                .record_check_in(NewCheckIn {
                                    user_id,
                                    membership_ref,
                                    location: location.clone(),
                                    method,
                                })
                                .await?;

                            info!(
                                "user {} checked in with day pass '{}', {} visits left",
                                user_id, name, card.remaining_punches
                            );

                            return Ok(CheckInOutcome::DayPassUsed {
                                check_in,
                                remaining_visits: card.remaining_punches,
                                package_name: name,
                            });
                        }
                        // Lost the race for the last punch on this card;
                        // reload and resolve against the fresh state.
                        Err(err @ CheckInError::NoRemainingPunches) => {
                            last_race = err;
                            continue;
                        }
                        Err(other) => return Err(other),
                    }
                }
                FundingSource::Membership(membership_id) => {
                    let check_in = self
                        .store
                        .record_check_in(NewCheckIn {
                            user_id,
                            membership_ref: membership_id.to_string(),
                            location: location.clone(),
                            method,
                        })
                        .await?;

                    info!("user {} checked in with membership {}", user_id, membership_id);

                    return Ok(CheckInOutcome::MembershipUsed { check_in });
                }
            }
        }

        Err(last_race)
    }
}

/// Production `CheckInStore` over the sqlx repositories
#[derive(Clone)]
pub struct PgCheckInStore {
    memberships: MembershipRepository,
    punch_cards: PunchCardRepository,
    check_ins: CheckInRepository,
}

impl PgCheckInStore {
    pub fn new(
        memberships: MembershipRepository,
        punch_cards: PunchCardRepository,
        check_ins: CheckInRepository,
    ) -> Self {
        Self {
            memberships,
            punch_cards,
            check_ins,
        }
    }
}

#[async_trait::async_trait]
impl CheckInStore for PgCheckInStore {
    async fn membership_for(&self, user_id: Uuid) -> Result<Option<Membership>, CheckInError> {
        self.memberships
            .find_by_user(user_id)
            .await
            .map_err(CheckInError::Store)
    }

    async fn punch_cards_for(&self, user_id: Uuid) -> Result<Vec<PunchCard>, CheckInError> {
        self.punch_cards
            .list_by_user(user_id)
            .await
            .map_err(CheckInError::Store)
    }

    async fn consume_punch(&self, card_id: Uuid) -> Result<PunchCard, CheckInError> {
        Ok(self.punch_cards.consume_one(card_id).await?)
    }

    async fn record_check_in(&self, new_check_in: NewCheckIn) -> Result<CheckIn, CheckInError> {
        self.check_ins
            .insert(&new_check_in)
            .await
            .map_err(CheckInError::Store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use mockall::predicate;

    fn membership(status: &str) -> Membership {
        Membership {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_type: "premium".to_string(),
            status: status.to_string(),
            start_date: Utc::now(),
            end_date: Utc::now() + Duration::days(30),
            auto_renew: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn card(remaining: i32, status: &str, purchased_at: DateTime<Utc>) -> PunchCard {
        PunchCard {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "10 Visits".to_string(),
            total_punches: 10,
            remaining_punches: remaining,
            price_per_punch_cents: 1500,
            total_price_cents: 15000,
            status: status.to_string(),
            purchased_at,
            updated_at: purchased_at,
        }
    }

    #[test]
    fn resolve_prefers_day_pass_over_active_membership() {
        let m = membership("active");
        let c = card(3, "active", Utc::now());

        let source = resolve_funding(Some(&m), std::slice::from_ref(&c)).unwrap();
        assert_eq!(
            source,
            FundingSource::DayPass {
                card_id: c.id,
                name: c.name.clone()
            }
        );
    }

    #[test]
    fn resolve_picks_oldest_card_first() {
        let t1 = Utc::now() - Duration::days(10);
        let t2 = Utc::now();
        let older = card(2, "active", t1);
        let newer = card(5, "active", t2);

        // Order in the slice must not matter.
        let source = resolve_funding(None, &[newer.clone(), older.clone()]).unwrap();
        assert!(matches!(source, FundingSource::DayPass { card_id, .. } if card_id == older.id));
    }

    #[test]
    fn resolve_tie_break_is_stable() {
        let t = Utc::now();
        let a = card(1, "active", t);
        let b = card(1, "active", t);
        let expected = std::cmp::min(a.id, b.id);

        let source = resolve_funding(None, &[a, b]).unwrap();
        assert!(matches!(source, FundingSource::DayPass { card_id, .. } if card_id == expected));
    }

    #[test]
    fn resolve_skips_unusable_cards() {
        let m = membership("active");
        let drained = card(0, "active", Utc::now() - Duration::days(5));
        let exhausted = card(0, "exhausted", Utc::now() - Duration::days(3));
        let expired = card(4, "expired", Utc::now() - Duration::days(1));

        let source = resolve_funding(Some(&m), &[drained, exhausted, expired]).unwrap();
        assert_eq!(source, FundingSource::Membership(m.id));
    }

    #[test]
    fn resolve_fails_without_any_entitlement() {
        let inactive = membership("frozen");
        let drained = card(0, "active", Utc::now());

        assert!(matches!(
            resolve_funding(None, &[]),
            Err(CheckInError::NoActiveEntitlement)
        ));
        assert!(matches!(
            resolve_funding(Some(&inactive), &[drained]),
            Err(CheckInError::NoActiveEntitlement)
        ));
    }

    #[tokio::test]
    async fn check_in_consumes_day_pass_and_reports_balance() {
        let user_id = Uuid::new_v4();
        let c = card(3, "active", Utc::now());
        let card_id = c.id;
        let m = membership("active");
        let membership_id = m.id;

        let mut store = MockCheckInStore::new();
        store
            .expect_membership_for()
            .with(predicate::eq(user_id))
            .returning(move |_| Ok(Some(m.clone())));
        store
            .expect_punch_cards_for()
            .with(predicate::eq(user_id))
            .returning(move |_| Ok(vec![c.clone()]));
        store
            .expect_consume_punch()
            .with(predicate::eq(card_id))
            .times(1)
            .returning(move |_| {
                let mut consumed = card(2, "active", Utc::now());
                consumed.id = card_id;
                Ok(consumed)
            });
        // A day-pass visit by a user who has a membership row still
        // references the real membership id.
        store
            .expect_record_check_in()
            .withf(move |new| {
                new.user_id == user_id && new.membership_ref == membership_id.to_string()
            })
            .times(1)
            .returning(|new| {
                Ok(CheckIn {
                    id: Uuid::new_v4(),
                    user_id: new.user_id,
                    membership_ref: new.membership_ref,
                    location: new.location,
                    method: new.method.as_str().to_string(),
                    checked_in_at: Utc::now(),
                })
            });

        let resolver = CheckInResolver::new(store);
        let outcome = resolver
            .check_in(user_id, None, CheckInMethod::Qr)
            .await
            .unwrap();

        match outcome {
            CheckInOutcome::DayPassUsed {
                remaining_visits,
                package_name,
                ..
            } => {
                assert_eq!(remaining_visits, 2);
                assert_eq!(package_name, "10 Visits");
            }
            other => panic!("expected day pass outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn day_pass_ref_is_synthetic_without_membership() {
        let user_id = Uuid::new_v4();
        let c = card(1, "active", Utc::now());
        let card_id = c.id;

        let mut store = MockCheckInStore::new();
        store.expect_membership_for().returning(|_| Ok(None));
        store
            .expect_punch_cards_for()
            .returning(move |_| Ok(vec![c.clone()]));
        store
            .expect_consume_punch()
            .with(predicate::eq(card_id))
            .times(1)
            .returning(move |_| {
                let mut consumed = card(0, "exhausted", Utc::now());
                consumed.id = card_id;
                Ok(consumed)
            });
        store
            .expect_record_check_in()
            .withf(move |new| new.membership_ref == format!("day-pass-{card_id}"))
            .times(1)
            .returning(|new| {
                Ok(CheckIn {
                    id: Uuid::new_v4(),
                    user_id: new.user_id,
                    membership_ref: new.membership_ref,
                    location: new.location,
                    method: new.method.as_str().to_string(),
                    checked_in_at: Utc::now(),
                })
            });

        let resolver = CheckInResolver::new(store);
        let outcome = resolver
            .check_in(user_id, None, CheckInMethod::Qr)
            .await
            .unwrap();

        assert!(matches!(outcome, CheckInOutcome::DayPassUsed { .. }));
    }

    #[tokio::test]
    async fn check_in_uses_membership_when_no_cards() {
        let user_id = Uuid::new_v4();
        let m = membership("active");
        let membership_id = m.id;

        let mut store = MockCheckInStore::new();
        store
            .expect_membership_for()
            .returning(move |_| Ok(Some(m.clone())));
        store.expect_punch_cards_for().returning(|_| Ok(vec![]));
        store.expect_consume_punch().never();
        store
            .expect_record_check_in()
            .withf(move |new| new.membership_ref == membership_id.to_string())
            .times(1)
            .returning(|new| {
                Ok(CheckIn {
                    id: Uuid::new_v4(),
                    user_id: new.user_id,
                    membership_ref: new.membership_ref,
                    location: new.location,
                    method: new.method.as_str().to_string(),
                    checked_in_at: Utc::now(),
                })
            });

        let resolver = CheckInResolver::new(store);
        let outcome = resolver
            .check_in(user_id, Some("front desk".to_string()), CheckInMethod::Manual)
            .await
            .unwrap();

        assert!(matches!(outcome, CheckInOutcome::MembershipUsed { .. }));
    }

    #[tokio::test]
    async fn failed_check_in_records_nothing() {
        let user_id = Uuid::new_v4();

        let mut store = MockCheckInStore::new();
        store.expect_membership_for().returning(|_| Ok(None));
        store.expect_punch_cards_for().returning(|_| Ok(vec![]));
        store.expect_consume_punch().never();
        store.expect_record_check_in().never();

        let resolver = CheckInResolver::new(store);

        // Repeating the failed request never creates a check-in row.
        for _ in 0..3 {
            let result = resolver.check_in(user_id, None, CheckInMethod::Qr).await;
            assert!(matches!(result, Err(CheckInError::NoActiveEntitlement)));
        }
    }

    #[tokio::test]
    async fn lost_consume_race_falls_back_to_membership() {
        let user_id = Uuid::new_v4();
        let m = membership("active");
        let membership_id = m.id;
        let racing_card = card(1, "active", Utc::now());
        let card_id = racing_card.id;

        let mut store = MockCheckInStore::new();
        store
            .expect_membership_for()
            .returning(move |_| Ok(Some(m.clone())));

        // First load sees the card as usable; after the lost race the
        // reload sees it exhausted.
        let mut loads = 0;
        store.expect_punch_cards_for().returning(move |_| {
            loads += 1;
            if loads == 1 {
                Ok(vec![racing_card.clone()])
            } else {
                let mut drained = racing_card.clone();
                drained.remaining_punches = 0;
                drained.status = "exhausted".to_string();
                Ok(vec![drained])
            }
        });
        store
            .expect_consume_punch()
            .with(predicate::eq(card_id))
            .times(1)
            .returning(|_| Err(CheckInError::NoRemainingPunches));
        store
            .expect_record_check_in()
            .withf(move |new| new.membership_ref == membership_id.to_string())
            .times(1)
            .returning(|new| {
                Ok(CheckIn {
                    id: Uuid::new_v4(),
                    user_id: new.user_id,
                    membership_ref: new.membership_ref,
                    location: new.location,
                    method: new.method.as_str().to_string(),
                    checked_in_at: Utc::now(),
                })
            });

        let resolver = CheckInResolver::new(store);
        let outcome = resolver
            .check_in(user_id, None, CheckInMethod::Qr)
            .await
            .unwrap();

        assert!(matches!(outcome, CheckInOutcome::MembershipUsed { .. }));
    }

    mod concurrency {
        //! The consume operation must behave like an atomic conditional
        //! decrement. This in-memory store mirrors those semantics so the
        //! resolver can be hammered concurrently without a database.

        use super::*;
        use std::collections::HashMap;
        use std::sync::{Arc, Mutex};

        struct InMemoryStore {
            cards: Mutex<HashMap<Uuid, PunchCard>>,
            check_ins: Mutex<Vec<CheckIn>>,
        }

        impl InMemoryStore {
            fn with_card(card: PunchCard) -> Self {
                let mut cards = HashMap::new();
                cards.insert(card.id, card);
                Self {
                    cards: Mutex::new(cards),
                    check_ins: Mutex::new(Vec::new()),
                }
            }
        }

        #[async_trait::async_trait]
        impl CheckInStore for Arc<InMemoryStore> {
            async fn membership_for(
                &self,
                _user_id: Uuid,
            ) -> Result<Option<Membership>, CheckInError> {
                Ok(None)
            }

            async fn punch_cards_for(
                &self,
                _user_id: Uuid,
            ) -> Result<Vec<PunchCard>, CheckInError> {
                Ok(self.cards.lock().unwrap().values().cloned().collect())
            }

            async fn consume_punch(&self, card_id: Uuid) -> Result<PunchCard, CheckInError> {
                let mut cards = self.cards.lock().unwrap();
                let card = cards.get_mut(&card_id).ok_or(CheckInError::NotFound)?;
                if card.remaining_punches <= 0 {
                    return Err(CheckInError::NoRemainingPunches);
                }
                card.remaining_punches -= 1;
                if card.remaining_punches == 0 {
                    card.status = "exhausted".to_string();
                }
                Ok(card.clone())
            }

            async fn record_check_in(
                &self,
                new_check_in: NewCheckIn,
            ) -> Result<CheckIn, CheckInError> {
                let check_in = CheckIn {
                    id: Uuid::new_v4(),
                    user_id: new_check_in.user_id,
                    membership_ref: new_check_in.membership_ref,
                    location: new_check_in.location,
                    method: new_check_in.method.as_str().to_string(),
                    checked_in_at: Utc::now(),
                };
                self.check_ins.lock().unwrap().push(check_in.clone());
                Ok(check_in)
            }
        }

        #[tokio::test]
        async fn n_concurrent_consumes_drain_exactly_n_punches() {
            const PUNCHES: i32 = 8;
            const REQUESTS: i32 = 12;

            let user_id = Uuid::new_v4();
            let card = super::card(PUNCHES, "active", Utc::now());
            let card_id = card.id;
            let store = Arc::new(InMemoryStore::with_card(card));
            let resolver = Arc::new(CheckInResolver::new(store.clone()));

            let mut handles = Vec::new();
            for _ in 0..REQUESTS {
                let resolver = resolver.clone();
                handles.push(tokio::spawn(async move {
                    resolver.check_in(user_id, None, CheckInMethod::Qr).await
                }));
            }

            let mut successes = 0;
            for handle in handles {
                if handle.await.unwrap().is_ok() {
                    successes += 1;
                }
            }

            assert_eq!(successes, PUNCHES);

            let cards = store.cards.lock().unwrap();
            let final_card = cards.get(&card_id).unwrap();
            assert_eq!(final_card.remaining_punches, 0);
            assert_eq!(final_card.status, "exhausted");

            let recorded = store.check_ins.lock().unwrap();
            assert_eq!(recorded.len(), PUNCHES as usize);
        }
    }
}
