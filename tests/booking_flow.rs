mod common;

use std::sync::atomic::Ordering;

use axum_cinema_api::{
    dto::bookings::CreateBookingRequest,
    entity::bookings::Entity as Bookings,
    error::AppError,
    middleware::auth::AuthUser,
    models::BookingStatus,
    providers::SessionStatus,
    services::booking_service::{
        self, PaymentOutcome, ReconcileResult, initiate_booking, list_occupied_seats,
        reconcile_payment,
    },
    services::{favorite_service, seat_lock},
};
use common::{FakePayments, labels, seed_movie, seed_show, setup_state};
use sea_orm::EntityTrait;
use uuid::Uuid;

fn user(id: &str) -> AuthUser {
    AuthUser {
        user_id: id.to_string(),
        role: "user".into(),
    }
}

// Full settlement path: claim -> pending booking -> checkout session ->
// webhook-style confirmation, with idempotent reconciliation afterwards.
#[tokio::test]
async fn booking_settles_and_reconciliation_is_idempotent() -> anyhow::Result<()> {
    let Some(harness) = setup_state().await? else {
        return Ok(());
    };
    let state = harness.state;

    seed_movie(&state, 9001, "Settlement Test").await?;
    let show_id = seed_show(&state, 9001, 250, 6).await?;
    let booker = user("user_settle");

    let resp = initiate_booking(
        &state,
        &booker,
        CreateBookingRequest {
            show_id,
            seats: labels(&["A1", "A2", "A3"]),
            origin: "https://cinema.test".into(),
        },
    )
    .await?;
    let checkout = resp.data.unwrap();
    assert!(checkout.redirect_url.starts_with("https://checkout.test/"));

    // The session was scoped to exactly price x seats and tagged with the
    // booking id.
    let sessions = harness.payments.sessions.lock().await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].amount, 750);
    let booking_id = sessions[0].booking_id;
    drop(sessions);

    let booking = Bookings::find_by_id(booking_id)
        .one(&state.orm)
        .await?
        .expect("booking row");
    assert_eq!(booking.amount, 750);
    assert_eq!(booking.status, "pending");
    assert!(booking.payment_link.is_some());

    // Occupied-seats projection reflects the claim immediately.
    let occupied = list_occupied_seats(&state.pool, show_id).await?;
    assert_eq!(occupied, labels(&["A1", "A2", "A3"]));

    // First confirmation applies, the duplicate does not.
    let first = reconcile_payment(&state, booking_id, PaymentOutcome::Confirmed).await?;
    assert_eq!(first, ReconcileResult::Applied(BookingStatus::Paid));
    let second = reconcile_payment(&state, booking_id, PaymentOutcome::Confirmed).await?;
    assert_eq!(second, ReconcileResult::NoOp);

    // A late failure event cannot move a paid booking.
    let late = reconcile_payment(&state, booking_id, PaymentOutcome::Failed).await?;
    assert_eq!(late, ReconcileResult::NoOp);
    let booking = Bookings::find_by_id(booking_id)
        .one(&state.orm)
        .await?
        .expect("booking row");
    assert_eq!(booking.status, "paid");
    assert!(booking.paid_at.is_some());

    Ok(())
}

#[tokio::test]
async fn conflicting_claim_is_all_or_nothing() -> anyhow::Result<()> {
    let Some(harness) = setup_state().await? else {
        return Ok(());
    };
    let state = harness.state;

    seed_movie(&state, 9002, "Conflict Test").await?;
    let show_id = seed_show(&state, 9002, 300, 6).await?;

    let first = seat_lock::claim_seats(&state.pool, show_id, &labels(&["B1"]), "user_one").await?;
    assert!(matches!(first, seat_lock::ClaimOutcome::Claimed(_)));

    // B1 is contested, so A1 and C1 must not be written either.
    let second = seat_lock::claim_seats(
        &state.pool,
        show_id,
        &labels(&["A1", "B1", "C1"]),
        "user_two",
    )
    .await?;
    assert!(matches!(second, seat_lock::ClaimOutcome::Conflict));

    let occupied = list_occupied_seats(&state.pool, show_id).await?;
    assert_eq!(occupied, labels(&["B1"]));

    Ok(())
}

#[tokio::test]
async fn claim_against_unknown_show_is_not_found() -> anyhow::Result<()> {
    let Some(harness) = setup_state().await? else {
        return Ok(());
    };
    let state = harness.state;

    let outcome =
        seat_lock::claim_seats(&state.pool, Uuid::new_v4(), &labels(&["A1"]), "user_x").await?;
    assert!(matches!(outcome, seat_lock::ClaimOutcome::NotFound));

    Ok(())
}

#[tokio::test]
async fn booking_rejected_for_started_show() -> anyhow::Result<()> {
    let Some(harness) = setup_state().await? else {
        return Ok(());
    };
    let state = harness.state;

    seed_movie(&state, 9003, "Started Show Test").await?;
    let show_id = seed_show(&state, 9003, 200, -1).await?;

    let err = initiate_booking(
        &state,
        &user("user_late"),
        CreateBookingRequest {
            show_id,
            seats: labels(&["A1"]),
            origin: "https://cinema.test".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Nothing was claimed.
    let occupied = list_occupied_seats(&state.pool, show_id).await?;
    assert!(occupied.is_empty());

    Ok(())
}

// Claim succeeded but the payment path failed: the caller must learn the
// seats are still held, and the pending booking must exist for later
// reconciliation.
#[tokio::test]
async fn session_failure_surfaces_held_seats() -> anyhow::Result<()> {
    let Some(harness) = setup_state().await? else {
        return Ok(());
    };
    let state = harness.state;

    seed_movie(&state, 9004, "Session Failure Test").await?;
    let show_id = seed_show(&state, 9004, 400, 6).await?;
    harness.payments.fail_create.store(true, Ordering::SeqCst);

    let err = initiate_booking(
        &state,
        &user("user_unlucky"),
        CreateBookingRequest {
            show_id,
            seats: labels(&["D4", "D5"]),
            origin: "https://cinema.test".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BookingIncomplete(_)));

    let occupied = list_occupied_seats(&state.pool, show_id).await?;
    assert_eq!(occupied, labels(&["D4", "D5"]));

    Ok(())
}

#[tokio::test]
async fn expired_booking_releases_seats_only_under_policy() -> anyhow::Result<()> {
    let Some(harness) = setup_state().await? else {
        return Ok(());
    };

    // Default policy: expiry keeps the seats held.
    let state = harness.state.clone();
    seed_movie(&state, 9005, "Expiry Policy Test").await?;
    let show_id = seed_show(&state, 9005, 150, 6).await?;
    initiate_booking(
        &state,
        &user("user_keep"),
        CreateBookingRequest {
            show_id,
            seats: labels(&["E1"]),
            origin: "https://cinema.test".into(),
        },
    )
    .await?;
    let booking_id = harness.payments.sessions.lock().await[0].booking_id;
    reconcile_payment(&state, booking_id, PaymentOutcome::Failed).await?;
    assert_eq!(
        list_occupied_seats(&state.pool, show_id).await?,
        labels(&["E1"])
    );

    // Opt-in policy: expiry frees the booking's seats.
    let mut releasing = harness.state.clone();
    releasing.config.release_on_expiry = true;
    let show_id = seed_show(&releasing, 9005, 150, 6).await?;
    initiate_booking(
        &releasing,
        &user("user_release"),
        CreateBookingRequest {
            show_id,
            seats: labels(&["E1", "E2"]),
            origin: "https://cinema.test".into(),
        },
    )
    .await?;
    let booking_id = harness
        .payments
        .sessions
        .lock()
        .await
        .last()
        .unwrap()
        .booking_id;
    let applied = reconcile_payment(&releasing, booking_id, PaymentOutcome::Failed).await?;
    assert_eq!(applied, ReconcileResult::Applied(BookingStatus::Expired));
    assert!(
        list_occupied_seats(&releasing.pool, show_id)
            .await?
            .is_empty()
    );

    Ok(())
}

#[tokio::test]
async fn status_poll_reconciles_finished_session() -> anyhow::Result<()> {
    let Some(harness) = setup_state().await? else {
        return Ok(());
    };
    let state = harness.state;

    seed_movie(&state, 9006, "Poll Test").await?;
    let show_id = seed_show(&state, 9006, 500, 6).await?;
    let booker = user("user_poll");

    initiate_booking(
        &state,
        &booker,
        CreateBookingRequest {
            show_id,
            seats: labels(&["F1"]),
            origin: "https://cinema.test".into(),
        },
    )
    .await?;
    let booking_id = harness.payments.sessions.lock().await[0].booking_id;

    // Provider finished the session but the webhook never arrived.
    let session_id = FakePayments::session_id_for(booking_id);
    harness
        .payments
        .set_status(&session_id, SessionStatus::Completed)
        .await;

    let resp = booking_service::booking_status(&state, &booker, booking_id).await?;
    assert_eq!(resp.data.unwrap().status, BookingStatus::Paid);

    Ok(())
}

#[tokio::test]
async fn reconciling_unknown_booking_is_a_noop() -> anyhow::Result<()> {
    let Some(harness) = setup_state().await? else {
        return Ok(());
    };

    let result =
        reconcile_payment(&harness.state, Uuid::new_v4(), PaymentOutcome::Confirmed).await?;
    assert_eq!(result, ReconcileResult::NoOp);

    Ok(())
}

#[tokio::test]
async fn favorites_toggle_flips_membership() -> anyhow::Result<()> {
    let Some(harness) = setup_state().await? else {
        return Ok(());
    };
    let state = harness.state;

    seed_movie(&state, 9007, "Favorite Test").await?;
    let booker = user("user_fav");

    let first =
        favorite_service::toggle_favorite(state.identity.as_ref(), &booker.user_id, 9007).await?;
    assert_eq!(first, favorite_service::ToggleAction::Added);
    let listed = favorite_service::list_favorites(&state, &booker).await?;
    assert!(listed.data.unwrap().items.iter().any(|m| m.id == 9007));

    let second =
        favorite_service::toggle_favorite(state.identity.as_ref(), &booker.user_id, 9007).await?;
    assert_eq!(second, favorite_service::ToggleAction::Removed);
    let listed = favorite_service::list_favorites(&state, &booker).await?;
    assert!(listed.data.unwrap().items.is_empty());

    let third =
        favorite_service::toggle_favorite(state.identity.as_ref(), &booker.user_id, 9007).await?;
    assert_eq!(third, favorite_service::ToggleAction::Added);

    Ok(())
}
