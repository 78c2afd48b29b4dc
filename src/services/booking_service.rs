//! Booking Lifecycle Controller.
//!
//! Owns every booking mutation: creation after a successful seat claim and
//! the reconciliation of payment outcomes into a terminal status. Status
//! strings in storage are interpreted through [`BookingStatus`] and its
//! transition table; no other component writes bookings.

use anyhow::anyhow;
use chrono::{Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::bookings::{
        BookingCheckout, BookingList, BookingStatusView, BookingView, CreateBookingRequest,
        MovieCard, OccupiedSeats, ShowInfo,
    },
    entity::{
        bookings::{self, Column as BookingCol, Entity as Bookings},
        movies::{Column as MovieCol, Entity as Movies},
        shows::{Entity as Shows, Model as ShowModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Booking, BookingStatus},
    providers::{CheckoutSessionRequest, SessionStatus},
    response::{ApiResponse, Meta},
    services::seat_lock::{self, ClaimOutcome},
    state::AppState,
};

/// Providers keep an unfinished checkout session alive this long.
const SESSION_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileResult {
    Applied(BookingStatus),
    /// Unknown booking, terminal booking, or a concurrent reconciler won.
    NoOp,
}

pub async fn initiate_booking(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<BookingCheckout>> {
    seat_lock::validate_seats(&payload.seats)?;
    let origin = payload.origin.trim_end_matches('/');
    if origin.is_empty() {
        return Err(AppError::BadRequest("Missing origin".into()));
    }

    let (show, movie) = match Shows::find_by_id(payload.show_id)
        .find_also_related(Movies)
        .one(&state.orm)
        .await?
    {
        Some((show, Some(movie))) => (show, movie),
        Some((show, None)) => {
            return Err(AppError::Internal(anyhow!(
                "show {} references a missing movie",
                show.id
            )));
        }
        None => return Err(AppError::NotFound),
    };

    if show.start_time <= Utc::now() {
        return Err(AppError::BadRequest("Show has already started".into()));
    }

    match seat_lock::claim_seats(&state.pool, show.id, &payload.seats, &user.user_id).await? {
        ClaimOutcome::Claimed(_) => {}
        ClaimOutcome::Conflict => {
            return Err(AppError::Conflict(
                "Some selected seats are already booked".into(),
            ));
        }
        ClaimOutcome::NotFound => return Err(AppError::NotFound),
    }

    // From here on the seats are held by this user, so every failure must
    // say so instead of reporting a generic error.
    let amount = show.price * payload.seats.len() as i64;
    let booking_id = Uuid::new_v4();

    let booking = bookings::ActiveModel {
        id: Set(booking_id),
        user_id: Set(user.user_id.clone()),
        show_id: Set(show.id),
        seats: Set(Value::from(payload.seats.clone())),
        amount: Set(amount),
        status: Set(BookingStatus::Pending.as_str().to_string()),
        payment_session_id: Set(None),
        payment_link: Set(None),
        paid_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| incomplete(booking_id, "booking record could not be created", err))?;

    let expires_at = (Utc::now() + Duration::minutes(SESSION_TTL_MINUTES)).timestamp();
    let session_req = CheckoutSessionRequest {
        amount,
        currency: state.config.currency.clone(),
        product_name: movie.title.clone(),
        success_url: format!("{origin}/loading/my-bookings"),
        cancel_url: format!("{origin}/my-bookings"),
        booking_id,
        expires_at,
    };

    let session = state
        .payments
        .create_session(&session_req)
        .await
        .map_err(|err| incomplete(booking_id, "payment session could not be created", err))?;

    let mut active: bookings::ActiveModel = booking.into();
    active.payment_session_id = Set(Some(session.session_id.clone()));
    active.payment_link = Set(Some(session.redirect_url.clone()));
    active.updated_at = Set(Utc::now().into());
    active
        .update(&state.orm)
        .await
        .map_err(|err| incomplete(booking_id, "payment link could not be saved", err))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(&user.user_id),
        "booking_created",
        Some("bookings"),
        Some(serde_json::json!({
            "booking_id": booking_id,
            "show_id": show.id,
            "seats": payload.seats,
            "amount": amount,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Booking created",
        BookingCheckout {
            redirect_url: session.redirect_url,
        },
        Some(Meta::empty()),
    ))
}

fn incomplete(booking_id: Uuid, step: &str, err: impl std::fmt::Display) -> AppError {
    tracing::error!(booking_id = %booking_id, error = %err, "booking setup failed after seat claim");
    AppError::BookingIncomplete(format!(
        "{step}; the selected seats remain held. Retry in a moment."
    ))
}

/// Apply an external payment outcome to a pending booking. Idempotent: a
/// repeated or late outcome for a terminal booking is a logged no-op, never
/// an error (providers retry on failure responses).
pub async fn reconcile_payment(
    state: &AppState,
    booking_id: Uuid,
    outcome: PaymentOutcome,
) -> AppResult<ReconcileResult> {
    let Some(booking) = Bookings::find_by_id(booking_id).one(&state.orm).await? else {
        tracing::warn!(booking_id = %booking_id, "payment outcome for unknown booking");
        return Ok(ReconcileResult::NoOp);
    };

    let current = parse_status(&booking.status, booking.id)?;
    let next = match outcome {
        PaymentOutcome::Confirmed => BookingStatus::Paid,
        PaymentOutcome::Failed => BookingStatus::Expired,
    };

    if !current.can_transition_to(next) {
        tracing::info!(
            booking_id = %booking_id,
            status = %current,
            outcome = ?outcome,
            "ignoring payment outcome for settled booking"
        );
        return Ok(ReconcileResult::NoOp);
    }

    // The WHERE clause re-checks the transition at the storage layer, so a
    // concurrent reconciler in another process cannot apply it twice.
    let paid_at = (next == BookingStatus::Paid).then(Utc::now);
    let result = sqlx::query(
        r#"
        UPDATE bookings
           SET status = $2,
               paid_at = COALESCE($3, paid_at),
               updated_at = now()
         WHERE id = $1
           AND status = $4
        "#,
    )
    .bind(booking_id)
    .bind(next.as_str())
    .bind(paid_at)
    .bind(BookingStatus::Pending.as_str())
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(ReconcileResult::NoOp);
    }

    if next == BookingStatus::Expired && state.config.release_on_expiry {
        let seats = seat_labels(&booking.seats);
        if !seats.is_empty() {
            seat_lock::release_seats(&state.pool, booking.show_id, &seats).await?;
        }
    }

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "payment_reconciled",
        Some("bookings"),
        Some(serde_json::json!({
            "booking_id": booking_id,
            "status": next.as_str(),
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ReconcileResult::Applied(next))
}

/// Current status of the caller's booking. A still-pending booking is
/// checked against the payment provider first, which also gives external
/// sweeps a reconciliation hook for orphaned sessions.
pub async fn booking_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<BookingStatusView>> {
    let booking = Bookings::find_by_id(id)
        .filter(BookingCol::UserId.eq(user.user_id.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let status = parse_status(&booking.status, booking.id)?;
    if status == BookingStatus::Pending {
        if let Some(session_id) = booking.payment_session_id.as_deref() {
            match state.payments.session_status(session_id).await {
                Ok(SessionStatus::Completed) => {
                    reconcile_payment(state, booking.id, PaymentOutcome::Confirmed).await?;
                }
                Ok(SessionStatus::Expired) => {
                    reconcile_payment(state, booking.id, PaymentOutcome::Failed).await?;
                }
                Ok(SessionStatus::Open) => {}
                // The poll is best-effort; the stored status is still an answer.
                Err(err) => {
                    tracing::warn!(booking_id = %booking.id, error = %err, "payment status poll failed");
                }
            }
        }
    }

    let refreshed = Bookings::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let status = parse_status(&refreshed.status, refreshed.id)?;

    Ok(ApiResponse::success(
        "OK",
        BookingStatusView { id, status },
        Some(Meta::empty()),
    ))
}

/// Read projection of a show's occupancy map keys, sorted for stable output.
pub async fn list_occupied_seats(pool: &DbPool, show_id: Uuid) -> AppResult<Vec<String>> {
    let row: Option<(Value,)> = sqlx::query_as("SELECT occupied_seats FROM shows WHERE id = $1")
        .bind(show_id)
        .fetch_optional(pool)
        .await?;
    let occupied = row.ok_or(AppError::NotFound)?.0;

    let mut seats: Vec<String> = occupied
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    seats.sort();
    Ok(seats)
}

pub async fn occupied_seats(
    pool: &DbPool,
    show_id: Uuid,
) -> AppResult<ApiResponse<OccupiedSeats>> {
    let seats = list_occupied_seats(pool, show_id).await?;
    Ok(ApiResponse::success(
        "OK",
        OccupiedSeats { seats },
        Some(Meta::empty()),
    ))
}

/// The caller's bookings, newest first, with show and movie context.
pub async fn list_user_bookings(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<BookingList>> {
    let rows = Bookings::find()
        .filter(BookingCol::UserId.eq(user.user_id.as_str()))
        .order_by_desc(BookingCol::CreatedAt)
        .find_also_related(Shows)
        .all(&state.orm)
        .await?;

    let movie_ids: Vec<i64> = rows
        .iter()
        .filter_map(|(_, show)| show.as_ref().map(|s| s.movie_id))
        .collect();
    let movies = if movie_ids.is_empty() {
        Vec::new()
    } else {
        Movies::find()
            .filter(MovieCol::Id.is_in(movie_ids))
            .all(&state.orm)
            .await?
    };

    let mut items = Vec::with_capacity(rows.len());
    for (booking, show) in rows {
        let show = show.ok_or_else(|| {
            AppError::Internal(anyhow!("booking {} references a missing show", booking.id))
        })?;
        let movie = movies
            .iter()
            .find(|m| m.id == show.movie_id)
            .ok_or_else(|| {
                AppError::Internal(anyhow!("show {} references a missing movie", show.id))
            })?;
        items.push(BookingView {
            booking: booking_from_entity(booking)?,
            show: show_info(&show),
            movie: movie_card(movie),
        });
    }

    Ok(ApiResponse::success(
        "OK",
        BookingList { items },
        Some(Meta::empty()),
    ))
}

fn parse_status(raw: &str, booking_id: Uuid) -> AppResult<BookingStatus> {
    BookingStatus::parse(raw).ok_or_else(|| {
        AppError::Internal(anyhow!("booking {booking_id} has unknown status {raw:?}"))
    })
}

fn seat_labels(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|seats| {
            seats
                .iter()
                .filter_map(|s| s.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn booking_from_entity(model: bookings::Model) -> AppResult<Booking> {
    let status = parse_status(&model.status, model.id)?;
    Ok(Booking {
        id: model.id,
        user_id: model.user_id,
        show_id: model.show_id,
        seats: seat_labels(&model.seats),
        amount: model.amount,
        status,
        payment_link: model.payment_link,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn show_info(model: &ShowModel) -> ShowInfo {
    ShowInfo {
        id: model.id,
        start_time: model.start_time.with_timezone(&Utc),
        price: model.price,
    }
}

fn movie_card(model: &crate::entity::movies::Model) -> MovieCard {
    MovieCard {
        id: model.id,
        title: model.title.clone(),
        poster_path: model.poster_path.clone(),
        backdrop_path: model.backdrop_path.clone(),
        release_date: model.release_date.clone(),
        runtime: model.runtime,
    }
}
