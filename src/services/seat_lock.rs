//! Seat Lock Manager: the only writer of a show's occupancy map.
//!
//! A claim is a single conditional UPDATE on the JSONB map that both checks
//! that every requested seat key is absent and merges the new entries. Two
//! overlapping claims therefore cannot both succeed, no matter how many
//! server processes are running, and a failed claim writes nothing.

use std::collections::HashSet;

use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::Show,
};

#[derive(Debug)]
pub enum ClaimOutcome {
    /// All requested seats are now held by the claimant; carries the
    /// post-claim show snapshot.
    Claimed(Show),
    /// At least one requested seat was already occupied. Nothing was written.
    Conflict,
    NotFound,
}

/// Reject malformed seat requests before any storage mutation.
pub fn validate_seats(seats: &[String]) -> AppResult<()> {
    if seats.is_empty() {
        return Err(AppError::BadRequest("No seats selected".into()));
    }
    let mut seen: HashSet<&str> = HashSet::with_capacity(seats.len());
    for seat in seats {
        if !seat_label_ok(seat) {
            return Err(AppError::BadRequest(format!("Invalid seat label: {seat}")));
        }
        if !seen.insert(seat.as_str()) {
            return Err(AppError::BadRequest(format!("Duplicate seat label: {seat}")));
        }
    }
    Ok(())
}

/// Seat labels are a row letter followed by a 1-2 digit seat number ("A1").
fn seat_label_ok(label: &str) -> bool {
    let bytes = label.as_bytes();
    if !(2..=3).contains(&bytes.len()) {
        return false;
    }
    bytes[0].is_ascii_uppercase() && bytes[1] != b'0' && bytes[1..].iter().all(u8::is_ascii_digit)
}

pub async fn claim_seats(
    pool: &DbPool,
    show_id: Uuid,
    seats: &[String],
    claimant: &str,
) -> AppResult<ClaimOutcome> {
    validate_seats(seats)?;

    let mut patch = serde_json::Map::with_capacity(seats.len());
    for seat in seats {
        patch.insert(seat.clone(), Value::String(claimant.to_string()));
    }

    // `?|` is true if any of the requested labels already exists as a key,
    // so the merge applies only when every seat is free.
    let updated = sqlx::query_as::<_, Show>(
        r#"
        UPDATE shows
           SET occupied_seats = occupied_seats || $2::jsonb,
               updated_at = now()
         WHERE id = $1
           AND NOT (occupied_seats ?| $3)
        RETURNING id, movie_id, start_time, price, occupied_seats, created_at
        "#,
    )
    .bind(show_id)
    .bind(Value::Object(patch))
    .bind(seats)
    .fetch_optional(pool)
    .await?;

    if let Some(show) = updated {
        return Ok(ClaimOutcome::Claimed(show));
    }

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM shows WHERE id = $1")
        .bind(show_id)
        .fetch_optional(pool)
        .await?;

    Ok(if exists.is_some() {
        ClaimOutcome::Conflict
    } else {
        ClaimOutcome::NotFound
    })
}

/// Remove seat keys from the occupancy map. Used only when an expired
/// booking releases its hold; reconciliation's terminal guard ensures this
/// runs at most once per booking, so a re-claimed seat is never touched.
pub async fn release_seats(pool: &DbPool, show_id: Uuid, seats: &[String]) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE shows
           SET occupied_seats = occupied_seats - $2::text[],
               updated_at = now()
         WHERE id = $1
        "#,
    )
    .bind(show_id)
    .bind(seats)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{seat_label_ok, validate_seats};

    fn labels(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accepts_row_letter_plus_number() {
        for label in ["A1", "B7", "J10", "Z99"] {
            assert!(seat_label_ok(label), "{label} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_labels() {
        for label in ["", "A", "1A", "a1", "A0", "A100", "AA1", "A-1", "A1 "] {
            assert!(!seat_label_ok(label), "{label} should be invalid");
        }
    }

    #[test]
    fn rejects_empty_request() {
        assert!(validate_seats(&[]).is_err());
    }

    #[test]
    fn rejects_duplicates_within_request() {
        assert!(validate_seats(&labels(&["A1", "A2", "A1"])).is_err());
    }

    #[test]
    fn accepts_distinct_valid_seats() {
        assert!(validate_seats(&labels(&["A1", "A2", "B1"])).is_ok());
    }
}
