//! # Availability
//!
//! Overlap checks between a requested stay and the bookings already holding
//! a site.
//!
//! ## Which Bookings Block?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  pending    ── no  (request not yet accepted)                           │
//! │  approved   ── YES                                                      │
//! │  confirmed  ── YES                                                      │
//! │  rejected   ── no                                                       │
//! │  cancelled  ── no                                                       │
//! │  completed  ── no  (stay is over)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Touching Stays
//! ```text
//!   existing:  [Jun 7 ─────── Jun 10)
//!   request:                  [Jun 10 ─────── Jun 13)   → available
//!   request:             [Jun 9 ─────── Jun 12)         → conflict
//! ```

use crate::booking::Booking;
use crate::types::StayDates;

/// Bookings that block `stay`.
pub fn conflicting_bookings<'a>(stay: &StayDates, bookings: &'a [Booking]) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|booking| booking.status.blocks_availability())
        .filter(|booking| stay.overlaps(booking.check_in, booking.check_out))
        .collect()
}

/// True iff no blocking booking overlaps `stay`.
pub fn is_available(stay: &StayDates, bookings: &[Booking]) -> bool {
    conflicting_bookings(stay, bookings).is_empty()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::tests::booking_on;
    use crate::booking::BookingStatus;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn stay(from: u32, to: u32) -> StayDates {
        StayDates::new(date(from), date(to)).unwrap()
    }

    #[test]
    fn test_no_bookings_is_available() {
        assert!(is_available(&stay(1, 3), &[]));
    }

    #[test]
    fn test_non_overlapping_bookings() {
        let bookings = vec![
            booking_on(date(1), date(4), BookingStatus::Confirmed),
            booking_on(date(20), date(25), BookingStatus::Approved),
        ];

        assert!(is_available(&stay(10, 15), &bookings));
    }

    #[test]
    fn test_shared_night_blocks() {
        let bookings = vec![booking_on(date(10), date(13), BookingStatus::Approved)];

        assert!(!is_available(&stay(12, 14), &bookings));
        assert!(!is_available(&stay(8, 11), &bookings));
        assert!(!is_available(&stay(11, 12), &bookings));
        assert!(!is_available(&stay(1, 30), &bookings));
    }

    #[test]
    fn test_touching_boundaries_do_not_conflict() {
        let bookings = vec![booking_on(date(7), date(10), BookingStatus::Confirmed)];

        assert!(is_available(&stay(10, 13), &bookings));
        assert!(is_available(&stay(4, 7), &bookings));
    }

    #[test]
    fn test_only_approved_and_confirmed_block() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            let bookings = vec![booking_on(date(10), date(13), status)];
            assert!(is_available(&stay(10, 13), &bookings), "{status:?} blocked");
        }

        for status in [BookingStatus::Approved, BookingStatus::Confirmed] {
            let bookings = vec![booking_on(date(10), date(13), status)];
            assert!(!is_available(&stay(10, 13), &bookings), "{status:?} did not block");
        }
    }

    #[test]
    fn test_conflicting_bookings_lists_only_overlaps() {
        let bookings = vec![
            booking_on(date(1), date(3), BookingStatus::Confirmed),
            booking_on(date(5), date(8), BookingStatus::Confirmed),
            booking_on(date(6), date(9), BookingStatus::Cancelled),
        ];

        let conflicts = conflicting_bookings(&stay(6, 7), &bookings);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].check_in, date(5));
    }
}
