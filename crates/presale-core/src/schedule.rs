//! Linear tranche vesting.
//!
//! A lock schedule unlocks `tranche_count` equal slices across
//! `lock_duration_secs`; tranche `k` unlocks at
//! `ceil(k * lock_duration / tranche_count)` seconds, so the final tranche
//! lands exactly on `lock_end`. After `k` whole tranches an account is entitled to
//! `floor(locked_total * k / tranche_count)`; once every tranche has elapsed
//! it is entitled to all of `locked_total`, so rounding dust is released by
//! the final tranche instead of being stranded.
//!
//! Everything here is a pure function of the account, the schedule, and the
//! caller-supplied `now`.

use chrono::{DateTime, Utc};
use presale_types::{Amount, LockSchedule, VestingAccount, VestingState, constants};

use crate::arith::scale_floor;

/// Whole tranches elapsed at `now`, capped at `tranche_count`.
#[must_use]
pub fn elapsed_tranches(schedule: &LockSchedule, now: DateTime<Utc>) -> u32 {
    if now < schedule.lock_start {
        return 0;
    }
    if schedule.lock_duration_secs == 0 {
        return schedule.tranche_count;
    }
    // i64 seconds times a u32 count stays well inside u128.
    let elapsed = u128::try_from((now - schedule.lock_start).num_seconds()).unwrap_or(0);
    let tranches =
        elapsed * u128::from(schedule.tranche_count) / u128::from(schedule.lock_duration_secs);
    u32::try_from(tranches)
        .unwrap_or(u32::MAX)
        .min(schedule.tranche_count)
}

/// Amount unlocked after `elapsed` of `tranche_count` tranches.
#[must_use]
pub fn entitled(locked_total: Amount, elapsed: u32, tranche_count: u32) -> Amount {
    if elapsed >= tranche_count {
        return locked_total;
    }
    scale_floor(locked_total, elapsed, tranche_count)
}

/// Unlocked and not yet claimed, floored at zero.
///
/// The floor matters after an admin re-times the schedule: claims already
/// made under the old timing are never clawed back.
#[must_use]
pub fn claimable(account: &VestingAccount, schedule: &LockSchedule, now: DateTime<Utc>) -> Amount {
    let k = elapsed_tranches(schedule, now);
    entitled(account.locked_total, k, schedule.tranche_count).saturating_sub(account.claimed_total)
}

#[must_use]
pub fn state(account: &VestingAccount, schedule: &LockSchedule, now: DateTime<Utc>) -> VestingState {
    if account.outstanding() == 0 {
        VestingState::NoLock
    } else if now >= schedule.lock_end() {
        VestingState::FullyUnlockable
    } else {
        VestingState::Locking
    }
}

/// Instant the next tranche unlocks, or `None` once all have.
#[must_use]
pub fn next_unlock_at(schedule: &LockSchedule, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let k = elapsed_tranches(schedule, now);
    if k >= schedule.tranche_count {
        return None;
    }
    let offset = i64::try_from(schedule.unlock_offset_secs(k + 1)).ok()?;
    schedule
        .lock_start
        .checked_add_signed(chrono::Duration::seconds(offset))
}

/// Split a credit into `(immediate, locked)` by a release percentage.
#[must_use]
pub fn split_release(credited: Amount, release_ratio: u32) -> (Amount, Amount) {
    let immediate = scale_floor(credited, release_ratio, constants::PERCENT_TOTAL);
    (immediate, credited - immediate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn nine_tranches() -> LockSchedule {
        LockSchedule {
            lock_start: start(),
            lock_duration_secs: 900,
            tranche_count: 9,
            version: 0,
        }
    }

    fn locked(total: Amount) -> VestingAccount {
        VestingAccount {
            locked_total: total,
            claimed_total: 0,
        }
    }

    #[test]
    fn nothing_before_lock_start() {
        let s = nine_tranches();
        assert_eq!(elapsed_tranches(&s, start() - Duration::seconds(1)), 0);
        assert_eq!(claimable(&locked(900), &s, start()), 0);
    }

    #[test]
    fn three_of_nine_tranches() {
        let s = nine_tranches();
        let now = start() + Duration::seconds(300);
        assert_eq!(elapsed_tranches(&s, now), 3);
        assert_eq!(claimable(&locked(900), &s, now), 300);

        // Partway into the fourth tranche nothing more is unlocked.
        let acct = VestingAccount {
            locked_total: 900,
            claimed_total: 300,
        };
        assert_eq!(claimable(&acct, &s, start() + Duration::seconds(399)), 0);
        assert_eq!(claimable(&acct, &s, start() + Duration::seconds(400)), 100);
    }

    #[test]
    fn final_tranche_releases_dust() {
        let s = nine_tranches();
        let acct = locked(1000);
        assert_eq!(claimable(&acct, &s, start() + Duration::seconds(800)), 888);
        assert_eq!(claimable(&acct, &s, start() + Duration::seconds(900)), 1000);
        assert_eq!(claimable(&acct, &s, start() + Duration::days(3650)), 1000);
    }

    #[test]
    fn claimable_floored_at_zero() {
        let s = nine_tranches();
        let acct = VestingAccount {
            locked_total: 900,
            claimed_total: 600,
        };
        // Schedule pushed back after claims were made.
        let mut later = s;
        later.lock_start = start() + Duration::days(30);
        later.version = 1;
        assert_eq!(claimable(&acct, &later, start() + Duration::seconds(900)), 0);
    }

    #[test]
    fn states() {
        let s = nine_tranches();
        assert_eq!(state(&VestingAccount::default(), &s, start()), VestingState::NoLock);
        assert_eq!(state(&locked(9), &s, start()), VestingState::Locking);
        assert_eq!(
            state(&locked(9), &s, start() + Duration::seconds(900)),
            VestingState::FullyUnlockable
        );
        let done = VestingAccount {
            locked_total: 9,
            claimed_total: 9,
        };
        assert_eq!(state(&done, &s, start() + Duration::seconds(900)), VestingState::NoLock);
    }

    #[test]
    fn next_unlock() {
        let s = nine_tranches();
        assert_eq!(
            next_unlock_at(&s, start() + Duration::seconds(250)),
            Some(start() + Duration::seconds(300))
        );
        assert_eq!(next_unlock_at(&s, start() + Duration::seconds(900)), None);
    }

    #[test]
    fn uneven_duration_unlocks_fully_only_at_lock_end() {
        let s = LockSchedule {
            lock_start: start(),
            lock_duration_secs: 1_799,
            tranche_count: 900,
            version: 0,
        };
        let acct = locked(1000);
        let end = s.lock_end();

        assert_eq!(claimable(&acct, &s, start() + Duration::seconds(900)), 500);
        for before_end in [1_000, 1_500, 1_798] {
            let now = start() + Duration::seconds(before_end);
            assert!(claimable(&acct, &s, now) < acct.locked_total);
            assert_eq!(state(&acct, &s, now), VestingState::Locking);
        }
        assert_eq!(claimable(&acct, &s, end), acct.locked_total);
        assert_eq!(state(&acct, &s, end), VestingState::FullyUnlockable);

        assert_eq!(next_unlock_at(&s, start()), Some(start() + Duration::seconds(2)));
        assert_eq!(next_unlock_at(&s, end - Duration::seconds(1)), Some(end));
        assert_eq!(next_unlock_at(&s, end), None);
    }

    #[test]
    fn release_split() {
        assert_eq!(split_release(1000, 10), (100, 900));
        assert_eq!(split_release(999, 10), (99, 900));
        assert_eq!(split_release(5, 0), (0, 5));
        assert_eq!(split_release(5, 100), (5, 0));
    }

    #[test]
    fn tranche_increments_sum_to_locked_total() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..300 {
            let count: u32 = rng.gen_range(1..=500);
            let s = LockSchedule {
                lock_start: start(),
                lock_duration_secs: rng.gen_range(u64::from(count)..=u64::from(count) * 3_600),
                tranche_count: count,
                version: 0,
            };
            let acct = locked(rng.gen_range(0..u128::from(u64::MAX)));
            let at = |k: u32| {
                start() + Duration::seconds(i64::try_from(s.unlock_offset_secs(k)).unwrap())
            };

            let mut sum = 0u128;
            let mut prev = 0u128;
            for k in 1..=count {
                // One second before its boundary, tranche k is still locked.
                assert_eq!(elapsed_tranches(&s, at(k) - Duration::seconds(1)), k - 1);
                assert_eq!(elapsed_tranches(&s, at(k)), k);
                let c = claimable(&acct, &s, at(k));
                assert!(c >= prev);
                assert!(c <= acct.locked_total);
                sum += c - prev;
                prev = c;
            }
            assert_eq!(at(count), s.lock_end());
            assert_eq!(sum, acct.locked_total);
        }
    }
}
