//! Referral ledger: attribution records and tiered point rewards.

use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::users;

#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("Invalid referral code")]
    UnknownCode,
    #[error("Cannot refer yourself")]
    SelfReferral,
    #[error("Referral already tracked for this wallet")]
    AlreadyTracked,
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralAward {
    pub points_awarded: i64,
    pub new_referral_count: i64,
    pub total_referral_points: i64,
}

/// Incremental reward for moving a referrer from `old_count` to `new_count`.
///
/// Two tiers: 1 point per 3 referrals up to 100, then 2 points per 3 beyond
/// 100. Expressed over both counts so crossing a tier boundary can never
/// double-count.
pub fn reward_between(old_count: i64, new_count: i64) -> i64 {
    if new_count <= 100 {
        new_count / 3 - old_count / 3
    } else {
        let old_bonus = if old_count > 100 {
            (old_count - 100) / 3 * 2
        } else {
            0
        };
        (new_count - 100) / 3 * 2 - old_bonus
    }
}

/// Attribute a new wallet to a referral code and pay out the tier reward.
pub fn track(
    conn: &mut Connection,
    referral_code: &str,
    referee_wallet: &str,
    now: i64,
) -> Result<ReferralAward, ReferralError> {
    let tx = conn.transaction()?;

    let already: i64 = tx.query_row(
        "SELECT COUNT(*) FROM referrals WHERE referrer_code = ?1 AND referee_wallet = ?2",
        rusqlite::params![referral_code, referee_wallet],
        |r| r.get(0),
    )?;
    if already > 0 {
        return Err(ReferralError::AlreadyTracked);
    }

    let referrer =
        users::find_by_referral_code(&tx, referral_code)?.ok_or(ReferralError::UnknownCode)?;
    if referrer.wallet_address == referee_wallet {
        return Err(ReferralError::SelfReferral);
    }

    let new_count = referrer.referral_count + 1;
    let points = reward_between(referrer.referral_count, new_count);

    tx.execute(
        "UPDATE users SET referral_count = ?1,
                          referral_points = referral_points + ?2,
                          points = points + ?2
         WHERE id = ?3",
        rusqlite::params![new_count, points, referrer.id],
    )?;
    tx.execute(
        "INSERT INTO referrals (referrer_code, referee_wallet, points_awarded, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![referral_code, referee_wallet, points, now],
    )?;
    tx.commit()?;

    info!(
        referral_code,
        referee_wallet,
        points,
        new_count,
        "referral tracked"
    );
    Ok(ReferralAward {
        points_awarded: points,
        new_referral_count: new_count,
        total_referral_points: referrer.referral_points + points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage, users};

    fn referrer_with_count(conn: &Connection, count: i64) -> (i64, String) {
        let u = users::find_or_create(conn, "referrer_wallet", 100).unwrap();
        let code = users::assign_referral_code(conn, u.id, &u.wallet_address).unwrap();
        conn.execute(
            "UPDATE users SET referral_count = ?1 WHERE id = ?2",
            rusqlite::params![count, u.id],
        )
        .unwrap();
        (u.id, code)
    }

    #[test]
    fn tier_one_awards_one_point_per_three() {
        assert_eq!(reward_between(0, 1), 0);
        assert_eq!(reward_between(1, 2), 0);
        assert_eq!(reward_between(2, 3), 1);
        assert_eq!(reward_between(5, 6), 1);
    }

    #[test]
    fn tier_boundary_at_one_hundred_awards_nothing() {
        // floor(100/3) - floor(99/3) = 33 - 33
        assert_eq!(reward_between(99, 100), 0);
        assert_eq!(reward_between(100, 101), 0);
    }

    #[test]
    fn tier_two_awards_two_points_per_three() {
        assert_eq!(reward_between(102, 103), 2);
        assert_eq!(reward_between(103, 104), 0);
        assert_eq!(reward_between(105, 106), 2);
    }

    #[test]
    fn track_applies_award_and_records_referral() {
        let mut conn = storage::open_in_memory().unwrap();
        let (uid, code) = referrer_with_count(&conn, 2);

        let award = track(&mut conn, &code, "new_wallet", 500).unwrap();
        assert_eq!(
            award,
            ReferralAward {
                points_awarded: 1,
                new_referral_count: 3,
                total_referral_points: 1,
            }
        );

        let u = users::get(&conn, uid).unwrap().unwrap();
        assert_eq!(u.referral_count, 3);
        assert_eq!(u.referral_points, 1);
        assert_eq!(u.points, 1);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM referrals", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn rejects_unknown_code_self_referral_and_duplicates() {
        let mut conn = storage::open_in_memory().unwrap();
        let (_, code) = referrer_with_count(&conn, 0);

        assert!(matches!(
            track(&mut conn, "NOPE", "w1", 500),
            Err(ReferralError::UnknownCode)
        ));
        assert!(matches!(
            track(&mut conn, &code, "referrer_wallet", 500),
            Err(ReferralError::SelfReferral)
        ));

        track(&mut conn, &code, "w1", 500).unwrap();
        assert!(matches!(
            track(&mut conn, &code, "w1", 600),
            Err(ReferralError::AlreadyTracked)
        ));
    }
}
