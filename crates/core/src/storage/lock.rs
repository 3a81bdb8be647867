use anyhow::Context;
use std::hash::Hasher;

// Advisory locks are scoped to the Postgres session, so acquire and release must run on the
// same connection. This is a best-effort guard against overlapping polling runs for one subject.
const LOCK_NAMESPACE: i64 = 0x434F_494E_5055; // "COINPU"

/// Stable across processes: FNV-1a over the upper-cased subject.
fn lock_key_for_subject(subject: &str) -> i64 {
    let mut h = Fnv1a::default();
    h.write(subject.trim().to_uppercase().as_bytes());
    LOCK_NAMESPACE ^ (h.finish() as i64)
}

struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }
}

impl Hasher for Fnv1a {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= u64::from(*b);
            self.0 = self.0.wrapping_mul(0x0000_0100_0000_01b3);
        }
    }
}

pub async fn try_acquire_subject_lock(
    conn: &mut sqlx::PgConnection,
    subject: &str,
) -> anyhow::Result<bool> {
    let key = lock_key_for_subject(subject);
    let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .persistent(false)
        .bind(key)
        .fetch_one(&mut *conn)
        .await
        .with_context(|| format!("failed to acquire advisory lock (subject={subject}, key={key})"))?;
    Ok(acquired.0)
}

pub async fn release_subject_lock(
    conn: &mut sqlx::PgConnection,
    subject: &str,
) -> anyhow::Result<()> {
    let key = lock_key_for_subject(subject);
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .persistent(false)
        .bind(key)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("failed to release advisory lock (subject={subject}, key={key})"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_case_and_padding() {
        assert_eq!(lock_key_for_subject("btc"), lock_key_for_subject(" BTC "));
        assert_ne!(lock_key_for_subject("BTC"), lock_key_for_subject("ETH"));
    }

    #[test]
    fn key_hashes_raw_subject_bytes() {
        let mut h = Fnv1a::default();
        h.write(b"a");
        assert_eq!(h.finish(), 0xaf63_dc4c_8601_ec8c);

        let mut h = Fnv1a::default();
        h.write(b"BTC");
        assert_eq!(lock_key_for_subject("btc"), LOCK_NAMESPACE ^ (h.finish() as i64));
    }
}
