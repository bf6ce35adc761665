use chrono::Utc;
use uuid::Uuid;

/// Time-ordered string id for primary keys: 15-digit epoch millis, 32 hex digits of a v4 uuid,
/// then `000`. Always 50 characters.
///
/// ```rust
/// let id = sql_mapper::next_id();
/// assert_eq!(id.len(), 50);
/// assert!(id.ends_with("000"));
/// ```
#[must_use]
pub fn next_id() -> String {
    format!(
        "{:015}{}000",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_sortable_by_time_prefix() {
        let a = next_id();
        let b = next_id();
        assert_ne!(a, b);
        assert!(a[..15] <= b[..15]);
        assert!(a[15..47].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
