//! Conversions between `OffsetDateTime` and the millisecond timestamps stored in the database.

use time::OffsetDateTime;
use time::error::ComponentRange;

pub fn to_millis(date_time: OffsetDateTime) -> i64 {
    (date_time.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_millis(millis: i64) -> Result<OffsetDateTime, ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn truncates_to_millis() {
        let t = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
            + Duration::nanoseconds(1_234_567);

        let millis = to_millis(t);

        assert_eq!(millis, 1_700_000_000_001);
        assert_eq!(
            from_millis(millis).unwrap(),
            t - Duration::nanoseconds(234_567)
        );
    }

    #[test]
    fn before_epoch() {
        let t = OffsetDateTime::UNIX_EPOCH - Duration::days(3);

        assert_eq!(from_millis(to_millis(t)).unwrap(), t);
    }
}
