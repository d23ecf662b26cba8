use chrono::{DateTime, FixedOffset, Utc};
use rand::Rng;

/// Length of the challenge sent with every initiate call.
pub const CHALLENGE_LENGTH: usize = 40;

/// Asia/Dhaka is UTC+06:00 year-round.
pub const DHAKA_OFFSET: FixedOffset = match FixedOffset::east_opt(6 * 3600) {
    Some(offset) => offset,
    None => panic!("UTC+06:00 is within the valid offset range"),
};

/// Random string of `length` lowercase ASCII letters.
pub fn generate_challenge(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

/// Current Dhaka wall-clock time as `YYYYMMDDHHMMSS`, the gateway's clock convention.
pub fn get_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&DHAKA_OFFSET)
        .format("%Y%m%d%H%M%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn challenge_has_requested_length() {
        for length in [0, 1, 16, CHALLENGE_LENGTH, 128] {
            assert_eq!(generate_challenge(length).len(), length);
        }
    }

    #[test]
    fn challenge_is_lowercase_letters() {
        let challenge = generate_challenge(CHALLENGE_LENGTH);
        assert!(challenge.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn challenges_are_fresh() {
        assert_ne!(
            generate_challenge(CHALLENGE_LENGTH),
            generate_challenge(CHALLENGE_LENGTH)
        );
    }

    #[test]
    fn timestamp_is_fourteen_digits() {
        let timestamp = get_timestamp();
        assert_eq!(timestamp.len(), 14);
        assert!(timestamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn timestamp_uses_dhaka_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 9, 20, 15, 7).unwrap();
        assert_eq!(format_timestamp(instant), "20240310021507");
    }

    #[test]
    fn dhaka_offset_is_six_hours_east() {
        assert_eq!(DHAKA_OFFSET.local_minus_utc(), 6 * 3600);
        let instant = Utc.with_ymd_and_hms(2024, 12, 31, 18, 0, 0).unwrap();
        assert_eq!(instant.with_timezone(&DHAKA_OFFSET).to_rfc3339(), "2025-01-01T00:00:00+06:00");
    }
}
