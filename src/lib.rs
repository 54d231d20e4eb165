use chrono::{DateTime, Local};

pub mod aws;
pub mod rollout;

/// Timestamped resource name, e.g. `ft-node-20240305-070911`.
pub fn timestamp_name(prefix: &str, now: DateTime<Local>) -> String {
    format!("{prefix}-{}", now.format("%Y%m%d-%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_name() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 7, 9, 11).unwrap();
        assert_eq!(timestamp_name("ft-node", now), "ft-node-20240305-070911");
    }
}
