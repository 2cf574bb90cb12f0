// Weekend background markings for time axes.

use chrono::{DateTime, Datelike, Duration, Utc};

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Half-open interval `[from, to)` in epoch millis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marking {
    pub from: i64,
    pub to: i64,
}

/// Every Saturday 00:00 to Monday 00:00 (UTC) interval that overlaps `[min_ms, max_ms)`.
pub fn weekend_markings(min_ms: i64, max_ms: i64) -> Vec<Marking> {
    if min_ms >= max_ms {
        return Vec::new();
    }
    let Some(min) = DateTime::<Utc>::from_timestamp_millis(min_ms) else {
        return Vec::new();
    };

    // Sunday=0 .. Saturday=6; Saturday steps back 0 days, Sunday 1, Monday 2, ...
    let back = (min.weekday().num_days_from_sunday() + 1) % 7;
    let Some(saturday) = (min - Duration::days(i64::from(back)))
        .date_naive()
        .and_hms_opt(0, 0, 0)
    else {
        return Vec::new();
    };

    let mut stamp = saturday.and_utc().timestamp_millis();
    let mut markings = Vec::new();
    while stamp < max_ms {
        let to = stamp + 2 * DAY_MS;
        if to > min_ms {
            markings.push(Marking { from: stamp, to });
        }
        stamp += 7 * DAY_MS;
    }
    markings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .expect("valid date")
            .timestamp_millis()
    }

    #[test]
    fn two_weeks_from_monday_has_two_weekends() {
        // 2014-09-22 was a Monday.
        let min = ms(2014, 9, 22, 0);
        let max = min + 14 * DAY_MS;

        let marks = weekend_markings(min, max);

        assert_eq!(
            marks,
            vec![
                Marking {
                    from: ms(2014, 9, 27, 0),
                    to: ms(2014, 9, 29, 0)
                },
                Marking {
                    from: ms(2014, 10, 4, 0),
                    to: ms(2014, 10, 6, 0)
                },
            ]
        );
    }

    #[test]
    fn range_starting_mid_weekend_includes_that_weekend() {
        let min = ms(2014, 9, 28, 15); // Sunday afternoon
        let marks = weekend_markings(min, min + DAY_MS);
        assert_eq!(
            marks,
            vec![Marking {
                from: ms(2014, 9, 27, 0),
                to: ms(2014, 9, 29, 0)
            }]
        );
    }

    #[test]
    fn saturday_start_does_not_step_back() {
        let min = ms(2014, 9, 27, 10);
        let marks = weekend_markings(min, min + 3 * DAY_MS);
        assert_eq!(marks[0].from, ms(2014, 9, 27, 0));
    }

    #[test]
    fn empty_range_has_no_markings() {
        assert!(weekend_markings(10, 10).is_empty());
        assert!(weekend_markings(10, 5).is_empty());
    }
}
