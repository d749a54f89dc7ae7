use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, Timelike, Utc};

/// ZIP stores modification times as local wall-clock values without a zone.
///
/// Writing the UTC wall clock makes extracted files appear shifted by the
/// writer's UTC offset. This returns the wall clock to store so the
/// extracted time matches `instant` for someone in `offset`.
pub fn correct_for_archive_timezone_quirk(
    instant: DateTime<Utc>,
    offset: FixedOffset,
) -> NaiveDateTime {
    instant.with_timezone(&offset).naive_local()
}

/// The single reference time and offset used for one archive write.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveClock {
    pub now: DateTime<Utc>,
    pub offset: FixedOffset,
}

impl ArchiveClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    pub fn system() -> Self {
        let local = Local::now();
        Self {
            now: local.with_timezone(&Utc),
            offset: *local.offset(),
        }
    }

    /// Wall clock to store for an entry, falling back to "now".
    pub fn stamp(&self, modified: Option<DateTime<Utc>>) -> NaiveDateTime {
        correct_for_archive_timezone_quirk(modified.unwrap_or(self.now), self.offset)
    }
}

/// Convert a wall clock to the archive's DOS representation.
///
/// DOS times cover 1980..=2107; anything outside clamps to the codec's
/// minimum, 1980-01-01 00:00:00.
pub fn to_zip_datetime(wall: NaiveDateTime) -> zip::DateTime {
    let Ok(year) = u16::try_from(wall.year()) else {
        return zip::DateTime::default();
    };
    zip::DateTime::from_date_and_time(
        year,
        wall.month() as u8,
        wall.day() as u8,
        wall.hour() as u8,
        wall.minute() as u8,
        wall.second() as u8,
    )
    .unwrap_or_default()
}

/// Interpret a stored DOS time as a UTC instant.
pub fn from_zip_datetime(stored: zip::DateTime) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(
        i32::from(stored.year()),
        u32::from(stored.month()),
        u32::from(stored.day()),
    )?
    .and_hms_opt(
        u32::from(stored.hour()),
        u32::from(stored.minute()),
        u32::from(stored.second()),
    )
    .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn shifts_east_of_utc_forward() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let wall = correct_for_archive_timezone_quirk(utc(2024, 3, 1, 12, 0, 0), offset);
        assert_eq!(wall, utc(2024, 3, 1, 14, 0, 0).naive_utc());
    }

    #[test]
    fn shifts_west_of_utc_backward_across_midnight() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let wall = correct_for_archive_timezone_quirk(utc(2024, 3, 1, 2, 30, 0), offset);
        assert_eq!(wall, utc(2024, 2, 29, 21, 30, 0).naive_utc());
    }

    #[test]
    fn utc_offset_is_identity() {
        let instant = utc(2023, 12, 31, 23, 59, 58);
        let wall = correct_for_archive_timezone_quirk(instant, FixedOffset::east_opt(0).unwrap());
        assert_eq!(wall, instant.naive_utc());
    }

    #[test]
    fn clock_uses_entry_time_when_present() {
        let clock = ArchiveClock::new(utc(2024, 1, 1, 0, 0, 0), FixedOffset::east_opt(3600).unwrap());
        assert_eq!(clock.stamp(None), utc(2024, 1, 1, 1, 0, 0).naive_utc());
        assert_eq!(
            clock.stamp(Some(utc(2020, 6, 1, 10, 0, 0))),
            utc(2020, 6, 1, 11, 0, 0).naive_utc()
        );
    }

    #[test]
    fn dos_conversion_preserves_even_seconds() {
        let wall = utc(2022, 7, 4, 9, 15, 42).naive_utc();
        let back = from_zip_datetime(to_zip_datetime(wall)).unwrap();
        assert_eq!(back.naive_utc(), wall);
    }

    #[test]
    fn out_of_range_year_clamps_to_minimum() {
        let wall = utc(1970, 1, 1, 0, 0, 0).naive_utc();
        let stored = to_zip_datetime(wall);
        assert_eq!(stored.year(), 1980);
        assert_eq!(stored.month(), 1);
        assert_eq!(stored.day(), 1);
    }
}
