//! Calendar bucket truncation shared by grouped checkmarks and scores.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Calendar bucket a day can be truncated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncateField {
    Week,
    Month,
    Quarter,
    Year,
}

/// First day of the bucket containing `date`. Weeks start on
/// `first_weekday`; the other fields ignore it.
pub fn truncate(field: TruncateField, date: NaiveDate, first_weekday: Weekday) -> NaiveDate {
    match field {
        TruncateField::Week => {
            let delta = (date.weekday().num_days_from_monday() + 7
                - first_weekday.num_days_from_monday())
                % 7;
            date.checked_sub_days(Days::new(delta as u64))
                .unwrap_or(NaiveDate::MIN)
        }
        TruncateField::Month => date.with_day(1).unwrap_or(date),
        TruncateField::Quarter => {
            let month = (date.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
        }
        TruncateField::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
    }
}
