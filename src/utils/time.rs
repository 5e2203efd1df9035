use chrono::prelude::*;

/// Current calendar year in local time
pub fn current_year() -> i32 {
    Local::now().year()
}
