mod time;
pub use time::current_year;
