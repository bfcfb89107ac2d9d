pub mod page;
pub mod timetable;
