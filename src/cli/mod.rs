pub mod dashboard;
pub mod series;
pub mod setup;
pub mod signal;
pub mod ui;
