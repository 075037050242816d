pub mod csv;
pub mod resample;
pub mod time_series;
