pub mod chart;
pub mod frame;
pub mod ticks;
