pub mod background;
pub mod boundary_scanner;
pub mod brightness_stats;
pub mod frame;
pub mod pixel;
