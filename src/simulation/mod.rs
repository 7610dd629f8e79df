pub mod states;
pub mod params;
pub mod pool;
pub mod forces;
pub mod scheduler;
pub mod frame;
pub mod preset;
