pub mod logger;
pub mod nvraw;
