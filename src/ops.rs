pub mod filter;
pub mod flat_map;
pub mod lifecycle;
pub mod map;
pub mod observe_on;
pub mod subscribe_on;
pub mod take;
pub mod tap;
pub mod zip;
