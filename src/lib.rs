pub mod constant;
pub mod domain;
pub mod errors;
pub mod fiat_shamir;
pub mod fri;
pub mod parameters;
pub mod poly;
pub mod sumcheck;
pub mod utils;
pub mod whir;
