//! Cartkeeper Domain Concerns

pub mod carts;
