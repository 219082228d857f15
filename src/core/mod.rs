pub mod constants;
mod engine;
mod types;

pub use engine::{eval_electric, round_half_even};
pub use types::{GridFuel, Savings, SavingsInputs};
