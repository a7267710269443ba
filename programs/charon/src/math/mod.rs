//! Fixed point and weighted-pool math

pub mod fixed_point;
pub mod weighted;

pub use fixed_point::{Rounding, WAD};
pub use weighted::{
    calc_in_given_out, calc_out_given_in, calc_pool_out_given_single_in,
    calc_single_out_given_pool_in, calc_spot_price,
};
