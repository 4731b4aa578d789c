pub mod call;
pub mod carrier;
pub mod load;
