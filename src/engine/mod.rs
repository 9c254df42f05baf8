pub mod partners;
pub mod reconcile;
pub mod statistics;
