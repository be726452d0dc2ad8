pub mod reconcile;
pub mod split;
