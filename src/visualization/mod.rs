#[cfg(feature = "viewer")]
pub mod viewer;
