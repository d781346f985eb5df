pub mod closing;
pub mod intro;
pub mod puzzle;
pub mod treatment;
