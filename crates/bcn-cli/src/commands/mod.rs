pub mod breakpoints;
pub mod decode;
pub mod export;
pub mod validate;
