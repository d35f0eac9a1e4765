pub mod disc;
pub mod fs;
