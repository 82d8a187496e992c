mod file;

pub use file::{read_raw, Storage};
