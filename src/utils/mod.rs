pub mod atomic_file;
pub mod logging;

pub use atomic_file::write_atomically;
pub use logging::truncate_text;
