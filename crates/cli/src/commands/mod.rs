pub mod console;
pub mod database;
pub mod run;
pub mod runs;

pub use console::*;
pub use database::*;
pub use run::*;
pub use runs::*;
