// File I/O operations

pub mod emails;
pub mod error;
pub mod file;
pub mod html;
pub mod json;
pub mod masterlist;
pub mod report;
pub mod sql;

pub use error::IoError;
pub use masterlist::MasterlistEntry;
