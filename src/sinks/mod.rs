//! Concrete [`Sink`](crate::core::Sink) implementations

pub mod file;

pub use file::FileSink;
