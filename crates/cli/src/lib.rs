pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod scheduler;
pub mod session;
pub mod slots;

#[cfg(test)]
pub(crate) mod testing;
