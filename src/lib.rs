pub mod autobind;
pub mod capability;
pub mod cli;
pub mod config;
pub mod enforcer;
pub mod logging;
pub mod policy;
pub mod scenario;
pub mod types;
