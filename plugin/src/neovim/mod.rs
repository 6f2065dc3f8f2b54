pub mod autocmds;
pub mod commands;
pub mod functions;
pub mod notify;
