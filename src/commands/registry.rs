use crate::store::Store;
use std::collections::HashMap;
use thiserror::Error;

/// An error surfaced by a command handler, formatted on the wire as
/// `ERR <message>`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("missing argument for {0}")]
    Arity(&'static str),
    #[error("{0}")]
    Other(String),
}

impl CommandError {
    pub fn other(msg: impl Into<String>) -> Self {
        CommandError::Other(msg.into())
    }
}

/// A command handler: pure with respect to its arguments and the shared
/// store, with no captured state of its own.
pub type CommandFn = fn(&Store, &[String]) -> Result<String, CommandError>;

pub type Registry = HashMap<&'static str, CommandFn>;

/// Builds the registry shared by the TCP front-end, the REPL, and the script
/// engine's `LET`/bare-command dispatch.
pub fn build_registry() -> Registry {
    let mut registry: Registry = HashMap::new();

    registry.insert("SET", crate::commands::handlers::set);
    registry.insert("GET", crate::commands::handlers::get);
    registry.insert("DEL", crate::commands::handlers::del);
    registry.insert("EXISTS", crate::commands::handlers::exists);
    registry.insert("LPUSH", crate::commands::handlers::lpush);
    registry.insert("RPUSH", crate::commands::handlers::rpush);
    registry.insert("LPOP", crate::commands::handlers::lpop);
    registry.insert("RPOP", crate::commands::handlers::rpop);
    registry.insert("LRANGE", crate::commands::handlers::lrange);
    registry.insert("SADD", crate::commands::handlers::sadd);
    registry.insert("SREM", crate::commands::handlers::srem);
    registry.insert("SMEMBERS", crate::commands::handlers::smembers);
    registry.insert("KEYS", crate::commands::handlers::keys);
    registry.insert("FLUSHDB", crate::commands::handlers::flushdb);
    registry.insert("INFO", crate::commands::handlers::info);
    registry.insert("EXPIRE", crate::commands::handlers::expire);
    registry.insert("TTL", crate::commands::handlers::ttl);
    registry.insert("SNAPSHOT", crate::commands::handlers::snapshot);

    registry.insert("REGSCRIPT", crate::commands::script_handlers::regscript);
    registry.insert("RUNSCRIPT", crate::commands::script_handlers::runscript);
    registry.insert("EVAL", crate::commands::script_handlers::eval);

    registry
}

/// Commands a script is permitted to run, directly or via `LET`.
///
/// `REGSCRIPT`/`RUNSCRIPT`/`EVAL` are deliberately excluded: a script cannot
/// recursively register or invoke another script.
pub const SCRIPT_WHITELIST: &[&str] = &[
    "SET", "GET", "DEL", "EXISTS", "LPUSH", "RPUSH", "LPOP", "RPOP", "LRANGE", "SADD", "SREM",
    "SMEMBERS",
];
