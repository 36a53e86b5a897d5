//! `REGSCRIPT` / `RUNSCRIPT` / `EVAL`, wired into the shared registry.
//!
//! These three are registered like any other command, but are not themselves
//! members of the script whitelist — a script cannot recursively register or
//! run another script.

use super::registry::CommandError;
use crate::store::Store;

pub fn regscript(_store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Arity("REGSCRIPT"));
    }
    let text = args.join(" ");
    Ok(crate::script::register(&text))
}

pub fn runscript(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Arity("RUNSCRIPT"));
    }
    let hash = &args[0];
    match crate::script::lookup(hash) {
        Some(text) => {
            crate::script::eval(store, &text).map_err(|e| CommandError::other(e.to_string()))
        }
        None => Ok(String::new()),
    }
}

pub fn eval(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Arity("EVAL"));
    }
    let text = args.join(" ");
    crate::script::eval(store, &text).map_err(|e| CommandError::other(e.to_string()))
}
