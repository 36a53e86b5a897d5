//! The embedded scripting DSL.
//!
//! A script is a `;`-delimited sequence of statements, each one of:
//!
//! - `LET <var> = <CMD> <args…>` — runs a whitelisted command, binds its
//!   result to `<var>`.
//! - `IF <var> == <literal>` / `END` — skips to the matching `END` when the
//!   comparison fails. Blocks nest.
//! - any other non-empty line — a bare whitelisted command.
//!
//! Scripts may also be registered under the SHA-256 hash of their exact text
//! (`REGSCRIPT`) and invoked later by hash (`RUNSCRIPT`), or evaluated
//! directly without storing (`EVAL`).

use crate::commands::registry::SCRIPT_WHITELIST;
use crate::store::Store;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use thiserror::Error;

const MAX_STATEMENTS: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("script too long (max {max} lines)")]
    TooLong { max: usize },
    #[error("invalid LET syntax on line {line}")]
    InvalidLet { line: usize },
    #[error("invalid IF syntax on line {line}")]
    InvalidIf { line: usize },
    #[error("command {cmd} not allowed in LET on line {line}")]
    NotAllowedInLet { cmd: String, line: usize },
    #[error("command {cmd} not allowed in script on line {line}")]
    NotAllowedInScript { cmd: String, line: usize },
    #[error("unknown command '{cmd}' in LET on line {line}")]
    UnknownInLet { cmd: String, line: usize },
    #[error("unknown command '{cmd}' on line {line}")]
    UnknownInScript { cmd: String, line: usize },
    #[error("{message} on line {line}")]
    Handler { message: String, line: usize },
}

/// The skip state of the script evaluator. `IF` failing a comparison moves
/// `Running` to `Skipping(1)`; a nested `IF` while skipping deepens it;
/// `END` shallows it back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptState {
    Running,
    Skipping(u32),
}

/// Registered scripts, keyed by the lowercase hex SHA-256 of their source
/// text. Process-lifetime, not persisted.
fn registered_scripts() -> &'static Mutex<HashMap<String, String>> {
    static SCRIPTS: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
    SCRIPTS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Stores `script` under the hex SHA-256 of its text and returns the hash.
pub fn register(script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(script.as_bytes());
    let hash = hex_encode(&hasher.finalize());
    registered_scripts()
        .lock()
        .unwrap()
        .insert(hash.clone(), script.to_string());
    hash
}

/// Looks up a previously registered script by hash.
pub fn lookup(hash: &str) -> Option<String> {
    registered_scripts().lock().unwrap().get(hash).cloned()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Evaluates a script's statements against `store`, returning the result of
/// the last statement that actually ran (skipped statements don't count).
pub fn eval(store: &Store, script: &str) -> Result<String, ScriptError> {
    let statements: Vec<&str> = script.split(';').collect();
    if statements.len() > MAX_STATEMENTS {
        return Err(ScriptError::TooLong {
            max: MAX_STATEMENTS,
        });
    }

    let registry = crate::commands::build_registry();
    let mut vars: HashMap<String, String> = HashMap::new();
    let mut last = String::new();
    let mut state = ScriptState::Running;

    for (i, raw) in statements.iter().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let ScriptState::Skipping(depth) = state {
            state = if line.starts_with("IF ") {
                ScriptState::Skipping(depth + 1)
            } else if line == "END" {
                if depth > 1 {
                    ScriptState::Skipping(depth - 1)
                } else {
                    ScriptState::Running
                }
            } else {
                state
            };
            continue;
        }

        if let Some(result) = eval_let(&registry, store, line, line_no, &mut vars)? {
            if !result.is_empty() {
                last = result;
            }
            continue;
        }
        if let Some(skip) = eval_if(line, line_no, &vars)? {
            if skip {
                state = ScriptState::Skipping(1);
            }
            continue;
        }
        if line == "END" {
            continue;
        }

        let result = run_whitelisted(&registry, store, line, line_no, false)?;
        if !result.is_empty() {
            last = result;
        }
    }

    Ok(last)
}

/// Returns `Ok(Some(result))` if `line` was a `LET` statement.
fn eval_let(
    registry: &crate::commands::Registry,
    store: &Store,
    line: &str,
    line_no: usize,
    vars: &mut HashMap<String, String>,
) -> Result<Option<String>, ScriptError> {
    if !line.starts_with("LET ") {
        return Ok(None);
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 || parts[2] != "=" {
        return Err(ScriptError::InvalidLet { line: line_no });
    }
    let var_name = parts[1].to_string();
    let rest = parts[3..].join(" ");
    let result = run_whitelisted(registry, store, &rest, line_no, true)?;
    vars.insert(var_name, result.clone());
    Ok(Some(result))
}

/// Returns `Ok(Some(should_skip))` if `line` was an `IF` statement.
fn eval_if(
    line: &str,
    line_no: usize,
    vars: &HashMap<String, String>,
) -> Result<Option<bool>, ScriptError> {
    if !line.starts_with("IF ") {
        return Ok(None);
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 || parts[2] != "==" {
        return Err(ScriptError::InvalidIf { line: line_no });
    }
    let actual = vars.get(parts[1]).map(String::as_str).unwrap_or("");
    Ok(Some(actual != parts[3]))
}

fn run_whitelisted(
    registry: &crate::commands::Registry,
    store: &Store,
    command_line: &str,
    line_no: usize,
    in_let: bool,
) -> Result<String, ScriptError> {
    let tokens: Vec<&str> = command_line.split_whitespace().collect();
    let cmd = tokens[0].to_uppercase();
    let cmd_args: Vec<String> = tokens[1..].iter().map(|s| s.to_string()).collect();

    if !SCRIPT_WHITELIST.contains(&cmd.as_str()) {
        return Err(if in_let {
            ScriptError::NotAllowedInLet { cmd, line: line_no }
        } else {
            ScriptError::NotAllowedInScript { cmd, line: line_no }
        });
    }
    let handler = registry.get(cmd.as_str()).ok_or_else(|| {
        if in_let {
            ScriptError::UnknownInLet {
                cmd: cmd.clone(),
                line: line_no,
            }
        } else {
            ScriptError::UnknownInScript {
                cmd: cmd.clone(),
                line: line_no,
            }
        }
    })?;
    handler(store, &cmd_args).map_err(|e| ScriptError::Handler {
        message: e.to_string(),
        line: line_no,
    })
}
