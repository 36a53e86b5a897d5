//! The local interactive REPL (`furrdb --repl`).
//!
//! Reads lines from standard input and dispatches them through the same
//! registry a TCP client would use, so a command behaves identically either
//! way. `HELP`, `CLEAR`, and `EXIT` are local pseudo-commands that never
//! reach the registry.

use furrdb::protocol::dispatch_line;
use furrdb::{Registry, Store};
use std::io::{self, BufRead, Write};

const HELP_TEXT: &str = r#"
Available commands:
  SET key value
  GET key
  DEL key
  EXISTS key
  LPUSH key value...
  RPUSH key value...
  LPOP key
  RPOP key
  LRANGE key start end
  SADD key value...
  SREM key value...
  SMEMBERS key
  KEYS
  FLUSHDB
  INFO
  EXPIRE key seconds
  TTL key
  SNAPSHOT [path]
  REGSCRIPT script
  RUNSCRIPT hash [args...]
  EVAL script
  PING
  HELP
  CLEAR
  EXIT
"#;

/// Runs the REPL to completion (until `EXIT` or EOF on stdin).
pub async fn run(store: &Store, registry: &Registry) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("furrdb> ");
        let _ = stdout.flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed.to_uppercase().as_str() {
            "EXIT" => break,
            "HELP" => {
                println!("{}", HELP_TEXT);
                continue;
            }
            "CLEAR" => {
                print!("\x1b[2J\x1b[H");
                let _ = stdout.flush();
                continue;
            }
            _ => {}
        }

        if let Some((response, _)) = dispatch_line(store, registry, trimmed) {
            println!("{}", response);
        }
    }
}
