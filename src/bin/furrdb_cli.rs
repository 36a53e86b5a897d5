//! A scripted demo client: replays a file of commands against a running
//! furrdb server, printing each command and the response it got back.

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: furrdb-cli <scriptfile> [host:port]");
        std::process::exit(1);
    }
    let script_path = &args[1];
    let host = args.get(2).cloned().unwrap_or_else(|| furrdb_default_addr());

    let file = match File::open(script_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening script file: {}", e);
            std::process::exit(1);
        }
    };

    let mut conn = match TcpStream::connect(&host) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error connecting to server: {}", e);
            std::process::exit(1);
        }
    };
    let mut server_reader = BufReader::new(conn.try_clone().expect("clone tcp stream"));

    for line in BufReader::new(file).lines() {
        let line = line.expect("read script line");
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if writeln!(conn, "{}", line).is_err() {
            println!("Server closed connection.");
            return;
        }

        let mut response = String::new();
        match server_reader.read_line(&mut response) {
            Ok(0) | Err(_) => {
                println!("Server closed connection.");
                return;
            }
            Ok(_) => {}
        }

        print!("> {}\n{}", line, response);
        let _ = io::stdout().flush();
    }
}

fn furrdb_default_addr() -> String {
    format!("{}:{}", furrdb::DEFAULT_HOST, furrdb::DEFAULT_PORT)
}
