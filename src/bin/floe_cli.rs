use std::{
    error::Error,
    io::{self, Read, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use clap::Parser;
use floe::{Command, ConnectOptions, Cursor, connect, prompt};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Hostname of the node to connect to
    host: String,
    /// RPC port of the node
    #[arg(long, default_value_t = floe::DEFAULT_PORT)]
    port: u16,
    /// Keyspace to select after the handshake
    #[arg(long, default_value = floe::DEFAULT_KEYSPACE)]
    keyspace: String,
    /// Username to authenticate as
    #[arg(long)]
    user: Option<String>,
    /// Password for the given user
    #[arg(long)]
    password: Option<String>,
    /// Exact protocol version to request from the node
    #[arg(long)]
    cql_version: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize env_logger; For logging to STDOUT/STDERR
    env_logger::init();

    let cli = Cli::parse();
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let opts = ConnectOptions {
        port: cli.port,
        keyspace: cli.keyspace,
        user: cli.user,
        password: cli.password,
        cql_version: cli.cql_version,
        ..ConnectOptions::default()
    };
    let mut session = connect(&cli.host, opts)?;
    println!("connected to {session}");

    let stdin = io::stdin();
    let stdout = io::stdout();

    while !interrupted.load(Ordering::SeqCst) {
        let cmd = match prompt(stdin.lock(), stdout.lock()) {
            Ok(c) => c,
            Err(e) => {
                if interrupted.load(Ordering::SeqCst) {
                    break;
                }
                eprintln!("{e}");
                continue;
            }
        };

        match cmd {
            Command::Exit => break,
            Command::Statement(s) if s.trim().is_empty() => {}
            Command::Statement(statement) => {
                let mut cursor = match session.cursor() {
                    Ok(cursor) => cursor,
                    Err(e) => {
                        eprintln!("session error: {e}");
                        break;
                    }
                };
                match cursor.execute(&statement) {
                    Ok(outcome) => print_result(&mut cursor, outcome),
                    Err(e) => eprintln!("query error: {e}"),
                }
            }
        }
    }

    session.close();
    Ok(())
}

fn print_result<T: Read + Write>(cursor: &mut Cursor<'_, T>, outcome: Option<u64>) {
    if cursor.columns().is_empty() {
        match outcome {
            Some(n) => println!("ok, {n} row(s)"),
            None => println!("ok"),
        }
        return;
    }

    let names: Vec<&str> = cursor.columns().iter().map(|c| c.name.as_str()).collect();
    println!("{}", names.join(" | "));

    match cursor.fetch_all() {
        Ok(rows) => {
            for row in &rows {
                let cells: Vec<String> = row.values().iter().map(ToString::to_string).collect();
                println!("{}", cells.join(" | "));
            }
            println!("({} row(s))", rows.len());
        }
        Err(e) => eprintln!("fetch error: {e}"),
    }
}
