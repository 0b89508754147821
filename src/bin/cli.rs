//! MiniDB CLI Client
//!
//! Sends statements to a MiniDB server and prints each JSON response.

use std::io::{self, BufRead, BufReader, BufWriter};
use std::net::TcpStream;
use std::process;

use clap::Parser;
use minidb::protocol::{read_result, write_statement};
use minidb::Result;

/// MiniDB CLI
#[derive(Parser, Debug)]
#[command(name = "minidb-cli")]
#[command(about = "CLI for the MiniDB server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:5555")]
    server: String,

    /// Statement to run (repeatable); reads stdin lines when omitted
    #[arg(short, long)]
    execute: Vec<String>,
}

struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            reader,
            writer: BufWriter::new(stream),
        })
    }

    /// Send one statement and print the reply; false once the server hangs up
    fn run(&mut self, statement: &str) -> Result<bool> {
        write_statement(&mut self.writer, statement)?;
        match read_result(&mut self.reader)? {
            Some(response) => {
                println!("{}", response);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", args.server, e);
            process::exit(1);
        }
    };

    let statements: Box<dyn Iterator<Item = String>> = if args.execute.is_empty() {
        Box::new(io::stdin().lock().lines().map_while(|line| line.ok()))
    } else {
        Box::new(args.execute.into_iter())
    };

    for statement in statements {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        match client.run(statement) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }
}
