//! Interactive REPL over anndb stores.
//!
//! Commands: `help`, `version`, `use <name> <lsh|hnsw>`, `insert <name>
//! <key>...`, `delete <name> <key>...`, `search <name> <limit> <query...>`,
//! `save <name>`, `exit`. Errors print to stderr and the loop continues.

mod client;

use anndb_core::{Db, HnswStore, LshStore, VectorStore};
use clap::Parser;
use client::OllamaClient;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anndb", about = "Small vector database with HNSW and LSH indexes")]
struct Args {
    /// Embedding endpoint (Ollama-compatible /api/embed)
    #[arg(long, default_value = "http://localhost:11434")]
    endpoint: String,

    /// Embedding model name
    #[arg(long, default_value = "nomic-embed-text")]
    model: String,

    /// Directory for snapshot files
    #[arg(short, long, default_value = ".")]
    data_dir: String,
}

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("Available commands:");
    println!("  help                              - show this help");
    println!("  version                           - show version information");
    println!("  use <name> <lsh|hnsw>             - select the index variant and load <name>");
    println!("  insert <name> <key>...            - embed and insert keys");
    println!("  delete <name> <key>...            - embed and delete keys");
    println!("  search <name> <limit> <query...>  - find the nearest keys to a query");
    println!("  save <name>                       - snapshot <name> to disk");
    println!("  exit                              - quit");
}

struct Repl {
    args: Args,
    client: OllamaClient,
    db: Option<Db>,
}

impl Repl {
    fn new(args: Args) -> Self {
        let client = OllamaClient::new(args.endpoint.clone(), args.model.clone());
        Self {
            args,
            client,
            db: None,
        }
    }

    fn db(&self) -> Option<&Db> {
        if self.db.is_none() {
            eprintln!("no store selected; run `use <name> <lsh|hnsw>` first");
        }
        self.db.as_ref()
    }

    fn cmd_use(&mut self, args: &[&str]) {
        let [name, variant] = args else {
            eprintln!("usage: use <name> <lsh|hnsw>");
            return;
        };
        let name = name.to_lowercase();
        let store: Box<dyn VectorStore> = match variant.to_lowercase().as_str() {
            "lsh" => Box::new(LshStore::with_dir(&self.args.data_dir)),
            "hnsw" => Box::new(HnswStore::with_dir(&self.args.data_dir)),
            other => {
                eprintln!("store of type {other} not available");
                return;
            }
        };
        if let Err(e) = store.load(&name) {
            eprintln!("load {name}: {e}");
            return;
        }
        match self.db.take() {
            Some(mut db) => {
                db.set_store(store);
                self.db = Some(db);
            }
            None => self.db = Some(Db::new(Box::new(self.client.clone()), store)),
        }
        println!("using {variant} store {name}");
    }

    fn cmd_insert(&self, args: &[&str]) {
        let [name, keys @ ..] = args else { return };
        let Some(db) = self.db() else { return };
        for key in keys {
            if let Err(e) = db.insert(&name.to_lowercase(), key) {
                eprintln!("could not insert key {key}: {e}");
            }
        }
    }

    fn cmd_delete(&self, args: &[&str]) {
        let [name, keys @ ..] = args else { return };
        let Some(db) = self.db() else { return };
        for key in keys {
            match db.delete(&name.to_lowercase(), key) {
                Ok(true) => {}
                Ok(false) => eprintln!("key {key} was not present"),
                Err(e) => eprintln!("could not delete key {key}: {e}"),
            }
        }
    }

    fn cmd_search(&self, args: &[&str]) {
        let [name, limit, query @ ..] = args else {
            eprintln!("usage: search <name> <limit> <query...>");
            return;
        };
        if query.is_empty() {
            eprintln!("usage: search <name> <limit> <query...>");
            return;
        }
        let Ok(limit) = limit.parse::<usize>() else {
            eprintln!("limit must be a non-negative integer, got {limit}");
            return;
        };
        let Some(db) = self.db() else { return };
        match db.search(&name.to_lowercase(), &query.join(" "), limit) {
            Ok(results) => {
                for key in results {
                    println!("{key}");
                }
            }
            Err(e) => eprintln!("search failed: {e}"),
        }
    }

    fn cmd_save(&self, args: &[&str]) {
        let [name] = args else {
            eprintln!("usage: save <name>");
            return;
        };
        let Some(db) = self.db() else { return };
        match db.save(&name.to_lowercase()) {
            Ok(()) => println!("saved {name}"),
            Err(e) => eprintln!("save failed: {e}"),
        }
    }

    fn dispatch(&mut self, line: &str) -> bool {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            return true;
        };
        match command.to_lowercase().as_str() {
            "help" => print_help(),
            "version" => println!("anndb v{VERSION}"),
            "exit" | "quit" => {
                println!("Goodbye!");
                return false;
            }
            "use" => self.cmd_use(args),
            "insert" => self.cmd_insert(args),
            "delete" => self.cmd_delete(args),
            "search" => self.cmd_search(args),
            "save" => self.cmd_save(args),
            other => println!("Unknown command: {other}\nType 'help' for available commands."),
        }
        true
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut repl = Repl::new(args);

    println!("Welcome to anndb");
    println!("Type 'help' for available commands or 'exit' to quit.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("error reading input: {e}");
                continue;
            }
        }
        if !repl.dispatch(line.trim()) {
            break;
        }
    }
}
