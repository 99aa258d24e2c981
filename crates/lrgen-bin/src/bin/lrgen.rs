use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{debug, LevelFilter};
use lrgen::{
    automaton::StateId,
    compile,
    grammar::{Grammar, LoaderOptions},
    table::{ParseTable, TableKind},
    Compilation, CompileOptions, Limits,
};
use petgraph::dot::Dot;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TableArg {
    Lr0,
    Slr1,
    Diff,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DotArg {
    Nfa,
    Dfa,
}

/// Builds LR(0) and SLR(1) parse tables for a context-free grammar
#[derive(Parser, Debug)]
#[command(name = "lrgen")]
struct Args {
    /// Grammar file: `Lhs -> a b | c ;` groups
    #[arg(value_name = "GRAMMAR")]
    grammar: PathBuf,

    /// Which table to print
    #[arg(long, value_enum, default_value = "all")]
    table: TableArg,

    /// Print an automaton in graphviz dot format instead of tables
    #[arg(long, value_enum)]
    dot: Option<DotArg>,

    /// Emit tables as JSON
    #[arg(long)]
    json: bool,

    /// Keep the quotes around terminal names
    #[arg(long)]
    keep_quotes: bool,

    /// Name of the synthesized start symbol
    #[arg(long, default_value = "S'")]
    start_name: String,

    /// Fail instead of growing past the fixed store sizes
    #[arg(long)]
    fixed_capacity: bool,

    /// More output; repeat for debug and trace logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> CompileOptions {
        CompileOptions {
            loader: LoaderOptions {
                start_name: self.start_name.clone(),
                strip_quotes: !self.keep_quotes,
            },
            limits: if self.fixed_capacity {
                Limits::fixed()
            } else {
                Limits::unbounded()
            },
        }
    }

    fn selected<'a>(&self, c: &'a Compilation) -> Vec<&'a ParseTable> {
        match self.table {
            TableArg::Lr0 => vec![&c.lr0],
            TableArg::Slr1 => vec![&c.slr1],
            TableArg::Diff => vec![&c.diff],
            TableArg::All => vec![&c.lr0, &c.slr1, &c.diff],
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    columns: Vec<&'a str>,
    tables: Vec<&'a ParseTable>,
}

fn table_title(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Lr0 => "LR(0)",
        TableKind::Slr1 => "SLR(1)",
        TableKind::Diff => "LR(0) - SLR(1)",
    }
}

fn print_table(grammar: &Grammar, table: &ParseTable) {
    let header: Vec<&str> = table
        .columns()
        .iter()
        .map(|s| grammar.symbol_name(*s))
        .collect();
    let rows: Vec<Vec<String>> = (0..table.rows())
        .map(|state| {
            table
                .row(StateId::new(state))
                .map(|(_, actions)| {
                    actions
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    println!(
        "{} table, {} conflicts",
        table_title(table.kind()),
        table.conflict_count()
    );
    print!("{:>5} |", "state");
    for (name, w) in header.iter().zip(&widths) {
        print!(" {:>w$}", name, w = w);
    }
    println!();
    for (state, row) in rows.iter().enumerate() {
        print!("{:>5} |", state);
        for (cell, w) in row.iter().zip(&widths) {
            print!(" {:>w$}", cell, w = w);
        }
        println!();
    }
    println!();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.grammar)
        .with_context(|| format!("cannot read {}", args.grammar.display()))?;
    let compilation = compile(&source, &args.options())
        .with_context(|| format!("{}", args.grammar.display()))?;
    debug!(
        "{} items, {} NFA states, {} DFA states",
        compilation.items.len(),
        compilation.nfa.state_count(),
        compilation.dfa.state_count()
    );

    if let Some(which) = args.dot {
        let graph = match which {
            DotArg::Nfa => compilation.nfa.to_graph(&compilation.grammar),
            DotArg::Dfa => compilation
                .dfa
                .to_graph(&compilation.grammar, &compilation.items),
        };
        println!("{}", Dot::new(&graph));
        return Ok(());
    }

    let tables = args.selected(&compilation);
    if args.json {
        let output = JsonOutput {
            columns: compilation
                .lr0
                .columns()
                .iter()
                .map(|s| compilation.grammar.symbol_name(*s))
                .collect(),
            tables,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for table in tables {
            print_table(&compilation.grammar, table);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
