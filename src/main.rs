use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use rpn::{ops::DEFAULT_PADDING, shell::{Flow, Paint, Shell}, Registry, Rpn};

#[derive(Parser)]
#[command(name = "rpn", version, about = "Reverse Polish Notation calculator", long_about = None)]
struct Cli {
	///expressions to run in order (expression mode)
	#[arg(short, long = "expr", num_args = 1.., conflicts_with = "file")]
	expr: Vec<String>,

	///files to run line by line, text after '#' is ignored (file mode)
	#[arg(short, long = "file", num_args = 1..)]
	file: Vec<PathBuf>,

	///enter interactive mode after expressions or files are finished
	#[arg(short, long)]
	inter: bool,

	///interactive prompt
	#[arg(short, long, default_value = "~~> ")]
	prompt: String,

	///operator listing padding multiplier, 10 or more is read as a percentage
	#[arg(long, default_value_t = DEFAULT_PADDING)]
	padding: f64,

	///disable ANSI colors
	#[arg(long)]
	no_color: bool,

	///report every failing token of a line instead of stopping at the first
	#[arg(long)]
	keep_going: bool,
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_env("RPN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	let rpn = Rpn::with_registry(Registry::default().with_padding(cli.padding));
	let mut shell = Shell::new(rpn)
		.with_paint(Paint {enabled: !cli.no_color})
		.keep_going(cli.keep_going);

	let res = match (cli.expr.is_empty(), cli.file.is_empty()) {
		(true, true) => interactive_mode(&mut shell, &cli.prompt),	//no flags: interactive
		(false, _) => expression_mode(&mut shell, &cli.expr, cli.inter.then_some(cli.prompt.as_str())),
		(_, false) => file_mode(&mut shell, &cli.file, cli.inter.then_some(cli.prompt.as_str())),
	};
	match res {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("! {e}");
			ExitCode::FAILURE
		}
	}
}

fn interactive_mode(shell: &mut Shell, prompt: &str) -> std::io::Result<()> {
	let mut rl = DefaultEditor::new().map_err(std::io::Error::other)?;
	let prompt = shell.prompt(prompt);
	println!("{}", shell.banner());
	loop {
		match rl.readline(&prompt) {
			Ok(line) => {
				if let Err(e) = rl.add_history_entry(line.as_str()) {
					debug!(%e, "unable to record history entry");
				}
				if shell.handle(&line, &mut rpn::stdio!())? == Flow::Exit {
					break;
				}
			},
			Err(ReadlineError::Interrupted|ReadlineError::Eof) => {
				debug!("input closed");
				break;
			},
			Err(e) => {return Err(std::io::Error::other(e));}
		}
	}
	Ok(())
}

///`inter` carries the prompt if interactive mode should follow
fn expression_mode(shell: &mut Shell, exprs: &[String], inter: Option<&str>) -> std::io::Result<()> {
	for expr in exprs {
		if shell.handle(expr, &mut rpn::stdio!())? == Flow::Exit {
			return Ok(());
		}
	}
	match inter {
		Some(p) => interactive_mode(shell, p),
		None => Ok(())
	}
}

fn file_mode(shell: &mut Shell, files: &[PathBuf], inter: Option<&str>) -> std::io::Result<()> {
	for file in files {
		let script = match std::fs::read_to_string(file) {
			Ok(s) => s,
			Err(err) => {
				eprintln!("! Unable to read file \"{}\": {err}", file.display());
				continue;
			}
		};
		info!(file = %file.display(), "running script");
		for line in script.lines() {
			let line = line.split_once('#').map_or(line, |(code, _)| code);	//remove comment
			if line.trim().is_empty() {continue;}
			if shell.handle(line, &mut rpn::stdio!())? == Flow::Exit {
				return Ok(());
			}
		}
	}
	match inter {
		Some(p) => interactive_mode(shell, p),
		None => Ok(())
	}
}
