use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use eyre::WrapErr as _;
use gemini_smoke::{Client, PriceRange, TestCase, config, report::Checked, runner};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
	#[command(flatten)]
	settings: config::SettingsFlags,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Check connectivity, then ask for recommendations and validate their prices
	Run {
		/// `<product>=<price range>`, repeatable. Defaults to earbuds, smartphones and laptops.
		#[clap(long = "case")]
		cases: Vec<TestCase>,
		#[clap(short, long, default_value = "medium")]
		model: gemini_smoke::Model,
		/// Ask Gemini for JSON output rather than free text
		#[clap(short, long)]
		json: bool,
	},
	/// Validate a saved completion against a price range, without calling the API
	Check {
		file: PathBuf,
		#[clap(short, long)]
		range: PriceRange,
	},
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
	v_utils::clientside!();
	let cli = Cli::parse();

	config::init(cli.settings).wrap_err("couldn't load config")?;

	let passed = match cli.command {
		Command::Run { cases, model, json } => {
			let cases = match cases.is_empty() {
				true => runner::default_cases(),
				false => cases,
			};
			let mut client = Client::new().model(model);
			if json {
				client = client.force_json();
			}
			let report = runner::run(&client, &cases).await;
			print!("{report}");
			report.passed()
		}
		Command::Check { file, range } => {
			let raw = std::fs::read_to_string(&file).wrap_err_with(|| format!("reading {}", file.display()))?;
			let checked = Checked::new(&raw, range);
			print!("{checked}");
			checked.passed()
		}
	};

	Ok(exit_code(passed))
}

fn exit_code(passed: bool) -> ExitCode {
	match passed {
		true => ExitCode::SUCCESS,
		false => ExitCode::FAILURE,
	}
}
