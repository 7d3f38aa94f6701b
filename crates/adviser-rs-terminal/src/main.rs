use std::io::Write;
use std::process::ExitCode;

use adviser_rs::dependency_graph::{self, DecisionPolicy, DependencyGraphWalker};
use adviser_rs::pipeline::{PipelineBuilder, PipelineBuilderContext, PipelineKind};
use adviser_rs::project::RecommendationType;
use adviser_rs::report::{AdviseOutput, ResultEnvelope};
use adviser_rs::resolver::{JustificationEntry, Resolver};

const EXIT_BAD_CONTEXT: u8 = 1;
const EXIT_CONFLICTING_OUTPUT: u8 = 2;
const EXIT_BAD_COUNT: u8 = 3;

fn main() -> ExitCode {
	env_logger::init();

	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",         "Show help");
		opts.optopt(  "r", "requirements", "Project requirements file (JSON)", "FILE");
		opts.optopt(  "t", "type",         "Recommendation type: stable, testing or latest", "TYPE");
		opts.optopt(  "o", "output",       "Where to write the result envelope, - for stdout", "FILE");
		opts.optopt(  "R", "report-output","Where to write the dependency-monkey report, - for stdout", "FILE");
		opts.optopt(  "",  "db",           "Package database snapshot to use instead of the default", "FILE");
		opts.optopt(  "",  "count",        "Number of stacks to produce", "N");
		opts.optopt(  "",  "beam-width",   "Beam width used by the resolver", "N");
		opts.optopt(  "",  "stack-output", "Stack sink: a directory, - for stdout or an http(s) URL", "SINK");
		opts.optopt(  "",  "seed",         "Seed for the decision function", "N");
		opts.optopt(  "",  "decision",     "Decision function: all, first or one-in-N", "NAME");
		opts.optopt(  "",  "context",      "Caller context forwarded to a remote sink (JSON)", "JSON");
		opts.optflag( "",  "dry-run",      "Only estimate the number of stacks, do not walk them");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { eprintln!("Unable to parse options: {}", e); return ExitCode::FAILURE }
		};

		if parsed_options.opt_present("h") || parsed_options.free.is_empty() {
			eprintln!("{}", opts.usage("Usage: adviser-rs-terminal advise|dependency-monkey [options]"));
			return ExitCode::FAILURE;
		}

		parsed_options
	};

	match parsed_options.free[0].as_str() {
		"advise" => advise(&parsed_options),
		"dependency-monkey" => dependency_monkey(&parsed_options),
		other => {
			eprintln!("Unknown subcommand {:?}", other);
			ExitCode::FAILURE
		}
	}
}

fn load_project(parsed_options: &getopts::Matches) -> Result<adviser_rs::Project, Error> {
	let path = parsed_options.opt_str("r")
		.ok_or_else(|| Error::MissingArgument("requirements"))?;
	let input = std::fs::read_to_string(&path).map_err(adviser_rs::Error::from)?;
	Ok(adviser_rs::Project::from_json(&input)?)
}

fn load_db(parsed_options: &getopts::Matches) -> Result<adviser_rs::PackageDb, Error> {
	match parsed_options.opt_str("db") {
		Some(path) => Ok(adviser_rs::PackageDb::load_from_path(path)?),
		None => {
			let options = adviser_rs::AdviserOptions::default();
			Ok(adviser_rs::PackageDb::load_from_disk(&options)?)
		}
	}
}

fn write_output(destination: Option<&str>, payload: &str) -> Result<(), Error> {
	match destination {
		None | Some("-") => {
			let mut stdout = std::io::stdout().lock();
			writeln!(stdout, "{}", payload).map_err(adviser_rs::Error::from)?;
		}
		Some(path) => std::fs::write(path, payload).map_err(adviser_rs::Error::from)?,
	}
	Ok(())
}

fn advise(parsed_options: &getopts::Matches) -> ExitCode {
	let defaults = adviser_rs::AdviserOptions::default();

	let recommendation_type = match parsed_options.opt_str("t") {
		Some(t) => match t.parse::<RecommendationType>() {
			Ok(t)  => t,
			Err(e) => { log::error!("{}", e); return ExitCode::FAILURE }
		},
		None => RecommendationType::Stable,
	};
	let count = match parsed_options.opt_get::<usize>("count") {
		Ok(n)  => n.unwrap_or_else(|| defaults.count()),
		Err(e) => { log::error!("Invalid count: {}", e); return ExitCode::from(EXIT_BAD_COUNT) }
	};
	let beam_width = match parsed_options.opt_get::<usize>("beam-width") {
		Ok(n)  => n.unwrap_or_else(|| defaults.beam_width()),
		Err(e) => { log::error!("Invalid beam width: {}", e); return ExitCode::FAILURE }
	};

	let parameters = serde_json::json!({
		"recommendation_type": recommendation_type.to_string(),
		"count": count,
		"beam_width": beam_width,
	});

	let project = match load_project(parsed_options) {
		Ok(p)  => p,
		Err(e) => { log::error!("Failed to load project: {}", e); return ExitCode::FAILURE }
	};
	let db = match load_db(parsed_options) {
		Ok(db) => db,
		Err(e) => { log::error!("Failed to open package database: {}", e); return ExitCode::FAILURE }
	};

	let context = PipelineBuilderContext::new(PipelineKind::Adviser, project.clone(), recommendation_type);
	let pipeline = PipelineBuilder::new(context)
		.with_default_units()
		.build();
	log::debug!("Assembled pipeline: {:?}", pipeline.summary());

	let resolution = Resolver::new(&db, &project, pipeline)
		.beam_width(beam_width)
		.count(count)
		.resolve();

	let envelope = match resolution {
		Ok(resolution) => {
			let mut envelope = ResultEnvelope::new(parameters);
			envelope.report = resolution.stack_info;
			match resolution.states.first() {
				Some(best) => {
					envelope.report.extend(best.justification().iter().cloned());
					envelope.output = Some(AdviseOutput {
						requirements: project.clone(),
						requirements_locked: best.to_lockfile(),
					});
				}
				None => envelope.error = true,
			}
			envelope.input = serde_json::to_value(&project).ok();
			envelope
		}
		/* A solver failure is a reportable outcome, anything else is a bug
		 * or an environment problem and bubbles up as a plain error. */
		Err(error @ adviser_rs::Error::Solver(_)) => ResultEnvelope::from_error(parameters, &error),
		Err(error) => {
			log::error!("Advise failed: {}", error);
			return ExitCode::FAILURE;
		}
	};

	let failed = envelope.error;
	let payload = match serde_json::to_string_pretty(&envelope) {
		Ok(p)  => p,
		Err(e) => { log::error!("Failed to serialize result: {}", e); return ExitCode::FAILURE }
	};
	if let Err(e) = write_output(parsed_options.opt_str("o").as_deref(), &payload) {
		log::error!("Failed to write result: {}", e);
		return ExitCode::FAILURE;
	}

	if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Where enumerated stacks end up.
enum StackSink {
	Directory(std::path::PathBuf),
	Stdout,
	Remote(String),
}

impl StackSink {
	fn parse(raw: &str) -> Self {
		if raw == "-" {
			StackSink::Stdout
		} else if raw.starts_with("http://") || raw.starts_with("https://") {
			StackSink::Remote(raw.to_string())
		} else {
			StackSink::Directory(std::path::PathBuf::from(raw))
		}
	}
}

fn dependency_monkey(parsed_options: &getopts::Matches) -> ExitCode {
	let count = match parsed_options.opt_get::<usize>("count") {
		Ok(n) => n.unwrap_or(usize::MAX),
		Err(e) => { log::error!("Invalid count: {}", e); return ExitCode::from(EXIT_BAD_COUNT) }
	};
	if count == 0 {
		log::error!("Count has to be a positive number");
		return ExitCode::from(EXIT_BAD_COUNT);
	}

	let sink = match parsed_options.opt_str("stack-output") {
		Some(raw) => StackSink::parse(&raw),
		None => { log::error!("No stack output provided."); return ExitCode::FAILURE }
	};

	let context = match parsed_options.opt_str("context") {
		Some(raw) => {
			if !matches!(sink, StackSink::Remote(_)) {
				log::error!("A context makes sense only with a remote stack output.");
				return ExitCode::from(EXIT_CONFLICTING_OUTPUT);
			}
			match serde_json::from_str::<serde_json::Value>(&raw) {
				Ok(v)  => Some(v),
				Err(e) => { log::error!("Invalid context supplied: {}", e); return ExitCode::from(EXIT_BAD_CONTEXT) }
			}
		}
		None => None,
	};

	let decision = match parsed_options.opt_str("decision") {
		Some(raw) => match raw.parse::<DecisionPolicy>() {
			Ok(d)  => d,
			Err(e) => { log::error!("{}", e); return ExitCode::FAILURE }
		},
		None => DecisionPolicy::All,
	};
	let seed = match parsed_options.opt_get::<u64>("seed") {
		Ok(s)  => s,
		Err(e) => { log::error!("Invalid seed: {}", e); return ExitCode::FAILURE }
	};

	let project = match load_project(parsed_options) {
		Ok(p)  => p,
		Err(e) => { log::error!("Failed to load project: {}", e); return ExitCode::FAILURE }
	};
	let db = match load_db(parsed_options) {
		Ok(db) => db,
		Err(e) => { log::error!("Failed to open package database: {}", e); return ExitCode::FAILURE }
	};

	let parameters = serde_json::json!({
		"count": if count == usize::MAX { serde_json::Value::Null } else { count.into() },
		"decision": format!("{:?}", decision),
		"seed": seed,
		"dry_run": parsed_options.opt_present("dry-run"),
	});

	if parsed_options.opt_present("dry-run") {
		let estimate = match dependency_graph::estimate_stacks(&db, &project) {
			Ok(n)  => n,
			Err(e) => { log::error!("Failed to estimate stacks: {}", e); return ExitCode::FAILURE }
		};
		println!("{}", estimate);
		return ExitCode::SUCCESS;
	}

	let mut walker = DependencyGraphWalker::new(&db, &project)
		.decision(decision)
		.count(count);
	if let Some(seed) = seed {
		walker = walker.seed(seed);
	}

	let mut envelope = ResultEnvelope::new(parameters);
	envelope.input = serde_json::to_value(&project).ok();

	let client = reqwest::blocking::Client::new();
	let mut generated = 0usize;

	for (index, stack) in walker.enumerate() {
		let stack = match stack {
			Ok(stack) => stack,
			Err(error) => {
				envelope.error = true;
				envelope.report.push(JustificationEntry::error(format!("{} ({})", error, error.kind())));
				break;
			}
		};

		let result = match &sink {
			StackSink::Stdout => emit_stack_stdout(&project, &stack),
			StackSink::Directory(dir) => emit_stack_directory(dir, index, &project, &stack),
			StackSink::Remote(url) => {
				emit_stack_remote(&client, url, context.as_ref(), &project, &stack)
					.map(|inspection_id| {
						envelope.report.push(JustificationEntry {
							package_name: None,
							entry_type: adviser_rs::resolver::JustificationType::Info,
							message: format!("Submitted inspection {}", inspection_id),
							link: None,
						});
					})
			}
		};

		match result {
			Ok(()) => generated += 1,
			Err(error) => {
				log::error!("Failed to output stack {}: {}", index, error);
				envelope.error = true;
				envelope.report.push(JustificationEntry::error(error.to_string()));
				break;
			}
		}
	}

	log::info!("Generated {} stack(s)", generated);

	let failed = envelope.error;
	let payload = match serde_json::to_string_pretty(&envelope) {
		Ok(p)  => p,
		Err(e) => { log::error!("Failed to serialize report: {}", e); return ExitCode::FAILURE }
	};
	if let Some(report_output) = parsed_options.opt_str("R") {
		if let Err(e) = write_output(Some(&report_output), &payload) {
			log::error!("Failed to write report: {}", e);
			return ExitCode::FAILURE;
		}
	}

	if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn emit_stack_stdout(project: &adviser_rs::Project, stack: &dependency_graph::PinnedStack) -> Result<(), Error> {
	let payload = serde_json::to_string(&serde_json::json!({
		"requirements": project,
		"requirements_locked": stack.to_lockfile(),
	}))?;
	let mut stdout = std::io::stdout().lock();
	writeln!(stdout, "{}", payload).map_err(adviser_rs::Error::from)?;
	Ok(())
}

fn emit_stack_directory(dir: &std::path::Path, index: usize, project: &adviser_rs::Project, stack: &dependency_graph::PinnedStack) -> Result<(), Error> {
	let stack_dir = dir.join(format!("{:06}", index));
	std::fs::create_dir_all(&stack_dir).map_err(adviser_rs::Error::from)?;
	std::fs::write(stack_dir.join("requirements.json"), project.to_json()?)
		.map_err(adviser_rs::Error::from)?;
	let locked = serde_json::to_string_pretty(&stack.to_lockfile())?;
	std::fs::write(stack_dir.join("requirements_locked.json"), locked)
		.map_err(adviser_rs::Error::from)?;
	Ok(())
}

/// POST one stack to a remote inspection endpoint, returning the inspection
/// id the service assigned to it.
fn emit_stack_remote(client: &reqwest::blocking::Client, url: &str, context: Option<&serde_json::Value>, project: &adviser_rs::Project, stack: &dependency_graph::PinnedStack) -> Result<String, Error> {
	let mut body = match context {
		Some(context) => context.clone(),
		None => serde_json::json!({}),
	};
	body["requirements"] = serde_json::to_value(project)?;
	body["requirements_locked"] = serde_json::to_value(stack.to_lockfile())?;

	let response: serde_json::Value = client.post(url)
		.json(&body)
		.send()?
		.error_for_status()?
		.json()?;

	response.get("inspection_id")
		.and_then(|v| v.as_str())
		.map(|s| s.to_string())
		.ok_or(Error::MissingInspectionId)
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("adviser-rs error: {0}")]
	AdviserError(#[from] adviser_rs::Error),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),
	#[error("Missing argument: {0}")]
	MissingArgument(&'static str),
	#[error("Inspection endpoint returned no inspection id")]
	MissingInspectionId,
}
