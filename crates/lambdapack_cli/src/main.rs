mod args;
mod config;
mod types;

use std::{process::ExitCode, time::Instant};

use ansi_term::Colour;
use args::Commands;
use clap::Parser;
use config::{FileConfig, resolve_plan};
use tracing_subscriber::EnvFilter;

use lambdapack::{Bundler, EntryDescriptor, OutputAsset};

fn print_entries(entries: &[EntryDescriptor]) {
  let dim = Colour::White.dimmed();
  for entry in entries {
    println!("  {} {}", dim.paint("•"), entry.relative);
  }
}

fn print_output_assets(outputs: &[OutputAsset]) {
  let mut left = 0;
  let mut right = 0;

  let mut assets = Vec::with_capacity(outputs.len());

  for output in outputs {
    let size = format!("{:.2}", output.content.len() as f64 / 1024.0);

    if size.len() > right {
      right = size.len();
    }

    if output.filename.len() > left {
      left = output.filename.len();
    }

    assets.push((output.filename.as_str(), size, output.is_chunk()));
  }

  let dim = Colour::White.dimmed();
  let color = Colour::Cyan;

  for (filename, size, is_chunk) in assets {
    let asset_type = if is_chunk { "chunk" } else { "map  " };
    let filename_len = filename.len();

    println!(
      "{}{}{:left$} {}{}{:right$}{} kB",
      dim.paint("<DIR>/"),
      color.paint(filename),
      "",
      dim.paint(asset_type),
      dim.paint(" │ size: "),
      "",
      size,
      left = left - filename_len,
      right = right - size.len()
    );
  }
}

fn print_errors(errors: &[anyhow::Error]) {
  for error in errors {
    eprintln!("{} {:#}", Colour::Red.paint("Error:"), error);
  }
  eprintln!("\n{} Build failed", Colour::Red.paint("✘"));
}

fn init_tracing() {
  let filter = EnvFilter::try_from_env("LAMBDAPACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> ExitCode {
  init_tracing();
  let args = Commands::parse();
  let silent = args.silent;

  let cwd = match std::env::current_dir() {
    Ok(current_dir) => args.input.cwd.as_ref().map_or_else(|| current_dir.clone(), |cwd| current_dir.join(cwd)),
    Err(error) => {
      print_errors(&[error.into()]);
      return ExitCode::FAILURE;
    }
  };
  let plan = match FileConfig::load(&cwd, args.input.config.as_deref())
    .and_then(|file| resolve_plan(args, cwd, file))
  {
    Ok(plan) => plan,
    Err(error) => {
      print_errors(&[error]);
      return ExitCode::FAILURE;
    }
  };

  if !silent {
    println!(
      "{} in {} mode: {}",
      Colour::Cyan.bold().paint("Building"),
      Colour::White.bold().paint(plan.mode.to_string()),
      plan.entries
    );
  }

  let start = Instant::now();
  let entries = match lambdapack::discover_entries(&plan.cwd, &plan.entries) {
    Ok(entries) => entries,
    Err(errors) => {
      print_errors(&errors);
      return ExitCode::FAILURE;
    }
  };
  if !silent {
    print_entries(&entries);
  }

  let mut options = plan.options;
  options.input = Some(entries.iter().map(EntryDescriptor::to_input_item).collect());
  let result = match Bundler::new(options) {
    Ok(bundler) => bundler.write().await,
    Err(errors) => Err(errors),
  };

  match result {
    Ok(output) => {
      if !silent {
        for warning in &output.warnings {
          println!("{} {:#}", Colour::Yellow.paint("Warning:"), warning);
        }
        println!();
        print_output_assets(&output.assets);
      }

      let elapsed = format!("{:.2} ms", start.elapsed().as_secs_f64() * 1000.0);
      if !silent {
        println!(
          "\n{} Build complete! Finished in {}",
          Colour::Green.paint("✔"),
          Colour::White.bold().paint(elapsed)
        );
      }
      ExitCode::SUCCESS
    }
    Err(errors) => {
      print_errors(&errors);
      ExitCode::FAILURE
    }
  }
}
