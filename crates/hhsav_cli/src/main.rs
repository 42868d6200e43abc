//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `hhsav_core` linkage without the Flutter runtime.
//! - Optionally inspect a save and dump it as indented JSON.
//!
//! Usage: `hhsav_cli [<save> [<out.json>]]`
//! Set `HHSAV_LOG_DIR` to an absolute directory to write rolling logs at
//! the build's default level.

use hhsav_core::{EditorConfig, Format, Session};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("hhsav_core ping={}", hhsav_core::ping());
    println!("hhsav_core version={}", hhsav_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(save) = args.first() else {
        return ExitCode::SUCCESS;
    };

    if let Ok(log_dir) = std::env::var("HHSAV_LOG_DIR") {
        if let Err(err) = hhsav_core::init_logging("", &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let mut session = Session::new(EditorConfig::from_env());
    if let Err(err) = session.load_file(save) {
        eprintln!("load failed [{}]: {err}", err.code());
        return ExitCode::FAILURE;
    }

    match session.section_summaries() {
        Ok(summaries) => {
            for summary in summaries {
                match summary.child_count {
                    Some(count) => {
                        println!("{} {} children={count}", summary.name, summary.kind.label())
                    }
                    None => println!("{} {}", summary.name, summary.kind.label()),
                }
            }
        }
        Err(err) => {
            eprintln!("inspect failed [{}]: {err}", err.code());
            return ExitCode::FAILURE;
        }
    }

    if let Some(out) = args.get(1) {
        match session.export_to(Format::Interchange, out) {
            Ok(path) => println!("exported {}", path.display()),
            Err(err) => {
                eprintln!("export failed [{}]: {err}", err.code());
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
