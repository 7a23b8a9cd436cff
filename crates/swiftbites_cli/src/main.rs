//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `swiftbites_core` linkage.
//! - With a store path argument, open (or create) the store and print
//!   per-kind entity counts.

use std::process::ExitCode;
use swiftbites_core::{EntityKind, RecipeStore};

fn main() -> ExitCode {
    println!("swiftbites_core ping={}", swiftbites_core::ping());
    println!("swiftbites_core version={}", swiftbites_core::core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let store = match RecipeStore::open(&path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open store `{path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    for kind in EntityKind::ALL {
        match store.count(kind) {
            Ok(count) => println!("{kind}={count}"),
            Err(err) => {
                eprintln!("failed to count {kind}: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    match store.close() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("failed to close store: {err}");
            ExitCode::FAILURE
        }
    }
}
