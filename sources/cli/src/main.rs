use std::process::exit;

use accessors::{AccessMapCache, AccessMapOptions, AccessorRecord, ClassPath};
use args::Cli;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::fmt;

mod args;

fn render(class_name: &str, record: &AccessorRecord) -> String {
    format!("{}.{}", class_name, record)
}

fn main() {
    let args = Cli::parse();

    let format = fmt::format()
        .with_ansi(true)
        .without_time()
        .with_level(true)
        .with_target(false)
        .with_thread_names(false)
        .with_source_location(args.verbose)
        .compact();

    let level = if args.verbose {
        Level::TRACE
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .event_format(format)
        .with_writer(std::io::stderr)
        .init();

    let mut class_path = ClassPath::new();
    for cp in &args.classpath {
        class_path.add_path(cp);
    }

    if class_path.paths().is_empty() {
        class_path.add_path(".");
    }

    let options = AccessMapOptions {
        accessor_prefix: args.prefix.clone(),
    };
    let cache = AccessMapCache::with_options(class_path, options);

    let mut failed = false;
    for class_name in &args.classes {
        let map = match cache.get(class_name) {
            Ok(map) => map,
            Err(e) => {
                error!("Could not analyse {}: {:#}", class_name, e);
                failed = true;
                continue;
            }
        };

        info!("{} has {} accessor(s)", class_name, map.len());

        for record in map.sorted() {
            println!("{}", render(class_name, record));
        }
    }

    if failed {
        exit(1);
    }
}
