use std::io;
use std::process::ExitCode;

use molt::{Context, DestRoot, RuleSet, Summary, Zone};

mod flags;

fn main() -> ExitCode {
    let flags = flags::Starling::from_env_or_exit();

    let level = match (flags.quiet, flags.verbose) {
        (true, _) => tracing::Level::WARN,
        (false, true) => tracing::Level::DEBUG,
        (false, false) => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(flags) {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(error) => {
            tracing::error!(%error, "conversion failed");
            ExitCode::FAILURE
        }
    }
}

fn run(flags: flags::Starling) -> molt::Result<Summary> {
    let rules = RuleSet::new(
        split_list(flags.taxonomies.as_deref().unwrap_or("tags,categories")),
        split_list(flags.extra_root_keys.as_deref().unwrap_or("")),
    );

    // Dry runs must not create the destination either.
    let dest = if flags.dry_run {
        DestRoot::plain(&flags.dest)
    } else {
        std::fs::create_dir_all(&flags.dest)?;
        DestRoot::confined(&flags.dest)
    };

    let context = Context {
        source: flags.source,
        dest,
        zone: Zone::new(flags.timezone.as_deref().unwrap_or("")),
        aliases: flags.aliases,
        dry_run: flags.dry_run,
    };

    let summary = molt::convert_site(&context, &rules)?;
    tracing::info!(
        total = summary.total,
        succeeded = summary.succeeded(),
        failed = summary.failed,
        "conversion complete",
    );

    Ok(summary)
}

fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }

    value.split(',').map(str::to_string).collect()
}
