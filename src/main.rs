#![allow(clippy::multiple_crate_versions)]

//! CLI entry point for the `loccount` application.

fn main() -> anyhow::Result<()> {
    loccount::cli::run_from_cli()
}
