//TODO: update clap to remove the need for this
#![allow(dangerous_implicit_autorefs)]

use std::io;

use anyhow::anyhow;
use clap::{
    crate_authors, crate_description, crate_name, crate_version, App, AppSettings, Arg, ArgMatches, SubCommand,
};
use tarfs::{cat, list, Options};
use tracing_subscriber::EnvFilter;

fn value_of<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    matches
        .value_of(name)
        .ok_or_else(|| anyhow!("missing argument '{}'", name))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let arg_archive = Arg::with_name("archive")
        .help("Archive file")
        .short("a")
        .long("archive")
        .required(true)
        .takes_value(true)
        .value_name("FILE");

    let arg_verify = Arg::with_name("verify")
        .help("Reject headers with a bad checksum")
        .long("verify");

    let matches = App::new(crate_name!())
        .author(crate_authors!(", "))
        .about(crate_description!())
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("list")
                .about("List archive")
                .arg(&arg_archive)
                .arg(&arg_verify)
                .arg(
                    Arg::with_name("long")
                        .help("Show type, permissions, owner, size and mtime")
                        .short("l")
                        .long("long"),
                ),
        )
        .subcommand(
            SubCommand::with_name("cat")
                .about("Print files, with '@/' paths read from the archive")
                .arg(&arg_archive)
                .arg(&arg_verify)
                .arg(
                    Arg::with_name("paths")
                        .help("Files to print")
                        .required(true)
                        .multiple(true)
                        .value_name("PATH"),
                ),
        )
        .get_matches();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(matches) = matches.subcommand_matches("list") {
        let options = Options::new().verify_checksums(matches.is_present("verify"));
        list(
            value_of(matches, "archive")?,
            matches.is_present("long"),
            options,
            &mut out,
        )
    } else if let Some(matches) = matches.subcommand_matches("cat") {
        let options = Options::new().verify_checksums(matches.is_present("verify"));
        let paths: Vec<&str> = matches.values_of("paths").into_iter().flatten().collect();
        cat(value_of(matches, "archive")?, &paths, options, &mut out)
    } else {
        Ok(())
    }?;

    Ok(())
}
