use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

const CLAIM_HELP: &str = "Where links are claimed: on-spawn (parent claims before starting a task) \
    or on-fetch (each task claims right before fetching)";

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("skitter")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("skitter")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Log every task transition (overrides RUST_LOG)")
                .required(false),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about("Crawl a host or collection of hosts over HTTP, up to a maximum link depth.")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The URL to start crawling from")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of URLs to crawl")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth; 0 fetches nothing, 1 fetches only the start page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"claim" <POLICY>)
                        .required(false)
                        .help(CLAIM_HELP)
                        .value_parser(["on-spawn", "on-fetch"])
                        .default_value("on-spawn"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("demo")
                .about("Crawl a canned link graph offline (the bundled demo site by default).")
                .arg(
                    arg!(--"fixture" <PATH>)
                        .required(false)
                        .help("JSON file mapping ids to {\"body\": .., \"links\": [..]}")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-r --"root" <ID>)
                        .required(false)
                        .help("Identifier to start from (default: the demo root)"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(--"claim" <POLICY>)
                        .required(false)
                        .help(CLAIM_HELP)
                        .value_parser(["on-spawn", "on-fetch"])
                        .default_value("on-spawn"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
}
