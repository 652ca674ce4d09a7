//! `oc-nav` command line: inspect identifiers, URLs, routes and request keys

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use oc_nav::dedup::{build_request_key, RequestTracker};
use oc_nav::guard::HttpTransport;
use oc_nav::ident::{CreatorRef, EntityRef, IdClassifier};
use oc_nav::routes::{parse_location_with, Location, UrlBuilder};
use oc_nav::sync::{NavigateOptions, Router};
use oc_nav::{logging, NavConfig, NavSession};
use parking_lot::Mutex;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Router that only remembers where it was asked to go
#[derive(Debug, Default)]
struct CapturingRouter {
    navigations: Mutex<Vec<(String, NavigateOptions)>>,
}

impl Router for CapturingRouter {
    fn navigate(&self, path: &str, options: NavigateOptions) {
        self.navigations.lock().push((path.to_string(), options));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Command::new("oc-nav")
        .version(oc_nav::VERSION)
        .about("Corpus/document route inspection")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log verbosity (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify an identifier as id, slug or unknown")
                .arg(Arg::new("value").required(true)),
        )
        .subcommand(
            Command::new("url")
                .about("Build a canonical URL")
                .arg(
                    Arg::new("kind")
                        .required(true)
                        .value_parser(["corpus", "document"]),
                )
                .arg(Arg::new("slug").long("slug").help("Entity slug"))
                .arg(Arg::new("creator").long("creator").help("Entity creator slug"))
                .arg(
                    Arg::new("corpus-slug")
                        .long("corpus-slug")
                        .help("Parent corpus slug (documents only)"),
                )
                .arg(
                    Arg::new("corpus-creator")
                        .long("corpus-creator")
                        .help("Parent corpus creator slug (documents only)"),
                )
                .arg(
                    Arg::new("annotation")
                        .long("annotation")
                        .short('a')
                        .action(ArgAction::Append)
                        .help("Selected annotation id (repeatable)"),
                ),
        )
        .subcommand(
            Command::new("route")
                .about("Parse a location and show the resulting selection")
                .arg(Arg::new("location").required(true))
                .arg(
                    Arg::new("resolve")
                        .long("resolve")
                        .action(ArgAction::SetTrue)
                        .help("Resolve placeholders against the GraphQL endpoint"),
                )
                .arg(
                    Arg::new("token")
                        .long("token")
                        .env("OC_NAV_TOKEN")
                        .hide_env_values(true)
                        .help("Bearer token for the GraphQL endpoint"),
                ),
        )
        .subcommand(
            Command::new("key")
                .about("Render a request deduplication key ('-' marks a missing part)")
                .arg(Arg::new("category").required(true))
                .arg(Arg::new("parts").num_args(0..)),
        )
        .subcommand(Command::new("config").about("Print the effective configuration"));

    let matches = cli.get_matches();

    let config_path = matches.get_one::<PathBuf>("config");
    let config = NavConfig::load(config_path.map(PathBuf::as_path))
        .context("failed to load configuration")?;
    logging::init(&config, matches.get_count("verbose"))?;

    match matches.subcommand() {
        Some(("classify", args)) => classify(&config.classifier(), args),
        Some(("url", args)) => url(&config.url_builder(), args),
        Some(("route", args)) => route(&config, args).await,
        Some(("key", args)) => key(args),
        Some(("config", _)) => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn classify(classifier: &IdClassifier, args: &ArgMatches) -> Result<()> {
    let value = args.get_one::<String>("value").map_or("", String::as_str);
    let decoded = IdClassifier::decode_global_id(value);
    print_json(&json!({
        "value": value,
        "type": classifier.identifier_type(value),
        "valid_id": classifier.is_valid_id(value),
        "slug": classifier.is_slug(value),
        "global_id": decoded.map(|d| json!({ "type_name": d.type_name, "pk": d.pk })),
    }))
}

fn entity(slug: Option<&String>, creator: Option<&String>) -> EntityRef {
    let mut entity = EntityRef::new("");
    if let Some(slug) = slug {
        entity = entity.with_slug(slug.as_str());
    }
    if let Some(creator) = creator {
        entity = entity.with_creator(CreatorRef::new("").with_slug(creator.as_str()));
    }
    entity
}

fn url(urls: &UrlBuilder, args: &ArgMatches) -> Result<()> {
    let target = entity(args.get_one("slug"), args.get_one("creator"));
    let built = match args.get_one::<String>("kind").map(String::as_str) {
        Some("corpus") => urls.corpus_url(&target),
        _ => {
            let corpus = args
                .contains_id("corpus-slug")
                .then(|| entity(args.get_one("corpus-slug"), args.get_one("corpus-creator")));
            urls.document_url(&target, corpus.as_ref())
        }
    };
    let annotations: Vec<&String> = args
        .get_many::<String>("annotation")
        .map(Iterator::collect)
        .unwrap_or_default();
    let built = urls.with_annotations(&built, &annotations);

    if urls.is_unresolved(&built) {
        anyhow::bail!("cannot build a canonical URL: slug or creator missing");
    }
    println!("{built}");
    Ok(())
}

async fn route(config: &NavConfig, args: &ArgMatches) -> Result<()> {
    let raw = args.get_one::<String>("location").map_or("/", String::as_str);
    let location = Location::parse(raw);
    let parsed = parse_location_with(&location, &config.annotation_param, &config.classifier());

    let router = Arc::new(CapturingRouter::default());
    let session = NavSession::new(config, router.clone());
    session.on_location_change(&location);

    let report = if args.get_flag("resolve") {
        let mut transport = HttpTransport::new(config.graphql_endpoint.clone());
        if let Some(token) = args.get_one::<String>("token") {
            transport = transport.with_auth_token(token.as_str());
        }
        let loader = session.loader(Arc::new(transport), RequestTracker::global().clone());
        Some(session.resolve(&location, &loader).await?)
    } else {
        None
    };

    let redirect = router.navigations.lock().last().map(|(path, _)| path.clone());
    print_json(&json!({
        "location": location.to_string(),
        "route": parsed.route,
        "annotation_ids": parsed.annotation_ids,
        "selection": session.store().snapshot(),
        "unresolved": report.map(|r| r.unresolved),
        "redirect": redirect,
    }))
}

fn key(args: &ArgMatches) -> Result<()> {
    let category = args.get_one::<String>("category").map_or("", String::as_str);
    let parts = args
        .get_many::<String>("parts")
        .into_iter()
        .flatten()
        .map(|part| (part != "-").then_some(part.as_str()));
    println!("{}", build_request_key(category, parts));
    Ok(())
}
