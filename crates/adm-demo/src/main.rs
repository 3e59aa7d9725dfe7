//! Drive the admin panel from the command line
//!
//! Registers the sample `Persona` entity over an in-memory store, seeds it
//! and dispatches one request through the recorded routes. Logs and audit
//! events go to stderr; `RUST_LOG` controls the filter.

use adm_panel::{Panel, PanelConfig, Response, ResponseBody};
use adm_test_utils::{persona_record, MemoryDataIntegrator, Persona, RecordingRouter, TestRequest, APP};
use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("adm-demo")
        .version(adm_panel::VERSION)
        .about("Admin panel over an in-memory Persona table")
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("TOML panel configuration"),
        )
        .arg(
            Arg::new("rows")
                .long("rows")
                .default_value("25")
                .value_parser(value_parser!(i64))
                .global(true)
                .help("Number of personas to seed"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("routes").about("Print every registered route"))
        .subcommand(
            Command::new("list")
                .about("Render the Persona list page")
                .arg(Arg::new("page").long("page").help("Page number"))
                .arg(Arg::new("per-page").long("per-page").help("Instances per page"))
                .arg(Arg::new("search").long("search").help("Search term")),
        )
        .subcommand(
            Command::new("view")
                .about("Render one Persona")
                .arg(Arg::new("id").long("id").required(true).help("Primary key")),
        )
        .subcommand(
            Command::new("form")
                .about("Render the add form, or the edit form with --id")
                .arg(Arg::new("id").long("id").help("Primary key to edit")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete one Persona")
                .arg(Arg::new("id").long("id").required(true).help("Primary key")),
        )
        .subcommand(
            Command::new("bulk-delete")
                .about("Delete several Personas")
                .arg(
                    Arg::new("ids")
                        .long("ids")
                        .required(true)
                        .value_delimiter(',')
                        .action(ArgAction::Append)
                        .help("Comma-separated primary keys"),
                ),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build(matches: &ArgMatches) -> Result<(Panel, Arc<RecordingRouter>)> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PanelConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => PanelConfig::default(),
    };
    let rows = matches.get_one::<i64>("rows").copied().unwrap_or_default();

    let router = Arc::new(RecordingRouter::new());
    let data = Arc::new(MemoryDataIntegrator::new());
    let mut panel = Panel::builder(router.clone(), data.clone()).config(config).build();
    let model = panel.register_app(APP, None, None)?.register_model(&Persona, None)?;
    for id in 1..=rows {
        data.insert(model.schema(), persona_record(id));
    }
    tracing::info!(rows, "seeded personas");
    Ok((panel, router))
}

fn print(response: &Response) -> Result<()> {
    eprintln!("status: {}", response.status);
    if let Some(location) = &response.location {
        eprintln!("location: {location}");
    }
    match &response.body {
        ResponseBody::Html(html) => println!("{html}"),
        ResponseBody::Json(value) => println!("{}", serde_json::to_string_pretty(value)?),
        ResponseBody::Empty => {}
    }
    Ok(())
}

fn with_query(mut request: TestRequest, args: &ArgMatches, pairs: &[(&str, &str)]) -> TestRequest {
    for (arg, param) in pairs {
        if let Some(value) = args.get_one::<String>(arg) {
            request = request.query(param, value);
        }
    }
    request
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = cli().get_matches();
    let (panel, router) = build(&matches)?;
    let app = panel.app(APP).ok_or_else(|| anyhow!("app '{APP}' missing"))?;
    let model = app.model("Persona").ok_or_else(|| anyhow!("model 'Persona' missing"))?;
    let base = model.full_link();

    let (path, request) = match matches.subcommand() {
        Some(("routes", _)) => {
            for (method, path) in router.routes() {
                println!("{:<6} {path}", method.as_str());
            }
            return Ok(());
        }
        Some(("list", args)) => {
            let request = with_query(
                TestRequest::get(),
                args,
                &[("page", "page"), ("per-page", "perPage"), ("search", "search")],
            );
            (base, request)
        }
        Some(("view", args)) => {
            let id = args.get_one::<String>("id").context("--id is required")?;
            (format!("{base}/{id}/view"), TestRequest::get())
        }
        Some(("form", args)) => match args.get_one::<String>("id") {
            Some(id) => (format!("{base}/{id}/edit"), TestRequest::get()),
            None => (format!("{base}/add"), TestRequest::get()),
        },
        Some(("delete", args)) => {
            let id = args.get_one::<String>("id").context("--id is required")?;
            (format!("{base}/{id}/view"), TestRequest::delete())
        }
        Some(("bulk-delete", args)) => {
            let ids: Vec<serde_json::Value> = args
                .get_many::<String>("ids")
                .into_iter()
                .flatten()
                .map(|id| id.parse::<i64>().map_or_else(|_| id.clone().into(), Into::into))
                .collect();
            let request = TestRequest::post().json(&serde_json::json!({ "ids": ids }));
            (format!("{base}/bulk-delete"), request)
        }
        _ => return Err(anyhow!("unknown command")),
    };

    let response = router
        .dispatch(&path, request)
        .await
        .ok_or_else(|| anyhow!("no route for {path}"))?;
    print(&response)
}
