use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use sitegen_core::{SiteGenConfig, SiteStore};
use sitegen_document::{GeneratorInputs, SiteId};
use sitegen_server::{telemetry, App};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("sitegen")
        .version(sitegen_server::VERSION)
        .about("AI site generator for home-service businesses")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .env("SITEGEN_CONFIG")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .arg(
            Arg::new("store-dir")
                .long("store-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Override the site store directory"),
        )
        .subcommand(
            Command::new("serve").about("Serve POST /api/ai-edit").arg(
                Arg::new("bind")
                    .long("bind")
                    .help("Listen address, e.g. 127.0.0.1:3000"),
            ),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate a new site and store it")
                .arg(Arg::new("industry").long("industry").required(true))
                .arg(Arg::new("company").long("company").required(true))
                .arg(Arg::new("location").long("location").required(true))
                .arg(Arg::new("phone").long("phone").required(true))
                .arg(
                    Arg::new("brand-color")
                        .long("brand-color")
                        .help("Brand color, e.g. #2563eb"),
                ),
        )
        .subcommand(
            Command::new("edit")
                .about("Apply a natural-language edit to a stored site")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_parser(value_parser!(SiteId)),
                )
                .arg(Arg::new("instruction").long("instruction").required(true)),
        )
        .subcommand(
            Command::new("publish")
                .about("Deploy a stored site")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_parser(value_parser!(SiteId)),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List stored sites")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<SiteGenConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SiteGenConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SiteGenConfig::default(),
    }
    .apply_env();

    if let Some(dir) = matches.get_one::<PathBuf>("store-dir") {
        config = config.with_store_dir(dir.clone());
    }
    if let Some(("serve", args)) = matches.subcommand() {
        if let Some(bind) = args.get_one::<String>("bind") {
            config = config.with_bind_addr(bind.clone());
        }
    }
    config.validate()?;
    Ok(config)
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a String> {
    args.get_one::<String>(name)
        .with_context(|| format!("--{name} is required"))
}

fn site_id(args: &ArgMatches) -> anyhow::Result<SiteId> {
    args.get_one::<SiteId>("id").copied().context("--id is required")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    telemetry::init_tracing(matches.get_flag("log-json"));

    let config = load_config(&matches)?;
    let app = App::build(config).await?;

    match matches.subcommand() {
        Some(("serve", _)) => {
            let bind = app.config().bind_addr.clone();
            app.serve(&bind).await?;
        }
        Some(("generate", args)) => {
            let mut inputs = GeneratorInputs::new(
                required(args, "industry")?,
                required(args, "company")?,
                required(args, "location")?,
                required(args, "phone")?,
            );
            if let Some(color) = args.get_one::<String>("brand-color") {
                inputs = inputs.with_brand_color(color);
            }
            let session = app.session();
            let id = session.generate(inputs).await?;
            println!("{id}");
        }
        Some(("edit", args)) => {
            let id = site_id(args)?;
            let session = app.session();
            session.load(id).await?;
            session.apply_ai_edit(required(args, "instruction")?).await?;
            session.flush().await?;
            println!("{id} updated");
        }
        Some(("publish", args)) => {
            let session = app.session();
            session.load(site_id(args)?).await?;
            let deployment = session.publish().await?;
            println!("{}", deployment.url);
        }
        Some(("list", args)) => {
            let sites = app.store().get_all().await?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&sites)?);
            } else {
                for site in sites {
                    println!(
                        "{}  {}  {}",
                        site.id,
                        site.last_saved.to_rfc3339(),
                        site.data.contact.company_name
                    );
                }
            }
        }
        Some((other, _)) => bail!("unknown command '{other}'"),
        None => bail!("no command given"),
    }
    Ok(())
}
