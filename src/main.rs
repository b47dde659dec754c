use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use personctl::action::ActionInvoker;
use personctl::config::{self, Config};
use personctl::editors::{FieldEditors, Key, OnSuccess};
use personctl::email::EmailDiscovery;
use personctl::ids::{DocId, ExcludedKind, PersonId};
use personctl::page::{MemoryPage, PageEvent};
use personctl::panel::{control_id, PictureAdded, PictureCandidate, PictureSearchPanel};
use personctl::transport::HttpTransport;

#[derive(Parser, Debug)]
#[command(name = "personctl", version, about = "Edit Person entities in a document repository")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Repository URL, overriding `base_url` from the config file
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Print page events and element contents as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add, remove, or promote aliases
    #[command(subcommand)]
    Alias(AliasCommand),
    /// Add or remove NAME:VALUE metadata
    #[command(subcommand)]
    Metadata(MetadataCommand),
    /// Attach a free-text note
    Note(NoteArgs),
    /// Add addresses or look for them in a document
    #[command(subcommand)]
    Email(EmailCommand),
    /// Detach a person from a document's authors
    #[command(subcommand)]
    Author(AuthorCommand),
    /// Manage attached and canonical photos
    #[command(subcommand)]
    Photo(PhotoCommand),
    /// Clear an exclusion list so excluded items show again
    Excluded(ExcludedArgs),
    /// Search for pictures and add results
    #[command(subcommand)]
    Pictures(PicturesCommand),
}

#[derive(Args, Debug)]
struct SuccessArgs {
    /// Navigate here on success instead of reloading
    #[arg(long, value_name = "URL")]
    navigate: Option<String>,

    /// Leave the page alone on success
    #[arg(long, conflicts_with = "navigate", default_value_t = false)]
    stay: bool,
}

impl SuccessArgs {
    fn on_success(&self) -> OnSuccess {
        match (&self.navigate, self.stay) {
            (Some(target), _) => OnSuccess::Navigate(target.clone()),
            (None, true) => OnSuccess::Stay,
            (None, false) => OnSuccess::Reload,
        }
    }
}

#[derive(Args, Debug)]
struct AliasArgs {
    person: String,
    alias: String,
    #[command(flatten)]
    success: SuccessArgs,
}

#[derive(Subcommand, Debug)]
enum AliasCommand {
    Add(AliasArgs),
    Remove(AliasArgs),
    /// Make the alias the person's name
    Use(AliasArgs),
}

#[derive(Subcommand, Debug)]
enum MetadataCommand {
    Add {
        person: String,
        /// `NAME:VALUE`; the first colon separates
        #[arg(value_name = "NAME:VALUE")]
        pair: String,
        #[command(flatten)]
        success: SuccessArgs,
    },
    Remove {
        person: String,
        name: String,
        value: String,
        #[command(flatten)]
        success: SuccessArgs,
    },
}

#[derive(Args, Debug)]
struct NoteArgs {
    person: String,
    note: String,
    #[command(flatten)]
    success: SuccessArgs,
}

#[derive(Subcommand, Debug)]
enum EmailCommand {
    Add {
        person: String,
        address: String,
        #[command(flatten)]
        success: SuccessArgs,
    },
    /// List addresses found in a document
    Discover { person: String, doc: String },
}

#[derive(Subcommand, Debug)]
enum AuthorCommand {
    Remove {
        doc: String,
        person: String,
        #[command(flatten)]
        success: SuccessArgs,
    },
}

#[derive(Subcommand, Debug)]
enum PhotoCommand {
    Remove {
        person: String,
        doc: String,
        #[command(flatten)]
        success: SuccessArgs,
    },
    /// Make a photo the representative image
    Canonical {
        person: String,
        doc: String,
        #[command(flatten)]
        success: SuccessArgs,
    },
    RemoveCanonical {
        person: String,
        #[command(flatten)]
        success: SuccessArgs,
    },
}

#[derive(Clone, Debug, ValueEnum)]
enum ExcludedArg {
    Pictures,
    Authorship,
}

impl From<ExcludedArg> for ExcludedKind {
    fn from(arg: ExcludedArg) -> Self {
        match arg {
            ExcludedArg::Pictures => ExcludedKind::Pictures,
            ExcludedArg::Authorship => ExcludedKind::Authorship,
        }
    }
}

#[derive(Args, Debug)]
struct ExcludedArgs {
    person: String,
    #[arg(value_enum)]
    kind: ExcludedArg,
}

#[derive(Subcommand, Debug)]
enum PicturesCommand {
    /// Run the picture search and print the result panel
    Search { person: String },
    /// Add an image URL as a picture of the person
    Add(PictureAddArgs),
}

#[derive(Args, Debug)]
struct PictureAddArgs {
    person: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    url: String,
    /// Tried once if `--url` cannot be added
    #[arg(long)]
    backup_url: String,
    #[arg(long)]
    category: Option<String>,
    /// Make the new picture the canonical photo
    #[arg(long, default_value_t = false)]
    canonical: bool,
}

/// What a command found, besides page events
#[derive(Default, Serialize)]
struct Found {
    #[serde(skip_serializing_if = "Option::is_none")]
    addresses: Option<Vec<String>>,
    /// Document created by `pictures add`
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<String>,
}

#[derive(Serialize)]
struct Report {
    events: Vec<PageEvent>,
    elements: BTreeMap<String, String>,
    #[serde(flatten)]
    found: Found,
    ok: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let base_url = config.resolve_base_url(cli.base_url.as_deref())?;
    let transport = HttpTransport::new(&config.http).context("failed to build HTTP client")?;
    let invoker = ActionInvoker::new(base_url, transport);
    let page = MemoryPage::new(config.viewport.layout());

    let mut found = Found::default();
    let ok = run(cli.command, &config, &invoker, &page, &mut found).await;

    print_report(
        Report {
            events: page.events(),
            elements: page
                .contents()
                .into_iter()
                .map(|(id, html)| (id.to_string(), html))
                .collect(),
            found,
            ok,
        },
        cli.json,
    )?;

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Run one command. Failures have already been alerted on the page.
async fn run(
    command: Command,
    config: &Config,
    invoker: &ActionInvoker<HttpTransport>,
    page: &MemoryPage,
    found: &mut Found,
) -> bool {
    let editors = FieldEditors::new(invoker, page);

    match command {
        Command::Alias(AliasCommand::Add(args)) => editors
            .add_alias_on_key(
                &PersonId::new(args.person),
                &args.alias,
                Key::Enter,
                args.success.on_success(),
            )
            .await
            .is_ok(),
        Command::Alias(AliasCommand::Remove(args)) => editors
            .remove_alias(&PersonId::new(args.person), &args.alias, args.success.on_success())
            .await
            .is_ok(),
        Command::Alias(AliasCommand::Use(args)) => editors
            .use_alias_as_name(&PersonId::new(args.person), &args.alias, args.success.on_success())
            .await
            .is_ok(),
        Command::Metadata(MetadataCommand::Add {
            person,
            pair,
            success,
        }) => editors
            .add_metadata_on_key(&PersonId::new(person), &pair, Key::Enter, success.on_success())
            .await
            .is_ok(),
        Command::Metadata(MetadataCommand::Remove {
            person,
            name,
            value,
            success,
        }) => editors
            .remove_metadata(&PersonId::new(person), &name, &value, success.on_success())
            .await
            .is_ok(),
        Command::Note(args) => editors
            .add_note(&PersonId::new(args.person), &args.note, args.success.on_success())
            .await
            .is_ok(),
        Command::Email(EmailCommand::Add {
            person,
            address,
            success,
        }) => editors
            .add_email_address(&PersonId::new(person), &address, success.on_success())
            .await
            .is_ok(),
        Command::Email(EmailCommand::Discover { person, doc }) => {
            let discovery = EmailDiscovery::new(editors);
            match discovery.show(&DocId::new(doc), &PersonId::new(person)).await {
                Ok(addresses) => {
                    found.addresses = Some(addresses);
                    true
                }
                Err(_) => false,
            }
        }
        Command::Author(AuthorCommand::Remove {
            doc,
            person,
            success,
        }) => editors
            .remove_author(&DocId::new(doc), &PersonId::new(person), success.on_success())
            .await
            .is_ok(),
        Command::Photo(PhotoCommand::Remove {
            person,
            doc,
            success,
        }) => editors
            .remove_photo(&PersonId::new(person), &DocId::new(doc), success.on_success())
            .await
            .is_ok(),
        Command::Photo(PhotoCommand::Canonical {
            person,
            doc,
            success,
        }) => editors
            .make_canonical_photo(&PersonId::new(person), &DocId::new(doc), success.on_success())
            .await
            .is_ok(),
        Command::Photo(PhotoCommand::RemoveCanonical { person, success }) => editors
            .remove_canonical_photo(&PersonId::new(person), success.on_success())
            .await
            .is_ok(),
        Command::Excluded(args) => editors
            .show_excluded(&PersonId::new(args.person), args.kind.into())
            .await
            .is_ok(),
        Command::Pictures(PicturesCommand::Search { person }) => {
            let panel = PictureSearchPanel::new(editors);
            panel.reveal(&PersonId::new(person)).await.is_ok()
        }
        Command::Pictures(PicturesCommand::Add(args)) => {
            let panel = PictureSearchPanel::new(editors);
            let suffix = if args.canonical { "canon" } else { "add" };
            let candidate = PictureCandidate {
                person: PersonId::new(args.person),
                title: args.title,
                control: control_id(&args.url, suffix),
                photo_url: args.url,
                backup_url: args.backup_url,
                category: args.category.or_else(|| config.photo_category.clone()),
                make_canonical: args.canonical,
            };
            match panel.add_as_picture(&candidate).await {
                Ok(PictureAdded::Canonical(doc)) | Ok(PictureAdded::Attached(doc)) => {
                    found.document = Some(doc.to_string());
                    // Closing the session flushes the pending reload
                    panel.hide();
                    true
                }
                Err(_) => false,
            }
        }
    }
}

fn print_report(report: Report, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{text}");
        return Ok(());
    }

    if let Some(doc) = &report.found.document {
        println!("document {doc}");
    }

    for event in &report.events {
        match event {
            PageEvent::Reload => println!("reload"),
            PageEvent::Navigate { target } => println!("navigate {target}"),
            PageEvent::Alert { message } => eprintln!("error: {message}"),
        }
    }

    if let Some(addresses) = &report.found.addresses {
        if addresses.is_empty() {
            println!("No email addresses found.");
        }
        for address in addresses {
            println!("{address}");
        }
    } else {
        for (id, html) in &report.elements {
            println!("--- {id}");
            println!("{html}");
        }
    }

    Ok(())
}
