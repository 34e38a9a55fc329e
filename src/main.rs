use clap::Parser;
use core_types::{PostId, UserId};
use dom::dom_utils::{collect_visible_text, outline_from_dom};
use net::{ApiConfig, DEFAULT_BASE_URL, FetchError, HttpApi};
use page::host::build_host_document;
use page::{DomEvent, PageController, PageError};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "postboard")]
#[command(about = "Render a user's posts and comment threads headlessly", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// User to select; without it the page falls back to user 1.
    #[arg(long, value_name = "ID")]
    user: Option<u64>,

    /// Click the comments button of this post (repeatable).
    #[arg(long = "expand", value_name = "POST_ID")]
    expand: Vec<u64>,

    #[arg(long, default_value_t = 400)]
    outline_cap: usize,

    /// Print the visible text instead of the DOM outline.
    #[arg(long)]
    text: bool,
}

#[derive(Debug, Error)]
enum HostError {
    #[error("cannot set up the API client: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Page(#[from] PageError),
}

async fn run(cli: Cli) -> Result<String, HostError> {
    let config = ApiConfig::default().with_base_url(cli.base_url);
    let api = HttpApi::new(&config)?;
    let doc = build_host_document().map_err(PageError::from)?;
    let mut page = PageController::attach(doc, api)?;

    let users = page.init_page().await?;
    log::info!("{users} users available");

    match cli.user {
        Some(id) => page.select_user(UserId(id)).await?,
        None => {
            let select = page.select_menu();
            page.dispatch(DomEvent::change(select, "")).await?
        }
    };

    for post_id in cli.expand.into_iter().map(PostId) {
        match page.button_for(post_id) {
            Some(button) => {
                page.dispatch(DomEvent::click(button)).await?;
            }
            None => log::warn!("post {post_id} is not on the page"),
        }
    }

    let doc = page.into_document();
    let tree = doc.materialize(doc.root()).map_err(PageError::from)?;
    if cli.text {
        let mut out = String::new();
        collect_visible_text(&tree, &mut out);
        Ok(out.trim_end().to_string())
    } else {
        Ok(outline_from_dom(&tree, cli.outline_cap).join("\n"))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
