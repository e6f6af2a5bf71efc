mod commands;
mod config;
mod terminal;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    ChannelClient, ChannelError, Collaborators, EditorSession, KeyEvent, WsChannelClient,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::{
    commands::{Command, HELP},
    terminal::{TerminalEditor, TerminalPanels, TerminalStatus},
};

#[derive(Parser, Debug)]
#[command(about = "Terminal host for a collaborative editing session")]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    user_id: Option<String>,
    #[arg(long)]
    user_name: Option<String>,
    #[arg(long)]
    color_id: Option<u32>,
    /// TOML settings file. Defaults to `collab.toml` when present.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn apply(self, settings: &mut config::Settings) {
        if let Some(v) = self.server_url {
            settings.server_url = v;
        }
        if let Some(v) = self.user_id {
            settings.user_id = v;
        }
        if let Some(v) = self.user_name {
            settings.user_name = v;
        }
        if let Some(v) = self.color_id {
            settings.color_id = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    args.apply(&mut settings);

    let url = Url::parse(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let channel = WsChannelClient::connect(url, settings.transport_options());
    let events = channel.subscribe_events();

    let editor = Arc::new(TerminalEditor::default());
    let panels = Arc::new(TerminalPanels);
    let collaborators = Collaborators {
        channel: channel.clone(),
        editor: editor.clone(),
        ui: Arc::new(TerminalStatus::default()),
        tests: panels.clone(),
        org_imports: panels.clone(),
        outsource: panels,
    };
    let session = Arc::new(
        EditorSession::new(settings.identity(), collaborators, settings.session_timings())
            .context("failed to wire editor session")?,
    );

    let pump = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.run(events).await }
    });

    println!(
        "editing as {} ({}); {HELP}",
        settings.user_name, settings.user_id
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match commands::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err:#}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(err) = execute(&session, &editor, command) {
            warn!(error = %err, "command failed");
        }
    }

    channel.shutdown();
    pump.abort();
    Ok(())
}

fn execute(
    session: &EditorSession,
    editor: &TerminalEditor,
    command: Command,
) -> Result<(), ChannelError> {
    match command {
        Command::Format => session.request_format(),
        Command::OrgImports => session.request_org_imports(),
        Command::RunTests => session.run_tests(),
        Command::Outsource => session.request_outsource(),
        Command::Commit(selection) => {
            editor.select(selection);
            session.force_commit()
        }
        Command::Select(selection) => {
            editor.select(selection);
            Ok(())
        }
        Command::Resolve(choices) => session.resolve_org_imports(choices),
        Command::Key(keystroke) => {
            let mut event = KeyEvent::new(keystroke);
            let claim = session.handle_key(&mut event);
            match claim.claimed_by() {
                Some(name) => println!("[keys] {keystroke} handled by {name}"),
                None => println!("[keys] {keystroke} passed through to the editor"),
            }
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Quit => Ok(()),
    }
}
