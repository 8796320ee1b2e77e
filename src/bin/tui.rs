//! TomeSphere DM terminal client
//!
//! Manages local accounts and follows, and runs an interactive direct
//! message session against the SQLite backend.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tomesphere_dm::{
    backend::SqliteBackend,
    config::{ClientConfig, DEFAULT_CONFIG_PATH},
    models::Profile,
    tui::{ui::ui, App, Screen},
};

#[derive(Parser)]
#[command(name = "tomesphere-dm", version, about = "TomeSphere direct messages")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Message database (overrides the configuration file)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or update a user profile
    AddUser {
        /// User id
        #[arg(long)]
        id: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Avatar image URL
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Follow another user so they show up in the contact list
    Follow {
        /// Follower id
        #[arg(long = "as")]
        me: String,
        /// User to follow
        target: String,
    },
    /// Open the interactive client
    Chat {
        /// Sign in as this user (defaults to the last one)
        #[arg(long = "as")]
        me: Option<String>,
        /// Open the conversation with this user directly
        #[arg(long)]
        with: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Command::AddUser { id, name, avatar } => {
            tomesphere_dm::init();
            let backend = SqliteBackend::open(&config.db_path, config.poll_interval())?;
            let mut profile = Profile::new(id, name);
            profile.avatar_url = avatar;
            backend.add_profile(&profile)?;
            println!("Saved profile {} ({})", profile.id, profile.display_name());
        }
        Command::Follow { me, target } => {
            tomesphere_dm::init();
            let backend = SqliteBackend::open(&config.db_path, config.poll_interval())?;
            backend.follow(&me, &target)?;
            println!("{} now follows {}", me, target);
        }
        Command::Chat { me, with } => {
            let Some(me) = me.or_else(|| config.user_id.clone()) else {
                bail!("No user to sign in as; pass --as <user-id>");
            };

            init_file_logging(&config)?;
            let backend = SqliteBackend::open(&config.db_path, config.poll_interval())?;
            backend.sign_in(&me)?;

            config.user_id = Some(me.clone());
            if let Err(e) = config.save(&cli.config) {
                tracing::warn!("Failed to remember session: {}", e);
            }

            run_chat(backend, me, with, &config).await?;
        }
    }

    Ok(())
}

fn init_file_logging(config: &ClientConfig) -> anyhow::Result<()> {
    let path = PathBuf::from(&config.log_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    tomesphere_dm::init_with_writer(file, &config.log_filter);
    Ok(())
}

async fn run_chat(
    backend: SqliteBackend,
    me: String,
    with: Option<String>,
    config: &ClientConfig,
) -> anyhow::Result<()> {
    let mut app = App::new(backend, me, config.toast_durations());
    app.show_contact_list().await;
    if let Some(counterpart) = with {
        app.open_chat(counterpart).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<T: ratatui::backend::Backend>(
    terminal: &mut Terminal<T>,
    app: &mut App<SqliteBackend>,
) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    app.should_quit = true;
                }

                match app.current_screen {
                    Screen::ContactList => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            app.should_quit = true;
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            if let Some(screen) = &mut app.contact_list_screen {
                                screen.next();
                            }
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            if let Some(screen) = &mut app.contact_list_screen {
                                screen.previous();
                            }
                        }
                        KeyCode::Enter => {
                            // Show the hint before the mount blocks the loop
                            app.mark_opening_chat();
                            terminal.draw(|f| ui(f, app))?;
                            app.open_selected_chat().await;
                        }
                        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            app.toasts.dismiss_latest();
                        }
                        KeyCode::Char('r') => {
                            app.show_contact_list().await;
                        }
                        _ => {}
                    },
                    Screen::ChatView => match key.code {
                        KeyCode::Esc => {
                            app.back_to_contact_list().await;
                        }
                        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            let dismissed = app
                                .view
                                .as_mut()
                                .is_some_and(|view| view.toasts_mut().dismiss_latest());
                            if !dismissed {
                                app.toasts.dismiss_latest();
                            }
                        }
                        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                            if let Some(view) = &mut app.view {
                                view.push_char(c);
                            }
                        }
                        KeyCode::Backspace => {
                            if let Some(view) = &mut app.view {
                                view.backspace();
                            }
                        }
                        KeyCode::Enter => {
                            app.send_message_in_chat();
                        }
                        KeyCode::Up | KeyCode::PageUp => {
                            let count = app.message_count();
                            if let Some(screen) = &mut app.chat_view_screen {
                                screen.scroll_up(count);
                            }
                        }
                        KeyCode::Down | KeyCode::PageDown => {
                            if let Some(screen) = &mut app.chat_view_screen {
                                screen.scroll_down();
                            }
                        }
                        _ => {}
                    },
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
