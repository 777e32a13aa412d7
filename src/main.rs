use clap::Parser;
use notes::cli::{
    handle_delete, handle_edit, handle_init, handle_list, handle_new, handle_search, handle_shell,
    handle_show, handle_theme, handle_title, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env("NOTES_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::New {
            title,
            body,
            stdin,
            json,
        } => handle_new(title, body, stdin, json),
        Commands::List { search, sort, json } => handle_list(search, sort, json),
        Commands::Show { id, raw, json } => handle_show(id, raw, json),
        Commands::Title { id, title } => handle_title(id, title),
        Commands::Edit {
            id,
            action,
            body,
            stdin,
        } => handle_edit(id, action, body, stdin),
        Commands::Theme { id, theme } => handle_theme(id, theme),
        Commands::Delete { id, force } => handle_delete(id, force),
        Commands::Search { query, json } => handle_search(query, json),
        Commands::Shell => handle_shell(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
