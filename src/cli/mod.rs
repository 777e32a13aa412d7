mod commands;
mod handlers;
mod shell;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_delete, handle_edit, handle_init, handle_list, handle_new, handle_search, handle_shell,
    handle_show, handle_theme, handle_title,
};
pub use shell::{Session, Step};
