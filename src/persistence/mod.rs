pub mod config;
pub mod files;
pub mod session;

pub use config::{load_config, save_config, Config};
pub use files::{
    atomic_write, config_file, ensure_app_dir, get_app_dir, init_local_app_dir, log_file,
    read_file, session_file,
};
pub use session::{load_session, save_session, Session};
