mod config;
mod save_path;
