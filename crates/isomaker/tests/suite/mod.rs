mod binding;
mod config;
mod logging;
