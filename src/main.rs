mod app;
mod book;
mod calendar;
mod catalog;
mod cli;
mod codec;
mod config;
mod constants;
mod domain;
mod error;
mod placements;
mod storage;
mod telemetry;

fn main() {
    cli::run_cli();
}
