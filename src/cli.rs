use std::{
    fs, io,
    path::{Path, PathBuf},
};

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::{
    app,
    book::StickerBook,
    calendar::{self, YearCell},
    catalog::{self, Catalog},
    config::{Config, ConfigOverrides},
    constants::{GRID, MONTHS, WEEKDAYS},
    domain::{DayKey, MonthCursor, SystemClock},
    error::{Error, Result},
    storage,
    telemetry::{self, LogTarget},
};

#[derive(Parser, Debug)]
#[command(name = "sticker-year")]
#[command(about = "One sticker per day, browsed by month or year", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "STICKER_YEAR_DATA_DIR",
        help = "Directory holding the saved state"
    )]
    data_dir: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "STICKER_YEAR_CATALOG",
        help = "Sticker catalog JSON"
    )]
    catalog: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "STICKER_YEAR_ASSETS",
        help = "Base path for sticker images"
    )]
    assets: Option<String>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "More logging (-v, -vv)")]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Print the current month")]
    Show,

    #[command(about = "Print a whole year")]
    Year {
        #[arg(help = "Year (defaults to the current one)", value_parser = year_parser())]
        year: Option<i32>,
    },

    #[command(about = "Put a sticker on a day")]
    Set {
        #[arg(help = "Day as YYYY-MM-DD")]
        date: String,

        #[arg(help = "Sticker id")]
        sticker: String,
    },

    #[command(about = "Take the sticker off a day")]
    Remove {
        #[arg(help = "Day as YYYY-MM-DD")]
        date: String,
    },

    #[command(about = "Remove every sticker in a year")]
    ClearYear {
        #[arg(help = "Year (defaults to the current one)", value_parser = year_parser())]
        year: Option<i32>,

        #[arg(long, help = "Skip the confirmation")]
        yes: bool,
    },

    #[command(about = "Move the calendar")]
    Nav {
        #[command(subcommand)]
        action: NavAction,
    },

    #[command(about = "Export the saved state as JSON")]
    Export {
        #[arg(long, short, help = "Output file or directory")]
        out: Option<PathBuf>,
    },

    #[command(about = "Import a JSON export")]
    Import {
        #[arg(help = "Export file to merge in")]
        path: PathBuf,
    },

    #[command(about = "List stickers in the catalog")]
    Stickers {
        #[arg(long, short, help = "Search ids, labels, categories and tags")]
        search: Option<String>,

        #[arg(long, short, help = "Only this category")]
        category: Option<String>,
    },

    #[command(about = "Build a catalog from a directory of .png stickers")]
    GenerateCatalog {
        #[arg(help = "Directory of sticker images")]
        dir: PathBuf,

        #[arg(long, short, help = "Output path", default_value = "stickers.json")]
        out: PathBuf,
    },

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum, help = "Shell type")]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum NavAction {
    #[command(about = "Previous month")]
    Prev,
    #[command(about = "Next month")]
    Next,
    #[command(about = "Jump to the current month")]
    Today,
    #[command(about = "Switch between month and year view")]
    Toggle,
    #[command(about = "Pick a month of the current year")]
    Month {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
    },
    #[command(about = "Pick a year, keeping the month")]
    Year {
        #[arg(value_parser = year_parser())]
        year: i32,
    },
}

fn year_parser() -> clap::builder::RangedI64ValueParser<i32> {
    clap::value_parser!(i32).range(GRID.min_year as i64..=GRID.max_year as i64)
}

pub fn open_book(config: &Config) -> StickerBook {
    StickerBook::open(Box::new(config.state_store()), Box::new(SystemClock))
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    Ok(Catalog::load(&config.catalog_path)?.with_asset_base(config.asset_base.clone()))
}

fn parse_day(date: &str) -> Result<DayKey> {
    Ok(date.trim().parse::<DayKey>()?)
}

pub fn render_month_text(book: &StickerBook, catalog: &Catalog, cursor: MonthCursor) -> String {
    let grid = calendar::build_month_grid(cursor);
    let mut out = format!(
        "{} {} ({} days stickered)\n",
        MONTHS[cursor.month0() as usize],
        cursor.year(),
        book.count_for_month(cursor)
    );

    out.push_str(
        &WEEKDAYS
            .iter()
            .map(|w| format!("{:<5}", w))
            .collect::<String>(),
    );
    out.push('\n');

    let mut legend = Vec::new();
    for week in grid.weeks() {
        for cell in week {
            let sticker = book
                .sticker_for(cell.key)
                .and_then(|id| catalog.get(id));
            let mark = if sticker.is_some() { '*' } else { ' ' };
            if cell.is_outside_month {
                out.push_str(&format!("({:>2}) ", cell.key.day()));
            } else {
                out.push_str(&format!("{:>3}{} ", cell.key.day(), mark));
            }
            if let (Some(record), false) = (sticker, cell.is_outside_month) {
                legend.push(format!(
                    "  {}  {} ({})",
                    cell.key,
                    record.label,
                    catalog.image_path(record)
                ));
            }
        }
        out.push('\n');
    }

    for line in legend {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn render_year_text(book: &StickerBook, catalog: &Catalog, year: i32) -> String {
    let mut out = String::new();
    for mini in calendar::build_year_grid(year) {
        let cursor = MonthCursor::new(year, mini.month0);
        out.push_str(&format!(
            "{} {} ({})\n",
            MONTHS[mini.month0 as usize],
            year,
            book.count_for_month(cursor)
        ));
        for week in mini.cells.chunks(WEEKDAYS.len()) {
            let line: String = week
                .iter()
                .map(|cell| match cell {
                    YearCell::Placeholder => "  ",
                    YearCell::Day(day) => {
                        let known = book
                            .sticker_for(day.key)
                            .and_then(|id| catalog.get(id))
                            .is_some();
                        if known { "* " } else { "· " }
                    }
                })
                .collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn show(config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    let book = open_book(config);
    print!("{}", render_month_text(&book, &catalog, book.cursor()));
    Ok(())
}

fn show_year(config: &Config, year: Option<i32>) -> Result<()> {
    let catalog = load_catalog(config)?;
    let book = open_book(config);
    let year = year.unwrap_or(book.cursor().year());
    print!("{}", render_year_text(&book, &catalog, year));
    Ok(())
}

fn set_sticker(config: &Config, date: &str, sticker: &str) -> Result<()> {
    let key = parse_day(date)?;
    let mut book = open_book(config);

    // Unknown ids are stored anyway; the catalog may be a different version.
    if let Ok(catalog) = load_catalog(config) {
        if catalog.get(sticker).is_none() {
            tracing::warn!(sticker, "sticker is not in the current catalog");
        }
    }

    book.set_sticker(key, sticker);
    println!("{} -> {}", key, sticker);
    Ok(())
}

fn remove_sticker(config: &Config, date: &str) -> Result<()> {
    let key = parse_day(date)?;
    let mut book = open_book(config);
    if book.remove_sticker(key) {
        println!("Removed sticker from {}", key);
    } else {
        println!("No sticker on {}", key);
    }
    Ok(())
}

fn clear_year(config: &Config, year: Option<i32>, yes: bool) -> Result<()> {
    let mut book = open_book(config);
    let year = year.unwrap_or(book.cursor().year());
    if !yes {
        return Err(Error::Usage(format!(
            "this removes every sticker in {}; rerun with --yes to confirm",
            year
        )));
    }
    let removed = book.clear_year(year);
    println!("Cleared {} stickers from {}", removed, year);
    Ok(())
}

fn navigate(config: &Config, action: NavAction) -> Result<()> {
    let mut book = open_book(config);
    match action {
        NavAction::Prev => book.shift_month(-1),
        NavAction::Next => book.shift_month(1),
        NavAction::Today => book.jump_to_today(),
        NavAction::Toggle => book.toggle_view(),
        NavAction::Month { month } => book.set_month(month - 1),
        NavAction::Year { year } => book.set_year(year),
    }
    let cursor = book.cursor();
    println!(
        "{} {} ({} view)",
        MONTHS[cursor.month0() as usize],
        cursor.year(),
        book.view().as_str()
    );
    Ok(())
}

fn export(config: &Config, out: Option<PathBuf>) -> Result<()> {
    let book = open_book(config);
    let json = book.export()?;
    match out {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(book.export_file_name())
            } else {
                path
            };
            storage::write_text_file(&path, &json)?;
            println!("Exported to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn import(config: &Config, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        context: format!("could not read {}", path.display()),
        source,
    })?;
    let mut book = open_book(config);
    book.import(&text)?;
    println!(
        "Imported! {} days stickered",
        book.state().placements.len()
    );
    Ok(())
}

fn list_stickers(config: &Config, search: Option<&str>, category: Option<&str>) -> Result<()> {
    let catalog = load_catalog(config)?;

    if search.is_none() && category.is_none() {
        for group in catalog.grouped() {
            println!("{} ({})", group.category, group.stickers.len());
            for record in &group.stickers {
                println!("  {:24} {}", record.id, record.label);
            }
        }
    } else {
        let hits = catalog.search(search.unwrap_or(""), category);
        for record in &hits {
            println!("{:24} {:16} {}", record.id, record.category, record.label);
        }
        println!("{} of {} stickers", hits.len(), catalog.flat().len());
    }

    let duplicates = catalog.duplicate_ids();
    if !duplicates.is_empty() {
        println!("Duplicate ids (last entry wins): {}", duplicates.join(", "));
    }
    Ok(())
}

fn generate_catalog(dir: &Path, out: &Path) -> Result<()> {
    let feed = catalog::generate_feed(dir).map_err(|source| Error::Io {
        context: format!("could not scan {}", dir.display()),
        source,
    })?;
    storage::write_json_atomic(out, &feed)?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn print_completions(shell: Shell) {
    clap_complete::generate(shell, &mut Cli::command(), "sticker-year", &mut io::stdout());
}

fn dispatch(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Show => show(config),
        Command::Year { year } => show_year(config, year),
        Command::Set { date, sticker } => set_sticker(config, &date, &sticker),
        Command::Remove { date } => remove_sticker(config, &date),
        Command::ClearYear { year, yes } => clear_year(config, year, yes),
        Command::Nav { action } => navigate(config, action),
        Command::Export { out } => export(config, out),
        Command::Import { path } => import(config, &path),
        Command::Stickers { search, category } => {
            list_stickers(config, search.as_deref(), category.as_deref())
        }
        Command::GenerateCatalog { dir, out } => generate_catalog(&dir, &out),
        Command::Completions { shell } => {
            print_completions(shell);
            Ok(())
        }
    }
}

pub fn run_cli() {
    let cli = Cli::parse();
    let config = Config::resolve(ConfigOverrides {
        data_dir: cli.data_dir,
        catalog: cli.catalog,
        assets: cli.assets,
    });

    let result = match cli.command {
        Some(command) => {
            let _telemetry = telemetry::init(cli.verbose, LogTarget::Stderr);
            dispatch(&config, command)
        }
        None => {
            let _telemetry = telemetry::init(cli.verbose, LogTarget::File(config.log_dir.clone()));
            app::run_ui(&config)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
