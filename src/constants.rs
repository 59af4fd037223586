use ratatui::style::Color;

pub const COLORS: [Color; 12] = [
    Color::Rgb(0, 176, 80),
    Color::Rgb(128, 255, 0),
    Color::Rgb(255, 255, 0),
    Color::Rgb(255, 204, 0),
    Color::Rgb(255, 153, 0),
    Color::Rgb(255, 51, 0),
    Color::Rgb(255, 0, 0),
    Color::Rgb(153, 0, 255),
    Color::Rgb(102, 51, 255),
    Color::Rgb(0, 0, 255),
    Color::Rgb(0, 153, 255),
    Color::Rgb(0, 255, 255),
];

pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const STORAGE: StorageSettings = StorageSettings {
    namespace: "stickerYear.v1",
    catalog_file: "stickers.json",
    asset_base: "./stickers",
    log_file: "sticker-year.log",
    max_backups: 10,
};

pub const GRID: GridSettings = GridSettings {
    weeks: 6,
    days_per_week: 7,
    min_year: 1,
    max_year: 9999,
};

pub const PICKER: PickerSettings = PickerSettings {
    result_limit: 600,
    default_category: "Other",
};

pub const TIME_SETTINGS: TimeSettings = TimeSettings { poll_ms: 50 };

pub struct StorageSettings {
    pub namespace: &'static str,
    pub catalog_file: &'static str,
    pub asset_base: &'static str,
    pub log_file: &'static str,
    pub max_backups: usize,
}

pub struct GridSettings {
    pub weeks: usize,
    pub days_per_week: usize,
    pub min_year: i32,
    pub max_year: i32,
}

impl GridSettings {
    pub const fn cells(&self) -> usize {
        self.weeks * self.days_per_week
    }
}

pub struct PickerSettings {
    pub result_limit: usize,
    pub default_category: &'static str,
}

pub struct TimeSettings {
    pub poll_ms: u64,
}
