use std::path::PathBuf;

pub struct Config {
    pub dump_ast: bool,
    pub quiet: bool,
    pub history_file: Option<PathBuf>,
}

impl Config {
    pub(crate) fn new() -> Self {
        Config {
            dump_ast: false,
            quiet: false,
            history_file: dirs::home_dir().map(|mut path| {
                path.push(".aaqz-history");
                path
            }),
        }
    }
}
