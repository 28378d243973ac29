use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "todoman",
    about = "A minimalistic interactive to-do list manager."
)]
pub struct CommandLineArgs {
    /// Use a different tasks file.
    #[structopt(parse(from_os_str), short, long)]
    pub tasks_file: Option<PathBuf>,

    /// Wrap task descriptions longer than this many columns.
    #[structopt(short, long, default_value = "48", parse(try_from_str = parse_wrap_width))]
    pub wrap_width: usize,
}

/// A wrap width must leave room for at least one character per line.
fn parse_wrap_width(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("wrap width must be at least 1".to_string()),
        Ok(width) => Ok(width),
        Err(err) => Err(err.to_string()),
    }
}
