use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "skylens", version, about = "TUI widgets over public data APIs")]
pub struct Args {
    /// Widget to open directly (e.g., "nasa-images")
    #[arg(short, long)]
    pub widget: Option<String>,

    /// Initial search query for the NASA image widget
    #[arg(short, long)]
    pub query: Option<String>,

    /// Initial result page for the NASA image widget
    #[arg(short, long)]
    pub page: Option<u32>,
}
