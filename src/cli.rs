/*
 * Command-line arguments for the console front end. Each run fills one form
 * from the given paths and submits it once.
 */
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "doc_composer",
    version,
    about = "Assemble Markdown sections and a .docx template into a converted document",
    arg_required_else_help = true
)]
pub struct CliArgs {
    /// Markdown sections in the order they should appear. Directories
    /// contribute their files in name order; a dropped .docx becomes the
    /// template when --template is not given.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// The .docx template to convert into
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Ask the server to apply image styling
    #[arg(long)]
    pub img_style: bool,

    /// Where to write the returned result page
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Conversion server base URL; overrides the configured one
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Emit debug logging
    #[arg(long)]
    pub verbose: bool,
}
