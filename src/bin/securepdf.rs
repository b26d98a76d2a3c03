//! SecurePDF command-line tool
//!
//! Merge, split and password-protect PDFs locally.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;

use securepdf_tools::input::InputFile;
use securepdf_tools::output::{format_size, OutputBlob};
use securepdf_tools::pdf::extract_metadata;
use securepdf_tools::session::{MergeTool, ProtectTool, SplitTool};

/// SecurePDF - merge, split and protect PDFs without uploading them
#[derive(Parser)]
#[command(name = "securepdf")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge PDFs in the given order
    securepdf merge intro.pdf body.pdf appendix.pdf -o out/

    # Merge numbered PDFs, then move the third file to the front
    securepdf merge \"[0-9]*.pdf\" --move 3:1

    # Split pages 1-3 and 5 into two files
    securepdf split report.pdf --ranges \"1-3, 5\"

    # Password-protect a PDF
    securepdf protect contract.pdf --password \"S3cure!pass\"")]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge multiple PDF files into one
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Reorder before merging: move the file at position FROM to TO
        /// (1-based, may be repeated)
        #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
        moves: Vec<(usize, usize)>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Split a PDF into one file per page range
    Split {
        /// Input PDF file
        input: PathBuf,

        /// Comma-separated page ranges, e.g. "1-3, 5, 8-10"
        #[arg(short, long)]
        ranges: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Save a password-protected copy of a PDF
    Protect {
        /// Input PDF file
        input: PathBuf,

        /// Password needed to open the document
        #[arg(short, long)]
        password: String,

        /// Owner password (defaults to the password with "_owner" appended)
        #[arg(long)]
        owner_password: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Merge {
            inputs,
            moves,
            output,
        } => cmd_merge(inputs, moves, output),
        Commands::Split {
            input,
            ranges,
            output,
        } => cmd_split(input, ranges, output),
        Commands::Protect {
            input,
            password,
            owner_password,
            output,
        } => cmd_protect(input, password, owner_password, output),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Parse a `FROM:TO` pair of 1-based positions
fn parse_move(value: &str) -> std::result::Result<(usize, usize), String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{}'", value))?;
    let position = |text: &str| -> std::result::Result<usize, String> {
        match text.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(format!("invalid position '{}'", text)),
        }
    };
    Ok((position(from)?, position(to)?))
}

/// Expand glob patterns in input paths
///
/// Matches of one pattern are sorted; the order of the patterns themselves
/// is kept, since it is the merge order.
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = Vec::new();
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => log::warn!("Glob error for {}: {}", pattern, e),
                }
            }
            if matched.is_empty() {
                bail!("No files matched pattern: {}", pattern);
            }
            matched.sort();
            paths.extend(matched);
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

fn read_input(path: &Path) -> Result<InputFile> {
    InputFile::read(path).with_context(|| format!("Cannot read {}", path.display()))
}

fn write_outputs(outputs: &[OutputBlob], dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create output directory {}", dir.display()))?;
    for output in outputs {
        let path = output.write_to_dir(dir)?;
        eprintln!("Wrote {} ({})", path.display(), format_size(output.bytes.len()));
    }
    Ok(())
}

/// Merge multiple PDFs into one
fn cmd_merge(inputs: Vec<String>, moves: Vec<(usize, usize)>, output: PathBuf) -> Result<()> {
    let inputs = expand_globs(inputs)?;
    let files = inputs
        .iter()
        .map(|path| read_input(path))
        .collect::<Result<Vec<_>>>()?;

    let mut tool = MergeTool::new();
    let report = tool.add_dropped(files)?;
    for name in &report.rejected {
        eprintln!("Warning: skipped {} (not a PDF)", name);
    }

    for (from, to) in moves {
        tool.move_item(from - 1, to - 1)
            .with_context(|| format!("Cannot move {} to {}", from, to))?;
    }

    eprintln!("Merging {} PDF files...", tool.queue().len());
    for (position, (_, doc)) in tool.queue().iter().enumerate() {
        log::debug!("  {}. {}", position + 1, doc.name());
    }

    let outputs = tool.merge()?;
    write_outputs(outputs, &output)
}

/// Split a PDF by page ranges
fn cmd_split(input: PathBuf, ranges: String, output: PathBuf) -> Result<()> {
    let mut tool = SplitTool::new();
    tool.load(read_input(&input)?)?;
    tool.set_ranges(ranges);

    let outputs = tool.split()?;
    write_outputs(outputs, &output)
}

/// Save a password-protected copy
fn cmd_protect(
    input: PathBuf,
    password: String,
    owner_password: Option<String>,
    output: PathBuf,
) -> Result<()> {
    let mut tool = ProtectTool::new();
    tool.load(read_input(&input)?)?;
    tool.set_password(password);
    tool.set_owner_password(owner_password);

    eprintln!("Password strength: {}", tool.strength().label());

    let outputs = tool.protect()?;
    write_outputs(outputs, &output)
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    let metadata = extract_metadata(&input)?;
    let size = std::fs::metadata(&input)?.len() as usize;

    println!("File: {}", input.display());
    println!("Size: {}", format_size(size));
    println!("Pages: {}", metadata.page_count);

    if let Some(declared) = metadata.declared_page_count {
        if declared != metadata.page_count {
            println!("Declared pages: {}", declared);
        }
    }
    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(parse_move("3:1"), Ok((3, 1)));
        assert_eq!(parse_move(" 2 : 4 "), Ok((2, 4)));
        assert!(parse_move("0:1").is_err());
        assert!(parse_move("3").is_err());
        assert!(parse_move("a:b").is_err());
    }

    #[test]
    fn test_expand_globs_keeps_literal_order() {
        let paths = expand_globs(vec!["b.pdf".to_string(), "a.pdf".to_string()]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("b.pdf"), PathBuf::from("a.pdf")]);
    }
}
