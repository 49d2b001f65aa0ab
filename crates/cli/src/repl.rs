//! Interactive `browse` loop.

use crate::render::{render_image, render_view};
use anyhow::{anyhow, bail, Result};
use gallery_core::{EventKind, Gallery, GalleryError, ImageDescriptor};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

pub const HELP: &str = "\
commands:
  ls              list the current directory
  cd ID           enter a directory
  up              go to the parent directory
  left | right    previous / next sibling directory
  open N|ID       open an image by list position or id
  next | prev     step through the images
  close           close the open image
  search QUERY    search bookmarks (empty query lists the directory again)
  broken ID       mark an image as broken
  help            this text
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ls,
    Cd(String),
    Up,
    Left,
    Right,
    Open(String),
    Next,
    Prev,
    Close,
    Search(String),
    Broken(String),
    Help,
    Quit,
}

/// `None` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = |name: &str| -> Result<String> {
        if rest.is_empty() {
            bail!("{} needs an argument", name);
        }
        Ok(rest.to_string())
    };
    let command = match word {
        "ls" => Command::Ls,
        "cd" => Command::Cd(arg("cd")?),
        "up" | ".." => Command::Up,
        "left" | "l" => Command::Left,
        "right" | "r" => Command::Right,
        "open" | "o" => Command::Open(arg("open")?),
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "close" => Command::Close,
        "search" | "/" => Command::Search(rest.to_string()),
        "broken" => Command::Broken(arg("broken")?),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(anyhow!("unknown command: {} (try help)", other)),
    };
    Ok(Some(command))
}

/// An id from the images bucket, else a 1-based position in it.
fn image_id(gallery: &Gallery, target: &str) -> Option<String> {
    let images = &gallery.classification().images;
    if images.iter().any(|n| n.id == target) {
        return Some(target.to_string());
    }
    let position: usize = target.parse().ok()?;
    images.get(position.checked_sub(1)?).map(|n| n.id.clone())
}

async fn print_view<W: Write>(gallery: &Gallery, out: &mut W) -> Result<()> {
    let view = gallery.view();
    let current = gallery.tree().node(&view.directory_id).await.ok();
    write!(out, "{}", render_view(&view, current.as_ref()))?;
    Ok(())
}

fn print_image<W: Write>(out: &mut W, image: Option<&ImageDescriptor>) -> Result<()> {
    match image {
        Some(image) => write!(out, "{}", render_image(image))?,
        None => writeln!(out, "no images here")?,
    }
    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

/// What to print once a command succeeded.
enum Show {
    Listing,
    Nothing,
}

async fn execute<W: Write>(gallery: &mut Gallery, command: Command, out: &mut W) -> Result<Flow> {
    let result: Result<Show, GalleryError> = match command {
        Command::Quit => return Ok(Flow::Quit),
        Command::Help => {
            writeln!(out, "{}", HELP)?;
            Ok(Show::Nothing)
        }
        Command::Ls => Ok(Show::Listing),
        Command::Cd(id) => gallery.enter(&id).await.map(|_| Show::Listing),
        Command::Up => gallery.up().await.map(|_| Show::Listing),
        Command::Left => sideways(gallery.left().await, out)?,
        Command::Right => sideways(gallery.right().await, out)?,
        Command::Open(target) => match image_id(gallery, &target) {
            Some(id) => match gallery.open_image(&id).await {
                Ok(image) => {
                    write!(out, "{}", render_image(image))?;
                    Ok(Show::Nothing)
                }
                Err(e) => Err(e),
            },
            None => {
                writeln!(out, "no image {}", target)?;
                Ok(Show::Nothing)
            }
        },
        Command::Next => match gallery.next_image().await {
            Ok(image) => {
                print_image(out, image)?;
                Ok(Show::Nothing)
            }
            Err(e) => Err(e),
        },
        Command::Prev => match gallery.previous_image().await {
            Ok(image) => {
                print_image(out, image)?;
                Ok(Show::Nothing)
            }
            Err(e) => Err(e),
        },
        Command::Close => {
            gallery.close_image();
            Ok(Show::Nothing)
        }
        Command::Search(query) => gallery.search(&query).await.map(|_| Show::Listing),
        Command::Broken(id) => {
            gallery.report_broken(&id);
            writeln!(out, "reported {}", id)?;
            Ok(Show::Nothing)
        }
    };
    match result {
        Ok(Show::Listing) => print_view(gallery, out).await?,
        Ok(Show::Nothing) => {}
        Err(e) => writeln!(out, "error: {}", e)?,
    }
    Ok(Flow::Continue)
}

fn sideways<W: Write>(
    moved: Result<bool, GalleryError>,
    out: &mut W,
) -> Result<Result<Show, GalleryError>> {
    Ok(match moved {
        Ok(true) => Ok(Show::Listing),
        Ok(false) => {
            writeln!(out, "no directory that way")?;
            Ok(Show::Nothing)
        }
        Err(e) => Err(e),
    })
}

fn report_changes<W: Write>(changes: &[EventKind], out: &mut W) -> Result<()> {
    for change in changes {
        match change {
            EventKind::Promote(node) => writeln!(out, "* [{}] is an image", node.id)?,
            EventKind::Demote(id) => writeln!(out, "* [{}] moved to links", id)?,
        }
    }
    Ok(())
}

/// Reads commands from `input` until `quit` or end of input. Changes queued
/// by background probes are applied before every prompt.
pub async fn run<R, W>(gallery: &mut Gallery, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    print_view(gallery, out).await?;
    let mut lines = input.lines();
    loop {
        let changes = gallery.pump();
        report_changes(&changes, out)?;
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };
        debug!(?command, "browse command");
        if let Flow::Quit = execute(gallery, command, out).await? {
            break;
        }
    }
    Ok(())
}
