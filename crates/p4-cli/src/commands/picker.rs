use anyhow::Result;
use p4_config::Config;
use p4_core::{GridScroll, GridView, Modifiers, RenderOptions, Tile};
use p4_engine::{ArchivePicker, PickerSettings};
use p4_sources::HttpMediaSource;

use crate::cli::PickerCommands;

use super::http_options;

/// Scroll position at the very bottom of the grid.
const BOTTOM: GridScroll = GridScroll {
    scroll_height: 1.0,
    scroll_top: 1.0,
    client_height: 0.0,
};

pub async fn handle(cmd: PickerCommands, config: &Config) -> Result<()> {
    match cmd {
        PickerCommands::List {
            pages,
            clicks,
            bulk,
            json,
            ajax_url,
        } => list(config, pages, clicks, bulk, json, ajax_url).await,
    }
}

/// Parse `INDEX`, `ctrl:INDEX`, `cmd:INDEX` or `shift:INDEX`.
fn parse_click(arg: &str) -> Result<(Modifiers, usize)> {
    let (modifiers, index) = match arg.split_once(':') {
        None => (Modifiers::NONE, arg),
        Some(("ctrl", index)) => (Modifiers::ctrl(), index),
        Some(("cmd" | "meta", index)) => (Modifiers::meta(), index),
        Some(("shift", index)) => (Modifiers::shift(), index),
        Some((other, _)) => anyhow::bail!("Unknown modifier: {}", other),
    };
    let index = index
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid item index in click: {}", arg))?;
    Ok((modifiers, index))
}

async fn list(
    config: &Config,
    pages: u32,
    clicks: Vec<String>,
    bulk: bool,
    json: bool,
    ajax_url: Option<String>,
) -> Result<()> {
    let clicks = clicks
        .iter()
        .map(String::as_str)
        .map(parse_click)
        .collect::<Result<Vec<_>>>()?;

    let ajax_url = ajax_url.unwrap_or_else(|| config.picker.ajax_url.clone());
    let source = HttpMediaSource::new(&ajax_url, &http_options(config))?;
    let settings = PickerSettings {
        scroll_threshold: config.picker.scroll_threshold,
        render: RenderOptions {
            max_srcset_width: config.picker.max_srcset_width,
            tile_height: config.picker.tile_height,
        },
    };
    let mut picker = ArchivePicker::new(source, settings);

    picker.open().await;
    for _ in 1..pages {
        if picker.on_scroll(BOTTOM).await == 0 {
            break;
        }
    }

    if bulk {
        picker.set_bulk_mode(true);
    }
    let mut last = None;
    for (modifiers, index) in clicks {
        match picker.click_index(index, modifiers) {
            Some(event) => last = Some(event),
            None => eprintln!("Click on item {} changed nothing", index),
        }
    }
    let selection = last.unwrap_or_else(|| picker.grid().selection_event());

    let view = picker.view();
    if json {
        let output = serde_json::json!({
            "grid": view,
            "selection": selection,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match view {
        GridView::Loading => println!("Media could not be loaded."),
        GridView::Empty => println!("No media in the archive."),
        GridView::Tiles(tiles) => {
            for tile in &tiles {
                print_tile(tile);
            }
        }
    }

    println!(
        "\nSelected: {}{}",
        selection.selection.len(),
        if selection.multi_selection { " (multi)" } else { "" }
    );
    for item in &selection.selection {
        println!("  {} {}", item.id, item.title);
    }

    Ok(())
}

fn print_tile(tile: &Tile) {
    match tile {
        Tile::Image {
            index,
            title,
            width,
            height,
            selected,
            disabled,
            imported,
            ..
        } => {
            let mark = if *selected { "[x]" } else { "[ ]" };
            let mut flags = Vec::new();
            if *imported {
                flags.push("in library");
            }
            if *disabled {
                flags.push("disabled");
            }
            println!(
                "{} {:>3}  {}  {}x{}  {}",
                mark,
                index,
                title,
                width,
                height,
                flags.join(", ")
            );
        }
        Tile::Placeholder {
            index, title, error, ..
        } => {
            println!("  ! {:>3}  {}  ({})", index, title, error);
        }
    }
}
