use p4_core::{GridScroll, GridState, GridView, ImageSize, MediaItem, Modifiers, RenderOptions, Tile};

fn photo(id: &str, imported: bool) -> MediaItem {
    let item = MediaItem::new(id, id.to_uppercase())
        .with_original(ImageSize {
            url: format!("https://media.example.org/{}.jpg", id),
            width: 3000,
            height: 2000,
        })
        .with_size(
            "thumb",
            ImageSize {
                url: format!("https://media.example.org/{}-300.jpg", id),
                width: 300,
                height: 200,
            },
        );
    if imported { item.with_remote_id("42") } else { item }
}

fn grid_with(count: usize) -> GridState {
    let mut grid = GridState::new(0.1);
    let request = grid.initial_request().unwrap();
    let items = (0..count).map(|i| photo(&format!("m{}", i), i == 4)).collect();
    grid.append_page(request, items);
    grid
}

#[test]
fn shift_click_range_fills_between_extremes() {
    let mut grid = grid_with(10);
    grid.click_index(2, Modifiers::NONE);
    grid.click_index(5, Modifiers::ctrl());
    let event = grid.click_index(7, Modifiers::shift()).unwrap();

    assert_eq!(grid.selection().selected(), &[2, 3, 4, 5, 6, 7]);
    assert_eq!(event.selection.len(), 6);
    assert!(event.multi_selection);
}

#[test]
fn bulk_mode_click_on_imported_item_changes_nothing() {
    let mut grid = grid_with(6);
    grid.set_bulk_mode(true);
    grid.click_index(1, Modifiers::NONE);
    let before = grid.selection().clone();

    assert!(grid.click_index(4, Modifiers::NONE).is_none());
    assert!(grid.click_index(4, Modifiers::shift()).is_none());
    assert_eq!(grid.selection(), &before);
}

#[test]
fn leaving_bulk_mode_clears_selection() {
    let mut grid = grid_with(6);
    grid.set_bulk_mode(true);
    grid.click_index(1, Modifiers::NONE);
    grid.click_index(3, Modifiers::NONE);
    assert_eq!(grid.selection().selected(), &[1, 3]);

    let event = grid.set_bulk_mode(false).unwrap();
    assert!(event.selection.is_empty());
    assert!(grid.selection().is_empty());
}

#[test]
fn pagination_appends_and_reindexes() {
    let mut grid = grid_with(3);
    let request = grid
        .on_scroll(GridScroll {
            scroll_height: 2000.0,
            scroll_top: 1650.0,
            client_height: 200.0,
        })
        .unwrap();
    assert_eq!(request.page, 2);

    let added = grid.append_page(request, vec![photo("n0", false), photo("n1", false)]);
    assert_eq!(added, 2);
    let indexes: Vec<usize> = grid.items().iter().map(|i| i.index).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3, 4]);

    // Selection by id keeps working across pages.
    let event = grid.click("n1", Modifiers::NONE).unwrap();
    assert_eq!(event.selection[0].index, 4);
}

#[test]
fn bulk_mode_tiles_show_checkboxes_and_disabled_imports() {
    let mut grid = grid_with(5);
    grid.set_bulk_mode(true);
    grid.click_index(0, Modifiers::NONE);

    let GridView::Tiles(tiles) = grid.render(RenderOptions::default()) else {
        panic!("expected tiles");
    };
    match &tiles[0] {
        Tile::Image {
            selected,
            checkbox,
            width,
            srcset,
            ..
        } => {
            assert!(*selected);
            assert!(*checkbox);
            assert_eq!(*width, 300);
            assert_eq!(srcset, "https://media.example.org/m0-300.jpg 300w");
        }
        other => panic!("unexpected tile {:?}", other),
    }
    match &tiles[4] {
        Tile::Image {
            disabled,
            imported,
            checkbox,
            ..
        } => {
            assert!(*disabled);
            assert!(*imported);
            assert!(!*checkbox);
        }
        other => panic!("unexpected tile {:?}", other),
    }
}
