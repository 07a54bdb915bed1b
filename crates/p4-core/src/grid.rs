//! Archive picker grid: items, selection and lazy pagination

use std::collections::HashSet;

use serde::Serialize;

use crate::media::{MediaItem, RenderOptions, Tile};
use crate::selection::{Modifiers, SelectionState};

/// Scroll geometry of the grid container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridScroll {
    pub scroll_height: f64,
    pub scroll_top: f64,
    pub client_height: f64,
}

impl GridScroll {
    /// Share of the content still below the visible area.
    pub fn till_end(&self) -> f64 {
        // A collapsed container is never at the bottom.
        if self.scroll_height <= 0.0 {
            return 1.0;
        }
        (self.scroll_height - self.scroll_top - self.client_height) / self.scroll_height
    }
}

/// Request for the next page of media items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
}

/// Emitted whenever the selection changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionChanged {
    pub selection: Vec<MediaItem>,
    /// Whether the gesture held ctrl, cmd or shift.
    pub multi_selection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "tiles", rename_all = "snake_case")]
pub enum GridView {
    Loading,
    /// Loaded without any item.
    Empty,
    Tiles(Vec<Tile>),
}

#[derive(Debug, Clone)]
pub struct GridState {
    items: Vec<MediaItem>,
    selection: SelectionState,
    pending: Option<PageRequest>,
    loaded: bool,
    next_page: u32,
    scroll_threshold: f64,
}

impl GridState {
    pub fn new(scroll_threshold: f64) -> Self {
        Self {
            items: Vec::new(),
            selection: SelectionState::new(),
            pending: None,
            loaded: false,
            next_page: 1,
            scroll_threshold,
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn request(&mut self) -> PageRequest {
        let request = PageRequest {
            page: self.next_page,
        };
        self.pending = Some(request);
        request
    }

    /// First page, requested at mount.
    pub fn initial_request(&mut self) -> Option<PageRequest> {
        if self.loaded || self.pending.is_some() {
            return None;
        }
        Some(self.request())
    }

    /// Request the next page when scrolled close enough to the bottom.
    pub fn on_scroll(&mut self, scroll: GridScroll) -> Option<PageRequest> {
        if scroll.till_end() < self.scroll_threshold && self.pending.is_none() && self.loaded {
            Some(self.request())
        } else {
            None
        }
    }

    /// Append a fetched page and return how many items were added.
    ///
    /// Items whose id is already loaded are skipped.
    pub fn append_page(&mut self, request: PageRequest, items: Vec<MediaItem>) -> usize {
        if self.pending != Some(request) {
            return 0;
        }
        self.pending = None;
        self.loaded = true;
        self.next_page = request.page + 1;

        let mut seen: HashSet<String> = self.items.iter().map(|i| i.id.clone()).collect();
        let before = self.items.len();
        for item in items {
            if seen.insert(item.id.clone()) {
                self.items.push(item);
            }
        }
        for (index, item) in self.items.iter_mut().enumerate() {
            item.index = index;
        }
        self.items.len() - before
    }

    /// A page load failed; the sequence is left as it was.
    pub fn page_failed(&mut self, request: PageRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }

    /// Handle a click on the item with `id`.
    pub fn click(&mut self, id: &str, modifiers: Modifiers) -> Option<SelectionChanged> {
        let item = self.items.iter().find(|i| i.id == id)?;
        let (index, imported) = (item.index, item.is_imported());
        if !self.selection.click(index, imported, modifiers) {
            return None;
        }
        if self.selection.bulk_mode_enabled() {
            let items = &self.items;
            self.selection
                .retain(|i| items.get(i).is_some_and(|item| !item.is_imported()));
        }
        Some(self.selection_event())
    }

    pub fn click_index(&mut self, index: usize, modifiers: Modifiers) -> Option<SelectionChanged> {
        let id = self.items.get(index)?.id.clone();
        self.click(&id, modifiers)
    }

    /// Switch bulk mode; a change clears the selection and is reported.
    pub fn set_bulk_mode(&mut self, enabled: bool) -> Option<SelectionChanged> {
        if !self.selection.set_bulk_mode(enabled) {
            return None;
        }
        Some(self.selection_event())
    }

    /// Current selection resolved to items.
    pub fn selection_event(&self) -> SelectionChanged {
        let bulk = self.selection.bulk_mode_enabled();
        let selection = self
            .selection
            .selected()
            .iter()
            .filter_map(|&i| self.items.get(i))
            .filter(|item| !(bulk && item.is_imported()))
            .cloned()
            .collect();
        SelectionChanged {
            selection,
            multi_selection: self.selection.is_multi_selecting(),
        }
    }

    pub fn render(&self, options: RenderOptions) -> GridView {
        if self.items.is_empty() {
            return if self.loaded && self.pending.is_none() {
                GridView::Empty
            } else {
                GridView::Loading
            };
        }
        GridView::Tiles(self.items.iter().map(|item| self.tile(item, options)).collect())
    }

    fn tile(&self, item: &MediaItem, options: RenderOptions) -> Tile {
        let resolved = item.srcset(options.max_srcset_width).and_then(|srcset| {
            item.tile_width(options.tile_height)
                .map(|width| (srcset, width))
        });
        let bulk = self.selection.bulk_mode_enabled();
        match resolved {
            Ok((srcset, width)) => Tile::Image {
                id: item.id.clone(),
                index: item.index,
                srcset,
                title: item.title.clone(),
                alt: item.alt.clone(),
                width,
                height: options.tile_height,
                selected: self.selection.contains(item.index),
                disabled: bulk && item.is_imported(),
                imported: item.is_imported(),
                checkbox: bulk && !item.is_imported(),
            },
            Err(e) => Tile::Placeholder {
                id: item.id.clone(),
                index: item.index,
                title: item.title.clone(),
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ImageSize;

    fn item(id: &str) -> MediaItem {
        MediaItem::new(id, format!("Title {}", id))
            .with_original(ImageSize {
                url: format!("{}.jpg", id),
                width: 400,
                height: 200,
            })
            .with_size(
                "small",
                ImageSize {
                    url: format!("{}-s.jpg", id),
                    width: 400,
                    height: 200,
                },
            )
    }

    fn loaded(ids: &[&str]) -> GridState {
        let mut grid = GridState::new(0.1);
        let request = grid.initial_request().unwrap();
        grid.append_page(request, ids.iter().map(|id| item(id)).collect());
        grid
    }

    fn scrolled(top: f64) -> GridScroll {
        GridScroll {
            scroll_height: 1000.0,
            scroll_top: top,
            client_height: 200.0,
        }
    }

    #[test]
    fn test_no_scroll_load_before_first_page() {
        let mut grid = GridState::new(0.1);
        assert!(grid.on_scroll(scrolled(800.0)).is_none());
        assert_eq!(grid.render(RenderOptions::default()), GridView::Loading);
    }

    #[test]
    fn test_scroll_near_bottom_requests_next_page() {
        let mut grid = loaded(&["a", "b"]);
        assert!(grid.on_scroll(scrolled(600.0)).is_none());

        let request = grid.on_scroll(scrolled(750.0)).unwrap();
        assert_eq!(request.page, 2);
        assert!(grid.on_scroll(scrolled(790.0)).is_none());

        assert_eq!(grid.append_page(request, vec![item("c"), item("a")]), 1);
        let indexes: Vec<_> = grid.items().iter().map(|i| (i.id.as_str(), i.index)).collect();
        assert_eq!(indexes, vec![("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn test_failed_page_can_be_retried() {
        let mut grid = loaded(&["a"]);
        let request = grid.on_scroll(scrolled(800.0)).unwrap();
        grid.page_failed(request);
        assert!(!grid.is_loading());
        assert_eq!(grid.items().len(), 1);
        assert_eq!(grid.on_scroll(scrolled(800.0)), Some(request));
    }

    #[test]
    fn test_selection_event_excludes_imported_in_bulk_mode() {
        let mut grid = GridState::new(0.1);
        let request = grid.initial_request().unwrap();
        grid.append_page(request, vec![item("a"), item("b").with_remote_id("7"), item("c")]);

        let event = grid.click("b", Modifiers::NONE).unwrap();
        assert_eq!(event.selection.len(), 1);
        assert!(!event.multi_selection);

        let event = grid.click("c", Modifiers::shift()).unwrap();
        assert_eq!(event.selection.len(), 2);
        assert!(event.multi_selection);

        let event = grid.set_bulk_mode(true).unwrap();
        assert!(event.selection.is_empty());
        assert!(grid.click("b", Modifiers::NONE).is_none());

        grid.click("a", Modifiers::NONE).unwrap();
        let event = grid.click("c", Modifiers::shift()).unwrap();
        // Range covers b, which is imported and therefore skipped.
        assert_eq!(grid.selection().selected(), &[0, 2]);
        let ids: Vec<_> = event.selection.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_bulk_range_tiles_match_reported_selection() {
        let mut grid = GridState::new(0.1);
        let request = grid.initial_request().unwrap();
        grid.append_page(request, vec![item("a"), item("b").with_remote_id("7"), item("c")]);
        grid.set_bulk_mode(true);
        grid.click("a", Modifiers::NONE).unwrap();
        let event = grid.click("c", Modifiers::shift()).unwrap();

        let GridView::Tiles(tiles) = grid.render(RenderOptions::default()) else {
            panic!("expected tiles");
        };
        let selected: Vec<&str> = tiles
            .iter()
            .filter(|t| matches!(t, Tile::Image { selected: true, .. }))
            .map(|t| t.id())
            .collect();
        let reported: Vec<&str> = event.selection.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(selected, reported);
        assert!(matches!(
            &tiles[1],
            Tile::Image { selected: false, disabled: true, .. }
        ));
    }

    #[test]
    fn test_collapsed_container_does_not_paginate() {
        let mut grid = loaded(&["a"]);
        let collapsed = GridScroll {
            scroll_height: 0.0,
            scroll_top: 0.0,
            client_height: 0.0,
        };
        assert_eq!(collapsed.till_end(), 1.0);
        assert!(grid.on_scroll(collapsed).is_none());
    }

    #[test]
    fn test_render_isolates_broken_items() {
        let mut grid = GridState::new(0.1);
        let request = grid.initial_request().unwrap();
        grid.append_page(
            request,
            vec![item("a"), MediaItem::new("broken", "No image"), item("c")],
        );
        grid.click("c", Modifiers::NONE);

        let GridView::Tiles(tiles) = grid.render(RenderOptions::default()) else {
            panic!("expected tiles");
        };
        assert_eq!(tiles.len(), 3);
        assert!(tiles[1].is_placeholder());
        assert!(!tiles[0].is_placeholder());
        match &tiles[2] {
            Tile::Image {
                selected, width, ..
            } => {
                assert!(*selected);
                assert_eq!(*width, 400);
            }
            other => panic!("unexpected tile {:?}", other),
        }
    }

    #[test]
    fn test_empty_listing() {
        let mut grid = GridState::new(0.1);
        let request = grid.initial_request().unwrap();
        grid.append_page(request, Vec::new());
        assert_eq!(grid.render(RenderOptions::default()), GridView::Empty);
    }
}
