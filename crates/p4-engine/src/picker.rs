use p4_core::{
    GridScroll, GridState, GridView, Modifiers, PageRequest, RenderOptions, SelectionChanged,
};
use p4_sources::MediaSource;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerSettings {
    /// Load the next page once less than this share of the content is left below.
    pub scroll_threshold: f64,
    pub render: RenderOptions,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            scroll_threshold: 0.1,
            render: RenderOptions::default(),
        }
    }
}

/// Archive picker: a [`GridState`] fed by a media source.
pub struct ArchivePicker<M> {
    source: M,
    grid: GridState,
    render: RenderOptions,
    listeners: Vec<mpsc::UnboundedSender<SelectionChanged>>,
}

impl<M: MediaSource> ArchivePicker<M> {
    pub fn new(source: M, settings: PickerSettings) -> Self {
        Self {
            source,
            grid: GridState::new(settings.scroll_threshold),
            render: settings.render,
            listeners: Vec::new(),
        }
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Receive every selection change from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SelectionChanged> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    fn emit(&mut self, event: &SelectionChanged) {
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Load the first page. Returns the number of items added.
    pub async fn open(&mut self) -> usize {
        match self.grid.initial_request() {
            Some(request) => self.load(request).await,
            None => 0,
        }
    }

    pub async fn on_scroll(&mut self, scroll: GridScroll) -> usize {
        match self.grid.on_scroll(scroll) {
            Some(request) => self.load(request).await,
            None => 0,
        }
    }

    async fn load(&mut self, request: PageRequest) -> usize {
        match self.source.fetch_media(request.page).await {
            Ok(items) => {
                let added = self.grid.append_page(request, items);
                info!(page = request.page, added, total = self.grid.items().len(), "loaded media page");
                added
            }
            Err(e) => {
                warn!(page = request.page, error = %e, "failed to load media page");
                self.grid.page_failed(request);
                0
            }
        }
    }

    pub fn click(&mut self, id: &str, modifiers: Modifiers) -> Option<SelectionChanged> {
        let event = self.grid.click(id, modifiers);
        match &event {
            Some(event) => self.emit(event),
            None => debug!(id, "click ignored"),
        }
        event
    }

    pub fn click_index(&mut self, index: usize, modifiers: Modifiers) -> Option<SelectionChanged> {
        let id = self.grid.items().get(index)?.id.clone();
        self.click(&id, modifiers)
    }

    pub fn set_bulk_mode(&mut self, enabled: bool) -> Option<SelectionChanged> {
        let event = self.grid.set_bulk_mode(enabled)?;
        self.emit(&event);
        Some(event)
    }

    pub fn view(&self) -> GridView {
        self.grid.render(self.render)
    }
}
