use std::time::Duration;

use anyhow::{Context, Result};
use p4_config::Config;
use p4_core::{Filter, FormEvent, ListingContext, LoaderSettings, SearchForm, SortKey, Submission};
use p4_engine::{LoadOutcome, ResultsLoader, SearchContext};
use p4_sources::{HttpListingSource, location_query};
use reqwest::Url;
use tracing::debug;

use crate::cli::SearchCommands;

use super::http_options;

pub async fn handle(cmd: SearchCommands, config: &Config) -> Result<()> {
    match cmd {
        SearchCommands::Url {
            query,
            filters,
            sort,
            remove,
            clear,
        } => url(config, query, filters, sort, remove, clear),
        SearchCommands::More {
            query,
            total,
            per_page,
            page,
            pages,
            filters,
            sort,
            html,
            ajax_url,
        } => {
            more(
                config, query, total, per_page, page, pages, filters, sort, html, ajax_url,
            )
            .await
        }
    }
}

/// Parse `group:name:id`.
fn parse_filter(arg: &str) -> Result<Filter> {
    let mut parts = arg.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(group), Some(name), Some(id)) if !group.is_empty() && !id.is_empty() => {
            Ok(Filter::new(group, name, id))
        }
        _ => anyhow::bail!("Filter must look like group:name:id, got {}", arg),
    }
}

fn build_form(config: &Config, query: &str, filters: &[String], sort: &str) -> Result<SearchForm> {
    let sort: SortKey = sort.parse()?;
    let mut form = SearchForm::new(config.search.site_url.clone(), query, sort);
    for arg in filters {
        form = form.with_checkbox(parse_filter(arg)?, true, false);
    }
    Ok(form)
}

fn submission_url(submission: &Submission) -> Result<Url> {
    let mut url = Url::parse(&submission.action)
        .with_context(|| format!("Invalid site url: {}", submission.action))?;
    url.query_pairs_mut().extend_pairs(&submission.fields);
    Ok(url)
}

fn url(
    config: &Config,
    query: String,
    filters: Vec<String>,
    sort: String,
    remove: Option<String>,
    clear: bool,
) -> Result<()> {
    let mut form = build_form(config, &query, &filters, &sort)?;
    let event = if clear {
        FormEvent::ClearAll
    } else if let Some(id) = remove {
        FormEvent::RemoveFilter { id }
    } else {
        FormEvent::SortChanged(form.sort())
    };

    let submission = form.handle(event);
    println!("{}", submission_url(&submission)?);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn more(
    config: &Config,
    query: String,
    total: u32,
    per_page: u32,
    page: u32,
    pages: u32,
    filters: Vec<String>,
    sort: String,
    html: bool,
    ajax_url: Option<String>,
) -> Result<()> {
    let mut form = build_form(config, &query, &filters, &sort)?;
    let location = submission_url(&form.handle(FormEvent::SortChanged(form.sort())))?;

    let ajax_url = ajax_url.unwrap_or_else(|| config.search.ajax_url.clone());
    debug!(%location, %ajax_url, "mounting results loader");
    let source = HttpListingSource::new(&ajax_url, &http_options(config))?;

    let context = ListingContext {
        total_results: total,
        per_page,
        current_page: page,
        auto_load_cap: pages,
    };
    let search = SearchContext {
        query: form.query().to_string(),
        sort: form.sort(),
        query_string: location_query(location.as_str())?,
    };
    let settings = LoaderSettings {
        throttle: Duration::from_millis(config.search.throttle_ms),
        load_earlier_offset: config.search.load_earlier_offset_px,
        reveal_offset: config.search.reveal_offset_px,
    };

    let Some(mut loader) = ResultsLoader::mount(source, Some(context), search, settings) else {
        println!("Load more is not available for this listing.");
        return Ok(());
    };

    println!("Search: {}", location);
    for _ in 0..pages {
        match loader.load_more().await {
            LoadOutcome::Appended { page_number } => println!("✓ Loaded page {}", page_number),
            LoadOutcome::Failed { reason } => println!("✗ {}", reason),
            LoadOutcome::Idle => {
                println!("No more pages.");
                break;
            }
            LoadOutcome::Discarded => {}
        }
    }

    let view = loader.view();
    println!(
        "\nPages appended: {} (load more {})",
        view.pages.len(),
        if view.load_more_hidden { "hidden" } else { "visible" }
    );
    if html {
        for page in loader.pages() {
            println!("\n<!-- page {} -->\n{}", page.page_number, page.html);
        }
    }

    Ok(())
}
