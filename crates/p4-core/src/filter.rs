//! Search filter state and form submission
//!
//! Filter and sort changes never fetch anything: every change produces a
//! [`Submission`] describing the full navigation the page should perform.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Result ordering offered by the search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Relevance,
    Date,
}

impl SortKey {
    /// Value of the `orderby` field understood by the listing.
    pub fn as_orderby(&self) -> &'static str {
        match self {
            SortKey::Relevance => "_score",
            SortKey::Date => "post_date",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_orderby())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "_score" | "relevant" | "relevance" => Ok(SortKey::Relevance),
            "post_date" | "date" => Ok(SortKey::Date),
            other => Err(Error::InvalidInput(format!("Unknown sort key: {}", other))),
        }
    }
}

fn field_regex() -> &'static Regex {
    static FIELD_RE: OnceLock<Regex> = OnceLock::new();
    FIELD_RE.get_or_init(|| {
        Regex::new(r"^f\[([^\[\]]+)\]\[([^\[\]]*)\]$").expect("filter field pattern is valid")
    })
}

/// One `(group, id)` filter selection. `name` is a display label only.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub group: String,
    pub name: String,
    pub id: String,
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group && self.id == other.id
    }
}

impl Filter {
    pub fn new(group: impl Into<String>, name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            id: id.into(),
        }
    }

    /// Form field name, e.g. `f[cat][Energy]`.
    pub fn field_name(&self) -> String {
        format!("f[{}][{}]", self.group, self.name)
    }

    /// Parse a checkbox `name` attribute and its `value`.
    pub fn from_field(field: &str, value: &str) -> Result<Self> {
        let caps = field_regex()
            .captures(field)
            .ok_or_else(|| Error::InvalidInput(format!("Not a filter field: {}", field)))?;
        if value.is_empty() {
            return Err(Error::InvalidInput(format!("Filter {} has no id", field)));
        }
        Ok(Self::new(&caps[1], &caps[2], value))
    }
}

/// Active filters plus sort order. Pair order carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    sort: SortKey,
    filters: Vec<Filter>,
}

impl PartialEq for FilterSet {
    fn eq(&self, other: &Self) -> bool {
        self.sort == other.sort
            && self.filters.len() == other.filters.len()
            && self.filters.iter().all(|f| other.filters.contains(f))
    }
}

impl FilterSet {
    pub fn new(sort: SortKey) -> Self {
        Self {
            sort,
            filters: Vec::new(),
        }
    }

    /// Rebuild from decoded query pairs. Unknown fields are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut set = FilterSet::default();
        for (key, value) in pairs {
            if key == "orderby" {
                set.sort = value.parse()?;
            } else if key.starts_with("f[") {
                set.insert(Filter::from_field(key, value)?);
            }
        }
        Ok(set)
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    /// Returns false when the pair was already present.
    pub fn insert(&mut self, filter: Filter) -> bool {
        if self.filters.contains(&filter) {
            return false;
        }
        self.filters.push(filter);
        true
    }

    /// Returns whether anything was removed; removing an absent pair is a no-op.
    pub fn remove(&mut self, group: &str, id: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| !(f.group == group && f.id == id));
        before != self.filters.len()
    }

    /// Remove every pair carrying `id`, whatever its group.
    pub fn remove_id(&mut self, id: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.id != id);
        before != self.filters.len()
    }

    pub fn contains(&self, group: &str, id: &str) -> bool {
        self.filters.iter().any(|f| f.group == group && f.id == id)
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Hidden form fields: `orderby` first, then one field per filter.
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(self.filters.len() + 1);
        fields.push(("orderby".to_string(), self.sort.as_orderby().to_string()));
        fields.extend(self.filters.iter().map(|f| (f.field_name(), f.id.clone())));
        fields
    }
}

/// A full page navigation: the form action plus its serialized fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

/// A filter checkbox rendered on the page, inline or inside the filter modal.
#[derive(Debug, Clone)]
pub struct Checkbox {
    pub filter: Filter,
    pub checked: bool,
    pub modal: bool,
}

/// User interactions that end in a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    SortChanged(SortKey),
    /// An inline checkbox was clicked, flipping its state.
    FilterClicked { group: String, id: String },
    /// The modal's "apply" button.
    ApplyModal,
    /// An active filter tag was clicked.
    RemoveFilter { id: String },
    ClearAll,
}

#[derive(Debug, Clone)]
pub struct SearchForm {
    action: String,
    query: String,
    sort: SortKey,
    checkboxes: Vec<Checkbox>,
}

impl SearchForm {
    pub fn new(action: impl Into<String>, query: impl Into<String>, sort: SortKey) -> Self {
        Self {
            action: action.into(),
            query: query.into(),
            sort,
            checkboxes: Vec::new(),
        }
    }

    pub fn with_checkbox(mut self, filter: Filter, checked: bool, modal: bool) -> Self {
        self.checkboxes.push(Checkbox {
            filter,
            checked,
            modal,
        });
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn checkboxes(&self) -> &[Checkbox] {
        &self.checkboxes
    }

    /// Filter set read from the checked boxes of one kind.
    pub fn selected(&self, modal: bool) -> FilterSet {
        let mut set = FilterSet::new(self.sort);
        for checkbox in &self.checkboxes {
            if checkbox.checked && checkbox.modal == modal {
                set.insert(checkbox.filter.clone());
            }
        }
        set
    }

    /// Apply an interaction and produce the navigation it triggers.
    pub fn handle(&mut self, event: FormEvent) -> Submission {
        let filters = match event {
            FormEvent::SortChanged(sort) => {
                self.sort = sort;
                self.selected(false)
            }
            FormEvent::FilterClicked { group, id } => {
                for checkbox in self.checkboxes.iter_mut().filter(|c| !c.modal) {
                    if checkbox.filter.group == group && checkbox.filter.id == id {
                        checkbox.checked = !checkbox.checked;
                    }
                }
                self.selected(false)
            }
            FormEvent::ApplyModal => self.selected(true),
            FormEvent::RemoveFilter { id } => {
                let mut set = self.selected(false);
                set.remove_id(&id);
                set
            }
            FormEvent::ClearAll => {
                for checkbox in &mut self.checkboxes {
                    checkbox.checked = false;
                }
                FilterSet::new(self.sort)
            }
        };
        self.submission(&filters)
    }

    fn submission(&self, filters: &FilterSet) -> Submission {
        let mut fields = vec![("s".to_string(), self.query.trim().to_string())];
        fields.extend(filters.fields());
        Submission {
            action: self.action.clone(),
            fields,
        }
    }
}
