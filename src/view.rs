//! Search, company filter and sort over an in-memory contact list.
use crate::contacts::Contact;
use icu_collator::{Collator, CollatorOptions};
use log::warn;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Company filter value that disables filtering.
pub const ALL_COMPANIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Email,
    Company,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Name, SortField::Email, SortField::Company];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Company => "company",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortField::Name => "Name",
            SortField::Email => "Email",
            SortField::Company => "Company",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(SortField::Name),
            "email" => Some(SortField::Email),
            "company" => Some(SortField::Company),
            _ => None,
        }
    }

    fn key<'a>(&self, contact: &'a Contact) -> &'a str {
        match self {
            SortField::Name => &contact.name,
            SortField::Email => &contact.email,
            SortField::Company => &contact.company.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}

/// The page's search, filter and sort state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Controls {
    #[serde(rename = "q", skip_serializing_if = "String::is_empty")]
    pub search_query: String,
    #[serde(rename = "company")]
    pub company_filter: String,
    #[serde(rename = "sort")]
    pub sort_field: SortField,
    #[serde(rename = "dir")]
    pub sort_direction: SortDirection,
}

impl Default for Controls {
    fn default() -> Self {
        Controls {
            search_query: String::new(),
            company_filter: ALL_COMPANIES.to_string(),
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

impl Controls {
    /// Read controls from request parameters (`q`, `company`, `sort`, `dir`).
    /// Missing or unrecognised values keep their defaults.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut controls = Controls::default();
        if let Some(q) = params.get("q") {
            controls.search_query = q.clone();
        }
        if let Some(company) = params.get("company").filter(|c| !c.is_empty()) {
            controls.company_filter = company.clone();
        }
        if let Some(field) = params.get("sort").and_then(|s| SortField::parse(s)) {
            controls.sort_field = field;
        }
        if let Some(dir) = params.get("dir").and_then(|d| SortDirection::parse(d)) {
            controls.sort_direction = dir;
        }
        controls
    }

    /// Re-selecting the active field flips direction; a new field starts ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if field == self.sort_field {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Asc;
        }
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search_query.is_empty() || self.company_filter != ALL_COMPANIES
    }

    /// Query string that reproduces these controls.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}

fn matches_query(contact: &Contact, query: &str) -> bool {
    contact.name.to_lowercase().contains(query)
        || contact.email.to_lowercase().contains(query)
        || contact.company.name.to_lowercase().contains(query)
        || contact.phone.contains(query)
}

/// Root-locale collator: punctuation before digits before letters, accented
/// letters next to their base letter.
fn root_collator() -> Option<Collator> {
    match Collator::try_new(&Default::default(), CollatorOptions::new()) {
        Ok(collator) => Some(collator),
        Err(e) => {
            warn!("Collator unavailable, sorting by code point: {}", e);
            None
        }
    }
}

fn compare_keys(collator: Option<&Collator>, a: &str, b: &str) -> Ordering {
    match collator {
        Some(collator) => collator.compare(a, b),
        None => a.cmp(b),
    }
}

/// Apply search, company filter and sort to `all`, returning a new list.
///
/// Sort keys are lower-cased and compared with a locale-aware collator. The
/// sort is stable, so rows with equal keys keep their input order in both
/// directions.
pub fn derive_visible_contacts(all: &[Contact], controls: &Controls) -> Vec<Contact> {
    let mut result: Vec<Contact> = all.to_vec();

    if !controls.search_query.trim().is_empty() {
        let query = controls.search_query.to_lowercase();
        result.retain(|c| matches_query(c, &query));
    }

    if controls.company_filter != ALL_COMPANIES {
        result.retain(|c| c.company.name == controls.company_filter);
    }

    let field = controls.sort_field;
    let mut keyed: Vec<(String, Contact)> = result
        .into_iter()
        .map(|c| (field.key(&c).to_lowercase(), c))
        .collect();

    let collator = root_collator();
    keyed.sort_by(|(a, _), (b, _)| {
        let ord = compare_keys(collator.as_ref(), a, b);
        match controls.sort_direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    keyed.into_iter().map(|(_, c)| c).collect()
}

/// Distinct company names (exact string equality), ascending.
pub fn distinct_companies(all: &[Contact]) -> Vec<String> {
    all.iter()
        .map(|c| c.company.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
