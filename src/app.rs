//! HTTP surface: the `users.getAll` query and the address book page.
use crate::contacts::Contact;
use crate::route;
use crate::router::{AppState, Response, Router, access_log};
use crate::template::{TemplateValue, render_template};
use crate::view::{ALL_COMPANIES, Controls, SortField, derive_visible_contacts, distinct_companies};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const USERS_GET_ALL_PATH: &str = "/api/trpc/users.getAll";

/// Success envelope: `{"result":{"data":...}}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResult<T> {
    pub result: QueryData<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryData<T> {
    pub data: T,
}

/// Failure envelope: `{"error":{"message":...}}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryFailure {
    pub error: QueryErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryErrorBody {
    pub message: String,
}

/// `users.getAll`: every contact sorted by name, seeding an empty store first.
pub async fn users_get_all(_params: HashMap<String, String>, state: AppState) -> Response {
    match state.contacts.get_all_contacts().await {
        Ok(contacts) => Response::json(
            QueryResult {
                result: QueryData { data: contacts },
            },
            200,
            HashMap::new(),
        ),
        Err(e) => {
            log::error!("Error fetching users: {}", e);
            Response::json(
                QueryFailure {
                    error: QueryErrorBody {
                        message: e.public_message().to_string(),
                    },
                },
                500,
                HashMap::new(),
            )
        }
    }
}

fn contact_value(contact: &Contact) -> TemplateValue {
    let initial = contact.name.chars().next().map(String::from).unwrap_or_default();
    TemplateValue::object([
        ("id", TemplateValue::Number(contact.id as f64)),
        ("name", contact.name.as_str().into()),
        ("initial", initial.into()),
        ("email", contact.email.as_str().into()),
        ("phone", contact.phone.as_str().into()),
        ("website", contact.website.as_str().into()),
        (
            "company",
            TemplateValue::object([
                ("name", contact.company.name.as_str().into()),
                ("catch_phrase", contact.company.catch_phrase.as_str().into()),
            ]),
        ),
        (
            "address",
            TemplateValue::object([
                ("street", contact.address.street.as_str().into()),
                ("city", contact.address.city.as_str().into()),
                ("zipcode", contact.address.zipcode.as_str().into()),
            ]),
        ),
    ])
}

fn sort_buttons(controls: &Controls) -> TemplateValue {
    let buttons = SortField::ALL
        .iter()
        .map(|&field| {
            let mut next = controls.clone();
            next.toggle_sort(field);
            let active = field == controls.sort_field;
            TemplateValue::object([
                ("label", field.label().into()),
                ("active", active.into()),
                ("arrow", controls.sort_direction.arrow().into()),
                ("href", format!("/?{}", next.to_query_string()).into()),
            ])
        })
        .collect();
    TemplateValue::List(buttons)
}

fn company_options(companies: &[String], controls: &Controls) -> TemplateValue {
    TemplateValue::List(
        companies
            .iter()
            .map(|name| {
                TemplateValue::object([
                    ("name", name.as_str().into()),
                    ("selected", (*name == controls.company_filter).into()),
                ])
            })
            .collect(),
    )
}

/// Template context for the page, given the full contact list and controls.
pub fn page_context(all: &[Contact], controls: &Controls) -> HashMap<String, TemplateValue> {
    let visible = derive_visible_contacts(all, controls);
    let companies = distinct_companies(all);

    let mut ctx = HashMap::new();
    ctx.insert("total".to_string(), all.len().into());
    ctx.insert("showing".to_string(), visible.len().into());
    ctx.insert("has_results".to_string(), (!visible.is_empty()).into());
    ctx.insert("has_search".to_string(), controls.has_active_filters().into());
    ctx.insert("search_query".to_string(), controls.search_query.as_str().into());
    ctx.insert("sort_field".to_string(), controls.sort_field.as_str().into());
    ctx.insert(
        "sort_direction".to_string(),
        controls.sort_direction.as_str().into(),
    );
    ctx.insert(
        "all_companies_selected".to_string(),
        (controls.company_filter == ALL_COMPANIES).into(),
    );
    ctx.insert("company_count".to_string(), companies.len().into());
    ctx.insert("companies".to_string(), company_options(&companies, controls));
    ctx.insert("sort_buttons".to_string(), sort_buttons(controls));
    ctx.insert(
        "contacts".to_string(),
        TemplateValue::List(visible.iter().map(contact_value).collect()),
    );
    ctx
}

/// The address book page. Query params: `q`, `company`, `sort`, `dir`.
pub async fn address_book_page(params: HashMap<String, String>, state: AppState) -> Response {
    let controls = Controls::from_params(&params);
    let dir = &state.settings.template.dir;

    match state.contacts.get_all_contacts().await {
        Ok(all) => render_template(dir, "index.html", &page_context(&all, &controls)),
        Err(e) => {
            log::error!("Error fetching users: {}", e);
            let mut ctx = HashMap::new();
            ctx.insert("error".to_string(), e.public_message().into());
            ctx.insert(
                "retry_href".to_string(),
                format!("/?{}", controls.to_query_string()).into(),
            );
            let mut response = render_template(dir, "error.html", &ctx);
            if response.status_code == 200 {
                response.status_code = 500;
            }
            response
        }
    }
}

/// Build the application router with all routes and the access log.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new();
    let (log_start, log_finish) = access_log();
    router.add_middleware(log_start);
    router.add_post_middleware(log_finish);

    route!(router,
        GET "/" => { address_book_page },
        GET USERS_GET_ALL_PATH => { users_get_all },
        POST USERS_GET_ALL_PATH => { users_get_all },
    );

    router.set_app_state(state);
    router
}
