use addressbook::contacts::{Address, Company, Contact};
use addressbook::view::*;
use std::collections::HashMap;

fn contact(id: i64, name: &str, email: &str, phone: &str, company: &str) -> Contact {
    Contact {
        id,
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        website: "example.com".to_string(),
        company: Company {
            name: company.to_string(),
            catch_phrase: "Building the future".to_string(),
        },
        address: Address {
            street: "Unknown".to_string(),
            city: "Unknown".to_string(),
            zipcode: "00000".to_string(),
        },
    }
}

fn ids(contacts: &[Contact]) -> Vec<i64> {
    contacts.iter().map(|c| c.id).collect()
}

fn search(query: &str) -> Controls {
    Controls {
        search_query: query.to_string(),
        ..Controls::default()
    }
}

#[test]
fn test_default_controls() {
    let controls = Controls::default();
    assert_eq!(controls.search_query, "");
    assert_eq!(controls.company_filter, ALL_COMPANIES);
    assert_eq!(controls.sort_field, SortField::Name);
    assert_eq!(controls.sort_direction, SortDirection::Asc);
    assert!(!controls.has_active_filters());
}

#[test]
fn test_search_is_case_insensitive_except_phone() {
    let all = vec![
        contact(1, "Ann", "user@CAFE.com", "000", "Acme"),
        contact(2, "Ben", "ben@x.com", "555-CAFE", "Acme"),
        contact(3, "Cal", "cal@x.com", "555-cafe", "Acme"),
        contact(4, "Dee", "dee@x.com", "111", "Acme"),
    ];
    let visible = derive_visible_contacts(&all, &search("cafe"));
    assert_eq!(ids(&visible), vec![1, 3]);
}

#[test]
fn test_search_matches_name_and_company() {
    let all = vec![
        contact(1, "Ada Lovelace", "a@x.com", "1", "Engines Ltd"),
        contact(2, "Alan Turing", "t@x.com", "2", "Bletchley"),
        contact(3, "Grace Hopper", "g@x.com", "3", "Navy"),
    ];
    assert_eq!(ids(&derive_visible_contacts(&all, &search("LOVE"))), vec![1]);
    assert_eq!(ids(&derive_visible_contacts(&all, &search("bletch"))), vec![2]);
}

#[test]
fn test_whitespace_query_does_not_filter() {
    let all = vec![
        contact(1, "Ada", "a@x.com", "1", "Acme"),
        contact(2, "Bob", "b@x.com", "2", "Beta"),
    ];
    assert_eq!(derive_visible_contacts(&all, &search("   ")).len(), 2);
}

#[test]
fn test_company_filter_is_exact() {
    let all = vec![
        contact(1, "Ada", "a@x.com", "1", "Acme"),
        contact(2, "Bob", "b@x.com", "2", "acme"),
        contact(3, "Cy", "c@x.com", "3", "Acme Corp"),
    ];
    let controls = Controls {
        company_filter: "Acme".to_string(),
        ..Controls::default()
    };
    assert_eq!(ids(&derive_visible_contacts(&all, &controls)), vec![1]);
    assert!(controls.has_active_filters());
}

#[test]
fn test_sort_by_name_ignores_case() {
    let all = vec![
        contact(1, "bob", "b@x.com", "1", "A"),
        contact(2, "Alice", "a@x.com", "2", "A"),
        contact(3, "carol", "c@x.com", "3", "A"),
    ];
    let visible = derive_visible_contacts(&all, &Controls::default());
    assert_eq!(ids(&visible), vec![2, 1, 3]);
}

#[test]
fn test_sort_by_email_descending() {
    let all = vec![
        contact(1, "A", "a@x.com", "1", "A"),
        contact(2, "B", "C@x.com", "2", "A"),
        contact(3, "C", "b@x.com", "3", "A"),
    ];
    let controls = Controls {
        sort_field: SortField::Email,
        sort_direction: SortDirection::Desc,
        ..Controls::default()
    };
    assert_eq!(ids(&derive_visible_contacts(&all, &controls)), vec![2, 3, 1]);
}

#[test]
fn test_company_sort_reverses_and_keeps_ties_stable() {
    let all = vec![
        contact(1, "A", "a@x.com", "1", "Beta"),
        contact(2, "B", "b@x.com", "2", "Acme"),
        contact(3, "C", "c@x.com", "3", "Beta"),
        contact(4, "D", "d@x.com", "4", "Gamma"),
        contact(5, "E", "e@x.com", "5", "acme"),
    ];
    let mut controls = Controls::default();
    controls.toggle_sort(SortField::Company);
    assert_eq!(controls.sort_direction, SortDirection::Asc);
    let asc = derive_visible_contacts(&all, &controls);
    assert_eq!(ids(&asc), vec![2, 5, 1, 3, 4]);

    controls.toggle_sort(SortField::Company);
    assert_eq!(controls.sort_direction, SortDirection::Desc);
    let desc = derive_visible_contacts(&all, &controls);
    assert_eq!(ids(&desc), vec![4, 1, 3, 2, 5]);
}

#[test]
fn test_sort_is_locale_aware_for_accents_and_punctuation() {
    let all = vec![
        contact(1, "Zoe", "z@x.com", "1", "A"),
        contact(2, "Émile", "e@x.com", "2", "A"),
        contact(3, "a1", "a1@x.com", "3", "A"),
        contact(4, "a_b", "ab@x.com", "4", "A"),
    ];
    let names: Vec<String> = derive_visible_contacts(&all, &Controls::default())
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["a_b", "a1", "Émile", "Zoe"]);

    let desc = Controls {
        sort_direction: SortDirection::Desc,
        ..Controls::default()
    };
    assert_eq!(ids(&derive_visible_contacts(&all, &desc)), vec![1, 2, 3, 4]);
}

#[test]
fn test_derivation_does_not_mutate_input() {
    let all = vec![
        contact(2, "Zed", "z@x.com", "1", "A"),
        contact(1, "Amy", "a@x.com", "2", "B"),
    ];
    let before = all.clone();
    let _ = derive_visible_contacts(&all, &search("amy"));
    assert_eq!(all, before);
}

#[test]
fn test_toggle_sort_to_new_field_resets_direction() {
    let mut controls = Controls {
        sort_direction: SortDirection::Desc,
        ..Controls::default()
    };
    controls.toggle_sort(SortField::Email);
    assert_eq!(controls.sort_field, SortField::Email);
    assert_eq!(controls.sort_direction, SortDirection::Asc);
}

#[test]
fn test_distinct_companies_is_case_sensitive_and_sorted() {
    let all = vec![
        contact(1, "A", "a@x.com", "1", "Beta"),
        contact(2, "B", "b@x.com", "2", "acme"),
        contact(3, "C", "c@x.com", "3", "Acme"),
        contact(4, "D", "d@x.com", "4", "Beta"),
    ];
    assert_eq!(distinct_companies(&all), vec!["Acme", "Beta", "acme"]);
}

#[test]
fn test_controls_from_params_falls_back_to_defaults() {
    let mut params = HashMap::new();
    params.insert("q".to_string(), "ada".to_string());
    params.insert("sort".to_string(), "phone".to_string());
    params.insert("dir".to_string(), "desc".to_string());
    let controls = Controls::from_params(&params);

    assert_eq!(controls.search_query, "ada");
    assert_eq!(controls.sort_field, SortField::Name);
    assert_eq!(controls.sort_direction, SortDirection::Desc);
    assert_eq!(controls.company_filter, ALL_COMPANIES);
}

#[test]
fn test_controls_query_string() {
    let controls = Controls {
        search_query: "a b".to_string(),
        company_filter: "Acme & Co".to_string(),
        sort_field: SortField::Company,
        sort_direction: SortDirection::Desc,
    };
    assert_eq!(
        controls.to_query_string(),
        "q=a+b&company=Acme+%26+Co&sort=company&dir=desc"
    );
    assert_eq!(
        Controls::default().to_query_string(),
        "company=all&sort=name&dir=asc"
    );
}
