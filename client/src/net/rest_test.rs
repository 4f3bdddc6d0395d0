use super::*;
use crate::net::types::MENU_TABLE;

fn config() -> BackendConfig {
    BackendConfig::new("https://abcd.supabase.co", "anon-key").unwrap()
}

#[test]
fn select_all_url_orders_by_created_at_desc() {
    assert_eq!(
        select_all_url(&config(), MENU_TABLE),
        "https://abcd.supabase.co/rest/v1/menu_items?select=*&order=created_at.desc"
    );
}

#[test]
fn insert_url_targets_table() {
    assert_eq!(insert_url(&config(), MENU_TABLE), "https://abcd.supabase.co/rest/v1/menu_items");
}

#[test]
fn row_url_filters_by_id() {
    assert_eq!(
        row_url(&config(), MENU_TABLE, "3f2b6c1e-0000-4000-8000-000000000001"),
        "https://abcd.supabase.co/rest/v1/menu_items?id=eq.3f2b6c1e-0000-4000-8000-000000000001"
    );
}

#[test]
fn row_url_encodes_reserved_characters() {
    assert_eq!(
        row_url(&config(), MENU_TABLE, "a&b=c d"),
        "https://abcd.supabase.co/rest/v1/menu_items?id=eq.a%26b%3Dc+d"
    );
}

#[test]
fn decode_rows_skips_malformed_rows() {
    let body = r#"[
        {"id":1,"name":"Soup","description":"Hot","price":3,"type":"veg","image_url":null,"created_at":"2026-01-02T00:00:00Z"},
        {"id":2,"name":"Stew","description":null,"price":"4.50","type":"nonveg","created_at":"2026-01-01T00:00:00Z"},
        {"id":3,"name":"Refund","description":"x","price":-1,"type":"veg"},
        {"id":4,"name":"Mystery","description":"x","price":1,"type":"vegan"}
    ]"#;
    let items = decode_rows(body).unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Soup", "Stew"]);
    assert_eq!(items[1].description, "");
    assert!((items[1].price - 4.5).abs() < f64::EPSILON);
}

#[test]
fn decode_rows_rejects_non_array_body() {
    assert!(matches!(decode_rows(r#"{"message":"oops"}"#), Err(BackendError::Decode(_))));
}

#[test]
fn bearer_header_formats_token() {
    assert_eq!(bearer_header("tok"), "Bearer tok");
}

#[test]
fn calls_are_unavailable_off_browser() {
    let result = futures::executor::block_on(select_all(&config(), "anon-key", MENU_TABLE));
    assert_eq!(result, Err(BackendError::Unavailable));
}
