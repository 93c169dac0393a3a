//! Catalog CRUD tests - hazards, controls, personnel

mod common;

use common::{control_json, hazard_json, rams_against, Route, StubServer};
use predicates::prelude::*;

#[test]
fn test_haz_list_shows_catalog() {
    let server = StubServer::start(vec![Route::json(
        "GET",
        "/api/catalog/hazards",
        serde_json::json!({"hazards": [
            hazard_json(1, "Manual handling", "Manual Handling", true),
            hazard_json(2, "Live electrical conductors", "Electrical", false),
        ]}),
    )]);

    rams_against(&server)
        .args(["haz", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Manual handling"))
        .stdout(predicate::str::contains("Load weight (kg)"))
        .stdout(predicate::str::contains("2 hazard(s) found"));
}

#[test]
fn test_haz_list_filters_by_category() {
    let server = StubServer::start(vec![Route::json(
        "GET",
        "/api/catalog/hazards",
        serde_json::json!({"hazards": [
            hazard_json(1, "Manual handling", "Manual Handling", false),
            hazard_json(2, "Live electrical conductors", "Electrical", false),
        ]}),
    )]);

    rams_against(&server)
        .args(["haz", "list", "--category", "electrical"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Live electrical conductors"))
        .stdout(predicate::str::contains("Manual handling").not());
}

#[test]
fn test_haz_new_posts_draft() {
    let mut routes = vec![Route::json(
        "POST",
        "/api/catalog/hazards",
        serde_json::json!({"hazard": hazard_json(9, "Working at height >2m", "Work At Height", false)}),
    )];
    routes.push(Route::json(
        "GET",
        "/api/catalog/hazards",
        serde_json::json!({"hazards": []}),
    ));
    let server = StubServer::start(routes);

    rams_against(&server)
        .args([
            "haz",
            "new",
            "--name",
            "Working at height >2m",
            "--category",
            "Work At Height",
            "--likelihood",
            "2",
            "--severity",
            "5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created hazard 9"));

    let body = server.requests_to("POST", "/api/catalog/hazards")[0].json();
    assert_eq!(body["name"], "Working at height >2m");
    assert_eq!(body["default_likelihood"], 2);
    assert_eq!(body["default_severity"], 5);
    assert_eq!(body["requires_parameter"], false);
}

#[test]
fn test_haz_delete_with_yes() {
    let server = StubServer::start(vec![Route::error(
        "DELETE",
        "/api/catalog/hazards/3",
        204,
        "",
    )]);

    rams_against(&server)
        .args(["haz", "delete", "3", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted hazard 3"));
}

#[test]
fn test_ctl_list_groups_by_hierarchy_tier() {
    let server = StubServer::start(vec![Route::json(
        "GET",
        "/api/catalog/controls",
        serde_json::json!({"controls": [
            control_json(1, "PPE - Chemical resistant gloves", "PPE"),
            control_json(2, "Lock-out tag-out", "Electrical Isolation"),
            control_json(3, "Job safety briefing", "Communication"),
        ]}),
    )]);

    // Engineering (LOTO) sorts before Administrative (briefing) before PPE.
    let output = rams_against(&server)
        .args(["ctl", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Engineering Controls"))
        .stdout(predicate::str::contains("Administrative Controls"))
        .stdout(predicate::str::contains("Personal Protective Equipment"))
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8_lossy(&output);
    let loto = text.find("Lock-out tag-out").expect("LOTO listed");
    let briefing = text.find("Job safety briefing").expect("briefing listed");
    let gloves = text.find("Chemical resistant gloves").expect("gloves listed");
    assert!(loto < briefing && briefing < gloves);
}

#[test]
fn test_ctl_edit_updates_catalog_entry() {
    let mut updated = control_json(2, "Lock-out tag-out", "Electrical Isolation");
    updated["description"] = serde_json::json!("Apply LOTOTO to all energy sources.");
    let server = StubServer::start(vec![
        Route::json(
            "GET",
            "/api/catalog/controls",
            serde_json::json!({"controls": [control_json(2, "Lock-out tag-out", "Electrical Isolation")]}),
        ),
        Route::json(
            "PUT",
            "/api/catalog/controls/2",
            serde_json::json!({"control": updated}),
        ),
    ]);

    rams_against(&server)
        .args([
            "ctl",
            "edit",
            "2",
            "--description",
            "Apply LOTOTO to all energy sources.",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated control 2"));

    let body = server.requests_to("PUT", "/api/catalog/controls/2")[0].json();
    assert_eq!(body["name"], "Lock-out tag-out");
    assert_eq!(body["description"], "Apply LOTOTO to all energy sources.");
}

#[test]
fn test_per_list_and_new() {
    let server = StubServer::start(vec![
        Route::json(
            "GET",
            "/api/catalog/personnel",
            serde_json::json!({"personnel": [
                {"id": 1, "name": "Electrician", "description": "HV authorized"},
            ]}),
        ),
        Route::json(
            "POST",
            "/api/catalog/personnel",
            serde_json::json!({"personnel": {"id": 2, "name": "Rigger", "description": ""}}),
        ),
    ]);

    rams_against(&server)
        .args(["per", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Electrician"))
        .stdout(predicate::str::contains("HV authorized"));

    rams_against(&server)
        .args(["per", "new", "--name", "Rigger"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created person 2"));

    let body = server.requests_to("POST", "/api/catalog/personnel")[0].json();
    assert_eq!(body, serde_json::json!({"name": "Rigger"}));
}
