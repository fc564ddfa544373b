mod common;

use axum::http::StatusCode;
use common::{Browser, TestApp};
use stockfolio_backend::services::position_service;

async fn logged_in(app: &TestApp, username: &str) -> Browser {
    let mut browser = app.browser();
    browser.register(username, "secret1").await;
    browser.login(username, "secret1").await.assert_redirect("/portfolio");
    browser
}

async fn user_id(app: &TestApp, username: &str) -> i64 {
    stockfolio_backend::db::user_queries::fetch_by_username(&app.state.pool, username)
        .await
        .unwrap()
        .unwrap()
        .id
}

#[tokio::test]
async fn add_view_delete_round_trip() {
    let app = TestApp::new(&[("AAPL", 190.0)]).await;
    let mut alice = logged_in(&app, "alice").await;

    alice
        .post_form("/addPosition", "symbol=AAPL&name=Apple&purchase_price=150.00&quantity=10")
        .await
        .assert_redirect("/portfolio");

    let page = alice.get("/portfolio").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Position added"));
    assert_eq!(page.position_rows(), 1);
    assert!(page.body.contains("data-symbol=\"AAPL\""));
    assert!(page.body.contains("190.00"));
    assert!(page.body.contains("1900.00"));

    let positions = position_service::list_positions(&app.state.pool, user_id(&app, "alice").await)
        .await
        .unwrap();
    assert_eq!(positions.len(), 1);

    alice
        .post_form("/deletePosition", &format!("id={}", positions[0].id))
        .await
        .assert_redirect("/portfolio");

    let page = alice.get("/portfolio").await;
    assert!(page.body.contains("Position deleted"));
    assert_eq!(page.position_rows(), 0);
    assert!(page.body.contains("No positions yet."));
}

#[tokio::test]
async fn failing_quote_degrades_only_its_row() {
    let app = TestApp::new(&[("AAPL", 190.0), ("MSFT", 410.0)]).await;
    let mut alice = logged_in(&app, "alice").await;

    for body in [
        "symbol=AAPL&name=Apple&purchase_price=150&quantity=10",
        "symbol=ZZZZ&name=Unknown&purchase_price=5&quantity=3",
        "symbol=MSFT&name=Microsoft&purchase_price=300&quantity=2",
    ] {
        alice.post_form("/addPosition", body).await.assert_redirect("/portfolio");
    }

    let page = alice.get("/portfolio").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.position_rows(), 3);
    assert!(page.body.contains("<li>ZZZZ: symbol not found</li>"));
    assert!(page.body.contains("410.00"));
    assert!(page.body.contains("190.00"));

    let aapl = page.body.find("data-symbol=\"AAPL\"").unwrap();
    let zzzz = page.body.find("data-symbol=\"ZZZZ\"").unwrap();
    let msft = page.body.find("data-symbol=\"MSFT\"").unwrap();
    assert!(aapl < zzzz && zzzz < msft, "rows keep insertion order");

    let zzzz_row = &page.body[zzzz..msft];
    assert!(zzzz_row.contains("<td>0.00</td>"));
}

#[tokio::test]
async fn invalid_positions_are_rejected_with_a_message() {
    let app = TestApp::new(&[]).await;
    let mut alice = logged_in(&app, "alice").await;

    let cases = [
        ("symbol=AAPL&name=Apple&purchase_price=150&quantity=0", "Quantity must be &gt; 0"),
        ("symbol=AAPL&name=Apple&purchase_price=150&quantity=-2", "Quantity must be &gt; 0"),
        ("symbol=AAPL&name=Apple&purchase_price=0&quantity=1", "Purchase price must be &gt; 0"),
        ("symbol=AAPL&name=Apple&purchase_price=-1&quantity=1", "Purchase price must be &gt; 0"),
        ("symbol=&name=Apple&purchase_price=1&quantity=1", "Symbol is required"),
        ("symbol=AAPL&name=&purchase_price=1&quantity=1", "Name is required"),
        ("symbol=AAPL&name=Apple&purchase_price=abc&quantity=1", "Purchase price must be a number"),
    ];

    for (body, message) in cases {
        alice.post_form("/addPosition", body).await.assert_redirect("/portfolio");
        let page = alice.get("/portfolio").await;
        assert!(page.body.contains(message), "{} -> {}", body, message);
        assert_eq!(page.position_rows(), 0);
    }
}

#[tokio::test]
async fn users_never_see_or_delete_each_others_positions() {
    let app = TestApp::new(&[("AAPL", 190.0)]).await;
    let mut alice = logged_in(&app, "alice").await;
    let mut bob = logged_in(&app, "bob").await;

    alice
        .post_form("/addPosition", "symbol=AAPL&name=Apple&purchase_price=150&quantity=10")
        .await;
    bob.post_form("/addPosition", "symbol=AAPL&name=Apple&purchase_price=120&quantity=1")
        .await;

    let alice_id = user_id(&app, "alice").await;
    let alices = position_service::list_positions(&app.state.pool, alice_id).await.unwrap();
    assert_eq!(alices.len(), 1);

    // bob deleting alice's id is a silent no-op
    bob.post_form("/deletePosition", &format!("id={}", alices[0].id))
        .await
        .assert_redirect("/portfolio");
    assert_eq!(
        position_service::list_positions(&app.state.pool, alice_id).await.unwrap(),
        alices
    );

    let page = bob.get("/portfolio").await;
    assert_eq!(page.position_rows(), 1);
    assert!(page.body.contains("120.00"));
    assert!(!page.body.contains("150.00"));
}

#[tokio::test]
async fn delete_with_malformed_id_is_reported() {
    let app = TestApp::new(&[]).await;
    let mut alice = logged_in(&app, "alice").await;

    alice.post_form("/deletePosition", "id=abc").await.assert_redirect("/portfolio");
    let page = alice.get("/portfolio").await;
    assert!(page.body.contains("Invalid position id"));
}

#[tokio::test]
async fn landing_page_redirects_to_portfolio() {
    let app = TestApp::new(&[]).await;
    let mut alice = logged_in(&app, "alice").await;
    alice.get("/").await.assert_redirect("/portfolio");
}

#[tokio::test]
async fn malformed_position_forms_redirect_with_message() {
    let app = TestApp::new(&[]).await;
    let mut alice = logged_in(&app, "alice").await;

    alice
        .post_form("/addPosition", "symbol=A&symbol=B&name=Apple&purchase_price=1&quantity=1")
        .await
        .assert_redirect("/portfolio");
    let page = alice.get("/portfolio").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Invalid form submission"));
    assert_eq!(page.position_rows(), 0);

    alice.post_form("/deletePosition", "id=1&id=2").await.assert_redirect("/portfolio");
    let page = alice.get("/portfolio").await;
    assert!(page.body.contains("Invalid form submission"));
}

#[tokio::test]
async fn store_failure_on_portfolio_redirects_to_login_with_message() {
    let app = TestApp::new(&[]).await;
    let mut alice = logged_in(&app, "alice").await;
    let token = alice.cookie.clone().unwrap();

    app.state.pool.close().await;

    let resp = alice.get("/portfolio").await;
    resp.assert_redirect("/login");
    assert!(!app.state.sessions.exists(&token));
    assert_ne!(alice.cookie.as_deref(), Some(token.as_str()));

    let page = alice.get("/login").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Something went wrong, please try again"));
}
