use crate::helpers::TestApp;

#[tokio::test]
async fn unknown_paths_serve_the_front_end_entry_document() {
    let test_app = TestApp::spawn_app().await;

    for route in ["/", "/events/E1", "/unsubscribe/confirmed"] {
        let response = test_app
            .api_client
            .get(&format!("{}{}", test_app.address, route))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(200, response.status().as_u16(), "{}", route);
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(response.text().await.unwrap().contains("<div id=\"root\">"));
    }
}

#[tokio::test]
async fn unknown_paths_are_not_found_for_other_methods() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .api_client
        .delete(&format!("{}/events/E1", test_app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}
