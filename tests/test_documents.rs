mod common;

use docextract::models::document::ExtractedData;

#[tokio::test]
async fn list_documents_returns_summaries_newest_first() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    env.upload(&server, &common::resume("First", "first@example.com", &["C"]))
        .await;
    env.upload(&server, &common::resume("Second", "second@example.com", &["Go"]))
        .await;

    let response = server.get("/api/documents").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["name"], "Second");
    assert_eq!(results[1]["name"], "First");
    assert_eq!(results[1]["skills"][0], "C");
    assert!(results[0].get("experience").is_none(), "listing is a summary");
}

#[tokio::test]
async fn get_document_returns_every_field() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let id = env
        .upload(
            &server,
            &ExtractedData {
                phone: "+1 555 0100".to_string(),
                location: "Boston, MA".to_string(),
                linkedin: "https://linkedin.com/in/grace".to_string(),
                certifications: vec!["Navy Distinguished Service Medal".to_string()],
                ..common::resume("Grace Hopper", "grace@navy.mil", &["COBOL"])
            },
        )
        .await;

    let response = server.get(&format!("/api/document/{id}")).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["name"], "Grace Hopper");
    assert_eq!(body["phone"], "+1 555 0100");
    assert_eq!(body["location"], "Boston, MA");
    assert_eq!(body["raw_data"]["linkedin"], "https://linkedin.com/in/grace");
    assert_eq!(
        body["raw_data"]["certifications"][0],
        "Navy Distinguished Service Medal"
    );
    assert!(body["filename"].as_str().unwrap().ends_with("_resume.pdf"));
    assert!(body["created_at"].is_string());
    assert!(body["updated_at"].is_string());
}

#[tokio::test]
async fn get_unknown_document_is_not_found() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    for id in ["00000000-0000-0000-0000-000000000000", "not-a-uuid"] {
        let response = server.get(&format!("/api/document/{id}")).await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Document not found");
    }
}
