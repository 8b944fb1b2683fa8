mod common;

use common::create_test_db;
use mathquiz::db::{ClientInfo, NewPerformance, NewQuestionHistory, UserProfile};

fn profile(email: &str) -> UserProfile {
    UserProfile {
        email: email.to_string(),
        first_name: "Chan".to_string(),
        last_name: "Tai Man".to_string(),
    }
}

fn performance(user_id: Option<&str>, topic: &str, is_correct: bool) -> NewPerformance {
    NewPerformance {
        user_id: user_id.map(str::to_string),
        topic: topic.to_string(),
        difficulty: "medium".to_string(),
        question_text: "What is 2 + 2?".to_string(),
        user_answer: Some("4".to_string()),
        correct_answer: "4".to_string(),
        is_correct,
        time_taken: Some(3.5),
    }
}

#[tokio::test]
async fn migrations_are_recorded() {
    let db = create_test_db().await;
    assert!(db.migration_applied("V1").await.unwrap());
    assert!(!db.migration_applied("V999").await.unwrap());
}

#[tokio::test]
async fn login_upsert_keeps_one_row_per_email() {
    let db = create_test_db().await;

    let first = db
        .upsert_user_on_login(&profile("s1@school.cdgfss.edu.hk"))
        .await
        .unwrap();
    assert_eq!(first.role, "student");
    assert!(!first.is_elevated());

    let again = db
        .upsert_user_on_login(&profile("s1@school.cdgfss.edu.hk"))
        .await
        .unwrap();
    assert_eq!(first.id, again.id);

    let token = db
        .create_user_session(&again.id, &ClientInfo::default())
        .await
        .unwrap();
    let found = db
        .get_user_by_session(&token)
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(found.id, first.id);
    assert_eq!(found.display_name(), "Chan Tai Man");
}

#[tokio::test]
async fn role_change_makes_user_elevated() {
    let db = create_test_db().await;
    let user = db
        .upsert_user_on_login(&profile("t1@school.cdgfss.edu.hk"))
        .await
        .unwrap();

    let token = db
        .create_user_session(&user.id, &ClientInfo::default())
        .await
        .unwrap();

    db.set_user_role(&user.id, "teacher").await.unwrap();

    // Sessions see the new role without logging in again
    let user = db.get_user_by_session(&token).await.unwrap().unwrap();
    assert!(user.is_elevated());
}

#[tokio::test]
async fn session_lifecycle() {
    let db = create_test_db().await;
    let user = db
        .upsert_user_on_login(&profile("s2@school.cdgfss.edu.hk"))
        .await
        .unwrap();

    let client = ClientInfo {
        ip_address: Some("10.0.0.1".to_string()),
        user_agent: Some("test-agent".to_string()),
    };
    let token = db.create_user_session(&user.id, &client).await.unwrap();

    let by_session = db.get_user_by_session(&token).await.unwrap();
    assert_eq!(by_session.map(|u| u.id), Some(user.id.clone()));

    db.end_user_session(&token).await.unwrap();
    assert!(db.get_user_by_session(&token).await.unwrap().is_none());

    assert!(db.get_user_by_session("not-a-token").await.unwrap().is_none());
}

#[tokio::test]
async fn question_history_keeps_options_in_order() {
    let db = create_test_db().await;
    let options = vec![
        "x^5".to_string(),
        "x^6".to_string(),
        "x^8".to_string(),
        "x".to_string(),
    ];

    db.insert_question_history(&NewQuestionHistory {
        topic: "Positive integral indices".to_string(),
        difficulty: "easy".to_string(),
        question_text: "Simplify \\(x^2 \\cdot x^3\\)".to_string(),
        options: options.clone(),
        correct_answer: "x^5".to_string(),
        generated_by_user_id: None,
    })
    .await
    .unwrap();

    assert_eq!(db.question_history_count().await.unwrap(), 1);

    let rows = db.recent_question_history(10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].options.0, options);
    assert_eq!(rows[0].correct_answer, "x^5");
    assert!(rows[0].generated_by_user_id.is_none());
}

#[tokio::test]
async fn performances_are_listed_oldest_first() {
    let db = create_test_db().await;
    let user = db
        .upsert_user_on_login(&profile("s3@school.cdgfss.edu.hk"))
        .await
        .unwrap();

    for topic in ["Algebra", "Geometry", "Algebra"] {
        db.insert_performance(&performance(Some(&user.id), topic, topic == "Algebra"))
            .await
            .unwrap();
    }
    db.insert_performance(&performance(None, "Algebra", false))
        .await
        .unwrap();

    let rows = db.performances_for_user(&user.id).await.unwrap();
    let topics: Vec<&str> = rows.iter().map(|r| r.topic.as_str()).collect();
    assert_eq!(topics, ["Algebra", "Geometry", "Algebra"]);
    assert_eq!(rows[0].time_taken, Some(3.5));

    assert_eq!(db.anonymous_performance_count().await.unwrap(), 1);
}
