use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use client::clock::SystemClock;
use client::jumble::{Collaborators, JumbleSession, StartOutcome};
use client::services::{
    Dictionary, HttpDictionary, HttpUserStore, HttpWordSource, SimulatedAdService, UserStore, WordSource,
};
use client::ClientError;
use shared::shared_jumble_game::{NewUser, UserField, UserRecord, UserUpdate, WordOrigin};

type Users = Arc<Mutex<HashMap<i64, UserRecord>>>;

const WORDS: &[&str] = &[
    "cat", "owl", "elk", "c-t", "bear", "lion", "wolf", "tiger", "zebra", "badger", "jaguar", "leopard", "panther",
];

async fn words(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    let Some(pattern) = params.get("sp") else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "missing sp" })));
    };

    if pattern.chars().all(|c| c == '?') {
        if params.get("max").map(String::as_str) != Some("20") {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": "bad max" })));
        }
        let matches: Vec<Value> = WORDS
            .iter()
            .filter(|w| w.len() == pattern.len())
            .map(|w| json!({ "word": w, "score": 1000 }))
            .collect();
        return (StatusCode::OK, Json(Value::Array(matches)));
    }

    match pattern.as_str() {
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" }))),
        word if WORDS.contains(&word) => (StatusCode::OK, Json(json!([{ "word": word }]))),
        _ => (StatusCode::NOT_FOUND, Json(json!([]))),
    }
}

async fn user_exists(State(users): State<Users>, Path(id): Path<i64>) -> Json<Value> {
    Json(json!({ "exists": users.lock().unwrap().contains_key(&id) }))
}

async fn get_user(State(users): State<Users>, Path(id): Path<i64>) -> Result<Json<UserRecord>, StatusCode> {
    users.lock().unwrap().get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn create_user(State(users): State<Users>, Json(user): Json<NewUser>) -> StatusCode {
    users
        .lock()
        .unwrap()
        .insert(user.user_id, UserRecord::new(user.user_id, user.username));
    StatusCode::CREATED
}

async fn update_user(
    State(users): State<Users>,
    Path(id): Path<i64>,
    Json(update): Json<UserUpdate>,
) -> StatusCode {
    match users.lock().unwrap().get_mut(&id) {
        Some(record) => {
            record.apply(&update);
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn spawn_backend() -> (String, Users) {
    let users: Users = Arc::new(Mutex::new(HashMap::new()));
    let app = Router::new()
        .route("/words", get(words))
        .route("/user-exists/:id", get(user_exists))
        .route("/getUser/:id", get(get_user))
        .route("/createUser", post(create_user))
        .route("/updateUser/:id", put(update_user))
        .with_state(users.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), users)
}

fn http() -> reqwest::Client {
    reqwest::Client::builder().timeout(Duration::from_secs(5)).build().unwrap()
}

#[tokio::test]
async fn test_word_source_returns_raw_candidates() {
    let (base, _) = spawn_backend().await;
    let source = HttpWordSource::new(base, http());

    let three = source.candidates(3).await.unwrap();
    assert_eq!(three, vec!["cat", "owl", "elk", "c-t"]);
    assert_eq!(source.candidates(7).await.unwrap(), vec!["leopard", "panther"]);
}

#[tokio::test]
async fn test_dictionary_statuses() {
    let (base, _) = spawn_backend().await;
    let dictionary = HttpDictionary::new(base, http());

    assert!(dictionary.is_word("CAT").await.unwrap());
    assert!(!dictionary.is_word("TAC").await.unwrap());
    match dictionary.is_word("BOOM").await {
        Err(ClientError::Status { status, .. }) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_user_store_lifecycle() {
    let (base, _) = spawn_backend().await;
    let store = HttpUserStore::new(base, http());

    assert!(!store.user_exists(5).await.unwrap());
    assert!(matches!(store.get_user(5).await, Err(ClientError::Status { .. })));

    store
        .create_user(&NewUser { user_id: 5, username: Some("tonfan".into()) })
        .await
        .unwrap();
    assert!(store.user_exists(5).await.unwrap());

    let update = UserUpdate::new().with(UserField::Gems(12)).with(UserField::HintCount(2));
    store.update_user(5, &update).await.unwrap();

    let record = store.get_user(5).await.unwrap();
    assert_eq!(record.username.as_deref(), Some("tonfan"));
    assert_eq!(record.gems, 12);
    assert_eq!(record.hint_count, 2);
    assert!(store.update_user(6, &update).await.is_err());
}

#[tokio::test]
async fn test_session_against_fake_backend() {
    let (base, users) = spawn_backend().await;
    let client = http();
    let collaborators = Collaborators {
        words: HttpWordSource::new(base.clone(), client.clone()),
        dictionary: HttpDictionary::new(base.clone(), client.clone()),
        users: Arc::new(HttpUserStore::new(base, client)),
        ads: SimulatedAdService::new(Duration::ZERO),
    };
    let (mut session, _ticks) = JumbleSession::new(
        31,
        Some("player".into()),
        collaborators,
        Arc::new(SystemClock),
        StdRng::seed_from_u64(8),
    );

    session.load_profile().await.unwrap();
    match session.initialize_game().await.unwrap() {
        StartOutcome::Started(start) => {
            assert_eq!(start.level, 1);
            assert_eq!(start.origin, WordOrigin::Remote);
        }
        other => panic!("expected a started game, got {:?}", other),
    }

    session.watch_ad_for_gems().await.unwrap();
    session.persister().flush().await;
    assert_eq!(session.persister().failures(), 0);

    let stored = users.lock().unwrap().get(&31).cloned().unwrap();
    assert_eq!(stored.free_trials, 2);
    assert_eq!(stored.gems, 3);
}
