//! End-to-end onboarding: signup, the four steps, and the final store write.
//!
//! Runs against both the in-memory store and a libSQL file in a temp dir.

use std::sync::Arc;

use serde_json::{Value, json};

use kok::auth::AuthService;
use kok::navigation::Route;
use kok::onboarding::{Gender, OnboardingController, StepKind, StepOutcome, YesNo};
use kok::store::{KeyValueStore, LibSqlStore, MemoryStore, PersistOutcome, ProfileRepository};
use kok::validation::Credential;

fn credential() -> Credential {
    Credential {
        email: "IT@gmail.com".into(),
        password: "Abc12!".into(),
    }
}

async fn walk_all_no(controller: &mut OnboardingController) {
    controller.edit_basic(|f| {
        f.name = "홍길동".into();
        f.birth_date = "2000-01-01".into();
        f.gender = Some(Gender::Male);
        f.height = "170".into();
        f.weight = "65".into();
    });
    assert_eq!(controller.submit_basic(), StepOutcome::Moved(StepKind::Allergy));
    assert_eq!(
        controller.choose_allergy(YesNo::No),
        StepOutcome::Moved(StepKind::Medication)
    );
    assert_eq!(
        controller.choose_medication(YesNo::No),
        StepOutcome::Moved(StepKind::Disease)
    );
    assert_eq!(
        controller.choose_disease(YesNo::No).await,
        StepOutcome::Moved(StepKind::Complete)
    );
}

fn expected_profile() -> Value {
    json!({
        "name": "홍길동",
        "birthDate": "2000-01-01",
        "gender": "male",
        "height": "170",
        "weight": "65",
        "hasAllergy": false,
        "hasMedication": false,
        "hasDisease": false,
        "diseases": [],
    })
}

async fn stored(store: &dyn KeyValueStore, key: &str) -> Value {
    let raw = store.get(key).await.unwrap().expect("record missing");
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn signup_then_all_no_reaches_complete() {
    let store = Arc::new(MemoryStore::new());
    let repo = ProfileRepository::new(store.clone());

    let route = AuthService::new(repo.clone()).login(&credential()).await.unwrap();
    assert_eq!(route, Route::Onboarding);

    let mut controller = OnboardingController::new(repo);
    walk_all_no(&mut controller).await;

    let fields = controller.profile().to_json_fields();
    assert_eq!(fields.len(), 9);
    assert_eq!(Value::Object(fields), expected_profile());
    assert_eq!(controller.persisted(), Some(PersistOutcome::Merged));
    assert_eq!(controller.proceed(), Some(Route::SearchMap));

    let mut merged = expected_profile();
    merged["email"] = json!("IT@gmail.com");
    merged["password"] = json!("Abc12!");
    assert_eq!(stored(store.as_ref(), "user").await, merged);
    assert_eq!(stored(store.as_ref(), "registeredUser").await, merged);
    assert_eq!(store.get("isAuthenticated").await.unwrap().as_deref(), Some("true"));
}

#[tokio::test]
async fn corrupt_user_record_still_completes() {
    let store = Arc::new(MemoryStore::new());
    store.set("user", "{not json").await.unwrap();

    let mut controller = OnboardingController::new(ProfileRepository::new(store.clone()));
    walk_all_no(&mut controller).await;

    assert_eq!(controller.kind(), StepKind::Complete);
    assert_eq!(
        controller.persisted(),
        Some(PersistOutcome::CorruptRecordSkipped)
    );
    assert_eq!(stored(store.as_ref(), "registeredUser").await, expected_profile());
}

#[tokio::test]
async fn details_branch_records_entries() {
    let store = Arc::new(MemoryStore::new());
    let mut controller = OnboardingController::new(ProfileRepository::new(store.clone()));
    controller.edit_basic(|f| {
        f.name = "김영희".into();
        f.birth_date = "1985-03-12".into();
        f.gender = Some(Gender::Female);
        f.height = "162".into();
        f.weight = "50".into();
    });
    controller.submit_basic();

    assert_eq!(controller.choose_allergy(YesNo::Yes), StepOutcome::Revealed);
    assert!(matches!(controller.submit_allergy(), StepOutcome::Rejected(_)));
    controller.edit_allergy(|f| f.other = "땅콩".into());
    assert_eq!(controller.submit_allergy(), StepOutcome::Moved(StepKind::Medication));

    assert_eq!(controller.choose_medication(YesNo::Yes), StepOutcome::Revealed);
    controller.edit_medication(|f| {
        let row = f.row_mut(0).unwrap();
        row.name = "아스피린".into();
        row.dosage = "100mg".into();
        row.frequency = "하루 1회".into();
    });
    assert_eq!(controller.submit_medication(), StepOutcome::Moved(StepKind::Disease));

    controller.choose_disease(YesNo::Yes).await;
    controller.edit_disease(|f| f.set_row(0, "고혈압"));
    assert_eq!(
        controller.submit_disease().await,
        StepOutcome::Moved(StepKind::Complete)
    );

    let record = stored(store.as_ref(), "registeredUser").await;
    assert_eq!(record["hasAllergy"], true);
    assert_eq!(record["otherAllergy"], "땅콩");
    assert_eq!(record["hasMedication"], true);
    assert_eq!(record["medications"][0]["name"], "아스피린");
    assert_eq!(record["hasDisease"], true);
    assert_eq!(record["diseases"], json!([{"name": "고혈압"}]));
}

#[tokio::test]
async fn libsql_file_store_keeps_profile_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("kok.db");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(LibSqlStore::new_local(&path).await.unwrap());
        let repo = ProfileRepository::new(store);
        AuthService::new(repo.clone()).login(&credential()).await.unwrap();
        let mut controller = OnboardingController::new(repo);
        walk_all_no(&mut controller).await;
        assert_eq!(controller.persisted(), Some(PersistOutcome::Merged));
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(LibSqlStore::new_local(&path).await.unwrap());
    let auth = AuthService::new(ProfileRepository::new(store.clone()));
    auth.logout().await.unwrap();
    assert_eq!(auth.login(&credential()).await.unwrap(), Route::Cover);

    let record = stored(store.as_ref(), "registeredUser").await;
    assert_eq!(record["name"], "홍길동");
    assert_eq!(record["email"], "IT@gmail.com");
}
