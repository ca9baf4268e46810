//! Integration tests for the authentication service.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use warden_auth::config::AuthConfig;
use warden_auth::service::{AuthService, LoginInput, RegisterInput, UpdateProfileInput};
use warden_auth::token::{self, AccessTokenClaims};
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::principal::{CreatePrincipal, Principal, UpdatePrincipal};
use warden_core::repository::PrincipalRepository;
use warden_db::repository::SurrealPrincipalRepository;

const SECRET: &str = "integration-test-secret-0123456789abcdef";

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SECRET.into(),
        access_token_lifetime_secs: 900,
        jwt_issuer: "warden-test".into(),
        pepper: None,
        min_password_length: 6,
    }
}

/// Spin up in-memory DB, run migrations, build the service.
async fn setup() -> (
    AuthService<SurrealPrincipalRepository<Db>>,
    SurrealPrincipalRepository<Db>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    let repo = SurrealPrincipalRepository::new(db);
    (AuthService::new(repo.clone(), test_config()), repo)
}

fn register_input(email: &str, password: &str, name: &str) -> RegisterInput {
    RegisterInput {
        email: email.into(),
        password: password.into(),
        display_name: name.into(),
    }
}

fn login_input(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn register_then_login_then_authenticate() {
    let (svc, _) = setup().await;

    let alice = svc
        .register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();
    assert_eq!(alice.email, "a@x.com");
    assert_eq!(alice.display_name, "Alice");

    let login = svc.login(login_input("a@x.com", "secret")).await.unwrap();
    assert!(!login.access_token.is_empty());
    assert_eq!(login.token_type, "Bearer");
    assert_eq!(login.expires_in, 900);

    let identity = svc.authenticate(&login.access_token).unwrap();
    assert_eq!(identity.subject_id(), alice.id);
    assert_eq!(identity.claims().email, "a@x.com");
    assert_eq!(identity.claims().name, "Alice");
    assert_eq!(identity.claims().iss, "warden-test");
}

#[tokio::test]
async fn password_is_stored_hashed() {
    let (svc, repo) = setup().await;

    let view = svc
        .register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();

    let stored = repo.find_by_id(&view.id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "secret");
    assert!(stored.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn email_is_case_insensitive() {
    let (svc, _) = setup().await;
    svc.register(register_input("  Alice@Example.COM", "secret", "Alice"))
        .await
        .unwrap();

    assert!(svc.login(login_input("alice@example.com", "secret")).await.is_ok());
    assert!(svc.login(login_input("ALICE@example.com ", "secret")).await.is_ok());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (svc, _) = setup().await;
    svc.register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();

    let err = svc
        .register(register_input("A@X.COM", "another", "Impostor"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, WardenError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
}

#[tokio::test]
async fn registration_validates_input() {
    let (svc, _) = setup().await;

    let err = svc
        .register(register_input("not-an-email", "secret", "Alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::Malformed { .. }));

    let err = svc
        .register(register_input("a@x.com", "short", "Alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::Malformed { .. }));

    let err = svc
        .register(register_input("a@x.com", "secret", "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::Malformed { .. }));
}

#[tokio::test]
async fn emails_the_store_would_refuse_are_malformed() {
    let (svc, _) = setup().await;

    for email in ["a@x..com", "a@-x.com", "a(b)@x.com", "a\"b@x.com", "a@x_y.com"] {
        let err = svc
            .register(register_input(email, "secret", "Alice"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, WardenError::Malformed { .. }),
            "{email:?}: expected Malformed, got {err:?}"
        );
        assert!(!err.is_retryable());
    }
}

#[tokio::test]
async fn wrong_password_and_unknown_user_fail_identically() {
    let (svc, _) = setup().await;
    svc.register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();

    let wrong_password = svc
        .login(login_input("a@x.com", "not-the-secret"))
        .await
        .unwrap_err();
    let unknown_user = svc
        .login(login_input("nobody@x.com", "secret"))
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, WardenError::InvalidCredentials));
    assert!(matches!(unknown_user, WardenError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

/// A principal store whose backend is down.
struct UnreachableStore;

fn store_down() -> WardenError {
    WardenError::StoreUnavailable("connection refused".into())
}

impl PrincipalRepository for UnreachableStore {
    async fn create(&self, _input: CreatePrincipal) -> WardenResult<Principal> {
        Err(store_down())
    }

    async fn find_by_id(&self, _id: &str) -> WardenResult<Option<Principal>> {
        Err(store_down())
    }

    async fn find_by_email(&self, _email: &str) -> WardenResult<Option<Principal>> {
        Err(store_down())
    }

    async fn update(&self, _id: &str, _input: UpdatePrincipal) -> WardenResult<Principal> {
        Err(store_down())
    }
}

#[tokio::test]
async fn store_outage_is_not_reported_as_bad_credentials() {
    let svc = AuthService::new(UnreachableStore, test_config());

    let err = svc
        .login(login_input("a@x.com", "secret"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, WardenError::StoreUnavailable(_)),
        "expected StoreUnavailable, got {err:?}"
    );
    assert!(err.is_retryable());

    let err = svc
        .register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::StoreUnavailable(_)));
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let (svc, repo) = setup().await;
    let view = svc
        .register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();
    let principal = repo.find_by_id(&view.id).await.unwrap().unwrap();

    let issued_at = chrono::Utc::now().timestamp() - 10;
    let claims = AccessTokenClaims::new(&principal, "warden-test", issued_at, 0);
    let jwt = token::encode_token(&claims, SECRET).unwrap();

    match svc.authenticate(&jwt).unwrap_err() {
        WardenError::Unauthorized { reason } => {
            assert!(reason.contains("expired"), "expected 'expired': {reason}")
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let (svc, _) = setup().await;
    svc.register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();
    let login = svc.login(login_input("a@x.com", "secret")).await.unwrap();

    let tampered = format!("{}x", login.access_token);
    assert!(matches!(
        svc.authenticate(&tampered),
        Err(WardenError::Unauthorized { .. })
    ));

    let foreign = AuthService::new(
        setup().await.1,
        AuthConfig {
            jwt_secret: "a-completely-different-secret-0123456789".into(),
            ..test_config()
        },
    );
    assert!(matches!(
        foreign.authenticate(&login.access_token),
        Err(WardenError::Unauthorized { .. })
    ));
}

#[tokio::test]
async fn authenticate_from_header() {
    let (svc, _) = setup().await;
    svc.register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();
    let login = svc.login(login_input("a@x.com", "secret")).await.unwrap();

    let header = format!("Bearer {}", login.access_token);
    assert!(svc.authenticate_header(Some(&header)).is_ok());

    assert!(matches!(
        svc.authenticate_header(None),
        Err(WardenError::Unauthorized { .. })
    ));
    assert!(matches!(
        svc.authenticate_header(Some("Basic dXNlcjpwYXNz")),
        Err(WardenError::Unauthorized { .. })
    ));
}

#[tokio::test]
async fn current_principal_strips_password() {
    let (svc, _) = setup().await;
    let registered = svc
        .register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();
    let login = svc.login(login_input("a@x.com", "secret")).await.unwrap();

    let me = svc.current_principal(&login.access_token).await.unwrap();
    assert_eq!(me, registered);
}

#[tokio::test]
async fn update_profile_changes_name_and_password() {
    let (svc, _) = setup().await;
    svc.register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();
    let login = svc.login(login_input("a@x.com", "secret")).await.unwrap();
    let identity = svc.authenticate(&login.access_token).unwrap();

    let updated = svc
        .update_profile(
            &identity,
            UpdateProfileInput {
                display_name: Some("Alice Liddell".into()),
                password: Some("new-secret".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.display_name, "Alice Liddell");

    let err = svc.login(login_input("a@x.com", "secret")).await.unwrap_err();
    assert!(matches!(err, WardenError::InvalidCredentials));

    let relogin = svc.login(login_input("a@x.com", "new-secret")).await.unwrap();
    let identity = svc.authenticate(&relogin.access_token).unwrap();
    assert_eq!(identity.claims().name, "Alice Liddell");
}

#[tokio::test]
async fn update_profile_requires_a_change() {
    let (svc, _) = setup().await;
    svc.register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();
    let login = svc.login(login_input("a@x.com", "secret")).await.unwrap();
    let identity = svc.authenticate(&login.access_token).unwrap();

    let err = svc
        .update_profile(&identity, UpdateProfileInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::Malformed { .. }));

    let err = svc
        .update_profile(
            &identity,
            UpdateProfileInput {
                password: Some("tiny".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::Malformed { .. }));
}

#[tokio::test]
async fn token_for_vanished_principal_is_unauthorized() {
    let (svc, _) = setup().await;
    svc.register(register_input("a@x.com", "secret", "Alice"))
        .await
        .unwrap();
    let login = svc.login(login_input("a@x.com", "secret")).await.unwrap();

    // Same secret, empty store: the token verifies but names nobody.
    let (fresh, _) = setup().await;
    let err = fresh
        .current_principal(&login.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::Unauthorized { .. }));
}
