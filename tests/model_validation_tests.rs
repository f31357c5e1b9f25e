use blog_api::{
    ApiError,
    handlers::parse_body,
    models::{
        Article, ArticlePayload, ArticleSummary, Comment, CommentPayload, CommentSaved,
        CommentView, Credentials, MAX_TITLE_CHARS, User,
    },
    password::{dummy_hash, hash_password, verify_password, verify_unknown_user},
};

// --- Request Body Parsing ---

#[test]
fn test_credentials_parse() {
    let credentials: Credentials =
        parse_body(br#"{"username": "swpp", "password": "iluvswpp"}"#).unwrap();

    assert_eq!(credentials.username, "swpp");
    assert_eq!(credentials.password, "iluvswpp");
}

#[test]
fn test_unknown_fields_are_ignored() {
    let payload: CommentPayload =
        parse_body(br#"{"content": "Comment!", "author": 99, "article": 3}"#).unwrap();

    assert_eq!(payload.content, "Comment!");
}

#[test]
fn test_missing_or_malformed_bodies_are_bad_requests() {
    let cases: [&[u8]; 6] = [
        b"",
        b"not json",
        br#"["title", "content"]"#,
        br#"{"title": "Only title"}"#,
        br#"{"title": 7, "content": "typed wrong"}"#,
        br#"{"title": "", "content": "empty title"}"#,
    ];

    for body in cases {
        let result = parse_body::<ArticlePayload>(body);
        assert!(
            matches!(result, Err(ApiError::BadRequest(_))),
            "body {:?} should be rejected",
            String::from_utf8_lossy(body)
        );
    }
}

#[test]
fn test_article_title_length_limit() {
    let longest = "t".repeat(MAX_TITLE_CHARS);
    let body = serde_json::json!({ "title": longest, "content": "c" }).to_string();
    assert!(parse_body::<ArticlePayload>(body.as_bytes()).is_ok());

    let too_long = "t".repeat(MAX_TITLE_CHARS + 1);
    let body = serde_json::json!({ "title": too_long, "content": "c" }).to_string();
    assert!(matches!(
        parse_body::<ArticlePayload>(body.as_bytes()),
        Err(ApiError::BadRequest(_))
    ));

    // Characters, not bytes.
    let multibyte = "é".repeat(MAX_TITLE_CHARS);
    let body = serde_json::json!({ "title": multibyte, "content": "c" }).to_string();
    assert!(parse_body::<ArticlePayload>(body.as_bytes()).is_ok());
}

#[test]
fn test_empty_credentials_rejected() {
    let result = parse_body::<Credentials>(br#"{"username": "", "password": "x"}"#);
    assert!(matches!(result, Err(ApiError::BadRequest(_))));

    let result = parse_body::<Credentials>(br#"{"username": "swpp", "password": ""}"#);
    assert!(matches!(result, Err(ApiError::BadRequest(_))));
}

// --- Response Mapping ---

#[test]
fn test_article_summary_exposes_author_id() {
    let article = Article {
        id: 4,
        title: "I Love SWPP!".to_string(),
        content: "Believe it or not".to_string(),
        author_id: 2,
    };

    let summary = ArticleSummary::from(article);

    assert_eq!(
        serde_json::to_value(&summary).unwrap(),
        serde_json::json!({ "title": "I Love SWPP!", "content": "Believe it or not", "author": 2 })
    );
}

#[test]
fn test_comment_views() {
    let comment = Comment {
        id: 9,
        article_id: 4,
        author_id: 2,
        content: "Comment!".to_string(),
    };

    assert_eq!(
        serde_json::to_value(CommentView::from(comment.clone())).unwrap(),
        serde_json::json!({ "article": 4, "author": 2, "content": "Comment!" })
    );
    assert_eq!(
        serde_json::to_value(CommentSaved::from(comment)).unwrap(),
        serde_json::json!({ "id": 9, "content": "Comment!" })
    );
}

#[test]
fn test_user_serialization_omits_password_hash() {
    let user = User {
        id: 1,
        username: "swpp".to_string(),
        password_hash: "$argon2id$secret".to_string(),
    };

    let value = serde_json::to_value(&user).unwrap();

    assert_eq!(value, serde_json::json!({ "id": 1, "username": "swpp" }));
}

// --- Password Hashing ---

#[test]
fn test_password_hash_round_trip() {
    let hash = hash_password("iluvswpp").unwrap();

    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "iluvswpp"));
    assert!(!verify_password(&hash, "iluvSWPP"));
}

#[test]
fn test_password_hashes_are_salted() {
    let first = hash_password("iluvswpp").unwrap();
    let second = hash_password("iluvswpp").unwrap();

    assert_ne!(first, second);
}

#[test]
fn test_malformed_hash_never_verifies() {
    assert!(!verify_password("", "anything"));
    assert!(!verify_password("plaintext-password", "plaintext-password"));
}

#[test]
fn test_unknown_user_check_costs_a_real_verification() {
    let dummy = dummy_hash().expect("dummy hash should be available");
    let real = hash_password("iluvswpp").unwrap();

    // Same algorithm, version and cost parameters: everything before the salt.
    let params = |phc: &str| phc.rsplitn(3, '$').nth(2).map(str::to_string);
    assert_eq!(params(dummy), params(&real));

    assert!(!verify_unknown_user("iluvswpp"));
    assert!(!verify_unknown_user("placeholder-for-unknown-users"));
}
