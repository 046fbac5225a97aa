use oxide_db::{Database, DbConfig, PROJECT_FEATURE_ENV};

// Kept alone in its own test binary: it changes the process environment.
#[test]
fn test_feature_database_name() {
    std::env::remove_var(PROJECT_FEATURE_ENV);
    assert_eq!(Database::feature("app").name, "app");

    std::env::set_var(PROJECT_FEATURE_ENV, "");
    assert_eq!(Database::feature("app").name, "app");

    std::env::set_var(PROJECT_FEATURE_ENV, "login");
    let database = Database::feature("app");
    assert_eq!(database.name, "app__login");
    std::env::remove_var(PROJECT_FEATURE_ENV);

    let config = DbConfig::new("mysql://root:pw@localhost:3306/app");
    assert_eq!(
        config.url_for(&database.name).unwrap(),
        "mysql://root:pw@localhost:3306/app__login"
    );
}
