use ormtour_core::db::migrations::latest_version;
use ormtour_core::db::open_db_in_memory;
use ormtour_core::{
    AccountService, AddressRepository, ModelValidationError, NewAddress, NewUser, RepoError,
    SqliteAddressRepository, SqliteUserRepository, User, UserListQuery, UserRepository,
};
use rusqlite::Connection;

fn service(
    conn: &Connection,
) -> AccountService<SqliteUserRepository<'_>, SqliteAddressRepository<'_>> {
    AccountService::new(
        SqliteUserRepository::try_new(conn).unwrap(),
        SqliteAddressRepository::try_new(conn).unwrap(),
    )
}

fn seed(conn: &Connection) {
    service(conn)
        .add_users(&[
            NewUser::new("spongebob", "Spongebob Squarepants")
                .with_address("spongebob@sqlalchemy.org"),
            NewUser::new("sandy", "Sandy Cheeks")
                .with_address("sandy@sqlalchemy.org")
                .with_address("sandy@squirrelpower.org"),
            NewUser::new("patrick", "Patrick Star"),
        ])
        .unwrap();
}

#[test]
fn inserted_users_are_retrievable_by_name() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    for (name, fullname) in [
        ("spongebob", "Spongebob Squarepants"),
        ("sandy", "Sandy Cheeks"),
        ("patrick", "Patrick Star"),
    ] {
        let user = repo.find_user_by_name(name).unwrap();
        assert_eq!(user.fullname.as_deref(), Some(fullname));
    }
    assert_eq!(repo.count_users().unwrap(), 3);
}

#[test]
fn add_user_stores_pending_addresses_in_order() {
    let conn = open_db_in_memory().unwrap();
    let account = service(&conn)
        .add_user(
            &NewUser::new("sandy", "Sandy Cheeks")
                .with_address("sandy@sqlalchemy.org")
                .with_address("sandy@squirrelpower.org"),
        )
        .unwrap();

    let emails: Vec<_> = account
        .addresses
        .iter()
        .map(|address| address.email_address.as_str())
        .collect();
    assert_eq!(emails, ["sandy@sqlalchemy.org", "sandy@squirrelpower.org"]);
    assert!(account
        .addresses
        .iter()
        .all(|address| address.user_id == account.user.id));
}

#[test]
fn name_membership_filter_returns_matches_in_insert_order() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = service(&conn);

    let names: Vec<_> = service
        .users_named(&["sandy", "spongebob", "gary"])
        .unwrap()
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(names, ["spongebob", "sandy"]);

    let none = service.users_named::<&str>(&[]).unwrap();
    assert!(none.is_empty());
}

#[test]
fn list_users_paginates_by_id() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let page = repo
        .list_users(&UserListQuery {
            limit: Some(1),
            offset: 1,
            ..UserListQuery::default()
        })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "sandy");

    let tail = repo
        .list_users(&UserListQuery {
            offset: 2,
            ..UserListQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].name, "patrick");
}

#[test]
fn find_user_by_name_requires_exactly_one_row() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.find_user_by_name("gary"),
        Err(RepoError::NoResultFound(_))
    ));

    repo.create_user(&NewUser::new("sandy", "Sandy Cheeks II"))
        .unwrap();
    assert!(matches!(
        repo.find_user_by_name("sandy"),
        Err(RepoError::MultipleResultsFound { count: 2, .. })
    ));
}

#[test]
fn join_on_owner_name_and_email_returns_one_address() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = service(&conn);

    let address = service
        .address_of("sandy", "sandy@sqlalchemy.org")
        .unwrap();
    let sandy = service.user_named("sandy").unwrap();
    assert_eq!(address.user_id, sandy.id);
    assert_eq!(
        address.to_string(),
        format!("Address(id={}, email_address='sandy@sqlalchemy.org')", address.id)
    );

    assert!(matches!(
        service.address_of("spongebob", "sandy@sqlalchemy.org"),
        Err(RepoError::NoResultFound(_))
    ));
}

#[test]
fn changed_email_address_persists_on_reload() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = service(&conn);

    let mut address = service
        .address_of("sandy", "sandy@sqlalchemy.org")
        .unwrap();
    service
        .change_email_address(&mut address, "sandy_cheeks@sqlalchemy.org")
        .unwrap();

    let reloaded = service.reload_address(address.id).unwrap();
    assert_eq!(reloaded.email_address, "sandy_cheeks@sqlalchemy.org");
}

#[test]
fn appended_address_joins_user_collection() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = service(&conn);

    let patrick = service.user_named("patrick").unwrap();
    let appended = service
        .append_address(&patrick, "patrickstar@sqlalchemy.org")
        .unwrap();

    let account = service.get_account(patrick.id).unwrap().unwrap();
    assert_eq!(account.addresses, vec![appended]);
}

#[test]
fn removing_address_from_collection_deletes_row() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = service(&conn);

    let sandy = service.user_named("sandy").unwrap();
    let address = service
        .address_of("sandy", "sandy@sqlalchemy.org")
        .unwrap();
    service.remove_address(&sandy, &address).unwrap();

    assert!(matches!(
        service.reload_address(address.id),
        Err(RepoError::AddressNotFound(id)) if id == address.id
    ));
    let account = service.get_account(sandy.id).unwrap().unwrap();
    assert_eq!(account.addresses.len(), 1);
}

#[test]
fn removing_address_owned_by_someone_else_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = service(&conn);

    let patrick = service.user_named("patrick").unwrap();
    let address = service
        .address_of("sandy", "sandy@sqlalchemy.org")
        .unwrap();

    let err = service.remove_address(&patrick, &address).unwrap_err();
    assert!(matches!(
        err,
        RepoError::AddressNotOwned { address_id, user_id }
            if address_id == address.id && user_id == patrick.id
    ));
    assert!(service.reload_address(address.id).is_ok());
}

#[test]
fn deleting_user_cascades_to_addresses() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = service(&conn);

    let sandy = service.user_named("sandy").unwrap();
    service.delete_user(&sandy).unwrap();

    assert!(service.get_account(sandy.id).unwrap().is_none());
    assert_eq!(service.row_counts().unwrap(), (2, 1));

    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.delete_user(sandy.id),
        Err(RepoError::UserNotFound(id)) if id == sandy.id
    ));
}

#[test]
fn address_for_missing_user_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAddressRepository::try_new(&conn).unwrap();

    let err = repo
        .add_address(404, &NewAddress::new("nobody@sqlalchemy.org"))
        .unwrap_err();
    assert!(matches!(err, RepoError::UserNotFound(404)));
    assert_eq!(repo.count_addresses().unwrap(), 0);
}

#[test]
fn validation_failure_blocks_writes() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();

    let err = users
        .create_user(&NewUser::new("a".repeat(31), "Long Name"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::NameTooLong { .. })
    ));

    let err = users
        .create_user(&NewUser::new("gary", "Gary").with_address(""))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::BlankEmailAddress)
    ));
    assert_eq!(users.count_users().unwrap(), 0);

    let mut gary = users.create_user(&NewUser::new("gary", "Gary")).unwrap();
    gary.name = String::new();
    assert!(matches!(
        users.update_user(&gary),
        Err(RepoError::Validation(ModelValidationError::BlankName))
    ));
}

#[test]
fn renamed_user_persists_on_reload() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let mut patrick = repo.find_user_by_name("patrick").unwrap();
    patrick.name = "patrick_star".to_string();
    patrick.fullname = None;
    repo.update_user(&patrick).unwrap();

    let reloaded = repo.get_user(patrick.id).unwrap().unwrap();
    assert_eq!(reloaded, patrick);
    assert!(matches!(
        repo.find_user_by_name("patrick"),
        Err(RepoError::NoResultFound(_))
    ));
}

#[test]
fn update_missing_user_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let ghost = User {
        id: 77,
        name: "ghost".to_string(),
        fullname: None,
    };
    assert!(matches!(
        repo.update_user(&ghost),
        Err(RepoError::UserNotFound(77))
    ));
}

#[test]
fn failed_address_insert_rolls_back_user_row() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_bad_domain BEFORE INSERT ON address
         WHEN NEW.email_address LIKE '%@bad.example'
         BEGIN SELECT RAISE(ABORT, 'rejected domain'); END;",
    )
    .unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();

    let result = users.create_user(
        &NewUser::new("plankton", "Sheldon Plankton")
            .with_address("plankton@chumbucket.example")
            .with_address("plankton@bad.example"),
    );
    assert!(matches!(result, Err(RepoError::Db(_))));

    assert_eq!(users.count_users().unwrap(), 0);
    let addresses = SqliteAddressRepository::try_new(&conn)
        .unwrap()
        .count_addresses()
        .unwrap();
    assert_eq!(addresses, 0);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteUserRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_address_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE user_account (id INTEGER PRIMARY KEY, name TEXT, fullname TEXT);
         PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();

    assert!(matches!(
        SqliteAddressRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("address"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE user_account (id INTEGER PRIMARY KEY, name TEXT);
         PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();

    assert!(matches!(
        SqliteUserRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "user_account",
            column: "fullname"
        })
    ));
}

#[test]
fn invalid_persisted_rows_are_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO user_account (name, fullname) VALUES ('', 'Blank Name');",
        [],
    )
    .unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.list_users(&UserListQuery::default()),
        Err(RepoError::InvalidData(_))
    ));
}
