//! Session/auth gate: registration, login with remote recovery, profile
//! updates and local password recovery.
//!
//! Login resolves against the local store first and only then attempts a
//! remote pull-by-credentials, which is how a second device discovers an
//! account created elsewhere.  Every failure path collapses into the same
//! `InvalidCredentials` so the caller cannot probe which usernames exist.

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use serena_shared::constants::MIN_PASSWORD_LEN;
use serena_shared::models::cpf_digits;
use serena_shared::User;
use serena_store::{EntityStore, StoreError};

use crate::error::{AuthError, ValidationError};
use crate::remote::RemoteStore;
use crate::sync::SyncEngine;

/// Registration form input.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub password: String,
    pub confirm_password: String,
}

/// Profile update form input.  Fields replace the current values wholesale;
/// the user id and username never change.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub password: String,
    pub confirm_password: String,
}

fn check_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Uniqueness checks shared by registration and profile update.  `except`
/// excludes the user being updated from the comparison.
fn check_unique(
    users: &[User],
    email: &str,
    cpf: &str,
    except: Option<Uuid>,
) -> Result<(), ValidationError> {
    let digits = cpf_digits(cpf);
    for user in users.iter().filter(|u| Some(u.id) != except) {
        if user.email.eq_ignore_ascii_case(email) {
            return Err(ValidationError::EmailTaken);
        }
        if cpf_digits(&user.cpf) == digits {
            return Err(ValidationError::CpfTaken);
        }
    }
    Ok(())
}

/// Create a new account.
///
/// All fields are required, the password must be confirmed and long
/// enough, and username/e-mail/CPF must not collide with an existing
/// user.  A rejected registration leaves the Users collection untouched.
pub fn register(store: &EntityStore, account: NewAccount) -> Result<User, ValidationError> {
    if account.username.trim().is_empty() {
        return Err(ValidationError::MissingField("username"));
    }
    if account.full_name.trim().is_empty() {
        return Err(ValidationError::MissingField("full_name"));
    }
    if account.email.trim().is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    check_password(&account.password, &account.confirm_password)?;
    if cpf_digits(&account.cpf).len() != 11 {
        return Err(ValidationError::InvalidCpf);
    }

    let mut users = store.list_users()?;

    if users
        .iter()
        .any(|u| u.username.eq_ignore_ascii_case(&account.username))
    {
        return Err(ValidationError::UsernameTaken);
    }
    check_unique(&users, &account.email, &account.cpf, None)?;

    let user = User {
        id: Uuid::new_v4(),
        username: account.username,
        password: account.password,
        full_name: account.full_name,
        email: account.email,
        cpf: account.cpf,
        birth_date: account.birth_date,
    };

    users.push(user.clone());
    store.save_users(&users)?;

    info!(user = %user.username, "account registered");
    Ok(user)
}

/// Authenticate a login attempt.
///
/// Local lookup first: case-insensitive username, exact password.  On a
/// local miss, if the caller supplied a CPF, fall back to pulling the
/// remote snapshot with the attempted credentials; success means the
/// account existed on another device and is now persisted locally.
pub async fn login<R: RemoteStore>(
    store: &EntityStore,
    sync: &SyncEngine<R>,
    username: &str,
    password: &str,
    cpf_attempt: Option<&str>,
) -> Result<User, AuthError> {
    if let Some(user) = store.find_user_by_username(username)? {
        if user.password == password {
            return Ok(user);
        }
        return Err(AuthError::InvalidCredentials);
    }

    if let Some(cpf) = cpf_attempt {
        match sync.pull(store, username, password, cpf).await {
            Ok(Some(user)) => {
                info!(user = %user.username, "account recovered from remote");
                return Ok(user);
            }
            Ok(None) => {}
            Err(e) => {
                // Infrastructure trouble must not reveal more than a bad
                // password would.
                warn!(username, error = %e, "remote recovery failed");
            }
        }
    }

    Err(AuthError::InvalidCredentials)
}

/// Replace a user's mutable profile fields, keeping the id and username.
pub fn update_profile(
    store: &EntityStore,
    user_id: Uuid,
    update: ProfileUpdate,
) -> Result<User, ValidationError> {
    if update.full_name.trim().is_empty() {
        return Err(ValidationError::MissingField("full_name"));
    }
    if update.email.trim().is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    check_password(&update.password, &update.confirm_password)?;
    if cpf_digits(&update.cpf).len() != 11 {
        return Err(ValidationError::InvalidCpf);
    }

    let mut users = store.list_users()?;
    check_unique(&users, &update.email, &update.cpf, Some(user_id))?;

    let user = users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or(ValidationError::UnknownAccount)?;

    user.full_name = update.full_name;
    user.email = update.email;
    user.cpf = update.cpf;
    user.birth_date = update.birth_date;
    user.password = update.password;
    let updated = user.clone();

    store.save_users(&users)?;

    info!(user = %updated.username, "profile updated");
    Ok(updated)
}

/// Look an account id up by registered e-mail (password recovery, step 1).
pub fn find_account_by_email(store: &EntityStore, email: &str) -> Result<Option<Uuid>, StoreError> {
    Ok(store
        .list_users()?
        .into_iter()
        .find(|u| u.email.eq_ignore_ascii_case(email))
        .map(|u| u.id))
}

/// Set a new password for an account (password recovery, step 2).
pub fn reset_password(
    store: &EntityStore,
    user_id: Uuid,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    check_password(password, confirm_password)?;

    let mut users = store.list_users()?;
    let user = users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or(ValidationError::UnknownAccount)?;

    user.password = password.to_owned();
    let username = user.username.clone();
    store.save_users(&users)?;

    info!(user = %username, "password reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use serena_store::MemoryKv;

    use crate::remote::MemoryRemote;

    fn store() -> EntityStore {
        EntityStore::new(MemoryKv::new())
    }

    fn account(username: &str, email: &str, cpf: &str) -> NewAccount {
        NewAccount {
            username: username.into(),
            full_name: "Ana Silva".into(),
            email: email.into(),
            cpf: cpf.into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            password: "hunter2".into(),
            confirm_password: "hunter2".into(),
        }
    }

    #[test]
    fn register_and_login_locally() {
        let store = store();
        let user = register(&store, account("ana", "ana@example.com", "123.456.789-00")).unwrap();
        assert_eq!(store.list_users().unwrap().len(), 1);

        let engine = SyncEngine::new(MemoryRemote::new());
        let logged_in = futures_login(&store, &engine, "ANA", "hunter2");
        assert_eq!(logged_in.unwrap().id, user.id);
    }

    // Small helper so the synchronous tests can drive the async login.
    fn futures_login(
        store: &EntityStore,
        engine: &SyncEngine<MemoryRemote>,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(login(store, engine, username, password, None))
    }

    #[test]
    fn duplicate_username_any_case_is_rejected() {
        let store = store();
        register(&store, account("ana", "ana@example.com", "123.456.789-00")).unwrap();

        let result = register(&store, account("AnA", "other@example.com", "987.654.321-00"));
        assert!(matches!(result, Err(ValidationError::UsernameTaken)));
        // The collection is unchanged by the failed attempt.
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_email_and_cpf_are_rejected() {
        let store = store();
        register(&store, account("ana", "ana@example.com", "123.456.789-00")).unwrap();

        let result = register(&store, account("bia", "ANA@example.com", "987.654.321-00"));
        assert!(matches!(result, Err(ValidationError::EmailTaken)));

        // Same CPF digits, different formatting.
        let result = register(&store, account("bia", "bia@example.com", "12345678900"));
        assert!(matches!(result, Err(ValidationError::CpfTaken)));
    }

    #[test]
    fn password_rules_are_enforced() {
        let store = store();

        let mut short = account("ana", "ana@example.com", "123.456.789-00");
        short.password = "abc".into();
        short.confirm_password = "abc".into();
        assert!(matches!(
            register(&store, short),
            Err(ValidationError::PasswordTooShort { .. })
        ));

        let mut mismatched = account("ana", "ana@example.com", "123.456.789-00");
        mismatched.confirm_password = "different".into();
        assert!(matches!(
            register(&store, mismatched),
            Err(ValidationError::PasswordMismatch)
        ));

        let bad_cpf = account("ana", "ana@example.com", "123");
        assert!(matches!(
            register(&store, bad_cpf),
            Err(ValidationError::InvalidCpf)
        ));

        assert!(store.list_users().unwrap().is_empty());
    }

    #[test]
    fn unknown_user_and_wrong_password_are_indistinguishable() {
        let store = store();
        register(&store, account("ana", "ana@example.com", "123.456.789-00")).unwrap();
        let engine = SyncEngine::new(MemoryRemote::new());

        let wrong_password = futures_login(&store, &engine, "ana", "nope");
        let unknown_user = futures_login(&store, &engine, "carla", "hunter2");

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn login_falls_back_to_remote_recovery() {
        let remote = MemoryRemote::new();

        // Device one registers and pushes.
        let device_one = store();
        let user = register(
            &device_one,
            account("ana", "ana@example.com", "123.456.789-00"),
        )
        .unwrap();
        let engine_one = SyncEngine::new(remote.clone());
        engine_one.push(&device_one, &user).await.unwrap();

        // Device two has no local account and recovers via pull.
        let device_two = store();
        let engine_two = SyncEngine::new(remote);
        let recovered = login(&device_two, &engine_two, "ana", "hunter2", Some("12345678900"))
            .await
            .unwrap();

        assert_eq!(recovered.id, user.id);
        assert_eq!(device_two.list_users().unwrap().len(), 1);

        // Without the CPF there is no key material, so no fallback.
        let device_three = store();
        let engine_three = SyncEngine::new(MemoryRemote::new());
        let denied = login(&device_three, &engine_three, "ana", "hunter2", None).await;
        assert!(matches!(denied, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn profile_update_replaces_fields_and_keeps_id() {
        let store = store();
        let user = register(&store, account("ana", "ana@example.com", "123.456.789-00")).unwrap();

        let updated = update_profile(
            &store,
            user.id,
            ProfileUpdate {
                full_name: "Ana Souza".into(),
                email: "souza@example.com".into(),
                cpf: "123.456.789-00".into(),
                birth_date: NaiveDate::from_ymd_opt(1991, 1, 2).unwrap(),
                password: "newpass".into(),
                confirm_password: "newpass".into(),
            },
        )
        .unwrap();

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.username, "ana");
        assert_eq!(updated.full_name, "Ana Souza");

        let stored = store.find_user_by_id(user.id).unwrap().unwrap();
        assert_eq!(stored.password, "newpass");
    }

    #[test]
    fn profile_update_enforces_uniqueness_against_others_only() {
        let store = store();
        let ana = register(&store, account("ana", "ana@example.com", "123.456.789-00")).unwrap();
        register(&store, account("bia", "bia@example.com", "987.654.321-00")).unwrap();

        // Keeping her own e-mail and CPF is fine.
        let same = update_profile(
            &store,
            ana.id,
            ProfileUpdate {
                full_name: ana.full_name.clone(),
                email: ana.email.clone(),
                cpf: ana.cpf.clone(),
                birth_date: ana.birth_date,
                password: ana.password.clone(),
                confirm_password: ana.password.clone(),
            },
        );
        assert!(same.is_ok());

        // Taking bia's CPF is not.
        let stolen = update_profile(
            &store,
            ana.id,
            ProfileUpdate {
                full_name: ana.full_name.clone(),
                email: ana.email.clone(),
                cpf: "98765432100".into(),
                birth_date: ana.birth_date,
                password: ana.password.clone(),
                confirm_password: ana.password,
            },
        );
        assert!(matches!(stolen, Err(ValidationError::CpfTaken)));
    }

    #[test]
    fn password_recovery_by_email() {
        let store = store();
        let user = register(&store, account("ana", "ana@example.com", "123.456.789-00")).unwrap();

        let found = find_account_by_email(&store, "ANA@example.com").unwrap();
        assert_eq!(found, Some(user.id));
        assert!(find_account_by_email(&store, "nobody@example.com")
            .unwrap()
            .is_none());

        reset_password(&store, user.id, "brand-new", "brand-new").unwrap();
        let stored = store.find_user_by_id(user.id).unwrap().unwrap();
        assert_eq!(stored.password, "brand-new");

        let unknown = reset_password(&store, Uuid::new_v4(), "brand-new", "brand-new");
        assert!(matches!(unknown, Err(ValidationError::UnknownAccount)));
    }
}
