use super::{Params, find_matching, param, remove, require, save};
use crate::error::{ClinicaError, Result};
use crate::model::{Account, NewAccount};
use crate::password::PasswordHasher;
use crate::store::{Filter, Record, RecordStore};
use crate::uniqueness::ensure_unique;
use crate::validation::{ensure_field, ensure_valid, fields};

/// Supported account lookups, in order of precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountQuery {
    Name { last_name: String, first_name: String },
    UserName(String),
    UserEmail(String),
}

impl AccountQuery {
    pub fn from_params(params: &Params) -> Result<Self> {
        if let (Some(last_name), Some(first_name)) =
            (param(params, "last_name"), param(params, "first_name"))
        {
            ensure_field(fields::is_valid_name(last_name) && fields::is_valid_name(first_name))?;
            return Ok(Self::Name {
                last_name: last_name.to_string(),
                first_name: first_name.to_string(),
            });
        }
        if let Some(user_name) = param(params, "user_name") {
            return Ok(Self::UserName(user_name.to_string()));
        }
        if let Some(user_email) = param(params, "user_email") {
            ensure_field(fields::is_valid_email(user_email))?;
            return Ok(Self::UserEmail(user_email.to_string()));
        }
        Err(ClinicaError::validation(
            "At least one of last_name and first_name, user_name, or user_email should be provided",
        ))
    }

    fn filter(&self) -> Filter {
        match self {
            Self::Name {
                last_name,
                first_name,
            } => Filter::new()
                .eq("last_name", last_name.as_str())
                .eq("first_name", first_name.as_str()),
            Self::UserName(user_name) => Filter::new().eq("user_name", user_name.as_str()),
            Self::UserEmail(user_email) => Filter::new().eq("user_email", user_email.as_str()),
        }
    }
}

/// Single-field account updates
#[derive(Debug, Clone)]
pub enum AccountChange {
    LastName(String),
    FirstName(String),
    UserName(String),
    UserEmail(String),
    Password { current: String, new: String },
}

pub fn register<S: RecordStore>(
    store: &S,
    hasher: &PasswordHasher,
    new: NewAccount,
) -> Result<Account> {
    ensure_valid(&new, Account::KIND)?;
    ensure_unique::<Account, S>(store, &[("user_email", new.user_email.as_str())], None)?;

    let password_hash = hasher.hash(&new.password);
    let account = store.insert(new.into_account(password_hash))?;
    tracing::info!(id = account.id, "Account registered");
    Ok(account)
}

pub fn get<S: RecordStore>(store: &S, id: i64) -> Result<Account> {
    require(store, &id.to_string())
}

pub fn search<S: RecordStore>(store: &S, query: &AccountQuery) -> Result<Vec<Account>> {
    find_matching(store, &query.filter())
}

pub fn update<S: RecordStore>(
    store: &S,
    hasher: &PasswordHasher,
    id: i64,
    change: AccountChange,
) -> Result<()> {
    let key = id.to_string();
    match &change {
        AccountChange::LastName(name) | AccountChange::FirstName(name) => {
            ensure_field(fields::is_valid_name(name))?
        }
        AccountChange::UserName(user_name) => ensure_field(fields::is_valid_user_name(user_name))?,
        AccountChange::UserEmail(email) => ensure_field(fields::is_valid_email(email))?,
        AccountChange::Password { .. } => {}
    }

    let mut account: Account = require(store, &key)?;

    match change {
        AccountChange::LastName(last_name) => account.last_name = last_name,
        AccountChange::FirstName(first_name) => account.first_name = first_name,
        AccountChange::UserName(user_name) => account.user_name = user_name,
        AccountChange::UserEmail(user_email) => {
            ensure_unique::<Account, S>(store, &[("user_email", user_email.as_str())], Some(&key))?;
            account.user_email = user_email;
        }
        AccountChange::Password { current, new } => {
            if !hasher.verify(&current, &account.password_hash) {
                tracing::warn!(id, "Password change rejected: current password mismatch");
                return Err(ClinicaError::Unauthorized {
                    message: "Current password is incorrect".to_string(),
                });
            }
            if !fields::is_valid_password(&new) {
                return Err(ClinicaError::validation("New password is too weak"));
            }
            account.password_hash = hasher.hash(&new);
        }
    }

    save(store, &account)
}

pub fn delete<S: RecordStore>(store: &S, id: i64) -> Result<()> {
    remove::<Account, S>(store, &id.to_string())
}
