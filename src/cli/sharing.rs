use clap::ValueEnum;

use crate::catalog::{CatalogError, ProductUpdate, Table, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Owner,
    Reader,
    Writer,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Reader => "reader",
            Role::Writer => "writer",
        }
    }

    fn principals<'a, T: Transport>(&self, table: &'a Table<T>) -> &'a [String] {
        let parameters = table.parameters();
        match self {
            Role::Owner => &parameters.owners,
            Role::Reader => &parameters.readers,
            Role::Writer => &parameters.writers,
        }
    }

    fn update(&self, principals: Vec<String>) -> ProductUpdate {
        let mut update = ProductUpdate::default();
        match self {
            Role::Owner => update.owners = Some(principals),
            Role::Reader => update.readers = Some(principals),
            Role::Writer => update.writers = Some(principals),
        }
        update
    }
}

/// Entities to grant or revoke a role for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grantees {
    pub orgs: Vec<String>,
    pub users: Vec<String>,
    pub groups: Vec<String>,
    pub emails: Vec<String>,
}

impl Grantees {
    /// Access-list entries of the grantees, e.g. `org:acme` or `email:a@example.com`.
    pub fn principals(&self) -> Vec<String> {
        let prefixed = |prefix: &'static str, names: &[String]| {
            names
                .iter()
                .map(move |name| format!("{prefix}:{name}"))
                .collect::<Vec<_>>()
        };
        [
            prefixed("org", &self.orgs),
            prefixed("user", &self.users),
            prefixed("group", &self.groups),
            prefixed("email", &self.emails),
        ]
        .concat()
    }
}

/// Principals in `new` that are not yet in `existing` are appended to it.
pub fn add_principals(existing: &[String], new: &[String]) -> Vec<String> {
    let mut principals = existing.to_vec();
    for principal in new {
        if !principals.contains(principal) {
            principals.push(principal.clone());
        }
    }
    principals
}

/// Removes `revoked` from `existing`. Returns the remaining principals and the revoked
/// principals that were not present.
pub fn remove_principals(existing: &[String], revoked: &[String]) -> (Vec<String>, Vec<String>) {
    let mut principals = existing.to_vec();
    let mut unknown = Vec::new();
    for principal in revoked {
        match principals.iter().position(|p| p == principal) {
            Some(index) => {
                principals.remove(index);
            }
            None => unknown.push(principal.clone()),
        }
    }
    (principals, unknown)
}

pub fn share_table<T: Transport>(
    table: &mut Table<T>,
    role: Role,
    grantees: &Grantees,
) -> Result<(), CatalogError> {
    let principals = add_principals(role.principals(table), &grantees.principals());
    log::info!("Sharing {} as {} with {:?}", table.id(), role.name(), principals);
    table.update(&role.update(principals))
}

/// Revoke `role` from the grantees, returning the principals that did not hold it.
pub fn unshare_table<T: Transport>(
    table: &mut Table<T>,
    role: Role,
    grantees: &Grantees,
) -> Result<Vec<String>, CatalogError> {
    let (principals, unknown) = remove_principals(role.principals(table), &grantees.principals());
    table.update(&role.update(principals))?;
    Ok(unknown)
}
