//! Admin credential management.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::aggregates::admin::Admin;
use crate::store::documents::Collection;
use crate::{Error, Result};

/// What the admin panel sees in listings; password hashes never leave the
/// directory.
#[derive(Clone, Debug, Serialize)]
pub struct AdminSummary {
    pub id: String,
    pub username: String,
}

impl From<&Admin> for AdminSummary {
    fn from(admin: &Admin) -> Self {
        Self { id: admin.id.clone(), username: admin.username.clone() }
    }
}

pub struct AdminDirectory {
    admins: Arc<dyn Collection<Admin>>,
}

impl AdminDirectory {
    pub fn new(admins: Arc<dyn Collection<Admin>>) -> Self {
        Self { admins }
    }

    pub async fn create(&self, username: &str, password: &str) -> Result<AdminSummary> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::Validation("username must not be empty".into()));
        }
        if self.find_by_username(username).await?.is_some() {
            return Err(Error::Validation("username already exists".into()));
        }
        let admin = Admin::create(username, password).map_err(|err| Error::Validation(err.to_string()))?;
        self.admins.insert(&admin.id, admin.clone()).await?;
        Ok(AdminSummary::from(&admin))
    }

    pub async fn update(&self, id: &str, username: &str, password: &str) -> Result<AdminSummary> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::Validation("username must not be empty".into()));
        }
        if let Some(existing) = self.find_by_username(username).await? {
            if existing.id != id {
                return Err(Error::Validation("username already exists".into()));
            }
        }
        let mut admin = self.admins.get(id).await?.ok_or(Error::NotFound("admin"))?;
        admin
            .set_credentials(username, password)
            .map_err(|err| Error::Validation(err.to_string()))?;
        if !self.admins.replace(id, admin.clone()).await? {
            return Err(Error::NotFound("admin"));
        }
        Ok(AdminSummary::from(&admin))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.admins.remove(id).await? {
            return Err(Error::NotFound("admin"));
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<AdminSummary>> {
        Ok(self.admins.list().await?.iter().map(AdminSummary::from).collect())
    }

    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AdminSummary> {
        let Some(admin) = self.find_by_username(username).await? else {
            return Err(Error::InvalidCredentials);
        };
        if !admin.verify_password(password) {
            return Err(Error::InvalidCredentials);
        }
        Ok(AdminSummary::from(&admin))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>> {
        Ok(self.admins.list().await?.into_iter().find(|a| a.username == username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::documents::InMemoryCollection;

    fn directory() -> AdminDirectory {
        AdminDirectory::new(Arc::new(InMemoryCollection::<Admin>::new()))
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let directory = directory();
        directory.create("root", "hunter22").await.unwrap();
        let listed = directory.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].username, "root");
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let directory = directory();
        directory.create("root", "hunter22").await.unwrap();
        assert!(matches!(
            directory.create("root", "other-pass").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let directory = directory();
        directory.create("root", "hunter22").await.unwrap();
        assert!(directory.authenticate("root", "hunter22").await.is_ok());
        assert!(matches!(
            directory.authenticate("root", "wrong").await,
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            directory.authenticate("nobody", "hunter22").await,
            Err(Error::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_update_rotates_credentials() {
        let directory = directory();
        let created = directory.create("root", "first-pass").await.unwrap();
        directory.update(&created.id, "root2", "second-pass").await.unwrap();
        assert!(directory.authenticate("root2", "second-pass").await.is_ok());
        assert!(matches!(
            directory.authenticate("root", "first-pass").await,
            Err(Error::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let directory = directory();
        assert!(matches!(directory.delete("no-such-id").await, Err(Error::NotFound("admin"))));
    }
}
