use serde::{Deserialize, Serialize};

use crate::{route::Route, Client, Result};

/// The user the api key belongs to, from `GET api/currentuser`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CurrentUser {
    /// User name, unset when the request was made anonymously.
    pub name: Option<String>,

    /// Effective permissions.
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Groups the user belongs to.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Client {
    /// Retrieve the user the configured api key belongs to.
    pub async fn current_user(&self) -> Result<CurrentUser> {
        self.get_json(Route::CurrentUser).await
    }
}
