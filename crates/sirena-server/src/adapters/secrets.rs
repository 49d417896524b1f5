//! Shuttle secrets as a configuration source

use shuttle_runtime::SecretStore;

use sirena::ConfigurationProvider;

pub struct SecretsConfigProvider {
    secrets: SecretStore,
}

impl SecretsConfigProvider {
    pub fn new(secrets: SecretStore) -> Self {
        Self { secrets }
    }
}

impl ConfigurationProvider for SecretsConfigProvider {
    fn get(&self, key: &str) -> Option<String> {
        self.secrets.get(key)
    }
}
