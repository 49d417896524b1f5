//! Configuration Port
//!
//! Destination address directory and retry tuning, read once from a
//! provider and injected into the dispatcher.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::errors::DomainError;
use crate::domain::value_objects::DestinationService;

pub const KEY_MAX_ATTEMPTS: &str = "DISPATCH_MAX_ATTEMPTS";
pub const KEY_RETRY_BASE_MS: &str = "DISPATCH_RETRY_BASE_MS";
pub const KEY_RETRY_FACTOR: &str = "DISPATCH_RETRY_FACTOR";
pub const KEY_RETRY_MAX_MS: &str = "DISPATCH_RETRY_MAX_MS";
pub const KEY_ATTEMPT_TIMEOUT_MS: &str = "DISPATCH_ATTEMPT_TIMEOUT_MS";
pub const KEY_DEADLINE_MS: &str = "DISPATCH_DEADLINE_MS";

/// Source of raw configuration values (secrets store, env, DB table, ...)
pub trait ConfigurationProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigurationProvider for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Destination to address mapping
///
/// A destination without an address is a valid state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationDirectory {
    addresses: HashMap<DestinationService, String>,
}

impl DestinationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an address; blank values leave the destination unconfigured
    pub fn with_address(mut self, destination: DestinationService, address: impl Into<String>) -> Self {
        let address = address.into();
        if address.trim().is_empty() {
            self.addresses.remove(&destination);
        } else {
            self.addresses.insert(destination, address.trim().to_string());
        }
        self
    }

    pub fn address_for(&self, destination: DestinationService) -> Option<&str> {
        self.addresses.get(&destination).map(String::as_str)
    }

    pub fn is_configured(&self, destination: DestinationService) -> bool {
        self.addresses.contains_key(&destination)
    }

    pub fn configured(&self) -> Vec<DestinationService> {
        DestinationService::ALL
            .into_iter()
            .filter(|d| self.is_configured(*d))
            .collect()
    }
}

/// Per-destination retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per destination, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: u32,
    pub max_delay: Duration,
    /// Bound on a single send
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            factor: 2,
            max_delay: Duration::from_secs(10),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1 = first retry): base * factor^(retry-1), capped
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1);
        let multiplier = self.factor.saturating_pow(exponent);
        self.base_delay
            .checked_mul(multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Everything the dispatcher needs, injected at construction
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub directory: DestinationDirectory,
    pub retry: RetryPolicy,
    /// Bound on the whole dispatch across all destinations
    pub dispatch_deadline: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            directory: DestinationDirectory::default(),
            retry: RetryPolicy::default(),
            dispatch_deadline: Duration::from_secs(30),
        }
    }
}

impl DispatchConfig {
    pub fn new(directory: DestinationDirectory) -> Self {
        Self {
            directory,
            ..Self::default()
        }
    }

    /// Read addresses (`PHONE_*`) and tuning (`DISPATCH_*`) from a provider
    pub fn from_provider(provider: &dyn ConfigurationProvider) -> Result<Self, DomainError> {
        let directory = DestinationService::ALL
            .into_iter()
            .fold(DestinationDirectory::new(), |directory, destination| {
                match provider.get(destination.config_key()) {
                    Some(address) => directory.with_address(destination, address),
                    None => directory,
                }
            });

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: parse_or(provider, KEY_MAX_ATTEMPTS, defaults.max_attempts)?,
            base_delay: millis_or(provider, KEY_RETRY_BASE_MS, defaults.base_delay)?,
            factor: parse_or(provider, KEY_RETRY_FACTOR, defaults.factor)?,
            max_delay: millis_or(provider, KEY_RETRY_MAX_MS, defaults.max_delay)?,
            attempt_timeout: millis_or(provider, KEY_ATTEMPT_TIMEOUT_MS, defaults.attempt_timeout)?,
        };

        if retry.max_attempts == 0 {
            return Err(DomainError::Configuration(format!(
                "{} must be at least 1",
                KEY_MAX_ATTEMPTS
            )));
        }

        let dispatch_deadline = millis_or(provider, KEY_DEADLINE_MS, Duration::from_secs(30))?;

        Ok(Self {
            directory,
            retry,
            dispatch_deadline,
        })
    }
}

fn parse_or<T>(provider: &dyn ConfigurationProvider, key: &str, default: T) -> Result<T, DomainError>
where
    T: std::str::FromStr,
{
    match provider.get(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DomainError::Configuration(format!("{} is not a valid number: {}", key, raw))),
        None => Ok(default),
    }
}

fn millis_or(
    provider: &dyn ConfigurationProvider,
    key: &str,
    default: Duration,
) -> Result<Duration, DomainError> {
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parse_or(provider, key, default_ms).map(Duration::from_millis)
}
